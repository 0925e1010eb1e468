use std::path::Path;

use serde_json::{Map, Value, json};

use crate::error::{ReportError, Result};
use crate::input::{AnalysisInfo, FileType};
use crate::parsers::fastqc::read_fastqc_archive;
use crate::pipeline::{
    DataInfo, EmbeddedFile, ReportDefinition, Stage, StageDataMap, StaticGroup, StaticRoot,
};
use crate::pipelines::available_pages;
use crate::render::RenderContext;

pub const PIPELINE_NAME: &str = "base";

pub const BASE_STATIC: &[EmbeddedFile] = &[
    EmbeddedFile {
        path: "css/site.css",
        contents: include_bytes!("../../assets/base/static/css/site.css"),
    },
    EmbeddedFile {
        path: "js/charts.js",
        contents: include_bytes!("../../assets/base/static/js/charts.js"),
    },
];

pub const FASTQC_STAGE: &str = "fastqc";
pub const FASTQC_FOLDER: &str = "fastqc";
const FASTQC_ENTRANCES: &[&str] = &["base/fastqc.html"];
const FASTQC_ACCEPTED: [FileType; 2] = [FileType::Fasta, FileType::Fastq];

pub const QUALITY_SECTION: &str = "Per base sequence quality";
pub const QUALITY_COLUMN: &str = "Mean";

pub const FASTQC_MODULES: [(&str, Option<&str>); 11] = [
    ("Basic Statistics", None),
    ("Per base sequence quality", Some("per_base_quality.png")),
    ("Per tile sequence quality", None),
    ("Per sequence quality scores", Some("per_sequence_quality.png")),
    ("Per sequence GC content", Some("per_sequence_gc_content.png")),
    ("Per base N content", Some("per_base_n_content.png")),
    ("Sequence Length Distribution", Some("sequence_length_distribution.png")),
    ("Sequence Duplication Levels", Some("duplication_levels.png")),
    ("Overrepresented sequences", None),
    ("Adapter Content", None),
    ("Kmer Content", None),
];

pub const STATUS_ICONS: [(&str, &str); 3] = [("pass", "✔"), ("warn", "!"), ("fail", "✘")];

const COMPRESSION_EXTENSIONS: [&str; 2] = [".gz", ".bz2"];
const SEQUENCE_EXTENSIONS: [&str; 6] = [".fastq", ".fq", ".fasta", ".fa", ".fna", ".txt"];

pub const BASE_HOME_STAGE: &str = "base_home";
const BASE_HOME_ENTRANCES: &[&str] = &["base/index.html"];
const BASE_PAGES: &[(&str, &str, &str)] = &[(FASTQC_STAGE, "fastqc.html", "FastQC")];

pub fn base_report() -> ReportDefinition {
    ReportDefinition {
        name: PIPELINE_NAME,
        stages: vec![fastqc_stage(), base_home_stage()],
        static_roots: vec![StaticRoot::Embedded(BASE_STATIC)],
    }
}

pub fn fastqc_stage() -> Stage {
    Stage::tool(FASTQC_STAGE, FASTQC_FOLDER, FASTQC_ENTRANCES)
        .with_parse(parse_fastqc)
        .with_context(fastqc_context)
        .with_joint_static(StaticGroup::new("", "*/*_fastqc/Images/*.png", "fastqc"))
}

pub fn base_home_stage() -> Stage {
    Stage::summary(BASE_HOME_STAGE, BASE_HOME_ENTRANCES).with_context(base_home_context)
}

// As FastQC names its output: `s1_R1.fastq.gz` -> `s1_R1`, `S1.L001` -> `S1.L001`.
pub fn fastqc_stem(source: &Path) -> String {
    let mut name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    for ext in COMPRESSION_EXTENSIONS {
        if let Some(stripped) = name.strip_suffix(ext) {
            name = stripped.to_string();
            break;
        }
    }
    for ext in SEQUENCE_EXTENSIONS {
        if let Some(stripped) = name.strip_suffix(ext) {
            name = stripped.to_string();
            break;
        }
    }
    name
}

fn parse_fastqc(stage: &Stage, info: &AnalysisInfo, _: &StageDataMap) -> Result<DataInfo> {
    let folder = stage.result_folder(info)?;

    let mut sources = Vec::new();
    let mut qc_info = Map::new();
    let mut qc_data = Map::new();
    let mut quality_series = Map::new();

    for source_path in info.sources_of_type(&FASTQC_ACCEPTED).into_keys() {
        let stem = fastqc_stem(&source_path);
        let zip_path = folder.join(&stem).join(format!("{stem}_fastqc.zip"));
        tracing::debug!("parsing FastQC archive {}", zip_path.display());

        let report = read_fastqc_archive(&zip_path)?;
        let series = report
            .numeric_column(QUALITY_SECTION, QUALITY_COLUMN)
            .map_err(|e| ReportError::parse(&zip_path, e))?;
        let (positions, means): (Vec<String>, Vec<f64>) = series.into_iter().unzip();

        let key = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| stem.clone());
        sources.push(json!({ "name": key, "stem": stem }));
        qc_info.insert(key.clone(), serde_json::to_value(&report.statuses)?);
        qc_data.insert(key.clone(), serde_json::to_value(&report.sections)?);
        quality_series.insert(key, json!({ "positions": positions, "mean": means }));
    }

    let mut data = DataInfo::new();
    data.insert("sources".to_string(), Value::Array(sources));
    data.insert("qc_info".to_string(), Value::Object(qc_info));
    data.insert("qc_data".to_string(), Value::Object(qc_data));
    data.insert("quality_series".to_string(), Value::Object(quality_series));
    Ok(data)
}

fn fastqc_context(context: &mut RenderContext) {
    let modules = FASTQC_MODULES
        .iter()
        .map(|(name, image)| json!({ "name": name, "image": image }))
        .collect();
    context.insert("MODULES".to_string(), Value::Array(modules));
    context.insert("STATUS_ICONS".to_string(), status_icons());
}

fn base_home_context(context: &mut RenderContext) {
    let pages = available_pages(context, BASE_PAGES);
    context.insert("pages".to_string(), pages);
    context.insert("STATUS_ICONS".to_string(), status_icons());
}

pub fn status_icons() -> Value {
    Value::Object(
        STATUS_ICONS
            .iter()
            .map(|(status, icon)| (status.to_string(), Value::String(icon.to_string())))
            .collect(),
    )
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipelines/base.rs"]
mod tests;
