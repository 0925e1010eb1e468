use std::io;

use serde_json::{Map, Value, json};

use crate::error::{ReportError, Result};
use crate::input::AnalysisInfo;
use crate::input::reader::plain_or_gz;
use crate::parsers::star_log::{
    LogValue, StarLog, TOTAL_INPUT_READS, UNMAPPED_REASONS, read_star_log, unmapped_count_label,
};
use crate::pipeline::{
    DataInfo, EmbeddedFile, ReportDefinition, Stage, StageDataMap, StaticGroup, StaticRoot,
};
use crate::pipelines::base::{BASE_STATIC, FASTQC_STAGE, fastqc_stage, status_icons};
use crate::pipelines::{available_pages, raw_output_links, sample_raw_output_links};
use crate::render::RenderContext;

pub const PIPELINE_NAME: &str = "rna_seq";

pub const RNA_SEQ_STATIC: &[EmbeddedFile] = &[EmbeddedFile {
    path: "css/rna_seq.css",
    contents: include_bytes!("../../assets/rna_seq/static/css/rna_seq.css"),
}];

pub const STAR_STAGE: &str = "star";
pub const STAR_FOLDER: &str = "STAR";
const STAR_ENTRANCES: &[&str] = &["rna_seq/star.html"];
pub const STAR_LOG_FILE: &str = "Log.final.out";
const STAR_RAW_OUTPUTS: &[&str] = &[
    "Log.final.out",
    "Log.out",
    "Log.progress.out",
    "SJ.out.tab",
    "Aligned.sortedByCoord.out.bam",
];

pub const UNIQUE_MAPPED_FRACTION: &str = "Uniquely mapped reads %";

const STAR_SUMMARY_METRICS: [&str; 11] = [
    "Started job on",
    "Finished on",
    TOTAL_INPUT_READS,
    "Average input read length",
    "Uniquely mapped reads number",
    UNIQUE_MAPPED_FRACTION,
    "Number of reads mapped to multiple loci",
    "% of reads mapped to multiple loci",
    "Number of reads unmapped: too many mismatches",
    "Number of reads unmapped: too short",
    "Number of reads unmapped: other",
];

pub const NON_UNIQUE_CATEGORIES: [(&str, &str); 5] = [
    ("% of reads mapped to multiple loci", "Mapped to multiple loci"),
    ("% of reads mapped to too many loci", "Mapped to too many loci"),
    ("% of reads unmapped: too many mismatches", "Unmapped: too many mismatches"),
    ("% of reads unmapped: too short", "Unmapped: too short"),
    ("% of reads unmapped: other", "Unmapped: other"),
];

pub const CUFFLINKS_STAGE: &str = "cufflinks";
pub const CUFFLINKS_FOLDER: &str = "cufflinks";
const CUFFLINKS_ENTRANCES: &[&str] = &["rna_seq/cufflinks.html"];
const CUFFLINKS_RAW_OUTPUTS: &[&str] = &[
    "genes.fpkm_tracking",
    "isoforms.fpkm_tracking",
    "run_cufflinks.log",
    "skipped.gtf",
    "transcripts.gtf",
];

pub const CUFFDIFF_STAGE: &str = "cuffdiff";
pub const CUFFDIFF_FOLDER: &str = "cuffdiff";
const CUFFDIFF_ENTRANCES: &[&str] = &["rna_seq/cuffdiff.html"];
const CUFFDIFF_RAW_OUTPUTS: &[&str] = &[
    // isoform
    "isoform_exp.diff",
    "isoforms.count_tracking",
    "isoforms.fpkm_tracking",
    "isoforms.read_group_tracking",
    // gene
    "gene_exp.diff",
    "genes.count_tracking",
    "genes.fpkm_tracking",
    "genes.read_group_tracking",
    // cds
    "cds_exp.diff",
    "cds.count_tracking",
    "cds.fpkm_tracking",
    "cds.read_group_tracking",
    // tss
    "tss_group_exp.diff",
    "tss_groups.count_tracking",
    "tss_groups.fpkm_tracking",
    "tss_groups.read_group_tracking",
    // diff
    "cds.diff",
    "promoters.diff",
    "splicing.diff",
    // info
    "run.info",
    "read_groups.info",
    "bias_params.info",
    "var_model.info",
    "run_cuffdiff.log",
];

pub const RNA_SEQ_HOME_STAGE: &str = "rna_seq_home";
const RNA_SEQ_HOME_ENTRANCES: &[&str] = &["rna_seq/index.html"];
const RNA_SEQ_PAGES: &[(&str, &str, &str)] = &[
    (FASTQC_STAGE, "fastqc.html", "FastQC"),
    (STAR_STAGE, "star.html", "STAR alignment"),
    (CUFFLINKS_STAGE, "cufflinks.html", "Cufflinks"),
    (CUFFDIFF_STAGE, "cuffdiff.html", "Cuffdiff"),
];

pub fn rna_seq_report() -> ReportDefinition {
    ReportDefinition {
        name: PIPELINE_NAME,
        stages: vec![
            fastqc_stage(),
            star_stage(),
            cufflinks_stage(),
            cuffdiff_stage(),
            rna_seq_home_stage(),
        ],
        static_roots: vec![
            StaticRoot::Embedded(BASE_STATIC),
            StaticRoot::Embedded(RNA_SEQ_STATIC),
        ],
    }
}

pub fn star_stage() -> Stage {
    Stage::tool(STAR_STAGE, STAR_FOLDER, STAR_ENTRANCES)
        .with_parse(parse_star)
        .with_context(star_context)
}

pub fn cufflinks_stage() -> Stage {
    Stage::tool(CUFFLINKS_STAGE, CUFFLINKS_FOLDER, CUFFLINKS_ENTRANCES)
        .with_parse(parse_cufflinks)
        .with_sample_static(StaticGroup::new("{sample}", "*.png", "cufflinks/{sample}"))
}

pub fn cuffdiff_stage() -> Stage {
    Stage::tool(CUFFDIFF_STAGE, CUFFDIFF_FOLDER, CUFFDIFF_ENTRANCES)
        .with_parse(parse_cuffdiff)
        .with_joint_static(StaticGroup::new("plots", "*.png", "cuffdiff/plots"))
        .with_condition_static(StaticGroup::new(
            "plots/{condition}",
            "*.png",
            "cuffdiff/{condition}",
        ))
}

pub fn rna_seq_home_stage() -> Stage {
    Stage::summary(RNA_SEQ_HOME_STAGE, RNA_SEQ_HOME_ENTRANCES).with_context(rna_seq_home_context)
}

fn parse_star(stage: &Stage, info: &AnalysisInfo, _: &StageDataMap) -> Result<DataInfo> {
    let folder = stage.result_folder(info)?;
    let folder_name = stage.result_folder_dir_name(info)?;

    let mut logs = Vec::with_capacity(info.samples.len());
    for sample in info.sample_names() {
        let expected = folder.join(sample).join(STAR_LOG_FILE);
        let log_path = plain_or_gz(&expected).ok_or_else(|| {
            ReportError::fs(
                &expected,
                io::Error::new(io::ErrorKind::NotFound, "STAR final log not found"),
            )
        })?;
        tracing::debug!("parsing STAR log {}", log_path.display());
        logs.push((sample, read_star_log(&log_path)?));
    }

    let mut align_stats = Map::new();
    for (sample, log) in &logs {
        align_stats.insert(sample.to_string(), serde_json::to_value(log)?);
    }

    let mut data = DataInfo::new();
    data.insert("samples".to_string(), json!(info.sample_names().collect::<Vec<_>>()));
    data.insert("align_stats".to_string(), Value::Object(align_stats));
    data.insert("summary_table".to_string(), summary_table(&logs));
    data.insert("mapping_breakdown".to_string(), mapping_breakdown(&logs));
    data.insert(
        "raw_output".to_string(),
        Value::Object(sample_raw_output_links(
            &folder_name,
            info.sample_names(),
            STAR_RAW_OUTPUTS,
        )),
    );
    Ok(data)
}

fn summary_table(logs: &[(&str, StarLog)]) -> Value {
    let rows = STAR_SUMMARY_METRICS
        .iter()
        .map(|metric| {
            let values = logs
                .iter()
                .map(|(_, log)| {
                    log.get(*metric)
                        .map(LogValue::display)
                        .unwrap_or_else(|| "-".to_string())
                })
                .collect::<Vec<_>>();
            json!({ "metric": metric, "values": values })
        })
        .collect();
    Value::Array(rows)
}

pub fn mapping_breakdown(logs: &[(&str, StarLog)]) -> Value {
    let percent = |log: &StarLog, label: &str| {
        log.get(label)
            .and_then(LogValue::as_f64)
            .map(|v| v * 100.0)
            .unwrap_or(0.0)
    };
    let series = NON_UNIQUE_CATEGORIES
        .iter()
        .rev()
        .map(|(label, _)| {
            let values = logs.iter().map(|(_, log)| percent(log, *label)).collect::<Vec<_>>();
            json!({ "category": label, "values": values })
        })
        .collect::<Vec<_>>();
    let unique = logs
        .iter()
        .map(|(_, log)| percent(log, UNIQUE_MAPPED_FRACTION))
        .collect::<Vec<_>>();
    json!({ "unique": unique, "series": series })
}

fn star_context(context: &mut RenderContext) {
    let names = NON_UNIQUE_CATEGORIES
        .iter()
        .map(|(label, name)| (label.to_string(), Value::String(name.to_string())))
        .collect();
    context.insert("MAPPING_DISPLAY_NAMES".to_string(), Value::Object(names));
    let unmapped_counts = UNMAPPED_REASONS
        .iter()
        .map(|reason| unmapped_count_label(reason))
        .collect::<Vec<_>>();
    context.insert("UNMAPPED_COUNT_LABELS".to_string(), json!(unmapped_counts));
}

fn parse_cufflinks(stage: &Stage, info: &AnalysisInfo, _: &StageDataMap) -> Result<DataInfo> {
    let folder_name = stage.result_folder_dir_name(info)?;
    let mut data = DataInfo::new();
    data.insert(
        "raw_output".to_string(),
        Value::Object(sample_raw_output_links(
            &folder_name,
            info.sample_names(),
            CUFFLINKS_RAW_OUTPUTS,
        )),
    );
    Ok(data)
}

fn parse_cuffdiff(stage: &Stage, info: &AnalysisInfo, _: &StageDataMap) -> Result<DataInfo> {
    let folder_name = stage.result_folder_dir_name(info)?;
    let mut data = DataInfo::new();
    data.insert(
        "raw_output".to_string(),
        Value::Object(raw_output_links(&folder_name, CUFFDIFF_RAW_OUTPUTS)),
    );
    Ok(data)
}

fn rna_seq_home_context(context: &mut RenderContext) {
    let pages = available_pages(context, RNA_SEQ_PAGES);
    let alignment = context
        .get(crate::pipeline::stage::JOINT_DATA_INFO_KEY)
        .and_then(|joint| joint.get(STAR_STAGE))
        .and_then(|star| star.get("align_stats"))
        .and_then(Value::as_object)
        .map(|stats| {
            stats
                .iter()
                .map(|(sample, log)| {
                    json!({
                        "sample": sample,
                        "input_reads": log.get(TOTAL_INPUT_READS).cloned().unwrap_or(Value::Null),
                        "unique_percent": log
                            .get(UNIQUE_MAPPED_FRACTION)
                            .and_then(Value::as_f64)
                            .map(|v| format!("{:.2}%", v * 100.0)),
                    })
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    context.insert("pages".to_string(), pages);
    context.insert("alignment_overview".to_string(), Value::Array(alignment));
    context.insert("STATUS_ICONS".to_string(), status_icons());
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipelines/rna_seq.rs"]
mod tests;
