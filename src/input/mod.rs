use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ReportError, Result};

pub mod locate;
pub mod reader;

pub use locate::locate_result_folder;
use reader::{open_maybe_gz, plain_or_gz};

pub const ANALYSIS_INFO_FILE: &str = "analysis_info.yaml";

pub type SampleMeta = serde_json::Value;

// Types no bundled stage reads (GTF, BED, ...) are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileType {
    Fasta,
    Fastq,
    Sam,
    Bam,
    Other(String),
}

impl FileType {
    pub fn as_str(&self) -> &str {
        match self {
            FileType::Fasta => "FASTA",
            FileType::Fastq => "FASTQ",
            FileType::Sam => "SAM",
            FileType::Bam => "BAM",
            FileType::Other(name) => name,
        }
    }
}

impl From<String> for FileType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "FASTA" => FileType::Fasta,
            "FASTQ" => FileType::Fastq,
            "SAM" => FileType::Sam,
            "BAM" => FileType::Bam,
            _ => FileType::Other(name),
        }
    }
}

impl From<FileType> for String {
    fn from(file_type: FileType) -> Self {
        match file_type {
            FileType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSource {
    pub name: String,
    pub path: PathBuf,
    pub file_type: FileType,
    pub strand: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisInfo {
    pub result_root: PathBuf,
    pub data_sources: BTreeMap<String, DataSource>,
    pub conditions: IndexMap<String, IndexMap<String, SampleMeta>>,
    pub samples: IndexMap<String, SampleMeta>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysisInfo {
    data_sources: Vec<IndexMap<String, RawDataSource>>,
    conditions: Vec<IndexMap<String, Vec<IndexMap<String, SampleMeta>>>>,
}

#[derive(Debug, Deserialize)]
struct RawDataSource {
    path: PathBuf,
    #[serde(rename = "type")]
    file_type: FileType,
    #[serde(deserialize_with = "required_nullable")]
    strand: Option<String>,
}

fn required_nullable<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

impl AnalysisInfo {
    pub fn load(job_dir: &Path) -> Result<Self> {
        let result_root = job_dir.canonicalize().map_err(|e| {
            ReportError::Configuration(format!(
                "analysis root {} is not accessible: {e}",
                job_dir.display()
            ))
        })?;
        let info_path = plain_or_gz(&result_root.join(ANALYSIS_INFO_FILE)).ok_or_else(|| {
            ReportError::Configuration(format!(
                "missing {} under {}",
                ANALYSIS_INFO_FILE,
                result_root.display()
            ))
        })?;
        tracing::debug!("reading analysis info from {}", info_path.display());

        let mut yaml = String::new();
        open_maybe_gz(&info_path)?
            .read_to_string(&mut yaml)
            .map_err(|e| ReportError::fs(&info_path, e))?;
        Self::from_yaml_str(&result_root, &yaml)
    }

    pub fn from_yaml_str(result_root: &Path, yaml: &str) -> Result<Self> {
        let raw: RawAnalysisInfo = serde_yaml::from_str(yaml)
            .map_err(|e| ReportError::Configuration(format!("{ANALYSIS_INFO_FILE}: {e}")))?;
        Self::from_raw(result_root.to_path_buf(), raw)
    }

    fn from_raw(result_root: PathBuf, raw: RawAnalysisInfo) -> Result<Self> {
        let mut data_sources = BTreeMap::new();
        for entry in raw.data_sources {
            let (name, source) = first_entry(entry, "data_sources")?;
            data_sources.insert(
                name.clone(),
                DataSource {
                    name,
                    path: source.path,
                    file_type: source.file_type,
                    strand: source.strand,
                },
            );
        }

        let mut conditions = IndexMap::new();
        for entry in raw.conditions {
            let (condition, samples) = first_entry(entry, "conditions")?;
            let mut condition_samples = IndexMap::new();
            for sample in samples {
                condition_samples.extend(sample);
            }
            conditions.insert(condition, condition_samples);
        }

        let samples = flatten_samples(&conditions);

        Ok(Self {
            result_root,
            data_sources,
            conditions,
            samples,
        })
    }

    pub fn sample_names(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(String::as_str)
    }

    pub fn condition_names(&self) -> impl Iterator<Item = &str> {
        self.conditions.keys().map(String::as_str)
    }

    pub fn sources_of_type(&self, accepted: &[FileType]) -> BTreeMap<PathBuf, &DataSource> {
        self.data_sources
            .values()
            .filter(|s| accepted.contains(&s.file_type))
            .map(|s| (PathBuf::from(&s.name), s))
            .collect()
    }
}

fn first_entry<V>(entry: IndexMap<String, V>, section: &str) -> Result<(String, V)> {
    entry.into_iter().next().ok_or_else(|| {
        ReportError::Configuration(format!("empty entry in `{section}` of analysis info"))
    })
}

// A sample listed under two conditions keeps its first position and takes the
// later metadata.
pub fn flatten_samples(
    conditions: &IndexMap<String, IndexMap<String, SampleMeta>>,
) -> IndexMap<String, SampleMeta> {
    let mut samples = IndexMap::new();
    for (condition, condition_samples) in conditions {
        for (name, meta) in condition_samples {
            if samples.insert(name.clone(), meta.clone()).is_some() {
                tracing::warn!(
                    "sample {name} appears in more than one condition; keeping metadata from {condition}"
                );
            }
        }
    }
    samples
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
