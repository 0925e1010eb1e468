use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{ReportError, Result};
use crate::pipeline::ReportDefinition;

pub mod base;
pub mod rna_seq;

pub const RESULT_LINK_PREFIX: &str = "../result";

pub type PipelineConstructor = fn() -> ReportDefinition;

#[derive(Debug, Clone, Default)]
pub struct PipelineRegistry {
    constructors: IndexMap<&'static str, PipelineConstructor>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(base::PIPELINE_NAME, base::base_report);
        registry.register(rna_seq::PIPELINE_NAME, rna_seq::rna_seq_report);
        registry
    }

    pub fn register(&mut self, name: &'static str, constructor: PipelineConstructor) {
        self.constructors.insert(name, constructor);
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.constructors.keys().copied()
    }

    pub fn build(&self, name: &str) -> Result<ReportDefinition> {
        match self.constructors.get(name) {
            Some(constructor) => Ok(constructor()),
            None => Err(ReportError::Configuration(format!(
                "unknown pipeline `{name}` (available: {})",
                self.names().collect::<Vec<_>>().join(", ")
            ))),
        }
    }
}

pub fn raw_output_links(folder_name: &str, filenames: &[&str]) -> Map<String, Value> {
    filenames
        .iter()
        .map(|file| {
            (
                file.to_string(),
                Value::String(format!("{RESULT_LINK_PREFIX}/{folder_name}/{file}")),
            )
        })
        .collect()
}

pub fn sample_raw_output_links<'a>(
    folder_name: &str,
    samples: impl Iterator<Item = &'a str>,
    filenames: &[&str],
) -> Map<String, Value> {
    samples
        .map(|sample| {
            let links = raw_output_links(&format!("{folder_name}/{sample}"), filenames);
            (sample.to_string(), Value::Object(links))
        })
        .collect()
}

pub fn available_pages(context: &Map<String, Value>, pages: &[(&str, &str, &str)]) -> Value {
    let joint = context.get(crate::pipeline::stage::JOINT_DATA_INFO_KEY);
    let available = pages
        .iter()
        .filter(|(stage, _, _)| {
            joint
                .and_then(|j| j.get(*stage))
                .is_some_and(|data| !data.is_null())
        })
        .map(|(stage, page, title)| {
            serde_json::json!({ "stage": stage, "page": page, "title": title })
        })
        .collect();
    Value::Array(available)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipelines/tests.rs"]
mod tests;
