use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{ReportError, Result};
use crate::input::{AnalysisInfo, locate_result_folder};
use crate::pipeline::static_assets::{
    CONDITION_PLACEHOLDER, SAMPLE_PLACEHOLDER, StaticGroup, StaticGroups, copy_static_group,
};
use crate::pipeline::{DataInfo, STATIC_DIR};
use crate::render::{RenderContext, Templates};

pub const DATA_INFO_KEY: &str = "data_info";
pub const JOINT_DATA_INFO_KEY: &str = "joint_data_info";
pub const ANALYSIS_INFO_KEY: &str = "analysis_info";

pub type StageDataMap = IndexMap<String, Option<DataInfo>>;

pub type ParseFn = fn(&Stage, &AnalysisInfo, &StageDataMap) -> Result<DataInfo>;
pub type ContextFn = fn(&mut RenderContext);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Tool,
    Summary,
}

#[derive(Debug, Clone, Copy)]
pub enum StageInput<'a> {
    Own(&'a DataInfo),
    Joint(&'a StageDataMap),
}

#[derive(Debug, Clone)]
pub struct Stage {
    pub name: &'static str,
    pub kind: StageKind,
    pub result_folder_name: &'static str,
    pub template_entrances: &'static [&'static str],
    pub parse: ParseFn,
    pub extend_context: ContextFn,
    pub static_groups: StaticGroups,
}

pub fn no_data(_: &Stage, _: &AnalysisInfo, _: &StageDataMap) -> Result<DataInfo> {
    Ok(DataInfo::new())
}

pub fn no_extra_context(_: &mut RenderContext) {}

impl Stage {
    pub fn tool(
        name: &'static str,
        result_folder_name: &'static str,
        template_entrances: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            kind: StageKind::Tool,
            result_folder_name,
            template_entrances,
            parse: no_data,
            extend_context: no_extra_context,
            static_groups: StaticGroups::default(),
        }
    }

    pub fn summary(name: &'static str, template_entrances: &'static [&'static str]) -> Self {
        Self {
            name,
            kind: StageKind::Summary,
            result_folder_name: "",
            template_entrances,
            parse: no_data,
            extend_context: no_extra_context,
            static_groups: StaticGroups::default(),
        }
    }

    pub fn with_parse(mut self, parse: ParseFn) -> Self {
        self.parse = parse;
        self
    }

    pub fn with_context(mut self, extend_context: ContextFn) -> Self {
        self.extend_context = extend_context;
        self
    }

    pub fn with_joint_static(mut self, group: StaticGroup) -> Self {
        self.static_groups.joint = Some(group);
        self
    }

    pub fn with_condition_static(mut self, group: StaticGroup) -> Self {
        self.static_groups.per_condition = Some(group);
        self
    }

    pub fn with_sample_static(mut self, group: StaticGroup) -> Self {
        self.static_groups.per_sample = Some(group);
        self
    }

    pub fn is_summary(&self) -> bool {
        self.kind == StageKind::Summary
    }

    // Summary stages are not tied to one tool and resolve to the analysis
    // root itself.
    pub fn result_folder(&self, info: &AnalysisInfo) -> Result<PathBuf> {
        match self.kind {
            StageKind::Summary => Ok(info.result_root.clone()),
            StageKind::Tool => locate_result_folder(&info.result_root, self.result_folder_name),
        }
    }

    pub fn result_folder_dir_name(&self, info: &AnalysisInfo) -> Result<String> {
        let folder = self.result_folder(info)?;
        Ok(folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default())
    }

    pub fn parse(&self, info: &AnalysisInfo, parsed: &StageDataMap) -> Result<DataInfo> {
        (self.parse)(self, info, parsed)
    }

    pub fn context_data(&self, info: &AnalysisInfo, input: StageInput<'_>) -> Result<RenderContext> {
        let mut context = RenderContext::new();
        context.insert(ANALYSIS_INFO_KEY.to_string(), serde_json::to_value(info)?);
        match input {
            StageInput::Own(data) => {
                context.insert(DATA_INFO_KEY.to_string(), Value::Object(data.clone()));
            }
            StageInput::Joint(all) => {
                context.insert(JOINT_DATA_INFO_KEY.to_string(), serde_json::to_value(all)?);
            }
        }
        (self.extend_context)(&mut context);
        Ok(context)
    }

    pub fn render(
        &self,
        info: &AnalysisInfo,
        input: StageInput<'_>,
        report_root: &Path,
        templates: &Templates,
    ) -> Result<Vec<PathBuf>> {
        let context = self.context_data(info, input)?;
        let mut written = Vec::with_capacity(self.template_entrances.len());
        for entrance in self.template_entrances {
            let file_name = Path::new(entrance).file_name().ok_or_else(|| {
                ReportError::Configuration(format!(
                    "template entrance `{entrance}` of stage {} has no file name",
                    self.name
                ))
            })?;
            let html = templates.render(entrance, &context)?;
            let out_path = report_root.join(file_name);
            std::fs::write(&out_path, html).map_err(|e| ReportError::fs(&out_path, e))?;
            tracing::debug!("stage {} rendered {}", self.name, out_path.display());
            written.push(out_path);
        }
        Ok(written)
    }

    pub fn copy_static(&self, info: &AnalysisInfo, report_root: &Path) -> Result<usize> {
        let groups = &self.static_groups;
        if groups.joint.is_none() && groups.per_condition.is_none() && groups.per_sample.is_none() {
            return Ok(0);
        }
        let folder = self.result_folder(info)?;
        let static_root = report_root.join(STATIC_DIR);

        let mut copied = 0usize;
        if let Some(group) = &groups.joint {
            copied += copy_static_group(group, &folder, &static_root, None)?;
        }
        if let Some(group) = &groups.per_condition {
            for condition in info.condition_names() {
                copied += copy_static_group(
                    group,
                    &folder,
                    &static_root,
                    Some((CONDITION_PLACEHOLDER, condition)),
                )?;
            }
        }
        if let Some(group) = &groups.per_sample {
            for sample in info.sample_names() {
                copied += copy_static_group(
                    group,
                    &folder,
                    &static_root,
                    Some((SAMPLE_PLACEHOLDER, sample)),
                )?;
            }
        }
        tracing::debug!("stage {} copied {copied} static files", self.name);
        Ok(copied)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage.rs"]
mod tests;
