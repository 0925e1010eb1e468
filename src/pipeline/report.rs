use std::fs;
use std::path::{Path, PathBuf};

use tracing::Dispatch;

use crate::error::{ReportError, Result};
use crate::input::AnalysisInfo;
use crate::pipeline::static_assets::merge_static_roots;
use crate::pipeline::{REPORT_DIR, STATIC_DIR, Stage, StageDataMap, StageInput, StaticRoot};
use crate::render::Templates;

#[derive(Debug, Clone)]
pub struct ReportDefinition {
    pub name: &'static str,
    pub stages: Vec<Stage>,
    pub static_roots: Vec<StaticRoot>,
}

pub struct Report {
    name: &'static str,
    stages: Vec<Stage>,
    static_roots: Vec<StaticRoot>,
    analysis_info: AnalysisInfo,
    templates: Templates,
    data_info: StageDataMap,
    dispatch: Dispatch,
}

impl Report {
    pub fn new(
        definition: ReportDefinition,
        analysis_info: AnalysisInfo,
        templates: Templates,
        dispatch: Dispatch,
    ) -> Self {
        let data_info = definition
            .stages
            .iter()
            .filter(|s| !s.is_summary())
            .map(|s| (s.name.to_string(), None))
            .collect();
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::debug!(
                "report {} initiated with {} stages",
                definition.name,
                definition.stages.len()
            );
        });
        Self {
            name: definition.name,
            stages: definition.stages,
            static_roots: definition.static_roots,
            analysis_info,
            templates,
            data_info,
            dispatch,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    #[cfg(test)]
    pub fn analysis_info(&self) -> &AnalysisInfo {
        &self.analysis_info
    }

    #[cfg(test)]
    pub fn data_info(&self) -> &StageDataMap {
        &self.data_info
    }

    pub fn tool_stages(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter().filter(|s| !s.is_summary())
    }

    pub fn summary_stages(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter().filter(|s| s.is_summary())
    }

    // Each stage sees the data of the stages before it.
    pub fn parse(&mut self) -> Result<()> {
        let dispatch = self.dispatch.clone();
        tracing::dispatcher::with_default(&dispatch, || self.parse_stages())
    }

    fn parse_stages(&mut self) -> Result<()> {
        for stage in self.stages.iter().filter(|s| !s.is_summary()) {
            tracing::info!("parsing stage {}", stage.name);
            let data = stage.parse(&self.analysis_info, &self.data_info)?;
            self.data_info.insert(stage.name.to_string(), Some(data));
        }
        Ok(())
    }

    pub fn generate(&mut self, out_dir: &Path) -> Result<PathBuf> {
        let dispatch = self.dispatch.clone();
        tracing::dispatcher::with_default(&dispatch, || {
            let report_root = out_dir.join(REPORT_DIR);
            fs::create_dir(&report_root).map_err(|e| ReportError::fs(&report_root, e))?;
            tracing::info!("generating {} report in {}", self.name, report_root.display());

            self.parse()?;
            self.render_report(&report_root)?;
            self.copy_static(&report_root)?;
            Ok(report_root)
        })
    }

    fn render_report(&self, report_root: &Path) -> Result<()> {
        for stage in self.tool_stages() {
            let data = self
                .data_info
                .get(stage.name)
                .and_then(Option::as_ref)
                .ok_or_else(|| {
                    ReportError::Configuration(format!("stage {} has not been parsed", stage.name))
                })?;
            stage.render(
                &self.analysis_info,
                StageInput::Own(data),
                report_root,
                &self.templates,
            )?;
        }
        for stage in self.summary_stages() {
            stage.render(
                &self.analysis_info,
                StageInput::Joint(&self.data_info),
                report_root,
                &self.templates,
            )?;
        }
        Ok(())
    }

    fn copy_static(&self, report_root: &Path) -> Result<()> {
        let static_dir = report_root.join(STATIC_DIR);
        let merged = merge_static_roots(&self.static_roots, &static_dir)?;
        tracing::debug!("merged {merged} bundled static files");
        for stage in &self.stages {
            stage.copy_static(&self.analysis_info, report_root)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/report.rs"]
mod tests;
