use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{ReportError, Result};

pub const SAMPLE_PLACEHOLDER: &str = "{sample}";
pub const CONDITION_PLACEHOLDER: &str = "{condition}";

#[derive(Debug, Clone, Copy)]
pub struct EmbeddedFile {
    pub path: &'static str,
    pub contents: &'static [u8],
}

#[derive(Debug, Clone)]
pub enum StaticRoot {
    Embedded(&'static [EmbeddedFile]),
    Dir(PathBuf),
}

// Files matched by `pattern` under `<result folder>/<source_dir>` are copied
// to `static/<dest>`, keeping their path relative to `source_dir`. Both
// `source_dir` and `dest` may use `{sample}` or `{condition}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticGroup {
    pub source_dir: &'static str,
    pub pattern: &'static str,
    pub dest: &'static str,
}

impl StaticGroup {
    pub const fn new(source_dir: &'static str, pattern: &'static str, dest: &'static str) -> Self {
        Self {
            source_dir,
            pattern,
            dest,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticGroups {
    pub joint: Option<StaticGroup>,
    pub per_condition: Option<StaticGroup>,
    pub per_sample: Option<StaticGroup>,
}

pub fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ReportError::fs(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| ReportError::fs(path, e))
}

fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| ReportError::fs(parent, e))?;
    }
    fs::copy(src, dest).map_err(|e| ReportError::fs(src, e))?;
    Ok(())
}

pub fn merge_static_roots(roots: &[StaticRoot], dest: &Path) -> Result<usize> {
    fs::create_dir_all(dest).map_err(|e| ReportError::fs(dest, e))?;
    let mut copied = 0usize;
    for root in roots {
        match root {
            StaticRoot::Embedded(files) => {
                for file in files.iter() {
                    write_file(&dest.join(file.path), file.contents)?;
                    copied += 1;
                }
            }
            StaticRoot::Dir(dir) => {
                if !dir.is_dir() {
                    tracing::warn!("static root {} does not exist; skipping", dir.display());
                    continue;
                }
                for entry in WalkDir::new(dir).sort_by_file_name() {
                    let entry = entry.map_err(|e| {
                        let path = e.path().unwrap_or(dir).to_path_buf();
                        ReportError::fs(&path, e.into())
                    })?;
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let rel = entry.path().strip_prefix(dir).unwrap_or(entry.path());
                    copy_file(entry.path(), &dest.join(rel))?;
                    copied += 1;
                }
            }
        }
    }
    Ok(copied)
}

// A bound sample or condition name must stay a single path component.
fn check_binding(placeholder: &str, value: &str) -> Result<()> {
    let component = !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\'])
        && !Path::new(value).is_absolute();
    if component {
        Ok(())
    } else {
        Err(ReportError::Configuration(format!(
            "{placeholder} value `{value}` is not a plain folder name"
        )))
    }
}

pub fn copy_static_group(
    group: &StaticGroup,
    result_folder: &Path,
    static_root: &Path,
    binding: Option<(&str, &str)>,
) -> Result<usize> {
    if let Some((placeholder, value)) = binding {
        check_binding(placeholder, value)?;
    }
    let bind = |template: &str| match binding {
        Some((placeholder, value)) => template.replace(placeholder, value),
        None => template.to_string(),
    };
    let source_dir = result_folder.join(bind(group.source_dir));
    let dest_dir = static_root.join(bind(group.dest));

    let pattern = PathBuf::from(glob::Pattern::escape(&source_dir.to_string_lossy()))
        .join(group.pattern)
        .to_string_lossy()
        .into_owned();
    let paths = glob::glob(&pattern).map_err(|e| {
        ReportError::Configuration(format!("invalid static pattern {pattern}: {e}"))
    })?;

    let mut copied = 0usize;
    for path in paths {
        let path = path.map_err(|e| {
            let at = e.path().to_path_buf();
            ReportError::fs(&at, e.into())
        })?;
        if !path.is_file() {
            continue;
        }
        let rel = path.strip_prefix(&source_dir).unwrap_or(&path);
        copy_file(&path, &dest_dir.join(rel))?;
        copied += 1;
    }
    if copied == 0 {
        tracing::debug!("no static files matched {pattern}");
    }
    Ok(copied)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/static_assets.rs"]
mod tests;
