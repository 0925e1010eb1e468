use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{ReportError, Result};

pub fn locate_result_folder(root: &Path, name: &str) -> Result<PathBuf> {
    let pattern = format!(r"^(\d+_|){}$", regex::escape(name));
    let re = Regex::new(&pattern)
        .map_err(|e| ReportError::Configuration(format!("invalid folder name {name}: {e}")))?;

    let mut matches = Vec::new();
    let entries = std::fs::read_dir(root).map_err(|e| ReportError::fs(root, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| ReportError::fs(root, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let file_name = entry.file_name();
        if re.is_match(&file_name.to_string_lossy()) {
            matches.push(path);
        }
    }
    matches.sort();

    match matches.len() {
        0 => Err(ReportError::Configuration(format!(
            "no result folder for stage {name} under {}",
            root.display()
        ))),
        1 => {
            let found = matches.remove(0);
            tracing::debug!("result folder for {name}: {}", found.display());
            Ok(found)
        }
        _ => {
            let names = matches
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect::<Vec<_>>();
            Err(ReportError::Configuration(format!(
                "ambiguous result folder for stage {name}: {}",
                names.join(", ")
            )))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/locate.rs"]
mod tests;
