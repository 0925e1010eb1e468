use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Serialize;
use zip::ZipArchive;

use crate::error::{ReportError, Result};
use crate::parsers::{StatParseError, coerce_number};

const SECTION_START: &str = ">>";
const SECTION_END: &str = ">>END_MODULE";
const DATA_MEMBER: &str = "fastqc_data.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStatus {
    Pass,
    Warn,
    Fail,
}

impl FromStr for ModuleStatus {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pass" => Ok(ModuleStatus::Pass),
            "warn" => Ok(ModuleStatus::Warn),
            "fail" => Ok(ModuleStatus::Fail),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FastqcReport {
    pub statuses: IndexMap<String, ModuleStatus>,
    pub sections: IndexMap<String, Vec<Vec<String>>>,
}

impl FastqcReport {
    pub fn numeric_column(
        &self,
        section: &str,
        column: &str,
    ) -> Result<Vec<(String, f64)>, StatParseError> {
        let Some((header, rows)) = self.sections.get(section).and_then(|r| r.split_first())
        else {
            return Ok(Vec::new());
        };
        let col = header
            .iter()
            .position(|h| h.trim_start_matches('#') == column)
            .ok_or_else(|| StatParseError::MissingColumn {
                section: section.to_string(),
                column: column.to_string(),
            })?;

        let mut series = Vec::with_capacity(rows.len());
        for row in rows {
            let label = row.first().cloned().unwrap_or_default();
            let raw = row.get(col).map(String::as_str).unwrap_or("");
            let value = coerce_number(raw).ok_or_else(|| StatParseError::NotNumeric {
                metric: format!("{section} / {column} at {label}"),
                value: raw.to_string(),
            })?;
            series.push((label, value.as_f64()));
        }
        Ok(series)
    }
}

pub fn read_fastqc_archive(zip_path: &Path) -> Result<FastqcReport> {
    let folder = zip_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let member = format!("{folder}/{DATA_MEMBER}");

    let file = File::open(zip_path).map_err(|e| ReportError::fs(zip_path, e))?;
    let archive_err = |source: zip::result::ZipError| ReportError::Archive {
        path: zip_path.to_path_buf(),
        source,
    };
    let mut archive = ZipArchive::new(file).map_err(archive_err)?;
    let entry = archive.by_name(&member).map_err(archive_err)?;
    parse_fastqc_data(BufReader::new(entry)).map_err(|e| ReportError::parse(zip_path, e))
}

pub fn parse_fastqc_data<R: BufRead>(reader: R) -> Result<FastqcReport, StatParseError> {
    let mut report = FastqcReport::default();
    let mut current: Option<String> = None;

    // The first line is the version banner.
    for (idx, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        let line_no = idx + 1;
        let line = line.trim_end_matches('\r');

        if line.starts_with(SECTION_END) {
            if current.take().is_none() {
                return Err(StatParseError::Malformed {
                    line: line_no,
                    message: "module end without a matching start".to_string(),
                });
            }
            continue;
        }

        if let Some(header) = line.strip_prefix(SECTION_START) {
            if let Some(open) = &current {
                return Err(StatParseError::Malformed {
                    line: line_no,
                    message: format!("module `{open}` is not closed"),
                });
            }
            let (title, status) =
                header
                    .rsplit_once('\t')
                    .ok_or_else(|| StatParseError::Malformed {
                        line: line_no,
                        message: "module header has no status".to_string(),
                    })?;
            let status = status
                .trim()
                .parse::<ModuleStatus>()
                .map_err(|_| StatParseError::UnknownStatus {
                    line: line_no,
                    status: status.trim().to_string(),
                })?;
            report.statuses.insert(title.to_string(), status);
            report.sections.insert(title.to_string(), Vec::new());
            current = Some(title.to_string());
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }
        match current.as_ref().and_then(|t| report.sections.get_mut(t)) {
            Some(rows) => rows.push(line.split('\t').map(str::to_string).collect()),
            None => {
                return Err(StatParseError::Malformed {
                    line: line_no,
                    message: "data row outside of a module".to_string(),
                });
            }
        }
    }

    if let Some(open) = current {
        return Err(StatParseError::Malformed {
            line: 0,
            message: format!("module `{open}` is not closed at end of file"),
        });
    }
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/src_inline/parsers/fastqc.rs"]
mod tests;
