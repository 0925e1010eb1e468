use std::fmt;
use std::io::BufRead;
use std::path::Path;

use chrono::{Datelike, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::error::{ReportError, Result};
use crate::input::reader::open_maybe_gz;
use crate::parsers::{Number, StatParseError, coerce_number};

pub const TIMESTAMP_METRICS: [&str; 3] = ["Started job on", "Started mapping on", "Finished on"];
pub const TOTAL_INPUT_READS: &str = "Number of input reads";
pub const UNMAPPED_REASONS: [&str; 3] = ["too many mismatches", "too short", "other"];

const TIMESTAMP_FORMAT: &str = "%Y %b %d %H:%M:%S";
// Leap year, so "Feb 29" stamps still parse. Never surfaced.
const PLACEHOLDER_YEAR: i32 = 2000;
const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogTimestamp {
    pub month: u32,
    pub day: u32,
    pub time: NaiveTime,
}

impl LogTimestamp {
    pub fn parse(raw: &str) -> Option<Self> {
        let stamped = format!("{PLACEHOLDER_YEAR} {}", raw.trim());
        let dt = NaiveDateTime::parse_from_str(&stamped, TIMESTAMP_FORMAT).ok()?;
        Some(Self {
            month: dt.month(),
            day: dt.day(),
            time: dt.time(),
        })
    }
}

impl fmt::Display for LogTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let month = self
            .month
            .checked_sub(1)
            .and_then(|idx| MONTH_ABBR.get(idx as usize))
            .copied()
            .unwrap_or("???");
        write!(
            f,
            "{month} {:02} {}",
            self.day,
            self.time.format("%H:%M:%S")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Int(i64),
    Float(f64),
    Fraction(f64),
    Timestamp(LogTimestamp),
    Text(String),
}

impl LogValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LogValue::Int(v) => Some(*v as f64),
            LogValue::Float(v) | LogValue::Fraction(v) => Some(*v),
            LogValue::Timestamp(_) | LogValue::Text(_) => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            LogValue::Int(v) => v.to_string(),
            LogValue::Float(v) => format!("{v:.2}"),
            LogValue::Fraction(v) => format!("{:.2}%", v * 100.0),
            LogValue::Timestamp(ts) => ts.to_string(),
            LogValue::Text(s) => s.clone(),
        }
    }
}

impl Serialize for LogValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            LogValue::Int(v) => serializer.serialize_i64(*v),
            LogValue::Float(v) | LogValue::Fraction(v) => serializer.serialize_f64(*v),
            LogValue::Timestamp(ts) => serializer.collect_str(ts),
            LogValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

pub type StarLog = IndexMap<String, LogValue>;

pub fn unmapped_fraction_label(reason: &str) -> String {
    format!("% of reads unmapped: {reason}")
}

pub fn unmapped_count_label(reason: &str) -> String {
    format!("Number of reads unmapped: {reason}")
}

pub fn read_star_log(path: &Path) -> Result<StarLog> {
    let reader = open_maybe_gz(path)?;
    parse_star_log(reader).map_err(|e| ReportError::parse(path, e))
}

pub fn parse_star_log<R: BufRead>(reader: R) -> Result<StarLog, StatParseError> {
    let mut raw: IndexMap<String, String> = IndexMap::new();
    for line in reader.lines() {
        let line = line?;
        if let Some((label, value)) = line.split_once("|\t") {
            raw.insert(label.trim().to_string(), value.trim().to_string());
        }
    }

    let mut stats = StarLog::with_capacity(raw.len() + UNMAPPED_REASONS.len());
    for (label, value) in raw {
        let parsed = coerce_value(&label, value);
        stats.insert(label, parsed);
    }
    add_unmapped_counts(&mut stats)?;
    Ok(stats)
}

fn coerce_value(label: &str, value: String) -> LogValue {
    if let Some(pct) = value.strip_suffix('%') {
        return match coerce_number(pct) {
            Some(n) => LogValue::Fraction(n.as_f64() / 100.0),
            None => LogValue::Text(value),
        };
    }
    if TIMESTAMP_METRICS.contains(&label) {
        return match LogTimestamp::parse(&value) {
            Some(ts) => LogValue::Timestamp(ts),
            None => {
                tracing::debug!("keeping unparsable timestamp for {label}: {value}");
                LogValue::Text(value)
            }
        };
    }
    match coerce_number(&value) {
        Some(Number::Int(v)) => LogValue::Int(v),
        Some(Number::Float(v)) => LogValue::Float(v),
        None => LogValue::Text(value),
    }
}

fn add_unmapped_counts(stats: &mut StarLog) -> Result<(), StatParseError> {
    let total = match stats.get(TOTAL_INPUT_READS) {
        Some(LogValue::Int(v)) => *v as f64,
        Some(LogValue::Float(v)) => *v,
        Some(other) => {
            return Err(StatParseError::NotNumeric {
                metric: TOTAL_INPUT_READS.to_string(),
                value: other.display(),
            });
        }
        None => return Err(StatParseError::MissingMetric(TOTAL_INPUT_READS.to_string())),
    };

    for reason in UNMAPPED_REASONS {
        let label = unmapped_fraction_label(reason);
        let fraction = match stats.get(&label) {
            Some(LogValue::Fraction(v)) => *v,
            Some(other) => {
                return Err(StatParseError::NotNumeric {
                    metric: label,
                    value: other.display(),
                });
            }
            None => return Err(StatParseError::MissingMetric(label)),
        };
        stats.insert(
            unmapped_count_label(reason),
            LogValue::Int((fraction * total).round() as i64),
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/parsers/star_log.rs"]
mod tests;
