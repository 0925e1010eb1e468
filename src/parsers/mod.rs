use thiserror::Error;

pub mod fastqc;
pub mod star_log;

#[derive(Debug, Error)]
pub enum StatParseError {
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
    #[error("unknown module status `{status}` on line {line}")]
    UnknownStatus { line: usize, status: String },
    #[error("missing metric `{0}`")]
    MissingMetric(String),
    #[error("metric `{metric}` is not numeric: `{value}`")]
    NotNumeric { metric: String, value: String },
    #[error("missing column `{column}` in section `{section}`")]
    MissingColumn { section: String, column: String },
    #[error("read failure: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

// Words such as `inf` or `nan` are rejected.
pub fn coerce_number(raw: &str) -> Option<Number> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    if !body.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    if body.contains(['.', 'e', 'E']) {
        s.parse::<f64>().ok().map(Number::Float)
    } else {
        s.parse::<i64>().ok().map(Number::Int)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/parsers/tests.rs"]
mod tests;
