//! Trace reader: recorded frame streams as text
//!
//! Format, one frame per line:
//!   <timestamp_ms> <left> <right>
//! Each eye is a probability, `?` for unknown, or a negative raw value
//! (the tracker's uncomputed sentinel). Blank lines and `#` comments are skipped.

use std::io::BufRead;

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{EyeReading, FrameSample, TimedFrame};

lazy_static! {
    static ref RE_FRAME: Regex = Regex::new(
        r"^\s*(\d+)\s+(\?|-?\d+(?:\.\d+)?)\s+(\?|-?\d+(?:\.\d+)?)\s*$"
    ).unwrap();
}

/// Reasons a trace line was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TraceError {
    /// Line does not match `<ms> <left> <right>`
    T001_MALFORMED_LINE { line: usize },
    /// Probability above 1.0
    T002_PROBABILITY_OUT_OF_RANGE { line: usize },
    /// Reading the input failed
    T003_IO { line: usize, message: String },
}

impl TraceError {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::T001_MALFORMED_LINE { .. } => "T001_MALFORMED_LINE",
            Self::T002_PROBABILITY_OUT_OF_RANGE { .. } => "T002_PROBABILITY_OUT_OF_RANGE",
            Self::T003_IO { .. } => "T003_IO",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::T001_MALFORMED_LINE { .. } => "Expected '<timestamp_ms> <left> <right>'",
            Self::T002_PROBABILITY_OUT_OF_RANGE { .. } => "Eye probability must be at most 1.0",
            Self::T003_IO { .. } => "Failed to read trace input",
        }
    }

    /// 1-based line number of the offending input
    pub fn line(&self) -> usize {
        match self {
            Self::T001_MALFORMED_LINE { line }
            | Self::T002_PROBABILITY_OUT_OF_RANGE { line }
            | Self::T003_IO { line, .. } => *line,
        }
    }
}

impl std::fmt::Display for TraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}: {}", self.line(), self.code(), self.description())?;
        if let Self::T003_IO { message, .. } = self {
            write!(f, " ({})", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for TraceError {}

/// Parse one line. `Ok(None)` for blank lines and comments.
pub fn parse_line(text: &str, line: usize) -> Result<Option<TimedFrame>, TraceError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let caps = RE_FRAME
        .captures(trimmed)
        .ok_or(TraceError::T001_MALFORMED_LINE { line })?;

    let t_ms: u64 = caps[1]
        .parse()
        .map_err(|_| TraceError::T001_MALFORMED_LINE { line })?;
    let left = parse_eye(&caps[2], line)?;
    let right = parse_eye(&caps[3], line)?;

    Ok(Some(TimedFrame::new(t_ms, FrameSample::new(left, right))))
}

fn parse_eye(token: &str, line: usize) -> Result<EyeReading, TraceError> {
    if token == "?" {
        return Ok(EyeReading::Unknown);
    }
    let raw: f32 = token
        .parse()
        .map_err(|_| TraceError::T001_MALFORMED_LINE { line })?;
    if raw > 1.0 {
        return Err(TraceError::T002_PROBABILITY_OUT_OF_RANGE { line });
    }
    Ok(EyeReading::from_raw(raw))
}

/// Iterator over frames of a buffered reader
pub struct TraceReader<R: BufRead> {
    lines: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TimedFrame, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = self.lines.next()?;
            self.line += 1;
            let text = match text {
                Ok(text) => text,
                Err(e) => {
                    return Some(Err(TraceError::T003_IO {
                        line: self.line,
                        message: e.to_string(),
                    }))
                }
            };
            match parse_line(&text, self.line) {
                Ok(Some(frame)) => return Some(Ok(frame)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Render frames back into trace text
pub fn format_frames(frames: &[TimedFrame]) -> String {
    let mut out = String::new();
    for timed in frames {
        out.push_str(&format!(
            "{} {} {}\n",
            timed.t_ms,
            format_eye(timed.frame.left),
            format_eye(timed.frame.right)
        ));
    }
    out
}

fn format_eye(reading: EyeReading) -> String {
    match reading {
        EyeReading::Probability(p) => format!("{:.2}", p),
        EyeReading::Unknown => "?".to_string(),
    }
}
