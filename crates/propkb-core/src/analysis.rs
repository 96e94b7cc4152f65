//! Scanners over a structured RFP analysis: plain text with upper-case
//! markers such as `KEY REQUIREMENTS`, `DELIVERABLES` or `TIMELINE`, each
//! followed by one item per line.
//!
//! Every scanner sanitizes its input first. A missing marker yields an empty
//! list, except [`weighted_criteria`], which falls back to
//! [`DEFAULT_CRITERIA`].

use std::sync::OnceLock;

use regex::Regex;

use crate::sanitize::sanitize;

pub const KEY_REQUIREMENTS: &str = "KEY REQUIREMENTS";
pub const DELIVERABLES: &str = "DELIVERABLES";
pub const EVALUATION_CRITERIA: &str = "EVALUATION CRITERIA";
pub const CLIENT_PAIN_POINTS: &str = "CLIENT PAIN POINTS";
pub const TIMELINE: &str = "TIMELINE";
pub const REQUIRED_SECTIONS: &str = "REQUIRED SECTIONS";

/// Weights used when the analysis lists no evaluation criteria.
pub const DEFAULT_CRITERIA: [(&str, u32); 4] =
    [("Requirement Match", 40), ("Compliance", 25), ("Quality", 20), ("Alignment", 15)];

const DEADLINE_TERMS: [&str; 3] = ["deadline", "date", "due"];
const MANDATORY_TERMS: [&str; 2] = ["must", "required"];

struct Patterns {
    blank_line: Regex,
    weighted: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        blank_line: Regex::new(r"\n[ \t\r]*\n").expect("blank line pattern compiles"),
        weighted: Regex::new(r"^(.*?)\s*\((\d+)%\)\s*$").expect("weighted criterion pattern compiles"),
    })
}

/// Where a marker's block ends.
enum BlockEnd<'a> {
    /// The next occurrence of another marker.
    Marker(&'a str),
    /// The first blank line.
    BlankLine,
}

/// Text between `marker` and `end`, or `None` when the marker is absent.
/// Markup left on the marker's own line (`:`, `*`, `#`) is dropped. A
/// missing end runs to the end of the text.
fn block<'t>(text: &'t str, marker: &str, end: BlockEnd<'_>) -> Option<&'t str> {
    let start = text.find(marker)? + marker.len();
    let body = text[start..].trim_start_matches(|c: char| matches!(c, ':' | '*' | '#') || c.is_whitespace());
    let stop = match end {
        BlockEnd::Marker(next) => body.find(next),
        BlockEnd::BlankLine => patterns().blank_line.find(body).map(|m| m.start()),
    };
    Some(&body[..stop.unwrap_or(body.len())])
}

fn items(block: &str) -> impl Iterator<Item = &str> {
    block.lines().map(str::trim).filter(|line| !line.is_empty())
}

fn mentions_any(line: &str, terms: &[&str]) -> bool {
    let lower = line.to_lowercase();
    terms.iter().any(|term| lower.contains(term))
}

/// Requirement lines between `KEY REQUIREMENTS` and `DELIVERABLES` that say
/// "must" or "required".
pub fn mandatory_criteria(analysis: &str) -> Vec<String> {
    let cleaned = sanitize(analysis);
    let Some(text) = block(&cleaned, KEY_REQUIREMENTS, BlockEnd::Marker(DELIVERABLES)) else {
        return Vec::new();
    };
    items(text).filter(|line| mentions_any(line, &MANDATORY_TERMS)).map(str::to_string).collect()
}

/// `Name (40%)` lines between `EVALUATION CRITERIA` and `CLIENT PAIN POINTS`.
/// A line without a percentage weighs 100.
pub fn weighted_criteria(analysis: &str) -> Vec<(String, u32)> {
    let cleaned = sanitize(analysis);
    let found: Vec<(String, u32)> = block(&cleaned, EVALUATION_CRITERIA, BlockEnd::Marker(CLIENT_PAIN_POINTS))
        .map(|text| items(text).map(weighted_line).collect())
        .unwrap_or_default();
    if found.is_empty() {
        return DEFAULT_CRITERIA.iter().map(|&(name, weight)| (name.to_string(), weight)).collect();
    }
    found
}

fn weighted_line(line: &str) -> (String, u32) {
    patterns()
        .weighted
        .captures(line)
        .and_then(|caps| {
            let weight = caps.get(2)?.as_str().parse().ok()?;
            Some((caps.get(1)?.as_str().trim().to_string(), weight))
        })
        .unwrap_or_else(|| (line.to_string(), 100))
}

/// Timeline lines mentioning a deadline, date or due date.
pub fn deadlines(analysis: &str) -> Vec<String> {
    let cleaned = sanitize(analysis);
    let Some(text) = block(&cleaned, TIMELINE, BlockEnd::BlankLine) else {
        return Vec::new();
    };
    items(text).filter(|line| mentions_any(line, &DEADLINE_TERMS)).map(str::to_string).collect()
}

pub fn deliverables(analysis: &str) -> Vec<String> {
    lines_under(analysis, DELIVERABLES)
}

/// Section names the RFP asks the proposal to contain.
pub fn required_sections(analysis: &str) -> Vec<String> {
    lines_under(analysis, REQUIRED_SECTIONS)
}

fn lines_under(analysis: &str, marker: &str) -> Vec<String> {
    let cleaned = sanitize(analysis);
    block(&cleaned, marker, BlockEnd::BlankLine)
        .map(|text| items(text).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Everything the scanners find in one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RfpAnalysis {
    pub required_sections: Vec<String>,
    pub mandatory_criteria: Vec<String>,
    pub weighted_criteria: Vec<(String, u32)>,
    pub deliverables: Vec<String>,
    pub deadlines: Vec<String>,
}

impl RfpAnalysis {
    pub fn scan(analysis: &str) -> Self {
        Self {
            required_sections: required_sections(analysis),
            mandatory_criteria: mandatory_criteria(analysis),
            weighted_criteria: weighted_criteria(analysis),
            deliverables: deliverables(analysis),
            deadlines: deadlines(analysis),
        }
    }
}
