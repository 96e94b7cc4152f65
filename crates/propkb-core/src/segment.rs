//! Split documents into named sections.
//!
//! Two modes share one accumulate-and-flush loop:
//! - [`segment_markdown`] for knowledge-base files with `#`/`##` headings
//! - [`segment_rfp`] for unstructured RFP prose, where headings are guessed
//!   from the shape of a line
//!
//! A section opened by an explicit heading is kept even when no body text
//! follows it. The implicit leading section is only kept when it has text.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::sanitize::sanitize;

/// Ordered `section name -> section text`. Repeated names overwrite the
/// earlier body and keep the first position.
pub type Sections = IndexMap<String, String>;

pub const MARKDOWN_DEFAULT_SECTION: &str = "Introduction";
pub const RFP_DEFAULT_SECTION: &str = "Overview";

struct Accumulator {
    sections: Sections,
    current: String,
    explicit: bool,
    lines: Vec<String>,
}

impl Accumulator {
    fn new(default_name: &str) -> Self {
        Self { sections: Sections::new(), current: default_name.to_string(), explicit: false, lines: Vec::new() }
    }

    fn heading(&mut self, name: &str) {
        self.flush();
        self.current = sanitize(name.trim());
        self.explicit = true;
    }

    fn line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn flush(&mut self) {
        if self.explicit || !self.lines.is_empty() {
            let body = self.lines.join("\n");
            self.sections.insert(self.current.clone(), body);
        }
        self.lines.clear();
    }

    fn finish(mut self) -> Sections {
        self.flush();
        self.sections
    }
}

/// Segment a markdown document on `# ` and `## ` headings.
///
/// `"# A\nfoo\n## B\nbar\nbaz"` yields `{"A": "foo", "B": "bar\nbaz"}`.
pub fn segment_markdown(text: &str) -> Sections {
    if text.trim().is_empty() {
        return Sections::new();
    }
    let mut acc = Accumulator::new(MARKDOWN_DEFAULT_SECTION);
    for line in text.lines() {
        if let Some(name) = line.strip_prefix("# ").or_else(|| line.strip_prefix("## ")) {
            acc.heading(name);
        } else {
            acc.line(line);
        }
    }
    acc.finish()
}

fn rfp_heading_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"^(?:\d+\.)?(?:\d+\.)?(?:\d+\.)?\s*([A-Z][A-Za-z\s]+)$"),
            Regex::new(r"^([A-Z][A-Z\s]+)(?::|\.)?\s*$"),
            Regex::new(r"^(?:Section|SECTION)\s+\d+\s*[:\-.]\s*([A-Za-z\s]+)$"),
        ]
        .map(|re| re.expect("RFP heading pattern compiles"))
    })
}

/// Heading name for an RFP line, if the line looks like one.
pub fn rfp_heading(line: &str) -> Option<String> {
    let line = line.trim();
    rfp_heading_patterns()
        .iter()
        .find_map(|re| re.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Segment unstructured RFP text using line-shape heuristics: a capitalised
/// phrase on its own line (optionally numbered), an ALL-CAPS line, or a
/// `Section N:` prefix. Never fails; text without headings lands in
/// `Overview`.
pub fn segment_rfp(text: &str) -> Sections {
    let cleaned = sanitize(text);
    if cleaned.trim().is_empty() {
        return Sections::new();
    }
    let mut acc = Accumulator::new(RFP_DEFAULT_SECTION);
    for line in cleaned.lines() {
        match rfp_heading(line) {
            Some(name) => acc.heading(&name),
            None => acc.line(line),
        }
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(sections: &Sections) -> Vec<(&str, &str)> {
        sections.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[test]
    fn flushes_on_heading() {
        let s = segment_markdown("# A\nfoo\n## B\nbar\nbaz");
        assert_eq!(pairs(&s), vec![("A", "foo"), ("B", "bar\nbaz")]);
    }

    #[test]
    fn leading_text_goes_to_introduction() {
        let s = segment_markdown("preamble\n# Scope\nwork");
        assert_eq!(pairs(&s), vec![("Introduction", "preamble"), ("Scope", "work")]);
    }

    #[test]
    fn consecutive_headings_keep_empty_section() {
        let s = segment_markdown("# Cover\n## Summary\ntext\n# Annex");
        assert_eq!(pairs(&s), vec![("Cover", ""), ("Summary", "text"), ("Annex", "")]);
    }

    #[test]
    fn deeper_headings_stay_in_body() {
        let s = segment_markdown("# Pricing\n### Detail\nRs. 10\n");
        assert_eq!(pairs(&s), vec![("Pricing", "### Detail\nRs. 10")]);
    }

    #[test]
    fn repeated_name_overwrites_in_place() {
        let s = segment_markdown("# A\none\n# B\ntwo\n# A\nthree");
        assert_eq!(pairs(&s), vec![("A", "three"), ("B", "two")]);
    }

    #[test]
    fn blank_document_has_no_sections() {
        assert!(segment_markdown("").is_empty());
        assert!(segment_markdown("  \n\n").is_empty());
    }

    #[test]
    fn heading_names_are_sanitized() {
        let s = segment_markdown("# Scope \u{2014} Phase\u{2122}\nx");
        assert_eq!(s.keys().next().map(String::as_str), Some("Scope - Phase(TM)"));
    }

    #[test]
    fn rfp_patterns() {
        assert_eq!(rfp_heading("1.2. Project Scope").as_deref(), Some("Project Scope"));
        assert_eq!(rfp_heading("EVALUATION CRITERIA:").as_deref(), Some("EVALUATION CRITERIA"));
        assert_eq!(rfp_heading("Section 4: Deliverables").as_deref(), Some("Deliverables"));
        assert_eq!(rfp_heading("The vendor shall respond by 5 May."), None);
        assert_eq!(rfp_heading("lowercase line"), None);
    }

    #[test]
    fn rfp_segments_with_overview_default() {
        let text = "Issued by the board, 2024.\nBACKGROUND\nWe run 12 sites.\nSection 2: Timeline\nQ3 start, 6 months.";
        let s = segment_rfp(text);
        assert_eq!(
            pairs(&s),
            vec![
                ("Overview", "Issued by the board, 2024."),
                ("BACKGROUND", "We run 12 sites."),
                ("Timeline", "Q3 start, 6 months."),
            ]
        );
    }

    #[test]
    fn rfp_without_headings_is_single_section() {
        let s = segment_rfp("just prose, nothing else.\nmore of it.");
        assert_eq!(pairs(&s), vec![("Overview", "just prose, nothing else.\nmore of it.")]);
    }

    #[test]
    fn rfp_back_to_back_headings_keep_empty_section() {
        let s = segment_rfp("BACKGROUND\nSCOPE OF WORK\nbuild it");
        assert_eq!(pairs(&s), vec![("BACKGROUND", ""), ("SCOPE OF WORK", "build it")]);
    }
}
