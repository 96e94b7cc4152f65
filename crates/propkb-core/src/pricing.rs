//! Historical price points mined from the commercial section of past
//! proposals.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::corpus::{read_file_content, CorpusLoader};

struct Patterns {
    commercial: Regex,
    heading: Regex,
    price: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        commercial: Regex::new(r"(?im)^(#{1,3})[ \t]*COMMERCIAL PROPOSAL[ \t]*\r?$").expect("commercial heading pattern compiles"),
        heading: Regex::new(r"(?m)^(#{1,6})[ \t]+\S").expect("heading pattern compiles"),
        price: Regex::new(r"(?:₹|Rs\.?|INR)\s*([0-9][0-9,]*)").expect("price pattern compiles"),
    })
}

/// Text of the `COMMERCIAL PROPOSAL` section, up to the next heading of the
/// same or a higher level.
pub fn commercial_section(text: &str) -> Option<&str> {
    let p = patterns();
    let caps = p.commercial.captures(text)?;
    let level = caps.get(1).map_or(1, |m| m.as_str().len());
    let body = &text[caps.get(0)?.end()..];
    let end = p
        .heading
        .captures_iter(body)
        .find(|c| c.get(1).is_some_and(|m| m.as_str().len() <= level))
        .and_then(|c| c.get(0))
        .map_or(body.len(), |m| m.start());
    Some(&body[..end])
}

/// Currency-prefixed amounts in the commercial section of one document.
/// Documents without that section yield nothing.
pub fn prices_in_text(text: &str) -> Vec<i64> {
    let Some(section) = commercial_section(text) else {
        return Vec::new();
    };
    patterns()
        .price
        .captures_iter(section)
        .filter_map(|c| c.get(1))
        .filter_map(|m| m.as_str().replace(',', "").parse::<i64>().ok())
        .collect()
}

/// Prices from every proposal under `root`, in sorted file order.
/// Unreadable files contribute nothing.
pub fn extract_prices(root: &Path, loader: &CorpusLoader) -> Vec<i64> {
    let mut prices = Vec::new();
    for path in loader.list_files(root) {
        match read_file_content(&path) {
            Ok(text) => {
                let found = prices_in_text(&text);
                debug!(path = %path.display(), count = found.len(), "scanned commercial section");
                prices.extend(found);
            }
            Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable document"),
        }
    }
    prices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_next_heading() {
        let doc = "## COMMERCIAL PROPOSAL\nTotal: Rs. 12,500\nNext: ₹45,000\n## NEXT SECTION\nRs. 99,999";
        assert_eq!(prices_in_text(doc), vec![12500, 45000]);
    }

    #[test]
    fn heading_is_case_insensitive_and_keeps_subsections() {
        let doc = "# Offer\n## Commercial Proposal\nBase INR 1,000\n### Options\nRs 250\n# Terms\nRs. 7";
        assert_eq!(prices_in_text(doc), vec![1000, 250]);
    }

    #[test]
    fn no_commercial_section_means_no_prices() {
        assert!(prices_in_text("# Scope\nRs. 100").is_empty());
        assert!(prices_in_text("").is_empty());
    }

    #[test]
    fn ignores_amounts_that_do_not_fit() {
        let doc = "# COMMERCIAL PROPOSAL\nRs. 99999999999999999999999\nRs. 5";
        assert_eq!(prices_in_text(doc), vec![5]);
    }

    #[test]
    fn heading_marker_and_title_share_a_line() {
        assert!(prices_in_text("##\nCOMMERCIAL PROPOSAL\nRs. 5\n").is_empty());
        assert_eq!(prices_in_text("## COMMERCIAL PROPOSAL\r\nRs. 5\r\n"), vec![5]);
        // a bare "#" line is not a heading and does not end the section
        assert_eq!(prices_in_text("# COMMERCIAL PROPOSAL\nRs. 5\n#\nRs. 6\n"), vec![5, 6]);
    }
}
