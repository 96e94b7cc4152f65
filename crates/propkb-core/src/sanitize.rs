//! Encoding-safety gate applied to every piece of text entering the
//! knowledge base: file names, section names, bodies and queries.

/// Smart punctuation and symbols replaced with ASCII spellings.
const REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2026}', "..."),
    ('\u{2022}', "*"),
    ('\u{2122}', "(TM)"),
    ('\u{00AE}', "(R)"),
    ('\u{00A9}', "(C)"),
];

/// Normalize `text` to printable ASCII plus `\n`, `\r`, `\t` and NBSP.
///
/// Idempotent: `sanitize(&sanitize(s)) == sanitize(s)`.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if let Some((_, repl)) = REPLACEMENTS.iter().find(|(c, _)| *c == ch) {
            out.push_str(repl);
        } else if is_latin1(ch) && is_allowed(ch) {
            out.push(ch);
        }
    }
    out
}

fn is_latin1(ch: char) -> bool {
    u32::from(ch) <= 0xFF
}

fn is_allowed(ch: char) -> bool {
    matches!(ch, '\x20'..='\x7E' | '\n' | '\r' | '\t' | '\u{00A0}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_smart_punctuation() {
        let s = "\u{201C}Acme\u{2122}\u{201D} \u{2013} it\u{2019}s done\u{2026} \u{2022} \u{00A9}";
        assert_eq!(sanitize(s), "\"Acme(TM)\" - it's done... * (C)");
    }

    #[test]
    fn strips_non_latin_and_control_chars() {
        assert_eq!(sanitize("price ₹45,000 – ok"), "price 45,000 - ok");
        assert_eq!(sanitize("caf\u{e9}\u{7}\u{1F600}"), "caf");
        assert_eq!(sanitize("a\tb\r\nc\u{a0}d"), "a\tb\r\nc\u{a0}d");
    }

    #[test]
    fn idempotent_on_mixed_input() {
        let samples = [
            "",
            "plain ascii",
            "\u{2014}\u{2014}\u{00AE}\u{00AE}",
            "日本語 mixed with English \u{2026}",
            "tabs\tand\nnewlines\r\u{a0}",
            "\u{0}\u{1}\u{7F}\u{80}\u{FF}",
        ];
        for s in samples {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once, "not idempotent for {s:?}");
        }
    }
}
