/// Proposal vocabulary: each term and the words buyers use for it.
const DOMAIN_TERMS: &[(&str, &[&str])] = &[
    ("proposal", &["offer", "bid", "solution"]),
    ("requirements", &["needs", "specifications", "criteria"]),
    ("implementation", &["deployment", "execution", "rollout"]),
    ("support", &["maintenance", "service", "assistance"]),
];

/// Append domain synonyms after matching query words.
///
/// A key is followed by all its synonyms; a synonym is followed by its key.
/// Words are matched case-insensitively and always kept as typed.
pub fn expand_query(query: &str) -> String {
    let mut words: Vec<&str> = Vec::new();
    for word in query.split_whitespace() {
        words.push(word);
        let lower = word.to_lowercase();
        for (key, synonyms) in DOMAIN_TERMS {
            if lower == *key {
                words.extend_from_slice(synonyms);
            } else if synonyms.contains(&lower.as_str()) {
                words.push(*key);
            }
        }
    }
    words.join(" ")
}
