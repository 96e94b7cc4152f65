use indexmap::IndexMap;

use propkb_core::sanitize;
use propkb_core::types::{CorpusEntry, EntryId};

/// Section name -> entry ids, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct SectionIndex {
    by_name: IndexMap<String, Vec<EntryId>>,
}

impl SectionIndex {
    pub fn build(entries: &[CorpusEntry]) -> Self {
        let mut by_name: IndexMap<String, Vec<EntryId>> = IndexMap::new();
        for entry in entries {
            by_name.entry(entry.section_name.clone()).or_default().push(entry.id);
        }
        Self { by_name }
    }

    pub fn ids(&self, name: &str) -> &[EntryId] {
        self.by_name.get(sanitize(name).as_str()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn names(&self) -> Vec<String> {
        self.by_name.keys().cloned().collect()
    }

    /// The `top_n` names shared by most entries; ties keep first-seen order.
    pub fn most_common(&self, top_n: usize) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self.by_name.iter().map(|(name, ids)| (name.clone(), ids.len())).collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(top_n);
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propkb_core::types::ProposalMetadata;

    fn entry(id: EntryId, section: &str) -> CorpusEntry {
        CorpusEntry {
            id,
            source_name: format!("doc{id}.md"),
            section_name: section.to_string(),
            content: String::new(),
            metadata: ProposalMetadata::default(),
        }
    }

    #[test]
    fn groups_ids_by_name() {
        let idx = SectionIndex::build(&[entry(0, "Scope"), entry(1, "Pricing"), entry(2, "Scope")]);
        assert_eq!(idx.ids("Scope"), &[0, 2]);
        assert_eq!(idx.ids("Missing"), &[] as &[EntryId]);
        assert_eq!(idx.names(), vec!["Scope", "Pricing"]);
    }

    #[test]
    fn most_common_orders_by_count_then_first_seen() {
        let idx = SectionIndex::build(&[entry(0, "Team"), entry(1, "Scope"), entry(2, "Scope"), entry(3, "Pricing")]);
        let top = idx.most_common(2);
        assert_eq!(top, vec![("Scope".to_string(), 2), ("Team".to_string(), 1)]);
        assert!(SectionIndex::default().most_common(3).is_empty());
    }
}
