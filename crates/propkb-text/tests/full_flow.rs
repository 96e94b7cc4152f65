use propkb_core::traits::TextIndexer;
use propkb_core::types::SourceKind;
use propkb_text::TfidfIndex;

fn texts() -> Vec<String> {
    [
        "We migrate legacy workloads to the cloud in three phases.",
        "Catering services for the annual conference.",
        "Cloud cost optimisation and cloud governance for finance teams.",
        "",
        "24/7 support desk with a four hour response time.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[test]
fn tfidf_full_flow() {
    let index = TfidfIndex::build(&texts());
    assert_eq!(index.len(), 5, "one row per entry, including empty ones");

    let hits = index.search("cloud governance", 10).expect("search");
    let ids: Vec<_> = hits.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![2, 0], "only rows sharing terms, best first");
    assert!(hits.iter().all(|h| h.source == SourceKind::Sparse));
    assert!(hits[0].score >= hits[1].score);
    assert!(hits[0].score <= 1.0 + 1e-5);
}

#[test]
fn tfidf_respects_k_and_empty_queries() {
    let index = TfidfIndex::build(&texts());
    assert_eq!(index.search("cloud", 1).expect("search").len(), 1);
    assert!(index.search("cloud", 0).expect("search").is_empty());
    assert!(index.search("the of and", 5).expect("search").is_empty());
    assert!(index.search("", 5).expect("search").is_empty());
}

#[test]
fn tfidf_empty_corpus() {
    let index = TfidfIndex::build(&[]);
    assert!(index.is_empty());
    assert!(index.search("anything", 3).expect("search").is_empty());
}

#[test]
fn similarities_cover_every_row() {
    let index = TfidfIndex::build(&texts());
    let sims = index.similarities("support");
    assert_eq!(sims.len(), 5);
    assert!(sims[4] > 0.0);
    assert_eq!(sims[1], 0.0);
}
