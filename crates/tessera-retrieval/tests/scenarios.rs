use proptest::prelude::*;
use serde_json::json;
use tessera_retrieval::{
    Corpus, EntityRecord, QueryEngine, QueryOutcome, Record, RetrievalConfig,
};
use tessera_store::{Chunker, Triple, VectorIndex};

// -- Embedders --

const VOCABULARY: [&str; 7] = [
    "priya", "chennai", "mumbai", "arjun", "security", "badge", "globex",
];

/// One dimension per vocabulary word, counting occurrences.
fn keywords(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    VOCABULARY
        .iter()
        .map(|w| lower.matches(w).count() as f32)
        .collect()
}

fn constant(_text: &str) -> Vec<f32> {
    vec![1.0, 0.0, 0.0]
}

// -- Fixtures --

fn entity(value: serde_json::Value) -> Record {
    Record::Entity(serde_json::from_value::<EntityRecord>(value).unwrap())
}

fn priya() -> Record {
    entity(json!({
        "entity_type": "Employee",
        "entity_id": "E001",
        "source_name": "hr.csv",
        "attributes": {
            "full_name": "Priya Raman",
            "designation": "Engineer",
            "department": "Platform",
            "location": "Chennai"
        }
    }))
}

fn arjun() -> Record {
    entity(json!({
        "entity_type": "Employee",
        "entity_id": "E002",
        "source_name": "hr.csv",
        "attributes": {
            "full_name": "Arjun Mehta",
            "designation": "Analyst",
            "department": "Finance",
            "location": "Mumbai"
        }
    }))
}

fn mixed_corpus() -> Corpus {
    Corpus::build(
        [
            Record::Text {
                source_name: "policy.pdf".into(),
                content: "Security badge must be worn.".into(),
            },
            priya(),
            arjun(),
            Record::Triple(Triple::new("Priya", "works_for", "Globex")),
        ],
        Chunker::new(500, 100).unwrap(),
    )
    .unwrap()
}

fn engine<E: tessera_retrieval::Embedder>(records: Vec<Record>, embedder: E) -> QueryEngine<E> {
    let corpus = Corpus::build(records, Chunker::new(500, 100).unwrap()).unwrap();
    QueryEngine::build(corpus, embedder, &RetrievalConfig::default()).unwrap()
}

// -- Scenarios --

#[test]
fn empty_corpus_returns_no_information() {
    let engine = engine(Vec::new(), constant);
    assert_eq!(engine.query("anything").unwrap(), QueryOutcome::NoInformation);
}

#[test]
fn entity_veto_suppresses_nearest_record() {
    let engine = engine(
        vec![entity(json!({
            "entity_type": "Employee",
            "entity_id": "E001",
            "attributes": {"full_name": "Priya", "location": "Chennai"}
        }))],
        constant,
    );
    assert_eq!(
        engine.query("Who is in Mumbai?").unwrap(),
        QueryOutcome::Suppressed
    );
    assert!(engine.respond("Who is in Mumbai?").starts_with("NO HIGH-ACCURACY MATCH FOUND."));
}

#[test]
fn reporting_chain_yields_graph_fact() {
    let engine = engine(
        vec![
            Record::Triple(Triple::new("A", "reports_to", "B")),
            Record::Triple(Triple::new("B", "reports_to", "C")),
        ],
        constant,
    );
    let outcome = engine.query("Who does A report to?").unwrap();
    let answer = outcome.answer().unwrap();
    assert!(answer.graph_facts.contains(&"A reports_to B".to_owned()));
    assert!(answer.structured_facts.is_empty());
}

#[test]
fn identical_structured_facts_collapse() {
    let engine = engine(vec![priya(), priya()], constant);
    let outcome = engine.query("Where does Priya work?").unwrap();
    let answer = outcome.answer().unwrap();
    assert_eq!(answer.structured_facts.len(), 1);
    assert_eq!(answer.sources.len(), 1);
}

#[test]
fn employee_answer_renders_exactly() {
    let engine = QueryEngine::build(mixed_corpus(), keywords, &RetrievalConfig::default()).unwrap();
    let outcome = engine.query_with("Who works in Chennai?", 5, 0.4).unwrap();
    assert_eq!(
        outcome.render(),
        "RETRIEVAL ACCURACY: 50.0%\n\
         RESPONSE:\n\
         ✓ Employee Priya Raman (E001) is a Engineer in Platform (Chennai).\n\
         \n\
         Source Files: [[hr.csv]]"
    );
}

#[test]
fn free_text_answer_quotes_snippet() {
    let engine = QueryEngine::build(mixed_corpus(), keywords, &RetrievalConfig::default()).unwrap();
    assert_eq!(
        engine.respond("security badge rules"),
        "RETRIEVAL ACCURACY: 100.0%\n\
         RESPONSE:\n\
         \n\
         Reference Documentation:\n\
         \x20 > \"Security badge must be worn....\"\n\
         \n\
         Source Files: [[policy.pdf]]"
    );
}

#[test]
fn empty_query_is_not_an_error() {
    let engine = QueryEngine::build(mixed_corpus(), keywords, &RetrievalConfig::default()).unwrap();
    assert_eq!(engine.query("   ").unwrap(), QueryOutcome::EmptyQuery);
    assert_eq!(engine.respond(""), "Please provide a query.");
}

#[test]
fn persisted_index_answers_identically() {
    let corpus = mixed_corpus();
    let index = corpus.embed(&keywords).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.tsrx");
    index.save(&path).unwrap();

    let fresh = QueryEngine::build(mixed_corpus(), keywords, &RetrievalConfig::default()).unwrap();
    let reloaded = QueryEngine::new(
        corpus,
        VectorIndex::load(&path).unwrap(),
        keywords,
        &RetrievalConfig::default(),
    )
    .unwrap();

    for query in ["Who works in Chennai?", "security badge", "Arjun in Mumbai"] {
        assert_eq!(fresh.respond(query), reloaded.respond(query));
    }
}

// -- Properties --

proptest! {
    #[test]
    fn index_rows_match_document_texts(texts in prop::collection::vec("[a-z ]{0,60}", 0..12)) {
        let records: Vec<Record> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Record::Text { source_name: format!("doc{i}"), content: t.clone() })
            .collect();
        let corpus = Corpus::build(records, Chunker::new(16, 4).unwrap()).unwrap();
        let index = corpus.embed(&keywords).unwrap();

        prop_assert_eq!(index.len(), corpus.documents().len());
        for (row, doc) in corpus.documents().iter().enumerate() {
            let expected = keywords(&doc.text);
            prop_assert_eq!(index.reconstruct(row).unwrap(), expected.as_slice());
        }
    }

    #[test]
    fn accuracy_stays_in_percent_range(query in "[A-Za-z ]{1,40}") {
        let engine = QueryEngine::build(mixed_corpus(), keywords, &RetrievalConfig::default()).unwrap();
        if let QueryOutcome::Answer(answer) = engine.query_with(&query, 4, 0.0).unwrap() {
            prop_assert!((0.0..=100.0).contains(&answer.accuracy_pct));
        }
    }
}
