use sitesearch::{Document, EngineConfig, Error, FieldConfig, QueryConfig, SearchEngine};

fn engine() -> SearchEngine {
    SearchEngine::new(EngineConfig::new(vec![
        FieldConfig::indexed("title", 10.0),
        FieldConfig::indexed("body", 1.0),
        FieldConfig::stored("url"),
    ]))
    .unwrap()
}

fn doc(id: &str, body: &str) -> Document {
    Document::new(id).with_field("body", body)
}

fn ids(engine: &SearchEngine, query: &str) -> Vec<String> {
    engine.search(query).unwrap().into_iter().map(|h| h.id).collect()
}

fn pets() -> SearchEngine {
    let engine = engine();
    engine.build(vec![doc("A", "cat dog"), doc("B", "cat")]).unwrap();
    engine
}

#[test]
fn required_clauses_intersect() {
    assert_eq!(ids(&pets(), "+dog +cat"), vec!["A"]);
}

#[test]
fn excluded_clauses_subtract() {
    assert_eq!(ids(&pets(), "cat -dog"), vec!["B"]);
}

#[test]
fn optional_clauses_only_boost() {
    let engine = pets();
    let hits = engine.search("cat dog").unwrap();
    assert_eq!(hits.iter().map(|h| h.id.as_str()).collect::<Vec<_>>(), vec!["A", "B"]);
    assert!(hits[0].score > hits[1].score);

    // a required clause with no match anywhere empties the result
    assert!(ids(&engine, "cat +bird").is_empty());
}

#[test]
fn only_excluded_clauses_is_empty_query() {
    assert!(matches!(pets().search("-dog -cat"), Err(Error::EmptyQuery)));
    assert!(matches!(pets().search("the"), Err(Error::EmptyQuery)));
}

#[test]
fn every_indexed_term_is_findable() -> anyhow::Result<()> {
    let engine = engine();
    let docs = vec![
        doc("bash", "beep music github repositories"),
        doc("fish", "bash differences syntax translation"),
        doc("git", "common commands short description"),
    ];
    engine.build(docs.clone())?;
    for d in &docs {
        for word in d.fields["body"].split_whitespace() {
            let found = ids(&engine, word);
            assert!(found.contains(&d.id), "`{word}` did not find {}", d.id);
        }
    }
    Ok(())
}

#[test]
fn repeated_searches_are_identical() {
    let engine = engine();
    let docs: Vec<Document> = (0..40).map(|i| doc(&format!("d{i:02}"), if i % 3 == 0 { "alpha beta" } else { "alpha" })).collect();
    engine.build(docs).unwrap();
    let first = engine.search("alpha beta").unwrap();
    assert_eq!(first, engine.search("alpha beta").unwrap());
    // equal scores are ordered by identifier
    let tail: Vec<&str> = first.iter().skip(14).map(|h| h.id.as_str()).collect();
    let mut sorted = tail.clone();
    sorted.sort();
    assert_eq!(tail, sorted);
}

#[test]
fn rare_terms_outrank_common_ones() {
    let engine = engine();
    let mut docs = vec![doc("rare", "zebra")];
    docs.extend((0..50).map(|i| doc(&format!("common{i}"), "horse")));
    docs.extend((0..49).map(|i| doc(&format!("filler{i}"), "grass")));
    engine.build(docs).unwrap();

    let hits = engine.search("zebra horse").unwrap();
    assert_eq!(hits.len(), 51);
    assert_eq!(hits[0].id, "rare");
    assert!((hits[0].score - 101f64.ln()).abs() < 1e-9);
    assert!((hits[1].score - 3f64.ln()).abs() < 1e-9);
}

#[test]
fn empty_index_answers_with_nothing() {
    let engine = engine();
    engine.build(Vec::new()).unwrap();
    for q in ["cat", "+cat -dog", "title:cat", "ca*", "cat~1"] {
        assert!(engine.search(q).unwrap().is_empty(), "{q}");
    }
}

#[test]
fn title_weight_dominates_body() {
    let engine = engine();
    engine
        .build(vec![
            doc("body-heavy", "git git git"),
            Document::new("titled").with_field("title", "Git Notes").with_field("body", "add commit"),
        ])
        .unwrap();
    assert_eq!(ids(&engine, "git"), vec!["titled", "body-heavy"]);
    assert_eq!(ids(&engine, "body:git"), vec!["body-heavy"]);
}

#[test]
fn document_weight_override_replaces_schema_weight() {
    let engine = engine();
    engine
        .build(vec![
            Document::new("a").with_field("title", "rust"),
            Document::new("b").with_field("title", "rust").with_field_weight("title", 20.0),
        ])
        .unwrap();
    let hits = engine.search("rust").unwrap();
    assert_eq!(hits[0].id, "b");
    assert!((hits[0].score - 2.0 * hits[1].score).abs() < 1e-9);
}

#[test]
fn boost_scales_clause() {
    let engine = pets();
    let plain = engine.search("dog").unwrap()[0].score;
    let boosted = engine.search("dog^3").unwrap()[0].score;
    assert!((boosted - 3.0 * plain).abs() < 1e-9);
}

#[test]
fn prefix_expansion_is_bounded() {
    let engine = SearchEngine::new(
        EngineConfig::new(vec![FieldConfig::indexed("body", 1.0)]).with_query(QueryConfig {
            max_expansions: 2,
            ..QueryConfig::default()
        }),
    )
    .unwrap();
    engine
        .build(vec![doc("1", "catalog"), doc("2", "catapult"), doc("3", "cathedral"), doc("4", "c")])
        .unwrap();
    // lexicographic order: catalog, catapult, cathedr...
    assert_eq!(ids(&engine, "cat*"), vec!["1", "2"]);
    // single-character prefixes only match the literal term
    assert_eq!(ids(&engine, "c*"), vec!["4"]);
}

#[test]
fn short_prefix_allowed_by_config() {
    let engine = SearchEngine::new(
        EngineConfig::new(vec![FieldConfig::indexed("body", 1.0)]).with_query(QueryConfig {
            allow_short_prefix: true,
            ..QueryConfig::default()
        }),
    )
    .unwrap();
    engine.build(vec![doc("1", "catalog"), doc("2", "dog"), doc("3", "c")]).unwrap();
    assert_eq!(ids(&engine, "c*"), vec!["1", "3"]);
}

#[test]
fn fuzzy_matches_within_distance() {
    let engine = engine();
    engine.build(vec![doc("1", "doxygen"), doc("2", "oxygen"), doc("3", "hydrogen")]).unwrap();
    assert_eq!(ids(&engine, "doxigen~1"), vec!["1"]);
    let mut two = ids(&engine, "doxigen~2");
    two.sort();
    assert_eq!(two, vec!["1", "2"]);
    assert!(ids(&engine, "doxigen").is_empty());
}

#[test]
fn matches_report_terms_fields_and_positions() {
    let engine = engine();
    engine
        .build(vec![Document::new("a").with_field("title", "The Git Notes").with_field("body", "git add then git commit")])
        .unwrap();
    let hit = &engine.search("git").unwrap()[0];
    assert_eq!(hit.matches.len(), 2);
    assert_eq!(hit.matches[0].field, "title");
    assert_eq!(hit.matches[0].positions, vec![1]);
    assert_eq!(hit.matches[1].field, "body");
    assert_eq!(hit.matches[1].positions, vec![0, 3]);
    assert_eq!(hit.matches[1].term, "git");
}

#[test]
fn queries_run_while_rebuilding() {
    let engine = engine();
    engine.build(vec![doc("a", "rust")]).unwrap();
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..200 {
                    let hits = engine.search("rust").unwrap();
                    // either the old or the new index, never a partial one
                    assert!(hits.len() == 1 || hits.len() == 2);
                }
            });
        }
        s.spawn(|| {
            for i in 0..20 {
                let docs = if i % 2 == 0 { vec![doc("a", "rust"), doc("b", "rust")] } else { vec![doc("a", "rust")] };
                engine.build(docs).unwrap();
            }
        });
    });
}
