use replayscope_backdrop_corpus::{extract_session, CorpusAssembler, SessionRecord};
use replayscope_dom_vector::{FeatureDictionary, FeatureKey};
use serde_json::json;

fn recorded_session(id: &str, body: serde_json::Value) -> SessionRecord {
    serde_json::from_value(json!({
        "id": id,
        "url": format!("https://replays.test/{id}"),
        "events": [
            { "type": 4, "timestamp": 100, "data": { "href": "https://app.test", "width": 1280, "height": 800 } },
            { "type": 2, "timestamp": 101, "data": {
                "node": {
                    "type": 0,
                    "id": 1,
                    "childNodes": [
                        { "type": 2, "id": 2, "tagName": "html", "attributes": {}, "childNodes": [
                            { "type": 2, "id": 3, "tagName": "head", "attributes": {}, "childNodes": [
                                { "type": 2, "id": 4, "tagName": "style", "attributes": {}, "childNodes": [] }
                            ] },
                            body
                        ] }
                    ]
                },
                "initialOffset": { "top": 0, "left": 0 }
            } },
            { "type": 3, "timestamp": 150, "data": { "source": 1, "positions": [] } }
        ]
    }))
    .expect("fixture decodes")
}

fn run(records: Vec<SessionRecord>) -> (FeatureDictionary, replayscope_backdrop_corpus::Corpus) {
    let mut dict = FeatureDictionary::new();
    let mut assembler = CorpusAssembler::new();
    for record in records {
        assembler.push(extract_session(record, &mut dict));
    }
    let corpus = assembler.finish(&dict).expect("assembly succeeds");
    (dict, corpus)
}

fn fixtures() -> Vec<SessionRecord> {
    vec![
        recorded_session(
            "s-1",
            json!({ "type": 2, "id": 5, "tagName": "body", "attributes": { "class": "app" }, "childNodes": [
                { "type": 2, "id": 6, "tagName": "img", "attributes": { "src": "/logo.png", "style": "width: 10px" }, "childNodes": [] },
                { "type": 3, "id": 7, "textContent": "hello" }
            ] }),
        ),
        recorded_session(
            "s-2",
            json!({ "type": 2, "id": 5, "tagName": "body", "attributes": { "class": "app" }, "childNodes": [
                { "type": 2, "id": 6, "tagName": "img", "attributes": { "src": "/logo.png", "style": "width: 99px" }, "childNodes": [] },
                { "type": 2, "id": 8, "tagName": "script", "attributes": {}, "childNodes": [
                    { "type": 2, "id": 9, "tagName": "a", "attributes": { "class": "nav" }, "childNodes": [] }
                ] }
            ] }),
        ),
    ]
}

#[test]
fn recorded_sessions_build_a_padded_corpus() {
    let (dict, corpus) = run(fixtures());

    let keys: Vec<&FeatureKey> = dict.entries().iter().map(|e| &e.key).collect();
    assert_eq!(
        keys,
        vec![
            &FeatureKey::new("body", "app", ""),
            &FeatureKey::new("img", "", "/logo.png"),
            &FeatureKey::new("a", "nav", ""),
        ]
    );

    assert_eq!(corpus.len(), 2);
    assert_eq!(corpus.vectors(), vec![&[1u32, 1, 0][..], &[1u32, 1, 1][..]]);
    assert_eq!(corpus.get(0).unwrap().backdrop.timestamp, 101);
    assert_eq!(corpus.get(1).unwrap().url, "https://replays.test/s-2");
}

#[test]
fn repeated_runs_assign_identical_indices() {
    let (first, first_corpus) = run(fixtures());
    let (second, second_corpus) = run(fixtures());
    assert_eq!(first.entries(), second.entries());
    assert_eq!(first_corpus.vectors(), second_corpus.vectors());
}

#[test]
fn snapshot_tree_survives_unmodified() {
    let record = fixtures().remove(0);
    let original_node = record.events.as_ref().unwrap()[1].data["node"].clone();
    let (_, corpus) = run(vec![record]);
    let snapshot = &corpus.get(0).unwrap().backdrop.snapshot;
    assert_eq!(serde_json::to_value(snapshot.as_ref()).unwrap(), original_node);
}
