//! End-to-end tests for the resolution and enrichment pipeline.

use heimdall::model::entity::UnifiedRecord;
use heimdall::{EntityKind, Pipeline, PipelineConfig, ProgressReporter};
use heimdall_test_utils::setup::TestSetup;
use serde_json::json;

fn pipeline(test: &TestSetup) -> Pipeline {
    Pipeline::new(
        test.db.clone(),
        PipelineConfig::for_tests(&test.server_url),
        ProgressReporter::noop(),
    )
    .unwrap()
}

/// Scenario: a single character with cold caches resolves to one fully
/// enriched record; repeating the call performs zero HTTP requests.
#[tokio::test]
async fn single_character_cold_then_warm() {
    let mut test = TestSetup::new().await.unwrap();

    let ids_mock = test
        .server
        .mock("POST", "/universe/ids/")
        .with_status(200)
        .with_body(json!({"characters": [{"id": 1001, "name": "Alice One"}]}).to_string())
        .expect(1)
        .create_async()
        .await;
    let affiliation_mock = test
        .server
        .mock("POST", "/characters/affiliation/")
        .with_status(200)
        .with_body(json!([{"character_id": 1001, "corporation_id": 2001}]).to_string())
        .expect(1)
        .create_async()
        .await;
    let corp_mock = test
        .server
        .mock("GET", "/corporations/2001/")
        .with_status(200)
        .with_body(json!({"name": "Corp A", "war_eligible": true}).to_string())
        .expect(1)
        .create_async()
        .await;

    let pipeline = pipeline(&test);
    let names = vec!["Alice One".to_string()];

    let records = pipeline.resolve_and_enrich(&names).await.unwrap();

    assert_eq!(records.len(), 1);
    let UnifiedRecord::Character {
        character_id,
        character_name,
        org,
    } = &records[0]
    else {
        panic!("expected a character record");
    };
    assert_eq!(*character_id, 1001);
    assert_eq!(character_name, "Alice One");
    let org = org.as_ref().unwrap();
    assert_eq!(org.corporation_id, 2001);
    assert_eq!(org.corporation_name, "Corp A");
    assert!(org.war_eligible);
    assert_eq!(org.alliance_id, None);

    // Warm run: every mock expects exactly one hit, so any further HTTP
    // request fails the assertions below.
    let warm = pipeline.resolve_and_enrich(&names).await.unwrap();
    assert_eq!(warm, records);

    ids_mock.assert_async().await;
    affiliation_mock.assert_async().await;
    corp_mock.assert_async().await;
}

/// Scenario: mixed kinds produce one record per kind, alliances
/// war-eligible by convention.
#[tokio::test]
async fn mixed_kinds_resolve_to_three_records() {
    let mut test = TestSetup::new().await.unwrap();

    test.server
        .mock("POST", "/universe/ids/")
        .with_status(200)
        .with_body(
            json!({
                "characters": [{"id": 1001, "name": "Alice One"}],
                "corporations": [{"id": 2002, "name": "Corp B"}],
                "alliances": [{"id": 99000001, "name": "Alliance C"}]
            })
            .to_string(),
        )
        .create_async()
        .await;
    test.server
        .mock("POST", "/characters/affiliation/")
        .with_status(200)
        .with_body(
            json!([{"character_id": 1001, "corporation_id": 2001, "alliance_id": 99000001}])
                .to_string(),
        )
        .create_async()
        .await;
    test.server
        .mock("GET", "/corporations/2001/")
        .with_status(200)
        .with_body(json!({"name": "Corp A", "war_eligible": false}).to_string())
        .create_async()
        .await;
    test.server
        .mock("GET", "/corporations/2002/")
        .with_status(200)
        .with_body(json!({"name": "Corp B", "war_eligible": true}).to_string())
        .create_async()
        .await;
    test.server
        .mock("GET", "/alliances/99000001/")
        .with_status(200)
        .with_body(json!({"name": "Alliance C"}).to_string())
        .create_async()
        .await;

    let pipeline = pipeline(&test);
    let names = vec![
        "Alice One".to_string(),
        "Corp B".to_string(),
        "Alliance C".to_string(),
    ];

    let records = pipeline.resolve_and_enrich(&names).await.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].kind(), EntityKind::Character);
    assert_eq!(records[1].kind(), EntityKind::Corporation);
    assert_eq!(records[2].kind(), EntityKind::Alliance);

    let UnifiedRecord::Character { org, .. } = &records[0] else {
        panic!("expected a character record");
    };
    assert_eq!(
        org.as_ref().unwrap().alliance_name.as_deref(),
        Some("Alliance C")
    );

    assert!(matches!(
        records[2],
        UnifiedRecord::Alliance {
            war_eligible: true,
            ..
        }
    ));
}

/// Scenario: a corporation that keeps failing upstream degrades to the
/// placeholder; the pipeline completes instead of throwing.
#[tokio::test]
async fn soft_fail_corporation_yields_placeholder() {
    let mut test = TestSetup::new().await.unwrap();

    test.server
        .mock("POST", "/universe/ids/")
        .with_status(200)
        .with_body(json!({"characters": [{"id": 1001, "name": "Alice One"}]}).to_string())
        .create_async()
        .await;
    test.server
        .mock("POST", "/characters/affiliation/")
        .with_status(200)
        .with_body(json!([{"character_id": 1001, "corporation_id": 2001}]).to_string())
        .create_async()
        .await;
    test.server
        .mock("GET", "/corporations/2001/")
        .with_status(500)
        .create_async()
        .await;

    let pipeline = pipeline(&test);

    let records = pipeline
        .resolve_and_enrich(&["Alice One".to_string()])
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    let UnifiedRecord::Character { org, .. } = &records[0] else {
        panic!("expected a character record");
    };
    let org = org.as_ref().unwrap();
    assert_eq!(org.corporation_name, "Unknown Corporation");
    assert!(!org.war_eligible);
}

/// Boundary: an empty input list returns empty without any HTTP call.
#[tokio::test]
async fn empty_input_returns_empty() {
    let test = TestSetup::new().await.unwrap();
    let pipeline = pipeline(&test);

    let records = pipeline.resolve_and_enrich(&[]).await.unwrap();

    assert!(records.is_empty());
}

/// Boundary: input with only invalid tokens returns empty and surfaces a
/// validation message through the warning sink.
#[tokio::test]
async fn invalid_tokens_return_empty_with_warning() {
    let test = TestSetup::new().await.unwrap();

    let warnings = std::sync::Arc::new(std::sync::Mutex::new(0usize));
    let counter = warnings.clone();
    let reporter = ProgressReporter {
        warn: Some(std::sync::Arc::new(move |_msg: &str| {
            *counter.lock().unwrap() += 1;
        })),
        ..Default::default()
    };
    let pipeline = Pipeline::new(
        test.db.clone(),
        PipelineConfig::for_tests(&test.server_url),
        reporter,
    )
    .unwrap();

    let records = pipeline
        .resolve_and_enrich(&["x".to_string(), "!!".to_string()])
        .await
        .unwrap();

    assert!(records.is_empty());
    assert!(*warnings.lock().unwrap() > 0);
}

/// Invariant: resolving duplicate casings yields a single record.
#[tokio::test]
async fn duplicate_casings_collapse_to_one_record() {
    let mut test = TestSetup::new().await.unwrap();

    test.server
        .mock("POST", "/universe/ids/")
        .with_status(200)
        .with_body(json!({"characters": [{"id": 1001, "name": "Alice One"}]}).to_string())
        .expect(1)
        .create_async()
        .await;
    test.server
        .mock("POST", "/characters/affiliation/")
        .with_status(200)
        .with_body(json!([{"character_id": 1001, "corporation_id": 2001}]).to_string())
        .create_async()
        .await;
    test.server
        .mock("GET", "/corporations/2001/")
        .with_status(200)
        .with_body(json!({"name": "Corp A", "war_eligible": true}).to_string())
        .create_async()
        .await;

    let pipeline = pipeline(&test);
    let records = pipeline
        .resolve_and_enrich(&["Alice One".to_string(), "ALICE ONE".to_string()])
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
}
