//! Settings operations through the pipeline facade.

use heimdall::{Pipeline, PipelineConfig, ProgressReporter};
use heimdall_test_utils::setup::TestSetup;

fn pipeline(test: &TestSetup) -> Pipeline {
    Pipeline::new(
        test.db.clone(),
        PipelineConfig::for_tests(&test.server_url),
        ProgressReporter::noop(),
    )
    .unwrap()
}

#[tokio::test]
async fn settings_survive_a_new_pipeline_instance() {
    let test = TestSetup::new().await.unwrap();

    pipeline(&test)
        .set_setting("ZKILL_TARGET_DAYS", 45)
        .await
        .unwrap();

    let settings = pipeline(&test).get_settings().await.unwrap();
    assert_eq!(settings.target_days, 45);
}

#[tokio::test]
async fn invalid_writes_leave_settings_unchanged() {
    let test = TestSetup::new().await.unwrap();
    let pipeline = pipeline(&test);

    assert!(pipeline.set_setting("ZKILL_TARGET_DAYS", 5).await.is_err());
    assert!(pipeline.set_setting("BOGUS", 10).await.is_err());

    let settings = pipeline.get_settings().await.unwrap();
    assert_eq!(settings.target_days, 30);
}

#[tokio::test]
async fn reset_drops_overrides() {
    let test = TestSetup::new().await.unwrap();
    let pipeline = pipeline(&test);

    pipeline.set_setting("ZKILL_MAX_PAGES", 5).await.unwrap();
    pipeline.reset_settings().await.unwrap();

    let settings = pipeline.get_settings().await.unwrap();
    assert_eq!(settings.max_pages, 10);
}
