//! Integration tests for the upload lifecycle against the local filesystem.

mod helpers;

use serde_json::Value;

use attachkit_core::events::UploadEvent;
use attachkit_core::traits::record::OwningRecord;
use attachkit_lifecycle::{CommitOutcome, MemoryRecord, RecordEvent, StagedFileRemover};

use helpers::{PNG, TestEnv};

#[tokio::test]
async fn test_insert_commits_staged_avatar() {
    let env = TestEnv::avatar();
    let lifecycle = env.lifecycle().await;
    let mut events = lifecycle.events().subscribe();
    env.write("runtime/avatar/face.png", PNG);

    let mut record = MemoryRecord::new().with_key("user-1");
    lifecycle.attach(&mut record);
    record.set("avatar", "face.png");
    assert!(record.validate().is_ok());

    lifecycle.handle(RecordEvent::BeforeInsert, &mut record).await;

    assert!(env.path("web/files/avatar/face.png").is_file());
    assert!(!env.path("runtime/avatar/face.png").exists());
    assert_eq!(record.attribute("avatar").as_deref(), Some("face.png"));
    assert_eq!(
        lifecycle.url_for(&record, "avatar").as_deref(),
        Some("/files/avatar/face.png")
    );
    assert!(lifecycle.exists_for(&record, "avatar").await);
    assert_eq!(
        lifecycle.mime_type_for(&record, "avatar").await.as_deref(),
        Some("image/png")
    );

    let event = events.try_recv().expect("AfterUpload event");
    match event.payload {
        UploadEvent::AfterUpload {
            record,
            attribute,
            file_name,
            ..
        } => {
            assert_eq!(record.as_deref(), Some("user-1"));
            assert_eq!(attribute, "avatar");
            assert_eq!(file_name, "face.png");
        }
    }
}

#[tokio::test]
async fn test_insert_without_staged_file_clears_value() {
    let env = TestEnv::avatar();
    let lifecycle = env.lifecycle().await;

    let mut record = MemoryRecord::new();
    record.set("avatar", "ghost.png");
    let outcomes = lifecycle.before_insert(&mut record).await;

    assert_eq!(outcomes.get("avatar"), Some(&CommitOutcome::StagingMissing));
    assert_eq!(record.get("avatar"), &Value::Null);
    assert!(!env.path("web/files/avatar/ghost.png").exists());
}

#[tokio::test]
async fn test_update_replaces_and_reclaims_old_file() {
    let env = TestEnv::avatar();
    let lifecycle = env.lifecycle().await;
    env.write("web/files/avatar/old.png", PNG);
    env.write("runtime/avatar/new.png", PNG);

    let mut record = MemoryRecord::loaded([("avatar", "old.png")]);
    record.set("avatar", "new.png");
    let outcomes = lifecycle.before_update(&mut record).await;

    assert_eq!(outcomes.get("avatar"), Some(&CommitOutcome::Committed));
    assert!(env.path("web/files/avatar/new.png").is_file());
    assert!(!env.path("web/files/avatar/old.png").exists());
    assert_eq!(
        lifecycle.old_file_path(&record, "avatar"),
        Some(env.path("web/files/avatar/old.png"))
    );
}

#[tokio::test]
async fn test_update_without_staged_file_reverts() {
    let env = TestEnv::avatar();
    let lifecycle = env.lifecycle().await;
    env.write("web/files/avatar/old.png", PNG);

    let mut record = MemoryRecord::loaded([("avatar", "old.png")]);
    record.set("avatar", "missing.png");
    lifecycle.handle(RecordEvent::BeforeUpdate, &mut record).await;

    assert_eq!(record.attribute("avatar").as_deref(), Some("old.png"));
    assert!(env.path("web/files/avatar/old.png").is_file());
}

#[tokio::test]
async fn test_clearing_attribute_deletes_file() {
    let env = TestEnv::avatar();
    let lifecycle = env.lifecycle().await;
    env.write("web/files/avatar/old.png", PNG);

    let mut record = MemoryRecord::loaded([("avatar", "old.png")]);
    record.set("avatar", Value::Null);
    let outcomes = lifecycle.before_update(&mut record).await;

    assert_eq!(outcomes.get("avatar"), Some(&CommitOutcome::Cleared));
    assert!(!env.path("web/files/avatar/old.png").exists());
}

#[tokio::test]
async fn test_unchanged_update_leaves_files_alone() {
    let env = TestEnv::avatar();
    let lifecycle = env.lifecycle().await;
    env.write("web/files/avatar/same.png", PNG);

    let mut record = MemoryRecord::loaded([("avatar", "same.png")]);
    let outcomes = lifecycle.before_update(&mut record).await;

    assert!(outcomes.is_empty());
    assert!(env.path("web/files/avatar/same.png").is_file());
}

#[tokio::test]
async fn test_delete_removes_committed_file() {
    let env = TestEnv::avatar();
    let lifecycle = env.lifecycle().await;
    env.write("web/files/avatar/gone.png", PNG);

    let mut record = MemoryRecord::loaded([("avatar", "gone.png")]);
    lifecycle.handle(RecordEvent::BeforeDelete, &mut record).await;

    assert!(!env.path("web/files/avatar/gone.png").exists());
}

#[tokio::test]
async fn test_delete_keeps_file_when_unlink_disabled() {
    let env = TestEnv::new(
        r#"
        [aliases]
        root = "{root}"

        [upload]
        unlink_on_delete = false

        [upload.attributes.avatar]
        path = "@root/files"
        temp_path = "@root/tmp"
        url = "/files"
        "#,
    );
    let lifecycle = env.lifecycle().await;
    env.write("files/kept.png", PNG);

    let mut record = MemoryRecord::loaded([("avatar", "kept.png")]);
    assert_eq!(lifecycle.before_delete(&mut record).await, 0);
    assert!(env.path("files/kept.png").is_file());
}

#[tokio::test]
async fn test_remove_attribute_persists_empty_value() {
    let env = TestEnv::avatar();
    let lifecycle = env.lifecycle().await;
    env.write("web/files/avatar/drop.png", PNG);

    let mut record = MemoryRecord::loaded([("avatar", "drop.png")]);
    assert!(lifecycle.remove_attribute(&mut record, "avatar").await);

    assert!(!env.path("web/files/avatar/drop.png").exists());
    assert_eq!(record.attribute("avatar"), None);
    assert!(!record.is_attribute_changed("avatar"));
}

#[tokio::test]
async fn test_staged_file_remover_discards_upload() {
    let env = TestEnv::avatar();
    let lifecycle = env.lifecycle().await;
    env.write("runtime/avatar/abandoned.png", PNG);

    let mapping = lifecycle.mapping("avatar").expect("avatar mapping");
    let remover = StagedFileRemover::for_staging(mapping, env.store.clone());

    assert!(remover.remove("abandoned.png").await.unwrap());
    assert!(!env.path("runtime/avatar/abandoned.png").exists());
    assert!(remover.remove("../web/files/avatar/x.png").await.is_err());
}

#[tokio::test]
async fn test_published_url_prefix_when_url_missing() {
    let env = TestEnv::new(
        r#"
        [aliases]
        root = "{root}"

        [upload.attributes.document]
        path = "@root/storage/documents"
        temp_path = "@root/tmp/documents"

        [publish]
        base_path = "@root/web/assets"
        base_url = "/assets"
        "#,
    );
    let lifecycle = env.lifecycle().await;
    let mapping = lifecycle.mapping("document").expect("document mapping");

    assert!(mapping.url_prefix().starts_with("/assets/"));
    assert!(mapping.url_prefix().ends_with('/'));
    assert!(env.path("storage/documents").is_dir());
}
