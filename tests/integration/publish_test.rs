//! Integration tests for directory publishing and the publish cache.

mod helpers;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use attachkit_core::config::PublishMode;
use attachkit_core::result::AppResult;
use attachkit_core::traits::publisher::AssetPublisher;
use attachkit_lifecycle::{FileAttributeLifecycle, MemoryRecord};
use attachkit_storage::{CachedPublisher, DirectoryPublisher};

use helpers::{PNG, TestEnv};

/// Counts calls that reach the wrapped publisher.
#[derive(Debug)]
struct Counting<P> {
    inner: P,
    calls: AtomicUsize,
}

impl<P> Counting<P> {
    fn new(inner: P) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<P: AssetPublisher> AssetPublisher for Counting<P> {
    async fn publish(&self, source: &Path) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.publish(source).await
    }
}

fn shared_path_env() -> TestEnv {
    TestEnv::new(
        r#"
        [aliases]
        root = "{root}"

        [upload.attributes.photo]
        path = "@root/storage/media"
        temp_path = "@root/tmp/photo"

        [upload.attributes.preview]
        path = "@root/storage/media/"
        temp_path = "@root/tmp/preview"

        [publish]
        base_path = "@root/web/assets"
        base_url = "/assets"
        "#,
    )
}

#[tokio::test]
async fn test_directory_published_once_across_lifecycles() {
    let env = shared_path_env();
    let base = env.path("web/assets");
    let publisher = CachedPublisher::new(Counting::new(
        DirectoryPublisher::new(base.clone(), "/assets", PublishMode::Link).unwrap(),
    ));

    let first = FileAttributeLifecycle::new(
        &env.config.upload,
        &env.config.aliases,
        env.store.clone(),
        &publisher,
    )
    .await
    .unwrap();
    let second = FileAttributeLifecycle::new(
        &env.config.upload,
        &env.config.aliases,
        env.store.clone(),
        &publisher,
    )
    .await
    .unwrap();

    assert_eq!(publisher.inner().calls(), 1);
    assert_eq!(publisher.len(), 1);

    let photo = first.mapping("photo").unwrap().url_prefix().to_string();
    let preview = second.mapping("preview").unwrap().url_prefix().to_string();
    assert_eq!(photo, preview);

    let hash = DirectoryPublisher::hash_for(&env.path("storage/media"));
    assert_eq!(photo, format!("/assets/{hash}/"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_linked_directory_exposes_later_commits() {
    let env = shared_path_env();
    let lifecycle = env.lifecycle().await;
    env.write("tmp/photo/late.png", PNG);

    let mut record = MemoryRecord::new();
    record.set("photo", "late.png");
    lifecycle.before_insert(&mut record).await;

    let url = lifecycle.url_for(&record, "photo").unwrap();
    let relative = url.trim_start_matches("/assets/");
    assert!(env.path("web/assets").join(relative).is_file());
}

#[tokio::test]
async fn test_copy_mode_snapshots_contents() {
    let env = TestEnv::avatar();
    env.write("media/nested/a.png", PNG);
    env.write("media/b.txt", b"hello");

    let base = env.path("web/assets");
    let publisher = DirectoryPublisher::new(base.clone(), "/assets/", PublishMode::Copy).unwrap();
    let url = publisher.publish(&env.path("media")).await.unwrap();

    let hash = DirectoryPublisher::hash_for(&env.path("media"));
    assert_eq!(url, format!("/assets/{hash}"));

    let target = base.join(&hash);
    assert!(target.join("nested/a.png").is_file());
    assert_eq!(std::fs::read(target.join("b.txt")).unwrap(), b"hello");
    assert!(!std::fs::symlink_metadata(&target).unwrap().file_type().is_symlink());

    // Republishing an existing target is a no-op.
    let again = publisher.publish(&env.path("media")).await.unwrap();
    assert_eq!(again, url);
}

#[tokio::test]
async fn test_shared_publisher_across_threads() {
    let env = shared_path_env();
    let publisher = Arc::new(env.publisher());
    let source = env.path("storage/media");

    let mut handles = Vec::new();
    for _ in 0..4 {
        let publisher = Arc::clone(&publisher);
        let source = source.clone();
        handles.push(tokio::spawn(async move {
            publisher.publish(&source).await.unwrap()
        }));
    }

    let mut urls = Vec::new();
    for handle in handles {
        urls.push(handle.await.unwrap());
    }
    urls.dedup();
    assert_eq!(urls.len(), 1);
    assert!(publisher.is_cached(&source));
}
