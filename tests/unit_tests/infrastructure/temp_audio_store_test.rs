use std::io;

use bytes::Bytes;
use futures::StreamExt;

use voice_order::infrastructure::storage::{StagingError, TempAudioStore};

#[tokio::test]
async fn given_chunked_stream_when_staging_then_writes_all_bytes() {
    let scratch = tempfile::tempdir().unwrap();
    let store = TempAudioStore::new(scratch.path().to_path_buf()).unwrap();
    let stream = futures::stream::iter(vec![
        Ok(Bytes::from_static(b"first-")),
        Ok(Bytes::from_static(b"second")),
    ])
    .boxed();

    let upload = store
        .stage(Some("clip.webm".to_string()), stream)
        .await
        .unwrap();

    assert_eq!(upload.size_bytes(), 12);
    assert_eq!(upload.filename(), Some("clip.webm"));
    assert!(upload.path().starts_with(scratch.path()));
    assert_eq!(upload.read().await.unwrap(), b"first-second");
}

#[tokio::test]
async fn given_staged_upload_when_disposed_then_file_is_removed() {
    let scratch = tempfile::tempdir().unwrap();
    let store = TempAudioStore::new(scratch.path().to_path_buf()).unwrap();
    let stream = futures::stream::iter(vec![Ok(Bytes::from_static(b"audio"))]).boxed();

    let upload = store.stage(None, stream).await.unwrap();
    let path = upload.path().to_path_buf();
    assert!(path.exists());

    upload.dispose().unwrap();

    assert!(!path.exists());
}

#[tokio::test]
async fn given_staged_upload_when_dropped_then_file_is_removed() {
    let scratch = tempfile::tempdir().unwrap();
    let store = TempAudioStore::new(scratch.path().to_path_buf()).unwrap();
    let stream = futures::stream::iter(vec![Ok(Bytes::from_static(b"audio"))]).boxed();

    let upload = store.stage(None, stream).await.unwrap();
    let path = upload.path().to_path_buf();
    drop(upload);

    assert!(!path.exists());
}

#[tokio::test]
async fn given_two_uploads_when_staging_then_paths_are_unique() {
    let scratch = tempfile::tempdir().unwrap();
    let store = TempAudioStore::new(scratch.path().to_path_buf()).unwrap();

    let first = store
        .stage(None, futures::stream::iter(vec![Ok(Bytes::from_static(b"a"))]).boxed())
        .await
        .unwrap();
    let second = store
        .stage(None, futures::stream::iter(vec![Ok(Bytes::from_static(b"b"))]).boxed())
        .await
        .unwrap();

    assert_ne!(first.path(), second.path());
}

#[tokio::test]
async fn given_interrupted_stream_when_staging_then_fails_and_leaves_nothing_behind() {
    let scratch = tempfile::tempdir().unwrap();
    let store = TempAudioStore::new(scratch.path().to_path_buf()).unwrap();
    let stream = futures::stream::iter(vec![
        Ok(Bytes::from_static(b"partial")),
        Err(io::Error::other("client went away")),
    ])
    .boxed();

    let result = store.stage(None, stream).await;

    assert!(matches!(result, Err(StagingError::Stream(_))));
    assert!(std::fs::read_dir(scratch.path()).unwrap().next().is_none());
}
