use super::*;
use crate::config::SubmissionPolicy;

#[tokio::test]
async fn tiktok_download_moves_from_starting_to_completed() {
    let (downloader, mock, _temp_dir) =
        create_test_downloader_with(|_| {}, MockExtractor::gated()).await;
    let mut events = downloader.subscribe();

    assert_eq!(downloader.poll_progress().status, "idle");

    let ack = downloader
        .submit_download(DownloadRequest::new(TIKTOK_URL))
        .await
        .unwrap();
    assert!(ack.accepted);
    assert!(!ack.queued);
    assert_eq!(ack.platform, Platform::TikTok);

    let snapshot = downloader.poll_progress();
    assert_eq!(snapshot.percent, 0);
    assert_eq!(snapshot.status, "Starting download...");
    assert_eq!(snapshot.state, JobState::Running);

    mock.release(1);
    let snapshot = wait_for_terminal(&downloader).await;
    assert_eq!(snapshot.percent, 100);
    assert_eq!(snapshot.status, "Download completed!");
    assert_eq!(snapshot.filename, MOCK_FILE);
    assert_eq!(snapshot.platform, Some(Platform::TikTok));

    let started = wait_for_event(&mut events, |e| matches!(e, Event::JobStarted { .. })).await;
    match started {
        Event::JobStarted { folder, .. } => assert!(folder.starts_with("tiktok_")),
        other => panic!("unexpected event {:?}", other),
    }
    wait_for_event(&mut events, |e| matches!(e, Event::JobCompleted { .. })).await;
}

#[tokio::test]
async fn failed_extraction_is_recorded_not_raised() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    downloader
        .submit_download(DownloadRequest::new(TIKTOK_FAIL_URL))
        .await
        .unwrap();

    let snapshot = wait_for_terminal(&downloader).await;
    assert_eq!(snapshot.percent, 0);
    assert_eq!(snapshot.status, "Download failed");
    assert_eq!(snapshot.filename, "");
    assert_eq!(snapshot.state, JobState::Failed);
    assert_eq!(
        snapshot.error.as_deref(),
        Some("TikTok error: HTTP Error 404: Not Found")
    );
}

#[tokio::test]
async fn unsupported_url_uses_generic_prefix() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    let ack = downloader
        .submit_download(DownloadRequest::new("https://example.com/unsupported"))
        .await
        .unwrap();
    assert_eq!(ack.platform, Platform::Unknown);

    let snapshot = wait_for_terminal(&downloader).await;
    assert_eq!(snapshot.state, JobState::Failed);
    assert!(
        snapshot
            .error
            .as_deref()
            .unwrap()
            .starts_with("Download error: unsupported URL")
    );
}

#[tokio::test]
async fn panicking_extractor_still_records_failure() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    downloader
        .submit_download(DownloadRequest::new("https://example.com/panic"))
        .await
        .unwrap();

    let snapshot = wait_for_terminal(&downloader).await;
    assert_eq!(snapshot.status, "Download failed");
    assert_eq!(
        snapshot.error.as_deref(),
        Some("Download error: extractor panicked")
    );
    assert!(downloader.jobs.active.lock().await.is_empty());
}

#[tokio::test]
async fn blank_url_is_a_validation_error() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    let result = downloader.submit_download(DownloadRequest::new("   ")).await;
    assert!(matches!(result, Err(Error::Validation(ref m)) if m == "URL is required"));
    assert_eq!(downloader.poll_progress().state, JobState::Idle);
}

#[tokio::test]
async fn quality_overrides_the_format_selector() {
    let (downloader, mock, _temp_dir) =
        create_test_downloader_with(|_| {}, MockExtractor::new()).await;

    downloader
        .submit_download(DownloadRequest::new(TIKTOK_URL).with_quality("18"))
        .await
        .unwrap();
    wait_for_terminal(&downloader).await;
    assert_eq!(mock.last_options().unwrap().format, "18");
}

#[tokio::test]
async fn blank_quality_keeps_platform_default() {
    let (downloader, mock, _temp_dir) =
        create_test_downloader_with(|_| {}, MockExtractor::new()).await;

    downloader
        .submit_download(DownloadRequest::new(TIKTOK_URL).with_quality("  "))
        .await
        .unwrap();
    wait_for_terminal(&downloader).await;
    assert_eq!(mock.last_options().unwrap().format, "best");
}

#[tokio::test]
async fn custom_path_is_created_under_the_root() {
    let (downloader, _temp_dir) = create_test_downloader().await;
    let mut events = downloader.subscribe();

    downloader
        .submit_download(DownloadRequest::new(TIKTOK_URL).with_custom_path("music/clips"))
        .await
        .unwrap();

    let folder = match wait_for_event(&mut events, |e| matches!(e, Event::JobStarted { .. })).await
    {
        Event::JobStarted { folder, .. } => folder,
        other => panic!("unexpected event {:?}", other),
    };
    wait_for_terminal(&downloader).await;

    let job_dir = downloader
        .get_config()
        .download_dir()
        .join("music/clips")
        .join(folder);
    assert!(job_dir.join(MOCK_FILE).is_file());
}

#[tokio::test]
async fn escaping_custom_paths_are_rejected() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    for custom in ["../outside", "/etc"] {
        let result = downloader
            .submit_download(DownloadRequest::new(TIKTOK_URL).with_custom_path(custom))
            .await;
        assert!(
            matches!(result, Err(Error::Validation(_))),
            "custom path {:?} was accepted",
            custom
        );
    }
}

#[tokio::test]
async fn queue_policy_holds_one_submission() {
    let (downloader, mock, _temp_dir) =
        create_test_downloader_with(|_| {}, MockExtractor::gated()).await;
    let mut events = downloader.subscribe();

    let first = downloader
        .submit_download(DownloadRequest::new(TIKTOK_URL))
        .await
        .unwrap();
    let second = downloader
        .submit_download(DownloadRequest::new("https://www.reddit.com/r/videos/1"))
        .await
        .unwrap();
    assert!(!first.queued);
    assert!(second.queued);
    assert_eq!(second.platform, Platform::Reddit);

    let third = downloader
        .submit_download(DownloadRequest::new("https://twitter.com/a/status/1"))
        .await;
    assert!(matches!(third, Err(Error::Busy(_))));

    // the queued job has not overwritten the running job's snapshot
    assert_eq!(downloader.poll_progress().platform, Some(Platform::TikTok));

    mock.release(2);
    wait_for_event(&mut events, |e| {
        matches!(e, Event::JobCompleted { platform: Platform::Reddit, .. })
    })
    .await;

    assert_eq!(
        mock.urls(),
        vec![
            TIKTOK_URL.to_string(),
            "https://www.reddit.com/r/videos/1".to_string()
        ]
    );
    let snapshot = wait_for_terminal(&downloader).await;
    assert_eq!(snapshot.platform, Some(Platform::Reddit));
    assert_eq!(snapshot.status, "Download completed!");
}

#[tokio::test]
async fn slot_frees_up_after_the_queue_drains() {
    let (downloader, mock, _temp_dir) =
        create_test_downloader_with(|_| {}, MockExtractor::gated()).await;
    let mut events = downloader.subscribe();

    downloader
        .submit_download(DownloadRequest::new(TIKTOK_URL))
        .await
        .unwrap();
    mock.release(1);
    wait_for_event(&mut events, |e| matches!(e, Event::JobCompleted { .. })).await;

    // give the driver a moment to release the slot
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while downloader.jobs.slot.lock().await.running > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let ack = downloader
        .submit_download(DownloadRequest::new(TIKTOK_URL))
        .await
        .unwrap();
    assert!(!ack.queued);
    mock.release(1);
}

#[tokio::test]
async fn reject_policy_refuses_while_running() {
    let (downloader, mock, _temp_dir) = create_test_downloader_with(
        |c| c.download.submission_policy = SubmissionPolicy::Reject,
        MockExtractor::gated(),
    )
    .await;

    downloader
        .submit_download(DownloadRequest::new(TIKTOK_URL))
        .await
        .unwrap();
    let second = downloader
        .submit_download(DownloadRequest::new(TIKTOK_URL))
        .await;
    assert!(matches!(second, Err(Error::Busy(_))));

    mock.release(1);
    wait_for_terminal(&downloader).await;
}

#[tokio::test]
async fn concurrent_policy_runs_jobs_side_by_side() {
    let (downloader, mock, _temp_dir) = create_test_downloader_with(
        |c| c.download.submission_policy = SubmissionPolicy::Concurrent,
        MockExtractor::gated(),
    )
    .await;

    let first = downloader
        .submit_download(DownloadRequest::new(TIKTOK_URL))
        .await
        .unwrap();
    let second = downloader
        .submit_download(DownloadRequest::new("https://youtu.be/abc"))
        .await
        .unwrap();
    assert!(!first.queued);
    assert!(!second.queued);

    wait_for_calls(&mock, 2).await;
    assert_eq!(downloader.jobs.active.lock().await.len(), 2);
    mock.release(2);
}
