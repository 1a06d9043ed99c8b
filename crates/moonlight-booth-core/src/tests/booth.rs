use crate::{
    BoothCommand, BoothError, BoothHandle, BoothSnapshot, CaptureMode, CaptureRejected, Compositor,
    PHOTO_COUNT, ReadyState, tests::support::fake_stream,
};

use std::time::Duration;

use tokio::{sync::watch, time::Instant};

#[allow(clippy::unwrap_used)]
async fn wait_for(
    rx: &mut watch::Receiver<BoothSnapshot>,
    f: impl FnMut(&BoothSnapshot) -> bool,
) -> BoothSnapshot {
    rx.wait_for(f).await.unwrap().clone()
}

/// WHAT: Four manual shots complete the session
/// WHY: The booth must hand exactly four photos to frame selection
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_ready_stream_when_shooting_four_times_then_photos_available() {
    // Given: A booth on a ready stream
    let fake = fake_stream(ReadyState::HaveEnoughData);
    let booth = BoothHandle::spawn(fake.stream.clone(), Compositor::default(), 3, None);
    let mut rx = booth.subscribe();

    // When: Shooting once per empty slot
    for n in 1..=PHOTO_COUNT {
        booth.send(BoothCommand::Shoot).await.unwrap();
        wait_for(&mut rx, |s| s.filled == n && !s.capturing).await;
    }

    // Then: The session is complete and the photos are handed out
    assert!(booth.snapshot().complete);
    let photos = booth.photos().await.unwrap().unwrap();
    assert_eq!(photos.len(), PHOTO_COUNT);
    assert!(!fake.stream.is_stopped());
}

/// WHAT: Shooting before the feed has a frame is ignored
/// WHY: Captures never run against a source that cannot deliver a frame
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_stream_not_ready_when_shooting_then_rejected() {
    let fake = fake_stream(ReadyState::HaveMetadata);
    let booth = BoothHandle::spawn(fake.stream.clone(), Compositor::default(), 3, None);
    let mut rx = booth.subscribe();

    booth.send(BoothCommand::Shoot).await.unwrap();
    let snapshot = wait_for(&mut rx, |s| s.last_rejection.is_some()).await;

    assert_eq!(snapshot.last_rejection, Some(CaptureRejected::SourceNotReady));
    assert_eq!(snapshot.filled, 0);
    assert!(booth.photos().await.unwrap().is_none());
}

/// WHAT: Timed mode fills all slots on its own, one interval apart
/// WHY: The countdown drives capture without user input
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_timed_mode_when_countdown_started_then_session_fills_over_time() {
    // Given: Timed mode with a three-second interval
    let fake = fake_stream(ReadyState::HaveEnoughData);
    let booth = BoothHandle::spawn(fake.stream.clone(), Compositor::default(), 3, None);
    let mut rx = booth.subscribe();
    booth
        .send(BoothCommand::SetMode(CaptureMode::Timed))
        .await
        .unwrap();
    let started = Instant::now();

    // When: Starting the countdown and letting time run
    booth.send(BoothCommand::StartCountdown).await.unwrap();
    let snapshot = wait_for(&mut rx, |s| s.complete).await;

    // Then: Four photos, countdown gone, at least four intervals elapsed
    assert_eq!(snapshot.filled, PHOTO_COUNT);
    assert!(snapshot.countdown.is_none());
    assert!(started.elapsed() >= Duration::from_secs(12));
}

/// WHAT: Reset clears every slot
/// WHY: Users can start the booth over without leaving the screen
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_photos_when_reset_then_empty() {
    let fake = fake_stream(ReadyState::HaveEnoughData);
    let booth = BoothHandle::spawn(fake.stream.clone(), Compositor::default(), 3, None);
    let mut rx = booth.subscribe();
    booth.send(BoothCommand::Shoot).await.unwrap();
    wait_for(&mut rx, |s| s.filled == 1 && !s.capturing).await;

    booth.send(BoothCommand::Reset).await.unwrap();
    let snapshot = wait_for(&mut rx, |s| s.filled == 0).await;

    assert_eq!(snapshot.slots, [false; PHOTO_COUNT]);
}

/// WHAT: Retake replaces only the selected slot
/// WHY: Retakes keep the other photos in place
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_full_booth_when_retaking_then_other_photos_unchanged() {
    // Given: A full booth
    let fake = fake_stream(ReadyState::HaveEnoughData);
    let booth = BoothHandle::spawn(fake.stream.clone(), Compositor::default(), 3, None);
    let mut rx = booth.subscribe();
    for n in 1..=PHOTO_COUNT {
        booth.send(BoothCommand::Shoot).await.unwrap();
        wait_for(&mut rx, |s| s.filled == n && !s.capturing).await;
    }
    let before = booth.photos().await.unwrap().unwrap();

    // When: Selecting slot 1 and retaking
    booth.send(BoothCommand::Select(1)).await.unwrap();
    wait_for(&mut rx, |s| s.selected == Some(1)).await;
    booth.send(BoothCommand::Retake).await.unwrap();
    wait_for(&mut rx, |s| s.complete).await;

    // Then: The session is complete again with slots 0, 2, 3 untouched
    let after = booth.photos().await.unwrap().unwrap();
    for i in [0, 2, 3] {
        assert_eq!(after[i], before[i]);
    }
}

/// WHAT: Dropping the handle stops the booth task
/// WHY: Leaving the booth screen must cancel its timers and pending grabs
#[tokio::test(start_paused = true)]
async fn given_booth_handle_when_dropped_then_snapshot_channel_closes() {
    let fake = fake_stream(ReadyState::HaveEnoughData);
    let booth = BoothHandle::spawn(fake.stream.clone(), Compositor::default(), 3, None);
    let mut rx = booth.subscribe();
    drop(booth);

    // The task is aborted, which drops the snapshot sender.
    assert!(rx.changed().await.is_err());
}

/// WHAT: Commands to a stopped booth report the caller's location
/// WHY: The error must point at the code that sent the command
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_stopped_booth_when_sending_then_error_located_at_caller() {
    // Given: A booth whose task has ended
    let fake = fake_stream(ReadyState::HaveEnoughData);
    let booth = BoothHandle::spawn(fake.stream.clone(), Compositor::default(), 3, None);
    booth.abort_task();
    let mut rx = booth.subscribe();
    let _ = rx.changed().await;

    // When: Sending a command and asking for the photos
    let sent = booth.send(BoothCommand::Shoot).await;
    let photos = booth.photos().await;

    // Then: Both fail with a location in this file
    for result in [sent.map(|_| ()), photos.map(|_| ())] {
        assert!(matches!(
            result,
            Err(BoothError::TaskClosed { task: "booth", location })
                if location.file.ends_with("tests/booth.rs")
        ));
    }
}
