use crate::{CameraErrorKind, ReadyState, tests::support::fake_stream};

/// WHAT: Platform error names map to the three known categories
/// WHY: Users see a specific explanation for the common failures
#[test]
fn given_platform_error_names_when_classifying_then_categorized() {
    assert_eq!(
        CameraErrorKind::classify("NotAllowedError", None),
        CameraErrorKind::PermissionDenied
    );
    assert_eq!(
        CameraErrorKind::classify("DevicesNotFoundError", None),
        CameraErrorKind::NotFound
    );
    assert_eq!(
        CameraErrorKind::classify("TrackStartError", None),
        CameraErrorKind::InUse
    );
}

/// WHAT: Each category displays its user-facing message
/// WHY: The error modal shows this text verbatim
#[test]
fn given_error_kind_when_displayed_then_user_message() {
    assert_eq!(
        CameraErrorKind::PermissionDenied.to_string(),
        "Camera and microphone access was denied."
    );
    assert_eq!(
        CameraErrorKind::NotFound.to_string(),
        "No camera or microphone was found."
    );
    assert_eq!(
        CameraErrorKind::InUse.to_string(),
        "Camera or microphone is in use by another app."
    );
    assert_eq!(
        CameraErrorKind::classify("AbortError", Some("device lost")).to_string(),
        "device lost"
    );
    assert_eq!(
        CameraErrorKind::classify("AbortError", Some("  ")).to_string(),
        "Failed to access camera."
    );
}

/// WHAT: Stopping a stream stops every track exactly once
/// WHY: Repeated teardown must not touch released devices
#[test]
fn given_live_stream_when_stopped_twice_then_tracks_stopped_once() {
    // Given: A live stream
    let fake = fake_stream(ReadyState::HaveEnoughData);
    assert_eq!(fake.stream.ready_state(), ReadyState::HaveEnoughData);

    // When: Stopping twice
    let first = fake.stream.stop_all_tracks();
    let second = fake.stream.stop_all_tracks();

    // Then: One effective stop; the feed reports nothing afterwards
    assert!(first);
    assert!(!second);
    assert_eq!(fake.video_track.stop_count(), 1);
    assert_eq!(fake.audio_track.stop_count(), 1);
    assert_eq!(fake.stream.ready_state(), ReadyState::HaveNothing);
}

/// WHAT: The stream reports its video source readiness
/// WHY: Captures are gated on the feed having a frame
#[test]
fn given_warming_up_source_when_frame_arrives_then_ready() {
    let fake = fake_stream(ReadyState::HaveMetadata);
    assert!(!fake.stream.ready_state().has_current_frame());

    fake.video.set_state(ReadyState::HaveCurrentData);

    assert!(fake.stream.ready_state().has_current_frame());
    assert_eq!(fake.stream.video_track_count(), 1);
    assert_eq!(fake.stream.audio_track_count(), 1);
}
