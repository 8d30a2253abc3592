use crate::{
    CaptureError, Operator, StatusSink, Toast, UploadCredentials, UploadPipeline,
    UploadTransport,
    tests::support::{
        FakeTransport, RecordingStatus, STANDARD_TOKEN, TRIAL_TOKEN, TransportCall,
    },
};

use std::sync::Arc;

fn pipeline(transport: &Arc<FakeTransport>, status: &Arc<RecordingStatus>) -> UploadPipeline {
    UploadPipeline::new(
        Arc::clone(transport) as Arc<dyn UploadTransport>,
        UploadCredentials::new(STANDARD_TOKEN, TRIAL_TOKEN),
        Arc::clone(status) as Arc<dyn StatusSink>,
        4,
    )
}

fn recording(len: u8) -> Vec<u8> {
    (0..len).collect()
}

/// WHAT: A recording within one part skips the bulk request
/// WHY: The service finalizes a single-part upload in one request
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_small_recording_when_uploaded_then_only_last_part_sent() {
    // Given: A 3-byte recording
    let transport = Arc::new(FakeTransport::default());
    let status = Arc::new(RecordingStatus::default());

    // When: Uploading
    let result = pipeline(&transport, &status)
        .upload("ABC123", &Operator::new("jdoe", false), recording(3))
        .await
        .unwrap();

    // Then: One last-part request carrying everything
    assert_eq!(
        transport.calls(),
        vec![TransportCall::Last {
            token: STANDARD_TOKEN.to_string(),
            data: recording(3),
        }]
    );
    assert_eq!(result.tracking_code, "ABC123");
    assert_eq!(
        result.video.and_then(|v| v.url().map(str::to_string)),
        Some("https://embed.api.video/vod/vi-test".to_string())
    );
}

/// WHAT: A large recording goes out as bulk then last part
/// WHY: The two-phase protocol is how long recordings reach the service
#[tokio::test]
async fn given_large_recording_when_uploaded_then_both_phases_in_order() {
    // Given: A 10-byte recording with 4-byte parts
    let transport = Arc::new(FakeTransport::default());
    let status = Arc::new(RecordingStatus::default());

    // When: Uploading
    let result = pipeline(&transport, &status)
        .upload("ABC123", &Operator::new("jdoe", false), recording(10))
        .await;

    // Then: Bulk first, last second, success reported once
    assert!(result.is_ok());
    assert_eq!(
        transport.calls(),
        vec![
            TransportCall::Part {
                token: STANDARD_TOKEN.to_string(),
                data: recording(8),
            },
            TransportCall::Last {
                token: STANDARD_TOKEN.to_string(),
                data: vec![8, 9],
            },
        ]
    );
    assert_eq!(
        status.progress(),
        vec![(true, None), (false, Some("vi-test".to_string()))]
    );
    assert!(status.toasts().is_empty());
}

/// WHAT: A failed bulk part stops the upload with one part toast
/// WHY: The last part must never be sent after a failed bulk
#[tokio::test]
async fn given_part_failure_when_uploaded_then_no_last_part_and_one_toast() {
    // Given: A transport rejecting bulk parts
    let transport = Arc::new(FakeTransport {
        fail_part: true,
        ..FakeTransport::default()
    });
    let status = Arc::new(RecordingStatus::default());

    // When: Uploading a multi-part recording
    let result = pipeline(&transport, &status)
        .upload("ABC123", &Operator::new("jdoe", false), recording(10))
        .await;

    // Then: Part failure surfaced, no last-part call
    assert!(matches!(result, Err(CaptureError::UploadPartFailed { .. })));
    assert!(
        !transport
            .calls()
            .iter()
            .any(|c| matches!(c, TransportCall::Last { .. }))
    );
    assert_eq!(status.toasts(), vec![Toast::part_upload_failed()]);
    assert_eq!(status.progress(), vec![(true, None)]);
}

/// WHAT: A failed last part raises exactly one finalize toast
/// WHY: Operators must know the video never reached the service
#[tokio::test]
async fn given_last_part_failure_when_uploaded_then_one_finalize_toast() {
    // Given: A transport rejecting the last part
    let transport = Arc::new(FakeTransport {
        fail_last: true,
        ..FakeTransport::default()
    });
    let status = Arc::new(RecordingStatus::default());

    // When: Uploading 10 bytes
    let result = pipeline(&transport, &status)
        .upload("ABC123", &Operator::new("jdoe", false), recording(10))
        .await;

    // Then: Progress started once, never completed, one toast
    assert!(matches!(
        result,
        Err(CaptureError::UploadFinalizeFailed { .. })
    ));
    assert_eq!(status.progress(), vec![(true, None)]);
    assert_eq!(status.toasts(), vec![Toast::finalize_upload_failed()]);
}

/// WHAT: Trial operators upload with the trial token
/// WHY: Trial footage is billed to the trial account
#[tokio::test]
async fn given_trial_operator_when_uploaded_then_trial_token_used() {
    // Given: A trial operator
    let transport = Arc::new(FakeTransport::default());
    let status = Arc::new(RecordingStatus::default());

    // When: Uploading a multi-part recording
    let result = pipeline(&transport, &status)
        .upload("ABC123", &Operator::new("trial-user", true), recording(10))
        .await;

    // Then: Every request carries the trial token
    assert!(result.is_ok());
    assert!(transport.calls().iter().all(|call| match call {
        TransportCall::Part { token, .. } | TransportCall::Last { token, .. } =>
            token == TRIAL_TOKEN,
    }));
}

/// WHAT: Empty recordings are rejected before any request
/// WHY: The service cannot finalize a video with no data
#[tokio::test]
async fn given_empty_recording_when_uploaded_then_rejected_without_requests() {
    // Given: No data
    let transport = Arc::new(FakeTransport::default());
    let status = Arc::new(RecordingStatus::default());

    // When: Uploading
    let result = pipeline(&transport, &status)
        .upload("ABC123", &Operator::new("jdoe", false), Vec::new())
        .await;

    // Then: Rejected with a finalize toast
    assert!(matches!(result, Err(CaptureError::EmptyRecording { .. })));
    assert!(transport.calls().is_empty());
    assert_eq!(status.toasts(), vec![Toast::finalize_upload_failed()]);
}

/// WHAT: Each failure records where that failure was raised
/// WHY: Logged locations must point at the phase that failed
#[tokio::test]
async fn given_failures_in_each_phase_when_uploaded_then_distinct_error_locations() {
    // Given: One transport failing bulk parts, one failing last parts
    let status = Arc::new(RecordingStatus::default());
    let bulk_rejecting = Arc::new(FakeTransport {
        fail_part: true,
        ..FakeTransport::default()
    });
    let last_rejecting = Arc::new(FakeTransport {
        fail_last: true,
        ..FakeTransport::default()
    });
    let operator = Operator::new("jdoe", false);

    // When: Each phase fails once and an empty recording is refused
    let part = pipeline(&bulk_rejecting, &status)
        .upload("ABC123", &operator, recording(10))
        .await;
    let last = pipeline(&last_rejecting, &status)
        .upload("ABC123", &operator, recording(10))
        .await;
    let empty = pipeline(&last_rejecting, &status)
        .upload("ABC123", &operator, Vec::new())
        .await;

    // Then: Three different lines of the pipeline source
    let lines: Vec<u32> = [part, last, empty]
        .into_iter()
        .filter_map(|result| match result {
            Err(CaptureError::UploadPartFailed { location, .. })
            | Err(CaptureError::UploadFinalizeFailed { location, .. })
            | Err(CaptureError::EmptyRecording { location, .. }) => {
                assert!(location.file.ends_with("pipeline.rs"));
                Some(location.line)
            }
            _ => None,
        })
        .collect();
    assert_eq!(lines.len(), 3);
    assert_ne!(lines[0], lines[1]);
    assert_ne!(lines[1], lines[2]);
    assert_ne!(lines[0], lines[2]);
}
