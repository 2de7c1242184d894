//! Frame extraction loop tests: ordering, timeout bound, cancellation.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use snapreel::{
    CancellationToken, CaptureOptions, FramePayload, MediaSource, ProgressSink, ProgressUpdate,
    SnapreelError, SourceDescriptor, extract_sequence,
};

fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        name: "clip.mp4".to_string(),
        duration: 60.0,
        width: 32,
        height: 24,
    }
}

fn fast_options() -> CaptureOptions {
    CaptureOptions::new().with_pacing(Duration::ZERO)
}

/// Seeks instantly and records every requested timestamp.
struct StubSource {
    descriptor: SourceDescriptor,
    seeks: Vec<f64>,
    payload: FramePayload,
}

impl StubSource {
    fn new() -> Self {
        Self {
            descriptor: descriptor(),
            seeks: Vec::new(),
            payload: FramePayload::from_image(&DynamicImage::new_rgb8(32, 24))
                .expect("encode fixture"),
        }
    }
}

#[async_trait]
impl MediaSource for StubSource {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn seek(&mut self, timestamp: f64) -> Result<(), SnapreelError> {
        self.seeks.push(timestamp);
        Ok(())
    }

    fn rasterize(&mut self) -> Result<FramePayload, SnapreelError> {
        Ok(self.payload.clone())
    }
}

/// Never completes a seek.
struct HangingSource {
    descriptor: SourceDescriptor,
}

#[async_trait]
impl MediaSource for HangingSource {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn seek(&mut self, _timestamp: f64) -> Result<(), SnapreelError> {
        futures::future::pending::<()>().await;
        Ok(())
    }

    fn rasterize(&mut self) -> Result<FramePayload, SnapreelError> {
        unreachable!("seek never completes")
    }
}

#[derive(Default)]
struct RecordingProgress {
    updates: Mutex<Vec<ProgressUpdate>>,
}

impl ProgressSink for RecordingProgress {
    fn on_progress(&self, update: &ProgressUpdate) {
        self.updates.lock().unwrap().push(update.clone());
    }

    fn on_clear(&self) {}
}

// ── Ordering ───────────────────────────────────────────────────────

#[tokio::test]
async fn frames_are_extracted_in_ascending_timestamp_order() {
    let mut source = StubSource::new();
    let progress = RecordingProgress::default();
    let timestamps = vec![0.0, 2.5, 5.0, 7.5];

    let sequence = extract_sequence(&mut source, &timestamps, &fast_options(), &progress)
        .await
        .expect("extract");

    assert_eq!(source.seeks, timestamps, "seeks must run in order");
    assert_eq!(sequence.timestamps(), timestamps.as_slice());
    assert_eq!(sequence.len(), 4);
}

#[tokio::test]
async fn progress_percent_climbs_to_one_hundred() {
    let mut source = StubSource::new();
    let progress = RecordingProgress::default();

    extract_sequence(&mut source, &[0.0, 5.0, 10.0, 15.0], &fast_options(), &progress)
        .await
        .expect("extract");

    let updates = progress.updates.lock().unwrap();
    let percents: Vec<u8> = updates.iter().filter_map(|u| u.percent).collect();
    assert_eq!(percents, vec![0, 25, 50, 75, 100]);
}

// ── Timeout bound ──────────────────────────────────────────────────

#[tokio::test]
async fn hung_seek_times_out() {
    let mut source = HangingSource {
        descriptor: descriptor(),
    };
    let progress = RecordingProgress::default();
    let options = fast_options().with_seek_timeout(Duration::from_millis(20));

    match extract_sequence(&mut source, &[3.0], &options, &progress).await {
        Err(SnapreelError::ExtractionTimeout { timestamp, waited }) => {
            assert_eq!(timestamp, 3.0);
            assert_eq!(waited, Duration::from_millis(20));
        }
        other => panic!("Expected ExtractionTimeout, got: {other:?}"),
    }
}

// ── Cancellation ───────────────────────────────────────────────────

#[tokio::test]
async fn cancelled_token_stops_before_the_first_frame() {
    let token = CancellationToken::new();
    token.cancel();

    let mut source = StubSource::new();
    let progress = RecordingProgress::default();
    let options = fast_options().with_cancellation(token);

    match extract_sequence(&mut source, &[0.0, 5.0], &options, &progress).await {
        Err(SnapreelError::Cancelled) => {}
        other => panic!("Expected Cancelled, got: {other:?}"),
    }
    assert!(source.seeks.is_empty(), "no seek may run after cancellation");
}

#[tokio::test]
async fn cancellation_mid_run_stops_between_frames() {
    /// Cancels its own token once the second seek lands.
    struct CancellingSource {
        inner: StubSource,
        token: CancellationToken,
    }

    #[async_trait]
    impl MediaSource for CancellingSource {
        fn descriptor(&self) -> &SourceDescriptor {
            self.inner.descriptor()
        }

        async fn seek(&mut self, timestamp: f64) -> Result<(), SnapreelError> {
            self.inner.seek(timestamp).await?;
            if self.inner.seeks.len() == 2 {
                self.token.cancel();
            }
            Ok(())
        }

        fn rasterize(&mut self) -> Result<FramePayload, SnapreelError> {
            self.inner.rasterize()
        }
    }

    let token = CancellationToken::new();
    let mut source = CancellingSource {
        inner: StubSource::new(),
        token: token.clone(),
    };
    let progress = RecordingProgress::default();
    let options = fast_options().with_cancellation(token);

    match extract_sequence(&mut source, &[0.0, 5.0, 10.0, 15.0], &options, &progress).await {
        Err(SnapreelError::Cancelled) => {}
        other => panic!("Expected Cancelled, got: {other:?}"),
    }
    assert_eq!(
        source.inner.seeks,
        vec![0.0, 5.0],
        "the third seek must never be issued",
    );
}
