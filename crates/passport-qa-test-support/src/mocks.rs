//! Mock implementations of core port traits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use image::RgbaImage;
use passport_qa_core::domain::{ComplianceReport, FaceObservation, ImageInfo};
use passport_qa_core::ports::{
    ExportSink, FaceGeometryProvider, ImageSource, ProgressEvent, ProgressSink, ResultOutput,
};

/// In-memory `ImageSource` that counts how often it was iterated.
pub struct MockImageSource {
    images: Vec<ImageInfo>,
    iterations: AtomicUsize,
}

impl MockImageSource {
    /// Yields `images` in order.
    #[must_use]
    pub const fn new(images: Vec<ImageInfo>) -> Self {
        Self {
            images,
            iterations: AtomicUsize::new(0),
        }
    }

    /// A source without images.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Calls to `images()` so far.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        self.iterations.load(Ordering::SeqCst)
    }
}

impl ImageSource for MockImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageInfo>> + Send + '_> {
        self.iterations.fetch_add(1, Ordering::SeqCst);
        Box::new(self.images.iter().cloned().map(Ok))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.images.len())
    }
}

/// `ResultOutput` that keeps every report.
#[derive(Default)]
pub struct MockResultOutput {
    reports: Mutex<Vec<ComplianceReport>>,
    flushes: AtomicUsize,
}

impl MockResultOutput {
    /// An empty output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports written so far.
    #[must_use]
    pub fn reports(&self) -> Vec<ComplianceReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Calls to `flush()` so far.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, report: &ComplianceReport) -> anyhow::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// `ProgressSink` that records every event.
#[derive(Default)]
pub struct MockProgressSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl MockProgressSink {
    /// A sink with no events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn count(&self, matches: impl Fn(&ProgressEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| matches(e))
            .count()
    }

    /// Number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Started { .. }))
    }

    /// Number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Completed { .. }))
    }

    /// Number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Skipped { .. }))
    }

    /// Whether the batch reported `Finished`.
    #[must_use]
    pub fn has_finished(&self) -> bool {
        self.finished_counts().is_some()
    }

    /// `(processed, skipped)` of the `Finished` event.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().into_iter().find_map(|e| match e {
            ProgressEvent::Finished { processed, skipped } => Some((processed, skipped)),
            _ => None,
        })
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// Mock implementation of `FaceGeometryProvider` for testing.
///
/// Answers from a table keyed by image path and counts lifecycle calls.
pub struct MockFaceProvider {
    observations: HashMap<String, FaceObservation>,
    fallback: FaceObservation,
    ready: bool,
    init_count: usize,
    dispose_count: usize,
    fail_init: bool,
}

impl MockFaceProvider {
    /// Creates a provider that reports `fallback` for every unknown path.
    #[must_use]
    pub fn new(fallback: FaceObservation) -> Self {
        Self {
            observations: HashMap::new(),
            fallback,
            ready: false,
            init_count: 0,
            dispose_count: 0,
            fail_init: false,
        }
    }

    /// Registers the observation for one path.
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, observation: FaceObservation) -> Self {
        self.observations.insert(path.into(), observation);
        self
    }

    /// Makes `init` fail.
    #[must_use]
    pub const fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Number of successful `init` calls that changed state.
    #[must_use]
    pub const fn init_count(&self) -> usize {
        self.init_count
    }

    /// Number of `dispose` calls.
    #[must_use]
    pub const fn dispose_count(&self) -> usize {
        self.dispose_count
    }
}

impl FaceGeometryProvider for MockFaceProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn init(&mut self) -> anyhow::Result<()> {
        if self.fail_init {
            anyhow::bail!("mock provider refused to start");
        }
        if !self.ready {
            self.ready = true;
            self.init_count += 1;
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn observe(&self, image: &ImageInfo) -> anyhow::Result<FaceObservation> {
        if !self.ready {
            anyhow::bail!("mock provider used before init");
        }
        Ok(self
            .observations
            .get(&image.path)
            .unwrap_or(&self.fallback)
            .clone())
    }

    fn dispose(&mut self) {
        self.ready = false;
        self.dispose_count += 1;
    }
}

/// Mock implementation of `ExportSink` for testing.
///
/// Keeps written rasters in memory.
pub struct MockExportSink {
    written: Arc<Mutex<Vec<(String, RgbaImage)>>>,
}

impl MockExportSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            written: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Names and dimensions of everything written, in order.
    #[must_use]
    pub fn written(&self) -> Vec<(String, (u32, u32))> {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, image)| (name.clone(), image.dimensions()))
            .collect()
    }
}

impl Default for MockExportSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportSink for MockExportSink {
    fn write(&self, name: &str, image: &RgbaImage) -> anyhow::Result<String> {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_string(), image.clone()));
        Ok(format!("memory://{name}"))
    }
}
