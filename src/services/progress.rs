//! Progress reporting service
//!
//! Separates progress reporting concerns from the pipeline, allowing
//! different frontends to implement their own progress handling.

use crate::types::ProcessingTimings;
use instant::Instant;

/// Progress stages during a separation run
///
/// Mirrors the pipeline state machine; `MaskAcquisition` is re-entered when
/// the heuristic fallback restarts a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Loading and decoding the input image
    ImageLoading,
    /// Max-edge cap and buffer conversion
    Preprocessing,
    /// Obtaining the raw coverage mask (provider or heuristic)
    MaskAcquisition,
    /// Morphological closing
    Morphology,
    /// Gaussian feathering
    Feathering,
    /// Alpha merge and transition-band blur
    Compositing,
    /// Processing completed
    Completed,
}

impl ProcessingStage {
    /// Human-readable description of the stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::ImageLoading => "Loading input image",
            Self::Preprocessing => "Preparing working buffer",
            Self::MaskAcquisition => "Acquiring coverage mask",
            Self::Morphology => "Closing mask holes",
            Self::Feathering => "Feathering mask edges",
            Self::Compositing => "Compositing output",
            Self::Completed => "Processing completed",
        }
    }

    /// Typical progress percentage for this stage
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        match self {
            Self::ImageLoading => 5,
            Self::Preprocessing => 15,
            Self::MaskAcquisition => 55,
            Self::Morphology => 70,
            Self::Feathering => 85,
            Self::Compositing => 95,
            Self::Completed => 100,
        }
    }
}

/// Progress update containing stage and timing information
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Current processing stage
    pub stage: ProcessingStage,
    /// Progress percentage (0-100)
    pub progress: u8,
    /// Human-readable stage description
    pub description: String,
    /// Elapsed time since processing started (milliseconds)
    pub elapsed_ms: u64,
}

impl ProgressUpdate {
    /// Create a new progress update
    #[must_use]
    pub fn new(stage: ProcessingStage, start_time: Instant) -> Self {
        Self {
            progress: stage.progress_percentage(),
            description: stage.description().to_string(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage,
        }
    }
}

/// Trait for reporting progress during separation operations
pub trait ProgressReporter: Send + Sync {
    /// Report a progress update
    fn report_progress(&self, update: ProgressUpdate);

    /// Report processing completion with final timings
    fn report_completion(&self, timings: &ProcessingTimings);

    /// Report an error during processing
    fn report_error(&self, stage: ProcessingStage, error: &str);
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {}

    fn report_completion(&self, _timings: &ProcessingTimings) {}

    fn report_error(&self, _stage: ProcessingStage, _error: &str) {}
}

/// Progress reporter that writes through the `log` facade
pub struct ConsoleProgressReporter;

impl ProgressReporter for ConsoleProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        log::info!(
            "[{:>3}%] {} ({}ms elapsed)",
            update.progress,
            update.description,
            update.elapsed_ms
        );
    }

    fn report_completion(&self, timings: &ProcessingTimings) {
        log::info!("{}", timings.summary());
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        log::warn!("{} failed: {}", stage.description(), error);
    }
}
