#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_errors_doc)]

//! # bgmatte
//!
//! A deterministic foreground/background separation library. Given a raw
//! RGBA pixel buffer (and optionally a probability mask supplied by an
//! external segmentation provider), it produces an output buffer with an
//! alpha channel separating subject from background.
//!
//! The local pipeline is model-free: it estimates a dominant background
//! color from the image margins, detects edges with a Sobel kernel pair,
//! classifies foreground pixels by OR-combining color contrast, edge
//! strength, and a radial center bias, then cleans the mask with
//! morphological closing, Gaussian feathering, and photometric edge
//! correction before compositing.
//!
//! ## Features
//!
//! - **Provider seam**: plug in an external neural segmentation provider;
//!   absence or failure degrades silently to the local heuristic
//! - **Quality profiles**: `standard`, `high`, `ultra` parameter bundles for
//!   feathering, closing, and edge blur
//! - **Bounded inputs**: a configurable longest-edge cap downscales large
//!   images before processing, tracking the applied ratio
//! - **Deterministic**: identical inputs produce bit-identical outputs; no
//!   hidden state survives a call
//! - **CLI integration**: optional command-line interface (enable with the
//!   `cli` feature)
//! - **Optional parallelism**: the `rayon` feature partitions row loops of
//!   the heavy per-pixel transforms
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgmatte::{Quality, SeparationConfig, separate_from_bytes};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = SeparationConfig::builder()
//!     .quality(Quality::High)
//!     .build()?;
//!
//! let input = std::fs::read("input.jpg")?;
//! let result = separate_from_bytes(&input, &config)?;
//! result.save_png("output.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Using an external provider
//!
//! ```rust,no_run
//! use bgmatte::{
//!     ForegroundSeparator, PixelBuffer, Quality, SeparationConfig, SegmentationProvider, SoftMask,
//! };
//!
//! struct MyProvider;
//!
//! impl SegmentationProvider for MyProvider {
//!     fn is_ready(&self) -> bool {
//!         true
//!     }
//!
//!     fn segment(&self, buffer: &PixelBuffer, _quality: Quality) -> bgmatte::Result<SoftMask> {
//!         // call into the real model here
//!         let (w, h) = buffer.dimensions();
//!         Ok(SoftMask::new(vec![1.0; (w * h) as usize], (w, h)))
//!     }
//! }
//!
//! # fn example(image: image::DynamicImage) -> anyhow::Result<()> {
//! let separator = ForegroundSeparator::with_provider(
//!     SeparationConfig::default(),
//!     Box::new(MyProvider),
//! )?;
//! let result = separator.process_image(&image)?;
//! result.save_png("output.png")?;
//! # Ok(())
//! # }
//! ```

pub mod background;
pub mod classify;
pub mod compositor;
pub mod config;
pub mod edges;
pub mod error;
pub mod feather;
pub mod morphology;
pub mod processor;
pub mod provider;
pub mod refine;
pub mod services;
pub mod types;
pub mod utils;

#[cfg(feature = "cli")]
pub mod cli;

// Public API exports
pub use background::BackgroundEstimator;
pub use classify::ForegroundClassifier;
pub use compositor::Compositor;
pub use config::{OutputFormat, Quality, QualityProfile, SeparationConfig, SeparationConfigBuilder};
pub use edges::{EdgeDetector, GradientMap};
pub use error::{Result, SeparationError};
pub use feather::{FeatherFilter, GaussianKernel};
pub use morphology::MorphologyEngine;
pub use processor::ForegroundSeparator;
pub use provider::{Detection, DetectionProvider, SegmentationProvider, SubjectCategory};
pub use refine::MaskRefiner;
pub use services::{
    ConsoleProgressReporter, NoOpProgressReporter, ProcessingStage, ProgressReporter,
    ProgressUpdate,
};
pub use types::{
    BinaryMask, Mask, MaskSource, MaskStatistics, PixelBuffer, ProcessingMetadata,
    ProcessingTimings, Rgb, SeparationResult, SoftMask,
};

/// Separate foreground from an image provided as encoded bytes
///
/// Decodes the bytes with the `image` crate and runs the heuristic-only
/// pipeline. For provider-backed separation construct a
/// [`ForegroundSeparator`] directly.
///
/// # Errors
/// - `Processing` for undecodable bytes
/// - `InvalidInput` for zero-dimension images
pub fn separate_from_bytes(
    image_bytes: &[u8],
    config: &SeparationConfig,
) -> Result<SeparationResult> {
    ForegroundSeparator::new(config.clone())?.process_bytes(image_bytes)
}

/// Separate foreground from a decoded image
///
/// # Errors
/// - `InvalidInput` for zero-dimension images
pub fn separate_from_image(
    image: &image::DynamicImage,
    config: &SeparationConfig,
) -> Result<SeparationResult> {
    ForegroundSeparator::new(config.clone())?.process_image(image)
}
