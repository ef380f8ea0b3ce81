//! Unified foreground separation pipeline
//!
//! This module provides the `ForegroundSeparator` that consolidates the
//! stage orchestration: mask acquisition (provider or heuristic),
//! morphological cleanup, feathering, and compositing, with controlled
//! degradation to the heuristic path on failure.

use crate::{
    background::BackgroundEstimator,
    classify::ForegroundClassifier,
    compositor::Compositor,
    config::SeparationConfig,
    edges::EdgeDetector,
    error::{Result, SeparationError},
    feather::FeatherFilter,
    morphology::MorphologyEngine,
    provider::SegmentationProvider,
    refine::MaskRefiner,
    services::{ProcessingStage, ProgressReporter, ProgressUpdate},
    types::{
        BinaryMask, Mask, MaskSource, PixelBuffer, ProcessingMetadata, ProcessingTimings,
        SeparationResult, SoftMask,
    },
    utils::{preprocessing, DimensionValidator},
};
use image::DynamicImage;
use instant::Instant;
use log::{debug, warn};
use tracing::{info as trace_info, instrument, span, Level};

/// Provider coverage above which a pixel counts as foreground
/// (equivalent to alpha > 128 on the byte scale)
const COVERAGE_THRESHOLD: f32 = 128.0 / 255.0;

/// Stateless separation pipeline
///
/// Holds only configuration and the optional provider handle, both resolved
/// once at construction; processing methods take `&self` and never mutate
/// state across calls.
pub struct ForegroundSeparator {
    config: SeparationConfig,
    provider: Option<Box<dyn SegmentationProvider>>,
    reporter: Option<Box<dyn ProgressReporter>>,
}

impl ForegroundSeparator {
    /// Create a separator using only the local heuristic path
    ///
    /// # Errors
    /// Returns `InvalidConfig` for invalid configuration.
    pub fn new(config: SeparationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            provider: None,
            reporter: None,
        })
    }

    /// Create a separator that prefers an external segmentation provider
    ///
    /// # Errors
    /// Returns `InvalidConfig` for invalid configuration.
    pub fn with_provider(
        config: SeparationConfig,
        provider: Box<dyn SegmentationProvider>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            provider: Some(provider),
            reporter: None,
        })
    }

    /// Attach a progress reporter
    #[must_use]
    pub fn with_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &SeparationConfig {
        &self.config
    }

    /// Whether a segmentation provider is attached
    #[must_use]
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Separate foreground from a decoded image
    ///
    /// # Errors
    /// - `InvalidInput` for zero-dimension images
    /// - `Processing` when both the provider and heuristic paths fail
    pub fn process_image(&self, image: &DynamicImage) -> Result<SeparationResult> {
        let start = Instant::now();
        self.report(ProcessingStage::ImageLoading, start);
        let buffer = PixelBuffer::from_image(image)?;
        self.process_buffer(&buffer)
    }

    /// Separate foreground from encoded image bytes
    ///
    /// # Errors
    /// - `Processing` for undecodable bytes
    /// - Everything `process_image` can return
    pub fn process_bytes(&self, image_bytes: &[u8]) -> Result<SeparationResult> {
        let image = image::load_from_memory(image_bytes).map_err(|e| {
            SeparationError::processing(format!("failed to decode image from bytes: {}", e))
        })?;
        self.process_image(&image)
    }

    /// Separate foreground from a raw pixel buffer
    ///
    /// # Errors
    /// - `Processing` when both the provider and heuristic paths fail
    #[instrument(
        skip(self, buffer),
        fields(
            quality = %self.config.quality,
            dimensions = %format!("{}x{}", buffer.width(), buffer.height())
        )
    )]
    pub fn process_buffer(&self, buffer: &PixelBuffer) -> Result<SeparationResult> {
        DimensionValidator::validate_nonzero(buffer.dimensions())?;

        let total_start = Instant::now();
        let mut timings = ProcessingTimings::default();
        let original_dimensions = buffer.dimensions();

        trace_info!(quality = %self.config.quality, "starting separation");

        // Bound worst-case memory and time before entering the pipeline
        self.report(ProcessingStage::Preprocessing, total_start);
        let preprocess_start = Instant::now();
        let capped = {
            let _span = span!(
                Level::DEBUG,
                "preprocessing",
                max_edge = %self.config.max_edge
            )
            .entered();
            preprocessing::apply_edge_cap(buffer, self.config.max_edge)?
        };
        timings.preprocessing_ms = preprocess_start.elapsed().as_millis() as u64;

        let outcome = self.run_stages(&capped.buffer, true, &mut timings, total_start);
        let (out_buffer, final_mask, mask_source) = match outcome {
            Ok(staged) => staged,
            Err(e) if e.is_recoverable() && self.provider.is_some() => {
                warn!("pipeline failed ({}); retrying with the heuristic path only", e);
                if let Some(reporter) = &self.reporter {
                    reporter.report_error(ProcessingStage::MaskAcquisition, &e.to_string());
                }
                self.run_stages(&capped.buffer, false, &mut timings, total_start)?
            },
            Err(e) => return Err(e),
        };

        timings.total_ms = total_start.elapsed().as_millis() as u64;

        let metadata = ProcessingMetadata {
            timings: timings.clone(),
            quality: self.config.quality,
            mask_source,
            working_dimensions: out_buffer.dimensions(),
            scale: capped.scale,
        };

        let image = out_buffer.to_rgba_image()?;

        self.report(ProcessingStage::Completed, total_start);
        if let Some(reporter) = &self.reporter {
            reporter.report_completion(&timings);
        }

        Ok(SeparationResult {
            image,
            mask: final_mask,
            original_dimensions,
            metadata,
        })
    }

    /// Run mask acquisition through compositing on the working buffer
    fn run_stages(
        &self,
        buffer: &PixelBuffer,
        allow_provider: bool,
        timings: &mut ProcessingTimings,
        total_start: Instant,
    ) -> Result<(PixelBuffer, SoftMask, MaskSource)> {
        let profile = self.config.quality.profile();

        self.report(ProcessingStage::MaskAcquisition, total_start);
        let stage_start = Instant::now();
        let (raw_mask, mask_source) = {
            let _span = span!(Level::DEBUG, "mask_acquisition", provider_allowed = allow_provider)
                .entered();
            self.acquire_mask(buffer, allow_provider)
        };
        timings.mask_acquisition_ms = stage_start.elapsed().as_millis() as u64;

        self.report(ProcessingStage::Morphology, total_start);
        let stage_start = Instant::now();
        let closed = {
            let _span =
                span!(Level::DEBUG, "morphology", kernel = profile.dilation_radius).entered();
            MorphologyEngine::close(&raw_mask, profile.dilation_radius)
        };
        timings.morphology_ms = stage_start.elapsed().as_millis() as u64;

        self.report(ProcessingStage::Feathering, total_start);
        let stage_start = Instant::now();
        let final_mask = {
            let _span = span!(Level::DEBUG, "feathering", radius = profile.feather_radius).entered();
            match FeatherFilter::feather(&closed, profile.feather_radius) {
                // Soft transition bands can carry isolated misclassified
                // edge pixels; repair them from photometric context
                Mask::Soft(soft) => Mask::Soft(MaskRefiner::correct_edges(buffer, &soft)),
                binary => binary,
            }
        };
        timings.feathering_ms = stage_start.elapsed().as_millis() as u64;

        self.report(ProcessingStage::Compositing, total_start);
        let stage_start = Instant::now();
        let out_buffer = {
            let _span = span!(Level::DEBUG, "compositing", blur = %profile.blur_amount).entered();
            Compositor::composite(buffer, &final_mask, profile.blur_amount)?
        };
        timings.compositing_ms = stage_start.elapsed().as_millis() as u64;

        Ok((out_buffer, final_mask.into_soft(), mask_source))
    }

    /// Obtain the raw coverage mask, preferring the provider when allowed
    ///
    /// Provider absence, unreadiness, failure, or a mismatched mask all
    /// degrade silently to the heuristic path; this method cannot fail.
    fn acquire_mask(&self, buffer: &PixelBuffer, allow_provider: bool) -> (BinaryMask, MaskSource) {
        if allow_provider {
            if let Some(provider) = &self.provider {
                if provider.is_ready() {
                    match provider.segment(buffer, self.config.quality) {
                        Ok(soft) => {
                            match DimensionValidator::validate_mask_dimensions(
                                buffer.dimensions(),
                                soft.dimensions(),
                            ) {
                                Ok(()) => {
                                    debug!("using segmentation mask from '{}'", provider.name());
                                    return (
                                        Self::binarize_provider_mask(&soft),
                                        MaskSource::Provider,
                                    );
                                },
                                Err(e) => warn!(
                                    "provider '{}' returned unusable mask: {}",
                                    provider.name(),
                                    e
                                ),
                            }
                        },
                        Err(e) => {
                            warn!(
                                "provider '{}' failed: {}; using heuristic mask",
                                provider.name(),
                                e
                            );
                        },
                    }
                } else {
                    debug!("provider '{}' not ready; using heuristic mask", provider.name());
                }
            }
        }

        (self.heuristic_mask(buffer), MaskSource::Heuristic)
    }

    /// Model-free mask generation from local pixel statistics
    fn heuristic_mask(&self, buffer: &PixelBuffer) -> BinaryMask {
        let background = BackgroundEstimator::estimate(buffer);
        debug!("estimated background color {:?}", background);

        let gradient = EdgeDetector::detect(buffer);
        let classified = ForegroundClassifier::classify(buffer, background, &gradient);
        MaskRefiner::smooth(&classified)
    }

    /// Binarize a provider probability mask at coverage > 128/255
    fn binarize_provider_mask(soft: &SoftMask) -> BinaryMask {
        let data = soft
            .data()
            .iter()
            .map(|&v| u8::from(v > COVERAGE_THRESHOLD))
            .collect();
        BinaryMask::new(data, soft.dimensions())
    }

    fn report(&self, stage: ProcessingStage, start: Instant) {
        if let Some(reporter) = &self.reporter {
            reporter.report_progress(ProgressUpdate::new(stage, start));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Quality;

    struct StaticMaskProvider {
        coverage: f32,
        ready: bool,
    }

    impl SegmentationProvider for StaticMaskProvider {
        fn is_ready(&self) -> bool {
            self.ready
        }

        fn segment(&self, buffer: &PixelBuffer, _quality: Quality) -> Result<SoftMask> {
            let (width, height) = buffer.dimensions();
            Ok(SoftMask::new(
                vec![self.coverage; (width * height) as usize],
                (width, height),
            ))
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    struct FailingProvider;

    impl SegmentationProvider for FailingProvider {
        fn is_ready(&self) -> bool {
            true
        }

        fn segment(&self, _buffer: &PixelBuffer, _quality: Quality) -> Result<SoftMask> {
            Err(SeparationError::provider_unavailable("model crashed"))
        }
    }

    fn uniform_buffer(width: u32, height: u32, rgb: [u8; 3]) -> PixelBuffer {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        PixelBuffer::from_raw(width, height, data).unwrap()
    }

    #[test]
    fn test_provider_mask_is_preferred() {
        let config = SeparationConfig::builder()
            .quality(Quality::Standard)
            .build()
            .unwrap();
        let separator = ForegroundSeparator::with_provider(
            config,
            Box::new(StaticMaskProvider {
                coverage: 1.0,
                ready: true,
            }),
        )
        .unwrap();

        let buffer = uniform_buffer(16, 16, [30, 30, 30]);
        let result = separator.process_buffer(&buffer).unwrap();
        assert_eq!(result.metadata.mask_source, MaskSource::Provider);
        // Full-coverage provider mask keeps every pixel opaque
        assert!(result.image.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn test_unready_provider_degrades_to_heuristic() {
        let config = SeparationConfig::default();
        let separator = ForegroundSeparator::with_provider(
            config,
            Box::new(StaticMaskProvider {
                coverage: 1.0,
                ready: false,
            }),
        )
        .unwrap();

        let buffer = uniform_buffer(16, 16, [30, 30, 30]);
        let result = separator.process_buffer(&buffer).unwrap();
        assert_eq!(result.metadata.mask_source, MaskSource::Heuristic);
    }

    #[test]
    fn test_failing_provider_matches_heuristic_output() {
        let config = SeparationConfig::builder()
            .quality(Quality::Standard)
            .build()
            .unwrap();
        let buffer = uniform_buffer(20, 20, [80, 120, 160]);

        let with_failing =
            ForegroundSeparator::with_provider(config.clone(), Box::new(FailingProvider)).unwrap();
        let heuristic_only = ForegroundSeparator::new(config).unwrap();

        let fallback = with_failing.process_buffer(&buffer).unwrap();
        let direct = heuristic_only.process_buffer(&buffer).unwrap();

        assert_eq!(fallback.metadata.mask_source, MaskSource::Heuristic);
        assert_eq!(fallback.image.as_raw(), direct.image.as_raw());
        assert_eq!(fallback.mask.data(), direct.mask.data());
    }

    #[test]
    fn test_mismatched_provider_mask_degrades_to_heuristic() {
        struct WrongSizeProvider;

        impl SegmentationProvider for WrongSizeProvider {
            fn is_ready(&self) -> bool {
                true
            }

            fn segment(&self, _buffer: &PixelBuffer, _quality: Quality) -> Result<SoftMask> {
                Ok(SoftMask::new(vec![1.0; 4], (2, 2)))
            }
        }

        let separator =
            ForegroundSeparator::with_provider(SeparationConfig::default(), Box::new(WrongSizeProvider))
                .unwrap();
        let buffer = uniform_buffer(12, 12, [50, 50, 50]);
        let result = separator.process_buffer(&buffer).unwrap();
        assert_eq!(result.metadata.mask_source, MaskSource::Heuristic);
    }

    #[test]
    fn test_max_edge_cap_records_scale() {
        let config = SeparationConfig::builder().max_edge(8).build().unwrap();
        let separator = ForegroundSeparator::new(config).unwrap();
        let buffer = uniform_buffer(16, 16, [10, 10, 10]);

        let result = separator.process_buffer(&buffer).unwrap();
        assert_eq!(result.metadata.scale, 0.5);
        assert_eq!(result.metadata.working_dimensions, (8, 8));
        assert_eq!(result.original_dimensions, (16, 16));
        assert_eq!(result.dimensions(), (8, 8));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SeparationConfig {
            max_edge: 0,
            ..SeparationConfig::default()
        };
        assert!(ForegroundSeparator::new(config).is_err());
    }
}
