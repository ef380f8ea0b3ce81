//! Configuration types for separation operations

use serde::{Deserialize, Serialize};

/// Quality selector for separation operations
///
/// Each level maps to a fixed parameter bundle via [`Quality::profile`]. The
/// level is also forwarded to external providers as an advisory model hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    /// Fast, minimal cleanup
    Standard,
    /// Balanced cleanup (default)
    High,
    /// Maximum cleanup
    Ultra,
}

impl Quality {
    /// Resolve the fixed parameter bundle for this level
    #[must_use]
    pub fn profile(self) -> QualityProfile {
        match self {
            Self::Standard => QualityProfile {
                model_hint: self,
                feather_radius: 1,
                dilation_radius: 1,
                blur_amount: 0.5,
            },
            Self::High => QualityProfile {
                model_hint: self,
                feather_radius: 2,
                dilation_radius: 2,
                blur_amount: 1.0,
            },
            Self::Ultra => QualityProfile {
                model_hint: self,
                feather_radius: 3,
                dilation_radius: 3,
                blur_amount: 1.5,
            },
        }
    }

    /// Model-selection index forwarded to external providers (advisory only)
    #[must_use]
    pub fn model_index(self) -> u8 {
        match self {
            Self::Standard => 0,
            Self::High => 1,
            Self::Ultra => 2,
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::High
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::High => write!(f, "high"),
            Self::Ultra => write!(f, "ultra"),
        }
    }
}

impl std::str::FromStr for Quality {
    type Err = crate::error::SeparationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "high" => Ok(Self::High),
            "ultra" => Ok(Self::Ultra),
            other => Err(crate::error::SeparationError::invalid_config(format!(
                "unknown quality '{}', expected standard|high|ultra",
                other
            ))),
        }
    }
}

/// Fixed parameter bundle controlling output fidelity vs. cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityProfile {
    /// Advisory model hint for external providers
    pub model_hint: Quality,
    /// Gaussian feather kernel radius (0 = skip feathering)
    pub feather_radius: u32,
    /// Morphological closing kernel size (0 = skip closing)
    pub dilation_radius: u32,
    /// Post-composite transition-band blur strength (0 = skip)
    pub blur_amount: f32,
}

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    Png,
    /// Raw RGBA8 pixel data (4 bytes per pixel)
    Rgba8,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Png
    }
}

/// Configuration for separation operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparationConfig {
    /// Quality level (resolves to the fixed profile table)
    pub quality: Quality,

    /// Longest-edge cap applied before processing; larger inputs are
    /// downscaled proportionally and the ratio recorded in the result
    pub max_edge: u32,

    /// Output format
    pub output_format: OutputFormat,

    /// Enable debug mode (additional logging and validation)
    pub debug: bool,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            max_edge: 4096,
            output_format: OutputFormat::default(),
            debug: false,
        }
    }
}

impl SeparationConfig {
    /// Create a new configuration builder for fluent API construction
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bgmatte::{Quality, SeparationConfig};
    ///
    /// let config = SeparationConfig::builder()
    ///     .quality(Quality::Ultra)
    ///     .max_edge(2048)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.quality, Quality::Ultra);
    /// ```
    #[must_use]
    pub fn builder() -> SeparationConfigBuilder {
        SeparationConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the max-edge cap is zero.
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_edge == 0 {
            return Err(crate::error::SeparationError::invalid_config(
                "max edge cap must be at least 1 pixel",
            ));
        }
        Ok(())
    }
}

/// Builder for `SeparationConfig`
#[derive(Debug, Default)]
pub struct SeparationConfigBuilder {
    config: SeparationConfig,
}

impl SeparationConfigBuilder {
    /// Set quality level
    #[must_use]
    pub fn quality(mut self, quality: Quality) -> Self {
        self.config.quality = quality;
        self
    }

    /// Set the longest-edge cap
    #[must_use]
    pub fn max_edge(mut self, max_edge: u32) -> Self {
        self.config.max_edge = max_edge;
        self
    }

    /// Set output format
    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// Enable debug mode
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// Returns `InvalidConfig` for parameter validation failures.
    pub fn build(self) -> crate::Result<SeparationConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_profile_table() {
        let standard = Quality::Standard.profile();
        assert_eq!(standard.feather_radius, 1);
        assert_eq!(standard.dilation_radius, 1);
        assert_eq!(standard.blur_amount, 0.5);

        let high = Quality::High.profile();
        assert_eq!(high.feather_radius, 2);
        assert_eq!(high.dilation_radius, 2);
        assert_eq!(high.blur_amount, 1.0);

        let ultra = Quality::Ultra.profile();
        assert_eq!(ultra.feather_radius, 3);
        assert_eq!(ultra.dilation_radius, 3);
        assert_eq!(ultra.blur_amount, 1.5);
    }

    #[test]
    fn test_quality_parsing() {
        assert_eq!(Quality::from_str("standard").unwrap(), Quality::Standard);
        assert_eq!(Quality::from_str("ULTRA").unwrap(), Quality::Ultra);
        assert!(Quality::from_str("extreme").is_err());
        assert_eq!(Quality::High.to_string(), "high");
    }

    #[test]
    fn test_model_hint_indices() {
        assert_eq!(Quality::Standard.model_index(), 0);
        assert_eq!(Quality::High.model_index(), 1);
        assert_eq!(Quality::Ultra.model_index(), 2);
    }

    #[test]
    fn test_builder_validation() {
        let config = SeparationConfig::builder()
            .quality(Quality::Standard)
            .max_edge(1024)
            .debug(true)
            .build()
            .unwrap();
        assert_eq!(config.max_edge, 1024);
        assert!(config.debug);

        assert!(SeparationConfig::builder().max_edge(0).build().is_err());
    }
}
