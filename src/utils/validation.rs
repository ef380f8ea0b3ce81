//! Input validation helpers

use crate::error::{Result, SeparationError};

/// Validates buffer and mask dimensions at the pipeline boundary
pub struct DimensionValidator;

impl DimensionValidator {
    /// Reject zero dimensions
    ///
    /// # Errors
    /// Returns `InvalidInput` when either dimension is zero.
    pub fn validate_nonzero(dimensions: (u32, u32)) -> Result<()> {
        if dimensions.0 == 0 || dimensions.1 == 0 {
            return Err(SeparationError::invalid_input(format!(
                "dimensions must be non-zero, got {}x{}",
                dimensions.0, dimensions.1
            )));
        }
        Ok(())
    }

    /// Require a mask to match its source buffer
    ///
    /// # Errors
    /// Returns `Processing` on a mismatch; provider masks failing this check
    /// trigger the heuristic fallback.
    pub fn validate_mask_dimensions(
        buffer_dimensions: (u32, u32),
        mask_dimensions: (u32, u32),
    ) -> Result<()> {
        if buffer_dimensions != mask_dimensions {
            return Err(SeparationError::processing(format!(
                "mask dimensions {}x{} do not match buffer {}x{}",
                mask_dimensions.0, mask_dimensions.1, buffer_dimensions.0, buffer_dimensions.1
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonzero_validation() {
        assert!(DimensionValidator::validate_nonzero((1, 1)).is_ok());
        assert!(DimensionValidator::validate_nonzero((0, 5)).is_err());
        assert!(DimensionValidator::validate_nonzero((5, 0)).is_err());
    }

    #[test]
    fn test_mask_dimension_validation() {
        assert!(DimensionValidator::validate_mask_dimensions((4, 4), (4, 4)).is_ok());
        let err = DimensionValidator::validate_mask_dimensions((4, 4), (3, 4)).unwrap_err();
        assert!(matches!(err, SeparationError::Processing(_)));
    }
}
