//! Configuration for the collision subsystem.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for narrow-phase contact generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionConfig {
    /// Hard cap on V-Clip state transitions before the query fails.
    ///
    /// The closest-feature walk only terminates for well-formed convex
    /// input; hitting this cap is reported as an error, never approximated.
    pub max_vclip_iterations: usize,
    /// Separation below which closed-form routines still report a contact
    /// (with zero penetration). Zero reports only touching or overlapping pairs.
    pub contact_margin: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            max_vclip_iterations: 1000,
            contact_margin: 0.0,
        }
    }
}

impl CollisionConfig {
    /// A configuration with a low iteration cap, useful in tests to surface
    /// cycling feature walks quickly.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_vclip_iterations: 64,
            ..Default::default()
        }
    }

    /// Set the V-Clip iteration cap.
    #[must_use]
    pub fn with_max_vclip_iterations(mut self, max: usize) -> Self {
        self.max_vclip_iterations = max;
        self
    }

    /// Set the contact margin.
    #[must_use]
    pub fn with_contact_margin(mut self, margin: f64) -> Self {
        self.contact_margin = margin;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_vclip_iterations == 0 {
            return Err(crate::SimError::invalid_config(
                "max_vclip_iterations must be at least 1",
            ));
        }

        if !self.contact_margin.is_finite() || self.contact_margin < 0.0 {
            return Err(crate::SimError::invalid_config(format!(
                "contact_margin must be finite and non-negative, got {}",
                self.contact_margin
            )));
        }

        Ok(())
    }
}
