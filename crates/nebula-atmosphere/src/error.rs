//! Atmosphere error types.

/// Errors raised while setting up an atmosphere.
///
/// Evaluation itself never fails; numerical degeneracies are clamped instead.
#[derive(Debug, thiserror::Error)]
pub enum AtmosphereError {
    /// A lookup table was requested with a zero dimension.
    #[error("lookup table dimensions must be non-zero, got {width}x{height}")]
    ZeroLutSize { width: u32, height: u32 },

    /// A ray march or direction count was zero.
    #[error("{name} must be at least 1")]
    ZeroSteps { name: &'static str },

    /// A physical constant is out of its usable range.
    #[error("invalid atmosphere parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}

impl AtmosphereError {
    pub(crate) fn invalid(name: &'static str, reason: &'static str) -> Self {
        Self::InvalidParameter { name, reason }
    }
}
