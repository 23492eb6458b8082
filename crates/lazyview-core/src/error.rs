#![forbid(unsafe_code)]

//! Geometry precondition errors.
//!
//! These are caller bugs, not runtime states: a list configured with a zero
//! item height cannot be windowed at all. They surface once, at the point a
//! [`WindowGeometry`](crate::window::WindowGeometry) is built.

/// Invalid windowing geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    /// Item height was zero, negative, NaN or infinite.
    NonPositiveItemHeight(f64),
    /// Container height was negative, NaN or infinite.
    InvalidContainerHeight(f64),
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveItemHeight(h) => {
                write!(f, "item height must be positive and finite, got {h}")
            }
            Self::InvalidContainerHeight(h) => {
                write!(f, "container height must be non-negative and finite, got {h}")
            }
        }
    }
}

impl std::error::Error for GeometryError {}
