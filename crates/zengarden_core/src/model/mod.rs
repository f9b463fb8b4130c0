//! Domain records for gardens, journal entries, meditation and ambient sound.
//!
//! # Responsibility
//! - Define the canonical data structures used by services and repositories.
//! - Own record-level validation shared by every storage backend.
//!
//! # Invariants
//! - User-created records are identified by UUID v4; catalog records by integer id.
//! - Timestamps are Unix epoch milliseconds.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod garden;
pub mod journal;
pub mod meditation;
pub mod sound;

/// Record-level validation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required text field is empty after trimming.
    BlankField(&'static str),
    /// A placed element carries a non-finite coordinate.
    NonFinitePosition { index: usize },
    /// A placed element has a non-positive or non-finite scale.
    InvalidScale { index: usize, scale: f64 },
    /// A duration must be strictly positive.
    NonPositiveDuration(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::NonFinitePosition { index } => {
                write!(f, "element #{index} has a non-finite position")
            }
            Self::InvalidScale { index, scale } => {
                write!(f, "element #{index} has invalid scale {scale}")
            }
            Self::NonPositiveDuration(value) => write!(f, "duration must be positive, got {value}"),
        }
    }
}

impl Error for ValidationError {}
