//! Collector error type.
//!
//! The host crate's own `Cargo.toml` records that it dropped `thiserror` in
//! favor of hand-rolled error enums; this crate follows the same convention
//! rather than pull in a derive macro for seven variants.

use std::fmt;

/// Errors produced by the collector's public API.
///
/// [`GcError::is_fatal`] distinguishes conditions a caller must treat as a
/// terminal failure (heap genuinely exhausted) from recoverable programmer
/// misuse that a debug build should catch early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcError {
    /// Allocation still failed after a collection pass ran.
    OutOfMemory,
    /// A major collection could not fit the objects being promoted into it.
    MajorCollectionOverflow,
    /// Internal: `chase` could not bump-allocate into the destination region.
    ///
    /// Never escapes the `gc` module; callers only ever see
    /// [`GcError::MajorCollectionOverflow`] once the driver has exhausted its
    /// retry policy.
    PromotionFailed,
    /// `push_root` was called while the root registry was already at capacity.
    RootStackOverflow,
    /// `pop_root` was called on an empty root registry.
    RootStackUnderflow,
    /// The remembered set reached its configured capacity and could not be
    /// drained by a forced minor collection.
    BarrierOverflow,
    /// A region was configured with a size that isn't a positive multiple of
    /// the word size.
    InvalidRegionSize,
}

impl fmt::Display for GcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GcError::OutOfMemory => {
                write!(f, "heap exhausted: allocation failed even after a collection")
            }
            GcError::MajorCollectionOverflow => write!(
                f,
                "major collection could not fit the objects being promoted into it"
            ),
            GcError::PromotionFailed => write!(
                f,
                "old generation has insufficient space to accept a promoted object"
            ),
            GcError::RootStackOverflow => {
                write!(f, "root registry exceeded its configured capacity")
            }
            GcError::RootStackUnderflow => write!(f, "pop_root called on an empty root registry"),
            GcError::BarrierOverflow => {
                write!(f, "remembered set exceeded its configured capacity")
            }
            GcError::InvalidRegionSize => write!(
                f,
                "region size must be a positive multiple of the word size"
            ),
        }
    }
}

impl std::error::Error for GcError {}

impl GcError {
    /// True for conditions the driver cannot recover from: the process
    /// should terminate (or the embedder should propagate a fatal failure)
    /// rather than retry.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GcError::OutOfMemory | GcError::MajorCollectionOverflow)
    }
}
