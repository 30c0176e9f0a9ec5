//! Error type shared by the network, evolution and persistence layers.

use thiserror::Error;

/// Failures raised by the neuro-evolution engine.
///
/// Every variant aborts only the call that produced it. None of the
/// operations returning these errors leave a partially modified receiver.
#[derive(Debug, Error)]
pub enum EvoError {
    /// A layer-size sequence that cannot describe a network.
    #[error("invalid topology {layer_sizes:?}: {reason}")]
    InvalidTopology {
        /// The offending layer sizes (as far as they could be inferred).
        layer_sizes: Vec<usize>,
        /// What is wrong with them.
        reason: &'static str,
    },
    /// An input vector whose width does not match the network's input layer.
    #[error("dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch {
        /// Width the network accepts.
        expected: usize,
        /// Width that was supplied.
        actual: usize,
    },
    /// Two networks that were expected to share a topology do not.
    #[error("topology mismatch: {left:?} vs {right:?}")]
    TopologyMismatch {
        /// Layer sizes of the first network.
        left: Vec<usize>,
        /// Layer sizes of the second network.
        right: Vec<usize>,
    },
    /// A persisted population that cannot be turned back into birds.
    #[error("malformed population document: {0}")]
    MalformedDocument(String),
    /// Configuration values outside their valid range.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// Reading or writing a population file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = EvoError> = std::result::Result<T, E>;
