//! Error types for controller operations.
//!
//! Every variant is fatal for the run that raised it: these are configuration
//! mistakes, not transient failures, and nothing retries them.

use thiserror::Error;

/// Result type for controller operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors raised by homeostatic controllers.
///
/// `law` is the controller variant name, e.g. `IntegralController`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// A timescale failed construction-time validation.
    #[error("[{law}] {what} must be > 0. Perhaps you meant to set it to Inf? (got {value})")]
    InvalidTimescale {
        law: &'static str,
        what: &'static str,
        value: f64,
    },

    /// `connect` was given a target kind the controller cannot regulate.
    #[error("[{law}] This mechanism cannot connect to a {kind} object")]
    UnsupportedTarget { law: &'static str, kind: &'static str },

    /// `connect` was called on a controller that is already bound.
    #[error("[{law}] controller is already connected to a {bound}")]
    AlreadyConnected { law: &'static str, bound: &'static str },

    /// `integrate` was called before any successful `connect`.
    #[error(
        "[{law}] misconfigured controller. Make sure this object is contained by a conductance or synapse object"
    )]
    NotConnected { law: &'static str },

    /// The host has no object behind an id the controller refers to.
    #[error("[{law}] unknown target: {what}")]
    UnknownTarget { law: &'static str, what: String },

    /// The host negotiated an integration order other than explicit Euler.
    #[error("[{law}] unsupported solver order {order}")]
    UnsupportedSolverOrder { law: &'static str, order: i32 },

    /// The full-state export buffer cannot hold this controller's slots.
    #[error("[{law}] state buffer too small: need index {needed}, len {len}")]
    StateBuffer {
        law: &'static str,
        needed: usize,
        len: usize,
    },

    /// Controller configuration could not be parsed.
    #[error("Controller configuration error: {what}")]
    Config { what: String },
}
