//! Reference host for homeostatic controllers.
//!
//! Provides:
//! - storage for compartments, conductances and synapses behind
//!   [`hc_controls::MechanismHost`]
//! - a network that owns controllers and steps them with a double-buffered
//!   conductance commit
//! - pluggable calcium plants
//! - a fixed-step run loop that records the flat controller state vector

pub mod calcium;
pub mod cells;
pub mod error;
pub mod network;
pub mod sim;

pub use calcium::{CalciumModel, HeldCalcium, LinearCalcium};
pub use cells::Cells;
pub use error::{SimError, SimResult};
pub use network::Network;
pub use sim::{SimOptions, SimRecord, run_sim};
