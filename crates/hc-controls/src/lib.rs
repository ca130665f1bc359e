//! Homeostatic controllers for biophysical neuron simulations.
//!
//! A controller slowly regulates one ion channel's conductance density or one
//! synapse's maximal strength from an intracellular calcium error, through an
//! internal synthesis state `m`.
//!
//! # Architecture
//!
//! - [`ControlLaw`] decides how `m` responds to the error (integral, bang-bang,
//!   or integral on a filtered calcium current)
//! - [`Binding`] records what the controller is attached to
//! - [`MechanismHost`] is the host simulation's side of the contract: id-based
//!   access to compartments, conductances and synapses
//! - [`Controller`] ties these together: connect once, then integrate once per
//!   host timestep
//!
//! Controllers do not own a clock. The host passes `dt` into every
//! [`Controller::integrate`] call and commits deferred channel updates itself.

pub mod binding;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod law;

pub use binding::{Binding, TargetKind, UpdateMode};
pub use config::ControllerConfig;
pub use controller::{Controller, FULL_STATE_SIZE, SUPPORTED_SOLVER_ORDER};
pub use error::{ControlError, ControlResult};
pub use host::{CompartmentState, ConductanceState, MechanismHost, SynapseState, TargetRef};
pub use law::{ControlLaw, CurrentFilter};
