//! hc-core: shared foundation for the homeostatic controller crates.
//!
//! Contains:
//! - numeric (tolerances + float helpers)
//! - ids (compact IDs for compartments, conductances, synapses, mechanisms)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;

pub use error::{HcError, HcResult};
pub use ids::*;
pub use numeric::*;
