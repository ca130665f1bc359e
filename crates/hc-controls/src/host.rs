//! Host-side objects a controller reads from and writes to.
//!
//! Controllers never own their targets. They hold ids and resolve them through
//! a [`MechanismHost`] every time they run, so a compartment can list the
//! controllers attached to it without any ownership cycle.

use hc_core::{CompartmentId, ConductanceId, MechanismId, SynapseId};
use serde::{Deserialize, Serialize};

/// Calcium bookkeeping and geometry of one compartment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompartmentState {
    /// Calcium set-point. NaN switches homeostasis off for everything housed here.
    pub ca_target: f64,
    /// Calcium concentration at the end of the previous step.
    pub ca_prev: f64,
    /// Calcium current at the end of the previous step.
    pub i_ca_prev: f64,
    /// Membrane surface area.
    pub area: f64,
    /// Mechanisms that announced themselves via [`CompartmentState::add_mechanism`].
    #[serde(default)]
    pub mechanisms: Vec<MechanismId>,
}

impl CompartmentState {
    /// Create a compartment with the given area and calcium set-point.
    pub fn new(area: f64, ca_target: f64) -> Self {
        Self {
            ca_target,
            ca_prev: 0.0,
            i_ca_prev: 0.0,
            area,
            mechanisms: Vec::new(),
        }
    }

    /// Register a mechanism with this compartment. Duplicates are ignored.
    pub fn add_mechanism(&mut self, id: MechanismId) {
        if !self.mechanisms.contains(&id) {
            self.mechanisms.push(id);
        }
    }

    /// Mechanisms registered so far, in registration order.
    pub fn mechanisms(&self) -> &[MechanismId] {
        &self.mechanisms
    }

    /// Whether calcium homeostasis is switched off for this compartment.
    pub fn homeostasis_disabled(&self) -> bool {
        self.ca_target.is_nan()
    }
}

/// An ion channel's regulated conductance density.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConductanceState {
    /// Channel family name, e.g. `NaV` or `CaT`.
    pub class_name: String,
    /// Conductance density in effect for the current step.
    pub gbar: f64,
    /// Conductance density the host commits at the end of the step.
    pub gbar_next: f64,
    /// Compartment housing the channel.
    pub container: CompartmentId,
}

impl ConductanceState {
    pub fn new(class_name: impl Into<String>, gbar: f64, container: CompartmentId) -> Self {
        Self {
            class_name: class_name.into(),
            gbar,
            gbar_next: gbar,
            container,
        }
    }
}

/// A synapse's regulated maximal strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynapseState {
    /// Maximal synaptic conductance.
    pub gmax: f64,
    /// Post-synaptic compartment.
    pub post_syn: CompartmentId,
}

impl SynapseState {
    pub fn new(gmax: f64, post_syn: CompartmentId) -> Self {
        Self { gmax, post_syn }
    }
}

/// What a controller is asked to connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
pub enum TargetRef {
    Conductance(ConductanceId),
    Synapse(SynapseId),
    Compartment(CompartmentId),
}

impl TargetRef {
    /// Human-readable target kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Conductance(_) => "conductance",
            Self::Synapse(_) => "synapse",
            Self::Compartment(_) => "compartment",
        }
    }
}

/// Id-based access to the objects a simulation host owns.
///
/// Implemented by the host; every lookup returns `None` for an id it never
/// handed out.
pub trait MechanismHost {
    fn compartment(&self, id: CompartmentId) -> Option<&CompartmentState>;
    fn compartment_mut(&mut self, id: CompartmentId) -> Option<&mut CompartmentState>;
    fn conductance(&self, id: ConductanceId) -> Option<&ConductanceState>;
    fn conductance_mut(&mut self, id: ConductanceId) -> Option<&mut ConductanceState>;
    fn synapse(&self, id: SynapseId) -> Option<&SynapseState>;
    fn synapse_mut(&mut self, id: SynapseId) -> Option<&mut SynapseState>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_core::Id;

    #[test]
    fn add_mechanism_ignores_duplicates() {
        let mut comp = CompartmentState::new(0.01, 7.0);
        comp.add_mechanism(Id::from_index(0));
        comp.add_mechanism(Id::from_index(1));
        comp.add_mechanism(Id::from_index(0));
        assert_eq!(comp.mechanisms(), &[Id::from_index(0), Id::from_index(1)]);
    }

    #[test]
    fn nan_target_disables_homeostasis() {
        assert!(CompartmentState::new(1.0, f64::NAN).homeostasis_disabled());
        assert!(!CompartmentState::new(1.0, 7.0).homeostasis_disabled());
    }

    #[test]
    fn new_conductance_starts_with_matching_buffers() {
        let g = ConductanceState::new("NaV", 1000.0, Id::from_index(0));
        assert_eq!(g.gbar, g.gbar_next);
        assert_eq!(g.class_name, "NaV");
    }

    #[test]
    fn target_ref_kind() {
        let id = Id::from_index(3);
        assert_eq!(TargetRef::Conductance(id).kind(), "conductance");
        assert_eq!(TargetRef::Synapse(id).kind(), "synapse");
        assert_eq!(TargetRef::Compartment(id).kind(), "compartment");
    }
}
