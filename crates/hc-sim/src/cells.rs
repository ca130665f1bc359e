//! Compartment, conductance and synapse storage.

use hc_controls::{CompartmentState, ConductanceState, MechanismHost, SynapseState};
use hc_core::{CompartmentId, ConductanceId, HcError, HcResult, Id, SynapseId, ensure_finite};

use crate::error::{SimError, SimResult};

/// Flat, index-addressed storage for everything controllers can be attached to.
#[derive(Debug, Clone, Default)]
pub struct Cells {
    compartments: Vec<CompartmentState>,
    conductances: Vec<ConductanceState>,
    synapses: Vec<SynapseState>,
}

impl Cells {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a compartment. `ca_target` may be NaN to switch homeostasis off.
    pub fn add_compartment(&mut self, area: f64, ca_target: f64) -> SimResult<CompartmentId> {
        let area = ensure_finite(area, "compartment area")?;
        if area <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "compartment area must be positive",
            });
        }
        self.compartments
            .push(CompartmentState::new(area, ca_target));
        Ok(Id::from_index(self.compartments.len() as u32 - 1))
    }

    /// Add a channel housed in `container`.
    pub fn add_conductance(
        &mut self,
        class_name: impl Into<String>,
        gbar: f64,
        container: CompartmentId,
    ) -> SimResult<ConductanceId> {
        self.check_compartment(container, "conductance container")?;
        self.conductances
            .push(ConductanceState::new(class_name, gbar, container));
        Ok(Id::from_index(self.conductances.len() as u32 - 1))
    }

    /// Add a synapse onto `post_syn`.
    pub fn add_synapse(&mut self, gmax: f64, post_syn: CompartmentId) -> SimResult<SynapseId> {
        self.check_compartment(post_syn, "post-synaptic compartment")?;
        self.synapses.push(SynapseState::new(gmax, post_syn));
        Ok(Id::from_index(self.synapses.len() as u32 - 1))
    }

    fn check_compartment(&self, id: CompartmentId, what: &'static str) -> HcResult<()> {
        if id.slot() < self.compartments.len() {
            Ok(())
        } else {
            Err(HcError::IndexOob {
                what,
                index: id.slot(),
                len: self.compartments.len(),
            })
        }
    }

    pub fn compartments(&self) -> &[CompartmentState] {
        &self.compartments
    }

    pub fn compartments_mut(&mut self) -> &mut [CompartmentState] {
        &mut self.compartments
    }

    pub fn conductances(&self) -> &[ConductanceState] {
        &self.conductances
    }

    pub fn synapses(&self) -> &[SynapseState] {
        &self.synapses
    }

    /// Total conductance density of the channels housed in `compartment`.
    pub fn channel_density(&self, compartment: CompartmentId) -> f64 {
        self.conductances
            .iter()
            .filter(|g| g.container == compartment)
            .map(|g| g.gbar)
            .sum()
    }

    /// Total maximal strength of the synapses onto `compartment`.
    pub fn synaptic_strength(&self, compartment: CompartmentId) -> f64 {
        self.synapses
            .iter()
            .filter(|s| s.post_syn == compartment)
            .map(|s| s.gmax)
            .sum()
    }

    /// Start a step: every next-step buffer begins from the live value.
    pub fn begin_step(&mut self) {
        for g in &mut self.conductances {
            g.gbar_next = g.gbar;
        }
    }

    /// Commit phase: deferred channel updates become live.
    pub fn commit(&mut self) {
        for g in &mut self.conductances {
            g.gbar = g.gbar_next;
        }
    }
}

impl MechanismHost for Cells {
    fn compartment(&self, id: CompartmentId) -> Option<&CompartmentState> {
        self.compartments.get(id.slot())
    }

    fn compartment_mut(&mut self, id: CompartmentId) -> Option<&mut CompartmentState> {
        self.compartments.get_mut(id.slot())
    }

    fn conductance(&self, id: ConductanceId) -> Option<&ConductanceState> {
        self.conductances.get(id.slot())
    }

    fn conductance_mut(&mut self, id: ConductanceId) -> Option<&mut ConductanceState> {
        self.conductances.get_mut(id.slot())
    }

    fn synapse(&self, id: SynapseId) -> Option<&SynapseState> {
        self.synapses.get(id.slot())
    }

    fn synapse_mut(&mut self, id: SynapseId) -> Option<&mut SynapseState> {
        self.synapses.get_mut(id.slot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_lookup() {
        let mut cells = Cells::new();
        let soma = cells.add_compartment(0.01, 7.0).unwrap();
        let na = cells.add_conductance("NaV", 1000.0, soma).unwrap();
        let ca = cells.add_conductance("CaT", 25.0, soma).unwrap();
        let syn = cells.add_synapse(3.0, soma).unwrap();

        assert_eq!(cells.conductance(na).unwrap().class_name, "NaV");
        assert_eq!(cells.conductance(ca).unwrap().gbar, 25.0);
        assert_eq!(cells.synapse(syn).unwrap().post_syn, soma);
        assert_eq!(cells.channel_density(soma), 1025.0);
        assert_eq!(cells.synaptic_strength(soma), 3.0);
        assert!(cells.conductance(Id::from_index(2)).is_none());
    }

    #[test]
    fn rejects_bad_geometry_and_dangling_parents() {
        let mut cells = Cells::new();
        assert!(matches!(
            cells.add_compartment(0.0, 7.0),
            Err(SimError::InvalidArg { .. })
        ));
        assert!(matches!(
            cells.add_compartment(f64::NAN, 7.0),
            Err(SimError::Backend { .. })
        ));
        assert!(cells.add_conductance("NaV", 1.0, Id::from_index(0)).is_err());
        assert!(cells.add_synapse(1.0, Id::from_index(0)).is_err());
    }

    #[test]
    fn commit_applies_deferred_updates() {
        let mut cells = Cells::new();
        let soma = cells.add_compartment(0.01, 7.0).unwrap();
        let g = cells.add_conductance("CaS", 10.0, soma).unwrap();

        cells.begin_step();
        cells.conductance_mut(g).unwrap().gbar_next += 2.5;
        assert_eq!(cells.conductance(g).unwrap().gbar, 10.0);
        cells.commit();
        assert_eq!(cells.conductance(g).unwrap().gbar, 12.5);

        cells.conductance_mut(g).unwrap().gbar_next = 99.0;
        cells.begin_step();
        assert_eq!(cells.conductance(g).unwrap().gbar_next, 12.5);
    }
}
