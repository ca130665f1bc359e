//! Calcium plants driving the controllers' error signals.
//!
//! A plant updates `ca_prev` and `i_ca_prev` of every compartment once per
//! step, before the controllers run.

use hc_core::Id;

use crate::cells::Cells;
use crate::error::{SimError, SimResult};

/// Source of calcium concentration and current for each compartment.
pub trait CalciumModel {
    /// Advance the calcium state of `cells` by `dt`.
    fn update(&mut self, dt: f64, cells: &mut Cells) -> SimResult<()>;
}

/// Leaves calcium wherever the caller put it.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeldCalcium;

impl CalciumModel for HeldCalcium {
    fn update(&mut self, _dt: f64, _cells: &mut Cells) -> SimResult<()> {
        Ok(())
    }
}

/// First-order calcium plant driven linearly by the regulated conductances.
///
/// Per compartment, with `drive = channel_gain * sum(gbar) + synapse_gain * sum(gmax)`:
/// - `d(ca)/dt = (drive - ca) / tau_ca`
/// - `i_ca = -drive` (inward current is negative)
///
/// More conductance raises calcium, so every law closes a negative feedback
/// loop through it.
#[derive(Debug, Clone, Copy)]
pub struct LinearCalcium {
    /// Calcium time constant, must be positive.
    pub tau_ca: f64,
    /// Calcium per unit channel conductance density.
    pub channel_gain: f64,
    /// Calcium per unit synaptic strength.
    pub synapse_gain: f64,
}

impl LinearCalcium {
    pub fn new(tau_ca: f64, channel_gain: f64, synapse_gain: f64) -> SimResult<Self> {
        if tau_ca <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "tau_ca must be positive",
            });
        }
        Ok(Self {
            tau_ca,
            channel_gain,
            synapse_gain,
        })
    }

    /// Calcium drive of the compartment at `index`.
    pub fn drive(&self, cells: &Cells, index: usize) -> f64 {
        let id = Id::from_index(index as u32);
        self.channel_gain * cells.channel_density(id)
            + self.synapse_gain * cells.synaptic_strength(id)
    }
}

impl CalciumModel for LinearCalcium {
    fn update(&mut self, dt: f64, cells: &mut Cells) -> SimResult<()> {
        let view: &Cells = cells;
        let drives: Vec<f64> = (0..view.compartments().len())
            .map(|i| self.drive(view, i))
            .collect();
        for (comp, drive) in cells.compartments_mut().iter_mut().zip(drives) {
            comp.ca_prev += (dt / self.tau_ca) * (drive - comp.ca_prev);
            comp.i_ca_prev = -drive;
        }
        Ok(())
    }
}
