//! Simulation runner and result recording.

use hc_controls::SUPPORTED_SOLVER_ORDER;
use hc_core::ensure_finite;

use crate::calcium::CalciumModel;
use crate::error::{SimError, SimResult};
use crate::network::Network;

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Fixed time step
    pub dt: f64,
    /// Final simulation time
    pub t_end: f64,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
    /// Solver order negotiated with the controllers
    pub solver_order: i32,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 0.1,
            t_end: 1000.0,
            max_steps: 1_000_000,
            record_every: 10,
            solver_order: SUPPORTED_SOLVER_ORDER,
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        let dt = ensure_finite(self.dt, "dt")?;
        if dt <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if self.t_end < 0.0 {
            return Err(SimError::InvalidArg {
                what: "t_end must be non-negative",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        if self.record_every == 0 {
            return Err(SimError::InvalidArg {
                what: "record_every must be positive",
            });
        }
        Ok(())
    }
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord {
    /// Time points
    pub t: Vec<f64>,
    /// Flat controller state vectors, see [`Network::full_state`]
    pub x: Vec<Vec<f64>>,
}

/// Run `network` against a calcium plant with fixed explicit-Euler steps.
///
/// Each step updates calcium first, then integrates every controller and
/// commits the channel updates.
pub fn run_sim<C: CalciumModel>(
    network: &mut Network,
    calcium: &mut C,
    opts: &SimOptions,
) -> SimResult<SimRecord> {
    opts.validate()?;
    network.check_solvers(opts.solver_order)?;

    tracing::info!(
        controllers = network.controllers().len(),
        dt = opts.dt,
        t_end = opts.t_end,
        "starting homeostasis run"
    );

    let mut t = 0.0;
    let mut t_record = vec![t];
    let mut x_record = vec![network.full_state()?];

    let mut step = 0;
    while t < opts.t_end && step < opts.max_steps {
        calcium.update(opts.dt, &mut network.cells)?;
        network.step(opts.dt)?;
        t += opts.dt;
        step += 1;

        if step % opts.record_every == 0 {
            t_record.push(t);
            x_record.push(network.full_state()?);
        }
    }

    // Always record final state
    if step % opts.record_every != 0 {
        t_record.push(t);
        x_record.push(network.full_state()?);
    }

    tracing::info!(steps = step, t, "homeostasis run finished");

    Ok(SimRecord {
        t: t_record,
        x: x_record,
    })
}
