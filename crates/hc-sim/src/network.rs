//! A set of controllers attached to one [`Cells`] store.

use hc_controls::{Controller, ControllerConfig, TargetRef};
use hc_core::{HcError, Id, MechanismId};

use crate::cells::Cells;
use crate::error::SimResult;

/// Cells plus the controllers regulating them.
///
/// Controllers are stepped in the order they were added. Each sees the
/// synapse updates of the controllers before it; channel updates only become
/// visible after [`Network::step`] commits them.
#[derive(Debug, Clone, Default)]
pub struct Network {
    /// Objects the controllers regulate.
    pub cells: Cells,
    controllers: Vec<Controller>,
}

impl Network {
    pub fn new(cells: Cells) -> Self {
        Self {
            cells,
            controllers: Vec::new(),
        }
    }

    /// Take ownership of an unconnected controller.
    pub fn add_controller(&mut self, controller: Controller) -> MechanismId {
        self.controllers.push(controller);
        Id::from_index(self.controllers.len() as u32 - 1)
    }

    /// Connect a previously added controller to its target.
    pub fn connect(&mut self, id: MechanismId, target: TargetRef) -> SimResult<()> {
        let len = self.controllers.len();
        let controller = self
            .controllers
            .get_mut(id.slot())
            .ok_or(HcError::IndexOob {
                what: "controller",
                index: id.slot(),
                len,
            })?;
        controller.connect(id, target, &mut self.cells)?;
        Ok(())
    }

    /// Build a controller from its configuration and connect it in one go.
    pub fn attach(&mut self, config: &ControllerConfig, target: TargetRef) -> SimResult<MechanismId> {
        let id = self.add_controller(config.build()?);
        if let Err(e) = self.connect(id, target) {
            self.controllers.pop();
            return Err(e);
        }
        Ok(id)
    }

    pub fn controller(&self, id: MechanismId) -> Option<&Controller> {
        self.controllers.get(id.slot())
    }

    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    /// Ask every controller whether it supports the given solver order.
    pub fn check_solvers(&self, order: i32) -> SimResult<()> {
        for controller in &self.controllers {
            controller.check_solvers(order)?;
        }
        Ok(())
    }

    /// Integrate every controller once, then commit deferred channel updates.
    pub fn step(&mut self, dt: f64) -> SimResult<()> {
        self.cells.begin_step();
        for controller in &mut self.controllers {
            controller.integrate(dt, &mut self.cells)?;
        }
        self.cells.commit();
        Ok(())
    }

    /// Width of the flat controller state vector.
    pub fn full_state_size(&self) -> usize {
        self.controllers.iter().map(Controller::full_state_size).sum()
    }

    /// Flat state vector: `m` then the regulated value, per controller.
    pub fn full_state(&self) -> SimResult<Vec<f64>> {
        let mut buf = vec![0.0; self.full_state_size()];
        let mut idx = 0;
        for controller in &self.controllers {
            idx = controller.full_state(&mut buf, idx, &self.cells)?;
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use hc_controls::ControlError;

    fn soma_with_channel() -> (Network, TargetRef, TargetRef) {
        let mut cells = Cells::new();
        let soma = cells.add_compartment(0.01, 7.0).unwrap();
        let g = cells.add_conductance("CaT", 10.0, soma).unwrap();
        (
            Network::new(cells),
            TargetRef::Conductance(g),
            TargetRef::Compartment(soma),
        )
    }

    #[test]
    fn connect_registers_with_compartment() {
        let (mut net, channel, _) = soma_with_channel();
        let a = net.add_controller(Controller::integral(1.0, 1.0, 0.0).unwrap());
        let b = net.add_controller(Controller::bang_bang(1.0, 1.0, 0.0).unwrap());
        net.connect(a, channel).unwrap();
        net.connect(b, channel).unwrap();
        assert_eq!(net.cells.compartments()[0].mechanisms(), &[a, b]);
    }

    #[test]
    fn connect_unknown_controller_fails() {
        let (mut net, channel, _) = soma_with_channel();
        let err = net.connect(Id::from_index(3), channel).unwrap_err();
        assert!(matches!(err, SimError::Backend { .. }));
    }

    #[test]
    fn attach_drops_controller_that_fails_to_connect() {
        let (mut net, _, soma) = soma_with_channel();
        let cfg = ControllerConfig::Integral {
            tau_m: 1.0,
            tau_g: 1.0,
            m: 0.0,
        };
        let err = net.attach(&cfg, soma).unwrap_err();
        assert!(matches!(
            err,
            SimError::Control(ControlError::UnsupportedTarget { .. })
        ));
        assert!(net.controllers().is_empty());
        assert_eq!(net.full_state_size(), 0);
    }

    #[test]
    fn step_fails_for_unconnected_controller() {
        let (mut net, _, _) = soma_with_channel();
        net.add_controller(Controller::integral(1.0, 1.0, 0.0).unwrap());
        let err = net.step(0.1).unwrap_err();
        assert_eq!(
            err,
            SimError::Control(ControlError::NotConnected {
                law: "IntegralController"
            })
        );
    }

    #[test]
    fn step_commits_channel_updates() {
        let (mut net, channel, _) = soma_with_channel();
        let cfg = ControllerConfig::Integral {
            tau_m: f64::INFINITY,
            tau_g: 10.0,
            m: 0.2,
        };
        net.attach(&cfg, channel).unwrap();
        net.step(1.0).unwrap();
        let g = &net.cells.conductances()[0];
        assert!((g.gbar - 11.0).abs() < 1e-9);
        assert_eq!(g.gbar, g.gbar_next);
    }

    #[test]
    fn full_state_concatenates_controllers() {
        let (mut net, channel, _) = soma_with_channel();
        for m in [0.1, 0.2, 0.3] {
            let cfg = ControllerConfig::BangBang {
                tau_m: 1.0,
                tau_g: 1.0,
                m,
            };
            net.attach(&cfg, channel).unwrap();
        }
        assert_eq!(net.full_state_size(), 6);
        assert_eq!(
            net.full_state().unwrap(),
            vec![0.1, 10.0, 0.2, 10.0, 0.3, 10.0]
        );
    }

    #[test]
    fn solver_check_covers_all_controllers() {
        let (mut net, channel, _) = soma_with_channel();
        let cfg = ControllerConfig::Integral {
            tau_m: 1.0,
            tau_g: 1.0,
            m: 0.0,
        };
        net.attach(&cfg, channel).unwrap();
        assert!(net.check_solvers(0).is_ok());
        assert!(net.check_solvers(4).is_err());
    }
}
