//! Homeostatic controller lifecycle.
//!
//! A controller is constructed, connected once to a conductance or synapse, and
//! then integrated once per host timestep:
//!
//! 1. the law updates the synthesis state `m` from a calcium error
//! 2. `gdot = (dt/tau_g) * (m - value * scale)` is computed
//! 3. `gdot` is written to the target, clamped at zero
//!
//! Channels receive the update in their next-step buffer, synapses directly.

use hc_core::{MechanismId, clamp_non_negative};

use crate::binding::{Binding, TargetKind, UpdateMode};
use crate::error::{ControlError, ControlResult};
use crate::host::{MechanismHost, TargetRef};
use crate::law::{ControlLaw, CurrentFilter};

/// Number of values each controller contributes to the host's flat state vector.
pub const FULL_STATE_SIZE: usize = 2;

/// The only solver order the controllers support (explicit Euler).
pub const SUPPORTED_SOLVER_ORDER: i32 = 0;

/// A homeostatic controller regulating one conductance or synapse.
///
/// Built only through the law constructors (or `ControllerConfig::build`),
/// and bound only through [`Controller::connect`]. The timescales are fixed
/// once validated:
///
/// ```compile_fail
/// let mut c = hc_controls::Controller::integral(1.0, 1.0, 0.0).unwrap();
/// c.tau_g = -3.0;
/// ```
///
/// ```compile_fail
/// let c: hc_controls::Controller = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Controller {
    tau_m: f64,
    tau_g: f64,
    m: f64,
    law: ControlLaw,
    binding: Binding,
    container_area: f64,
}

impl Controller {
    fn with_law(law: ControlLaw, tau_m: f64, tau_g: f64, m: f64) -> ControlResult<Self> {
        // tau_m is taken as given; infinity freezes m.
        if !(tau_g > 0.0) {
            return Err(ControlError::InvalidTimescale {
                law: law.name(),
                what: "tau_g",
                value: tau_g,
            });
        }
        Ok(Self {
            tau_m,
            tau_g,
            m,
            law,
            binding: Binding::Unset,
            container_area: f64::NAN,
        })
    }

    /// Integral control on the calcium concentration error.
    pub fn integral(tau_m: f64, tau_g: f64, m: f64) -> ControlResult<Self> {
        Self::with_law(ControlLaw::Integral, tau_m, tau_g, m)
    }

    /// Bang-bang control on the sign of the calcium concentration error.
    pub fn bang_bang(tau_m: f64, tau_g: f64, m: f64) -> ControlResult<Self> {
        Self::with_law(ControlLaw::BangBang, tau_m, tau_g, m)
    }

    /// Integral control on a low-pass filtered calcium current error.
    ///
    /// # Arguments
    ///
    /// * `tau_m` - Synthesis timescale
    /// * `tau_g` - Update timescale (must be positive)
    /// * `tau_filter` - Current filter timescale
    /// * `m` - Initial synthesis state
    /// * `i_ca_smooth` - Initial filtered current
    /// * `i_ca_target` - Current set-point, NaN to disable
    pub fn current_integral(
        tau_m: f64,
        tau_g: f64,
        tau_filter: f64,
        m: f64,
        i_ca_smooth: f64,
        i_ca_target: f64,
    ) -> ControlResult<Self> {
        let filter = CurrentFilter::new(tau_filter, i_ca_smooth, i_ca_target);
        Self::with_law(ControlLaw::CurrentIntegral(filter), tau_m, tau_g, m)
    }

    /// Timescale of the synthesis state. Infinity freezes `m`.
    pub fn tau_m(&self) -> f64 {
        self.tau_m
    }

    /// Timescale of the conductance/strength update, always positive.
    pub fn tau_g(&self) -> f64 {
        self.tau_g
    }

    /// Synthesis state.
    pub fn m(&self) -> f64 {
        self.m
    }

    pub fn law(&self) -> &ControlLaw {
        &self.law
    }

    /// Variant name, e.g. `BangBangController`.
    pub fn name(&self) -> &'static str {
        self.law.name()
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Area of the housing compartment, NaN until connected.
    pub fn container_area(&self) -> f64 {
        self.container_area
    }

    /// Class name of the regulated channel, if bound to one.
    pub fn controlling_class(&self) -> Option<&str> {
        match &self.binding {
            Binding::Channel { class_name, .. } => Some(class_name),
            _ => None,
        }
    }

    /// How the bound target receives its update.
    pub fn update_mode(&self) -> Option<UpdateMode> {
        self.binding.kind().map(TargetKind::update_mode)
    }

    /// Bind this controller to its target and register it with the housing
    /// compartment under `id`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedTarget` for a compartment, always
    /// - `AlreadyConnected` if a previous connect succeeded
    /// - `UnknownTarget` if the host does not know an id involved
    pub fn connect<H: MechanismHost + ?Sized>(
        &mut self,
        id: MechanismId,
        target: TargetRef,
        host: &mut H,
    ) -> ControlResult<()> {
        let law = self.name();
        let unsupported = ControlError::UnsupportedTarget {
            law,
            kind: target.kind(),
        };
        if let TargetRef::Compartment(_) = target {
            return Err(unsupported);
        }
        if self.binding.is_bound() {
            return Err(ControlError::AlreadyConnected {
                law,
                bound: self.binding.describe(),
            });
        }

        let (binding, housing) = match target {
            TargetRef::Conductance(conductance) => {
                let channel = host.conductance(conductance).ok_or_else(|| unknown(law, target))?;
                let binding = Binding::Channel {
                    conductance,
                    class_name: channel.class_name.clone(),
                };
                (binding, channel.container)
            }
            TargetRef::Synapse(synapse) => {
                let syn = host.synapse(synapse).ok_or_else(|| unknown(law, target))?;
                (Binding::Synapse { synapse }, syn.post_syn)
            }
            TargetRef::Compartment(_) => return Err(unsupported),
        };

        let compartment = host
            .compartment_mut(housing)
            .ok_or_else(|| ControlError::UnknownTarget {
                law,
                what: format!("compartment {housing} housing {} {target:?}", target.kind()),
            })?;
        compartment.add_mechanism(id);
        self.container_area = compartment.area;
        self.binding = binding;

        tracing::debug!(
            law,
            mechanism = %id,
            target = target.kind(),
            area = self.container_area,
            "controller connected"
        );
        Ok(())
    }

    /// Advance the controller by one timestep of size `dt`.
    ///
    /// A NaN calcium set-point makes this a no-op for the step.
    pub fn integrate<H: MechanismHost + ?Sized>(
        &mut self,
        dt: f64,
        host: &mut H,
    ) -> ControlResult<()> {
        let law = self.name();
        let (kind, housing) = match &self.binding {
            Binding::Unset => return Err(ControlError::NotConnected { law }),
            Binding::Channel { conductance, .. } => {
                let target = TargetRef::Conductance(*conductance);
                let channel = host.conductance(*conductance).ok_or_else(|| unknown(law, target))?;
                (TargetKind::Channel, channel.container)
            }
            Binding::Synapse { synapse } => {
                let target = TargetRef::Synapse(*synapse);
                let syn = host.synapse(*synapse).ok_or_else(|| unknown(law, target))?;
                (TargetKind::Synapse, syn.post_syn)
            }
        };
        let compartment = host
            .compartment(housing)
            .ok_or_else(|| unknown(law, TargetRef::Compartment(housing)))?;

        let Some(error) = self.law.error_signal(kind, compartment, dt) else {
            tracing::trace!(law, "calcium target is NaN, controller disabled for this step");
            return Ok(());
        };

        self.m = self.law.advance(self.m, error, dt, self.tau_m);

        let value = self.target_value(&*host)?;
        let gdot = (dt / self.tau_g) * (self.m - value * kind.scale(self.container_area));
        let increment = kind.rescale_update(gdot, self.container_area);

        let slot = self.update_slot(host, kind.update_mode())?;
        *slot = clamp_non_negative(*slot + increment);
        Ok(())
    }

    /// Accept explicit Euler (order 0), reject everything else.
    pub fn check_solvers(&self, order: i32) -> ControlResult<()> {
        if order == SUPPORTED_SOLVER_ORDER {
            Ok(())
        } else {
            Err(ControlError::UnsupportedSolverOrder {
                law: self.name(),
                order,
            })
        }
    }

    /// Single state value by slot: `1` is `m`, `2` is the channel's `gbar`.
    ///
    /// Anything else, including slot `2` on a synapse, is NaN.
    pub fn state<H: MechanismHost + ?Sized>(&self, slot: usize, host: &H) -> f64 {
        match (slot, &self.binding) {
            (1, _) => self.m,
            (2, Binding::Channel { conductance, .. }) => host
                .conductance(*conductance)
                .map_or(f64::NAN, |channel| channel.gbar),
            _ => f64::NAN,
        }
    }

    pub fn full_state_size(&self) -> usize {
        FULL_STATE_SIZE
    }

    /// Write `m` and the regulated value at `offset` and return `offset + 2`.
    ///
    /// The regulated value is NaN for an unconnected controller.
    pub fn full_state<H: MechanismHost + ?Sized>(
        &self,
        buf: &mut [f64],
        offset: usize,
        host: &H,
    ) -> ControlResult<usize> {
        let Some(end) = offset
            .checked_add(FULL_STATE_SIZE)
            .filter(|&end| end <= buf.len())
        else {
            return Err(ControlError::StateBuffer {
                law: self.name(),
                needed: offset.saturating_add(FULL_STATE_SIZE - 1),
                len: buf.len(),
            });
        };
        buf[offset] = self.m;
        buf[offset + 1] = self.target_value(host).unwrap_or(f64::NAN);
        Ok(end)
    }

    /// Live regulated value: `gbar` for a channel, `gmax` for a synapse.
    fn target_value<H: MechanismHost + ?Sized>(&self, host: &H) -> ControlResult<f64> {
        let law = self.name();
        match &self.binding {
            Binding::Unset => Err(ControlError::NotConnected { law }),
            Binding::Channel { conductance, .. } => host
                .conductance(*conductance)
                .map(|channel| channel.gbar)
                .ok_or_else(|| unknown(law, TargetRef::Conductance(*conductance))),
            Binding::Synapse { synapse } => host
                .synapse(*synapse)
                .map(|syn| syn.gmax)
                .ok_or_else(|| unknown(law, TargetRef::Synapse(*synapse))),
        }
    }

    /// The field an update lands in for the given mode.
    fn update_slot<'h, H: MechanismHost + ?Sized>(
        &self,
        host: &'h mut H,
        mode: UpdateMode,
    ) -> ControlResult<&'h mut f64> {
        let law = self.name();
        match (&self.binding, mode) {
            (Binding::Channel { conductance, .. }, UpdateMode::Deferred) => host
                .conductance_mut(*conductance)
                .map(|channel| &mut channel.gbar_next)
                .ok_or_else(|| unknown(law, TargetRef::Conductance(*conductance))),
            (Binding::Synapse { synapse }, UpdateMode::Immediate) => host
                .synapse_mut(*synapse)
                .map(|syn| &mut syn.gmax)
                .ok_or_else(|| unknown(law, TargetRef::Synapse(*synapse))),
            _ => Err(ControlError::NotConnected { law }),
        }
    }
}

fn unknown(law: &'static str, target: TargetRef) -> ControlError {
    let what = match target {
        TargetRef::Conductance(id) => format!("conductance {id}"),
        TargetRef::Synapse(id) => format!("synapse {id}"),
        TargetRef::Compartment(id) => format!("compartment {id}"),
    };
    ControlError::UnknownTarget { law, what }
}
