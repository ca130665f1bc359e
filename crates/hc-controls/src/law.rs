//! Control laws for the synthesis state `m`.
//!
//! Provides three laws:
//! - **Integral**: `m` integrates the calcium concentration error
//! - **BangBang**: `m` moves by a fixed step in the direction of that error
//! - **CurrentIntegral**: `m` integrates the error of a low-pass filtered
//!   calcium current
//!
//! All laws are explicit-Euler, one step per call.

use hc_core::clamp_non_negative;
use serde::{Deserialize, Serialize};

use crate::binding::TargetKind;
use crate::host::CompartmentState;

/// Low-pass filter state for calcium-current control.
///
/// Dynamics: `d(smooth)/dt = (i_ca - smooth) / tau_filter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentFilter {
    /// Filter time constant.
    pub tau_filter: f64,
    /// Calcium current set-point. NaN disables the controller.
    pub i_ca_target: f64,
    /// Most recent `i_ca_smooth - i_ca_target`; NaN until the first update.
    pub i_ca_error: f64,
    /// Running low-pass estimate of the calcium current.
    pub i_ca_smooth: f64,
}

impl CurrentFilter {
    pub fn new(tau_filter: f64, i_ca_smooth: f64, i_ca_target: f64) -> Self {
        Self {
            tau_filter,
            i_ca_target,
            i_ca_error: f64::NAN,
            i_ca_smooth,
        }
    }

    /// Advance the filter by `dt` towards `i_ca` and return the new error.
    pub fn step(&mut self, i_ca: f64, dt: f64) -> f64 {
        self.i_ca_smooth += (dt / self.tau_filter) * (i_ca - self.i_ca_smooth);
        self.i_ca_error = self.i_ca_smooth - self.i_ca_target;
        self.i_ca_error
    }
}

/// Which law drives `m`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlLaw {
    Integral,
    BangBang,
    CurrentIntegral(CurrentFilter),
}

impl ControlLaw {
    /// Controller variant name, used as the prefix of every error message.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integral => "IntegralController",
            Self::BangBang => "BangBangController",
            Self::CurrentIntegral(_) => "CurrentIntegralController",
        }
    }

    /// Filter state, for the current-based law only.
    pub fn filter(&self) -> Option<&CurrentFilter> {
        match self {
            Self::CurrentIntegral(filter) => Some(filter),
            _ => None,
        }
    }

    /// Compute the error signal for this step.
    ///
    /// Returns `None` when the relevant set-point is NaN, i.e. the controller is
    /// disabled for this cycle. In that case no state is touched, including the
    /// current filter.
    pub fn error_signal(
        &mut self,
        kind: TargetKind,
        housing: &CompartmentState,
        dt: f64,
    ) -> Option<f64> {
        match (self, kind) {
            (Self::CurrentIntegral(filter), TargetKind::Channel) => {
                if filter.i_ca_target.is_nan() {
                    return None;
                }
                Some(filter.step(housing.i_ca_prev, dt))
            }
            // Synapses fall back to the concentration error for every law.
            _ => {
                if housing.homeostasis_disabled() {
                    return None;
                }
                Some(housing.ca_target - housing.ca_prev)
            }
        }
    }

    /// Advance `m` by one step of size `dt` and clamp it at zero.
    pub fn advance(&self, m: f64, error: f64, dt: f64, tau_m: f64) -> f64 {
        let next = match self {
            Self::Integral | Self::CurrentIntegral(_) => m + (dt / tau_m) * error,
            Self::BangBang => {
                if error > 0.0 {
                    m + dt / tau_m
                } else {
                    m - dt / tau_m
                }
            }
        };
        clamp_non_negative(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn housing(ca_target: f64, ca_prev: f64) -> CompartmentState {
        let mut comp = CompartmentState::new(1.0, ca_target);
        comp.ca_prev = ca_prev;
        comp
    }

    #[test]
    fn integral_is_proportional() {
        let law = ControlLaw::Integral;
        assert!((law.advance(1.0, 2.0, 1.0, 4.0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn bang_bang_uses_sign_only() {
        let law = ControlLaw::BangBang;
        assert!((law.advance(1.0, 5.0, 1.0, 10.0) - 1.1).abs() < 1e-12);
        assert!((law.advance(1.0, 500.0, 1.0, 10.0) - 1.1).abs() < 1e-12);
        assert!((law.advance(1.0, -5.0, 1.0, 10.0) - 0.9).abs() < 1e-12);
        // zero error counts as "not above target"
        assert!((law.advance(1.0, 0.0, 1.0, 10.0) - 0.9).abs() < 1e-12);
        assert_eq!(law.advance(0.05, -5.0, 1.0, 10.0), 0.0);
    }

    #[test]
    fn infinite_tau_m_freezes_m() {
        for law in [
            ControlLaw::Integral,
            ControlLaw::BangBang,
            ControlLaw::CurrentIntegral(CurrentFilter::new(1.0, 0.0, 0.0)),
        ] {
            assert_eq!(law.advance(3.0, 2.0, 0.1, f64::INFINITY), 3.0);
        }
    }

    #[test]
    fn concentration_error_and_disable() {
        let mut law = ControlLaw::Integral;
        let err = law.error_signal(TargetKind::Channel, &housing(7.0, 5.0), 0.1);
        assert_eq!(err, Some(2.0));
        let err = law.error_signal(TargetKind::Synapse, &housing(f64::NAN, 5.0), 0.1);
        assert_eq!(err, None);
    }

    #[test]
    fn current_law_filters_on_channels() {
        let mut law = ControlLaw::CurrentIntegral(CurrentFilter::new(10.0, 0.0, -2.0));
        let mut comp = housing(f64::NAN, 0.0);
        comp.i_ca_prev = -10.0;

        // Concentration target is ignored on the channel path.
        let err = law.error_signal(TargetKind::Channel, &comp, 1.0).unwrap();
        assert!((err - 1.0).abs() < 1e-12); // smooth = -1, error = -1 - (-2)
        let filter = law.filter().unwrap();
        assert!((filter.i_ca_smooth + 1.0).abs() < 1e-12);
        assert_eq!(filter.i_ca_error, err);
    }

    #[test]
    fn current_law_disabled_leaves_filter_alone() {
        let mut law = ControlLaw::CurrentIntegral(CurrentFilter::new(10.0, 0.5, f64::NAN));
        let mut comp = housing(7.0, 0.0);
        comp.i_ca_prev = -10.0;
        assert_eq!(law.error_signal(TargetKind::Channel, &comp, 1.0), None);
        assert_eq!(law.filter().unwrap().i_ca_smooth, 0.5);
    }

    #[test]
    fn current_law_synapse_uses_concentration() {
        let mut law = ControlLaw::CurrentIntegral(CurrentFilter::new(10.0, 0.5, f64::NAN));
        let err = law.error_signal(TargetKind::Synapse, &housing(7.0, 4.0), 1.0);
        assert_eq!(err, Some(3.0));
        assert_eq!(law.filter().unwrap().i_ca_smooth, 0.5);
    }

    #[test]
    fn names() {
        assert_eq!(ControlLaw::Integral.name(), "IntegralController");
        assert_eq!(ControlLaw::BangBang.name(), "BangBangController");
        assert_eq!(
            ControlLaw::CurrentIntegral(CurrentFilter::new(1.0, 0.0, 0.0)).name(),
            "CurrentIntegralController"
        );
    }
}
