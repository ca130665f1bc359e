//! What a controller is bound to.

use hc_core::{ConductanceId, SynapseId};
use serde::{Deserialize, Serialize};

/// Kind of object a bound controller regulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Channel,
    Synapse,
}

/// How a regulated value picks up its update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateMode {
    /// Written to a next-step buffer that the host commits after all mechanisms ran.
    Deferred,
    /// Written to the live value.
    Immediate,
}

impl TargetKind {
    /// Channels are double-buffered, synapses are updated in place.
    pub fn update_mode(self) -> UpdateMode {
        match self {
            Self::Channel => UpdateMode::Deferred,
            Self::Synapse => UpdateMode::Immediate,
        }
    }

    /// Factor taking the regulated value into the units of `m`.
    ///
    /// Channels use the housing area; synapse strengths are rescaled by 1e-3.
    pub fn scale(self, container_area: f64) -> f64 {
        match self {
            Self::Channel => container_area,
            Self::Synapse => 1e-3,
        }
    }

    /// Convert an update expressed in units of `m` back into the target's units.
    pub fn rescale_update(self, gdot: f64, container_area: f64) -> f64 {
        match self {
            Self::Channel => gdot / container_area,
            Self::Synapse => gdot * 1e3,
        }
    }
}

/// Connection state of a controller.
///
/// Starts `Unset`, moves to `Channel` or `Synapse` on the first successful
/// connect and never changes again.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Binding {
    #[default]
    Unset,
    Channel {
        conductance: ConductanceId,
        /// Family name of the regulated channel, kept for diagnostics.
        class_name: String,
    },
    Synapse {
        synapse: SynapseId,
    },
}

impl Binding {
    /// Target kind, or `None` while unset.
    pub fn kind(&self) -> Option<TargetKind> {
        match self {
            Self::Unset => None,
            Self::Channel { .. } => Some(TargetKind::Channel),
            Self::Synapse { .. } => Some(TargetKind::Synapse),
        }
    }

    pub fn is_bound(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Unset => "nothing",
            Self::Channel { .. } => "conductance",
            Self::Synapse { .. } => "synapse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_core::Id;

    #[test]
    fn unset_by_default() {
        let b = Binding::default();
        assert!(!b.is_bound());
        assert_eq!(b.kind(), None);
    }

    #[test]
    fn update_modes_differ_by_kind() {
        assert_eq!(TargetKind::Channel.update_mode(), UpdateMode::Deferred);
        assert_eq!(TargetKind::Synapse.update_mode(), UpdateMode::Immediate);
    }

    #[test]
    fn scale_factors() {
        assert_eq!(TargetKind::Channel.scale(0.01), 0.01);
        assert_eq!(TargetKind::Synapse.scale(0.01), 1e-3);
        assert!((TargetKind::Channel.rescale_update(0.5, 0.01) - 50.0).abs() < 1e-9);
        assert!((TargetKind::Synapse.rescale_update(0.5, 0.01) - 500.0).abs() < 1e-9);
    }

    #[test]
    fn bound_kinds() {
        let b = Binding::Synapse {
            synapse: Id::from_index(0),
        };
        assert_eq!(b.kind(), Some(TargetKind::Synapse));
        assert_eq!(b.describe(), "synapse");
    }
}
