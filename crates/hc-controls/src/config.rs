//! Construction-time controller configuration.
//!
//! Mirrors the constructor arguments of each law so controllers can be
//! described in YAML or JSON next to the rest of a model definition:
//!
//! ```yaml
//! - type: Integral
//!   tau_m: 5000.0
//!   tau_g: 100.0
//!   m: 0.0
//! - type: CurrentIntegral
//!   tau_g: 100.0
//!   tau_filter: 50.0
//!   m: 0.0
//!   i_ca_smooth: 0.0
//!   i_ca_target: -1.5
//! ```

use serde::{Deserialize, Serialize};

use crate::controller::Controller;
use crate::error::{ControlError, ControlResult};

fn default_tau_m() -> f64 {
    f64::INFINITY
}

/// Parameters and initial conditions for one controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControllerConfig {
    Integral {
        #[serde(default = "default_tau_m")]
        tau_m: f64,
        tau_g: f64,
        m: f64,
    },
    BangBang {
        #[serde(default = "default_tau_m")]
        tau_m: f64,
        tau_g: f64,
        m: f64,
    },
    CurrentIntegral {
        #[serde(default = "default_tau_m")]
        tau_m: f64,
        tau_g: f64,
        tau_filter: f64,
        m: f64,
        i_ca_smooth: f64,
        i_ca_target: f64,
    },
}

impl ControllerConfig {
    /// Construct the configured controller, validating its timescales.
    pub fn build(&self) -> ControlResult<Controller> {
        match *self {
            Self::Integral { tau_m, tau_g, m } => Controller::integral(tau_m, tau_g, m),
            Self::BangBang { tau_m, tau_g, m } => Controller::bang_bang(tau_m, tau_g, m),
            Self::CurrentIntegral {
                tau_m,
                tau_g,
                tau_filter,
                m,
                i_ca_smooth,
                i_ca_target,
            } => Controller::current_integral(tau_m, tau_g, tau_filter, m, i_ca_smooth, i_ca_target),
        }
    }

    pub fn from_yaml(content: &str) -> ControlResult<Self> {
        serde_yaml::from_str(content).map_err(|e| ControlError::Config {
            what: e.to_string(),
        })
    }

    pub fn from_json(content: &str) -> ControlResult<Self> {
        serde_json::from_str(content).map_err(|e| ControlError::Config {
            what: e.to_string(),
        })
    }

    /// Parse a YAML sequence of controller configurations.
    pub fn list_from_yaml(content: &str) -> ControlResult<Vec<Self>> {
        serde_yaml::from_str(content).map_err(|e| ControlError::Config {
            what: e.to_string(),
        })
    }

    /// Parse a JSON array of controller configurations.
    pub fn list_from_json(content: &str) -> ControlResult<Vec<Self>> {
        serde_json::from_str(content).map_err(|e| ControlError::Config {
            what: e.to_string(),
        })
    }

    pub fn to_yaml(&self) -> ControlResult<String> {
        serde_yaml::to_string(self).map_err(|e| ControlError::Config {
            what: e.to_string(),
        })
    }
}
