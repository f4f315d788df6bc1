//! Configuration types for Aerolisp compilation.
//!
//! This module provides configuration structures that control how documents
//! are rendered and which simulator properties synthesized formulas read.
//! All types implement [`serde::Deserialize`] and default every field, so a
//! configuration file only needs the values it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining export and property settings.
//! - [`ExportConfig`] - Controls the shape of the rendered document.
//! - [`PropertyNames`] - Names of the simulator state read by the synthesizer.
//!
//! # Example
//!
//! ```
//! # use aerolisp::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.export().root(), "aerodynamics");
//! assert_eq!(config.properties().density(), "atmosphere/rho-slugs_ft3");
//! ```

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Export configuration section.
    #[serde(default)]
    export: ExportConfig,

    /// Simulator property names section.
    #[serde(default)]
    properties: PropertyNames,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(export: ExportConfig, properties: PropertyNames) -> Self {
        Self { export, properties }
    }

    /// Returns the export configuration.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }

    /// Returns the simulator property names.
    pub fn properties(&self) -> &PropertyNames {
        &self.properties
    }
}

/// Shape of the rendered document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Spaces per nesting level.
    indent: usize,
    /// Name of the root element.
    root: String,
    /// `frame` attribute of every axis.
    frame: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            indent: 4,
            root: "aerodynamics".to_string(),
            frame: "BODY".to_string(),
        }
    }
}

impl ExportConfig {
    pub fn new(indent: usize, root: impl Into<String>, frame: impl Into<String>) -> Self {
        Self {
            indent,
            root: root.into(),
            frame: frame.into(),
        }
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn frame(&self) -> &str {
        &self.frame
    }
}

/// Simulator properties read by synthesized formulas.
///
/// The defaults are the standard JSBSim property names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PropertyNames {
    density: String,
    u: String,
    v: String,
    w: String,
    p: String,
    q: String,
    r: String,
    /// Velocity induced by the propeller, scaled by a panel's propwash factor.
    engine_induced_velocity: String,
    /// Velocity induced by the reference wing, scaled by a panel's downwash factor.
    wing_induced_velocity: String,
    /// Prefix of control surface positions, `<prefix><surface>-pos-rad`.
    surface_prefix: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            density: "atmosphere/rho-slugs_ft3".to_string(),
            u: "velocities/u-aero-fps".to_string(),
            v: "velocities/v-aero-fps".to_string(),
            w: "velocities/w-aero-fps".to_string(),
            p: "velocities/p-aero-rad_sec".to_string(),
            q: "velocities/q-aero-rad_sec".to_string(),
            r: "velocities/r-aero-rad_sec".to_string(),
            engine_induced_velocity: "propulsion/engine/prop-induced-velocity_fps".to_string(),
            wing_induced_velocity: "aero/velocities/wing-zi-fps".to_string(),
            surface_prefix: "fcs/".to_string(),
        }
    }
}

impl PropertyNames {
    pub fn density(&self) -> &str {
        &self.density
    }

    pub fn u(&self) -> &str {
        &self.u
    }

    pub fn v(&self) -> &str {
        &self.v
    }

    pub fn w(&self) -> &str {
        &self.w
    }

    pub fn p(&self) -> &str {
        &self.p
    }

    pub fn q(&self) -> &str {
        &self.q
    }

    pub fn r(&self) -> &str {
        &self.r
    }

    pub fn engine_induced_velocity(&self) -> &str {
        &self.engine_induced_velocity
    }

    pub fn wing_induced_velocity(&self) -> &str {
        &self.wing_induced_velocity
    }

    /// The position property of control surface `surface`.
    pub fn surface_position(&self, surface: &str) -> String {
        format!("{}{surface}-pos-rad", self.surface_prefix)
    }
}
