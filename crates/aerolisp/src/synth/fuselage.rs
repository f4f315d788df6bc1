//! Fuselage synthesis: quadratic drag along each body axis.

use log::info;
use serde::Deserialize;

use aerolisp_core::{
    builder::DocumentBuilder,
    document::{AxisKind, Expr, Function},
    geometry::{GeometryError, UnitSystem, Vector3},
    operator::OpKind,
    symbols::DuplicateDefinition,
};

use super::{ensure_finite, moment, property, value};
use crate::config::PropertyNames;

fn default_name() -> String {
    "fus".to_string()
}

/// A fuselage as described by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FuselageSpec {
    #[serde(default = "default_name")]
    pub name: String,
    /// Unit system of `position` and `drag`.
    #[serde(default)]
    pub unit: UnitSystem,
    /// Point where the drag forces act, in body axes.
    pub position: Vector3,
    /// Drag areas `Xuu`, `Yvv` and `Zww`.
    pub drag: Vector3,
    /// Share of the propeller induced velocity added to `u`.
    #[serde(default)]
    pub propwash: f64,
}

/// A validated fuselage in feet and square feet.
#[derive(Debug, Clone, PartialEq)]
pub struct Fuselage {
    name: String,
    position: Vector3,
    drag: Vector3,
    propwash: f64,
}

impl Fuselage {
    /// Validate `spec` and convert it to feet.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFinite`] for a NaN or infinite number.
    pub fn new(spec: FuselageSpec) -> Result<Self, GeometryError> {
        let owner = spec.name.as_str();
        let unit = spec.unit;

        let position = Vector3::new(
            unit.length_to_feet(ensure_finite(owner, "position.x", spec.position.x)?),
            unit.length_to_feet(ensure_finite(owner, "position.y", spec.position.y)?),
            unit.length_to_feet(ensure_finite(owner, "position.z", spec.position.z)?),
        );
        let drag = Vector3::new(
            unit.area_to_square_feet(ensure_finite(owner, "drag.x", spec.drag.x)?),
            unit.area_to_square_feet(ensure_finite(owner, "drag.y", spec.drag.y)?),
            unit.area_to_square_feet(ensure_finite(owner, "drag.z", spec.drag.z)?),
        );
        let propwash = ensure_finite(owner, "propwash", spec.propwash)?;

        Ok(Self {
            name: spec.name,
            position,
            drag,
            propwash,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn drag(&self) -> Vector3 {
        self.drag
    }

    /// Axial velocity including propwash.
    pub fn velocity(&self, names: &PropertyNames) -> Function {
        Function::new(
            self.axial_velocity(),
            Expr::sum(vec![
                property(names.u()),
                Expr::product(vec![
                    value(self.propwash),
                    property(names.engine_induced_velocity()),
                ]),
            ]),
        )
    }

    /// Force and moment contributions, one per axis in [`AxisKind::ALL`]
    /// order.
    pub fn contributions(&self, names: &PropertyNames) -> Vec<(AxisKind, Function)> {
        let (fx, fy, fz) = (self.force('X'), self.force('Y'), self.force('Z'));
        let (x, y, z) = (
            value(self.position.x),
            value(self.position.y),
            value(self.position.z),
        );
        let w = &self.name;

        vec![
            (
                AxisKind::X,
                Function::new(&fx, self.quadratic_drag(names, self.drag.x, &self.axial_velocity())),
            ),
            (
                AxisKind::Y,
                Function::new(&fy, self.quadratic_drag(names, self.drag.y, names.v())),
            ),
            (
                AxisKind::Z,
                Function::new(&fz, self.quadratic_drag(names, self.drag.z, names.w())),
            ),
            (
                AxisKind::Roll,
                Function::new(
                    format!("aero/moments/L_{w}-ftlb"),
                    moment(z.clone(), &fy, y.clone(), &fz),
                ),
            ),
            (
                AxisKind::Pitch,
                Function::new(
                    format!("aero/moments/M_{w}-ftlb"),
                    moment(x.clone(), &fz, z, &fx),
                ),
            ),
            (
                AxisKind::Yaw,
                Function::new(format!("aero/moments/N_{w}-ftlb"), moment(y, &fx, x, &fy)),
            ),
        ]
    }

    /// Add the fuselage to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateDefinition`] if one of its names is already
    /// defined.
    pub fn synthesize(
        &self,
        names: &PropertyNames,
        target: &mut DocumentBuilder,
    ) -> Result<(), DuplicateDefinition> {
        info!(fuselage = self.name; "Synthesizing fuselage");

        target.add_function(self.velocity(names))?;
        for (axis, function) in self.contributions(names) {
            target.add_axis_function(axis, function)?;
        }
        Ok(())
    }

    /// `(* -0.5 rho C (abs v) v)`
    fn quadratic_drag(&self, names: &PropertyNames, coefficient: f64, velocity: &str) -> Expr {
        Expr::product(vec![
            value(-0.5),
            property(names.density()),
            value(coefficient),
            Expr::unary(OpKind::Abs, property(velocity)),
            property(velocity),
        ])
    }

    fn axial_velocity(&self) -> String {
        format!("aero/velocities/{}-u-fps", self.name)
    }

    fn force(&self, axis: char) -> String {
        format!("aero/forces/{axis}_{}-lb", self.name)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn spec() -> FuselageSpec {
        FuselageSpec {
            name: default_name(),
            unit: UnitSystem::Feet,
            position: Vector3::new(0.5, 0.0, -0.2),
            drag: Vector3::new(0.3, 1.2, 1.4),
            propwash: 0.0,
        }
    }

    #[test]
    fn test_quadratic_drag() {
        let fuselage = Fuselage::new(spec()).unwrap();
        let contributions = fuselage.contributions(&PropertyNames::default());

        let (axis, x) = &contributions[0];
        assert_eq!(*axis, AxisKind::X);
        assert_eq!(x.name(), "aero/forces/X_fus-lb");
        assert_eq!(
            x.expr(),
            Some(&Expr::product(vec![
                Expr::value(-0.5),
                Expr::property("atmosphere/rho-slugs_ft3"),
                Expr::value(0.3),
                Expr::unary(OpKind::Abs, Expr::property("aero/velocities/fus-u-fps")),
                Expr::property("aero/velocities/fus-u-fps"),
            ]))
        );

        let (_, z) = &contributions[2];
        assert_eq!(
            z.expr(),
            Some(&Expr::product(vec![
                Expr::value(-0.5),
                Expr::property("atmosphere/rho-slugs_ft3"),
                Expr::value(1.4),
                Expr::unary(OpKind::Abs, Expr::property("velocities/w-aero-fps")),
                Expr::property("velocities/w-aero-fps"),
            ]))
        );
    }

    #[test]
    fn test_pitch_moment_uses_offsets() {
        let fuselage = Fuselage::new(spec()).unwrap();
        let contributions = fuselage.contributions(&PropertyNames::default());

        let (axis, pitch) = &contributions[4];
        assert_eq!(*axis, AxisKind::Pitch);
        assert_eq!(
            pitch.expr(),
            Some(&Expr::sum(vec![
                Expr::product(vec![
                    Expr::value(-1.0),
                    Expr::value(0.5),
                    Expr::property("aero/forces/Z_fus-lb"),
                ]),
                Expr::product(vec![Expr::value(-0.2), Expr::property("aero/forces/X_fus-lb")]),
            ]))
        );
    }

    #[test]
    fn test_metric_fuselage() {
        let fuselage = Fuselage::new(FuselageSpec {
            unit: UnitSystem::Meters,
            position: Vector3::new(1.0, 0.0, 0.0),
            drag: Vector3::new(1.0, 1.0, 1.0),
            ..spec()
        })
        .unwrap();

        assert!(approx_eq!(f64, fuselage.position().x, 3.28084, epsilon = 1e-5));
        assert!(approx_eq!(f64, fuselage.drag().z, 10.7639, epsilon = 1e-4));
    }

    #[test]
    fn test_non_finite_drag() {
        let err = Fuselage::new(FuselageSpec {
            drag: Vector3::new(0.3, f64::INFINITY, 1.0),
            ..spec()
        })
        .unwrap_err();
        assert!(matches!(err, GeometryError::NonFinite { field: "drag.y", .. }));
    }

    #[test]
    fn test_synthesize() {
        let fuselage = Fuselage::new(FuselageSpec {
            propwash: 0.4,
            ..spec()
        })
        .unwrap();
        let mut target = DocumentBuilder::new();
        fuselage
            .synthesize(&PropertyNames::default(), &mut target)
            .unwrap();
        let compilation = target.finish();

        let velocity = compilation.document().function("aero/velocities/fus-u-fps").unwrap();
        assert_eq!(
            velocity.expr(),
            Some(&Expr::sum(vec![
                Expr::property("velocities/u-aero-fps"),
                Expr::product(vec![
                    Expr::value(0.4),
                    Expr::property("propulsion/engine/prop-induced-velocity_fps"),
                ]),
            ]))
        );
        for axis in compilation.document().axes() {
            assert_eq!(axis.items().len(), 1);
        }
    }
}
