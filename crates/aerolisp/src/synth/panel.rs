//! Wing panel synthesis.

use log::{debug, info};
use serde::Deserialize;

use aerolisp_core::{
    builder::DocumentBuilder,
    document::{AxisKind, Expr, Function, Table},
    geometry::{GeometryError, UnitSystem, Vector3},
    operator::OpKind,
    symbols::DuplicateDefinition,
};

use super::{ensure_finite, ensure_positive, moment, negated, property, scaled_or_zero, squared, value};
use crate::config::PropertyNames;

/// Angle of attack, in radians, at which lift and separation tables reach
/// their end knots.
const ALPHA_LIMIT: f64 = 1.57;

/// A control surface that deflects a panel's effective angle of attack.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ControlSurface {
    /// Surface name, read from `<prefix><surface>-pos-rad`.
    pub surface: String,
    /// Angle of attack change per radian of deflection.
    pub effectiveness: f64,
}

/// A wing panel as described by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PanelSpec {
    pub name: String,
    /// Unit system of `position` and `area`.
    #[serde(default)]
    pub unit: UnitSystem,
    /// Reference point in body axes.
    pub position: Vector3,
    /// Chordwise direction, any magnitude.
    pub chord: Vector3,
    /// Normal direction, any magnitude.
    pub normal: Vector3,
    /// Lift curve slope per radian.
    pub lift_slope: f64,
    pub cl_max: f64,
    /// Induced drag factor `k` in `CD0 + k CL²`.
    pub induced_drag: f64,
    pub cd0: f64,
    pub area: f64,
    #[serde(default)]
    pub control: Option<ControlSurface>,
    /// Share of the propeller induced velocity seen by the panel.
    #[serde(default)]
    pub propwash: Option<f64>,
    /// Share of the reference wing induced velocity seen by the panel.
    #[serde(default)]
    pub downwash: Option<f64>,
}

/// A validated panel: feet, square feet and unit direction vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    name: String,
    position: Vector3,
    chord: Vector3,
    normal: Vector3,
    lift_slope: f64,
    cl_max: f64,
    induced_drag: f64,
    cd0: f64,
    area: f64,
    control: Option<ControlSurface>,
    propwash: Option<f64>,
    downwash: Option<f64>,
}

impl Panel {
    /// Validate `spec` and convert it to feet.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if a direction vector has zero length,
    /// a number is not finite, or the lift slope or maximum lift
    /// coefficient is not positive.
    pub fn new(spec: PanelSpec) -> Result<Self, GeometryError> {
        let owner = spec.name.as_str();

        let position = Vector3::new(
            ensure_finite(owner, "position.x", spec.position.x)?,
            ensure_finite(owner, "position.y", spec.position.y)?,
            ensure_finite(owner, "position.z", spec.position.z)?,
        );
        let chord = spec.chord.normalized().ok_or_else(|| GeometryError::DegenerateVector {
            owner: owner.to_string(),
            vector: "chord",
        })?;
        let normal = spec.normal.normalized().ok_or_else(|| GeometryError::DegenerateVector {
            owner: owner.to_string(),
            vector: "normal",
        })?;

        let lift_slope = ensure_positive(owner, "lift_slope", spec.lift_slope)?;
        let cl_max = ensure_positive(owner, "cl_max", spec.cl_max)?;
        let induced_drag = ensure_finite(owner, "induced_drag", spec.induced_drag)?;
        let cd0 = ensure_finite(owner, "cd0", spec.cd0)?;
        let area = ensure_finite(owner, "area", spec.area)?;
        if let Some(control) = &spec.control {
            ensure_finite(owner, "control.effectiveness", control.effectiveness)?;
        }
        if let Some(propwash) = spec.propwash {
            ensure_finite(owner, "propwash", propwash)?;
        }
        if let Some(downwash) = spec.downwash {
            ensure_finite(owner, "downwash", downwash)?;
        }

        let unit = spec.unit;
        Ok(Self {
            position: Vector3::new(
                unit.length_to_feet(position.x),
                unit.length_to_feet(position.y),
                unit.length_to_feet(position.z),
            ),
            chord,
            normal,
            lift_slope,
            cl_max,
            induced_drag,
            cd0,
            area: unit.area_to_square_feet(area),
            control: spec.control,
            propwash: spec.propwash,
            downwash: spec.downwash,
            name: spec.name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference point in feet.
    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// Unit chordwise direction.
    pub fn chord(&self) -> Vector3 {
        self.chord
    }

    /// Unit normal direction.
    pub fn normal(&self) -> Vector3 {
        self.normal
    }

    /// Area in square feet.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Angle of attack at maximum lift, `CLmax / lift_slope`.
    pub fn alpha_max(&self) -> f64 {
        self.cl_max / self.lift_slope
    }

    /// Knots of the lift coefficient table over angle of attack.
    pub fn lift_knots(&self) -> [(f64, f64); 4] {
        let alpha_max = self.alpha_max();
        [
            (-ALPHA_LIMIT, 0.0),
            (-alpha_max, -self.cl_max),
            (alpha_max, self.cl_max),
            (ALPHA_LIMIT, 0.0),
        ]
    }

    /// Knots of the separation drag table over angle of attack.
    pub fn separation_knots(&self) -> [(f64, f64); 4] {
        let alpha_max = self.alpha_max();
        [
            (-ALPHA_LIMIT, 1.0),
            (-alpha_max, 0.0),
            (alpha_max, 0.0),
            (ALPHA_LIMIT, 1.0),
        ]
    }

    pub fn lift_table(&self) -> Table {
        Table::breakpoints(
            format!("aero/table/CL_{}_alpha", self.name),
            self.alpha(),
            &self.lift_knots(),
        )
    }

    pub fn separation_table(&self) -> Table {
        Table::breakpoints(
            format!("aero/table/CD-sep_{}_alpha", self.name),
            self.alpha(),
            &self.separation_knots(),
        )
    }

    /// The panel quantities as constant functions.
    pub fn constants(&self) -> Vec<Function> {
        vec![
            Function::constant(self.quantity('x'), self.position.x),
            Function::constant(self.quantity('y'), self.position.y),
            Function::constant(self.quantity('z'), self.position.z),
            Function::constant(self.coefficient("CD0"), self.cd0),
            Function::constant(self.coefficient("k"), self.induced_drag),
            Function::constant(self.reference_area(), self.area),
        ]
    }

    /// The formula chain from local velocity to wing-frame forces, in
    /// evaluation order.
    pub fn formulas(&self, names: &PropertyNames) -> Vec<Function> {
        let w = &self.name;
        let propwash = format!("aero/velocities/prop-{w}-ui-fps");
        let downwash = format!("aero/velocities/wing-{w}-zi-fps");
        let u_body = format!("aero/velocities/U_{w}_bf-fps");
        let v_body = format!("aero/velocities/V_{w}_bf-fps");
        let w_body = format!("aero/velocities/W_{w}_bf-fps");
        let u_wing = format!("aero/velocities/U_{w}_wf-fps");
        let w_wing = format!("aero/velocities/W_{w}_wf-fps");
        let qbar = format!("aero/calculated/qbar_{w}-psf");
        let alpha = self.alpha();
        let lift_coefficient = self.coefficient("CL");
        let separation = self.coefficient("CD-sep");
        let drag_coefficient = self.coefficient("CD");
        let lift = format!("aero/forces/L_{w}-lb");
        let drag = format!("aero/forces/D_{w}-lb");
        let (x, y, z) = (self.quantity('x'), self.quantity('y'), self.quantity('z'));

        let downwash_term = match self.downwash {
            Some(factor) => negated(vec![
                property(names.wing_induced_velocity()),
                value(factor),
            ]),
            None => value(0.0),
        };
        let deflection = match &self.control {
            Some(control) => Expr::product(vec![
                value(control.effectiveness),
                property(&names.surface_position(&control.surface)),
            ]),
            None => value(0.0),
        };

        let project = |axis: Vector3| {
            Expr::sum(vec![
                Expr::product(vec![value(axis.x), property(&u_body)]),
                Expr::product(vec![value(axis.y), property(&v_body)]),
                Expr::product(vec![value(axis.z), property(&w_body)]),
            ])
        };
        let trig = |kind: OpKind| Expr::unary(kind, property(&alpha));

        vec![
            Function::new(
                &propwash,
                scaled_or_zero(self.propwash, names.engine_induced_velocity()),
            ),
            Function::new(&downwash, downwash_term),
            Function::new(self.deflection(), deflection),
            Function::new(
                &u_body,
                Expr::sum(vec![
                    property(names.u()),
                    Expr::product(vec![property(names.q()), property(&z)]),
                    negated(vec![property(names.r()), property(&y)]),
                    property(&propwash),
                ]),
            ),
            Function::new(
                &v_body,
                Expr::sum(vec![
                    property(names.v()),
                    Expr::product(vec![property(names.r()), property(&x)]),
                    negated(vec![property(names.p()), property(&z)]),
                ]),
            ),
            Function::new(
                &w_body,
                Expr::sum(vec![
                    property(names.w()),
                    Expr::product(vec![property(names.p()), property(&y)]),
                    negated(vec![property(names.q()), property(&x)]),
                    property(&downwash),
                ]),
            ),
            Function::new(&u_wing, project(self.chord)),
            Function::new(&w_wing, project(self.normal)),
            Function::new(
                &qbar,
                Expr::product(vec![
                    value(0.5),
                    property(names.density()),
                    Expr::sum(vec![squared(property(&u_wing)), squared(property(&w_wing))]),
                ]),
            ),
            Function::new(
                &alpha,
                Expr::sum(vec![
                    Expr::op(OpKind::Atan2, vec![property(&w_wing), property(&u_wing)]),
                    property(&self.deflection()),
                ]),
            ),
            Function::new(&lift_coefficient, Expr::from(self.lift_table())),
            Function::new(&separation, Expr::from(self.separation_table())),
            Function::new(
                &drag_coefficient,
                Expr::sum(vec![
                    property(&self.coefficient("CD0")),
                    Expr::product(vec![
                        property(&self.coefficient("k")),
                        squared(property(&lift_coefficient)),
                    ]),
                    property(&separation),
                ]),
            ),
            Function::new(
                &lift,
                Expr::product(vec![
                    property(&lift_coefficient),
                    property(&self.reference_area()),
                    property(&qbar),
                ]),
            ),
            Function::new(
                &drag,
                Expr::product(vec![
                    property(&drag_coefficient),
                    property(&self.reference_area()),
                    property(&qbar),
                ]),
            ),
            Function::new(
                self.wing_force('X'),
                Expr::sum(vec![
                    Expr::product(vec![property(&lift), trig(OpKind::Sin)]),
                    negated(vec![property(&drag), trig(OpKind::Cos)]),
                ]),
            ),
            Function::new(
                self.wing_force('Z'),
                Expr::sum(vec![
                    negated(vec![property(&lift), trig(OpKind::Cos)]),
                    negated(vec![property(&drag), trig(OpKind::Sin)]),
                ]),
            ),
        ]
    }

    /// Body-axis force and moment contributions, one per axis in
    /// [`AxisKind::ALL`] order.
    pub fn contributions(&self) -> Vec<(AxisKind, Function)> {
        let x_wing = self.wing_force('X');
        let z_wing = self.wing_force('Z');
        let body = |chord: f64, normal: f64| {
            Expr::sum(vec![
                Expr::product(vec![value(chord), property(&x_wing)]),
                Expr::product(vec![value(normal), property(&z_wing)]),
            ])
        };
        let (fx, fy, fz) = (self.body_force('X'), self.body_force('Y'), self.body_force('Z'));
        let (x, y, z) = (self.quantity('x'), self.quantity('y'), self.quantity('z'));
        let w = &self.name;

        vec![
            (AxisKind::X, Function::new(&fx, body(self.chord.x, self.normal.x))),
            (AxisKind::Y, Function::new(&fy, body(self.chord.y, self.normal.y))),
            (AxisKind::Z, Function::new(&fz, body(self.chord.z, self.normal.z))),
            (
                AxisKind::Roll,
                Function::new(
                    format!("aero/moments/L_{w}-ftlb"),
                    moment(property(&z), &fy, property(&y), &fz),
                ),
            ),
            (
                AxisKind::Pitch,
                Function::new(
                    format!("aero/moments/M_{w}-ftlb"),
                    moment(property(&x), &fz, property(&z), &fx),
                ),
            ),
            (
                AxisKind::Yaw,
                Function::new(
                    format!("aero/moments/N_{w}-ftlb"),
                    moment(property(&y), &fx, property(&x), &fy),
                ),
            ),
        ]
    }

    /// Add the whole panel to `target`: constants, formulas, then the axis
    /// contributions.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateDefinition`] if one of the panel's names is
    /// already defined, e.g. by another panel with the same name.
    pub fn synthesize(
        &self,
        names: &PropertyNames,
        target: &mut DocumentBuilder,
    ) -> Result<(), DuplicateDefinition> {
        info!(panel = self.name; "Synthesizing wing panel");
        debug!(
            alpha_max = self.alpha_max(),
            area = self.area;
            "Panel parameters"
        );

        for function in self.constants().into_iter().chain(self.formulas(names)) {
            target.add_function(function)?;
        }
        for (axis, function) in self.contributions() {
            target.add_axis_function(axis, function)?;
        }
        Ok(())
    }

    fn quantity(&self, axis: char) -> String {
        format!("aero/quantity/{axis}_{}-ft", self.name)
    }

    fn coefficient(&self, coefficient: &str) -> String {
        format!("aero/coefficients/{coefficient}_{}", self.name)
    }

    fn reference_area(&self) -> String {
        format!("aero/metrics/S_{}-sqft", self.name)
    }

    fn alpha(&self) -> String {
        format!("aero/calculated/alpha_{}-rad", self.name)
    }

    fn deflection(&self) -> String {
        match &self.control {
            Some(control) => format!(
                "aero/calculated/delta-alpha_{}_{}-rad",
                self.name, control.surface
            ),
            None => format!("aero/calculated/delta-alpha_{}-rad", self.name),
        }
    }

    fn wing_force(&self, axis: char) -> String {
        format!("aero/forces/{axis}_{}_wf-lb", self.name)
    }

    fn body_force(&self, axis: char) -> String {
        format!("aero/forces/{axis}_{}-lb", self.name)
    }
}
