/// Adaptive Dormand–Prince methods supported by the solver.
///
/// Both are embedded explicit Runge–Kutta pairs implemented by the
/// `ode_solvers` crate. The step-size controller settings follow that crate's
/// own defaults for each method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Adaptive Dormand–Prince 5(4) Runge–Kutta method.
    ///
    /// Advances with the 5th-order solution and estimates the local error from
    /// the embedded 4th-order one. A good general-purpose choice for smooth,
    /// non-stiff systems at moderate tolerances.
    Dopri5,

    /// Adaptive Dormand–Prince 8(5,3) Runge–Kutta method.
    ///
    /// Higher order per step with 5th and 3rd order error estimates. Often
    /// cheaper overall than [`Method::Dopri5`] at tight tolerances or over
    /// long spans, because it needs fewer steps.
    #[default]
    Dop853,
}

/// Step-size controller settings passed to `ode_solvers`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Control {
    pub(super) safety: f64,

    /// Stabilization exponent of the PI controller, zero for a plain one.
    pub(super) beta: f64,

    pub(super) fac_min: f64,
    pub(super) fac_max: f64,
}

impl Method {
    /// Returns the order of the solution used to advance the state.
    #[must_use]
    pub fn order(self) -> u32 {
        match self {
            Method::Dopri5 => 5,
            Method::Dop853 => 8,
        }
    }

    pub(super) fn control(self) -> Control {
        match self {
            Method::Dopri5 => Control {
                safety: 0.9,
                beta: 0.04,
                fac_min: 0.2,
                fac_max: 10.0,
            },
            Method::Dop853 => Control {
                safety: 0.9,
                beta: 0.0,
                fac_min: 0.333,
                fac_max: 6.0,
            },
        }
    }
}
