//! Numerical solvers for the seirsim workspace.
//!
//! - [`runge_kutta`]: adaptive Dormand–Prince integration of an
//!   [`OdeSystem`](seirsim_core::OdeSystem), backed by `ode_solvers`, with
//!   continuous output between steps

pub mod runge_kutta;
