//! Core traits and types for the seirsim workspace.
//!
//! This crate defines the shared abstractions that the solvers and the
//! epidemic model build on:
//!
//! - [`OdeSystem`]: a right-hand side `dy/dt = f(t, y)` over a flat state
//! - [`DenseOutput`]: a trajectory that can be queried at any time in its span
//! - [`OutOfSpan`]: the error returned when a query falls outside that span

mod dense;
mod system;

pub use dense::{DenseOutput, OutOfSpan};
pub use system::OdeSystem;
