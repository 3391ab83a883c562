//! Core compute primitives.
//!
//! The dense [`Matrix`] backs the least-squares and kernel solvers.

mod matrix;

pub use matrix::Matrix;
