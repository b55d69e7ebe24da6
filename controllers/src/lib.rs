#![cfg_attr(not(test), no_std)]
//! Motor-control building blocks: Clarke/Park transforms, space vector
//! modulation and PID control. Everything is generic over [`Scalar`], so the
//! same code runs on `f32`, `f64` and Q15/Q31 fixed point.

pub mod controller;
pub mod foc;
pub mod frames;
pub mod pid;
pub mod scaled_pid;
pub mod svm;
pub mod transforms;

pub use numerics::{Error, QFormat, QNumber, Result, Scalar};
