#![cfg_attr(not(test), no_std)]
//! Fixed-point numbers and the numeric contract used by the motor-control
//! algorithms in `controllers`.

pub mod error;
pub mod qnumber;
pub mod scalar;
pub mod trigonometry;

pub use error::{Error, Result};
pub use qnumber::{QFormat, QNumber};
pub use scalar::Scalar;
pub use trigonometry::{FixedTrigonometry, FloatTrigonometry, Margin, Trigonometry};
