//! Signal frames passed between the transforms, the modulator and the loops.

use numerics::Scalar;

/// Phase quantities in the stationary a/b/c frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThreePhase<T> {
    pub a: T,
    pub b: T,
    pub c: T,
}

/// Stationary orthogonal frame produced by the Clarke transform.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TwoPhase<T> {
    pub alpha: T,
    pub beta: T,
}

/// Frame rotating with the rotor, produced by the Park transform.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RotatingFrame<T> {
    pub d: T,
    pub q: T,
}

impl<T> ThreePhase<T> {
    pub const fn new(a: T, b: T, c: T) -> Self {
        Self { a, b, c }
    }
}

impl<T> TwoPhase<T> {
    pub const fn new(alpha: T, beta: T) -> Self {
        Self { alpha, beta }
    }
}

impl<T> RotatingFrame<T> {
    pub const fn new(d: T, q: T) -> Self {
        Self { d, q }
    }
}

impl<T: Scalar> ThreePhase<T> {
    pub fn to_f64(&self) -> ThreePhase<f64> {
        ThreePhase::new(self.a.to_f64(), self.b.to_f64(), self.c.to_f64())
    }
}

impl<T: Scalar> TwoPhase<T> {
    pub fn to_f64(&self) -> TwoPhase<f64> {
        TwoPhase::new(self.alpha.to_f64(), self.beta.to_f64())
    }
}

impl<T: Scalar> RotatingFrame<T> {
    pub fn to_f64(&self) -> RotatingFrame<f64> {
        RotatingFrame::new(self.d.to_f64(), self.q.to_f64())
    }
}
