//! Clarke and Park transforms.
//!
//! Every constant is lifted into the format of the incoming sample before it
//! is used, and every step is checked, so a fixed-point overflow surfaces as an
//! error instead of a wrapped value. Angles are in turns (`0.0..1.0`).

use numerics::{Result, Scalar, Trigonometry};

use crate::frames::{RotatingFrame, ThreePhase, TwoPhase};

pub(crate) const FRAC_1_SQRT_3: f64 = 0.577_350_269_189_625_8;
pub(crate) const FRAC_SQRT_3_2: f64 = 0.866_025_403_784_438_6;

/// Three-phase to two-phase, amplitude invariant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Clarke;

impl Clarke {
    pub fn forward<T: Scalar>(&self, abc: ThreePhase<T>) -> Result<TwoPhase<T>> {
        let two_thirds = abc.a.lift(2.0 / 3.0)?;
        let third = abc.a.lift(1.0 / 3.0)?;
        let inv_sqrt3 = abc.a.lift(FRAC_1_SQRT_3)?;

        // scale each phase before summing; `b - c` alone reaches sqrt(3) times
        // the amplitude of balanced phases
        let alpha = two_thirds
            .try_mul(abc.a)?
            .try_sub(third.try_mul(abc.b)?)?
            .try_sub(third.try_mul(abc.c)?)?;
        let beta = inv_sqrt3
            .try_mul(abc.b)?
            .try_sub(inv_sqrt3.try_mul(abc.c)?)?;

        Ok(TwoPhase::new(alpha, beta))
    }

    pub fn inverse<T: Scalar>(&self, ab: TwoPhase<T>) -> Result<ThreePhase<T>> {
        let half = ab.alpha.lift(0.5)?;
        let sqrt3_2 = ab.alpha.lift(FRAC_SQRT_3_2)?;

        let neg_half_alpha = half.try_mul(ab.alpha)?.try_neg()?;
        let beta_part = sqrt3_2.try_mul(ab.beta)?;

        Ok(ThreePhase::new(
            ab.alpha,
            neg_half_alpha.try_add(beta_part)?,
            neg_half_alpha.try_sub(beta_part)?,
        ))
    }
}

/// Rotates with the rotor angle.
#[derive(Debug, Clone)]
pub struct Park<T: Scalar> {
    trigonometry: T::Trigonometry,
}

impl<T: Scalar> Default for Park<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> Park<T> {
    pub fn new() -> Self {
        Self::with_trigonometry(T::Trigonometry::default())
    }

    pub fn with_trigonometry(trigonometry: T::Trigonometry) -> Self {
        Self { trigonometry }
    }

    pub fn trigonometry(&self) -> &T::Trigonometry {
        &self.trigonometry
    }

    pub fn forward(&self, ab: TwoPhase<T>, angle: T) -> Result<RotatingFrame<T>> {
        let (sin, cos) = self.trigonometry.sin_cos(angle)?;
        rotate(ab, sin, cos)
    }

    pub fn inverse(&self, dq: RotatingFrame<T>, angle: T) -> Result<TwoPhase<T>> {
        let (sin, cos) = self.trigonometry.sin_cos(angle)?;
        rotate_back(dq, sin, cos)
    }
}

fn rotate<T: Scalar>(ab: TwoPhase<T>, sin: T, cos: T) -> Result<RotatingFrame<T>> {
    let d = ab.alpha.try_mul(cos)?.try_add(ab.beta.try_mul(sin)?)?;
    let q = ab
        .alpha
        .try_mul(sin)?
        .try_neg()?
        .try_add(ab.beta.try_mul(cos)?)?;
    Ok(RotatingFrame::new(d, q))
}

/// Inverse Park for an already evaluated angle.
pub(crate) fn rotate_back<T: Scalar>(
    dq: RotatingFrame<T>,
    sin: T,
    cos: T,
) -> Result<TwoPhase<T>> {
    let alpha = dq.d.try_mul(cos)?.try_sub(dq.q.try_mul(sin)?)?;
    let beta = dq.d.try_mul(sin)?.try_add(dq.q.try_mul(cos)?)?;
    Ok(TwoPhase::new(alpha, beta))
}

/// Clarke followed by Park, and the reverse.
#[derive(Debug, Clone)]
pub struct ClarkePark<T: Scalar> {
    clarke: Clarke,
    park: Park<T>,
}

impl<T: Scalar> Default for ClarkePark<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> ClarkePark<T> {
    pub fn new() -> Self {
        Self::with_trigonometry(T::Trigonometry::default())
    }

    pub fn with_trigonometry(trigonometry: T::Trigonometry) -> Self {
        Self {
            clarke: Clarke,
            park: Park::with_trigonometry(trigonometry),
        }
    }

    pub fn forward(&self, abc: ThreePhase<T>, angle: T) -> Result<RotatingFrame<T>> {
        let ab = self.clarke.forward(abc)?;
        self.park.forward(ab, angle)
    }

    pub fn inverse(&self, dq: RotatingFrame<T>, angle: T) -> Result<ThreePhase<T>> {
        let ab = self.park.inverse(dq, angle)?;
        self.clarke.inverse(ab)
    }
}
