//! Sine and cosine over a normalized angle.
//!
//! Angles are expressed in turns: `0.0..1.0` maps onto `0..2π`. This keeps the
//! angle itself representable in Q15/Q31, which cover `[-1, 1)`.

use core::f64::consts::TAU;

use log::warn;

use crate::error::{Error, Result};
use crate::qnumber::{QFormat, QNumber};

pub trait Trigonometry<T> {
    fn sine(&self, angle: T) -> Result<T>;

    fn cosine(&self, angle: T) -> Result<T>;

    fn sin_cos(&self, angle: T) -> Result<(T, T)>
    where
        T: Copy,
    {
        Ok((self.sine(angle)?, self.cosine(angle)?))
    }
}

/// Direct evaluation through `libm`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FloatTrigonometry;

impl Trigonometry<f64> for FloatTrigonometry {
    fn sine(&self, angle: f64) -> Result<f64> {
        Ok(libm::sin(TAU * angle))
    }

    fn cosine(&self, angle: f64) -> Result<f64> {
        Ok(libm::cos(TAU * angle))
    }
}

impl Trigonometry<f32> for FloatTrigonometry {
    fn sine(&self, angle: f32) -> Result<f32> {
        Ok(libm::sinf(core::f32::consts::TAU * angle))
    }

    fn cosine(&self, angle: f32) -> Result<f32> {
        Ok(libm::cosf(core::f32::consts::TAU * angle))
    }
}

/// How [`FixedTrigonometry`] keeps ±1.0 out of a format that cannot hold +1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Margin {
    /// Scale every result by the factor, which must lie in (0, 1). This
    /// biases amplitudes by the same factor. Results still too close to 1.0
    /// for the format saturate to its largest value.
    Attenuate(f64),
    /// Saturate to `±(1 - LSB)`. Only the extremes lose one LSB.
    Lsb,
}

impl Default for Margin {
    fn default() -> Self {
        Margin::Attenuate(0.99)
    }
}

/// Evaluates in floating point and converts back into the angle's Q format.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FixedTrigonometry {
    margin: Margin,
}

impl FixedTrigonometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_margin(margin: Margin) -> Result<Self> {
        if let Margin::Attenuate(factor) = margin {
            if !(factor > 0.0 && factor < 1.0) {
                warn!("rejecting trigonometry attenuation {}", factor);
                return Err(Error::config("attenuation must lie in (0, 1)"));
            }
        }
        Ok(Self { margin })
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    fn to_format(&self, value: f64, format: QFormat) -> Result<QNumber> {
        let value = match self.margin {
            // a factor within half an LSB of 1.0 would still round up to 1.0
            Margin::Attenuate(factor) => (value * factor).min(1.0 - format.lsb()),
            Margin::Lsb => {
                let limit = 1.0 - format.lsb();
                value.clamp(-limit, limit)
            }
        };
        QNumber::new(value, format)
    }
}

impl Trigonometry<QNumber> for FixedTrigonometry {
    fn sine(&self, angle: QNumber) -> Result<QNumber> {
        self.to_format(libm::sin(TAU * angle.to_f64()), angle.format())
    }

    fn cosine(&self, angle: QNumber) -> Result<QNumber> {
        self.to_format(libm::cos(TAU * angle.to_f64()), angle.format())
    }
}
