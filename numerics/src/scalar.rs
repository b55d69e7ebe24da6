//! The numeric contract shared by every control algorithm.

use core::cmp::Ordering;
use core::fmt::Debug;

use crate::error::{Error, Result};
use crate::qnumber::QNumber;
use crate::trigonometry::{FixedTrigonometry, FloatTrigonometry, Trigonometry};

/// A number the control algorithms can compute with.
///
/// All arithmetic is checked and returns a [`Result`]. Constants are never
/// mixed in as `f64`: they are first lifted into the representation of an
/// operand with [`Scalar::lift`], so a Q15 pipeline only ever sees Q15 values.
pub trait Scalar: Copy + Debug + PartialEq + PartialOrd {
    /// Provider used when an algorithm is built without an explicit one.
    type Trigonometry: Trigonometry<Self> + Default + Debug + Clone;

    /// Working scale for algorithms whose intermediates can exceed unity.
    const HEADROOM: f64;

    /// Materializes `value` in the same representation as `self`.
    fn lift(self, value: f64) -> Result<Self>;

    fn zero(self) -> Self;

    /// Largest value not above 1.0.
    fn unity(self) -> Self;

    fn to_f64(self) -> f64;

    fn try_add(self, rhs: Self) -> Result<Self>;
    fn try_sub(self, rhs: Self) -> Result<Self>;
    fn try_mul(self, rhs: Self) -> Result<Self>;
    fn try_div(self, rhs: Self) -> Result<Self>;
    fn try_neg(self) -> Result<Self>;
    fn try_cmp(self, rhs: Self) -> Result<Ordering>;

    fn is_negative(self) -> Result<bool> {
        Ok(self.try_cmp(self.zero())? == Ordering::Less)
    }

    fn is_positive(self) -> Result<bool> {
        Ok(self.try_cmp(self.zero())? == Ordering::Greater)
    }
}

macro_rules! finite {
    ($value:expr) => {{
        let value = $value;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Error::Overflow)
        }
    }};
}

macro_rules! float_scalar {
    ($($float:ty),*) => {
        $(
            impl Scalar for $float {
                type Trigonometry = FloatTrigonometry;

                const HEADROOM: f64 = 1.0;

                fn lift(self, value: f64) -> Result<Self> {
                    let lifted = value as $float;
                    if lifted.is_finite() {
                        Ok(lifted)
                    } else {
                        Err(Error::range(value))
                    }
                }

                fn zero(self) -> Self {
                    0.0
                }

                fn unity(self) -> Self {
                    1.0
                }

                fn to_f64(self) -> f64 {
                    f64::from(self)
                }

                fn try_add(self, rhs: Self) -> Result<Self> {
                    finite!(self + rhs)
                }

                fn try_sub(self, rhs: Self) -> Result<Self> {
                    finite!(self - rhs)
                }

                fn try_mul(self, rhs: Self) -> Result<Self> {
                    finite!(self * rhs)
                }

                fn try_div(self, rhs: Self) -> Result<Self> {
                    if rhs == 0.0 {
                        return Err(Error::DivideByZero);
                    }
                    finite!(self / rhs)
                }

                fn try_neg(self) -> Result<Self> {
                    finite!(-self)
                }

                fn try_cmp(self, rhs: Self) -> Result<Ordering> {
                    self.partial_cmp(&rhs).ok_or(Error::range(f64::NAN))
                }
            }
        )*
    };
}

float_scalar!(f32, f64);

impl Scalar for QNumber {
    type Trigonometry = FixedTrigonometry;

    const HEADROOM: f64 = 0.5;

    fn lift(self, value: f64) -> Result<Self> {
        QNumber::new(value, self.format())
    }

    fn zero(self) -> Self {
        QNumber::zero(self.format())
    }

    fn unity(self) -> Self {
        QNumber::max_value(self.format())
    }

    fn to_f64(self) -> f64 {
        QNumber::to_f64(self)
    }

    fn try_add(self, rhs: Self) -> Result<Self> {
        QNumber::try_add(self, rhs)
    }

    fn try_sub(self, rhs: Self) -> Result<Self> {
        QNumber::try_sub(self, rhs)
    }

    fn try_mul(self, rhs: Self) -> Result<Self> {
        QNumber::try_mul(self, rhs)
    }

    fn try_div(self, rhs: Self) -> Result<Self> {
        QNumber::try_div(self, rhs)
    }

    fn try_neg(self) -> Result<Self> {
        QNumber::try_neg(self)
    }

    fn try_cmp(self, rhs: Self) -> Result<Ordering> {
        QNumber::try_cmp(self, rhs)
    }
}
