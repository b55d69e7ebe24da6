//! Q15/Q31 fixed-point numbers.
//!
//! A [`QNumber`] carries its format at runtime so that mixing widths is a
//! checked error instead of a silent reinterpretation. Arithmetic mirrors what
//! a DSP executes: widening multiply followed by an arithmetic shift, and a
//! pre-shifted integer divide. Every result is range checked; nothing wraps.

use core::cmp::Ordering;
use core::fmt;

use fixed::types::{I1F15, I1F31};

use crate::error::{Error, Result};

/// Fractional width of a [`QNumber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QFormat {
    /// 1 sign bit, 15 fractional bits.
    Q15,
    /// 1 sign bit, 31 fractional bits.
    Q31,
}

impl QFormat {
    pub const fn fractional_bits(self) -> u32 {
        match self {
            QFormat::Q15 => 15,
            QFormat::Q31 => 31,
        }
    }

    /// Smallest raw value, representing -1.0.
    pub const fn min_raw(self) -> i64 {
        -(1i64 << self.fractional_bits())
    }

    /// Largest raw value, representing 1.0 - LSB.
    pub const fn max_raw(self) -> i64 {
        (1i64 << self.fractional_bits()) - 1
    }

    /// Weight of the least significant bit.
    pub fn lsb(self) -> f64 {
        1.0 / (1i64 << self.fractional_bits()) as f64
    }
}

impl fmt::Display for QFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QFormat::Q15 => f.write_str("Q15"),
            QFormat::Q31 => f.write_str("Q31"),
        }
    }
}

/// Signed fixed-point value in [-1.0, 1.0).
///
/// Equality is structural: two numbers are equal iff they share a format and
/// a raw value. Ordering across formats is undefined (`partial_cmp` returns
/// `None`); use [`QNumber::try_cmp`] to get the mismatch as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QNumber {
    raw: i32,
    format: QFormat,
}

impl QNumber {
    /// Converts `value` to the nearest representable number (ties to even).
    ///
    /// Values outside [-1.0, 1.0), and values that would round up to 1.0,
    /// are a [`Error::Range`]. The latter are rejected rather than saturated
    /// so that a successful conversion is always within half an LSB of
    /// `value`; callers that want saturation clamp to `1.0 - format.lsb()`
    /// first.
    pub fn new(value: f64, format: QFormat) -> Result<Self> {
        if !(-1.0..1.0).contains(&value) {
            return Err(Error::range(value));
        }

        let raw = match format {
            QFormat::Q15 => I1F15::checked_from_num(value).map(|v| i32::from(v.to_bits())),
            QFormat::Q31 => I1F31::checked_from_num(value).map(I1F31::to_bits),
        };

        raw.map(|raw| Self { raw, format })
            .ok_or(Error::range(value))
    }

    pub fn q15(value: f64) -> Result<Self> {
        Self::new(value, QFormat::Q15)
    }

    pub fn q31(value: f64) -> Result<Self> {
        Self::new(value, QFormat::Q31)
    }

    /// Wraps an already scaled integer.
    pub fn from_raw(raw: i32, format: QFormat) -> Result<Self> {
        let wide = i64::from(raw);
        if wide < format.min_raw() || wide > format.max_raw() {
            return Err(Error::range(wide as f64 * format.lsb()));
        }
        Ok(Self { raw, format })
    }

    pub const fn zero(format: QFormat) -> Self {
        Self { raw: 0, format }
    }

    pub const fn min_value(format: QFormat) -> Self {
        Self {
            raw: format.min_raw() as i32,
            format,
        }
    }

    pub const fn max_value(format: QFormat) -> Self {
        Self {
            raw: format.max_raw() as i32,
            format,
        }
    }

    pub const fn raw(self) -> i32 {
        self.raw
    }

    pub const fn format(self) -> QFormat {
        self.format
    }

    /// Exact conversion: `raw / 2^fractional_bits`.
    pub fn to_f64(self) -> f64 {
        match self.format {
            QFormat::Q15 => I1F15::from_bits(self.raw as i16).to_num::<f64>(),
            QFormat::Q31 => I1F31::from_bits(self.raw).to_num::<f64>(),
        }
    }

    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    pub fn try_add(self, rhs: Self) -> Result<Self> {
        let format = self.common_format(rhs)?;
        Self::checked(i64::from(self.raw) + i64::from(rhs.raw), format)
    }

    pub fn try_sub(self, rhs: Self) -> Result<Self> {
        let format = self.common_format(rhs)?;
        Self::checked(i64::from(self.raw) - i64::from(rhs.raw), format)
    }

    /// Widening multiply, rescaled with an arithmetic shift (rounds toward
    /// negative infinity).
    pub fn try_mul(self, rhs: Self) -> Result<Self> {
        let format = self.common_format(rhs)?;
        let product = i64::from(self.raw) * i64::from(rhs.raw);
        Self::checked(product >> format.fractional_bits(), format)
    }

    /// The dividend is pre-shifted left by the fractional width before the
    /// integer division, which truncates toward zero.
    pub fn try_div(self, rhs: Self) -> Result<Self> {
        let format = self.common_format(rhs)?;
        if rhs.raw == 0 {
            return Err(Error::DivideByZero);
        }
        let numerator = i64::from(self.raw) << format.fractional_bits();
        Self::checked(numerator / i64::from(rhs.raw), format)
    }

    /// The format minimum (-1.0) has no representable negation.
    pub fn try_neg(self) -> Result<Self> {
        Self::checked(-i64::from(self.raw), self.format)
    }

    pub fn try_cmp(self, rhs: Self) -> Result<Ordering> {
        self.common_format(rhs)?;
        Ok(self.raw.cmp(&rhs.raw))
    }

    fn common_format(self, rhs: Self) -> Result<QFormat> {
        if self.format == rhs.format {
            Ok(self.format)
        } else {
            Err(Error::FormatMismatch {
                lhs: self.format,
                rhs: rhs.format,
            })
        }
    }

    fn checked(raw: i64, format: QFormat) -> Result<Self> {
        if raw < format.min_raw() || raw > format.max_raw() {
            return Err(Error::Overflow);
        }
        Ok(Self {
            raw: raw as i32,
            format,
        })
    }
}

impl PartialOrd for QNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(*other).ok()
    }
}

impl fmt::Display for QNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.format, self.to_f64())
    }
}

impl From<I1F15> for QNumber {
    fn from(value: I1F15) -> Self {
        Self {
            raw: i32::from(value.to_bits()),
            format: QFormat::Q15,
        }
    }
}

impl From<I1F31> for QNumber {
    fn from(value: I1F31) -> Self {
        Self {
            raw: value.to_bits(),
            format: QFormat::Q31,
        }
    }
}

impl TryFrom<QNumber> for I1F15 {
    type Error = Error;

    fn try_from(value: QNumber) -> Result<Self> {
        match value.format {
            QFormat::Q15 => Ok(I1F15::from_bits(value.raw as i16)),
            other => Err(Error::FormatMismatch {
                lhs: other,
                rhs: QFormat::Q15,
            }),
        }
    }
}

impl TryFrom<QNumber> for I1F31 {
    type Error = Error;

    fn try_from(value: QNumber) -> Result<Self> {
        match value.format {
            QFormat::Q31 => Ok(I1F31::from_bits(value.raw)),
            other => Err(Error::FormatMismatch {
                lhs: other,
                rhs: QFormat::Q31,
            }),
        }
    }
}
