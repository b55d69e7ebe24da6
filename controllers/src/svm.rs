//! Space vector modulation.
//!
//! The voltage command is projected onto three axes spaced 60° apart. The
//! signs of the six signed projections select the sector, and the two
//! projections that bound the sector are the dwell times of its active
//! vectors. One table maps those dwell times onto the three phases; the
//! remaining zero-vector time is split evenly to centre the pattern.

use core::cmp::Ordering;

use log::{debug, trace, warn};
use numerics::{Error, Result, Scalar, Trigonometry};

use crate::frames::{RotatingFrame, TwoPhase};
use crate::transforms::{rotate_back, FRAC_1_SQRT_3};

/// One of the six 60° sectors of the voltage hexagon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sector {
    /// [0°, 60°)
    Deg0,
    /// [60°, 120°)
    Deg60,
    /// [120°, 180°)
    Deg120,
    /// [180°, 240°)
    Deg180,
    /// [240°, 300°)
    Deg240,
    /// [300°, 360°)
    Deg300,
}

impl Sector {
    pub const ALL: [Sector; 6] = [
        Sector::Deg0,
        Sector::Deg60,
        Sector::Deg120,
        Sector::Deg180,
        Sector::Deg240,
        Sector::Deg300,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn start_degrees(self) -> u16 {
        self as u16 * 60
    }
}

/// Duty cycles for the three half bridges, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SvmOutput<T> {
    pub a: T,
    pub b: T,
    pub c: T,
    pub sector: Sector,
}

impl<T: Scalar> SvmOutput<T> {
    pub fn duties(&self) -> [T; 3] {
        [self.a, self.b, self.c]
    }

    pub fn to_f64(&self) -> [f64; 3] {
        [self.a.to_f64(), self.b.to_f64(), self.c.to_f64()]
    }
}

/// What a phase carries before the zero-vector time is injected.
#[derive(Debug, Clone, Copy)]
enum Slot {
    /// Both active vectors, `T1 + T2`.
    Both,
    /// First active vector only, `T1`.
    First,
    /// Second active vector only, `T2`.
    Second,
    Zero,
}

const PATTERNS: [[Slot; 3]; 6] = {
    use Slot::*;
    [
        [Both, Second, Zero],
        [First, Both, Zero],
        [Zero, Both, Second],
        [Zero, First, Both],
        [Second, Zero, Both],
        [Both, Zero, First],
    ]
};

/// Projections of a stationary command onto the sector boundary normals.
struct Projections<T> {
    /// X, -Y, Z, -X, Y, -Z: the normal of the boundary at `k * 60°`.
    signed: [T; 6],
}

impl<T: Scalar> Projections<T> {
    fn new(v: TwoPhase<T>) -> Result<Self> {
        let inv_sqrt3 = v.alpha.lift(FRAC_1_SQRT_3)?;
        let beta_part = v.beta.try_mul(inv_sqrt3)?;

        // 2/sqrt(3) does not fit a Q format, so it is applied as a sum
        let x = beta_part.try_add(beta_part)?;
        let y = v.alpha.try_sub(beta_part)?;
        let z = v.alpha.try_neg()?.try_sub(beta_part)?;

        Ok(Self {
            signed: [x, y.try_neg()?, z, x.try_neg()?, y, z.try_neg()?],
        })
    }

    /// First sector whose opening boundary is at or behind the vector and
    /// whose closing boundary is ahead of it. A vector on a boundary belongs
    /// to the sector starting there; the zero vector falls back to sector 0.
    fn sector(&self) -> Result<Sector> {
        for (k, sector) in Sector::ALL.into_iter().enumerate() {
            let opening = self.signed[k];
            let closing = self.signed[(k + 1) % 6];
            if !opening.is_negative()? && closing.is_negative()? {
                return Ok(sector);
            }
        }
        Ok(Sector::Deg0)
    }

    /// Dwell times `(T1, T2)` of the first and second active vector.
    fn dwell_times(&self, sector: Sector) -> Result<(T, T)> {
        let k = sector.index();
        Ok((self.signed[(k + 1) % 6].try_neg()?, self.signed[k]))
    }
}

/// Turns voltage commands into centred PWM duty cycles.
///
/// Commands are multiplied by the output scale before projecting, so that the
/// dwell-time sums stay inside a fixed-point format; duties are divided by it
/// again on the way out. Floats use a scale of 1.0 and fixed point 0.5 unless
/// configured otherwise. A Q format cannot hold 1.0, so a fixed-point
/// modulator configured with scale 1.0 reports [`Error::Range`] on every call.
#[derive(Debug, Clone)]
pub struct SpaceVectorModulation<T: Scalar> {
    trigonometry: T::Trigonometry,
    output_scale: f64,
}

impl<T: Scalar> Default for SpaceVectorModulation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> SpaceVectorModulation<T> {
    pub fn new() -> Self {
        Self::with_trigonometry(T::Trigonometry::default())
    }

    pub fn with_trigonometry(trigonometry: T::Trigonometry) -> Self {
        Self {
            trigonometry,
            output_scale: T::HEADROOM,
        }
    }

    pub fn with_output_scale(mut self, scale: f64) -> Result<Self> {
        if !(scale > 0.0 && scale <= 1.0) {
            warn!("rejecting svm output scale {}", scale);
            return Err(Error::config("svm output scale must lie in (0, 1]"));
        }
        debug!("svm output scale set to {}", scale);
        self.output_scale = scale;
        Ok(self)
    }

    pub fn output_scale(&self) -> f64 {
        self.output_scale
    }

    /// Modulates a rotating-frame command at rotor angle `angle` (in turns).
    pub fn generate(&self, dq: RotatingFrame<T>, angle: T) -> Result<SvmOutput<T>> {
        let scale = dq.d.lift(self.output_scale)?;
        let scaled = RotatingFrame::new(dq.d.try_mul(scale)?, dq.q.try_mul(scale)?);
        let (sin, cos) = self.trigonometry.sin_cos(angle)?;
        self.modulate(rotate_back(scaled, sin, cos)?, scale)
    }

    /// Modulates a command that is already in the stationary frame.
    pub fn generate_stationary(&self, ab: TwoPhase<T>) -> Result<SvmOutput<T>> {
        let scale = ab.alpha.lift(self.output_scale)?;
        self.modulate(scale_stationary(ab, scale)?, scale)
    }

    /// Sector a stationary command falls into, without modulating it.
    pub fn sector(&self, ab: TwoPhase<T>) -> Result<Sector> {
        let scale = ab.alpha.lift(self.output_scale)?;
        Projections::new(scale_stationary(ab, scale)?)?.sector()
    }

    fn modulate(&self, v: TwoPhase<T>, scale: T) -> Result<SvmOutput<T>> {
        let projections = Projections::new(v)?;
        let sector = projections.sector()?;
        let (first, second) = projections.dwell_times(sector)?;
        trace!("svm sector {:?}, t1 {:?}, t2 {:?}", sector, first, second);

        let both = first.try_add(second)?;
        let zero = scale.zero();
        let half = scale.lift(0.5)?;
        let common = scale.try_sub(first)?.try_sub(second)?.try_mul(half)?;

        let mut duties = [zero; 3];
        for (duty, slot) in duties.iter_mut().zip(PATTERNS[sector.index()]) {
            let active = match slot {
                Slot::Both => both,
                Slot::First => first,
                Slot::Second => second,
                Slot::Zero => zero,
            };
            *duty = clamp(active.try_add(common)?, scale)?;
        }

        let [a, b, c] = duties;
        Ok(SvmOutput { a, b, c, sector })
    }
}

fn scale_stationary<T: Scalar>(ab: TwoPhase<T>, scale: T) -> Result<TwoPhase<T>> {
    Ok(TwoPhase::new(
        ab.alpha.try_mul(scale)?,
        ab.beta.try_mul(scale)?,
    ))
}

fn clamp<T: Scalar>(duty: T, scale: T) -> Result<T> {
    if duty.is_negative()? {
        Ok(duty.zero())
    } else if duty.try_cmp(scale)? != Ordering::Less {
        Ok(duty.unity())
    } else {
        duty.try_div(scale)
    }
}
