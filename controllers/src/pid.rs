use heapless::Deque;
use log::{debug, warn};
use numerics::{Error, Result, Scalar};

use crate::controller::Controller;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidTunings<T> {
    pub kp: T,
    pub ki: T,
    pub kd: T,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidLimits<T> {
    pub min: T,
    pub max: T,
}

impl<T: Scalar> PidLimits<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    fn validate(&self) -> Result<()> {
        if self.min.try_cmp(self.max)?.is_lt() {
            Ok(())
        } else {
            warn!("rejecting pid limits {:?}..{:?}", self.min, self.max);
            Err(Error::config("pid limits need min < max"))
        }
    }

    pub fn clamp(&self, value: T) -> Result<T> {
        if value.try_cmp(self.max)?.is_gt() {
            Ok(self.max)
        } else if value.try_cmp(self.min)?.is_lt() {
            Ok(self.min)
        } else {
            Ok(value)
        }
    }
}

/// Coefficients of `y[n] = y[n-1] + A0 x[n] + A1 x[n-1] + A2 x[n-2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coefficients<T> {
    pub a0: T,
    pub a1: T,
    pub a2: T,
}

impl<T: Scalar> Coefficients<T> {
    fn from_tunings(k: &PidTunings<T>) -> Result<Self> {
        Ok(Self {
            a0: k.kp.try_add(k.ki)?.try_add(k.kd)?,
            a1: k.kp.try_neg()?.try_sub(k.kd.try_add(k.kd)?)?,
            a2: k.kd,
        })
    }
}

/// PID controller in velocity form, evaluated as the z-transform difference
/// equation. The output is clamped to the limits after every step; the state
/// is not corrected for the clamp.
#[derive(Debug, Clone)]
pub struct PidController<T: Scalar> {
    tunings: PidTunings<T>,
    limits: PidLimits<T>,
    coefficients: Coefficients<T>,
    /// x[n], x[n-1], x[n-2]
    errors: Deque<T, 3>,
    output: T,
    set_point: Option<T>,
    auto: bool,
}

impl<T: Scalar> PidController<T> {
    pub fn new(tunings: PidTunings<T>, limits: PidLimits<T>) -> Result<Self> {
        Self::with_mode(tunings, limits, true)
    }

    pub fn with_mode(tunings: PidTunings<T>, limits: PidLimits<T>, auto: bool) -> Result<Self> {
        limits.validate()?;
        let zero = limits.min.zero();
        Ok(Self {
            coefficients: Coefficients::from_tunings(&tunings)?,
            tunings,
            limits,
            errors: zeroed_history(zero),
            output: zero,
            set_point: None,
            auto,
        })
    }

    pub fn set_point(&mut self, set_point: T) {
        self.set_point = Some(set_point);
    }

    /// Runs one step and returns the new output.
    ///
    /// Without a set point, or in manual mode, the previous output is held and
    /// nothing is updated.
    ///
    /// The error terms are summed before the previous output is added. When
    /// that last add leaves a fixed-point format, the output saturates to the
    /// limit the clamp would have picked.
    pub fn process(&mut self, feedback: T) -> Result<T> {
        let set_point = match self.set_point {
            Some(set_point) if self.auto => set_point,
            _ => return Ok(self.output),
        };

        let error = set_point.try_sub(feedback)?;
        let history = self.shifted_history(error);

        let Coefficients { a0, a1, a2 } = self.coefficients;
        let mut delta = self.output.zero();
        for (coefficient, error) in [a0, a1, a2].into_iter().zip(history.iter()) {
            delta = delta.try_add(coefficient.try_mul(*error)?)?;
        }
        let output = match self.output.try_add(delta) {
            Ok(output) => self.limits.clamp(output)?,
            // the previous output lies within the limits, so a sum past the
            // representable range is past the limit on the side of `delta`
            Err(Error::Overflow) if delta.is_negative()? => self.limits.min,
            Err(Error::Overflow) => self.limits.max,
            Err(error) => return Err(error),
        };

        self.errors = history;
        self.output = output;
        Ok(output)
    }

    /// Switches to automatic mode. Coming from manual mode the state is reset
    /// first, so stale history does not kick the output.
    pub fn enable(&mut self) {
        if !self.auto {
            debug!("pid: manual -> auto");
            self.reset();
        }
        self.auto = true;
    }

    pub fn disable(&mut self) {
        if self.auto {
            debug!("pid: auto -> manual");
        }
        self.auto = false;
    }

    pub fn reset(&mut self) {
        debug!("pid: reset");
        let zero = self.output.zero();
        self.output = zero;
        self.errors = zeroed_history(zero);
    }

    /// Takes effect on the next step; the error history is kept.
    pub fn set_tunings(&mut self, tunings: PidTunings<T>) -> Result<()> {
        self.coefficients = Coefficients::from_tunings(&tunings)?;
        self.tunings = tunings;
        Ok(())
    }

    /// The limits are left untouched when `limits` is rejected.
    pub fn set_limits(&mut self, limits: PidLimits<T>) -> Result<()> {
        limits.validate()?;
        self.limits = limits;
        Ok(())
    }

    pub fn clamp(&self, value: T) -> Result<T> {
        self.limits.clamp(value)
    }

    pub fn coefficients(&self) -> Coefficients<T> {
        self.coefficients
    }

    pub fn tunings(&self) -> PidTunings<T> {
        self.tunings
    }

    pub fn limits(&self) -> PidLimits<T> {
        self.limits
    }

    pub fn output(&self) -> T {
        self.output
    }

    pub fn set_point_value(&self) -> Option<T> {
        self.set_point
    }

    pub fn is_auto(&self) -> bool {
        self.auto
    }

    fn shifted_history(&self, error: T) -> Deque<T, 3> {
        let mut history = self.errors.clone();
        history.pop_back();
        // a slot was just freed
        let _ = history.push_front(error);
        history
    }
}

fn zeroed_history<T: Copy>(zero: T) -> Deque<T, 3> {
    let mut history = Deque::new();
    for _ in 0..3 {
        let _ = history.push_back(zero);
    }
    history
}

impl<T: Scalar> Controller<T> for PidController<T> {
    type Output = T;

    fn run(&mut self, feedback: T) -> Result<T> {
        self.process(feedback)
    }

    fn reset(&mut self) {
        PidController::reset(self)
    }
}

#[cfg(test)]
mod tests {
    use numerics::QNumber;

    use super::*;

    fn float_pid() -> PidController<f64> {
        PidController::new(
            PidTunings {
                kp: 1.0,
                ki: 0.1,
                kd: 0.35,
            },
            PidLimits::new(-100.0, 100.0),
        )
        .unwrap()
    }

    #[test]
    fn coefficients_follow_the_tunings() {
        let pid = float_pid();
        let Coefficients { a0, a1, a2 } = pid.coefficients();
        assert!((a0 - 1.45).abs() < 1e-12);
        assert!((a1 + 1.7).abs() < 1e-12);
        assert_eq!(a2, 0.35);
    }

    #[test]
    fn holds_until_a_set_point_arrives() {
        let mut pid = float_pid();
        assert_eq!(pid.process(20.0), Ok(0.0));
        assert_eq!(pid.process(-5.0), Ok(0.0));

        pid.set_point(60.0);
        assert!((pid.process(20.0).unwrap() - 58.0).abs() < 1e-12);
    }

    #[test]
    fn follows_the_difference_equation() {
        let mut pid = float_pid();
        pid.set_point(60.0);
        let expected = [58.0, 48.0, 52.0, 56.0];
        for want in expected {
            let got = pid.process(20.0).unwrap();
            assert!((got - want).abs() < 1e-9, "got {got}, expected {want}");
        }
    }

    #[test]
    fn output_is_clamped() {
        let mut pid = float_pid();
        pid.set_point(1000.0);
        assert_eq!(pid.process(0.0), Ok(100.0));
        pid.set_point(-1000.0);
        assert_eq!(pid.process(0.0), Ok(-100.0));
    }

    #[test]
    fn manual_mode_holds_the_output() {
        let mut pid = float_pid();
        pid.set_point(60.0);
        let held = pid.process(20.0).unwrap();

        pid.disable();
        assert!(!pid.is_auto());
        assert_eq!(pid.process(0.0), Ok(held));
        assert_eq!(pid.output(), held);
    }

    #[test]
    fn enable_from_manual_resets() {
        let mut pid = float_pid();
        pid.set_point(60.0);
        pid.process(20.0).unwrap();

        pid.enable();
        assert!((pid.output() - 58.0).abs() < 1e-12);

        pid.disable();
        pid.enable();
        assert_eq!(pid.output(), 0.0);
        assert!((pid.process(20.0).unwrap() - 58.0).abs() < 1e-12);
    }

    #[test]
    fn reset_clears_history_but_keeps_set_point() {
        let mut pid = float_pid();
        pid.set_point(60.0);
        pid.process(20.0).unwrap();
        pid.process(30.0).unwrap();

        pid.reset();
        assert_eq!(pid.output(), 0.0);
        assert_eq!(pid.set_point_value(), Some(60.0));
        assert!((pid.process(20.0).unwrap() - 58.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_invalid_limits() {
        let tunings = PidTunings {
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
        };
        let result = PidController::new(tunings, PidLimits::new(1.0, 1.0));
        assert!(matches!(result, Err(Error::Configuration(_))));

        let mut pid = float_pid();
        assert!(pid.set_limits(PidLimits::new(5.0, -5.0)).is_err());
        assert_eq!(pid.limits(), PidLimits::new(-100.0, 100.0));
    }

    #[test]
    fn new_tunings_apply_immediately() {
        let mut pid = float_pid();
        pid.set_tunings(PidTunings {
            kp: 2.0,
            ki: 0.0,
            kd: 0.0,
        })
        .unwrap();
        assert_eq!(
            pid.coefficients(),
            Coefficients {
                a0: 2.0,
                a1: -2.0,
                a2: 0.0
            }
        );
        pid.set_point(1.0);
        assert_eq!(pid.process(0.5), Ok(1.0));
    }

    #[test]
    fn clamp_is_inclusive() {
        let pid = float_pid();
        assert_eq!(pid.clamp(100.0), Ok(100.0));
        assert_eq!(pid.clamp(100.5), Ok(100.0));
        assert_eq!(pid.clamp(-250.0), Ok(-100.0));
        assert_eq!(pid.clamp(3.0), Ok(3.0));
    }

    #[test]
    fn fixed_point_controller() {
        let q = |v| QNumber::q15(v).unwrap();
        let mut pid = PidController::new(
            PidTunings {
                kp: q(0.5),
                ki: q(0.125),
                kd: q(0.0),
            },
            PidLimits::new(q(-0.5), q(0.5)),
        )
        .unwrap();

        assert_eq!(pid.process(q(0.1)), Ok(q(0.0)));
        pid.set_point(q(0.25));
        // 0.625 * 0.25
        assert_eq!(pid.process(q(0.0)), Ok(q(0.15625)));
        // + 0.625 * 0.25 - 0.5 * 0.25
        assert_eq!(pid.process(q(0.0)), Ok(q(0.1875)));
    }

    #[test]
    fn fixed_point_output_saturates_at_the_limits() {
        let q = |v| QNumber::q15(v).unwrap();
        let tunings = PidTunings {
            kp: q(0.5),
            ki: q(0.25),
            kd: q(0.0),
        };
        let limits = PidLimits::new(q(-0.9), q(0.9));

        let mut pid = PidController::new(tunings, limits).unwrap();
        pid.set_point(q(0.8));
        assert!((pid.process(q(0.0)).unwrap().to_f64() - 0.6).abs() < 1e-4);
        assert!((pid.process(q(0.0)).unwrap().to_f64() - 0.8).abs() < 1e-4);
        // 0.8 + 0.2 does not fit the format
        assert_eq!(pid.process(q(0.0)), Ok(q(0.9)));
        assert_eq!(pid.process(q(0.0)), Ok(q(0.9)));

        let mut pid = PidController::new(tunings, limits).unwrap();
        pid.set_point(q(-0.8));
        pid.process(q(0.0)).unwrap();
        pid.process(q(0.0)).unwrap();
        assert_eq!(pid.process(q(0.0)), Ok(q(-0.9)));
    }

    #[test]
    fn fixed_point_coefficient_overflow() {
        let q = |v| QNumber::q15(v).unwrap();
        let result = PidController::new(
            PidTunings {
                kp: q(0.6),
                ki: q(0.3),
                kd: q(0.2),
            },
            PidLimits::new(q(-0.5), q(0.5)),
        );
        assert_eq!(result.unwrap_err(), Error::Overflow);
    }
}
