//! Runs engineering-unit signals through a PID controller that works in a
//! normalized numeric range.
//!
//! Set point and measurement are multiplied by the scale `s` on the way in,
//! tunings by `s` once at construction. The controller output then carries a
//! factor of `s²`, which is divided out on the way back.

use log::warn;
use numerics::{Error, Result, Scalar};

use crate::controller::Controller;
use crate::pid::{PidController, PidLimits, PidTunings};

#[derive(Debug, Clone)]
pub struct ScaledPid<T: Scalar> {
    scale: T,
    pid: PidController<T>,
}

impl<T: Scalar> ScaledPid<T> {
    /// `tunings` and `limits` are given in engineering units. `scale` must lie
    /// in (0, 1) and fixes the numeric format for the whole controller.
    pub fn new(scale: T, tunings: PidTunings<f64>, limits: PidLimits<f64>) -> Result<Self> {
        let s = scale.to_f64();
        if !s.is_finite() || !scale.is_positive()? || s >= 1.0 {
            warn!("rejecting pid scale {}", s);
            return Err(Error::config("pid scale must lie in (0, 1)"));
        }

        let tunings = PidTunings {
            kp: scale.lift(tunings.kp * s)?,
            ki: scale.lift(tunings.ki * s)?,
            kd: scale.lift(tunings.kd * s)?,
        };
        let limits = PidLimits::new(
            scale.lift(limits.min * s * s)?,
            scale.lift(limits.max * s * s)?,
        );

        Ok(Self {
            scale,
            pid: PidController::new(tunings, limits)?,
        })
    }

    pub fn set_point(&mut self, value: f64) -> Result<()> {
        let set_point = self.lift(value)?;
        self.pid.set_point(set_point);
        Ok(())
    }

    /// One controller step on an engineering-unit measurement; the output is
    /// in engineering units as well.
    pub fn process(&mut self, measured: f64) -> Result<f64> {
        let measured = self.lift(measured)?;
        let output = self.pid.process(measured)?;
        let s = self.scale.to_f64();
        Ok(output.to_f64() / (s * s))
    }

    pub fn enable(&mut self) {
        self.pid.enable()
    }

    pub fn disable(&mut self) {
        self.pid.disable()
    }

    pub fn reset(&mut self) {
        self.pid.reset()
    }

    pub fn scale(&self) -> T {
        self.scale
    }

    pub fn inner(&self) -> &PidController<T> {
        &self.pid
    }

    fn lift(&self, value: f64) -> Result<T> {
        self.scale.lift(value * self.scale.to_f64())
    }
}

impl<T: Scalar> Controller<f64> for ScaledPid<T> {
    type Output = f64;

    fn run(&mut self, measured: f64) -> Result<f64> {
        self.process(measured)
    }

    fn reset(&mut self) {
        self.pid.reset()
    }
}
