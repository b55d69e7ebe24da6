//! Field-oriented current loop.
//!
//! Phase currents are moved into the rotor frame, where the d axis is held at
//! zero and the q axis tracks the torque-producing current reference. The two
//! PID outputs are the d/q voltage command for the modulator.

use numerics::{Result, Scalar};

use crate::controller::Controller;
use crate::frames::{RotatingFrame, ThreePhase};
use crate::pid::{PidController, PidLimits, PidTunings};
use crate::svm::{SpaceVectorModulation, SvmOutput};
use crate::transforms::ClarkePark;

/// Both current controllers share one set of tunings and limits.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FocConfig<T> {
    pub current_tunings: PidTunings<T>,
    pub current_limits: PidLimits<T>,
}

#[derive(Debug, Clone)]
pub struct FieldOrientedController<T: Scalar> {
    transform: ClarkePark<T>,
    modulation: SpaceVectorModulation<T>,
    d_axis: PidController<T>,
    q_axis: PidController<T>,
}

impl<T: Scalar> FieldOrientedController<T> {
    pub fn new(config: FocConfig<T>) -> Result<Self> {
        Self::with_trigonometry(config, T::Trigonometry::default())
    }

    pub fn with_trigonometry(config: FocConfig<T>, trigonometry: T::Trigonometry) -> Result<Self> {
        let mut d_axis = PidController::new(config.current_tunings, config.current_limits)?;
        let q_axis = PidController::new(config.current_tunings, config.current_limits)?;
        d_axis.set_point(config.current_limits.min.zero());

        Ok(Self {
            transform: ClarkePark::with_trigonometry(trigonometry.clone()),
            modulation: SpaceVectorModulation::with_trigonometry(trigonometry),
            d_axis,
            q_axis,
        })
    }

    /// Until a reference is set the q axis holds a zero voltage.
    pub fn set_current_reference(&mut self, current: T) {
        self.q_axis.set_point(current);
    }

    /// One current-loop period: measured phase currents at electrical angle
    /// `angle` (in turns) to duty cycles.
    pub fn process(&mut self, currents: ThreePhase<T>, angle: T) -> Result<SvmOutput<T>> {
        let measured = self.transform.forward(currents, angle)?;
        let voltage = RotatingFrame::new(
            self.d_axis.process(measured.d)?,
            self.q_axis.process(measured.q)?,
        );
        self.modulation.generate(voltage, angle)
    }

    pub fn reset(&mut self) {
        self.d_axis.reset();
        self.q_axis.reset();
    }

    /// Voltage command of the last period.
    pub fn voltage(&self) -> RotatingFrame<T> {
        RotatingFrame::new(self.d_axis.output(), self.q_axis.output())
    }

    pub fn d_axis(&self) -> &PidController<T> {
        &self.d_axis
    }

    pub fn q_axis(&self) -> &PidController<T> {
        &self.q_axis
    }
}

impl<T: Scalar> Controller<(ThreePhase<T>, T)> for FieldOrientedController<T> {
    type Output = SvmOutput<T>;

    fn run(&mut self, (currents, angle): (ThreePhase<T>, T)) -> Result<SvmOutput<T>> {
        self.process(currents, angle)
    }

    fn reset(&mut self) {
        FieldOrientedController::reset(self)
    }
}
