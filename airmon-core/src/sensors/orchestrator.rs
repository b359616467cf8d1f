//! Sensor Orchestration
//!
//! ## Overview
//!
//! The orchestrator owns both sensor drivers, their lifecycle state, the
//! calibration offsets and the last good reading from each sensor. It is the
//! only code that talks to the drivers.
//!
//! ## Setup
//!
//! `initialize` runs the driver's `begin()` under a [`RetryPolicy`]. After
//! `begin()` succeeds:
//!
//! - **BME680**: the measurement profile (oversampling, IIR filter, gas
//!   heater) is applied as part of the same attempt, so a sensor that
//!   answers the probe but rejects its configuration is retried.
//! - **CCS811**: the first sample's thermistor estimate is trimmed to the
//!   reference ambient temperature. This waits for a bounded number of
//!   readiness polls; if no sample shows up the sensor is still Ready and
//!   the trim is skipped.
//!
//! A sensor that exhausts its budget becomes Faulted. That only halts its
//! own acquisition path.
//!
//! ## Acquisition cycle
//!
//! ```text
//! read_primary ──► read_secondary(ambient from primary, if any) ──► fuse
//! ```
//!
//! Both reads run (or fail) before fusion is attempted. A failed read is
//! returned as-is; nothing is retried inside the cycle.

use embedded_hal::delay::DelayNs;

use crate::calibration::CalibrationOffsets;
use crate::config::{BaselineConfig, SensorProfile};
use crate::errors::{DriverError, MonitorError, MonitorResult};
use crate::frame::{Ambient, DataFrame, Frame, PrimaryReading, SecondaryReading};
use crate::retry::RetryPolicy;
use crate::traits::{AirQualitySensor, EnvironmentalSensor};

use super::state::{SensorId, SensorState};

/// Owner of both sensors and their calibration
pub struct SensorOrchestrator<P, S> {
    primary: P,
    secondary: S,
    primary_state: SensorState,
    secondary_state: SensorState,
    profile: SensorProfile,
    baseline: BaselineConfig,
    offsets: CalibrationOffsets,
    last_primary: Option<PrimaryReading>,
    last_secondary: Option<SecondaryReading>,
}

impl<P, S> SensorOrchestrator<P, S>
where
    P: EnvironmentalSensor,
    S: AirQualitySensor,
{
    /// Take ownership of both drivers
    pub fn new(primary: P, secondary: S, profile: SensorProfile, offsets: CalibrationOffsets) -> Self {
        Self {
            primary,
            secondary,
            primary_state: SensorState::Uninitialized,
            secondary_state: SensorState::Uninitialized,
            profile,
            baseline: BaselineConfig::default(),
            offsets,
            last_primary: None,
            last_secondary: None,
        }
    }

    /// Override the CCS811 thermistor trim settings
    pub fn with_baseline(mut self, baseline: BaselineConfig) -> Self {
        self.baseline = baseline;
        self
    }

    /// Lifecycle state of `sensor`
    pub fn state(&self, sensor: SensorId) -> SensorState {
        match sensor {
            SensorId::Primary => self.primary_state,
            SensorId::Secondary => self.secondary_state,
        }
    }

    /// Calibration offsets in use
    pub fn offsets(&self) -> &CalibrationOffsets {
        &self.offsets
    }

    /// Most recent successful BME680 reading
    pub fn last_primary(&self) -> Option<&PrimaryReading> {
        self.last_primary.as_ref()
    }

    /// Most recent successful CCS811 reading
    pub fn last_secondary(&self) -> Option<&SecondaryReading> {
        self.last_secondary.as_ref()
    }

    /// Borrow the BME680 driver
    pub fn primary_driver(&self) -> &P {
        &self.primary
    }

    /// Borrow the CCS811 driver
    pub fn secondary_driver(&self) -> &S {
        &self.secondary
    }

    /// Mutably borrow the BME680 driver
    pub fn primary_driver_mut(&mut self) -> &mut P {
        &mut self.primary
    }

    /// Mutably borrow the CCS811 driver
    pub fn secondary_driver_mut(&mut self) -> &mut S {
        &mut self.secondary
    }

    /// Bring `sensor` to Ready, or Faulted once `policy` is exhausted
    pub fn initialize<D: DelayNs>(
        &mut self,
        sensor: SensorId,
        policy: &RetryPolicy,
        delay: &mut D,
    ) -> MonitorResult<()> {
        log_info!("{} starting...", sensor.name());

        let outcome = policy.run(delay, |attempt| {
            self.set_state(sensor, SensorState::Initializing { attempt });
            let result = self.begin_once(sensor);
            if let Err(err) = result {
                log_warn!(
                    "{} setup attempt {} failed ({:?}), check wiring",
                    sensor.name(),
                    attempt,
                    err
                );
            }
            result
        });

        match outcome {
            Ok(()) => {
                self.set_state(sensor, SensorState::Ready);
                log_info!("{} started", sensor.name());
                if sensor == SensorId::Secondary {
                    self.trim_secondary_baseline(delay);
                }
                Ok(())
            }
            Err(exhausted) => {
                self.set_state(sensor, SensorState::Faulted);
                log_error!(
                    "{} faulted after {} attempts",
                    sensor.name(),
                    exhausted.attempts
                );
                Err(MonitorError::SetupFailure {
                    sensor,
                    attempts: exhausted.attempts,
                })
            }
        }
    }

    /// Read and calibrate the BME680
    pub fn read_primary(&mut self) -> MonitorResult<PrimaryReading> {
        self.ensure_ready(SensorId::Primary)?;

        let raw = self
            .primary
            .perform_reading()
            .map_err(|cause| read_failure(SensorId::Primary, cause))?;
        if !raw.is_finite() {
            return Err(read_failure(SensorId::Primary, DriverError::InvalidData));
        }

        let reading = self.offsets.primary.apply(&raw);
        self.last_primary = Some(reading);
        Ok(reading)
    }

    /// Read and calibrate the CCS811, compensating with `ambient` when given
    ///
    /// If priming the sensor with ambient data fails the read continues
    /// uncompensated.
    pub fn read_secondary(&mut self, ambient: Option<Ambient>) -> MonitorResult<SecondaryReading> {
        self.ensure_ready(SensorId::Secondary)?;

        if let Some(ambient) = ambient {
            if let Err(err) = self
                .secondary
                .set_environmental_data(ambient.humidity, ambient.temperature)
            {
                log_warn!("CCS811 compensation rejected ({:?}), reading uncompensated", err);
            }
        }

        let ready = self
            .secondary
            .data_ready()
            .map_err(|cause| read_failure(SensorId::Secondary, cause))?;
        if !ready {
            return Err(read_failure(SensorId::Secondary, DriverError::NotReady));
        }

        let raw = self
            .secondary
            .read_data()
            .map_err(|cause| read_failure(SensorId::Secondary, cause))?;
        let temperature = self
            .secondary
            .temperature()
            .map_err(|cause| read_failure(SensorId::Secondary, cause))?;
        if !temperature.is_finite() {
            return Err(read_failure(SensorId::Secondary, DriverError::InvalidData));
        }

        let reading = self.offsets.secondary.apply(raw, temperature);
        self.last_secondary = Some(reading);
        Ok(reading)
    }

    /// Join two readings from the same cycle
    pub fn fuse(primary: &PrimaryReading, secondary: &SecondaryReading) -> DataFrame {
        DataFrame::fuse(primary, secondary)
    }

    /// Run one acquisition cycle over every Ready sensor
    ///
    /// Returns `Frame::Complete` when both sensors are Ready and both reads
    /// succeed. A degraded frame is only produced when the other sensor is
    /// Faulted, never because its read failed.
    pub fn acquire(&mut self) -> MonitorResult<Frame> {
        let primary_ready = self.primary_state.is_ready();
        let secondary_ready = self.secondary_state.is_ready();

        match (primary_ready, secondary_ready) {
            (true, true) => {
                let primary = self.read_primary();
                let ambient = primary.as_ref().ok().map(PrimaryReading::ambient);
                let secondary = self.read_secondary(ambient);
                let frame = Self::fuse(&primary?, &secondary?);
                log_debug!(
                    "frame: T={} P={} RH={} CO2={} TVOC={}",
                    frame.temperature,
                    frame.pressure,
                    frame.humidity,
                    frame.co2,
                    frame.tvoc
                );
                Ok(Frame::Complete(frame))
            }
            (true, false) => self.read_primary().map(Frame::PrimaryOnly),
            (false, true) => self.read_secondary(None).map(Frame::SecondaryOnly),
            (false, false) => Err(MonitorError::NoSensors),
        }
    }

    fn begin_once(&mut self, sensor: SensorId) -> Result<(), DriverError> {
        match sensor {
            SensorId::Primary => {
                self.primary.begin()?;
                self.primary.configure(&self.profile)
            }
            SensorId::Secondary => self.secondary.begin(),
        }
    }

    fn trim_secondary_baseline<D: DelayNs>(&mut self, delay: &mut D) {
        let mut polls = 0;
        loop {
            match self.secondary.data_ready() {
                Ok(true) => break,
                Ok(false) => {}
                Err(err) => {
                    log_warn!("CCS811 baseline skipped: {:?}", err);
                    return;
                }
            }
            polls += 1;
            if polls >= self.baseline.max_polls {
                log_warn!("CCS811 baseline skipped: no sample after {} polls", polls);
                return;
            }
            delay.delay_ms(self.baseline.poll_interval_ms);
        }

        let trimmed = self.secondary.temperature().and_then(|estimate| {
            self.secondary
                .set_temperature_offset(estimate - self.baseline.reference_temperature_c)
        });
        if let Err(err) = trimmed {
            log_warn!("CCS811 baseline skipped: {:?}", err);
        }
    }

    fn ensure_ready(&self, sensor: SensorId) -> MonitorResult<()> {
        if self.state(sensor).is_ready() {
            Ok(())
        } else {
            Err(MonitorError::SensorUnavailable { sensor })
        }
    }

    fn set_state(&mut self, sensor: SensorId, state: SensorState) {
        match sensor {
            SensorId::Primary => self.primary_state = state,
            SensorId::Secondary => self.secondary_state = state,
        }
    }
}

fn read_failure(sensor: SensorId, cause: DriverError) -> MonitorError {
    log_warn!("{} read failed: {:?}", sensor.name(), cause);
    MonitorError::ReadFailure { sensor, cause }
}
