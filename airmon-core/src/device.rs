//! Process-Level State Machine
//!
//! ## States
//!
//! ```text
//!          ┌──────────── connect failed (after boot backoff) ───────────┐
//!          ▼                                                            │
//!        Boot ──► ConnectingWifi ──► SensorsInitializing ──┬──► Running │
//!                        │                                 └──► RunningDegraded
//!                        └──────────────────────────────────────────────┘
//! ```
//!
//! `SensorsInitializing` ends in `Running` when both sensors are Ready and
//! in `RunningDegraded` otherwise. Degraded mode keeps uploading whatever the
//! live sensor provides; with both sensors Faulted it keeps the link up but
//! has nothing to send.
//!
//! ## One running cycle
//!
//! 1. If the link dropped, run the connect routine once. Uploads wait
//!    until it comes back.
//! 2. If the sample interval is due, acquire a frame (both reads, then fusion).
//! 3. If the cycle produced a frame, the link is up and the upload interval
//!    is due, upload it. The boot status post occupies the channel's
//!    rate-limit window, so the first upload follows it by at least 15 s.
//!
//! Everything is blocking and runs on the caller's thread; `step()` performs
//! exactly one transition or one cycle, `run()` loops forever.

use core::fmt::Write as _;
use core::net::Ipv4Addr;

use embedded_hal::delay::DelayNs;

use crate::config::{LinkPolicy, MonitorConfig, ScheduleConfig, WifiConfig};
use crate::errors::{MonitorError, MonitorResult, TransportError};
use crate::frame::Frame;
use crate::network;
use crate::retry::RetryPolicy;
use crate::scheduler::{is_due, UploadScheduler};
use crate::sensors::{SensorId, SensorOrchestrator};
use crate::time::{TimeSource, Timestamp};
use crate::traits::{
    AirQualitySensor, ConnectionState, EnvironmentalSensor, NetworkLink, StatusCode,
    TelemetryClient,
};

/// Process-level state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// Power-on, or retrying after a failed connect
    Boot,
    /// Running the WiFi connect routine
    ConnectingWifi,
    /// Running sensor setup
    SensorsInitializing,
    /// Both sensors Ready
    Running,
    /// At least one sensor Faulted
    RunningDegraded,
}

impl DeviceState {
    /// True in either running state
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running | Self::RunningDegraded)
    }
}

/// What one running cycle did
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CycleReport {
    /// Link was up once reconnect handling finished
    pub link_up: bool,
    /// A reconnect was attempted this cycle
    pub reconnected: Option<bool>,
    /// The sample interval was due and an acquisition ran
    pub sampled: bool,
    /// Frame produced by the acquisition
    pub frame: Option<Frame>,
    /// Why the acquisition produced no frame
    pub read_error: Option<MonitorError>,
    /// Upload outcome, if an upload was attempted
    pub upload: Option<Result<StatusCode, TransportError>>,
}

/// One monitor: both sensors, the link, the channel and the loop timing
pub struct Device<P, S, L, T, D, C> {
    orchestrator: SensorOrchestrator<P, S>,
    scheduler: UploadScheduler<T>,
    link: L,
    delay: D,
    clock: C,
    wifi: WifiConfig,
    link_policy: LinkPolicy,
    setup_retry: RetryPolicy,
    schedule: ScheduleConfig,
    state: DeviceState,
    boot_attempts: u32,
    local_ip: Option<Ipv4Addr>,
    last_sample: Option<Timestamp>,
    last_report: CycleReport,
}

impl<P, S, L, T, D, C> Device<P, S, L, T, D, C>
where
    P: EnvironmentalSensor,
    S: AirQualitySensor,
    L: NetworkLink,
    T: TelemetryClient,
    D: DelayNs,
    C: TimeSource,
{
    /// Assemble a device from its configuration and owned handles
    pub fn new(
        config: &MonitorConfig,
        primary: P,
        secondary: S,
        link: L,
        client: T,
        delay: D,
        clock: C,
    ) -> MonitorResult<Self> {
        config.validate()?;

        let orchestrator =
            SensorOrchestrator::new(primary, secondary, config.profile, config.calibration)
                .with_baseline(config.baseline);
        let scheduler = UploadScheduler::new(
            client,
            config.telemetry.channel_id,
            &config.telemetry.write_key,
            config.schedule.upload_interval_ms,
        )?
        .with_jitter(config.schedule.max_jitter_ms, config.schedule.jitter_seed);

        Ok(Self {
            orchestrator,
            scheduler,
            link,
            delay,
            clock,
            wifi: config.wifi.clone(),
            link_policy: config.link,
            setup_retry: config.setup_retry,
            schedule: config.schedule,
            state: DeviceState::Boot,
            boot_attempts: 0,
            local_ip: None,
            last_sample: None,
            last_report: CycleReport::default(),
        })
    }

    /// Current state
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Number of times the boot sequence has started
    pub fn boot_attempts(&self) -> u32 {
        self.boot_attempts
    }

    /// Address from the last successful connect
    pub fn local_ip(&self) -> Option<Ipv4Addr> {
        self.local_ip
    }

    /// Report of the most recent running cycle
    pub fn last_report(&self) -> &CycleReport {
        &self.last_report
    }

    /// Borrow the sensor orchestrator
    pub fn orchestrator(&self) -> &SensorOrchestrator<P, S> {
        &self.orchestrator
    }

    /// Mutably borrow the sensor orchestrator
    pub fn orchestrator_mut(&mut self) -> &mut SensorOrchestrator<P, S> {
        &mut self.orchestrator
    }

    /// Borrow the upload scheduler
    pub fn scheduler(&self) -> &UploadScheduler<T> {
        &self.scheduler
    }

    /// Borrow the network link
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutably borrow the network link
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Borrow the delay provider
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Perform one state transition, or one cycle when running
    pub fn step(&mut self) -> DeviceState {
        let next = match self.state {
            DeviceState::Boot => {
                self.boot_attempts += 1;
                log_info!("boot attempt {}", self.boot_attempts);
                DeviceState::ConnectingWifi
            }
            DeviceState::ConnectingWifi => self.connect_wifi(),
            DeviceState::SensorsInitializing => self.initialize_sensors(),
            state => {
                self.last_report = self.run_cycle();
                state
            }
        };

        if next != self.state {
            log_debug!("state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
        next
    }

    /// Drive the device forever
    pub fn run(&mut self) -> ! {
        loop {
            if self.step().is_running() {
                self.delay.delay_ms(self.schedule.tick_ms);
            }
        }
    }

    fn connect_wifi(&mut self) -> DeviceState {
        match network::connect(&mut self.link, &self.wifi, &self.link_policy, &mut self.delay) {
            Ok(ip) => {
                self.local_ip = Some(ip);
                DeviceState::SensorsInitializing
            }
            Err(err) => {
                log_warn!("boot connect failed: {:?}", err);
                self.delay.delay_ms(self.link_policy.boot_backoff_ms);
                DeviceState::Boot
            }
        }
    }

    fn initialize_sensors(&mut self) -> DeviceState {
        let primary = self
            .orchestrator
            .initialize(SensorId::Primary, &self.setup_retry, &mut self.delay)
            .is_ok();
        let secondary = self
            .orchestrator
            .initialize(SensorId::Secondary, &self.setup_retry, &mut self.delay)
            .is_ok();

        let mut status: heapless::String<64> = heapless::String::new();
        let next = match (primary, secondary) {
            (true, true) => {
                let _ = write!(status, "online, firmware {}", crate::VERSION);
                DeviceState::Running
            }
            (true, false) | (false, true) => {
                let faulted = if primary { SensorId::Secondary } else { SensorId::Primary };
                let _ = write!(status, "degraded: {} faulted", faulted.name());
                DeviceState::RunningDegraded
            }
            (false, false) => {
                let _ = write!(status, "degraded: no sensors");
                DeviceState::RunningDegraded
            }
        };
        let now = self.clock.now();
        self.scheduler.post_status(self.link.status(), &status, now);
        next
    }

    fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        if !self.link.status().is_connected() {
            log_warn!("WiFi link down, reconnecting");
            let result =
                network::connect(&mut self.link, &self.wifi, &self.link_policy, &mut self.delay);
            if let Ok(ip) = result {
                self.local_ip = Some(ip);
            }
            report.reconnected = Some(result.is_ok());
        }
        report.link_up = self.link.status() == ConnectionState::Connected;

        let now = self.clock.now();
        if !is_due(now, self.last_sample, self.schedule.sample_interval_ms) {
            return report;
        }
        self.last_sample = Some(now);
        report.sampled = true;

        match self.orchestrator.acquire() {
            Ok(frame) => report.frame = Some(frame),
            Err(err) => {
                report.read_error = Some(err);
                return report;
            }
        }

        if let Some(frame) = report.frame {
            if report.link_up && self.scheduler.is_due_at(now) {
                report.upload = Some(self.scheduler.submit_frame(&frame, now));
            }
        }
        report
    }
}
