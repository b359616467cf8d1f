//! End-to-end tests of the device state machine with scripted hardware
//!
//! Every test drives `Device::step()` by hand against a manually advanced
//! clock, so each transition and each running cycle can be inspected.

mod common;

use airmon_core::{
    config::DEFAULT_HOSTNAME,
    constants::telemetry::MIN_UPLOAD_INTERVAL_MS,
    errors::{ConfigError, DriverError},
    time::FixedTime,
    ConnectionState, Device, DeviceState, Frame, MonitorConfig, MonitorError, SensorId,
    SensorState, TelemetryClient,
};

use common::{
    test_config, MockLink, RateLimitedChannel, RecordingClient, RecordingDelay,
    ScriptedAirQuality, ScriptedEnvironment,
};

type TestDevice<'a> = Device<
    ScriptedEnvironment,
    ScriptedAirQuality,
    MockLink,
    RecordingClient,
    RecordingDelay,
    &'a FixedTime,
>;

fn device<'a>(
    config: &MonitorConfig,
    primary: ScriptedEnvironment,
    secondary: ScriptedAirQuality,
    link: MockLink,
    clock: &'a FixedTime,
) -> TestDevice<'a> {
    Device::new(
        config,
        primary,
        secondary,
        link,
        RecordingClient::default(),
        RecordingDelay::default(),
        clock,
    )
    .expect("valid config")
}

fn healthy_device(clock: &FixedTime) -> TestDevice<'_> {
    device(
        &test_config(),
        ScriptedEnvironment::healthy(),
        ScriptedAirQuality::healthy(),
        MockLink::connecting(),
        clock,
    )
}

/// Step until the device reaches a running state
fn boot<T: TelemetryClient>(
    device: &mut Device<
        ScriptedEnvironment,
        ScriptedAirQuality,
        MockLink,
        T,
        RecordingDelay,
        &FixedTime,
    >,
) -> DeviceState {
    for _ in 0..16 {
        let state = device.step();
        if state.is_running() {
            return state;
        }
    }
    panic!("device never reached a running state: {:?}", device.state());
}

#[test]
fn test_boot_sequence_reaches_running() {
    let clock = FixedTime::new(0);
    let mut device = healthy_device(&clock);

    assert_eq!(device.state(), DeviceState::Boot);
    assert_eq!(device.step(), DeviceState::ConnectingWifi);
    assert_eq!(device.step(), DeviceState::SensorsInitializing);
    assert_eq!(device.step(), DeviceState::Running);

    assert_eq!(device.boot_attempts(), 1);
    assert_eq!(device.local_ip(), Some([192, 168, 1, 50].into()));
    assert_eq!(device.link().hostname, DEFAULT_HOSTNAME);
    assert_eq!(
        device.link().credentials,
        Some(("lab-net".to_string(), "correct horse".to_string()))
    );

    let statuses = device.scheduler().client().status_writes();
    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].starts_with("online"));
}

#[test]
fn test_first_upload_waits_for_boot_status_window() {
    let clock = FixedTime::new(0);
    let mut device = healthy_device(&clock);
    boot(&mut device);

    assert_eq!(device.step(), DeviceState::Running);

    let report = device.last_report();
    assert!(report.link_up);
    assert!(report.sampled);
    assert!(matches!(report.frame, Some(Frame::Complete(_))));
    assert_eq!(report.upload, None);
    assert!(device.scheduler().client().field_writes().is_empty());

    clock.set(MIN_UPLOAD_INTERVAL_MS);
    device.step();
    assert_eq!(device.last_report().upload, Some(Ok(200)));

    let uploads = device.scheduler().client().field_writes();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].fields.len(), 8);
    assert_eq!(device.scheduler().last_upload(), Some(15_000));
}

#[test]
fn test_boot_status_does_not_waste_uploads_on_rate_limit() {
    let clock = FixedTime::new(0);
    let mut device = Device::new(
        &test_config(),
        ScriptedEnvironment::healthy(),
        ScriptedAirQuality::healthy(),
        MockLink::connecting(),
        RateLimitedChannel::new(&clock, MIN_UPLOAD_INTERVAL_MS),
        RecordingDelay::default(),
        &clock,
    )
    .expect("valid config");
    boot(&mut device);

    let mut uploads = Vec::new();
    for now in [0, 5_000, 10_000, 15_000] {
        clock.set(now);
        device.step();
        uploads.push(device.last_report().upload);
    }

    assert_eq!(uploads, vec![None, None, None, Some(Ok(200))]);
    let channel = device.scheduler().client();
    assert_eq!(channel.log, vec![(0, false, 200), (15_000, true, 200)]);
    assert_eq!(channel.refused(), 0);
    assert_eq!(device.scheduler().stats().rejected, 0);
}

#[test]
fn test_sampling_and_upload_run_on_their_own_intervals() {
    let clock = FixedTime::new(0);
    let mut device = healthy_device(&clock);
    boot(&mut device);
    clock.set(MIN_UPLOAD_INTERVAL_MS);
    device.step();
    assert_eq!(device.last_report().upload, Some(Ok(200)));

    // Same instant: nothing due
    device.step();
    assert!(!device.last_report().sampled);

    // Sample interval elapsed, upload interval not yet
    clock.advance(5_000);
    device.step();
    assert!(device.last_report().sampled);
    assert!(device.last_report().frame.is_some());
    assert_eq!(device.last_report().upload, None);

    clock.set(35_000);
    device.step();
    assert_eq!(device.last_report().upload, Some(Ok(200)));
    assert_eq!(device.scheduler().client().field_writes().len(), 2);
}

#[test]
fn test_failed_connect_backs_off_and_reboots() {
    let clock = FixedTime::new(0);
    let mut device = device(
        &test_config(),
        ScriptedEnvironment::healthy(),
        ScriptedAirQuality::healthy(),
        MockLink::scripted(&[ConnectionState::Failed]),
        &clock,
    );

    device.step();
    assert_eq!(device.step(), DeviceState::Boot);
    assert_eq!(device.delay().count_of(10_000), 1);
    assert!(device.scheduler().client().writes.is_empty());

    assert_eq!(device.step(), DeviceState::ConnectingWifi);
    assert_eq!(device.boot_attempts(), 2);
    assert_eq!(device.step(), DeviceState::SensorsInitializing);
    assert_eq!(device.link().begins, 2);
}

#[test]
fn test_faulted_primary_runs_degraded() {
    let clock = FixedTime::new(0);
    let mut device = device(
        &test_config(),
        ScriptedEnvironment::dead(),
        ScriptedAirQuality::healthy(),
        MockLink::connecting(),
        &clock,
    );

    assert_eq!(boot(&mut device), DeviceState::RunningDegraded);
    assert_eq!(device.orchestrator().state(SensorId::Primary), SensorState::Faulted);
    assert_eq!(device.orchestrator().primary_driver().begins, 3);
    assert_eq!(
        device.scheduler().client().status_writes(),
        vec!["degraded: BME680 faulted"]
    );

    clock.set(MIN_UPLOAD_INTERVAL_MS);
    assert_eq!(device.step(), DeviceState::RunningDegraded);
    assert!(matches!(device.last_report().frame, Some(Frame::SecondaryOnly(_))));

    let uploads = device.scheduler().client().field_writes();
    let indices: Vec<u8> = uploads[0].fields.iter().map(|&(i, _)| i).collect();
    assert_eq!(indices, vec![6, 7, 8]);
}

#[test]
fn test_both_sensors_faulted_keeps_running_without_uploads() {
    let clock = FixedTime::new(0);
    let mut device = device(
        &test_config(),
        ScriptedEnvironment::dead(),
        ScriptedAirQuality::dead(),
        MockLink::connecting(),
        &clock,
    );

    assert_eq!(boot(&mut device), DeviceState::RunningDegraded);
    assert_eq!(
        device.scheduler().client().status_writes(),
        vec!["degraded: no sensors"]
    );

    device.step();
    assert_eq!(device.last_report().read_error, Some(MonitorError::NoSensors));
    assert!(device.last_report().link_up);
    assert!(device.scheduler().client().field_writes().is_empty());
}

#[test]
fn test_read_failure_skips_upload_without_reinit() {
    let clock = FixedTime::new(0);
    let mut device = healthy_device(&clock);
    boot(&mut device);
    device
        .orchestrator_mut()
        .secondary_driver_mut()
        .ready_by_default = false;

    device.step();

    let report = device.last_report();
    assert_eq!(
        report.read_error,
        Some(MonitorError::ReadFailure {
            sensor: SensorId::Secondary,
            cause: DriverError::NotReady,
        })
    );
    assert_eq!(report.frame, None);
    assert_eq!(report.upload, None);
    assert!(device.scheduler().client().field_writes().is_empty());
    assert_eq!(device.orchestrator().secondary_driver().begins, 1);
    assert_eq!(device.state(), DeviceState::Running);
}

#[test]
fn test_link_drop_defers_upload_until_reconnect() {
    let clock = FixedTime::new(0);
    let mut device = healthy_device(&clock);
    boot(&mut device);
    clock.set(15_000);
    device.step();
    assert_eq!(device.scheduler().client().field_writes().len(), 1);

    device.link_mut().drop_link();
    device.link_mut().outcomes.push_back(ConnectionState::Failed);
    clock.set(35_000);
    device.step();

    let report = device.last_report();
    assert_eq!(report.reconnected, Some(false));
    assert!(!report.link_up);
    assert!(report.frame.is_some());
    assert_eq!(report.upload, None);
    assert_eq!(device.scheduler().client().field_writes().len(), 1);

    clock.set(40_000);
    device.step();

    let report = device.last_report();
    assert_eq!(report.reconnected, Some(true));
    assert!(report.link_up);
    assert_eq!(report.upload, Some(Ok(200)));
    assert_eq!(device.scheduler().client().field_writes().len(), 2);
    assert_eq!(device.state(), DeviceState::Running);
}

#[test]
fn test_rejected_upload_retried_next_cycle() {
    let clock = FixedTime::new(0);
    let config = test_config();
    let mut device = Device::new(
        &config,
        ScriptedEnvironment::healthy(),
        ScriptedAirQuality::healthy(),
        MockLink::connecting(),
        // boot status post, then a rate-limited upload
        RecordingClient::answering(&[Ok(200), Ok(-401)]),
        RecordingDelay::default(),
        &clock,
    )
    .unwrap();
    boot(&mut device);

    clock.set(15_000);
    device.step();
    assert_eq!(device.last_report().upload, Some(Ok(-401)));
    assert_eq!(device.scheduler().last_upload(), None);

    clock.advance(5_000);
    device.step();
    assert_eq!(device.last_report().upload, Some(Ok(200)));
    assert_eq!(device.scheduler().last_upload(), Some(20_000));
}

#[test]
fn test_invalid_config_rejected() {
    let clock = FixedTime::new(0);
    let mut config = test_config();
    config.wifi.ssid.clear();

    let result = Device::new(
        &config,
        ScriptedEnvironment::healthy(),
        ScriptedAirQuality::healthy(),
        MockLink::connecting(),
        RecordingClient::default(),
        RecordingDelay::default(),
        &clock,
    );
    assert!(matches!(result, Err(MonitorError::Config(ConfigError::EmptySsid))));

    let config = test_config().with_upload_interval(10_000, 0);
    let result = Device::new(
        &config,
        ScriptedEnvironment::healthy(),
        ScriptedAirQuality::healthy(),
        MockLink::connecting(),
        RecordingClient::default(),
        RecordingDelay::default(),
        &clock,
    );
    assert!(matches!(
        result,
        Err(MonitorError::Config(ConfigError::UploadIntervalTooShort { .. }))
    ));
}
