mod display;

use anyhow::{Context, Result};
use display::{ConsoleDisplay, StdinPrompt};
use incline_config::AppConfig;
use incline_link::serial::SerialChannel;
use incline_link::Session;
use incline_telemetry::convert::{apply_correction, to_physical};
use incline_telemetry::{
    obtain_profile, InclinationFilter, TelemetryLink, TelemetrySink, TomlProfileStore,
};
use tracing::{info, warn};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "incline_app=info,incline_telemetry=info,incline_link=info".into()
            }),
        )
        .init();

    info!("Inclination monitor starting");

    let config = incline_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // The channel owns the port for the whole session and releases it on any
    // exit path; Session::open observes the board's settling delay.
    let channel = SerialChannel::open(&config.port_name, config.baud_rate)
        .with_context(|| format!("opening serial port {}", config.port_name))?;
    let mut link = TelemetryLink::new(Session::open(channel));

    let status = link.read_status()?;
    info!(
        adxl = status.adxl_online,
        mpu = status.mpu_online,
        "Sensor handshake"
    );

    if !status.any_online() {
        warn!("Both sensors are offline, nothing to measure");
        return Ok(());
    }

    let store = TomlProfileStore::new(incline_config::calibration_path()?);
    let mut prompt = StdinPrompt;
    let profile = obtain_profile(
        config.calibration.run,
        config.calibration.sample_count,
        &mut link,
        &mut prompt,
        &store,
    )?;

    // The board does not start streaming until it knows the interval.
    link.send_sample_interval(config.sample_interval_ms)?;

    let interval_s = f64::from(config.sample_interval_ms) / 1000.0;
    let mut filter = InclinationFilter::new(config.time_constant_s, interval_s);
    info!(alpha = filter.alpha(), interval_s, "Fusion filter ready");

    let mut sink = ConsoleDisplay;
    sink.on_profile(&profile);

    loop {
        let raw = link.read_measurement()?;
        let sample = apply_correction(&to_physical(&raw), &profile);
        let inclination = filter.update(&sample);
        sink.on_sample(status, &sample, inclination);
    }
}
