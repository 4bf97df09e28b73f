//! # facegate
//!
//! Door unit entry point. Wires the access controller to its backends and
//! runs the access loop until Ctrl-C.
//!
//! ## Usage
//!
//! ```bash
//! # On the door unit: sysfs GPIO, host network, HTTP recognition service
//! facegate
//!
//! # Anywhere: mock pins and link; press Enter to pull the trigger
//! facegate --simulate
//!
//! # Exercise the lock without a recognition service
//! facegate --simulate --service grant
//! ```
//!
//! Log level comes from `RUST_LOG` (default `info`).

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use facegate_controller::AccessController;
use facegate_core::{ConnectivityState, DeviceConfig, PinNumber};
use facegate_hardware::PeripheralInterface;
use facegate_hardware::camera::PlaceholderCamera;
use facegate_hardware::devices::{AnyImageProvider, AnyInputPin, AnyOutputPin};
use facegate_hardware::mock::{MockInputHandle, MockInputPin, MockOutputPin, PinRecorder};
use facegate_hardware::sysfs::{SysfsInputPin, SysfsOutputPin};
use facegate_hardware::types::Level;
use facegate_network::mock::{MockLink, MockReply, MockTransport};
use facegate_network::{
    AnyLink, AnyTransport, ConnectivityManager, HostLink, RecognitionClient, ReqwestTransport,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// How long a simulated press holds the trigger.
const SIMULATED_PRESS: Duration = Duration::from_millis(200);

type Controller =
    AccessController<AnyInputPin, AnyOutputPin, AnyImageProvider, AnyLink, AnyTransport>;

/// Recognition backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ServiceMode {
    /// The configured HTTP recognition service.
    Http,
    /// Built-in stand-in that recognizes everyone.
    Grant,
    /// Built-in stand-in that recognizes no one.
    Deny,
}

/// Face-recognition door lock controller
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Use mock pins and network instead of GPIO; Enter pulls the trigger
    #[arg(long)]
    simulate: bool,

    /// Recognition backend
    #[arg(long, value_enum, default_value_t = ServiceMode::Http)]
    service: ServiceMode,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

const STAND_IN_HEALTH: &str = r#"{"status": "online", "known_faces": 0}"#;

/// Transport for `mode`. Stand-in services also hand back a clone of their
/// script so the health reply can be queued right before the probe.
fn build_transport(mode: ServiceMode) -> (AnyTransport, Option<MockTransport>) {
    let verdict = match mode {
        ServiceMode::Http => return (AnyTransport::Reqwest(ReqwestTransport::new()), None),
        ServiceMode::Grant => r#"{"success": true, "name": "simulated", "confidence": 1.0}"#,
        ServiceMode::Deny => r#"{"success": false, "message": "Face not recognized"}"#,
    };
    let transport = MockTransport::always(MockReply::ok(verdict));
    (AnyTransport::Mock(transport.clone()), Some(transport))
}

async fn build_hardware(
    config: &DeviceConfig,
) -> anyhow::Result<(PeripheralInterface<AnyInputPin, AnyOutputPin>, AnyLink)> {
    let pins = &config.pins;
    let output = |pin: PinNumber| async move {
        SysfsOutputPin::open(pin)
            .await
            .map(AnyOutputPin::Sysfs)
            .with_context(|| format!("Failed to open {pin} as output"))
    };

    let trigger = SysfsInputPin::open(pins.trigger)
        .await
        .with_context(|| format!("Failed to open trigger {}", pins.trigger))?;
    let peripherals = PeripheralInterface::new(
        AnyInputPin::Sysfs(trigger),
        output(pins.lock).await?,
        output(pins.success_led).await?,
        output(pins.failure_led).await?,
        config.timing.debounce,
    );

    let link = HostLink::new(&config.network.interface, &config.service.recognize_url)
        .context("Failed to set up host link")?;
    Ok((peripherals, AnyLink::Host(link)))
}

fn build_simulated(
    config: &DeviceConfig,
) -> (
    PeripheralInterface<AnyInputPin, AnyOutputPin>,
    AnyLink,
    MockInputHandle,
) {
    let pins = &config.pins;
    let recorder = PinRecorder::new();
    let output = |pin| AnyOutputPin::Mock(MockOutputPin::new(pin, &recorder));

    let (trigger, handle) = MockInputPin::new(pins.trigger, Level::High);
    let peripherals = PeripheralInterface::new(
        AnyInputPin::Mock(trigger),
        output(pins.lock),
        output(pins.success_led),
        output(pins.failure_led),
        config.timing.debounce,
    );
    (peripherals, AnyLink::Mock(MockLink::up_after(2)), handle)
}

/// Each line on stdin is one short press.
async fn drive_trigger_from_stdin(trigger: MockInputHandle) {
    println!("Simulation: press Enter to pull the trigger, Ctrl-C to quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(_)) = lines.next_line().await {
        trigger.set_level(Level::Low);
        tokio::time::sleep(SIMULATED_PRESS).await;
        trigger.set_level(Level::High);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = DeviceConfig::default();
    config.validate().context("Invalid device configuration")?;

    info!(
        version = facegate_core::VERSION,
        simulate = args.simulate,
        service = ?args.service,
        url = %config.service.recognize_url,
        "facegate starting"
    );

    let (peripherals, link) = if args.simulate {
        let (peripherals, link, trigger) = build_simulated(&config);
        tokio::spawn(drive_trigger_from_stdin(trigger));
        (peripherals, link)
    } else {
        build_hardware(&config).await?
    };

    let network = ConnectivityManager::new(link, &config.network);
    let (transport, stand_in) = build_transport(args.service);
    let client = RecognitionClient::new(transport, &config.service);
    let camera = AnyImageProvider::Placeholder(PlaceholderCamera::new());
    let mut controller: Controller =
        AccessController::new(peripherals, camera, network, client, &config);

    if controller.initialize().await == ConnectivityState::Connected {
        if let Some(stand_in) = &stand_in {
            stand_in.push(MockReply::ok(STAND_IN_HEALTH));
        }
        match controller.client().health(controller.network()).await {
            Ok(health) if health.is_online() => {
                info!(known_faces = health.known_faces, "Recognition service online");
            }
            Ok(health) => warn!(status = %health.status, "Recognition service not ready"),
            Err(e) => warn!(error = %e, "Recognition service health check failed"),
        }
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested; finishing current cycle");
        }
        shutdown_tx.send_replace(true);
    });

    let cycles = controller.run_until(shutdown_rx).await;
    info!(cycles, "facegate stopped");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?
        .block_on(run(args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use facegate_core::ImagePayload;

    fn client(mode: ServiceMode) -> (RecognitionClient<AnyTransport>, Option<MockTransport>) {
        let (transport, stand_in) = build_transport(mode);
        (
            RecognitionClient::new(transport, &DeviceConfig::default().service),
            stand_in,
        )
    }

    #[tokio::test]
    async fn test_grant_stand_in_without_health_probe() {
        let (client, _) = client(ServiceMode::Grant);

        let result = client
            .recognize(&ConnectivityState::Connected, &ImagePayload::empty())
            .await
            .unwrap();

        assert!(result.authenticated);
        assert_eq!(result.subject(), "simulated");
    }

    #[tokio::test]
    async fn test_grant_stand_in_after_health_probe() {
        let (client, stand_in) = client(ServiceMode::Grant);
        stand_in.unwrap().push(MockReply::ok(STAND_IN_HEALTH));

        let health = client.health(&ConnectivityState::Connected).await.unwrap();
        assert!(health.is_online());

        let result = client
            .recognize(&ConnectivityState::Connected, &ImagePayload::empty())
            .await
            .unwrap();
        assert!(result.authenticated);
    }

    #[tokio::test]
    async fn test_deny_stand_in() {
        let (client, _) = client(ServiceMode::Deny);

        let result = client
            .recognize(&ConnectivityState::Connected, &ImagePayload::empty())
            .await
            .unwrap();

        assert!(!result.authenticated);
    }

    #[test]
    fn test_http_mode_has_no_stand_in() {
        let (transport, stand_in) = build_transport(ServiceMode::Http);
        assert!(matches!(transport, AnyTransport::Reqwest(_)));
        assert!(stand_in.is_none());
    }
}
