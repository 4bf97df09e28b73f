//! Peripheral interface driving sysfs GPIO lines in a scratch directory.

use std::path::Path;
use std::time::Duration;

use facegate_core::{Indicator, LockState, PinConfig};
use facegate_hardware::PeripheralInterface;
use facegate_hardware::sysfs::{SysfsInputPin, SysfsOutputPin};
use tempfile::TempDir;

/// Pre-create `gpioN/` for every pin, as the kernel would after export.
fn fake_gpio_root(pins: &PinConfig) -> TempDir {
    let root = TempDir::new().unwrap();
    for pin in [pins.trigger, pins.lock, pins.success_led, pins.failure_led] {
        let dir = root.path().join(format!("gpio{}", pin.as_u8()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("value"), "1").unwrap();
    }
    root
}

fn read(root: &Path, pin: u8, file: &str) -> String {
    std::fs::read_to_string(root.join(format!("gpio{pin}")).join(file))
        .unwrap()
        .trim()
        .to_string()
}

async fn open(
    root: &Path,
    pins: &PinConfig,
) -> PeripheralInterface<SysfsInputPin, SysfsOutputPin> {
    PeripheralInterface::new(
        SysfsInputPin::open_at(root, pins.trigger).await.unwrap(),
        SysfsOutputPin::open_at(root, pins.lock).await.unwrap(),
        SysfsOutputPin::open_at(root, pins.success_led).await.unwrap(),
        SysfsOutputPin::open_at(root, pins.failure_led).await.unwrap(),
        Duration::from_millis(50),
    )
}

#[tokio::test]
async fn lines_are_configured_on_open() {
    let pins = PinConfig::default();
    let root = fake_gpio_root(&pins);

    let _io = open(root.path(), &pins).await;

    assert_eq!(read(root.path(), pins.trigger.as_u8(), "direction"), "in");
    assert_eq!(read(root.path(), pins.lock.as_u8(), "direction"), "low");
    assert_eq!(read(root.path(), pins.success_led.as_u8(), "direction"), "low");
}

#[tokio::test]
async fn lock_and_indicators_reach_value_files() {
    let pins = PinConfig::default();
    let root = fake_gpio_root(&pins);
    let mut io = open(root.path(), &pins).await;

    io.safe_state().await;
    assert_eq!(read(root.path(), pins.lock.as_u8(), "value"), "0");
    assert_eq!(read(root.path(), pins.failure_led.as_u8(), "value"), "0");

    io.set_lock(LockState::Unlocked).await;
    io.set_indicator(Indicator::Success, true).await;

    assert_eq!(read(root.path(), pins.lock.as_u8(), "value"), "1");
    assert_eq!(read(root.path(), pins.success_led.as_u8(), "value"), "1");
    assert_eq!(io.lock_state(), LockState::Unlocked);
}

#[tokio::test]
async fn trigger_is_active_low() {
    let pins = PinConfig::default();
    let root = fake_gpio_root(&pins);
    let mut io = open(root.path(), &pins).await;
    let value = root
        .path()
        .join(format!("gpio{}", pins.trigger.as_u8()))
        .join("value");

    // Pulled up: released.
    assert!(!io.read_trigger().await);

    std::fs::write(&value, "0").unwrap();
    assert!(io.read_trigger().await);
}

#[tokio::test]
async fn unreadable_trigger_counts_as_released() {
    let pins = PinConfig::default();
    let root = fake_gpio_root(&pins);
    let mut io = open(root.path(), &pins).await;
    std::fs::write(
        root.path()
            .join(format!("gpio{}", pins.trigger.as_u8()))
            .join("value"),
        "garbage",
    )
    .unwrap();

    assert!(!io.trigger_asserted().await);
}
