//! Linux sysfs GPIO backend.
//!
//! Drives lines through `/sys/class/gpio`: a line is exported by writing its
//! number to `export`, configured through `gpioN/direction`, and sampled or
//! driven through `gpioN/value`. The root directory is a parameter so the
//! backend can run against a scratch directory in tests.
//!
//! Outputs are configured by writing `low` to `direction`, which switches the
//! line to output and drives it LOW in one step. The lock therefore never
//! glitches open while the pin is being set up.
//!
//! The sysfs interface cannot enable pull-ups. The trigger line needs an
//! external pull-up resistor or a device-tree overlay that sets the bias.

use std::path::{Path, PathBuf};

use facegate_core::PinNumber;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{HardwareError, Result};
use crate::traits::{InputPin, OutputPin};
use crate::types::{Direction, Level, PinInfo};

/// Default sysfs GPIO root.
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

#[derive(Debug)]
struct SysfsLine {
    pin: PinNumber,
    dir: PathBuf,
}

impl SysfsLine {
    async fn open(root: &Path, pin: PinNumber, direction: Direction) -> Result<Self> {
        let dir = root.join(format!("gpio{}", pin.as_u8()));

        if !fs::try_exists(&dir).await? {
            debug!(%pin, "Exporting GPIO line");
            fs::write(root.join("export"), pin.as_u8().to_string()).await?;

            if !fs::try_exists(&dir).await? {
                return Err(HardwareError::initialization_failed(format!(
                    "{pin} not present under {} after export",
                    root.display()
                )));
            }
        }

        let setting = match direction {
            Direction::Input => "in",
            Direction::Output => "low",
        };
        fs::write(dir.join("direction"), setting).await?;

        info!(%pin, direction = direction.as_sysfs(), "GPIO line ready");
        Ok(Self { pin, dir })
    }

    async fn read(&self) -> Result<Level> {
        let raw = fs::read_to_string(self.dir.join("value")).await?;
        match raw.trim() {
            "0" => Ok(Level::Low),
            "1" => Ok(Level::High),
            other => Err(HardwareError::invalid_value(format!(
                "{}: expected 0 or 1, got {other:?}",
                self.pin
            ))),
        }
    }

    async fn write(&self, level: Level) -> Result<()> {
        fs::write(self.dir.join("value"), level.as_sysfs()).await?;
        Ok(())
    }
}

/// Input line backed by sysfs.
#[derive(Debug)]
pub struct SysfsInputPin {
    line: SysfsLine,
}

impl SysfsInputPin {
    /// Export `pin` under [`SYSFS_GPIO_ROOT`] and configure it as input.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be exported or configured.
    pub async fn open(pin: PinNumber) -> Result<Self> {
        Self::open_at(SYSFS_GPIO_ROOT, pin).await
    }

    /// Same as [`open`](Self::open) against an arbitrary sysfs root.
    pub async fn open_at(root: impl AsRef<Path>, pin: PinNumber) -> Result<Self> {
        let line = SysfsLine::open(root.as_ref(), pin, Direction::Input).await?;
        Ok(Self { line })
    }
}

impl InputPin for SysfsInputPin {
    async fn read(&mut self) -> Result<Level> {
        self.line.read().await
    }

    fn info(&self) -> PinInfo {
        PinInfo::new(self.line.pin, Direction::Input, "sysfs")
    }
}

/// Output line backed by sysfs. Starts LOW.
#[derive(Debug)]
pub struct SysfsOutputPin {
    line: SysfsLine,
    level: Level,
}

impl SysfsOutputPin {
    /// Export `pin` under [`SYSFS_GPIO_ROOT`] and configure it as output, LOW.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be exported or configured.
    pub async fn open(pin: PinNumber) -> Result<Self> {
        Self::open_at(SYSFS_GPIO_ROOT, pin).await
    }

    /// Same as [`open`](Self::open) against an arbitrary sysfs root.
    pub async fn open_at(root: impl AsRef<Path>, pin: PinNumber) -> Result<Self> {
        let line = SysfsLine::open(root.as_ref(), pin, Direction::Output).await?;
        Ok(Self {
            line,
            level: Level::Low,
        })
    }
}

impl OutputPin for SysfsOutputPin {
    async fn write(&mut self, level: Level) -> Result<()> {
        self.line.write(level).await?;
        self.level = level;
        Ok(())
    }

    fn level(&self) -> Level {
        self.level
    }

    fn info(&self) -> PinInfo {
        PinInfo::new(self.line.pin, Direction::Output, "sysfs")
    }
}
