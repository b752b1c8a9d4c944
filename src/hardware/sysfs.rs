//! Linux sysfs GPIO (`/sys/class/gpio`).
//!
//! A line is exported on open and unexported again on drop if we were the
//! ones who exported it.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use super::GpioLine;

// udev may need a moment to fix permissions of a freshly exported line
const EXPORT_SETTLE_ATTEMPTS: u32 = 20;
const EXPORT_SETTLE_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

pub struct SysfsGpio {
    root: PathBuf,
    pin: u32,
    value_path: PathBuf,
    exported_by_us: bool,
}

impl SysfsGpio {
    /// Export `pin` under `root` (normally `/sys/class/gpio`) and set its
    /// direction.
    pub fn open(root: &Path, pin: u32, direction: Direction) -> Result<Self> {
        let line_dir = root.join(format!("gpio{pin}"));
        let mut exported_by_us = false;

        if !line_dir.exists() {
            fs::write(root.join("export"), pin.to_string())
                .with_context(|| format!("Failed to export GPIO {pin}"))?;
            exported_by_us = true;
            wait_for_line(&line_dir);
        }

        fs::write(line_dir.join("direction"), direction.as_str())
            .with_context(|| format!("Failed to set GPIO {pin} direction"))?;

        log_debug!("GPIO {pin} opened as {}", direction.as_str());

        Ok(Self {
            root: root.to_path_buf(),
            pin,
            value_path: line_dir.join("value"),
            exported_by_us,
        })
    }
}

fn wait_for_line(line_dir: &Path) {
    let direction = line_dir.join("direction");
    for _ in 0..EXPORT_SETTLE_ATTEMPTS {
        if direction.exists() {
            return;
        }
        thread::sleep(EXPORT_SETTLE_INTERVAL);
    }
}

impl GpioLine for SysfsGpio {
    fn set_level(&mut self, high: bool) -> Result<()> {
        fs::write(&self.value_path, if high { "1" } else { "0" })
            .with_context(|| format!("Failed to write GPIO {}", self.pin))
    }

    fn level(&mut self) -> Result<bool> {
        let raw = fs::read_to_string(&self.value_path)
            .with_context(|| format!("Failed to read GPIO {}", self.pin))?;
        Ok(raw.trim() == "1")
    }

    fn describe(&self) -> String {
        format!("sysfs GPIO {}", self.pin)
    }
}

impl Drop for SysfsGpio {
    fn drop(&mut self) {
        if self.exported_by_us {
            let _ = fs::write(self.root.join("unexport"), self.pin.to_string());
        }
    }
}
