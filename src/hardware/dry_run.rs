use anyhow::Result;

use super::GpioLine;

/// A line that only logs. Inputs read low forever.
pub struct DryRunLine {
    pin: u32,
    level: bool,
}

impl DryRunLine {
    pub fn new(pin: u32) -> Self {
        Self { pin, level: false }
    }
}

impl GpioLine for DryRunLine {
    fn set_level(&mut self, high: bool) -> Result<()> {
        if high != self.level {
            log_debug!("GPIO {} -> {}", self.pin, if high { "high" } else { "low" });
        }
        self.level = high;
        Ok(())
    }

    fn level(&mut self) -> Result<bool> {
        Ok(self.level)
    }

    fn describe(&self) -> String {
        format!("dry-run GPIO {}", self.pin)
    }
}
