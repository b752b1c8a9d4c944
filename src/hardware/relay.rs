use anyhow::Result;

use super::{Actuator, GpioLine};

/// A relay-switched light on one GPIO line.
pub struct Relay {
    line: Box<dyn GpioLine>,
    /// Line level that switches the light on.
    on_level: bool,
    on: bool,
}

impl Relay {
    /// The light is assumed off until the first command; the daemon forces it
    /// off right after opening.
    pub fn new(line: Box<dyn GpioLine>, on_level: bool) -> Self {
        Self {
            line,
            on_level,
            on: false,
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "{} (active {})",
            self.line.describe(),
            if self.on_level { "high" } else { "low" }
        )
    }
}

impl Actuator for Relay {
    fn on(&mut self) -> Result<()> {
        self.line.set_level(self.on_level)?;
        self.on = true;
        Ok(())
    }

    fn off(&mut self) -> Result<()> {
        self.line.set_level(!self.on_level)?;
        self.on = false;
        Ok(())
    }

    fn toggle(&mut self) -> Result<()> {
        if self.on { self.off() } else { self.on() }
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Line that remembers every level written to it.
    struct ScopeLine(Arc<Mutex<Vec<bool>>>);

    impl GpioLine for ScopeLine {
        fn set_level(&mut self, high: bool) -> Result<()> {
            self.0.lock().unwrap().push(high);
            Ok(())
        }

        fn level(&mut self) -> Result<bool> {
            Ok(self.0.lock().unwrap().last().copied().unwrap_or(false))
        }

        fn describe(&self) -> String {
            "scope".to_string()
        }
    }

    #[test]
    fn test_active_high_relay() {
        let levels = Arc::new(Mutex::new(Vec::new()));
        let mut relay = Relay::new(Box::new(ScopeLine(levels.clone())), true);

        relay.on().unwrap();
        relay.off().unwrap();
        assert_eq!(*levels.lock().unwrap(), vec![true, false]);
        assert!(!relay.is_on());
    }

    #[test]
    fn test_active_low_relay_inverts_levels() {
        let levels = Arc::new(Mutex::new(Vec::new()));
        let mut relay = Relay::new(Box::new(ScopeLine(levels.clone())), false);

        relay.on().unwrap();
        assert!(relay.is_on());
        relay.toggle().unwrap();
        assert!(!relay.is_on());
        relay.toggle().unwrap();
        assert_eq!(*levels.lock().unwrap(), vec![false, true, false]);
        assert_eq!(relay.describe(), "scope (active low)");
    }
}
