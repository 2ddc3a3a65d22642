use std::collections::HashMap;
use std::time::Duration;

/// Logic level for a digital output pin.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Level {
    Low,
    High,
}

/// Abstraction over the digital outputs driving the laser diodes and the LED
/// strip. Hardware writes are best-effort; there is no error channel.
///
/// `hold` keeps the current output state for the given duration. On a real
/// target it blocks the loop thread, which is the accepted cooperative
/// trade-off for the flicker sequences.
pub trait DigitalOutput {
    fn set_output(&mut self, pin: u8, level: Level);

    fn hold(&mut self, duration: Duration);

    /// Flicker helper: `times` on/off cycles of `on_ms`/`off_ms` holds, with
    /// the final off hold stretched to `3 * off_ms` as the settle gap.
    /// `pulse(pin, 25, 50, 3)` produces the 25/50/25/50/25/150 ms pattern.
    fn pulse(&mut self, pin: u8, on_ms: u64, off_ms: u64, times: u32) {
        for i in 0..times {
            self.set_output(pin, Level::High);
            self.hold(Duration::from_millis(on_ms));
            self.set_output(pin, Level::Low);
            let off = if i + 1 == times { off_ms * 3 } else { off_ms };
            self.hold(Duration::from_millis(off));
        }
    }
}

/// Host-side output driver: logs every transition and really sleeps in
/// `hold`, so the show timing is observable on a development machine.
pub struct ConsoleOutputs {
    levels: HashMap<u8, Level>,
}

impl ConsoleOutputs {
    pub fn new() -> Self {
        ConsoleOutputs {
            levels: HashMap::new(),
        }
    }

    /// Last written level for a pin. Pins never written read back low.
    pub fn level(&self, pin: u8) -> Level {
        self.levels.get(&pin).copied().unwrap_or(Level::Low)
    }
}

impl Default for ConsoleOutputs {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitalOutput for ConsoleOutputs {
    fn set_output(&mut self, pin: u8, level: Level) {
        if self.levels.insert(pin, level) != Some(level) {
            log::info!("pin {} -> {:?}", pin, level);
        }
    }

    fn hold(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
