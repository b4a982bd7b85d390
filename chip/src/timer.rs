/// Represents a timer inside of the chip
/// infrastruture, it will count down to
/// zero from what ever number given, once per
/// tick. The driving loop is responsible to tick
/// at 60Hz.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    value: u8,
}

impl Timer {
    /// Will create a new timer with the given value.
    pub fn new(value: u8) -> Self {
        Self { value }
    }

    /// Will set the value from which the timer shall count down from.
    pub fn set_value(&mut self, value: u8) {
        self.value = value;
    }

    /// Will get the value that the counter is currently at.
    pub fn get_value(&self) -> u8 {
        self.value
    }

    /// Will count down by one, zero stays zero.
    pub fn tick(&mut self) {
        self.value = self.value.saturating_sub(1);
    }

    /// A timer is active as long as it has not reached zero.
    pub fn is_active(&self) -> bool {
        self.value > 0
    }
}

/// Holds both timers of the chip.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timers {
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    pub delay: Timer,
    /// Sound timer: This timer is used for sound effects. When its value is nonzero, a beeping
    /// sound is made.
    pub sound: Timer,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decrements both timers, this is the only place where timers count down.
    pub fn tick(&mut self) {
        self.delay.tick();
        self.sound.tick();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
