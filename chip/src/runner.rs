use std::time::Duration;

use crate::{
    chip8::ChipSet,
    definitions::{cpu, timer},
    devices::{AudioCommands, DisplayCommands, KeyboardCommands},
    opcode::Operation,
    ProcessError,
};

/// The clock configuration of a [`Runner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Instructions executed per second
    pub cpu_hertz: u64,
    /// Timer decrements per second, also the amount of frames per second
    pub timer_hertz: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cpu_hertz: cpu::HERTZ,
            timer_hertz: timer::HERTZ,
        }
    }
}

impl Config {
    pub fn new(cpu_hertz: u64, timer_hertz: u64) -> Self {
        Self {
            cpu_hertz,
            timer_hertz,
        }
    }

    /// The amount of instructions run between two timer ticks, at least one.
    ///
    /// # Example
    /// ```rust
    /// # use chip::Config;
    /// assert_eq!(Config::new(600, 60).steps_per_tick(), 10);
    /// assert_eq!(Config::new(30, 60).steps_per_tick(), 1);
    /// ```
    pub fn steps_per_tick(&self) -> u64 {
        (self.cpu_hertz / self.timer_hertz.max(1)).max(1)
    }

    /// The time a single frame is supposed to take.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.timer_hertz.max(1))
    }
}

/// Drives a [`ChipSet`] frame by frame and connects it to the collaborators.
///
/// The caller owns the clock, it only has to call [`Runner::frame`] once every
/// [`Config::frame_interval`].
pub struct Runner<D, K, A>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    A: AudioCommands,
{
    chip: ChipSet,
    config: Config,
    display: D,
    keyboard: K,
    audio: A,
    tone: bool,
}

impl<D, K, A> Runner<D, K, A>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    A: AudioCommands,
{
    pub fn new(chip: ChipSet, config: Config, display: D, keyboard: K, audio: A) -> Self {
        Self {
            chip,
            config,
            display,
            keyboard,
            audio,
            tone: false,
        }
    }

    /// Will run a single frame.
    ///
    /// The keyboard is read once, then up to [`Config::steps_per_tick`] instructions are
    /// executed. Waiting for a key ends the frame early. Afterwards the timers tick once,
    /// the display is refreshed if anything was drawn and the tone is switched if the
    /// sound timer changed its state.
    pub fn frame(&mut self) -> Result<(), ProcessError> {
        let keys = self.keyboard.get_keyboard();
        self.chip.set_keyboard(&keys);

        let mut redraw = false;
        for _ in 0..self.config.steps_per_tick() {
            match self.chip.step() {
                Ok(Operation::Draw) => redraw = true,
                Ok(Operation::Wait) => break,
                Ok(Operation::None) => {}
                Err(err) => {
                    log::warn!(
                        "Execution stopped at {:#06X} with {}",
                        self.chip.get_program_counter(),
                        err
                    );
                    return Err(err);
                }
            }
        }

        self.chip.tick();

        if redraw {
            self.display.display(self.chip.get_display());
        }

        let tone = self.chip.is_sound_active();
        if tone != self.tone {
            log::debug!("tone {}", if tone { "on" } else { "off" });
            self.audio.set_tone(tone);
            self.tone = tone;
        }
        Ok(())
    }

    pub fn chip(&self) -> &ChipSet {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut ChipSet {
        &mut self.chip
    }

    pub fn config(&self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        definitions::keyboard,
        devices::{MockAudioCommands, MockDisplayCommands, MockKeyboardCommands},
        StackError,
    };
    use mockall::predicate::*;

    fn setup_keyboard(keys: [bool; keyboard::SIZE]) -> MockKeyboardCommands {
        let mut keyboard = MockKeyboardCommands::new();
        keyboard.expect_get_keyboard().return_const(keys);
        keyboard
    }

    fn setup_chip(program: &[u8]) -> ChipSet {
        let mut chip = ChipSet::with_seed(0);
        chip.load_program(program).unwrap();
        chip
    }

    #[test]
    fn test_config() {
        let config = Config::default();
        assert_eq!(config.cpu_hertz, 500);
        assert_eq!(config.timer_hertz, 60);
        assert_eq!(config.steps_per_tick(), 8);
        assert_eq!(config.frame_interval(), Duration::from_micros(16_666));
        assert_eq!(Config::new(500, 0).steps_per_tick(), 500);
    }

    #[test]
    fn test_frame_draws_once() {
        // `CLS` followed by an endless jump onto itself
        let chip = setup_chip(&[0x00, 0xE0, 0x12, 0x02]);

        let mut display = MockDisplayCommands::new();
        display
            .expect_display()
            .withf(|pixels| pixels.lit() == 0)
            .times(1)
            .return_const(());
        let mut audio = MockAudioCommands::new();
        audio.expect_set_tone().never();

        let mut runner = Runner::new(
            chip,
            Config::new(600, 60),
            display,
            setup_keyboard([false; keyboard::SIZE]),
            audio,
        );

        assert_eq!(runner.frame(), Ok(()));
        assert_eq!(runner.chip().get_program_counter(), 0x202);
    }

    #[test]
    fn test_frame_without_draw() {
        let chip = setup_chip(&[0x12, 0x00]);

        let mut display = MockDisplayCommands::new();
        display.expect_display().never();
        let mut audio = MockAudioCommands::new();
        audio.expect_set_tone().never();

        let mut runner = Runner::new(
            chip,
            Config::default(),
            display,
            setup_keyboard([false; keyboard::SIZE]),
            audio,
        );

        for _ in 0..3 {
            assert_eq!(runner.frame(), Ok(()));
        }
    }

    #[test]
    fn test_frame_waits_for_key() {
        // `LD V1, K`, `JP 0x202`
        let chip = setup_chip(&[0xF1, 0x0A, 0x12, 0x02]);

        let mut keys = [false; keyboard::SIZE];
        keys[0x7] = true;

        let mut keyboard = MockKeyboardCommands::new();
        let mut seq = mockall::Sequence::new();
        keyboard
            .expect_get_keyboard()
            .times(1)
            .in_sequence(&mut seq)
            .return_const([false; keyboard::SIZE]);
        keyboard
            .expect_get_keyboard()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(keys);

        let mut display = MockDisplayCommands::new();
        display.expect_display().never();
        let mut audio = MockAudioCommands::new();
        audio.expect_set_tone().never();

        let mut runner = Runner::new(chip, Config::default(), display, keyboard, audio);

        assert_eq!(runner.frame(), Ok(()));
        assert_eq!(runner.chip().get_program_counter(), 0x200);

        assert_eq!(runner.frame(), Ok(()));
        assert_eq!(runner.chip().get_registers()[0x1], 0x7);
        assert_eq!(runner.chip().get_program_counter(), 0x202);
    }

    #[test]
    fn test_frame_switches_tone() {
        // `LD V0, 0x02`, `LD ST, V0`, `JP 0x204`
        let chip = setup_chip(&[0x60, 0x02, 0xF0, 0x18, 0x12, 0x04]);

        let mut display = MockDisplayCommands::new();
        display.expect_display().never();

        let mut audio = MockAudioCommands::new();
        let mut seq = mockall::Sequence::new();
        audio
            .expect_set_tone()
            .with(eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        audio
            .expect_set_tone()
            .with(eq(false))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let mut runner = Runner::new(
            chip,
            Config::default(),
            display,
            setup_keyboard([false; keyboard::SIZE]),
            audio,
        );

        // sound timer goes 2 -> 1 during the first frame
        assert_eq!(runner.frame(), Ok(()));
        assert_eq!(runner.chip().get_sound_timer(), 1);
        // 1 -> 0
        assert_eq!(runner.frame(), Ok(()));
        // stays off
        assert_eq!(runner.frame(), Ok(()));
    }

    #[test]
    fn test_frame_reports_error() {
        let chip = setup_chip(&[0x00, 0xEE]);

        let mut display = MockDisplayCommands::new();
        display.expect_display().never();
        let mut audio = MockAudioCommands::new();
        audio.expect_set_tone().never();

        let mut runner = Runner::new(
            chip,
            Config::default(),
            display,
            setup_keyboard([false; keyboard::SIZE]),
            audio,
        );

        assert_eq!(
            runner.frame(),
            Err(ProcessError::Stack(StackError::Empty))
        );
        assert_eq!(runner.chip().get_program_counter(), 0x200);

        runner.chip_mut().load_program(&[0x12, 0x00]).unwrap();
        assert_eq!(runner.frame(), Ok(()));
        assert_eq!(runner.config(), Config::default());
    }
}
