use std::convert::TryFrom;

use {
    crate::{
        definitions::{cpu, keyboard},
        devices::{Framebuffer, Keyboard},
        memory::Memory,
        opcode::{Instruction, Opcode, Operation, ProgramCounter, ProgramCounterStep},
        resources::Rom,
        rng::{self, RandomByteSource},
        timer::Timers,
        MemoryError, ProcessError, StackError,
    },
    tinyvec::ArrayVec,
};

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet {
    /// name of the loaded rom
    pub(super) name: String,
    /// all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
    /// - `0x050-0x09F` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Memory,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: u16,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: u16,
    /// The stack is only used to store return addresses when subroutines are called. The original
    /// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
    /// `12` levels of nesting; modern implementations usually have more.
    /// (here we are using `16`)
    /// The length of the stack doubles as the stack pointer.
    pub(super) stack: ArrayVec<[u16; cpu::stack::SIZE]>,
    /// Delay and sound timer, both count down at 60 hertz until they reach 0.
    pub(super) timers: Timers,
    /// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
    /// `(64 x 32)`.
    pub(super) display: Framebuffer,
    /// The hex keyboard snapshot, written by the input collaborator before a step.
    pub(super) keyboard: Keyboard,
    /// The keypad as seen by the previous step of a pending `FX0A`, `None` if no
    /// key press is awaited.
    pub(super) key_wait: Option<[bool; keyboard::SIZE]>,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RandomByteSource + Send>,
}

impl Default for ChipSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipSet {
    /// will create a new chipset object, seeded from the operating system
    pub fn new() -> Self {
        Self::with_rng(rng::from_entropy())
    }

    /// will create a new chipset object with a reproducible random source
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(rng::from_seed(seed))
    }

    /// will create a new chipset object using the given random source
    pub fn with_rng<R>(rng: R) -> Self
    where
        R: RandomByteSource + Send + 'static,
    {
        Self {
            name: String::new(),
            opcode: 0,
            memory: Memory::new(),
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: ArrayVec::new(),
            timers: Timers::new(),
            display: Framebuffer::new(),
            keyboard: Keyboard::new(),
            key_wait: None,
            rng: Box::new(rng),
        }
    }

    /// Will replace the random source, the rest of the state is kept.
    pub fn set_rng<R>(&mut self, rng: R)
    where
        R: RandomByteSource + Send + 'static,
    {
        self.rng = Box::new(rng);
    }

    /// Will bring the chip back into its power on state, the random source
    /// is kept.
    pub fn reset(&mut self) {
        self.name.clear();
        self.opcode = 0;
        self.memory.reset();
        self.registers = [0; cpu::register::SIZE];
        self.index_register = 0;
        self.program_counter = cpu::PROGRAM_COUNTER;
        self.stack.clear();
        self.timers.reset();
        self.display.clear();
        self.keyboard.reset();
        self.key_wait = None;
    }

    /// Will reset the chip and write the program into memory.
    ///
    /// If the program is too large the chip is left untouched.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        // check before resetting, so that nothing changes on failure
        let mut memory = Memory::new();
        memory.load_program(program)?;

        self.reset();
        self.memory = memory;
        log::debug!("loaded program of {} bytes", program.len());
        Ok(())
    }

    /// Will reset the chip and load the given rom.
    pub fn load_rom(&mut self, rom: &Rom) -> Result<(), MemoryError> {
        self.load_program(rom.get_data())?;
        self.name = rom.get_name().to_string();
        Ok(())
    }

    /// will get the next opcode from memory
    pub(super) fn fetch_opcode(&self) -> Result<Opcode, ProcessError> {
        // will build the opcode given from the pointer
        Ok(self.memory.fetch(self.program_counter)?)
    }

    /// will advance the program by a single fetch, decode and execute cycle
    ///
    /// On error the chip is left as it was, the program counter stays on the
    /// failing opcode.
    pub fn step(&mut self) -> Result<Operation, ProcessError> {
        let opcode = self.fetch_opcode()?;
        let instruction = Instruction::try_from(opcode)?;
        log::trace!("{:#06X} : {}", self.program_counter, instruction);
        // run the opcode
        let operation = self.calc(instruction)?;
        self.opcode = opcode;
        Ok(operation)
    }

    /// Will execute the given instruction and move the program counter.
    pub(super) fn calc(&mut self, instruction: Instruction) -> Result<Operation, ProcessError> {
        let (step, operation) = self.execute(instruction)?;
        self.advance(step);
        Ok(operation)
    }

    /// Will count both timers down by one, has to be called at 60Hz.
    pub fn tick(&mut self) {
        self.timers.tick();
    }

    /// Will write keyboard data into interncal keyboard representation.
    pub fn set_keyboard(&mut self, keys: &[bool; keyboard::SIZE]) {
        self.keyboard.set_mult(keys);
    }

    /// Will set the value of the given key
    pub fn set_key(&mut self, key: usize, to: bool) {
        debug_assert!(key < keyboard::SIZE);
        self.keyboard.set_key(key, to)
    }

    /// Will toggle the given key
    pub fn toggle_key(&mut self, key: usize) {
        self.keyboard.toggle_key(key)
    }

    /// Will get the current state of the keyboard
    pub fn get_keyboard(&self) -> &[bool; keyboard::SIZE] {
        self.keyboard.get_keys()
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.timers.sound.get_value()
    }

    /// A tone shall be played as long as this is true.
    pub fn is_sound_active(&self) -> bool {
        self.timers.sound.is_active()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.timers.delay.get_value()
    }

    /// Will return a immutable reference to the current display configuration
    pub fn get_display(&self) -> &Framebuffer {
        &self.display
    }

    /// Will return the raw memory
    pub fn get_memory(&self) -> &[u8] {
        self.memory.as_slice()
    }

    pub fn get_registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn get_index_register(&self) -> u16 {
        self.index_register
    }

    pub fn get_program_counter(&self) -> u16 {
        self.program_counter
    }

    /// The amount of return addresses currently on the stack.
    pub fn get_stack_pointer(&self) -> usize {
        self.stack.len()
    }

    /// The last fetched opcode
    pub fn get_opcode(&self) -> Opcode {
        self.opcode
    }

    /// The name of the loaded rom, empty if the program was loaded from raw bytes.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Will push the current pointer to the stack
    pub(super) fn push_stack(&mut self, pointer: u16) -> Result<(), StackError> {
        if self.stack.len() == cpu::stack::SIZE {
            Err(StackError::Full)
        } else {
            log::debug!("push {:#06X} at depth {}", pointer, self.stack.len());
            self.stack.push(pointer);
            Ok(())
        }
    }

    /// Will pop from the stack
    pub(super) fn pop_stack(&mut self) -> Result<u16, StackError> {
        let pointer = self.stack.pop().ok_or(StackError::Empty)?;
        log::debug!("pop {:#06X} at depth {}", pointer, self.stack.len());
        Ok(pointer)
    }
}

impl ProgramCounter for ChipSet {
    fn advance(&mut self, step: ProgramCounterStep) {
        self.program_counter = step.apply(self.program_counter);
    }
}
