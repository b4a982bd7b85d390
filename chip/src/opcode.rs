//! Opcode abstractions, functionality and constants.
use std::{convert::TryFrom, fmt};

use crate::{definitions::memory, OpcodeError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a nibble
const NIBBLE: u16 = 4;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// # use chip::OpcodeError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # let err = OpcodeError::MemoryInvalid {pointer, len: SPLIT_OPCODE.len() };
/// # assert_eq!(Err(err), build_opcode(&SPLIT_OPCODE, pointer));
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    // controlling that there is no illegal access here
    if pointer + 1 < data.len() {
        Ok(Opcode::from_be_bytes([data[pointer], data[pointer + 1]]))
    } else {
        Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        })
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// The operation family, the highest nibble `T___`
    fn t(&self) -> u8;

    /// The address of the opcode type `TNNN`
    fn nnn(&self) -> u16;

    /// The register index `X` of the opcode type `TX__`
    fn x(&self) -> usize;

    /// The register index `Y` of the opcode type `T_Y_`
    fn y(&self) -> usize;

    /// The sub opcode `N` of the opcode type `T__N`
    fn n(&self) -> u8;

    /// The constant `KK` of the opcode type `T_KK`
    fn kk(&self) -> u8;

    /// this is an opcode extractor for the opcode type `TXKK`
    /// - `X` is a register index
    /// - `KK` is a constant
    fn xkk(&self) -> (usize, u8) {
        (self.x(), self.kk())
    }

    /// this is an opcode extractor for the opcode type `TXYT`
    /// - `X` is a register index
    /// - `Y` is a register index
    fn xy(&self) -> (usize, usize) {
        (self.x(), self.y())
    }

    /// this is an opcode extractor for the opcode type `TXYN`
    /// - `X` is a register index
    /// - `Y` is a register index
    /// - `N` is a opcode subtype or a constant
    fn xyn(&self) -> (usize, usize, u8) {
        (self.x(), self.y(), self.n())
    }
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> u8 {
        ((self & OPCODE_MASK_F000) >> (3 * NIBBLE)) as u8
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> u16 {
        self & OPCODE_MASK_0FFF
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> (2 * NIBBLE)) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.y(), 0xD);
    /// ```
    fn y(&self) -> usize {
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        ((self & MASK) >> NIBBLE) as usize
    }

    fn n(&self) -> u8 {
        (self & OPCODE_MASK_000F) as u8
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xkk(), (0xE, 0xDA));
    /// ```
    fn kk(&self) -> u8 {
        (self & OPCODE_MASK_00FF) as u8
    }
}

/// A single decoded instruction.
///
/// `x` and `y` are register indices, `kk` an immediate byte, `nnn` an address and
/// `n` the sprite height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0` - `CLS`
    Clear,
    /// `00EE` - `RET`
    Return,
    /// `1NNN` - `JP nnn`
    Jump { nnn: u16 },
    /// `2NNN` - `CALL nnn`
    Call { nnn: u16 },
    /// `3XKK` - `SE Vx, kk`
    SkipEqualByte { x: usize, kk: u8 },
    /// `4XKK` - `SNE Vx, kk`
    SkipNotEqualByte { x: usize, kk: u8 },
    /// `5XY0` - `SE Vx, Vy`
    SkipEqualRegister { x: usize, y: usize },
    /// `6XKK` - `LD Vx, kk`
    LoadByte { x: usize, kk: u8 },
    /// `7XKK` - `ADD Vx, kk`, the carry flag is not changed
    AddByte { x: usize, kk: u8 },
    /// `8XY0` - `LD Vx, Vy`
    LoadRegister { x: usize, y: usize },
    /// `8XY1` - `OR Vx, Vy`
    Or { x: usize, y: usize },
    /// `8XY2` - `AND Vx, Vy`
    And { x: usize, y: usize },
    /// `8XY3` - `XOR Vx, Vy`
    Xor { x: usize, y: usize },
    /// `8XY4` - `ADD Vx, Vy`
    AddRegister { x: usize, y: usize },
    /// `8XY5` - `SUB Vx, Vy`
    Sub { x: usize, y: usize },
    /// `8XY6` - `SHR Vx`
    ShiftRight { x: usize },
    /// `8XY7` - `SUBN Vx, Vy`
    SubN { x: usize, y: usize },
    /// `8XYE` - `SHL Vx`
    ShiftLeft { x: usize },
    /// `9XY0` - `SNE Vx, Vy`
    SkipNotEqualRegister { x: usize, y: usize },
    /// `ANNN` - `LD I, nnn`
    LoadIndex { nnn: u16 },
    /// `BNNN` - `JP V0, nnn`
    JumpOffset { nnn: u16 },
    /// `CXKK` - `RND Vx, kk`
    Random { x: usize, kk: u8 },
    /// `DXYN` - `DRW Vx, Vy, n`
    Draw { x: usize, y: usize, n: u8 },
    /// `EX9E` - `SKP Vx`
    SkipKeyPressed { x: usize },
    /// `EXA1` - `SKNP Vx`
    SkipKeyNotPressed { x: usize },
    /// `FX07` - `LD Vx, DT`
    GetDelayTimer { x: usize },
    /// `FX0A` - `LD Vx, K`
    AwaitKeyPress { x: usize },
    /// `FX15` - `LD DT, Vx`
    SetDelayTimer { x: usize },
    /// `FX18` - `LD ST, Vx`
    SetSoundTimer { x: usize },
    /// `FX1E` - `ADD I, Vx`
    AddVxToI { x: usize },
    /// `FX29` - `LD F, Vx`
    SetIToSprite { x: usize },
    /// `FX33` - `LD B, Vx`
    StoreBcd { x: usize },
    /// `FX55` - `LD [I], Vx`
    StoreV0ToVx { x: usize },
    /// `FX65` - `LD Vx, [I]`
    FillV0ToVx { x: usize },
}

#[inline]
fn err<T>(value: Opcode) -> Result<T, OpcodeError> {
    Err(OpcodeError::InvalidOpcode(value))
}

impl TryFrom<Opcode> for Instruction {
    type Error = OpcodeError;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        use Instruction::*;

        let (x, y, n) = value.xyn();
        let kk = value.kk();
        let nnn = value.nnn();

        let res = match value.t() {
            0x0 => match value {
                0x00E0 => Clear,
                0x00EE => Return,
                _ => return err(value),
            },
            0x1 => Jump { nnn },
            0x2 => Call { nnn },
            0x3 => SkipEqualByte { x, kk },
            0x4 => SkipNotEqualByte { x, kk },
            0x5 if n == 0 => SkipEqualRegister { x, y },
            0x6 => LoadByte { x, kk },
            0x7 => AddByte { x, kk },
            0x8 => match n {
                0x0 => LoadRegister { x, y },
                0x1 => Or { x, y },
                0x2 => And { x, y },
                0x3 => Xor { x, y },
                0x4 => AddRegister { x, y },
                0x5 => Sub { x, y },
                0x6 => ShiftRight { x },
                0x7 => SubN { x, y },
                0xE => ShiftLeft { x },
                _ => return err(value),
            },
            0x9 if n == 0 => SkipNotEqualRegister { x, y },
            0xA => LoadIndex { nnn },
            0xB => JumpOffset { nnn },
            0xC => Random { x, kk },
            0xD => Draw { x, y, n },
            0xE => match kk {
                0x9E => SkipKeyPressed { x },
                0xA1 => SkipKeyNotPressed { x },
                _ => return err(value),
            },
            0xF => match kk {
                0x07 => GetDelayTimer { x },
                0x0A => AwaitKeyPress { x },
                0x15 => SetDelayTimer { x },
                0x18 => SetSoundTimer { x },
                0x1E => AddVxToI { x },
                0x29 => SetIToSprite { x },
                0x33 => StoreBcd { x },
                0x55 => StoreV0ToVx { x },
                0x65 => FillV0ToVx { x },
                _ => return err(value),
            },
            _ => return err(value),
        };
        Ok(res)
    }
}

/// Disassembles the instruction into the conventional mnemonic notation.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Clear => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump { nnn } => write!(f, "JP {:#05X}", nnn),
            Call { nnn } => write!(f, "CALL {:#05X}", nnn),
            SkipEqualByte { x, kk } => write!(f, "SE V{:X}, {:#04X}", x, kk),
            SkipNotEqualByte { x, kk } => write!(f, "SNE V{:X}, {:#04X}", x, kk),
            SkipEqualRegister { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadByte { x, kk } => write!(f, "LD V{:X}, {:#04X}", x, kk),
            AddByte { x, kk } => write!(f, "ADD V{:X}, {:#04X}", x, kk),
            LoadRegister { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddRegister { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x } => write!(f, "SHR V{:X}", x),
            SubN { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x } => write!(f, "SHL V{:X}", x),
            SkipNotEqualRegister { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex { nnn } => write!(f, "LD I, {:#05X}", nnn),
            JumpOffset { nnn } => write!(f, "JP V0, {:#05X}", nnn),
            Random { x, kk } => write!(f, "RND V{:X}, {:#04X}", x, kk),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipKeyPressed { x } => write!(f, "SKP V{:X}", x),
            SkipKeyNotPressed { x } => write!(f, "SKNP V{:X}", x),
            GetDelayTimer { x } => write!(f, "LD V{:X}, DT", x),
            AwaitKeyPress { x } => write!(f, "LD V{:X}, K", x),
            SetDelayTimer { x } => write!(f, "LD DT, V{:X}", x),
            SetSoundTimer { x } => write!(f, "LD ST, V{:X}", x),
            AddVxToI { x } => write!(f, "ADD I, V{:X}", x),
            SetIToSprite { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreV0ToVx { x } => write!(f, "LD [I], V{:X}", x),
            FillV0ToVx { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program steps that the chip
/// can take.
pub enum ProgramCounterStep {
    /// Will not change the program counter
    None,
    /// Will move the program counter to the next opcode
    Next,
    /// Will skip the next opcode
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(u16),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Will calculate the program counter that follows `from`.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next.apply(0x200), 0x202);
    /// assert_eq!(ProgramCounterStep::Skip.apply(0x200), 0x204);
    /// assert_eq!(ProgramCounterStep::Jump(0x300).apply(0x200), 0x300);
    /// ```
    #[inline]
    pub fn apply(&self, from: u16) -> u16 {
        const SIZE: u16 = memory::opcodes::SIZE as u16;
        match *self {
            ProgramCounterStep::None => from,
            ProgramCounterStep::Next => from.wrapping_add(SIZE),
            ProgramCounterStep::Skip => from.wrapping_add(2 * SIZE),
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

/// Represents a step of the program counter
/// this requires the enum ProgramCounterStep
/// to work.
pub trait ProgramCounter {
    /// will move the program counter forward by a step.
    fn advance(&mut self, step: ProgramCounterStep);
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents a command from the interpreter up to the collaborators.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The program waits for the next key press
    Wait,
    /// The framebuffer changed and should be redrawn
    Draw,
}

#[cfg(test)]
mod tests {
    use std::convert::TryInto;

    use super::*;

    #[test]
    fn test_field_extraction() {
        let opcode: Opcode = 0xD12A;
        assert_eq!(opcode.t(), 0xD);
        assert_eq!(opcode.nnn(), 0x12A);
        assert_eq!(opcode.x(), 0x1);
        assert_eq!(opcode.y(), 0x2);
        assert_eq!(opcode.n(), 0xA);
        assert_eq!(opcode.kk(), 0x2A);
        assert_eq!(opcode.xyn(), (0x1, 0x2, 0xA));
    }

    #[test]
    fn test_tryfrom_opcode_simple() {
        let value: Opcode = 0x00E0;
        let conv: Result<Instruction, _> = value.try_into();
        assert_eq!(conv, Ok(Instruction::Clear));
    }

    #[test]
    fn test_tryfrom_opcode_simple_fail() {
        let value: Opcode = 0x00E1;
        let conv: Result<Instruction, _> = value.try_into();
        assert_eq!(conv, Err(OpcodeError::InvalidOpcode(value)));
    }

    #[test]
    fn test_tryfrom_opcode_multiple() {
        use Instruction::*;
        let tests = [
            (0x00E0, Ok(Clear)),
            (0x00EE, Ok(Return)),
            (0x00E1, Err("")),
            (0x0123, Err("")),
            (0x1919, Ok(Jump { nnn: 0x919 })),
            (0x2222, Ok(Call { nnn: 0x222 })),
            (0x3123, Ok(SkipEqualByte { x: 0x1, kk: 0x23 })),
            (0x4123, Ok(SkipNotEqualByte { x: 0x1, kk: 0x23 })),
            (0x5120, Ok(SkipEqualRegister { x: 0x1, y: 0x2 })),
            (0x5121, Err("")),
            (0x6123, Ok(LoadByte { x: 0x1, kk: 0x23 })),
            (0x7123, Ok(AddByte { x: 0x1, kk: 0x23 })),
            (0x8120, Ok(LoadRegister { x: 0x1, y: 0x2 })),
            (0x8121, Ok(Or { x: 0x1, y: 0x2 })),
            (0x8122, Ok(And { x: 0x1, y: 0x2 })),
            (0x8123, Ok(Xor { x: 0x1, y: 0x2 })),
            (0x8124, Ok(AddRegister { x: 0x1, y: 0x2 })),
            (0x8125, Ok(Sub { x: 0x1, y: 0x2 })),
            (0x8126, Ok(ShiftRight { x: 0x1 })),
            (0x8127, Ok(SubN { x: 0x1, y: 0x2 })),
            (0x812E, Ok(ShiftLeft { x: 0x1 })),
            (0x8128, Err("")),
            (0x9120, Ok(SkipNotEqualRegister { x: 0x1, y: 0x2 })),
            (0x9121, Err("")),
            (0xA222, Ok(LoadIndex { nnn: 0x222 })),
            (0xB222, Ok(JumpOffset { nnn: 0x222 })),
            (0xC123, Ok(Random { x: 0x1, kk: 0x23 })),
            (0xD123, Ok(Draw { x: 0x1, y: 0x2, n: 0x3 })),
            (0xE19E, Ok(SkipKeyPressed { x: 0x1 })),
            (0xE1A1, Ok(SkipKeyNotPressed { x: 0x1 })),
            (0xE111, Err("")),
            (0xF007, Ok(GetDelayTimer { x: 0x0 })),
            (0xF00A, Ok(AwaitKeyPress { x: 0x0 })),
            (0xF015, Ok(SetDelayTimer { x: 0x0 })),
            (0xF018, Ok(SetSoundTimer { x: 0x0 })),
            (0xF01E, Ok(AddVxToI { x: 0x0 })),
            (0xF029, Ok(SetIToSprite { x: 0x0 })),
            (0xF033, Ok(StoreBcd { x: 0x0 })),
            (0xF055, Ok(StoreV0ToVx { x: 0x0 })),
            (0xF065, Ok(FillV0ToVx { x: 0x0 })),
            (0xF0AA, Err("")),
        ];
        for (value, res) in tests.iter() {
            let value: Opcode = *value;
            let conv: Result<Instruction, _> = value.try_into();
            assert_eq!(conv, (*res).map_err(|_| OpcodeError::InvalidOpcode(value)));
        }
    }

    #[test]
    fn test_disassembly() {
        let tests = [
            (0x00E0, "CLS"),
            (0x2345, "CALL 0x345"),
            (0x6005, "LD V0, 0x05"),
            (0x8AB4, "ADD VA, VB"),
            (0x8A0E, "SHL VA"),
            (0xB210, "JP V0, 0x210"),
            (0xD125, "DRW V1, V2, 5"),
            (0xF30A, "LD V3, K"),
            (0xFF65, "LD VF, [I]"),
        ];
        for (value, text) in tests.iter() {
            let value: Opcode = *value;
            let instruction = Instruction::try_from(value).expect("valid opcode");
            assert_eq!(&format!("{}", instruction), text);
        }
    }

    #[test]
    fn test_program_counter_step() {
        assert_eq!(ProgramCounterStep::None.apply(0x200), 0x200);
        assert_eq!(ProgramCounterStep::Next.apply(0x200), 0x202);
        assert_eq!(ProgramCounterStep::Skip.apply(0x200), 0x204);
        assert_eq!(ProgramCounterStep::Jump(0x0ABC).apply(0x200), 0x0ABC);
        assert_eq!(ProgramCounterStep::cond(true), ProgramCounterStep::Skip);
    }
}
