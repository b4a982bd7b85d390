use crate::{
    definitions::{cpu, display},
    opcode::{Instruction, Operation, ProgramCounterStep},
    ProcessError,
};

use super::ChipSet;

type Executed = Result<(ProgramCounterStep, Operation), ProcessError>;

/// Wraps a program counter step without any notification for the collaborators.
#[inline]
fn next(step: ProgramCounterStep) -> Executed {
    Ok((step, Operation::None))
}

impl ChipSet {
    /// Runs a single decoded instruction and reports how the program counter has
    /// to move on. Nothing is changed if an error is returned.
    pub(super) fn execute(&mut self, instruction: Instruction) -> Executed {
        use Instruction::*;

        match instruction {
            Clear => {
                // 00E0
                // clear display
                self.display.clear();
                Ok((ProgramCounterStep::Next, Operation::Draw))
            }
            Return => {
                // 00EE
                // Return from sub routine => pop from stack
                let pc = self.pop_stack()?;
                next(ProgramCounterStep::Jump(pc))
            }
            Jump { nnn } => {
                // 1NNN
                // Jumps to address NNN.
                next(ProgramCounterStep::Jump(nnn))
            }
            Call { nnn } => {
                // 2NNN
                // Calls subroutine at NNN
                // and set's the program counter to the next opcode after the given stack push
                self.push_stack(ProgramCounterStep::Next.apply(self.program_counter))?;
                next(ProgramCounterStep::Jump(nnn))
            }
            SkipEqualByte { x, kk } => next(ProgramCounterStep::cond(self.registers[x] == kk)),
            SkipNotEqualByte { x, kk } => next(ProgramCounterStep::cond(self.registers[x] != kk)),
            SkipEqualRegister { x, y } => next(ProgramCounterStep::cond(
                self.registers[x] == self.registers[y],
            )),
            SkipNotEqualRegister { x, y } => next(ProgramCounterStep::cond(
                self.registers[x] != self.registers[y],
            )),
            LoadByte { x, kk } => {
                self.registers[x] = kk;
                next(ProgramCounterStep::Next)
            }
            AddByte { x, kk } => {
                // let VX overflow, but ignore carry
                self.registers[x] = self.registers[x].wrapping_add(kk);
                next(ProgramCounterStep::Next)
            }
            LoadRegister { x, y } => {
                // 8XY0
                // Sets VX to the value of VY.
                self.registers[x] = self.registers[y];
                next(ProgramCounterStep::Next)
            }
            Or { x, y } => {
                self.registers[x] |= self.registers[y];
                next(ProgramCounterStep::Next)
            }
            And { x, y } => {
                self.registers[x] &= self.registers[y];
                next(ProgramCounterStep::Next)
            }
            Xor { x, y } => {
                self.registers[x] ^= self.registers[y];
                next(ProgramCounterStep::Next)
            }
            AddRegister { x, y } => {
                // 8XY4
                // Adds VY to VX. VF is set to 1 when there's a carry, and to 0 when there isn't.
                let (res, carry) = self.registers[x].overflowing_add(self.registers[y]);
                self.store_with_flag(x, res, carry as u8)
            }
            Sub { x, y } => {
                // 8XY5
                // VY is subtracted from VX. VF is set to 1 if VX was larger then VY.
                let (left, right) = (self.registers[x], self.registers[y]);
                self.store_with_flag(x, left.wrapping_sub(right), (left > right) as u8)
            }
            ShiftRight { x } => {
                // 8XY6
                // Stores the least significant bit of VX in VF and then shifts VX to the right
                // by 1.
                let value = self.registers[x];
                self.store_with_flag(x, value >> 1, value & 1)
            }
            SubN { x, y } => {
                // 8XY7
                // Sets VX to VY minus VX. VF is set to 1 if VY was larger then VX.
                let (left, right) = (self.registers[y], self.registers[x]);
                self.store_with_flag(x, left.wrapping_sub(right), (left > right) as u8)
            }
            ShiftLeft { x } => {
                // 8XYE
                // Stores the most significant bit of VX in VF and then shifts VX to the left by 1.
                const SHIFT_SIGNIFICANT: u8 = 7;
                let value = self.registers[x];
                self.store_with_flag(x, value << 1, value >> SHIFT_SIGNIFICANT)
            }
            LoadIndex { nnn } => {
                // ANNN
                // Sets I to the address NNN.
                self.index_register = nnn;
                next(ProgramCounterStep::Next)
            }
            JumpOffset { nnn } => {
                // BNNN
                // Jumps to the address NNN plus V0.
                let v0 = self.registers[0] as u16;
                next(ProgramCounterStep::Jump(nnn + v0))
            }
            Random { x, kk } => {
                // CXKK
                // Sets VX to the result of a bitwise and operation on a random number and KK.
                self.registers[x] = self.rng.next_byte() & kk;
                next(ProgramCounterStep::Next)
            }
            Draw { x, y, n } => self.draw(x, y, n),
            SkipKeyPressed { x } => next(ProgramCounterStep::cond(
                self.keyboard.is_pressed(self.registers[x] as usize),
            )),
            SkipKeyNotPressed { x } => next(ProgramCounterStep::cond(
                !self.keyboard.is_pressed(self.registers[x] as usize),
            )),
            GetDelayTimer { x } => {
                self.registers[x] = self.timers.delay.get_value();
                next(ProgramCounterStep::Next)
            }
            AwaitKeyPress { x } => Ok(self.await_key_press(x)),
            SetDelayTimer { x } => {
                self.timers.delay.set_value(self.registers[x]);
                next(ProgramCounterStep::Next)
            }
            SetSoundTimer { x } => {
                self.timers.sound.set_value(self.registers[x]);
                next(ProgramCounterStep::Next)
            }
            AddVxToI { x } => {
                // FX1E
                // Adds VX to I. VF is not affected.
                let xi = self.registers[x] as u16;
                self.index_register = self.index_register.wrapping_add(xi);
                next(ProgramCounterStep::Next)
            }
            SetIToSprite { x } => {
                // FX29
                // Sets I to the location of the sprite for the character in VX. Characters 0-F (in
                // hexadecimal) are represented by a 4x5 font.
                let glyph = (self.registers[x] & 0xF) as usize;
                self.index_register =
                    (display::fontset::LOCATION + display::fontset::GLYPH_SIZE * glyph) as u16;
                next(ProgramCounterStep::Next)
            }
            StoreBcd { x } => {
                // FX33
                // Take the decimal representation of VX, place the hundreds digit in memory at
                // location in I, the tens digit at location I+1, and the ones digit at location I+2.
                let r = self.registers[x];
                let digits = [r / 100, r / 10 % 10, r % 10];
                self.memory
                    .slice_mut(self.index_register, digits.len())?
                    .copy_from_slice(&digits);
                next(ProgramCounterStep::Next)
            }
            StoreV0ToVx { x } => {
                // FX55
                // Stores V0 to VX (including VX) in memory starting at address I. I itself is
                // left unmodified.
                self.memory
                    .slice_mut(self.index_register, x + 1)?
                    .copy_from_slice(&self.registers[..=x]);
                next(ProgramCounterStep::Next)
            }
            FillV0ToVx { x } => {
                // FX65
                // Fills V0 to VX (including VX) with values from memory starting at address I.
                // I itself is left unmodified.
                let data = self.memory.slice(self.index_register, x + 1)?;
                self.registers[..=x].copy_from_slice(data);
                next(ProgramCounterStep::Next)
            }
        }
    }

    /// Writes VX first and the flag last, so that the flag wins if `X` is `F`.
    fn store_with_flag(&mut self, x: usize, value: u8, flag: u8) -> Executed {
        self.registers[x] = value;
        self.registers[cpu::register::LAST] = flag;
        next(ProgramCounterStep::Next)
    }

    /// DXYN
    /// Draws a sprite at coordinate (VX, VY) that has a width of 8 pixels and a height of N
    /// pixels. Each row of 8 pixels is read as bit-coded starting from memory location I; I
    /// value doesn’t change after the execution of this instruction. VF is set to 1 if any
    /// screen pixels are flipped from set to unset when the sprite is drawn, and to 0 if that
    /// doesn’t happen.
    fn draw(&mut self, x: usize, y: usize, n: u8) -> Executed {
        let coorx = self.registers[x] as usize;
        let coory = self.registers[y] as usize;

        // the whole sprite is fetched before the screen is touched
        let sprite = self.memory.slice(self.index_register, n as usize)?;
        let collision = self.display.draw_sprite(coorx, coory, sprite);

        self.registers[cpu::register::LAST] = collision as u8;
        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    /// FX0A
    /// A key press is awaited, and then stored in VX. The program counter is not moved
    /// until a key goes down, so the same opcode runs again on the next step.
    ///
    /// Only a transition into the pressed state counts. The first step of a wait just
    /// records the keypad, every following step compares against the keypad of the
    /// step before it. Keys held since the wait began never satisfy it.
    fn await_key_press(&mut self, x: usize) -> (ProgramCounterStep, Operation) {
        let current = *self.keyboard.get_keys();
        let pressed = self
            .key_wait
            .and_then(|before| self.keyboard.first_pressed_since(&before));

        match pressed {
            Some(key) => {
                log::debug!("key {:#X} pressed, stored in V{:X}", key, x);
                self.key_wait = None;
                self.registers[x] = key;
                (ProgramCounterStep::Next, Operation::None)
            }
            None => {
                if self.key_wait.is_none() {
                    log::debug!("waiting for a key press into V{:X}", x);
                }
                self.key_wait = Some(current);
                (ProgramCounterStep::None, Operation::Wait)
            }
        }
    }
}
