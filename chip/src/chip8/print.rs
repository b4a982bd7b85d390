//! Human readable dump of the complete machine state, kept apart from the
//! [`chipset`](super::ChipSet) itself as it is only used for debugging.

use std::fmt::{self, Write};

use {
    super::ChipSet,
    crate::{
        definitions::{cpu, memory},
        opcode::{self, Opcode},
    },
    num_traits::Unsigned,
};

/// The amount of entries printed per row
const ROW_WIDTH: usize = 8;
/// Every value line is indented twice, the section titles once
const INDENT: &str = "\t\t";
/// Stands in for a run of rows that only contain zeros.
const ELLIPSIS: &str = "...";

macro_rules! word {
    () => {
        // `0x` followed by four digits
        "{:#06X}"
    };
}

/// The width every printed cell is padded to, the length of `0x0000`.
const CELL_WIDTH: usize = 6;

fn address_range(out: &mut String, from: usize, to: usize) -> fmt::Result {
    write!(out, concat!("{}", word!(), " - ", word!(), " :"), INDENT, from, to)
}

/// Lays the cells out in rows of [`ROW_WIDTH`], each prefixed with its index range.
fn table<T, F>(cells: &[T], mut cell: F) -> Result<String, fmt::Error>
where
    F: FnMut(&mut String, &T) -> fmt::Result,
{
    let mut out = String::with_capacity(cells.len() * (CELL_WIDTH + 1) * 2);
    for (row, chunk) in cells.chunks(ROW_WIDTH).enumerate() {
        if row > 0 {
            out.push('\n');
        }
        let from = row * ROW_WIDTH;
        address_range(&mut out, from, from + chunk.len() - 1)?;
        for value in chunk {
            out.push(' ');
            cell(&mut out, value)?;
        }
    }
    Ok(out)
}

fn words<T>(cells: &[T]) -> Result<String, fmt::Error>
where
    T: fmt::UpperHex + Unsigned,
{
    table(cells, |out, value| write!(out, word!(), value))
}

fn flags(cells: &[bool]) -> Result<String, fmt::Error> {
    let text = table(cells, |out, value| {
        write!(out, "{:<width$}", value, width = CELL_WIDTH)
    })?;
    // the padding of the last cell is not needed
    Ok(text.lines().map(str::trim_end).collect::<Vec<_>>().join("\n"))
}

fn single<T>(value: T) -> String
where
    T: fmt::UpperHex + Unsigned,
{
    format!(concat!("{}", word!()), INDENT, value)
}

/// Memory is shown as big-endian words, consecutive rows without a single
/// set bit are merged into one row.
fn memory_dump(cells: &[u8]) -> Result<String, fmt::Error> {
    const BYTES_PER_ROW: usize = ROW_WIDTH * memory::opcodes::SIZE;

    fn blank(from: usize, to: usize) -> Result<String, fmt::Error> {
        let mut line = String::new();
        address_range(&mut line, from, to)?;
        write!(line, concat!(" ", word!(), " {} ", word!()), 0, ELLIPSIS, 0)?;
        Ok(line)
    }

    let mut lines = Vec::new();
    let mut zeros_from: Option<usize> = None;

    for (index, chunk) in cells.chunks(BYTES_PER_ROW).enumerate() {
        let from = index * BYTES_PER_ROW;
        if chunk.iter().all(|&byte| byte == 0) {
            zeros_from.get_or_insert(from);
            continue;
        }
        if let Some(start) = zeros_from.take() {
            lines.push(blank(start, from - 1)?);
        }

        let mut line = String::new();
        address_range(&mut line, from, from + chunk.len() - 1)?;
        for pointer in (0..chunk.len()).step_by(memory::opcodes::SIZE) {
            let word: Opcode = opcode::build_opcode(chunk, pointer).unwrap_or(0);
            write!(line, concat!(" ", word!()), word)?;
        }
        lines.push(line);
    }
    if let Some(start) = zeros_from {
        lines.push(blank(start, cells.len() - 1)?);
    }
    Ok(lines.join("\n"))
}

fn section(f: &mut fmt::Formatter<'_>, title: &str, body: &str) -> fmt::Result {
    writeln!(f, "\t{} :\n{}", title, body)
}

impl fmt::Display for ChipSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // unused stack slots are shown as zero
        let mut stack = [0u16; cpu::stack::SIZE];
        stack[..self.stack.len()].copy_from_slice(&self.stack);

        writeln!(f, "Chipset {{")?;
        section(f, "Program Name", &format!("{}{}", INDENT, self.name))?;
        section(f, "Opcode", &single(self.opcode))?;
        section(f, "Program Counter", &single(self.program_counter))?;
        section(f, "Index Register", &single(self.index_register))?;
        section(f, "Delay Timer", &single(self.timers.delay.get_value()))?;
        section(f, "Sound Timer", &single(self.timers.sound.get_value()))?;
        section(f, "Memory", &memory_dump(self.memory.as_slice())?)?;
        section(f, "Keyboard", &flags(self.keyboard.get_keys())?)?;
        section(f, "Stack", &words(&stack)?)?;
        section(f, "Register", &words(&self.registers)?)?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests;
    use super::*;
    use crate::definitions::keyboard;

    const OUTPUT: &str = "\
        Chipset {\n\
            \tProgram Name :\n\
                \t\tTEST\n\
            \tOpcode :\n\
                \t\t0x0000\n\
            \tProgram Counter :\n\
                \t\t0x0200\n\
            \tIndex Register :\n\
                \t\t0x0000\n\
            \tDelay Timer :\n\
                \t\t0x0000\n\
            \tSound Timer :\n\
                \t\t0x0000\n\
            \tMemory :\n\
                \t\t0x0000 - 0x004F : 0x0000 ... 0x0000\n\
                \t\t0x0050 - 0x005F : 0xF090 0x9090 0xF020 0x6020 0x2070 0xF010 0xF080 0xF0F0\n\
                \t\t0x0060 - 0x006F : 0x10F0 0x10F0 0x9090 0xF010 0x10F0 0x80F0 0x10F0 0xF080\n\
                \t\t0x0070 - 0x007F : 0xF090 0xF0F0 0x1020 0x4040 0xF090 0xF090 0xF0F0 0x90F0\n\
                \t\t0x0080 - 0x008F : 0x10F0 0xF090 0xF090 0x90E0 0x90E0 0x90E0 0xF080 0x8080\n\
                \t\t0x0090 - 0x009F : 0xF0E0 0x9090 0x90E0 0xF080 0xF080 0xF0F0 0x80F0 0x8080\n\
                \t\t0x00A0 - 0x01FF : 0x0000 ... 0x0000\n\
                \t\t0x0200 - 0x020F : 0x00E0 0x6C00 0x4C00 0x6E0F 0xA203 0x6020 0xF055 0x00E0\n\
                \t\t0x0210 - 0x0FFF : 0x0000 ... 0x0000\n\
            \tKeyboard :\n\
                \t\t0x0000 - 0x0007 : false  true   false  true   false  true   false  true\n\
                \t\t0x0008 - 0x000F : false  true   false  true   false  true   false  true\n\
            \tStack :\n\
                \t\t0x0000 - 0x0007 : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
                \t\t0x0008 - 0x000F : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
            \tRegister :\n\
                \t\t0x0000 - 0x0007 : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
                \t\t0x0008 - 0x000F : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
        }";

    #[test]
    /// tests if the pretty print output is as expected
    fn test_full_print() {
        let mut chip = tests::get_default_chip();
        let mut keys = [false; keyboard::SIZE];
        for (index, key) in keys.iter_mut().enumerate() {
            *key = index % 2 != 0;
        }
        chip.set_keyboard(&keys);

        let actual = format!("{}", chip);
        let actual: Vec<&str> = actual.split('\n').collect();
        let expected: Vec<&str> = OUTPUT.split('\n').collect();

        assert_eq!(expected.len(), actual.len());
        for (exp, act) in expected.iter().zip(actual.iter()) {
            assert_eq!(exp, act);
        }
    }

    #[test]
    fn test_stack_is_printed() {
        let mut chip = tests::get_default_chip();
        chip.push_stack(0x0ABC).unwrap();
        chip.push_stack(0x0DEF).unwrap();

        let printed = format!("{}", chip);
        assert!(printed.contains("\t\t0x0000 - 0x0007 : 0x0ABC 0x0DEF 0x0000"));
    }

    #[test]
    fn test_cell_width() {
        assert_eq!(single(0u8).trim_start().len(), CELL_WIDTH);
        assert_eq!(single(u16::MAX).trim_start().len(), CELL_WIDTH);
    }

    #[test]
    fn test_trailing_zero_rows() {
        let mut cells = [0u8; 48];
        cells[17] = 0x01;
        let dump = memory_dump(&cells).unwrap();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(
            lines,
            vec![
                "\t\t0x0000 - 0x000F : 0x0000 ... 0x0000",
                "\t\t0x0010 - 0x001F : 0x0001 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000",
                "\t\t0x0020 - 0x002F : 0x0000 ... 0x0000",
            ]
        );
    }
}
