use std::fmt;

use crate::definitions::{display, keyboard};

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will display all from the pixels
    fn display(&mut self, pixels: &Framebuffer);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the keyboard data
pub trait KeyboardCommands {
    /// Returns the pressed state of all the keys `0x0-0xF`
    fn get_keyboard(&mut self) -> [bool; keyboard::SIZE];
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for the sound output
pub trait AudioCommands {
    /// Will start or stop the tone
    fn set_tone(&mut self, active: bool);
}

/// Will store the state of the internal keyboard
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    pub fn reset(&mut self) {
        self.keys = [false; keyboard::SIZE];
    }

    pub fn toggle_key(&mut self, key: usize) {
        self.set_key(key, !self.keys[key])
    }

    pub fn set_key(&mut self, key: usize, to: bool) {
        debug_assert!(key < keyboard::SIZE);
        self.keys[key] = to;
    }

    pub fn set_mult(&mut self, keys: &[bool; keyboard::SIZE]) {
        self.keys = *keys;
    }

    pub fn get_keys(&self) -> &[bool; keyboard::SIZE] {
        &self.keys
    }

    /// Keys outside of `0x0-0xF` are never pressed.
    pub fn is_pressed(&self, key: usize) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    /// The lowest key that is pressed now, but was released in `before`.
    pub fn first_pressed_since(&self, before: &[bool; keyboard::SIZE]) -> Option<u8> {
        self.keys
            .iter()
            .zip(before.iter())
            .position(|(&now, &was)| now && !was)
            .map(|index| index as u8)
    }
}

/// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
/// `(64 x 32)`. Every pixel is stored as a single byte that is either `0` or `1`.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Box<[u8; display::RESOLUTION]>,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Self {
            pixels: Box::new([0; display::RESOLUTION]),
        }
    }

    /// Will turn off all the pixels.
    pub fn clear(&mut self) {
        self.pixels.iter_mut().for_each(|pixel| *pixel = 0);
    }

    /// Returns the pixel in column `x` of row `y`.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * display::WIDTH + x]
    }

    /// Will XOR the sprite onto the screen with its upper left corner at `(x, y)`.
    ///
    /// Rows wrap around horizontally, rows below the last line are clipped.
    /// Returns true if any pixel was turned off.
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        const BYTE: usize = 8;

        let x = x % display::WIDTH;
        let y = y % display::HEIGHT;
        let mut collision = false;

        for (i, row) in sprite.iter().enumerate() {
            let coory = y + i;
            if coory >= display::HEIGHT {
                break;
            }

            for j in 0..BYTE {
                let mask: u8 = 0x80 >> j;
                if row & mask == 0 {
                    continue;
                }

                let coorx = (x + j) % display::WIDTH;
                let pixel = &mut self.pixels[coory * display::WIDTH + coorx];

                collision |= *pixel == 1;
                *pixel ^= 1;
            }
        }
        collision
    }

    /// Iterates over all rows, from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks(display::WIDTH)
    }

    /// The amount of pixels turned on.
    pub fn lit(&self) -> usize {
        self.pixels.iter().filter(|&&pixel| pixel == 1).count()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.pixels[..]
    }
}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Framebuffer")
            .field("lit", &self.lit())
            .finish()
    }
}

impl fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.rows().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            for pixel in row {
                write!(f, "{}", if *pixel == 1 { '#' } else { '.' })?;
            }
        }
        Ok(())
    }
}
