//! The random number source used by the `CXKK` opcode.
use rand::{
    rngs::{OsRng, StdRng},
    Error, RngCore, SeedableRng,
};

/// Produces uniformly distributed random bytes.
///
/// Every [`RngCore`](rand::RngCore) is a source, so both real generators and
/// mocks like [`StepRng`](rand::rngs::mock::StepRng) can be plugged in.
pub trait RandomByteSource {
    /// Returns the next random byte.
    fn next_byte(&mut self) -> u8;
}

impl<R: RngCore> RandomByteSource for R {
    fn next_byte(&mut self) -> u8 {
        // using a fill bytes call here, as the trait RngCore does not
        // support random u8.
        let mut rand: [u8; 1] = [0];
        self.fill_bytes(&mut rand);
        rand[0]
    }
}

/// A generator seeded from the operating system.
pub fn from_entropy() -> StdRng {
    StdRng::from_rng(OsRng).unwrap_or_else(|err| {
        log::warn!("Unable to seed from the os ({}), falling back to a fixed seed.", err);
        StdRng::seed_from_u64(0)
    })
}

/// A reproducible generator for the given seed.
pub fn from_seed(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A deterministic source that repeats the given bytes in order.
///
/// # Example
/// ```rust
/// # use chip::rng::{RandomByteSource, Sequence};
/// let mut seq = Sequence::new(&[1, 2]);
/// assert_eq!(seq.next_byte(), 1);
/// assert_eq!(seq.next_byte(), 2);
/// assert_eq!(seq.next_byte(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Sequence {
    bytes: Vec<u8>,
    position: usize,
}

impl Sequence {
    /// Will create a new sequence, an empty slice yields only zeros.
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            position: 0,
        }
    }

    fn next(&mut self) -> u8 {
        if self.bytes.is_empty() {
            return 0;
        }
        let value = self.bytes[self.position];
        self.position = (self.position + 1) % self.bytes.len();
        value
    }
}

impl RngCore for Sequence {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0; 4];
        self.fill_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0; 8];
        self.fill_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            *byte = self.next();
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_step_rng_source() {
        // creating a simple "random number generator" that will
        // allways return 0x42
        let mut srng = StepRng::new(0x42, 0);
        assert_eq!(srng.next_byte(), 0x42);
        assert_eq!(srng.next_byte(), 0x42);
    }

    #[test]
    fn test_sequence_wraps() {
        let mut seq = Sequence::new(&[0xAA, 0xBB, 0xCC]);
        let out: Vec<u8> = (0..5).map(|_| seq.next_byte()).collect();
        assert_eq!(out, vec![0xAA, 0xBB, 0xCC, 0xAA, 0xBB]);

        let mut empty = Sequence::new(&[]);
        assert_eq!(empty.next_byte(), 0);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut first = from_seed(1234);
        let mut second = from_seed(1234);
        for _ in 0..32 {
            assert_eq!(first.next_byte(), second.next_byte());
        }
    }

    #[test]
    fn test_boxed_source() {
        let mut source: Box<dyn RandomByteSource> = Box::new(Sequence::new(&[7]));
        assert_eq!(source.next_byte(), 7);
    }
}
