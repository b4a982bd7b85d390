use std::io::{self, Read};

use crate::definitions::memory;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The raw program bytes
    /// stored as a u8 slice on the heap
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data
    pub fn new<D>(name: &str, data: D) -> Self
    where
        D: Into<Box<[u8]>>,
    {
        Rom {
            name: name.to_string(),
            data: data.into(),
        }
    }

    /// Will read the whole reader into a rom.
    ///
    /// At most one byte more then fits into memory is read, so that an
    /// oversized program is still detected while loading.
    pub fn from_reader<R: Read>(name: &str, reader: R) -> io::Result<Self> {
        let mut data = Vec::new();
        reader
            .take(memory::PROGRAM_MAX_SIZE as u64 + 1)
            .read_to_end(&mut data)?;
        Ok(Rom::new(name, data))
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}
