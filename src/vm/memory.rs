//! The address space of the machine.
use super::{Address, Word};
use std::collections::BTreeMap;

/// A sparse, unbounded array of cells.
///
/// Only cells which have been written are stored. Every other non-negative
/// address reads as zero. Negative addresses don't exist: reading or writing
/// one fails, and the interpreter turns the failure into
/// [`Status::InvalidAddress`](super::Status::InvalidAddress).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Memory {
    cells: BTreeMap<Address, Word>,
}

/// The largest memory a dump will fill in. Memory which extends further
/// than this can only be listed cell by cell.
pub const DUMP_LIMIT: Address = 1 << 24;

/// The address which made a memory access fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfBounds(pub Address);

impl Memory {
    /// Create a memory holding the given words, starting at address zero.
    pub fn new(words: impl IntoIterator<Item = Word>) -> Self {
        Self {
            cells: (0..).zip(words).collect(),
        }
    }

    /// Read the cell at an address.
    pub fn read(&self, address: Address) -> Result<Word, OutOfBounds> {
        if address < 0 {
            return Err(OutOfBounds(address));
        }
        Ok(self.cells.get(&address).copied().unwrap_or(0))
    }

    /// Write the cell at an address, creating it if it didn't exist.
    pub fn write(&mut self, address: Address, value: Word) -> Result<(), OutOfBounds> {
        if address < 0 {
            return Err(OutOfBounds(address));
        }
        self.cells.insert(address, value);
        Ok(())
    }

    /// The highest address which has been written (or loaded).
    pub fn highest(&self) -> Option<Address> {
        self.cells.keys().next_back().copied()
    }

    /// One past the highest address which has been written (or loaded), or
    /// `None` if that is past the end of the address space.
    pub fn extent(&self) -> Option<Address> {
        match self.highest() {
            Some(last) => last.checked_add(1),
            None => Some(0),
        }
    }

    /// The number of cells actually stored.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The stored cells, in address order.
    pub fn cells(&self) -> &BTreeMap<Address, Word> {
        &self.cells
    }

    /// Copy every address from zero up to the extent into a list, filling
    /// the gaps with zeroes. Returns `None` when the extent is larger than
    /// [`DUMP_LIMIT`].
    pub fn dump(&self) -> Option<Vec<Word>> {
        let extent = self.extent().filter(|&extent| extent <= DUMP_LIMIT)?;
        let mut result = vec![0; extent as usize];
        for (&address, &value) in &self.cells {
            result[address as usize] = value;
        }
        Some(result)
    }
}
