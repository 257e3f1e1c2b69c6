//! The store: address-based storage with slot reuse.

use crate::value::Cell;

/// A slot index.
pub type Address = usize;

/// Growable slot array with a parallel free list.
///
/// `alloc` reuses the lowest free slot, scanning linearly from address
/// zero (fine for small live-binding counts), else appends. `free` marks a
/// slot reusable without clearing it, so a freed-then-unaccessed slot may
/// still hold stale data — a defined hazard, not something the store
/// sanitizes. A live address holds exactly one value.
#[derive(Default)]
pub struct Store {
    cells: Vec<Cell>,
    allocated: Vec<bool>,
}

impl Store {
    pub fn new() -> Self {
        Store {
            cells: Vec::new(),
            allocated: Vec::new(),
        }
    }

    /// Place `cell` at the lowest free address, recording the address on an
    /// evaluated value.
    pub fn alloc(&mut self, cell: Cell) -> Address {
        let mut address = 0;
        while address < self.cells.len() && self.allocated[address] {
            address += 1;
        }

        if let Cell::Value(value) = &cell {
            value.borrow_mut().address = Some(address);
        }

        if address < self.cells.len() {
            self.cells[address] = cell;
            self.allocated[address] = true;
        } else {
            self.cells.push(cell);
            self.allocated.push(true);
        }
        address
    }

    /// Mark an address reusable. The slot's content is left in place.
    pub fn free(&mut self, address: Address) {
        if address < self.allocated.len() {
            self.allocated[address] = false;
        }
    }

    /// Replace the content of an address.
    pub fn put(&mut self, address: Address, cell: Cell) {
        if address < self.cells.len() {
            self.cells[address] = cell;
        }
    }

    /// Read an address. Freed slots still answer with their stale content.
    pub fn get(&self, address: Address) -> Option<Cell> {
        self.cells.get(address).cloned()
    }

    /// Whether an address is currently allocated.
    pub fn is_allocated(&self, address: Address) -> bool {
        self.allocated.get(address).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
