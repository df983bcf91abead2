//! Stack frame layout
//!
//! Mirrors the resolver's scope stack with sizes instead of names. Offsets
//! handed out are absolute from SB: everything reserved by enclosing
//! scopes plus what this scope has reserved so far.

/// Why `Frame::allocate` could not reserve space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationError {
    /// No `let` scope is open
    NoScope,
    /// The frame would outgrow a 16-bit offset
    Overflow { words: usize },
}

#[derive(Debug, Default)]
pub struct Frame {
    /// Bytes reserved in each open scope, innermost last
    scopes: Vec<i16>,
    /// Sum of `scopes`
    total: i16,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(0);
    }

    /// Reserve `size` bytes in the innermost scope and return their offset
    pub fn allocate(&mut self, size: u8) -> Result<i16, AllocationError> {
        let local = self.scopes.last_mut().ok_or(AllocationError::NoScope)?;
        let total = self
            .total
            .checked_add(i16::from(size))
            .ok_or(AllocationError::Overflow {
                words: self.total as usize + usize::from(size),
            })?;
        let offset = self.total;
        *local += i16::from(size);
        self.total = total;
        Ok(offset)
    }

    /// Close the innermost scope, returning how many bytes it reserved
    pub fn pop_scope(&mut self) -> i16 {
        let size = self.scopes.pop().unwrap_or(0);
        self.total -= size;
        size
    }

    pub fn total_size(&self) -> i16 {
        self.total
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
