use tinyvec::ArrayVec;

use crate::{definitions::cpu, StackError};

/// The stack is only used to store return addresses when subroutines are called. The original
/// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
/// `12` levels of nesting; modern implementations usually have more.
/// (here we are using `16`)
#[derive(Debug, Default, Clone)]
pub(super) struct Stack {
    entries: ArrayVec<[u16; cpu::stack::SIZE]>,
}

impl Stack {
    pub(super) fn push(&mut self, pointer: u16) -> Result<(), StackError> {
        match self.entries.try_push(pointer) {
            None => Ok(()),
            Some(_) => Err(StackError::Full),
        }
    }

    pub(super) fn pop(&mut self) -> Result<u16, StackError> {
        self.entries.pop().ok_or(StackError::Empty)
    }

    pub(super) fn clear(&mut self) {
        self.entries.clear();
    }

    /// always one bigger then the entry it points to
    pub(super) fn pointer(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn as_slice(&self) -> &[u16] {
        self.entries.as_slice()
    }
}
