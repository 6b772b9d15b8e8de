/// how many nested calls the machine allows
pub const STACK_DEPTH: usize = 16;

/// Return-address stack, indexed by the stack pointer
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallStack {
    slots: [u16; STACK_DEPTH],
    sp: usize,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// returns false, leaving the stack untouched, if it is already full
    #[must_use]
    pub fn push(&mut self, addr: u16) -> bool {
        if self.sp == STACK_DEPTH {
            return false;
        }
        self.slots[self.sp] = addr;
        self.sp += 1;
        true
    }

    pub fn pop(&mut self) -> Option<u16> {
        if self.sp == 0 {
            return None;
        }
        self.sp -= 1;
        Some(self.slots[self.sp])
    }

    pub fn depth(&self) -> usize {
        self.sp
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
