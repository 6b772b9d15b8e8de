/// The register file: V0..VF and the index register I
///
/// VF doubles as the flag register; arithmetic, shift and draw instructions
/// overwrite it with their carry/borrow/collision outcome.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    v: [u8; 16],
    pub i: u16,
}

/// index of the flag register
pub const VF: u8 = 0xf;

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn v(&self, x: u8) -> u8 {
        self.v[(x & 0xf) as usize]
    }

    pub fn set_v(&mut self, x: u8, value: u8) {
        self.v[(x & 0xf) as usize] = value;
    }

    pub fn set_flag(&mut self, on: bool) {
        self.set_v(VF, on as u8);
    }

    /// V0..=Vx, for the bulk store/load instructions
    pub fn range(&self, x: u8) -> &[u8] {
        &self.v[..=(x & 0xf) as usize]
    }

    pub fn range_mut(&mut self, x: u8) -> &mut [u8] {
        &mut self.v[..=(x & 0xf) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registers_zeroed() {
        let r = Registers::new();
        assert_eq!(r.range(0xf), &[0; 16]);
        assert_eq!(r.i, 0);
    }

    #[test]
    fn test_flag_is_vf() {
        let mut r = Registers::new();
        r.set_flag(true);
        assert_eq!(r.v(0xf), 1);
        r.set_flag(false);
        assert_eq!(r.v(VF), 0);
    }

    #[test]
    fn test_range_is_inclusive() {
        let mut r = Registers::new();
        r.range_mut(2).copy_from_slice(&[7, 8, 9]);
        assert_eq!(r.v(2), 9);
        assert_eq!(r.range(3), &[7, 8, 9, 0]);
    }
}
