/// # Opcodes
///
/// CHIP-8 opcodes are 16 bits each. Their behaviour is cased on some combination of:
/// - `(n, _, _, _)` broad family; applies to all opcodes
/// - `(_, _, _, n)` specific behaviour within the 0x5, 0x8 and 0x9 families
/// - `(_, _, n, n)` specific behaviour within the 0x0, 0xE and 0xF families
///
/// Nibbles not used to select the operation carry its operands:
/// - `(_, n, n, n)` a 12-bit address `nnn`
/// - `(_, _, n, n)` an 8-bit immediate `kk`
/// - `(_, n, _, _)` the register Vx, or the range V0..=Vx
/// - `(_, _, n, _)` the register Vy
/// - `(_, _, _, n)` a sprite height `n`
pub trait Opcode {
    fn nibbles(&self) -> (u8, u8, u8, u8);

    /// `[_x__]`
    fn x(&self) -> u8;

    /// `[__y_]`
    fn y(&self) -> u8;

    /// `[___n]`
    fn n(&self) -> u8;

    /// `[__kk]`
    fn kk(&self) -> u8;

    /// `[_nnn]`
    fn nnn(&self) -> u16;
}

impl Opcode for u16 {
    fn nibbles(&self) -> (u8, u8, u8, u8) {
        ((self >> 12) as u8, self.x(), self.y(), self.n())
    }

    fn x(&self) -> u8 {
        ((self & 0x0F00) >> 8) as u8
    }

    fn y(&self) -> u8 {
        ((self & 0x00F0) >> 4) as u8
    }

    fn n(&self) -> u8 {
        (self & 0x000F) as u8
    }

    fn kk(&self) -> u8 {
        (self & 0x00FF) as u8
    }

    fn nnn(&self) -> u16 {
        self & 0x0FFF
    }
}

/// The baseline CHIP-8 instruction set, one variant per operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `0nnn` machine code routine; ignored
    Sys { nnn: u16 },
    /// `00E0`
    Cls,
    /// `00EE`
    Ret,
    /// `1nnn`
    Jp { nnn: u16 },
    /// `2nnn`
    Call { nnn: u16 },
    /// `3xkk`
    SeImm { x: u8, kk: u8 },
    /// `4xkk`
    SneImm { x: u8, kk: u8 },
    /// `5xy0`
    SeReg { x: u8, y: u8 },
    /// `6xkk`
    LdImm { x: u8, kk: u8 },
    /// `7xkk`
    AddImm { x: u8, kk: u8 },
    /// `8xy0`
    Ld { x: u8, y: u8 },
    /// `8xy1`
    Or { x: u8, y: u8 },
    /// `8xy2`
    And { x: u8, y: u8 },
    /// `8xy3`
    Xor { x: u8, y: u8 },
    /// `8xy4`
    Add { x: u8, y: u8 },
    /// `8xy5`
    Sub { x: u8, y: u8 },
    /// `8xy6`
    Shr { x: u8 },
    /// `8xy7`
    Subn { x: u8, y: u8 },
    /// `8xyE`
    Shl { x: u8 },
    /// `9xy0`
    SneReg { x: u8, y: u8 },
    /// `Annn`
    LdI { nnn: u16 },
    /// `Bnnn`
    JpV0 { nnn: u16 },
    /// `Cxkk`
    Rnd { x: u8, kk: u8 },
    /// `Dxyn`
    Drw { x: u8, y: u8, n: u8 },
    /// `Ex9E`
    Skp { x: u8 },
    /// `ExA1`
    Sknp { x: u8 },
    /// `Fx07`
    LdFromDelay { x: u8 },
    /// `Fx0A`
    LdKey { x: u8 },
    /// `Fx15`
    LdDelay { x: u8 },
    /// `Fx18`
    LdSound { x: u8 },
    /// `Fx1E`
    AddI { x: u8 },
    /// `Fx29`
    LdFont { x: u8 },
    /// `Fx33`
    Bcd { x: u8 },
    /// `Fx55`
    Store { x: u8 },
    /// `Fx65`
    Restore { x: u8 },
}

impl Instruction {
    /// `None` for bit patterns outside the instruction set
    pub fn decode(op: u16) -> Option<Instruction> {
        use Instruction::*;
        let (x, y, n, kk, nnn) = (op.x(), op.y(), op.n(), op.kk(), op.nnn());
        let i = match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Cls,
            (0x0, 0x0, 0xE, 0xE) => Ret,
            (0x0, _, _, _) => Sys { nnn },
            (0x1, _, _, _) => Jp { nnn },
            (0x2, _, _, _) => Call { nnn },
            (0x3, _, _, _) => SeImm { x, kk },
            (0x4, _, _, _) => SneImm { x, kk },
            (0x5, _, _, 0x0) => SeReg { x, y },
            (0x6, _, _, _) => LdImm { x, kk },
            (0x7, _, _, _) => AddImm { x, kk },
            (0x8, _, _, 0x0) => Ld { x, y },
            (0x8, _, _, 0x1) => Or { x, y },
            (0x8, _, _, 0x2) => And { x, y },
            (0x8, _, _, 0x3) => Xor { x, y },
            (0x8, _, _, 0x4) => Add { x, y },
            (0x8, _, _, 0x5) => Sub { x, y },
            (0x8, _, _, 0x6) => Shr { x },
            (0x8, _, _, 0x7) => Subn { x, y },
            (0x8, _, _, 0xE) => Shl { x },
            (0x9, _, _, 0x0) => SneReg { x, y },
            (0xA, _, _, _) => LdI { nnn },
            (0xB, _, _, _) => JpV0 { nnn },
            (0xC, _, _, _) => Rnd { x, kk },
            (0xD, _, _, _) => Drw { x, y, n },
            (0xE, _, 0x9, 0xE) => Skp { x },
            (0xE, _, 0xA, 0x1) => Sknp { x },
            (0xF, _, 0x0, 0x7) => LdFromDelay { x },
            (0xF, _, 0x0, 0xA) => LdKey { x },
            (0xF, _, 0x1, 0x5) => LdDelay { x },
            (0xF, _, 0x1, 0x8) => LdSound { x },
            (0xF, _, 0x1, 0xE) => AddI { x },
            (0xF, _, 0x2, 0x9) => LdFont { x },
            (0xF, _, 0x3, 0x3) => Bcd { x },
            (0xF, _, 0x5, 0x5) => Store { x },
            (0xF, _, 0x6, 0x5) => Restore { x },
            _ => return None,
        };
        Some(i)
    }

    /// whether executing this sets PC itself rather than falling through to
    /// the next instruction
    pub fn transfers_control(&self) -> bool {
        use Instruction::*;
        matches!(
            self,
            Ret | Jp { .. }
                | Call { .. }
                | JpV0 { .. }
                | SeImm { .. }
                | SneImm { .. }
                | SeReg { .. }
                | SneReg { .. }
                | Skp { .. }
                | Sknp { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nibbles() {
        let op: u16 = 0xABCD;
        assert_eq!(op.nibbles(), (0xA, 0xB, 0xC, 0xD));
        assert_eq!(op.kk(), 0xCD);
        assert_eq!(op.nnn(), 0xBCD);
    }

    #[test]
    fn test_decode_fixed_patterns() {
        assert_eq!(Instruction::decode(0x00E0), Some(Instruction::Cls));
        assert_eq!(Instruction::decode(0x00EE), Some(Instruction::Ret));
        assert_eq!(
            Instruction::decode(0x0123),
            Some(Instruction::Sys { nnn: 0x123 })
        );
    }

    #[test]
    fn test_decode_operands() {
        assert_eq!(
            Instruction::decode(0xD125),
            Some(Instruction::Drw { x: 1, y: 2, n: 5 })
        );
        assert_eq!(
            Instruction::decode(0x2ABC),
            Some(Instruction::Call { nnn: 0xABC })
        );
        assert_eq!(
            Instruction::decode(0x7F10),
            Some(Instruction::AddImm { x: 0xF, kk: 0x10 })
        );
        assert_eq!(
            Instruction::decode(0x8A5E),
            Some(Instruction::Shl { x: 0xA })
        );
        assert_eq!(
            Instruction::decode(0xF333),
            Some(Instruction::Bcd { x: 3 })
        );
    }

    #[test]
    fn test_decode_rejects_undefined() {
        for op in [
            0x5121, 0x800F, 0x8008, 0x812D, 0x9AB1, 0xE19F, 0xE0A2, 0xF000, 0xF1FF, 0xF066,
        ] {
            assert_eq!(Instruction::decode(op), None, "{:#06x}", op);
        }
    }

    #[test]
    fn test_whole_space_decodes_35_operations() {
        use std::collections::HashSet;
        let kinds: HashSet<_> = (0..=u16::MAX)
            .filter_map(Instruction::decode)
            .map(|i| std::mem::discriminant(&i))
            .collect();
        assert_eq!(kinds.len(), 35);
    }
}
