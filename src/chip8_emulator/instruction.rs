use std::fmt::{Display, Formatter};

/// One decoded CHIP-8 instruction. Register operands are indexes into V0-VF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 0nnn: machine-code routine on the original hardware; ignored here.
    Sys(u16),
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1nnn
    Jump(u16),
    /// 2nnn
    Call(u16),
    /// 3xnn
    SkipEqImm { x: usize, nn: u8 },
    /// 4xnn
    SkipNeImm { x: usize, nn: u8 },
    /// 5xy0
    SkipEqReg { x: usize, y: usize },
    /// 6xnn
    LoadImm { x: usize, nn: u8 },
    /// 7xnn
    AddImm { x: usize, nn: u8 },
    /// 8xy0
    Move { x: usize, y: usize },
    /// 8xy1
    Or { x: usize, y: usize },
    /// 8xy2
    And { x: usize, y: usize },
    /// 8xy3
    Xor { x: usize, y: usize },
    /// 8xy4
    AddReg { x: usize, y: usize },
    /// 8xy5
    Sub { x: usize, y: usize },
    /// 8xy6
    ShiftRight { x: usize, y: usize },
    /// 8xy7
    SubReversed { x: usize, y: usize },
    /// 8xyE
    ShiftLeft { x: usize, y: usize },
    /// 9xy0
    SkipNeReg { x: usize, y: usize },
    /// Annn
    LoadIndex(u16),
    /// Bnnn
    JumpOffset(u16),
    /// Cxnn
    Random { x: usize, nn: u8 },
    /// Dxyn
    Draw { x: usize, y: usize, n: u8 },
    /// Ex9E
    SkipKeyDown { x: usize },
    /// ExA1
    SkipKeyUp { x: usize },
    /// Fx07
    LoadDelay { x: usize },
    /// Fx0A
    WaitKey { x: usize },
    /// Fx15
    SetDelay { x: usize },
    /// Fx18
    SetSound { x: usize },
    /// Fx1E
    AddIndex { x: usize },
    /// Fx29
    LoadGlyph { x: usize },
    /// Fx33
    StoreBcd { x: usize },
    /// Fx55
    StoreRegisters { x: usize },
    /// Fx65
    LoadRegisters { x: usize },
}

fn x_register_index(opcode: u16) -> usize {
    ((opcode & 0x0F00) >> 8) as usize
}

fn y_register_index(opcode: u16) -> usize {
    ((opcode & 0x00F0) >> 4) as usize
}

fn address_nnn(opcode: u16) -> u16 {
    opcode & 0x0FFF
}

fn byte_nn(opcode: u16) -> u8 {
    (opcode & 0x00FF) as u8
}

fn nibble_n(opcode: u16) -> u8 {
    (opcode & 0x000F) as u8
}

/// Decodes an opcode, returning `None` for words outside the instruction set.
pub fn decode(opcode: u16) -> Option<Instruction> {
    use Instruction::*;

    let x = x_register_index(opcode);
    let y = y_register_index(opcode);
    let nnn = address_nnn(opcode);
    let nn = byte_nn(opcode);
    let n = nibble_n(opcode);

    let instruction = match opcode >> 12 {
        0x0 => match opcode {
            0x00E0 => ClearScreen,
            0x00EE => Return,
            _ => Sys(nnn),
        },
        0x1 => Jump(nnn),
        0x2 => Call(nnn),
        0x3 => SkipEqImm { x, nn },
        0x4 => SkipNeImm { x, nn },
        0x5 if n == 0 => SkipEqReg { x, y },
        0x6 => LoadImm { x, nn },
        0x7 => AddImm { x, nn },
        0x8 => match n {
            0x0 => Move { x, y },
            0x1 => Or { x, y },
            0x2 => And { x, y },
            0x3 => Xor { x, y },
            0x4 => AddReg { x, y },
            0x5 => Sub { x, y },
            0x6 => ShiftRight { x, y },
            0x7 => SubReversed { x, y },
            0xE => ShiftLeft { x, y },
            _ => return None,
        },
        0x9 if n == 0 => SkipNeReg { x, y },
        0xA => LoadIndex(nnn),
        0xB => JumpOffset(nnn),
        0xC => Random { x, nn },
        0xD => Draw { x, y, n },
        0xE => match nn {
            0x9E => SkipKeyDown { x },
            0xA1 => SkipKeyUp { x },
            _ => return None,
        },
        0xF => match nn {
            0x07 => LoadDelay { x },
            0x0A => WaitKey { x },
            0x15 => SetDelay { x },
            0x18 => SetSound { x },
            0x1E => AddIndex { x },
            0x29 => LoadGlyph { x },
            0x33 => StoreBcd { x },
            0x55 => StoreRegisters { x },
            0x65 => LoadRegisters { x },
            _ => return None,
        },
        _ => return None,
    };

    Some(instruction)
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use Instruction::*;

        match *self {
            Sys(nnn) => write!(f, "SYS 0x{nnn:03X}"),
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(nnn) => write!(f, "JP 0x{nnn:03X}"),
            Call(nnn) => write!(f, "CALL 0x{nnn:03X}"),
            SkipEqImm { x, nn } => write!(f, "SE V{x:X}, 0x{nn:02X}"),
            SkipNeImm { x, nn } => write!(f, "SNE V{x:X}, 0x{nn:02X}"),
            SkipEqReg { x, y } => write!(f, "SE V{x:X}, V{y:X}"),
            LoadImm { x, nn } => write!(f, "LD V{x:X}, 0x{nn:02X}"),
            AddImm { x, nn } => write!(f, "ADD V{x:X}, 0x{nn:02X}"),
            Move { x, y } => write!(f, "LD V{x:X}, V{y:X}"),
            Or { x, y } => write!(f, "OR V{x:X}, V{y:X}"),
            And { x, y } => write!(f, "AND V{x:X}, V{y:X}"),
            Xor { x, y } => write!(f, "XOR V{x:X}, V{y:X}"),
            AddReg { x, y } => write!(f, "ADD V{x:X}, V{y:X}"),
            Sub { x, y } => write!(f, "SUB V{x:X}, V{y:X}"),
            ShiftRight { x, y } => write!(f, "SHR V{x:X}, V{y:X}"),
            SubReversed { x, y } => write!(f, "SUBN V{x:X}, V{y:X}"),
            ShiftLeft { x, y } => write!(f, "SHL V{x:X}, V{y:X}"),
            SkipNeReg { x, y } => write!(f, "SNE V{x:X}, V{y:X}"),
            LoadIndex(nnn) => write!(f, "LD I, 0x{nnn:03X}"),
            JumpOffset(nnn) => write!(f, "JP V0, 0x{nnn:03X}"),
            Random { x, nn } => write!(f, "RND V{x:X}, 0x{nn:02X}"),
            Draw { x, y, n } => write!(f, "DRW V{x:X}, V{y:X}, {n}"),
            SkipKeyDown { x } => write!(f, "SKP V{x:X}"),
            SkipKeyUp { x } => write!(f, "SKNP V{x:X}"),
            LoadDelay { x } => write!(f, "LD V{x:X}, DT"),
            WaitKey { x } => write!(f, "LD V{x:X}, K"),
            SetDelay { x } => write!(f, "LD DT, V{x:X}"),
            SetSound { x } => write!(f, "LD ST, V{x:X}"),
            AddIndex { x } => write!(f, "ADD I, V{x:X}"),
            LoadGlyph { x } => write!(f, "LD F, V{x:X}"),
            StoreBcd { x } => write!(f, "LD B, V{x:X}"),
            StoreRegisters { x } => write!(f, "LD [I], V{x:X}"),
            LoadRegisters { x } => write!(f, "LD V{x:X}, [I]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_operand_fields() {
        assert_eq!(decode(0xD125), Some(Instruction::Draw { x: 1, y: 2, n: 5 }));
        assert_eq!(decode(0x3A42), Some(Instruction::SkipEqImm { x: 0xA, nn: 0x42 }));
        assert_eq!(decode(0xB123), Some(Instruction::JumpOffset(0x123)));
        assert_eq!(decode(0xFE65), Some(Instruction::LoadRegisters { x: 0xE }));
    }

    #[test]
    fn family_zero_splits_into_cls_ret_and_sys() {
        assert_eq!(decode(0x00E0), Some(Instruction::ClearScreen));
        assert_eq!(decode(0x00EE), Some(Instruction::Return));
        assert_eq!(decode(0x0123), Some(Instruction::Sys(0x123)));
    }

    #[test]
    fn undefined_sub_opcodes_do_not_decode() {
        for opcode in [0x5121, 0x8128, 0x812F, 0x9123, 0xE19F, 0xF100, 0xF1FF] {
            assert_eq!(decode(opcode), None, "0x{opcode:04X}");
        }
    }

    #[test]
    fn every_defined_word_in_family_eight_decodes() {
        let defined = [0x0, 0x1, 0x2, 0x3, 0x4, 0x5, 0x6, 0x7, 0xE];
        for n in 0..=0xFu16 {
            assert_eq!(decode(0x8AB0 | n).is_some(), defined.contains(&n));
        }
    }

    #[test]
    fn mnemonics_use_assembler_syntax() {
        assert_eq!(decode(0xF155).unwrap().to_string(), "LD [I], V1");
        assert_eq!(decode(0xF10A).unwrap().to_string(), "LD V1, K");
        assert_eq!(decode(0xD125).unwrap().to_string(), "DRW V1, V2, 5");
        assert_eq!(decode(0xA2F0).unwrap().to_string(), "LD I, 0x2F0");
        assert_eq!(decode(0x8C4E).unwrap().to_string(), "SHL VC, V4");
    }
}
