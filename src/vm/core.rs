//! The instruction set of the virtual machine is defined here.
//!
//! An instruction word packs an opcode and up to three addressing modes into
//! a single decimal number:
//!
//! ```text
//!   ABCDE
//!   | | |
//!   | | +--- DE: the opcode
//!   | +----- C:  the mode of the first operand
//!   +------- A, B: the modes of the third and second operands
//! ```
//!
//! Leading zeroes are dropped, so a missing mode digit means position mode.
use super::{Address, Word};
use std::fmt;

/// An individual virtual machine opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Store the sum of the first two operands in the third.
    Add,
    /// Store the product of the first two operands in the third.
    Multiply,
    /// Take a value from the input queue and store it in the operand.
    Input,
    /// Append the operand to the output queue.
    Output,
    /// Jump to the second operand if the first is non-zero.
    JumpIfTrue,
    /// Jump to the second operand if the first is zero.
    JumpIfFalse,
    /// Store 1 in the third operand if the first is less than the second,
    /// otherwise store 0.
    LessThan,
    /// Store 1 in the third operand if the first two are equal, otherwise
    /// store 0.
    Equals,
    /// Add the operand to the relative base.
    AdjustRelativeBase,
    /// Stop the machine.
    Halt,
}

impl Opcode {
    /// Get the opcode with the given numeric code, if there is one.
    pub fn from_code(code: Word) -> Option<Self> {
        Some(match code {
            1 => Self::Add,
            2 => Self::Multiply,
            3 => Self::Input,
            4 => Self::Output,
            5 => Self::JumpIfTrue,
            6 => Self::JumpIfFalse,
            7 => Self::LessThan,
            8 => Self::Equals,
            9 => Self::AdjustRelativeBase,
            99 => Self::Halt,
            _ => return None,
        })
    }

    /// The numeric code of the opcode.
    pub fn code(&self) -> Word {
        match self {
            Self::Add => 1,
            Self::Multiply => 2,
            Self::Input => 3,
            Self::Output => 4,
            Self::JumpIfTrue => 5,
            Self::JumpIfFalse => 6,
            Self::LessThan => 7,
            Self::Equals => 8,
            Self::AdjustRelativeBase => 9,
            Self::Halt => 99,
        }
    }

    /// The number of operands the instruction takes.
    pub fn arity(&self) -> usize {
        match self {
            Self::Add | Self::Multiply | Self::LessThan | Self::Equals => 3,
            Self::JumpIfTrue | Self::JumpIfFalse => 2,
            Self::Input | Self::Output | Self::AdjustRelativeBase => 1,
            Self::Halt => 0,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Add => write!(f, "ADD"),
            Self::Multiply => write!(f, "MUL"),
            Self::Input => write!(f, "IN"),
            Self::Output => write!(f, "OUT"),
            Self::JumpIfTrue => write!(f, "JNZ"),
            Self::JumpIfFalse => write!(f, "JZ"),
            Self::LessThan => write!(f, "LT"),
            Self::Equals => write!(f, "EQ"),
            Self::AdjustRelativeBase => write!(f, "RBO"),
            Self::Halt => write!(f, "HALT"),
        }
    }
}

/// How an operand is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// The operand is the address of the value.
    Position,
    /// The operand is the value.
    Immediate,
    /// The operand is an offset from the relative base to the address of the value.
    Relative,
    /// The instruction has no operand in this position.
    NoArgument,
}

impl Mode {
    /// Get the mode with the given digit, if there is one.
    pub fn from_digit(digit: Word) -> Option<Self> {
        match digit {
            0 => Some(Self::Position),
            1 => Some(Self::Immediate),
            2 => Some(Self::Relative),
            _ => None,
        }
    }

    /// Format an operand word in this mode, the way the disassembler prints it.
    pub fn fmt_operand(&self, f: &mut fmt::Formatter, operand: Word) -> fmt::Result {
        match self {
            Self::Position => write!(f, "{operand}"),
            Self::Immediate => write!(f, "#{operand}"),
            Self::Relative => write!(f, "@{operand}"),
            Self::NoArgument => Ok(()),
        }
    }
}

/// A decoded instruction word: an opcode, and a mode for each operand slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub opcode: Opcode,
    pub modes: [Mode; 3],
}

impl Instruction {
    /// The number of words the instruction occupies, including its operands.
    pub fn width(&self) -> Address {
        1 + self.opcode.arity() as Address
    }

    /// Attach the instruction's operand words, for display.
    pub fn with_operands<'a>(&'a self, operands: &'a [Word]) -> Listing<'a> {
        Listing {
            instruction: self,
            operands,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for (i, mode) in self.modes[..self.opcode.arity()].iter().enumerate() {
            let sigil = match mode {
                Mode::Position => "pos",
                Mode::Immediate => "imm",
                Mode::Relative => "rel",
                Mode::NoArgument => continue,
            };
            write!(f, "{}{sigil}", if i == 0 { " " } else { ", " })?;
        }
        Ok(())
    }
}

/// An instruction together with its operand words, as it appears in a
/// disassembly listing.
pub struct Listing<'a> {
    instruction: &'a Instruction,
    operands: &'a [Word],
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.instruction.opcode)?;
        let modes = &self.instruction.modes[..self.instruction.opcode.arity()];
        for (i, (mode, operand)) in modes.iter().zip(self.operands).enumerate() {
            write!(f, "{}", if i == 0 { " " } else { ", " })?;
            mode.fmt_operand(f, *operand)?;
        }
        Ok(())
    }
}

/// Why a word could not be decoded as an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The two low digits are not a known opcode.
    UnknownOpcode(Word),
    /// A used operand slot has a mode digit other than 0, 1, or 2.
    UnknownMode { word: Word, operand: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnknownOpcode(word) => write!(f, "{word} is not a valid opcode"),
            Self::UnknownMode { word, operand } => {
                write!(f, "{word} has an invalid mode for operand #{operand}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decode an instruction word into its opcode and operand modes.
///
/// Operand slots past the opcode's arity decode to [`Mode::NoArgument`],
/// regardless of what digits the word has there.
pub fn decode(word: Word) -> Result<Instruction, DecodeError> {
    if word < 0 {
        return Err(DecodeError::UnknownOpcode(word));
    }
    let opcode = Opcode::from_code(word % 100).ok_or(DecodeError::UnknownOpcode(word))?;

    let mut modes = [Mode::NoArgument; 3];
    let mut place = 100;
    for (i, mode) in modes.iter_mut().enumerate().take(opcode.arity()) {
        *mode = Mode::from_digit((word / place) % 10)
            .ok_or(DecodeError::UnknownMode { word, operand: i + 1 })?;
        place *= 10;
    }

    Ok(Instruction { opcode, modes })
}

/// Walk a program from address zero, decoding each instruction and skipping
/// over its operands. Words that do not decode are reported and skipped one
/// at a time.
///
/// This is a linear sweep: data placed between instructions will be decoded
/// as if it were code.
pub fn disassemble(program: &[Word]) -> Vec<(Address, Result<Instruction, DecodeError>)> {
    let mut result = vec![];
    let mut i = 0;
    while i < program.len() {
        let decoded = decode(program[i]);
        let width = match &decoded {
            Ok(instruction) => instruction.width() as usize,
            Err(_) => 1,
        };
        result.push((i as Address, decoded));
        i += width;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use Mode::*;

    fn modes(word: Word) -> [Mode; 3] {
        decode(word).unwrap().modes
    }

    #[test]
    fn test_decode_opcodes() {
        assert_eq!(decode(1).unwrap().opcode, Opcode::Add);
        assert_eq!(decode(2).unwrap().opcode, Opcode::Multiply);
        assert_eq!(decode(3).unwrap().opcode, Opcode::Input);
        assert_eq!(decode(4).unwrap().opcode, Opcode::Output);
        assert_eq!(decode(5).unwrap().opcode, Opcode::JumpIfTrue);
        assert_eq!(decode(6).unwrap().opcode, Opcode::JumpIfFalse);
        assert_eq!(decode(7).unwrap().opcode, Opcode::LessThan);
        assert_eq!(decode(8).unwrap().opcode, Opcode::Equals);
        assert_eq!(decode(9).unwrap().opcode, Opcode::AdjustRelativeBase);
        assert_eq!(decode(99).unwrap().opcode, Opcode::Halt);
    }

    #[test]
    fn test_decode_unused_slots() {
        assert_eq!(modes(1), [Position, Position, Position]);
        assert_eq!(modes(3), [Position, NoArgument, NoArgument]);
        assert_eq!(modes(4), [Position, NoArgument, NoArgument]);
        assert_eq!(modes(1105), [Immediate, Immediate, NoArgument]);
        assert_eq!(modes(99), [NoArgument, NoArgument, NoArgument]);
        // Digits above the arity are ignored.
        assert_eq!(modes(99999), [NoArgument, NoArgument, NoArgument]);
    }

    #[test]
    fn test_decode_modes() {
        assert_eq!(modes(101), [Immediate, Position, Position]);
        assert_eq!(modes(1101), [Immediate, Immediate, Position]);
        assert_eq!(modes(1001), [Position, Immediate, Position]);
        assert_eq!(modes(11001), [Position, Immediate, Immediate]);
        assert_eq!(modes(10001), [Position, Position, Immediate]);
        assert_eq!(modes(10101), [Immediate, Position, Immediate]);
        assert_eq!(modes(11101), [Immediate, Immediate, Immediate]);
        assert_eq!(modes(22201), [Relative, Relative, Relative]);
        assert_eq!(modes(204), [Relative, NoArgument, NoArgument]);
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode(0), Err(DecodeError::UnknownOpcode(0)));
        assert_eq!(decode(42), Err(DecodeError::UnknownOpcode(42)));
        assert_eq!(decode(98), Err(DecodeError::UnknownOpcode(98)));
        assert_eq!(decode(-1), Err(DecodeError::UnknownOpcode(-1)));
        assert_eq!(
            decode(301),
            Err(DecodeError::UnknownMode {
                word: 301,
                operand: 1
            })
        );
        assert_eq!(
            decode(90001),
            Err(DecodeError::UnknownMode {
                word: 90001,
                operand: 3
            })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(decode(1001).unwrap().to_string(), "ADD pos, imm, pos");
        assert_eq!(decode(99).unwrap().to_string(), "HALT");

        let add = decode(21101).unwrap();
        assert_eq!(add.with_operands(&[5, 23, 7]).to_string(), "ADD #5, #23, @7");
        let out = decode(204).unwrap();
        assert_eq!(out.with_operands(&[-34]).to_string(), "OUT @-34");
    }

    #[test]
    fn test_disassemble() {
        let listing = disassemble(&[1101, 5, 23, 0, 42, 104, 7, 99]);
        let addresses: Vec<Address> = listing.iter().map(|(at, _)| *at).collect();
        assert_eq!(addresses, vec![0, 4, 5, 7]);
        assert_eq!(listing[1].1, Err(DecodeError::UnknownOpcode(42)));
        assert_eq!(listing[2].1.unwrap().opcode, Opcode::Output);
        assert_eq!(listing[3].1.unwrap().opcode, Opcode::Halt);
    }
}
