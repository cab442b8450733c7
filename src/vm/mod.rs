//! # Virtual Machine Module
//!
//! This module contains all things related to the virtual machine.
//!
//! ### What is this machine?
//!
//! The Intcode machine is a von Neumann machine with a single, unbounded
//! address space of integer cells. The program is loaded into the address
//! space starting at address zero, and instructions are free to overwrite
//! themselves. Besides the program counter, the machine has one register:
//! the *relative base*, which relative-mode operands are offset from.
//!
//! ### What data can it use?
//!
//! Every cell holds a signed 64 bit integer. Memory is sparse: cells which
//! were never written read as zero, and writing far past the end of the
//! program simply creates the cell.
//!
//! ### How does it talk to the world?
//!
//! Through two queues. The `Input` instruction takes the value at the front of
//! the input queue, and the `Output` instruction appends to the output queue.
//! If the input queue is empty, the machine *suspends* with
//! [`Status::MissingInput`] and can be resumed once the host has supplied more
//! input. This is the only way the machine ever yields control.
use std::fmt;

mod core;
pub use self::core::*;

mod memory;
pub use self::memory::*;

mod interpreter;
pub use self::interpreter::*;

/// The contents of a single memory cell.
pub type Word = i64;

/// An index into the machine's address space.
///
/// Addresses are signed so that operand arithmetic can produce (and the
/// machine can reject) negative effective addresses.
pub type Address = i64;

/// The state of a machine between instructions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// The machine can execute its next instruction.
    #[default]
    Running,
    /// The program executed a `Halt` instruction.
    Halted,
    /// The machine fetched a word which is not a valid instruction.
    InvalidOpcode,
    /// An operand, or the program counter, resolved to a negative address.
    InvalidAddress,
    /// An `Input` instruction found the input queue empty. This is the only
    /// status the machine can be resumed from.
    MissingInput,
}

impl Status {
    /// Is the machine stopped for good? Terminal machines never execute
    /// another instruction.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Halted | Self::InvalidOpcode | Self::InvalidAddress)
    }

    /// Did the machine stop because of a malformed program?
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::InvalidOpcode | Self::InvalidAddress)
    }

    /// The negative result code used for this status by hosts which keep the
    /// status in the program counter. A running machine has no result code.
    pub fn code(&self) -> Option<Word> {
        match self {
            Self::Running => None,
            Self::Halted => Some(-1),
            Self::InvalidOpcode => Some(-2),
            Self::InvalidAddress => Some(-3),
            Self::MissingInput => Some(-4),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Halted => write!(f, "halted"),
            Self::InvalidOpcode => write!(f, "invalid opcode"),
            Self::InvalidAddress => write!(f, "invalid address"),
            Self::MissingInput => write!(f, "waiting for input"),
        }
    }
}

/// An error caused by a host using a machine out of contract.
///
/// Problems with the *program* are never reported this way; they stop the
/// machine with a [`Status`] instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The host tried to read or write a negative address.
    NegativeAddress(Address),
    /// The host asked for a dense dump of memory which extends too far to
    /// list. The highest written address is given.
    TooSparseToDump(Address),
    /// A scripted machine was fed a value it did not expect.
    ScriptMismatch {
        step: usize,
        expected: Word,
        found: Word,
    },
    /// A scripted machine was abandoned before its script was played out.
    ScriptIncomplete { remaining: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NegativeAddress(address) => {
                write!(f, "address {address} is negative")
            }
            Self::TooSparseToDump(highest) => {
                write!(f, "memory extends to address {highest}, too far to dump")
            }
            Self::ScriptMismatch {
                step,
                expected,
                found,
            } => write!(
                f,
                "script step #{step} expected input {expected}, but got {found}"
            ),
            Self::ScriptIncomplete { remaining } => {
                write!(f, "script has {remaining} step(s) left to play")
            }
        }
    }
}

impl std::error::Error for Error {}
