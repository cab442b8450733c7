//! # The Intcode Virtual Machine
//!
//! This crate implements an interpreter for Intcode, a tiny integer bytecode.
//! An Intcode program is a flat list of signed 64-bit integers which is both
//! the code and the data of the program: instructions read and write the same
//! address space they are fetched from.
//!
//! The machine is meant to be embedded. A *host* loads a program, pushes
//! values into the machine's input queue, runs it, and drains the output
//! queue. When the program asks for input that has not been supplied yet, the
//! machine suspends instead of failing, and the host can feed it more values
//! and resume exactly where it stopped.
//!
//! ## Index
//!
//! 1. [The Virtual Machine](./vm/index.html)
//! 2. [Parsing Program Text](./parse/index.html)
//!
//! ## Example
//!
//! ```rust
//! use intcode::vm::{Host, Machine, Status};
//!
//! // Read a value, add one to it, and write it back out.
//! let mut machine = Machine::load("3,9,1001,9,1,9,4,9,99,0").unwrap();
//! assert_eq!(machine.run(), Status::MissingInput);
//!
//! machine.push_input(41);
//! assert_eq!(machine.resume(), Status::Halted);
//! assert_eq!(machine.drain_output(), vec![42]);
//! ```
//!
//! ## Instruction Set
//!
//! Every instruction word encodes its opcode in the two low decimal digits,
//! and one addressing mode per operand in each of the digits above.
//!
//! |              | The              | Ten               | Intcode                  | Instructions  |
//! |--------------|------------------|-------------------|--------------------------|---------------|
//! | Arithmetic   | `Add` (1)        | `Multiply` (2)    | `LessThan` (7)           | `Equals` (8)  |
//! | Control Flow | `JumpIfTrue` (5) | `JumpIfFalse` (6) | `AdjustRelativeBase` (9) | `Halt` (99)   |
//! | Worldly      | `Input` (3)      | `Output` (4)      |                          |               |
//!
//! Operands are interpreted in one of three modes: *position* (the operand is
//! an address), *immediate* (the operand is the value itself), and *relative*
//! (the operand is an offset from the machine's relative base).
pub mod parse;
pub mod vm;
