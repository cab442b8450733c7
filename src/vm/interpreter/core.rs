//! # Machine Module
//!
//! This module implements the interpreter itself: the program store, the
//! registers, and the fetch / decode / dispatch loop.
use crate::{
    parse::{parse_program, ParseError},
    vm::{
        decode, Address, DecodeError, Error, Host, Memory, Mode, Opcode, OutOfBounds, Status, Word,
    },
};

use log::{debug, trace, warn};
use std::{collections::VecDeque, str::FromStr};

/// A program being executed, together with all of the machine's state.
///
/// Cloning a machine copies everything: memory, registers, and both queues.
/// The copy runs independently of the machine it was cloned from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Machine {
    /// The address space, holding both code and data.
    memory: Memory,
    /// The address of the next instruction.
    pc: Address,
    /// The relative base, which relative mode operands are offset from.
    base: Address,
    /// The address of the `Input` instruction the machine suspended on.
    resume_point: Address,
    /// Why the machine stopped, if it did.
    status: Status,
    /// Values waiting to be read by `Input` instructions.
    input: VecDeque<Word>,
    /// Values written by `Output` instructions.
    output: Vec<Word>,
}

/// Why an instruction could not be executed.
enum Fault {
    InvalidOpcode,
    InvalidAddress,
}

impl From<OutOfBounds> for Fault {
    fn from(_: OutOfBounds) -> Self {
        Self::InvalidAddress
    }
}

impl From<DecodeError> for Fault {
    fn from(_: DecodeError) -> Self {
        Self::InvalidOpcode
    }
}

impl From<Fault> for Status {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::InvalidOpcode => Status::InvalidOpcode,
            Fault::InvalidAddress => Status::InvalidAddress,
        }
    }
}

impl FromStr for Machine {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::load(text)
    }
}

impl Machine {
    /// Create a machine with the given program loaded at address zero.
    pub fn new(program: impl IntoIterator<Item = Word>) -> Self {
        Self {
            memory: Memory::new(program),
            ..Self::default()
        }
    }

    /// Parse program text and load it into a new machine.
    pub fn load(text: &str) -> Result<Self, ParseError> {
        let program = parse_program(text)?;
        debug!("Loaded program of {} words", program.len());
        Ok(Self::new(program))
    }

    /// The address of the next instruction to execute.
    pub fn pc(&self) -> Address {
        self.pc
    }

    /// The relative base register.
    pub fn base(&self) -> Address {
        self.base
    }

    /// Overwrite the relative base register.
    pub fn set_base(&mut self, base: Address) {
        self.base = base
    }

    /// The address execution continues from when the machine is resumed.
    pub fn resume_point(&self) -> Address {
        self.resume_point
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Read a memory cell from outside the machine.
    pub fn peek(&self, address: Address) -> Result<Word, Error> {
        self.memory
            .read(address)
            .map_err(|OutOfBounds(address)| Error::NegativeAddress(address))
    }

    /// Write a memory cell from outside the machine. This is how hosts patch
    /// parameters into a program before running it.
    pub fn poke(&mut self, address: Address, value: Word) -> Result<(), Error> {
        self.memory
            .write(address, value)
            .map_err(|OutOfBounds(address)| Error::NegativeAddress(address))
    }

    /// Copy the memory out as a list, from address zero up to the highest
    /// written address. Memory written further out than
    /// [`DUMP_LIMIT`](crate::vm::DUMP_LIMIT) can't be dumped this way; use
    /// [`Memory::cells`] instead.
    pub fn dump(&self) -> Result<Vec<Word>, Error> {
        self.memory
            .dump()
            .ok_or_else(|| Error::TooSparseToDump(self.memory.highest().unwrap_or(0)))
    }

    /// Run until the machine halts, faults, or needs input.
    ///
    /// A machine which is not running is left as it is: in particular, a
    /// suspended machine stays suspended until it is [resumed](Self::resume).
    pub fn run(&mut self) -> Status {
        while self.step() == Status::Running {}

        if self.status.is_fault() {
            warn!("Machine stopped with {} at address {}", self.status, self.pc);
        } else {
            trace!("Machine stopped with {} at address {}", self.status, self.pc);
        }
        self.status
    }

    /// Continue a machine which suspended for input, then run it.
    pub fn resume(&mut self) -> Status {
        if self.status == Status::MissingInput {
            trace!("Resuming at address {}", self.resume_point);
            self.pc = self.resume_point;
            self.status = Status::Running;
        }
        self.run()
    }

    /// Execute a single instruction, and return the status afterwards.
    pub fn step(&mut self) -> Status {
        if self.status == Status::Running {
            self.status = match self.execute() {
                Ok(status) => status,
                Err(fault) => fault.into(),
            };
        }
        self.status
    }

    /// The address of the `i`th word of the current instruction.
    fn operand_address(&self, i: Address) -> Result<Address, Fault> {
        self.pc.checked_add(i).ok_or(Fault::InvalidAddress)
    }

    /// Resolve the `i`th operand of the current instruction to the address
    /// of the cell it refers to. Immediate operands refer to their own cell.
    fn resolve(&self, i: Address, mode: Mode) -> Result<Address, Fault> {
        let at = self.operand_address(i)?;
        let address = match mode {
            Mode::Position => self.memory.read(at)?,
            Mode::Immediate => at,
            Mode::Relative => self
                .memory
                .read(at)?
                .checked_add(self.base)
                .ok_or(Fault::InvalidAddress)?,
            Mode::NoArgument => return Err(Fault::InvalidOpcode),
        };
        if address < 0 {
            return Err(Fault::InvalidAddress);
        }
        Ok(address)
    }

    /// Get the value of the `i`th operand of the current instruction.
    fn value(&self, i: Address, mode: Mode) -> Result<Word, Fault> {
        Ok(self.memory.read(self.resolve(i, mode)?)?)
    }

    fn store(&mut self, address: Address, value: Word) -> Result<(), Fault> {
        Ok(self.memory.write(address, value)?)
    }

    /// Move the program counter past the current instruction.
    fn advance(&mut self, width: Address) -> Result<(), Fault> {
        self.pc = self.operand_address(width)?;
        Ok(())
    }

    /// Execute the instruction at the program counter.
    ///
    /// Every operand is resolved before anything is written, so an
    /// instruction which faults leaves memory and the queues untouched.
    fn execute(&mut self) -> Result<Status, Fault> {
        let instruction = decode(self.memory.read(self.pc)?)?;
        let [a, b, c] = instruction.modes;

        match instruction.opcode {
            Opcode::Add => {
                let (x, y, dst) = (self.value(1, a)?, self.value(2, b)?, self.resolve(3, c)?);
                self.store(dst, x.wrapping_add(y))?;
                self.advance(4)?;
            }
            Opcode::Multiply => {
                let (x, y, dst) = (self.value(1, a)?, self.value(2, b)?, self.resolve(3, c)?);
                self.store(dst, x.wrapping_mul(y))?;
                self.advance(4)?;
            }
            Opcode::Input => {
                if self.input.is_empty() {
                    self.resume_point = self.pc;
                    return Ok(Status::MissingInput);
                }
                let dst = self.resolve(1, a)?;
                if let Some(value) = self.input.pop_front() {
                    self.store(dst, value)?;
                }
                self.advance(2)?;
            }
            Opcode::Output => {
                let value = self.value(1, a)?;
                self.output.push(value);
                self.advance(2)?;
            }
            Opcode::JumpIfTrue => {
                let (test, target) = (self.value(1, a)?, self.value(2, b)?);
                if test != 0 {
                    self.pc = target;
                } else {
                    self.advance(3)?;
                }
            }
            Opcode::JumpIfFalse => {
                let (test, target) = (self.value(1, a)?, self.value(2, b)?);
                if test == 0 {
                    self.pc = target;
                } else {
                    self.advance(3)?;
                }
            }
            Opcode::LessThan => {
                let (x, y, dst) = (self.value(1, a)?, self.value(2, b)?, self.resolve(3, c)?);
                self.store(dst, Word::from(x < y))?;
                self.advance(4)?;
            }
            Opcode::Equals => {
                let (x, y, dst) = (self.value(1, a)?, self.value(2, b)?, self.resolve(3, c)?);
                self.store(dst, Word::from(x == y))?;
                self.advance(4)?;
            }
            Opcode::AdjustRelativeBase => {
                let offset = self.value(1, a)?;
                self.base = self.base.wrapping_add(offset);
                self.advance(2)?;
            }
            Opcode::Halt => return Ok(Status::Halted),
        }
        Ok(Status::Running)
    }
}

/// Make the machine usable wherever a host expects a live or scripted program.
impl Host for Machine {
    fn run(&mut self) -> Status {
        Machine::run(self)
    }

    fn resume(&mut self) -> Status {
        Machine::resume(self)
    }

    fn status(&self) -> Status {
        self.status
    }

    fn pc(&self) -> Address {
        self.pc
    }

    fn input(&self) -> &VecDeque<Word> {
        &self.input
    }

    fn input_mut(&mut self) -> &mut VecDeque<Word> {
        &mut self.input
    }

    fn output(&self) -> &[Word] {
        &self.output
    }

    fn output_mut(&mut self) -> &mut Vec<Word> {
        &mut self.output
    }
}
