//! # The Interpreter Module
//!
//! This module implements the machine which runs Intcode programs, and the
//! `Host` trait: the one interface that code driving a machine is written
//! against. Two things implement it. A [`Machine`] actually executes a
//! program. A [`ScriptedMachine`] plays back a fixed conversation without any
//! bytecode at all, so that the logic of a host can be tested against
//! predicted input and canned output. [`Intcode`] wraps either one, for hosts
//! which decide at runtime which of the two they drive.
use crate::vm::{Address, Error, Status, Word};

mod core;
pub use self::core::*;

use ::std::collections::VecDeque;
use log::warn;

/// Something a host can feed input to, run, and read output from.
///
/// The required methods are the whole capability set of a machine as seen
/// from outside: running it, resuming it after it suspended for input, and
/// inspecting its registers and queues.
pub trait Host {
    /// Run until the program halts, faults, or needs input.
    fn run(&mut self) -> Status;
    /// Continue after a [`Status::MissingInput`] suspension.
    fn resume(&mut self) -> Status;

    fn status(&self) -> Status;
    fn pc(&self) -> Address;

    fn input(&self) -> &VecDeque<Word>;
    fn input_mut(&mut self) -> &mut VecDeque<Word>;
    fn output(&self) -> &[Word];
    fn output_mut(&mut self) -> &mut Vec<Word>;

    /// Queue a value for the program to read.
    fn push_input(&mut self, value: Word) {
        self.input_mut().push_back(value)
    }

    /// Queue several values for the program to read, in order.
    fn extend_input(&mut self, values: impl IntoIterator<Item = Word>)
    where
        Self: Sized,
    {
        self.input_mut().extend(values)
    }

    /// Queue the characters of some text, one value per byte.
    fn push_ascii(&mut self, text: &str) {
        self.input_mut().extend(text.bytes().map(Word::from))
    }

    /// Take everything the program has written so far, leaving the output
    /// queue empty.
    fn drain_output(&mut self) -> Vec<Word> {
        ::std::mem::take(self.output_mut())
    }

    /// Get the output as text. Values which are not characters are skipped.
    fn output_ascii(&self) -> String {
        self.output()
            .iter()
            .filter_map(|&value| u32::try_from(value).ok().and_then(char::from_u32))
            .collect()
    }
}

/// One step of the conversation a [`ScriptedMachine`] plays back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Write these values to the output queue.
    Emit(Vec<Word>),
    /// Read one value, which must be the given one.
    Expect(Word),
    /// Read one value, whatever it is.
    Accept,
    /// Stop the machine.
    Halt,
}

/// A stand-in for a machine, used for testing hosts.
///
/// It is programmed with a script instead of bytecode. Running it walks the
/// script: emitted values are written to the output queue, and expected
/// values are read from the input queue. When the input queue runs dry it
/// suspends, exactly like a real machine would. If the host feeds it a value
/// it didn't expect, it stops with [`Status::InvalidOpcode`] and remembers
/// the mismatch, which [`ScriptedMachine::verify`] reports.
///
/// ```rust
/// use intcode::vm::{Host, ScriptedMachine, Status};
///
/// let mut mock = ScriptedMachine::new().emit([7]).expect(1).emit([0, 1]);
/// assert_eq!(mock.run(), Status::MissingInput);
/// assert_eq!(mock.drain_output(), vec![7]);
///
/// mock.push_input(1);
/// assert_eq!(mock.resume(), Status::Halted);
/// assert_eq!(mock.drain_output(), vec![0, 1]);
/// assert!(mock.verify().is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptedMachine {
    script: Vec<Step>,
    /// The index of the next step to play.
    cursor: usize,
    /// The step to continue from after a suspension.
    resume_point: usize,
    status: Status,
    /// The first unexpected input the machine was fed.
    mismatch: Option<Error>,
    input: VecDeque<Word>,
    output: Vec<Word>,
}

impl ScriptedMachine {
    /// Create a machine with an empty script. Running it halts immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a machine which plays the given steps.
    pub fn with_script(script: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Add a step to the end of the script.
    pub fn then(mut self, step: Step) -> Self {
        self.script.push(step);
        self
    }

    pub fn emit(self, values: impl IntoIterator<Item = Word>) -> Self {
        self.then(Step::Emit(values.into_iter().collect()))
    }

    /// Emit the characters of some text, one value per byte.
    pub fn emit_ascii(self, text: &str) -> Self {
        self.emit(text.bytes().map(Word::from))
    }

    pub fn expect(self, value: Word) -> Self {
        self.then(Step::Expect(value))
    }

    /// Expect each of the values, in order.
    pub fn expect_all(self, values: impl IntoIterator<Item = Word>) -> Self {
        values.into_iter().fold(self, Self::expect)
    }

    pub fn accept(self) -> Self {
        self.then(Step::Accept)
    }

    pub fn halt(self) -> Self {
        self.then(Step::Halt)
    }

    /// The steps which have not been played yet.
    pub fn remaining(&self) -> &[Step] {
        &self.script[self.cursor.min(self.script.len())..]
    }

    /// Check that the host held up its end of the conversation: every input
    /// was the expected one, and the whole script was played.
    pub fn verify(&self) -> Result<(), Error> {
        if let Some(mismatch) = &self.mismatch {
            return Err(mismatch.clone());
        }
        match self.remaining().len() {
            0 => Ok(()),
            remaining => Err(Error::ScriptIncomplete { remaining }),
        }
    }

    /// Play the script until it ends, halts, or needs input.
    pub fn run(&mut self) -> Status {
        while self.status == Status::Running {
            self.status = match self.script.get(self.cursor) {
                None => Status::Halted,
                Some(Step::Halt) => {
                    self.cursor += 1;
                    Status::Halted
                }
                Some(Step::Emit(values)) => {
                    self.output.extend(values);
                    self.cursor += 1;
                    Status::Running
                }
                Some(Step::Expect(expected)) => match self.input.pop_front() {
                    None => {
                        self.resume_point = self.cursor;
                        Status::MissingInput
                    }
                    Some(found) if found == *expected => {
                        self.cursor += 1;
                        Status::Running
                    }
                    Some(found) => {
                        warn!("Scripted machine expected input {expected}, but got {found}");
                        self.mismatch = Some(Error::ScriptMismatch {
                            step: self.cursor,
                            expected: *expected,
                            found,
                        });
                        Status::InvalidOpcode
                    }
                },
                Some(Step::Accept) => match self.input.pop_front() {
                    None => {
                        self.resume_point = self.cursor;
                        Status::MissingInput
                    }
                    Some(_) => {
                        self.cursor += 1;
                        Status::Running
                    }
                },
            };
        }
        self.status
    }

    pub fn resume(&mut self) -> Status {
        if self.status == Status::MissingInput {
            self.cursor = self.resume_point;
            self.status = Status::Running;
        }
        self.run()
    }
}

impl Host for ScriptedMachine {
    fn run(&mut self) -> Status {
        ScriptedMachine::run(self)
    }

    fn resume(&mut self) -> Status {
        ScriptedMachine::resume(self)
    }

    fn status(&self) -> Status {
        self.status
    }

    /// The index of the next step, standing in for a program counter.
    fn pc(&self) -> Address {
        self.cursor as Address
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

/// Either a live machine or a scripted one.
///
/// Hosts which must work with both store this instead of being generic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intcode {
    Live(Machine),
    Scripted(ScriptedMachine),
}

impl From<Machine> for Intcode {
    fn from(machine: Machine) -> Self {
        Self::Live(machine)
    }
}

impl From<ScriptedMachine> for Intcode {
    fn from(machine: ScriptedMachine) -> Self {
        Self::Scripted(machine)
    }
}

impl Intcode {
    /// The live machine, if this is one.
    pub fn as_live(&self) -> Option<&Machine> {
        match self {
            Self::Live(machine) => Some(machine),
            Self::Scripted(_) => None,
        }
    }

    /// The scripted machine, if this is one.
    pub fn as_scripted(&self) -> Option<&ScriptedMachine> {
        match self {
            Self::Live(_) => None,
            Self::Scripted(machine) => Some(machine),
        }
    }
}

impl Host for Intcode {
    fn run(&mut self) -> Status {
        match self {
            Self::Live(machine) => machine.run(),
            Self::Scripted(machine) => machine.run(),
        }
    }

    fn resume(&mut self) -> Status {
        match self {
            Self::Live(machine) => machine.resume(),
            Self::Scripted(machine) => machine.resume(),
        }
    }

    fn status(&self) -> Status {
        match self {
            Self::Live(machine) => machine.status(),
            Self::Scripted(machine) => Host::status(machine),
        }
    }

    fn pc(&self) -> Address {
        match self {
            Self::Live(machine) => machine.pc(),
            Self::Scripted(machine) => Host::pc(machine),
        }
    }

    fn input(&self) -> &VecDeque<Word> {
        match self {
            Self::Live(machine) => machine.input(),
            Self::Scripted(machine) => machine.input(),
        }
    }

    fn input_mut(&mut self) -> &mut VecDeque<Word> {
        match self {
            Self::Live(machine) => machine.input_mut(),
            Self::Scripted(machine) => machine.input_mut(),
        }
    }

    fn output(&self) -> &[Word] {
        match self {
            Self::Live(machine) => machine.output(),
            Self::Scripted(machine) => machine.output(),
        }
    }

    fn output_mut(&mut self) -> &mut Vec<Word> {
        match self {
            Self::Live(machine) => machine.output_mut(),
            Self::Scripted(machine) => machine.output_mut(),
        }
    }
}
