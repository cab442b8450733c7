use clap::*;
use codespan_reporting::{
    diagnostic::{Diagnostic, Label},
    files::SimpleFile,
    term::{
        emit,
        termcolor::{ColorChoice, StandardStream},
    },
};
use intcode::{
    parse::{format_program, parse_program, ParseError},
    vm::*,
};
use log::{debug, info, warn};
use std::{
    fmt,
    fs::read_to_string,
    io::{stdin, stdout, BufRead, Write},
};

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputMode {
    /// Print every output value on its own line.
    Ints,
    /// Print output values as characters.
    Ascii,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => Self::Off,
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// The Intcode program to run.
    #[clap(value_parser)]
    program: String,

    /// Comma separated values to queue as input before the program starts.
    #[clap(short, long, value_parser, value_delimiter = ',', allow_hyphen_values = true)]
    input: Vec<Word>,

    /// Text to queue as input before the program starts. A newline is appended.
    #[clap(short, long, value_parser)]
    ascii: Option<String>,

    /// Overwrite a memory cell before the program starts, as ADDRESS=VALUE.
    #[clap(short, long, value_parser = parse_poke)]
    poke: Vec<(Address, Word)>,

    /// How to print the program's output, and how to read input from stdin.
    #[clap(short = 'm', long, value_parser, default_value = "ints")]
    output_mode: OutputMode,

    /// Print the contents of memory after the program stops.
    #[clap(long)]
    dump: bool,

    /// Print a disassembly of the program instead of running it.
    #[clap(long)]
    disassemble: bool,

    /// The log level. Defaults to `warn`, or to `RUST_LOG` when it is set.
    #[clap(long, value_parser)]
    log_level: Option<LogLevel>,
}

enum Error {
    IO(std::io::Error),
    Parse(ParseError),
    Host(intcode::vm::Error),
    Machine(Status, Address),
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::IO(e) => write!(f, "IO error: {:?}", e),
            Error::Parse(e) => write!(f, "Parse error:\n{}", e),
            Error::Host(e) => write!(f, "Host error: {}", e),
            Error::Machine(status, pc) => {
                write!(f, "Machine error: stopped with {} at address {}", status, pc)
            }
        }
    }
}

fn parse_poke(arg: &str) -> Result<(Address, Word), String> {
    let (address, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected ADDRESS=VALUE, got `{arg}`"))?;
    let address = address
        .trim()
        .parse()
        .map_err(|e| format!("invalid address `{address}`: {e}"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value `{value}`: {e}"))?;
    Ok((address, value))
}

fn init_logging(level: Option<LogLevel>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    builder.format_timestamp(None);
    if let Some(level) = level {
        builder.filter_level(level.into());
    }
    builder.init();
}

/// Point at the offending token of a program which failed to parse.
fn report_parse_error(filename: &str, text: &str, err: &ParseError) {
    let file = SimpleFile::new(filename, text);
    let diagnostic = Diagnostic::error()
        .with_message(format!(
            "invalid program at {filename}:{}:{}",
            err.line, err.column
        ))
        .with_labels(vec![Label::primary((), err.span()).with_message(err.message())]);

    let writer = StandardStream::stderr(ColorChoice::Auto);
    let config = codespan_reporting::term::Config::default();
    if emit(&mut writer.lock(), &config, &file, &diagnostic).is_err() {
        eprintln!("{err}");
    }
}

fn print_disassembly(program: &[Word]) {
    for (address, decoded) in disassemble(program) {
        let at = address as usize;
        match decoded {
            Ok(instruction) => {
                let end = (at + instruction.width() as usize).min(program.len());
                println!(
                    "{address:04}: {}",
                    instruction.with_operands(&program[at + 1..end])
                );
            }
            Err(_) => println!("{address:04}: DATA {}", program[at]),
        }
    }
}

fn print_output(values: Vec<Word>, mode: OutputMode) -> Result<(), Error> {
    let mut out = stdout().lock();
    for value in values {
        let written = match mode {
            OutputMode::Ascii if (0..128).contains(&value) => {
                write!(out, "{}", value as u8 as char)
            }
            _ => writeln!(out, "{value}"),
        };
        written.map_err(Error::IO)?;
    }
    out.flush().map_err(Error::IO)
}

/// Queue a line read from stdin as input for the machine. Returns whether
/// anything was queued: blank lines are skipped in `ints` mode.
fn queue_line(machine: &mut Machine, line: &str, mode: OutputMode) -> Result<bool, Error> {
    match mode {
        OutputMode::Ints if line.trim().is_empty() => return Ok(false),
        OutputMode::Ints => machine.extend_input(parse_program(line).map_err(Error::Parse)?),
        OutputMode::Ascii => {
            machine.push_ascii(line);
            machine.push_input(Word::from(b'\n'));
        }
    }
    Ok(true)
}

/// Format the machine's memory for `--dump`. Memory which extends too far to
/// list densely is printed one written cell per line instead.
fn dump_text(machine: &Machine) -> String {
    match machine.dump() {
        Ok(words) => format_program(&words),
        Err(e) => {
            warn!("{e}, printing written cells only");
            machine
                .memory()
                .cells()
                .iter()
                .map(|(address, value)| format!("{address}: {value}"))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

/// Run the machine, feeding it lines from stdin whenever it asks for more
/// input than it was given.
fn drive(machine: &mut Machine, mode: OutputMode) -> Result<Status, Error> {
    let mut status = machine.run();
    let mut lines = stdin().lock().lines();
    loop {
        print_output(machine.drain_output(), mode)?;
        if status != Status::MissingInput {
            return Ok(status);
        }

        match lines.next() {
            Some(line) => {
                if queue_line(machine, &line.map_err(Error::IO)?, mode)? {
                    status = machine.resume();
                }
            }
            None => {
                info!(
                    "Input ended while the program was waiting at address {}",
                    machine.resume_point()
                );
                return Ok(status);
            }
        }
    }
}

fn read_file(name: &str) -> Result<String, Error> {
    read_to_string(name).map_err(Error::IO)
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_logging(args.log_level);

    let text = read_file(&args.program)?;
    let mut machine = match Machine::load(&text) {
        Ok(machine) => machine,
        Err(e) => {
            report_parse_error(&args.program, &text, &e);
            return Err(Error::Parse(e));
        }
    };

    if args.disassemble {
        print_disassembly(&machine.dump().map_err(Error::Host)?);
        return Ok(());
    }

    for &(address, value) in &args.poke {
        debug!("Poking {value} into address {address}");
        machine.poke(address, value).map_err(Error::Host)?;
    }
    machine.extend_input(args.input.iter().copied());
    if let Some(text) = &args.ascii {
        machine.push_ascii(text);
        machine.push_input(Word::from(b'\n'));
    }

    let status = drive(&mut machine, args.output_mode)?;

    if args.dump {
        println!("{}", dump_text(&machine));
    }

    if status.is_fault() {
        Err(Error::Machine(status, machine.pc()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_line() {
        let mut machine = Machine::load("3,0,3,1,99").unwrap();
        assert!(queue_line(&mut machine, "1, -2", OutputMode::Ints).unwrap());
        assert!(!queue_line(&mut machine, "", OutputMode::Ints).unwrap());
        assert!(!queue_line(&mut machine, "  \t", OutputMode::Ints).unwrap());
        assert_eq!(machine.input(), &[1, -2]);

        assert!(queue_line(&mut machine, "", OutputMode::Ascii).unwrap());
        assert!(queue_line(&mut machine, "ok", OutputMode::Ascii).unwrap());
        assert_eq!(machine.input(), &[1, -2, 10, 111, 107, 10]);

        assert!(queue_line(&mut machine, "1,x", OutputMode::Ints).is_err());
    }

    #[test]
    fn test_dump_text() {
        let mut machine = Machine::load("1,2,3").unwrap();
        assert_eq!(dump_text(&machine), "1,2,3");

        machine.poke(1 << 40, 7).unwrap();
        assert_eq!(dump_text(&machine), "0: 1\n1: 2\n2: 3\n1099511627776: 7");
    }
}
