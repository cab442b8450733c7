//! # Parsing Module
//!
//! This module reads Intcode program text: signed decimal integers separated
//! by commas, usually followed by a newline. The `i`th integer is loaded at
//! address `i`.
//!
//! Whitespace around an integer is ignored, but anything else that isn't
//! part of a number is a syntax error, as is an empty program, an empty
//! field (`1,,2` or a trailing comma), or an integer which doesn't fit in a
//! 64 bit word. A program with a syntax error is rejected as a whole.
//!
//! #### Error Types
//!
//! Errors carry the location of the offending token so that the command
//! line runner can point at it, and their `Display` implementation renders
//! the line of the program with the token underlined.
use crate::vm::Word;

use nom::{
    character::complete::{char, digit1, multispace0},
    combinator::{all_consuming, map_res, opt, recognize},
    error::ErrorKind,
    sequence::{delimited, pair},
    IResult,
};
use std::{fmt, ops::Range};

/// What was wrong with the program text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// There is no program at all.
    Empty,
    /// A field is not an integer.
    InvalidToken,
    /// A field is an integer, but too large for a word.
    OutOfRange,
}

/// A syntax error in program text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// The byte offset of the offending token in the text.
    pub offset: usize,
    /// The line the token is on, counting from one.
    pub line: usize,
    /// The column the token starts at, counting from one.
    pub column: usize,
    /// The offending token, without surrounding whitespace.
    pub token: String,
    /// The whole line the token is on.
    source_line: String,
}

impl ParseError {
    fn new(text: &str, kind: ParseErrorKind, offset: usize, token: &str) -> Self {
        let before = &text[..offset];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        Self {
            kind,
            offset,
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
            token: token.to_string(),
            source_line: text[line_start..].lines().next().unwrap_or("").to_string(),
        }
    }

    /// The byte range of the offending token in the text. Unlike
    /// [`column`](Self::column), this counts bytes, not characters.
    pub fn span(&self) -> Range<usize> {
        self.offset..self.offset + self.token.len()
    }

    /// A one line description of the error, without the source excerpt.
    pub fn message(&self) -> String {
        match self.kind {
            ParseErrorKind::Empty => "the program is empty".to_string(),
            ParseErrorKind::InvalidToken if self.token.is_empty() => {
                "expected an integer, found nothing".to_string()
            }
            ParseErrorKind::InvalidToken => format!("`{}` is not an integer", self.token),
            ParseErrorKind::OutOfRange => {
                format!("`{}` does not fit in a 64 bit word", self.token)
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // The string used to underline the unexpected token
        let underline = format!(
            "{}^{}",
            " ".repeat(self.column - 1),
            "-".repeat(self.token.chars().count().saturating_sub(1))
        );
        write!(
            f,
            "{WS} |
{line_number} | {line}
{WS} | {underline}
{WS} |
{WS} = {message}",
            WS = " ".repeat(self.line.to_string().len()),
            line_number = self.line,
            line = self.source_line,
            underline = underline,
            message = self.message()
        )
    }
}

impl std::error::Error for ParseError {}

/// Parse a single signed decimal integer.
fn parse_word(input: &str) -> IResult<&str, Word> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<Word>()
    })(input)
}

/// Parse one comma separated field, which must be exactly one integer.
fn parse_field(input: &str) -> IResult<&str, Word> {
    all_consuming(delimited(multispace0, parse_word, multispace0))(input)
}

/// Parse program text into the words of the program.
pub fn parse_program(text: &str) -> Result<Vec<Word>, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::new(text, ParseErrorKind::Empty, 0, ""));
    }

    let mut program = vec![];
    let mut start = 0;
    for field in text.split(',') {
        match parse_field(field) {
            Ok((_, word)) => program.push(word),
            Err(err) => {
                let kind = match err {
                    nom::Err::Error(e) | nom::Err::Failure(e) if e.code == ErrorKind::MapRes => {
                        ParseErrorKind::OutOfRange
                    }
                    _ => ParseErrorKind::InvalidToken,
                };
                // An empty field is reported just after the preceding comma.
                let offset = match field.trim().is_empty() {
                    true => start,
                    false => start + (field.len() - field.trim_start().len()),
                };
                return Err(ParseError::new(text, kind, offset, field.trim()));
            }
        }
        start += field.len() + 1;
    }
    Ok(program)
}

/// Format words as program text, the inverse of [`parse_program`].
pub fn format_program(words: &[Word]) -> String {
    words
        .iter()
        .map(Word::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
