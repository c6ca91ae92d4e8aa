//! Parser for the WMM emulator's assembly-like source language.
//!
//! The entry point is [`parse`], which turns a complete source program into
//! a [`ProgramDescriptor`](wmm::program::ProgramDescriptor) ready to be
//! emulated. Parsing is implemented with [pest]; the main [`Error`] type is
//! an alias of `pest::error::Error`, so all of pest's error formatting (line
//! and column markers, source excerpts) is available to callers.
//!
//! # Source language
//!
//! A program starts with two optional clauses followed by any number of
//! instructions, each terminated by a semicolon:
//!
//! ```text
//! shared_state: x y;          # named shared memory cells, starting at 0
//! reserve_space: 16;          # anonymous cells appended after the named ones
//! rx = x;                     # the address of a shared cell (see below)
//! one = 1;                    # an integer literal
//! sum = one + one;            # register arithmetic: + - * / < > <= >=
//! loop: store RLX #rx one;    # labels may prefix any instruction
//! load ACQ #rx tmp;
//! r := fai SEQ_CST #rx one;   # fetch-and-increment, returns the old value
//! r := cas SEQ_CST #rx exp des;
//! fence REL_ACQ;
//! if tmp goto loop;
//! ```
//!
//! Access modes are `RLX`, `REL`, `ACQ`, `REL_ACQ` and `SEQ_CST`. A `#name`
//! operand denotes a register holding a memory address.
//!
//! In `r = name`, the bare `name` must be one declared in `shared_state`,
//! and the value assigned is that cell's *address*; this is how programs
//! obtain addresses to store into `#addr` registers. There is no
//! register-to-register copy.
//!
//! Registers come into existence on first sight; every thread of the
//! emulated program owns a zero-initialized file covering all register names
//! in the program.
//!
//! [pest]: https://docs.rs/pest/

mod instructions;
mod labels;
mod parser;


use parser::WmasmParser;
use pest::iterators::Pair;
use pest::{Parser, Span};
use wmm::program::ProgramDescriptor;

pub use parser::Rule;

pub type Error = pest::error::Error<Rule>;

pub type Result<T> = std::result::Result<T, Error>;

/// Parses a complete source program into a descriptor.
pub fn parse(input: &str) -> Result<ProgramDescriptor> {
    instructions::process_program(parse_program(input)?)
}

fn parse_program(input: &str) -> Result<Pair<Rule>> {
    Ok(WmasmParser::parse(Rule::program, input)?.next().unwrap())
}

fn new_parser_error(span: Span, message: String) -> Error {
    Error::new_from_span(pest::error::ErrorVariant::CustomError { message }, span)
}
