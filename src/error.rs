use std::error::Error as StdError;
use std::fmt;

use crate::{MemoryCell, Register};

/// Fatal errors raised while stepping a configuration. None of these are
/// recoverable; drivers abort the whole execution on the first one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RuntimeError {
    DivisionByZero,
    InvalidRegister(Register),
    InvalidAddress(MemoryCell),
    NoPropagations,
    PropagationMismatch,
    InvalidSelection(usize),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RuntimeError::DivisionByZero => f.write_str("Division by zero is not allowed"),
            RuntimeError::InvalidRegister(reg) => {
                write!(f, "Tried to access an invalid register: {}", reg)
            }
            RuntimeError::InvalidAddress(cell) => {
                write!(f, "Tried to access a memory cell outside of the address space: {}", cell)
            }
            RuntimeError::NoPropagations => {
                f.write_str("The current memory subsystem never has propagations to apply")
            }
            RuntimeError::PropagationMismatch => {
                f.write_str("Propagation description does not match the memory subsystem state")
            }
            RuntimeError::InvalidSelection(selection) => {
                write!(f, "Transition index {} is not enabled", selection)
            }
        }
    }
}

impl StdError for RuntimeError {}
