use std::fmt;

use util::EnumFromStr;
use util_derive::EnumFromStr;

use crate::error::RuntimeError;
use crate::{Register, Value};

/// Memory-access ordering attached to every memory instruction.
///
/// Modes form a total preorder by synchronization class; `REL` and `ACQ`
/// share a class and are therefore unordered relative to each other.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumFromStr)]
pub enum AccessMode {
    RLX,
    REL,
    ACQ,
    REL_ACQ,
    SEQ_CST,
}

impl AccessMode {
    /// Class used for ordering comparisons between modes:
    /// RLX < {REL, ACQ} < REL_ACQ < SEQ_CST.
    pub fn synchronization_class(self) -> u8 {
        match self {
            AccessMode::RLX => 0,
            AccessMode::REL | AccessMode::ACQ => 1,
            AccessMode::REL_ACQ => 2,
            AccessMode::SEQ_CST => 3,
        }
    }

    pub fn is_weaker_than(self, other: AccessMode) -> bool {
        self.synchronization_class() < other.synchronization_class()
    }

    pub fn is_at_least(self, other: AccessMode) -> bool {
        self.synchronization_class() >= other.synchronization_class()
    }
}

macro_rules! impl_enum_display {
    ($e:ty) => {
        impl std::fmt::Display for $e {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                std::fmt::Debug::fmt(self, f)
            }
        }
    };
}

impl_enum_display!(AccessMode);

/// Binary operations available in register computations.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

impl BinOp {
    /// Applies the operation on unsigned 64-bit values. Addition,
    /// subtraction and multiplication wrap, division truncates, comparisons
    /// yield 0 or 1.
    pub fn apply(self, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
        let value = match self {
            BinOp::Add => lhs.wrapping_add(rhs),
            BinOp::Subtract => lhs.wrapping_sub(rhs),
            BinOp::Multiply => lhs.wrapping_mul(rhs),
            BinOp::Divide => {
                if rhs == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                lhs / rhs
            }
            BinOp::Less => (lhs < rhs) as Value,
            BinOp::Greater => (lhs > rhs) as Value,
            BinOp::LessEqual => (lhs <= rhs) as Value,
            BinOp::GreaterEqual => (lhs >= rhs) as Value,
        };
        Ok(value)
    }

    /// The operator's surface-syntax token.
    pub fn token(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEqual => "<=",
            BinOp::GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// One instruction of an emulated program.
///
/// All register-valued fields hold register *indices*; the memory address
/// used by `Load`/`Store`/`Cas`/`Fai` is the current value of the `addr`
/// register at execution time. `target` is a resolved instruction index.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Instruction {
    Cas {
        mode: AccessMode,
        dst: Register,
        addr: Register,
        expected: Register,
        desired: Register,
    },
    Fai {
        mode: AccessMode,
        dst: Register,
        addr: Register,
        increment: Register,
    },
    Load {
        mode: AccessMode,
        dst: Register,
        addr: Register,
    },
    Store {
        mode: AccessMode,
        addr: Register,
        src: Register,
    },
    Fence {
        mode: AccessMode,
    },
    RegConst {
        dst: Register,
        value: Value,
    },
    RegBinOp {
        dst: Register,
        lhs: Register,
        rhs: Register,
        op: BinOp,
    },
    If {
        cond: Register,
        target: usize,
    },
}
