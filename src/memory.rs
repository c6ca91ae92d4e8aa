use std::io;
use std::rc::Rc;
use std::str::FromStr;

use util::{Indent, ParseEnumError};

use crate::error::RuntimeError;
use crate::instruction::{AccessMode, Instruction};
use crate::program::ProgramDescriptor;
use crate::thread::ThreadLocalStorage;
use crate::{MemoryCell, ThreadId, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadLabel {
    pub mode: AccessMode,
    pub src: MemoryCell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteLabel {
    pub mode: AccessMode,
    pub value: Value,
    pub dst: MemoryCell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RmwLabel {
    pub mode: AccessMode,
    pub src: MemoryCell,
    pub op: RmwOp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FenceLabel {
    pub mode: AccessMode,
}

/// Atomic update applied to one cell by an RMW transition. Captures the
/// register values read when the label was derived and returns the previous
/// cell value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RmwOp {
    FetchAndIncrement { increment: Value },
    CompareAndSwap { expected: Value, desired: Value },
}

impl RmwOp {
    pub fn apply(self, cell: &mut Value) -> Value {
        let old = *cell;
        match self {
            RmwOp::FetchAndIncrement { increment } => {
                *cell = old.wrapping_add(increment);
            }
            RmwOp::CompareAndSwap { expected, desired } => {
                if old == expected {
                    *cell = desired;
                }
            }
        }
        old
    }
}

/// Memory transition derived from a thread's next instruction. Instructions
/// that never touch shared memory map to `Epsilon`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryLabel {
    Epsilon,
    Read(ReadLabel),
    Write(WriteLabel),
    Rmw(RmwLabel),
    Fence(FenceLabel),
}

/// Derives the memory transition label of `instruction` from the current
/// register values. Cell addresses are the values of the `addr` registers at
/// this moment.
pub fn transition_label(
    instruction: &Instruction,
    registers: &ThreadLocalStorage,
) -> Result<MemoryLabel, RuntimeError> {
    let label = match *instruction {
        Instruction::Cas {
            mode,
            addr,
            expected,
            desired,
            ..
        } => MemoryLabel::Rmw(RmwLabel {
            mode,
            src: registers.get(addr)? as MemoryCell,
            op: RmwOp::CompareAndSwap {
                expected: registers.get(expected)?,
                desired: registers.get(desired)?,
            },
        }),
        Instruction::Fai {
            mode,
            addr,
            increment,
            ..
        } => MemoryLabel::Rmw(RmwLabel {
            mode,
            src: registers.get(addr)? as MemoryCell,
            op: RmwOp::FetchAndIncrement {
                increment: registers.get(increment)?,
            },
        }),
        Instruction::Load { mode, addr, .. } => MemoryLabel::Read(ReadLabel {
            mode,
            src: registers.get(addr)? as MemoryCell,
        }),
        Instruction::Store { mode, addr, src } => MemoryLabel::Write(WriteLabel {
            mode,
            value: registers.get(src)?,
            dst: registers.get(addr)? as MemoryCell,
        }),
        Instruction::Fence { mode } => MemoryLabel::Fence(FenceLabel { mode }),
        Instruction::RegConst { .. } | Instruction::RegBinOp { .. } | Instruction::If { .. } => {
            MemoryLabel::Epsilon
        }
    };
    Ok(label)
}

/// A pending buffered write that may be moved to global memory.
///
/// Descriptors are indices into the subsystem state rather than references
/// into it, so they stay meaningful across configuration clones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Propagation {
    Tso { tid: ThreadId },
    Pso { tid: ThreadId, cell: MemoryCell },
}

/// The memory discipline selected for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryModel {
    Sc,
    Tso,
    Pso,
}

impl FromStr for MemoryModel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<MemoryModel, ParseEnumError> {
        match s {
            "sc" => Ok(MemoryModel::Sc),
            "tso" => Ok(MemoryModel::Tso),
            "pso" => Ok(MemoryModel::Pso),
            _ => Err(ParseEnumError {
                value: s.to_string(),
                enum_name: "MemoryModel",
            }),
        }
    }
}

/// State of the shared memory under one of the supported disciplines.
///
/// The three models share one calling contract; the discipline only changes
/// the internal state and the effect of the transition operations.
#[derive(Clone, Debug)]
pub enum MemorySubsystem {
    Sc(ScMemory),
    Tso(TsoMemory),
    Pso(PsoMemory),
}

impl MemorySubsystem {
    pub fn new(
        model: MemoryModel,
        program: &Rc<ProgramDescriptor>,
        threads: usize,
    ) -> MemorySubsystem {
        match model {
            MemoryModel::Sc => MemorySubsystem::Sc(ScMemory::new(program)),
            MemoryModel::Tso => MemorySubsystem::Tso(TsoMemory::new(program, threads)),
            MemoryModel::Pso => MemorySubsystem::Pso(PsoMemory::new(program, threads)),
        }
    }

    /// Enabled ε-transitions of the current state. The order is
    /// deterministic given the state: ascending thread id, and for PSO
    /// ascending (thread id, cell).
    pub fn available_propagations(&self) -> Vec<Propagation> {
        match self {
            MemorySubsystem::Sc(_) => Vec::new(),
            MemorySubsystem::Tso(memory) => memory.available_propagations(),
            MemorySubsystem::Pso(memory) => memory.available_propagations(),
        }
    }

    /// Consumes one descriptor returned by [`available_propagations`]:
    /// pops the head entry of its buffer and writes it to global memory.
    ///
    /// [`available_propagations`]: MemorySubsystem::available_propagations
    pub fn apply_propagation(&mut self, propagation: Propagation) -> Result<(), RuntimeError> {
        match self {
            MemorySubsystem::Sc(_) => Err(RuntimeError::NoPropagations),
            MemorySubsystem::Tso(memory) => memory.apply_propagation(propagation),
            MemorySubsystem::Pso(memory) => memory.apply_propagation(propagation),
        }
    }

    pub fn read(&self, tid: ThreadId, label: ReadLabel) -> Result<Value, RuntimeError> {
        match self {
            MemorySubsystem::Sc(memory) => memory.read(tid, label),
            MemorySubsystem::Tso(memory) => memory.read(tid, label),
            MemorySubsystem::Pso(memory) => memory.read(tid, label),
        }
    }

    pub fn write(&mut self, tid: ThreadId, label: WriteLabel) -> Result<(), RuntimeError> {
        match self {
            MemorySubsystem::Sc(memory) => memory.write(tid, label),
            MemorySubsystem::Tso(memory) => memory.write(tid, label),
            MemorySubsystem::Pso(memory) => memory.write(tid, label),
        }
    }

    pub fn fence(&mut self, tid: ThreadId, label: FenceLabel) {
        match self {
            MemorySubsystem::Sc(memory) => memory.fence(tid, label),
            MemorySubsystem::Tso(memory) => memory.fence(tid, label),
            MemorySubsystem::Pso(memory) => memory.fence(tid, label),
        }
    }

    pub fn rmw(&mut self, tid: ThreadId, label: RmwLabel) -> Result<Value, RuntimeError> {
        match self {
            MemorySubsystem::Sc(memory) => memory.rmw(tid, label),
            MemorySubsystem::Tso(memory) => memory.rmw(tid, label),
            MemorySubsystem::Pso(memory) => memory.rmw(tid, label),
        }
    }

    /// Value currently visible in global memory, ignoring buffers.
    pub fn global_value(&self, cell: MemoryCell) -> Option<Value> {
        match self {
            MemorySubsystem::Sc(memory) => memory.global_value(cell),
            MemorySubsystem::Tso(memory) => memory.global_value(cell),
            MemorySubsystem::Pso(memory) => memory.global_value(cell),
        }
    }

    /// One display line for `propagation` in the current state.
    pub fn describe_propagation(&self, propagation: Propagation) -> String {
        match self {
            MemorySubsystem::Sc(_) => String::from("No propagations are available under SC"),
            MemorySubsystem::Tso(memory) => memory.describe_propagation(propagation),
            MemorySubsystem::Pso(memory) => memory.describe_propagation(propagation),
        }
    }

    pub fn print<W: io::Write>(&self, out: &mut W, indent: Indent) -> io::Result<()> {
        match self {
            MemorySubsystem::Sc(memory) => memory.print(out, indent),
            MemorySubsystem::Tso(memory) => memory.print(out, indent),
            MemorySubsystem::Pso(memory) => memory.print(out, indent),
        }
    }
}

/// Global memory listing: named cells first, then anonymous cells by index.
fn print_cells<W: io::Write>(
    out: &mut W,
    program: &ProgramDescriptor,
    cells: &[Value],
    indent: Indent,
) -> io::Result<()> {
    for (cell, value) in cells.iter().enumerate() {
        match program.memory_name.get(cell) {
            Some(name) => writeln!(out, "{}{}: {}", indent, name, value)?,
            None => writeln!(out, "{}{}: {}", indent, cell, value)?,
        }
    }
    Ok(())
}

mod pso;
mod sc;
mod tso;

pub use self::pso::PsoMemory;
pub use self::sc::ScMemory;
pub use self::tso::TsoMemory;
