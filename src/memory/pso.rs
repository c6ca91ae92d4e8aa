use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use util::Indent;

use super::{print_cells, FenceLabel, Propagation, ReadLabel, RmwLabel, WriteLabel};
use crate::error::RuntimeError;
use crate::instruction::AccessMode;
use crate::program::ProgramDescriptor;
use crate::{MemoryCell, ThreadId, Value};

/// Pending writes of one thread to one cell, oldest at the front. The cell
/// is the index into the per-thread buffer table, so entries carry values
/// only.
pub type CellBuffer = VecDeque<Value>;

/// Partial-store-order memory: one FIFO per (thread, cell).
///
/// Writes of one thread to the *same* cell retire in issue order, but writes
/// to distinct cells may retire in any order. Loads forward from the newest
/// buffered write to the cell, with no ordering across cells.
#[derive(Clone, Debug)]
pub struct PsoMemory {
    cells: Vec<Value>,
    buffers: Vec<Vec<CellBuffer>>,
    program: Rc<ProgramDescriptor>,
}

impl PsoMemory {
    pub fn new(program: &Rc<ProgramDescriptor>, threads: usize) -> PsoMemory {
        PsoMemory {
            cells: vec![0; program.memory_size],
            buffers: vec![vec![CellBuffer::new(); program.memory_size]; threads],
            program: Rc::clone(program),
        }
    }

    /// One propagation per (thread, cell) with a non-empty sub-buffer,
    /// ascending by (thread id, cell).
    pub fn available_propagations(&self) -> Vec<Propagation> {
        let mut propagations = Vec::new();
        for (tid, thread_buffers) in self.buffers.iter().enumerate() {
            for (cell, buffer) in thread_buffers.iter().enumerate() {
                if !buffer.is_empty() {
                    propagations.push(Propagation::Pso { tid, cell });
                }
            }
        }
        propagations
    }

    pub fn apply_propagation(&mut self, propagation: Propagation) -> Result<(), RuntimeError> {
        let (tid, cell) = match propagation {
            Propagation::Pso { tid, cell } => (tid, cell),
            Propagation::Tso { .. } => return Err(RuntimeError::PropagationMismatch),
        };
        let value = self
            .buffers
            .get_mut(tid)
            .and_then(|thread_buffers| thread_buffers.get_mut(cell))
            .and_then(|buffer| buffer.pop_front())
            .ok_or(RuntimeError::PropagationMismatch)?;
        self.cells[cell] = value;
        Ok(())
    }

    /// Per-cell store-to-load forwarding: the newest pending write of this
    /// thread to the cell wins over global memory.
    pub fn read(&self, tid: ThreadId, label: ReadLabel) -> Result<Value, RuntimeError> {
        if label.src >= self.cells.len() {
            return Err(RuntimeError::InvalidAddress(label.src));
        }
        match self.buffers[tid][label.src].back() {
            Some(&value) => Ok(value),
            None => Ok(self.cells[label.src]),
        }
    }

    pub fn write(&mut self, tid: ThreadId, label: WriteLabel) -> Result<(), RuntimeError> {
        if label.dst >= self.cells.len() {
            return Err(RuntimeError::InvalidAddress(label.dst));
        }
        self.buffers[tid][label.dst].push_back(label.value);
        if label.mode == AccessMode::SEQ_CST {
            self.drain();
        }
        Ok(())
    }

    /// Any fence stronger than RLX retires every buffered write of every
    /// thread and cell before the step completes.
    pub fn fence(&mut self, _tid: ThreadId, label: FenceLabel) {
        if label.mode != AccessMode::RLX {
            self.drain();
        }
    }

    /// RMWs operate on global memory: all buffers are drained first, so the
    /// update is globally visible the moment it executes.
    pub fn rmw(&mut self, _tid: ThreadId, label: RmwLabel) -> Result<Value, RuntimeError> {
        self.drain();
        match self.cells.get_mut(label.src) {
            Some(slot) => Ok(label.op.apply(slot)),
            None => Err(RuntimeError::InvalidAddress(label.src)),
        }
    }

    pub fn global_value(&self, cell: MemoryCell) -> Option<Value> {
        self.cells.get(cell).copied()
    }

    pub fn buffer(&self, tid: ThreadId, cell: MemoryCell) -> &CellBuffer {
        &self.buffers[tid][cell]
    }

    pub fn describe_propagation(&self, propagation: Propagation) -> String {
        match propagation {
            Propagation::Pso { tid, cell } => {
                let head = self
                    .buffers
                    .get(tid)
                    .and_then(|thread_buffers| thread_buffers.get(cell))
                    .and_then(|buffer| buffer.front());
                match head {
                    Some(&value) => format!(
                        "Propagate in thread#{} of memory cell {} with a new value {}",
                        tid,
                        self.program.cell_name(cell),
                        value
                    ),
                    None => format!("Propagate in thread#{} (nothing buffered)", tid),
                }
            }
            Propagation::Tso { .. } => String::from("Mismatched propagation description"),
        }
    }

    pub fn print<W: io::Write>(&self, out: &mut W, indent: Indent) -> io::Result<()> {
        writeln!(out, "{}PSO Memory:", indent)?;
        writeln!(out, "{}Main memory:", indent.deeper())?;
        print_cells(out, &self.program, &self.cells, Indent(indent.0 + 2))?;
        writeln!(out, "{}PSO buffers:", indent.deeper())?;
        for (tid, thread_buffers) in self.buffers.iter().enumerate() {
            writeln!(out, "{}Store buffer #{}", Indent(indent.0 + 2), tid)?;
            for (cell, buffer) in thread_buffers.iter().enumerate() {
                if buffer.is_empty() {
                    continue;
                }
                write!(
                    out,
                    "{}Memory cell {} store buffer:",
                    Indent(indent.0 + 3),
                    self.program.cell_name(cell)
                )?;
                for value in buffer {
                    write!(out, " <{}>", value)?;
                }
                writeln!(out)?;
            }
        }
        Ok(())
    }

    /// Retires buffered writes in rounds, one head entry per (thread, cell)
    /// per round, until every sub-buffer is empty.
    fn drain(&mut self) {
        loop {
            let mut progressed = false;
            for thread_buffers in &mut self.buffers {
                for (cell, buffer) in thread_buffers.iter_mut().enumerate() {
                    if let Some(value) = buffer.pop_front() {
                        self.cells[cell] = value;
                        progressed = true;
                    }
                }
            }
            if !progressed {
                break;
            }
        }
    }
}
