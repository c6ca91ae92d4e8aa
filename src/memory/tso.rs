use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use util::Indent;

use super::{print_cells, FenceLabel, Propagation, ReadLabel, RmwLabel, WriteLabel};
use crate::error::RuntimeError;
use crate::instruction::AccessMode;
use crate::program::ProgramDescriptor;
use crate::{MemoryCell, ThreadId, Value};

/// Pending writes of one thread, oldest at the front.
pub type StoreBuffer = VecDeque<(MemoryCell, Value)>;

/// Total-store-order memory: one FIFO store buffer per thread.
///
/// A thread's writes retire to global memory in issue order; its own loads
/// are answered by the newest buffered write to the cell when one exists.
#[derive(Clone, Debug)]
pub struct TsoMemory {
    cells: Vec<Value>,
    buffers: Vec<StoreBuffer>,
    program: Rc<ProgramDescriptor>,
}

impl TsoMemory {
    pub fn new(program: &Rc<ProgramDescriptor>, threads: usize) -> TsoMemory {
        TsoMemory {
            cells: vec![0; program.memory_size],
            buffers: vec![StoreBuffer::new(); threads],
            program: Rc::clone(program),
        }
    }

    /// One propagation per thread with a non-empty buffer, ascending by
    /// thread id; each refers to that buffer's oldest entry.
    pub fn available_propagations(&self) -> Vec<Propagation> {
        self.buffers
            .iter()
            .enumerate()
            .filter(|(_, buffer)| !buffer.is_empty())
            .map(|(tid, _)| Propagation::Tso { tid })
            .collect()
    }

    pub fn apply_propagation(&mut self, propagation: Propagation) -> Result<(), RuntimeError> {
        let tid = match propagation {
            Propagation::Tso { tid } => tid,
            Propagation::Pso { .. } => return Err(RuntimeError::PropagationMismatch),
        };
        let (cell, value) = self
            .buffers
            .get_mut(tid)
            .and_then(|buffer| buffer.pop_front())
            .ok_or(RuntimeError::PropagationMismatch)?;
        self.cells[cell] = value;
        Ok(())
    }

    /// Store-to-load forwarding: the newest buffered write of this thread to
    /// the cell wins over global memory.
    pub fn read(&self, tid: ThreadId, label: ReadLabel) -> Result<Value, RuntimeError> {
        if label.src >= self.cells.len() {
            return Err(RuntimeError::InvalidAddress(label.src));
        }
        for &(cell, value) in self.buffers[tid].iter().rev() {
            if cell == label.src {
                return Ok(value);
            }
        }
        Ok(self.cells[label.src])
    }

    pub fn write(&mut self, tid: ThreadId, label: WriteLabel) -> Result<(), RuntimeError> {
        if label.dst >= self.cells.len() {
            return Err(RuntimeError::InvalidAddress(label.dst));
        }
        self.buffers[tid].push_back((label.dst, label.value));
        if label.mode == AccessMode::SEQ_CST {
            self.drain();
        }
        Ok(())
    }

    /// Any fence stronger than RLX retires every buffered write of every
    /// thread before the step completes.
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

    pub fn buffer(&self, tid: ThreadId) -> &StoreBuffer {
        &self.buffers[tid]
    }

    pub fn describe_propagation(&self, propagation: Propagation) -> String {
        match propagation {
            Propagation::Tso { tid } => match self.buffers.get(tid).and_then(|b| b.front()) {
                Some(&(cell, value)) => format!(
                    "Propagate in thread#{} of memory cell {} with a new value {}",
                    tid,
                    self.program.cell_name(cell),
                    value
                ),
                None => format!("Propagate in thread#{} (nothing buffered)", tid),
            },
            Propagation::Pso { .. } => String::from("Mismatched propagation description"),
        }
    }

    pub fn print<W: io::Write>(&self, out: &mut W, indent: Indent) -> io::Result<()> {
        writeln!(out, "{}TSO Memory:", indent)?;
        writeln!(out, "{}Main memory:", indent.deeper())?;
        print_cells(out, &self.program, &self.cells, Indent(indent.0 + 2))?;
        writeln!(out, "{}Store buffers:", indent.deeper())?;
        for (tid, buffer) in self.buffers.iter().enumerate() {
            writeln!(out, "{}Store buffer #{}", Indent(indent.0 + 2), tid)?;
            for &(cell, value) in buffer {
                writeln!(
                    out,
                    "{}<{}, {}>",
                    Indent(indent.0 + 3),
                    self.program.cell_name(cell),
                    value
                )?;
            }
        }
        Ok(())
    }

    /// Retires buffered writes in rounds, one head entry per thread per
    /// round, until every buffer is empty. Per-thread FIFO order is
    /// preserved.
    fn drain(&mut self) {
        loop {
            let mut progressed = false;
            for buffer in &mut self.buffers {
                if let Some((cell, value)) = buffer.pop_front() {
                    self.cells[cell] = value;
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
    }
}
