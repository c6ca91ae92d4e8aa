use std::io;
use std::rc::Rc;

use util::Indent;

use super::{print_cells, FenceLabel, ReadLabel, RmwLabel, WriteLabel};
use crate::error::RuntimeError;
use crate::program::ProgramDescriptor;
use crate::{MemoryCell, ThreadId, Value};

/// Sequentially consistent memory: a single shared array of cells and no
/// buffering. Thread interleaving is the only source of nondeterminism, and
/// every access is answered by global memory directly.
#[derive(Clone, Debug)]
pub struct ScMemory {
    cells: Vec<Value>,
    program: Rc<ProgramDescriptor>,
}

impl ScMemory {
    pub fn new(program: &Rc<ProgramDescriptor>) -> ScMemory {
        ScMemory {
            cells: vec![0; program.memory_size],
            program: Rc::clone(program),
        }
    }

    pub fn read(&self, _tid: ThreadId, label: ReadLabel) -> Result<Value, RuntimeError> {
        self.cells
            .get(label.src)
            .copied()
            .ok_or(RuntimeError::InvalidAddress(label.src))
    }

    pub fn write(&mut self, _tid: ThreadId, label: WriteLabel) -> Result<(), RuntimeError> {
        *self.cell_mut(label.dst)? = label.value;
        Ok(())
    }

    pub fn fence(&mut self, _tid: ThreadId, _label: FenceLabel) {}

    pub fn rmw(&mut self, _tid: ThreadId, label: RmwLabel) -> Result<Value, RuntimeError> {
        Ok(label.op.apply(self.cell_mut(label.src)?))
    }

    pub fn global_value(&self, cell: MemoryCell) -> Option<Value> {
        self.cells.get(cell).copied()
    }

    pub fn print<W: io::Write>(&self, out: &mut W, indent: Indent) -> io::Result<()> {
        writeln!(out, "{}SC Memory:", indent)?;
        print_cells(out, &self.program, &self.cells, indent.deeper())
    }

    fn cell_mut(&mut self, cell: MemoryCell) -> Result<&mut Value, RuntimeError> {
        self.cells
            .get_mut(cell)
            .ok_or(RuntimeError::InvalidAddress(cell))
    }
}
