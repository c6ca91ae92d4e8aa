use crate::instruction::Instruction;
use crate::MemoryCell;

/// Immutable description of a parsed program, shared by every thread and
/// memory subsystem of every configuration for the lifetime of the run.
///
/// Cells `0..memory_name.len()` carry the names declared in `shared_state`;
/// the remaining cells up to `memory_size` are the anonymous ones appended by
/// `reserve_space`. Register names are shared across threads for display
/// only; every thread owns an independent file of `register_name.len()`
/// registers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramDescriptor {
    pub memory_size: usize,
    pub instructions: Vec<Instruction>,
    /// Normalized source form of each instruction, parallel to
    /// `instructions`.
    pub instructions_str: Vec<String>,
    pub memory_name: Vec<String>,
    pub register_name: Vec<String>,
}

impl ProgramDescriptor {
    /// Display name of a cell: its declared name, or `#index` for anonymous
    /// cells.
    pub fn cell_name(&self, cell: MemoryCell) -> String {
        match self.memory_name.get(cell) {
            Some(name) => name.clone(),
            None => format!("#{}", cell),
        }
    }
}
