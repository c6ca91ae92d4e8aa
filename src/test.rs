use std::rc::Rc;

use crate::executor::ControllableExecutor;
use crate::instruction::{AccessMode, Instruction};
use crate::memory::{MemoryModel, MemorySubsystem};
use crate::program::ProgramDescriptor;
use crate::{Value, ThreadId};

mod executor;

/// Builds a descriptor for tests. Display strings are derived from the
/// debug form; register names are `r0..rN`.
fn descriptor(
    named_cells: &[&str],
    reserved: usize,
    registers: usize,
    instructions: Vec<Instruction>,
) -> Rc<ProgramDescriptor> {
    let instructions_str = instructions
        .iter()
        .map(|instruction| format!("{:?}", instruction))
        .collect();
    Rc::new(ProgramDescriptor {
        memory_size: named_cells.len() + reserved,
        instructions,
        instructions_str,
        memory_name: named_cells.iter().map(|name| name.to_string()).collect(),
        register_name: (0..registers).map(|index| format!("r{}", index)).collect(),
    })
}

fn executor(
    model: MemoryModel,
    program: &Rc<ProgramDescriptor>,
    entry_points: &[usize],
) -> ControllableExecutor {
    let memory = MemorySubsystem::new(model, program, entry_points.len());
    ControllableExecutor::new(memory, program, entry_points)
}

/// Steps the configuration to termination, choosing among the enabled
/// transitions with `pick(total)`.
fn run_with<F>(executor: &mut ControllableExecutor, mut pick: F)
where
    F: FnMut(usize) -> usize,
{
    loop {
        let running = executor.enabled_thread_steps();
        let propagations = executor.enabled_propagations();
        let total = running.len() + propagations.len();
        if total == 0 {
            break;
        }
        let selection = pick(total);
        executor
            .select(selection, &running, &propagations)
            .unwrap();
    }
}

/// Depth-first enumeration of every reachable terminal configuration,
/// summarized through `extract`.
fn terminal_states<T, F>(executor: &ControllableExecutor, extract: &F) -> Vec<T>
where
    F: Fn(&ControllableExecutor) -> T,
{
    let mut terminals = Vec::new();
    collect_terminals(executor, extract, &mut terminals);
    terminals
}

fn collect_terminals<T, F>(executor: &ControllableExecutor, extract: &F, terminals: &mut Vec<T>)
where
    F: Fn(&ControllableExecutor) -> T,
{
    let running = executor.enabled_thread_steps();
    let propagations = executor.enabled_propagations();
    let total = running.len() + propagations.len();
    if total == 0 {
        terminals.push(extract(executor));
        return;
    }
    for selection in 0..total {
        let mut branch = executor.clone();
        branch.select(selection, &running, &propagations).unwrap();
        collect_terminals(&branch, extract, terminals);
    }
}

fn register(executor: &ControllableExecutor, tid: ThreadId, reg: usize) -> Value {
    executor.threads()[tid].get_local(reg).unwrap()
}

fn global(executor: &ControllableExecutor, cell: usize) -> Value {
    executor.memory().global_value(cell).unwrap()
}

/// The classic store-buffering litmus test. Cells `x` (0) and `y` (1);
/// thread 0 stores to `x` and loads `y` into r3, thread 1 stores to `y` and
/// loads `x` into r4. Entry points 0 and 6.
///
/// Threads share one instruction array and complete only at its very end,
/// so thread 0's block ends with an always-taken branch past thread 1's
/// block (r2 holds 1 by then).
fn store_buffering_program(mode: AccessMode) -> Rc<ProgramDescriptor> {
    descriptor(
        &["x", "y"],
        0,
        5,
        vec![
            // thread 0
            Instruction::RegConst { dst: 0, value: 0 },
            Instruction::RegConst { dst: 1, value: 1 },
            Instruction::RegConst { dst: 2, value: 1 },
            Instruction::Store { mode, addr: 0, src: 2 },
            Instruction::Load { mode, dst: 3, addr: 1 },
            Instruction::If { cond: 2, target: 11 },
            // thread 1
            Instruction::RegConst { dst: 0, value: 0 },
            Instruction::RegConst { dst: 1, value: 1 },
            Instruction::RegConst { dst: 2, value: 1 },
            Instruction::Store { mode, addr: 1, src: 2 },
            Instruction::Load { mode, dst: 4, addr: 0 },
        ],
    )
}

/// Write-reordering litmus test. Thread 0 stores 1 to `x` then 1 to `y`;
/// thread 1 loads `y` into r3 and then `x` into r4. Entry points 0 and 6.
fn write_reordering_program(mode: AccessMode) -> Rc<ProgramDescriptor> {
    descriptor(
        &["x", "y"],
        0,
        5,
        vec![
            // thread 0
            Instruction::RegConst { dst: 0, value: 0 },
            Instruction::RegConst { dst: 1, value: 1 },
            Instruction::RegConst { dst: 2, value: 1 },
            Instruction::Store { mode, addr: 0, src: 2 },
            Instruction::Store { mode, addr: 1, src: 2 },
            Instruction::If { cond: 2, target: 10 },
            // thread 1
            Instruction::RegConst { dst: 0, value: 0 },
            Instruction::RegConst { dst: 1, value: 1 },
            Instruction::Load { mode, dst: 3, addr: 1 },
            Instruction::Load { mode, dst: 4, addr: 0 },
        ],
    )
}
