use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::rc::Rc;

use util::Indent;

use crate::error::RuntimeError;
use crate::instruction::Instruction;
use crate::memory::{transition_label, MemoryLabel, MemorySubsystem, Propagation};
use crate::program::ProgramDescriptor;
use crate::thread::ThreadSubsystem;
use crate::ThreadId;

/// Errors surfaced by the driver loop and the schedulers.
#[derive(Debug)]
pub enum ExecutionError {
    Runtime(RuntimeError),
    Io(io::Error),
    /// Interactive selection failed: malformed input or an index out of
    /// range.
    Input(String),
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecutionError::Runtime(err) => write!(f, "Execution failed: {}", err),
            ExecutionError::Io(err) => write!(f, "Writing output failed: {}", err),
            ExecutionError::Input(message) => write!(f, "Incorrect user input: {}", message),
        }
    }
}

impl StdError for ExecutionError {}

impl From<RuntimeError> for ExecutionError {
    fn from(err: RuntimeError) -> ExecutionError {
        ExecutionError::Runtime(err)
    }
}

impl From<io::Error> for ExecutionError {
    fn from(err: io::Error) -> ExecutionError {
        ExecutionError::Io(err)
    }
}

/// One global configuration (thread subsystem plus memory subsystem) and
/// the operations to advance it one transition at a time.
///
/// A step is atomic: all of its effects (register writes, instruction
/// pointer, memory state) become visible together. Cloning produces an
/// independent configuration, which is how the exhaustive scheduler branches.
#[derive(Clone)]
pub struct ControllableExecutor {
    threads: ThreadSubsystem,
    memory: MemorySubsystem,
}

impl ControllableExecutor {
    pub fn new(
        memory: MemorySubsystem,
        program: &Rc<ProgramDescriptor>,
        entry_points: &[usize],
    ) -> ControllableExecutor {
        ControllableExecutor {
            threads: ThreadSubsystem::new(program, entry_points),
            memory,
        }
    }

    /// Ids of the threads that can take a step, ascending.
    pub fn enabled_thread_steps(&self) -> Vec<ThreadId> {
        self.threads.running()
    }

    /// Enabled ε-transitions of the memory subsystem.
    pub fn enabled_propagations(&self) -> Vec<Propagation> {
        self.memory.available_propagations()
    }

    /// A configuration is terminal when no transition of either kind is
    /// enabled.
    pub fn is_terminal(&self) -> bool {
        self.threads.is_completed() && self.memory.available_propagations().is_empty()
    }

    /// Executes the next instruction of thread `tid`: derives its memory
    /// transition label, submits it to the memory subsystem, stores any
    /// returned value, and moves the instruction pointer.
    pub fn thread_step(&mut self, tid: ThreadId) -> Result<(), RuntimeError> {
        let instruction = self.threads[tid].next_instruction();
        let label = transition_label(&instruction, self.threads[tid].registers())?;
        match (instruction, label) {
            (Instruction::Load { dst, .. }, MemoryLabel::Read(read)) => {
                let value = self.memory.read(tid, read)?;
                let thread = &mut self.threads[tid];
                thread.set_local(dst, value)?;
                thread.advance();
            }
            (Instruction::Cas { dst, .. }, MemoryLabel::Rmw(rmw))
            | (Instruction::Fai { dst, .. }, MemoryLabel::Rmw(rmw)) => {
                let value = self.memory.rmw(tid, rmw)?;
                let thread = &mut self.threads[tid];
                thread.set_local(dst, value)?;
                thread.advance();
            }
            (Instruction::Store { .. }, MemoryLabel::Write(write)) => {
                self.memory.write(tid, write)?;
                self.threads[tid].advance();
            }
            (Instruction::Fence { .. }, MemoryLabel::Fence(fence)) => {
                self.memory.fence(tid, fence);
                self.threads[tid].advance();
            }
            (Instruction::RegConst { dst, value }, MemoryLabel::Epsilon) => {
                let thread = &mut self.threads[tid];
                thread.set_local(dst, value)?;
                thread.advance();
            }
            (Instruction::RegBinOp { dst, lhs, rhs, op }, MemoryLabel::Epsilon) => {
                let thread = &mut self.threads[tid];
                let value = op.apply(thread.get_local(lhs)?, thread.get_local(rhs)?)?;
                thread.set_local(dst, value)?;
                thread.advance();
            }
            (Instruction::If { cond, target }, MemoryLabel::Epsilon) => {
                let thread = &mut self.threads[tid];
                if thread.get_local(cond)? == 0 {
                    thread.advance();
                } else {
                    thread.jump(target);
                }
            }
            _ => unreachable!("transition label does not match its instruction"),
        }
        Ok(())
    }

    /// Applies one buffered-write propagation.
    pub fn propagation_step(&mut self, propagation: Propagation) -> Result<(), RuntimeError> {
        self.memory.apply_propagation(propagation)
    }

    /// Dispatches `selection` over the combined transition list: thread
    /// steps first, then propagations.
    pub fn select(
        &mut self,
        selection: usize,
        running: &[ThreadId],
        propagations: &[Propagation],
    ) -> Result<(), RuntimeError> {
        if let Some(&tid) = running.get(selection) {
            self.thread_step(tid)
        } else if let Some(&propagation) = propagations.get(selection - running.len()) {
            self.propagation_step(propagation)
        } else {
            Err(RuntimeError::InvalidSelection(selection))
        }
    }

    pub fn describe_propagation(&self, propagation: Propagation) -> String {
        self.memory.describe_propagation(propagation)
    }

    pub fn print_instruction<W: io::Write>(
        &self,
        out: &mut W,
        tid: ThreadId,
        indent: Indent,
    ) -> io::Result<()> {
        self.threads[tid].print_next_instruction(out, indent)
    }

    pub fn print_snapshot<W: io::Write>(&self, out: &mut W, indent: Indent) -> io::Result<()> {
        self.threads.print(out, indent)?;
        self.memory.print(out, indent)?;
        writeln!(out)
    }

    pub fn threads(&self) -> &ThreadSubsystem {
        &self.threads
    }

    pub fn memory(&self) -> &MemorySubsystem {
        &self.memory
    }
}

/// Picks the next transition from the combined enabled list.
pub trait Scheduler {
    fn select(
        &mut self,
        executor: &ControllableExecutor,
        running: &[ThreadId],
        propagations: &[Propagation],
    ) -> Result<usize, ExecutionError>;
}

/// Drives `executor` to termination under `scheduler`. With tracing on, a
/// snapshot is printed before every step and once more after the last one.
pub fn run<S, W>(
    executor: &mut ControllableExecutor,
    scheduler: &mut S,
    tracing: bool,
    out: &mut W,
) -> Result<(), ExecutionError>
where
    S: Scheduler,
    W: io::Write,
{
    loop {
        let running = executor.enabled_thread_steps();
        let propagations = executor.enabled_propagations();
        if running.is_empty() && propagations.is_empty() {
            break;
        }
        if tracing {
            executor.print_snapshot(out, Indent(0))?;
        }
        let selection = scheduler.select(executor, &running, &propagations)?;
        executor.select(selection, &running, &propagations)?;
    }
    if tracing {
        executor.print_snapshot(out, Indent(0))?;
    }
    Ok(())
}

mod exhaustive;
mod interactive;
mod random;

pub use self::exhaustive::explore;
pub use self::interactive::InteractiveScheduler;
pub use self::random::RandomScheduler;
