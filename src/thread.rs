use std::io;
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use util::Indent;

use crate::error::RuntimeError;
use crate::instruction::Instruction;
use crate::program::ProgramDescriptor;
use crate::{Register, ThreadId, Value};

/// Register file of a single thread. Every thread's file covers all register
/// names of the program; registers start at zero.
#[derive(Clone, Debug)]
pub struct ThreadLocalStorage {
    values: Vec<Value>,
}

impl ThreadLocalStorage {
    pub fn new(register_count: usize) -> ThreadLocalStorage {
        ThreadLocalStorage {
            values: vec![0; register_count],
        }
    }

    pub fn get(&self, reg: Register) -> Result<Value, RuntimeError> {
        self.values
            .get(reg)
            .copied()
            .ok_or(RuntimeError::InvalidRegister(reg))
    }

    pub fn set(&mut self, reg: Register, value: Value) -> Result<(), RuntimeError> {
        match self.values.get_mut(reg) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeError::InvalidRegister(reg)),
        }
    }

    pub fn print<W: io::Write>(
        &self,
        out: &mut W,
        register_name: &[String],
        indent: Indent,
    ) -> io::Result<()> {
        writeln!(out, "{}Registers' state:", indent)?;
        for (name, value) in register_name.iter().zip(&self.values) {
            writeln!(out, "{}{}: {}", indent.deeper(), name, value)?;
        }
        Ok(())
    }
}

/// One emulated thread: an instruction pointer plus its register file.
///
/// Completed once the pointer moves past the last instruction; only the step
/// executing on this thread ever mutates it.
#[derive(Clone, Debug)]
pub struct Thread {
    program: Rc<ProgramDescriptor>,
    thread_id: ThreadId,
    instruction_pointer: usize,
    registers: ThreadLocalStorage,
}

impl Thread {
    pub fn new(
        program: Rc<ProgramDescriptor>,
        thread_id: ThreadId,
        instruction_pointer: usize,
    ) -> Thread {
        assert!(instruction_pointer <= program.instructions.len());
        let registers = ThreadLocalStorage::new(program.register_name.len());
        Thread {
            program,
            thread_id,
            instruction_pointer,
            registers,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.instruction_pointer == self.program.instructions.len()
    }

    pub fn instruction_pointer(&self) -> usize {
        self.instruction_pointer
    }

    pub fn next_instruction(&self) -> Instruction {
        assert!(!self.is_completed());
        self.program.instructions[self.instruction_pointer]
    }

    pub fn advance(&mut self) {
        self.instruction_pointer += 1;
    }

    pub fn jump(&mut self, target: usize) {
        self.instruction_pointer = target;
    }

    pub fn get_local(&self, reg: Register) -> Result<Value, RuntimeError> {
        self.registers.get(reg)
    }

    pub fn set_local(&mut self, reg: Register, value: Value) -> Result<(), RuntimeError> {
        self.registers.set(reg, value)
    }

    pub fn registers(&self) -> &ThreadLocalStorage {
        &self.registers
    }

    pub fn print<W: io::Write>(&self, out: &mut W, indent: Indent) -> io::Result<()> {
        writeln!(out, "{}Thread #{}", indent, self.thread_id)?;
        write!(out, "{}Next instruction is: ", indent.deeper())?;
        self.print_next_instruction(out, Indent(0))?;
        self.registers
            .print(out, &self.program.register_name, indent.deeper())
    }

    pub fn print_next_instruction<W: io::Write>(
        &self,
        out: &mut W,
        indent: Indent,
    ) -> io::Result<()> {
        if self.is_completed() {
            writeln!(out, "{}Instructions are completed", indent)
        } else {
            writeln!(
                out,
                "{}{}",
                indent, self.program.instructions_str[self.instruction_pointer]
            )
        }
    }
}

/// Fixed-size collection of the program's threads. Never resized after
/// creation; reports which threads could step but does not schedule.
#[derive(Clone, Debug)]
pub struct ThreadSubsystem {
    threads: Vec<Thread>,
}

impl ThreadSubsystem {
    /// One thread per entry point, thread ids assigned in entry order.
    pub fn new(program: &Rc<ProgramDescriptor>, entry_points: &[usize]) -> ThreadSubsystem {
        let threads = entry_points
            .iter()
            .enumerate()
            .map(|(tid, &ip)| Thread::new(Rc::clone(program), tid, ip))
            .collect();
        ThreadSubsystem { threads }
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Ids of the threads that still have instructions to execute,
    /// ascending.
    pub fn running(&self) -> Vec<ThreadId> {
        self.threads
            .iter()
            .enumerate()
            .filter(|(_, thread)| !thread.is_completed())
            .map(|(tid, _)| tid)
            .collect()
    }

    pub fn is_completed(&self) -> bool {
        self.threads.iter().all(Thread::is_completed)
    }

    pub fn print<W: io::Write>(&self, out: &mut W, indent: Indent) -> io::Result<()> {
        writeln!(out, "{}Threads info:", indent)?;
        for thread in &self.threads {
            thread.print(out, indent.deeper())?;
        }
        Ok(())
    }
}

impl Index<ThreadId> for ThreadSubsystem {
    type Output = Thread;

    fn index(&self, tid: ThreadId) -> &Thread {
        &self.threads[tid]
    }
}

impl IndexMut<ThreadId> for ThreadSubsystem {
    fn index_mut(&mut self, tid: ThreadId) -> &mut Thread {
        &mut self.threads[tid]
    }
}
