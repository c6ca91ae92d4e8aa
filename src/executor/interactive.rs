use std::io::{self, BufRead, Write};

use util::Indent;

use super::{ControllableExecutor, ExecutionError, Scheduler};
use crate::memory::Propagation;
use crate::ThreadId;

/// Prints every enabled transition with its index and reads the selection
/// from standard input. The only operation in the engine that blocks.
pub struct InteractiveScheduler;

impl Scheduler for InteractiveScheduler {
    fn select(
        &mut self,
        executor: &ControllableExecutor,
        running: &[ThreadId],
        propagations: &[Propagation],
    ) -> Result<usize, ExecutionError> {
        let stdout = io::stdout();
        let mut out = stdout.lock();

        writeln!(out, "Transition options:")?;
        for (index, &tid) in running.iter().enumerate() {
            write!(out, "{}{}. Next instruction in thread#{}: ", Indent(1), index, tid)?;
            executor.print_instruction(&mut out, tid, Indent(0))?;
        }
        for (offset, &propagation) in propagations.iter().enumerate() {
            writeln!(
                out,
                "{}{}. {}",
                Indent(1),
                running.len() + offset,
                executor.describe_propagation(propagation)
            )?;
        }
        write!(out, "Please enter the index of a next transition: ")?;
        out.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        let input = line.trim();
        let selection: usize = input
            .parse()
            .map_err(|_| ExecutionError::Input(format!("expected a transition index, got \"{}\"", input)))?;
        let total = running.len() + propagations.len();
        if selection >= total {
            return Err(ExecutionError::Input(format!(
                "transition index {} is out of range (0..{})",
                selection, total
            )));
        }
        Ok(selection)
    }
}
