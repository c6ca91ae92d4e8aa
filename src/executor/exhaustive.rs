use std::io;

use util::Indent;

use super::{ControllableExecutor, ExecutionError};

/// Depth-first exploration of every schedule reachable from `executor`.
///
/// For each enabled transition index the configuration is cloned, the
/// transition applied to the clone, and the resulting configuration explored
/// recursively; every terminal configuration is printed to `out`. There is
/// no deduplication and no depth bound, so exploration of a program with an
/// infinite state space does not terminate. A runtime error in any branch
/// aborts the whole exploration.
pub fn explore<W: io::Write>(
    executor: &ControllableExecutor,
    tracing: bool,
    out: &mut W,
) -> Result<(), ExecutionError> {
    let running = executor.enabled_thread_steps();
    let propagations = executor.enabled_propagations();
    let total = running.len() + propagations.len();

    if total == 0 {
        writeln!(out, "Terminal state:")?;
        executor.print_snapshot(out, Indent(0))?;
        return Ok(());
    }
    if tracing {
        executor.print_snapshot(out, Indent(0))?;
    }
    for selection in 0..total {
        let mut branch = executor.clone();
        branch.select(selection, &running, &propagations)?;
        explore(&branch, tracing, out)?;
    }
    Ok(())
}
