use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ControllableExecutor, ExecutionError, Scheduler};
use crate::memory::Propagation;
use crate::ThreadId;

/// Picks uniformly among the enabled transitions.
pub struct RandomScheduler {
    rng: StdRng,
}

impl RandomScheduler {
    /// Seeds the generator from the wall clock, so repeated runs explore
    /// different schedules.
    pub fn from_time() -> RandomScheduler {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default();
        RandomScheduler::with_seed(seed)
    }

    pub fn with_seed(seed: u64) -> RandomScheduler {
        RandomScheduler {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Scheduler for RandomScheduler {
    fn select(
        &mut self,
        _executor: &ControllableExecutor,
        running: &[ThreadId],
        propagations: &[Propagation],
    ) -> Result<usize, ExecutionError> {
        Ok(self.rng.gen_range(0..running.len() + propagations.len()))
    }
}
