/*!
Serial and worker-pool backends for per-body batch jobs.

A batch job is a closure over one contiguous, disjoint chunk of a mutable
slice. The parallel backend hands chunks to the rayon pool and returns only
after every chunk has run, so the call itself is the frame barrier. Without
the `parallel` feature it degrades to running the chunks in order.
*/

/// Which backend runs a batch job. Selected per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scheduler {
    /// One call on the current thread covering the whole slice.
    #[default]
    Serial,
    /// Chunks of `batch_size` items spread over the worker pool.
    Parallel { batch_size: usize },
}

impl Scheduler {
    #[inline]
    pub fn is_parallel(&self) -> bool {
        matches!(self, Scheduler::Parallel { .. })
    }

    /// Runs `job(start, chunk)` over disjoint chunks covering all of `items`,
    /// where `start` is the index of `chunk[0]` in `items`. Returns once every
    /// chunk is done.
    pub fn for_each_batch<T, F>(&self, items: &mut [T], job: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        if items.is_empty() {
            return;
        }
        match *self {
            Scheduler::Serial => job(0, items),
            Scheduler::Parallel { batch_size } => {
                let batch_size = batch_size.max(1);
                log::trace!(
                    "dispatching {} items in batches of {batch_size}",
                    items.len()
                );
                run_batches(items, batch_size, &job);
            }
        }
    }
}

#[cfg(feature = "parallel")]
fn run_batches<T, F>(items: &mut [T], batch_size: usize, job: &F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    use rayon::prelude::*;

    items
        .par_chunks_mut(batch_size)
        .enumerate()
        .for_each(|(batch, chunk)| job(batch * batch_size, chunk));
}

#[cfg(not(feature = "parallel"))]
fn run_batches<T, F>(items: &mut [T], batch_size: usize, job: &F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    for (batch, chunk) in items.chunks_mut(batch_size).enumerate() {
        job(batch * batch_size, chunk);
    }
}
