use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The row stride does not divide the buffer.
    #[error("row stride {0} does not divide a buffer of length {1}")]
    InvalidRowStride(usize, usize),
}

/// Controls how row-wise operations are executed.
///
/// Every output row depends only on read-only inputs, so all strategies produce
/// the same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    ///
    /// This is the reference path used for timing comparisons.
    #[default]
    Serial,

    /// Use the global Rayon thread pool to process rows in parallel.
    ParallelRows,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// Map a thread count to a strategy, where `0` means serial execution.
    pub fn from_threads(threads: usize) -> Self {
        match threads {
            0 => ExecutionStrategy::Serial,
            n => ExecutionStrategy::Fixed(n),
        }
    }
}

/// Apply `f` to every row of `dst`, passing the row index.
///
/// # Arguments
///
/// * `dst` - The row-major buffer to fill.
/// * `row_stride` - The number of elements in a row.
/// * `strategy` - How the rows are scheduled.
/// * `f` - Called once per row with `(row_index, row)`.
pub fn par_iter_rows_indexed<T, F>(
    dst: &mut [T],
    row_stride: usize,
    strategy: ExecutionStrategy,
    f: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if row_stride == 0 || dst.len() % row_stride != 0 {
        return Err(ParallelError::InvalidRowStride(row_stride, dst.len()));
    }

    match strategy {
        ExecutionStrategy::Serial => {
            dst.chunks_exact_mut(row_stride)
                .enumerate()
                .for_each(|(row, chunk)| f(row, chunk));
        }
        ExecutionStrategy::ParallelRows => {
            dst.par_chunks_exact_mut(row_stride)
                .enumerate()
                .for_each(|(row, chunk)| f(row, chunk));
        }
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;
            pool.install(|| {
                dst.par_chunks_exact_mut(row_stride)
                    .enumerate()
                    .for_each(|(row, chunk)| f(row, chunk));
            });
        }
    }

    Ok(())
}
