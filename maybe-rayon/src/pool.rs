use alloc::string::String;

use thiserror::Error;

/// Failure to bring up a dedicated worker pool.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("could not build a pool of {requested} worker threads: {reason}")]
pub struct ThreadPoolError {
    pub requested: usize,
    pub reason: String,
}

/// Number of worker threads a parallel region started from here would use.
///
/// Always `1` without the `parallel` feature.
#[cfg(feature = "parallel")]
#[inline]
pub fn current_num_threads() -> usize {
    rayon::current_num_threads()
}

#[cfg(not(feature = "parallel"))]
#[inline]
pub const fn current_num_threads() -> usize {
    1
}

/// Run `op` with `num_threads` workers available to the parallel iterators inside it.
///
/// `0`, or the size of the pool we are already running in, reuses the current pool. Any other
/// count gets a dedicated pool that lives for this call.
#[cfg(feature = "parallel")]
pub fn install<OP, R>(num_threads: usize, op: OP) -> Result<R, ThreadPoolError>
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    use alloc::string::ToString;

    if num_threads == 0 || num_threads == rayon::current_num_threads() {
        return Ok(op());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| ThreadPoolError {
            requested: num_threads,
            reason: e.to_string(),
        })?;
    Ok(pool.install(op))
}

#[cfg(not(feature = "parallel"))]
pub fn install<OP, R>(_num_threads: usize, op: OP) -> Result<R, ThreadPoolError>
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    Ok(op())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_reports_requested_pool_size() {
        let seen = install(2, current_num_threads).unwrap();
        if cfg!(feature = "parallel") {
            assert_eq!(seen, 2);
        } else {
            assert_eq!(seen, 1);
        }
    }

    #[test]
    fn zero_reuses_current_pool() {
        let outer = current_num_threads();
        assert_eq!(install(0, current_num_threads).unwrap(), outer);
    }

    #[test]
    fn error_message_names_requested_count() {
        let err = ThreadPoolError {
            requested: 3,
            reason: "boom".into(),
        };
        assert_eq!(
            alloc::format!("{err}"),
            "could not build a pool of 3 worker threads: boom"
        );
    }
}
