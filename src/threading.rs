use std::env;
use std::sync::OnceLock;

/// A wrapper around the Rayon thread pool that runs bulk operations.
///
/// The number of threads in the pool an operation runs in is the available
/// parallelism for that operation. Running an operation inside a pool with
/// one thread forces the sequential path:
///
/// ```
/// use strata::{ThreadPool, Vector};
///
/// let v = Vector::ascending(100_000);
/// let sequential = ThreadPool::with_num_threads(1).run(|| v.aggregate(|a, b| a + b, |x| x));
/// let parallel = ThreadPool::with_num_threads(4).run(|| v.aggregate(|a, b| a + b, |x| x));
/// assert_eq!(sequential, parallel);
/// ```
pub struct ThreadPool {
    /// The wrapped thread pool, or None if we failed to construct one.
    pool: Option<rayon::ThreadPool>,
}

impl ThreadPool {
    /// Run a function in the thread pool.
    ///
    /// This corresponds to [`rayon::ThreadPool::install`], except when the
    /// pool could not be created, where it just runs `op` directly.
    pub fn run<R: Send, Op: FnOnce() -> R + Send>(&self, op: Op) -> R {
        if let Some(pool) = self.pool.as_ref() {
            pool.install(op)
        } else {
            op()
        }
    }

    /// Create a thread pool with a given number of threads.
    pub fn with_num_threads(num_threads: usize) -> ThreadPool {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("strata-{}", index))
            .build();

        if let Err(err) = &pool {
            tracing::warn!(%err, "failed to create thread pool, running on the calling thread");
        }

        ThreadPool { pool: pool.ok() }
    }

    /// Return the number of threads that operations run with [`run`](Self::run)
    /// can use.
    pub fn num_threads(&self) -> usize {
        self.pool
            .as_ref()
            .map(|pool| pool.current_num_threads())
            .unwrap_or(1)
    }
}

/// Return the number of physical cores, which is the default size of the
/// global pool.
fn optimal_core_count() -> u32 {
    num_cpus::get_physical().max(1) as u32
}

/// Return the [Rayon][rayon] thread pool which runs bulk operations that are
/// not already running inside a Rayon pool.
///
/// This differs from Rayon's default global thread pool in that it chooses a
/// thread count based on the number of physical rather than logical cores.
///
/// The thread count can be overridden at the process level by setting the
/// `STRATA_NUM_THREADS` environment variable, whose value must be a number
/// between 1 and the logical core count.
///
/// [rayon]: https://github.com/rayon-rs/rayon
pub fn thread_pool() -> &'static ThreadPool {
    static THREAD_POOL: OnceLock<ThreadPool> = OnceLock::new();
    THREAD_POOL.get_or_init(|| {
        let physical_cpus = optimal_core_count();

        let num_threads = if let Some(threads_var) = env::var_os("STRATA_NUM_THREADS") {
            let requested_threads: Result<u32, _> = threads_var.to_string_lossy().parse();
            match requested_threads {
                Ok(n_threads) => n_threads.clamp(1, num_cpus::get() as u32),
                Err(_) => {
                    tracing::warn!(
                        value = %threads_var.to_string_lossy(),
                        "invalid STRATA_NUM_THREADS, using physical core count"
                    );
                    physical_cpus
                }
            }
        } else {
            physical_cpus
        };

        tracing::debug!(num_threads, "creating global thread pool");
        ThreadPool::with_num_threads(num_threads as usize)
    })
}
