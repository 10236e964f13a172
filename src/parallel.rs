//! Chunked fan-out of bulk operations over worker threads.
//!
//! Bulk operations visit the logical positions `0..len` of a container in
//! row-major order. When `len` exceeds a rank-dependent threshold and more
//! than one thread is available, the positions are split into contiguous
//! chunks which are processed in parallel. Results are returned in chunk
//! order, independent of which worker finishes first.

use std::ops::Range;
use std::sync::OnceLock;

use rayon::prelude::*;

use crate::env::env_flag;
use crate::threading::thread_pool;

/// Minimum number of elements in a vector for bulk operations to run in
/// parallel.
pub const VECTOR_THRESHOLD: usize = 32768;

/// Minimum number of elements in a matrix for bulk operations to run in
/// parallel.
pub const MATRIX_THRESHOLD: usize = 65536;

/// Minimum number of elements in a cube for bulk operations to run in
/// parallel.
pub const CUBE_THRESHOLD: usize = 65536;

/// Return the parallel threshold for containers of a given rank.
pub fn threshold_for_rank(ndim: usize) -> usize {
    match ndim {
        0 | 1 => VECTOR_THRESHOLD,
        2 => MATRIX_THRESHOLD,
        _ => CUBE_THRESHOLD,
    }
}

/// Return false if parallel execution has been disabled by setting
/// `STRATA_PARALLEL=0`.
pub fn parallel_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| env_flag("STRATA_PARALLEL", true))
}

/// Split `0..len` into `min(n, len)` contiguous chunks of equal size. The last
/// chunk absorbs the remainder.
pub fn partition(len: usize, n: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    let n = n.clamp(1, len);
    let chunk_size = len / n;
    (0..n)
        .map(|i| {
            let start = i * chunk_size;
            let end = if i == n - 1 { len } else { start + chunk_size };
            start..end
        })
        .collect()
}

/// Run `op` with the number of threads available to it.
///
/// Calls made from inside a Rayon pool use that pool. Other calls are
/// moved into the global pool returned by [`thread_pool`].
fn run_in_pool<R: Send>(op: impl FnOnce(usize) -> R + Send) -> R {
    if rayon::current_thread_index().is_some() {
        op(rayon::current_num_threads())
    } else {
        let pool = thread_pool();
        let num_threads = pool.num_threads();
        pool.run(move || op(num_threads))
    }
}

/// Apply `f` to chunks of the positions `0..len` and return the results in
/// chunk order.
///
/// If `len` does not exceed `threshold`, or only one thread is available, `f`
/// is called once on the calling thread with the whole range.
pub(crate) fn map_chunks<R, F>(len: usize, threshold: usize, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(Range<usize>) -> R + Sync + Send,
{
    if len <= threshold || !parallel_enabled() {
        return vec![f(0..len)];
    }

    run_in_pool(|num_threads| {
        if num_threads <= 1 {
            tracing::trace!(len, "single thread available, running sequentially");
            return vec![f(0..len)];
        }
        let chunks = partition(len, num_threads);
        tracing::debug!(
            len,
            threshold,
            chunks = chunks.len(),
            "running bulk operation in parallel"
        );
        chunks.into_par_iter().map(&f).collect()
    })
}

/// Apply `f` to chunks of the positions `0..len`, blocking until all chunks
/// are done.
pub(crate) fn for_each_chunk<F>(len: usize, threshold: usize, f: F)
where
    F: Fn(Range<usize>) + Sync + Send,
{
    map_chunks(len, threshold, f);
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use strata_testing::TestCases;

    use super::{for_each_chunk, map_chunks, partition, threshold_for_rank, VECTOR_THRESHOLD};
    use crate::ThreadPool;

    #[test]
    fn test_partition() {
        #[derive(Debug)]
        struct Case {
            len: usize,
            n: usize,
            expected: Vec<std::ops::Range<usize>>,
        }

        let cases = [
            Case {
                len: 10,
                n: 3,
                expected: vec![0..3, 3..6, 6..10],
            },
            Case {
                len: 8,
                n: 4,
                expected: vec![0..2, 2..4, 4..6, 6..8],
            },
            Case {
                len: 2,
                n: 8,
                expected: vec![0..1, 1..2],
            },
            Case {
                len: 5,
                n: 1,
                expected: vec![0..5],
            },
            Case {
                len: 0,
                n: 4,
                expected: vec![],
            },
        ];

        cases.test_each(|case| {
            assert_eq!(partition(case.len, case.n), case.expected);
        })
    }

    #[test]
    fn test_map_chunks_in_order() {
        let len = VECTOR_THRESHOLD * 3 + 7;

        let chunks =
            ThreadPool::with_num_threads(4).run(|| map_chunks(len, VECTOR_THRESHOLD, |r| r));
        if super::parallel_enabled() {
            assert_eq!(chunks, partition(len, 4));
        }
        assert_eq!(chunks.first().map(|r| r.start), Some(0));
        assert_eq!(chunks.last().map(|r| r.end), Some(len));

        let chunks =
            ThreadPool::with_num_threads(1).run(|| map_chunks(len, VECTOR_THRESHOLD, |r| r));
        assert_eq!(chunks, [0..len]);

        // Below the threshold, the work is never split.
        let chunks =
            ThreadPool::with_num_threads(4).run(|| map_chunks(100, VECTOR_THRESHOLD, |r| r));
        assert_eq!(chunks, [0..100]);
    }

    #[test]
    fn test_for_each_chunk_visits_every_position() {
        let len = VECTOR_THRESHOLD * 2 + 1;
        let visited = AtomicUsize::new(0);
        ThreadPool::with_num_threads(3).run(|| {
            for_each_chunk(len, VECTOR_THRESHOLD, |r| {
                visited.fetch_add(r.len(), Ordering::SeqCst);
            })
        });
        assert_eq!(visited.load(Ordering::SeqCst), len);
    }

    #[test]
    fn test_threshold_for_rank() {
        assert_eq!(threshold_for_rank(1), 32768);
        assert_eq!(threshold_for_rank(2), 65536);
        assert_eq!(threshold_for_rank(3), 65536);
    }
}
