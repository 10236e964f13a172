//! Internal testing utilities for the strata crates.

use std::fmt::Debug;
use std::panic::{RefUnwindSafe, UnwindSafe};

/// Utility for creating table-driven tests.
///
/// Create a `Debug` struct, conventionally named `Case`, holding the data
/// for one test case, build a collection of cases and call `test_each`
/// with the test body. Every case is run even if earlier ones panic. If
/// any case fails, `test_each` panics with the count and debug
/// representations of the failing cases.
///
/// ```
/// use strata_testing::TestCases;
///
/// #[derive(Debug)]
/// struct Case {
///     size: usize,
///     step: usize,
///     expected: usize,
/// }
///
/// let cases = [
///     Case { size: 170, step: 3, expected: 57 },
///     Case { size: 0, step: 3, expected: 0 },
/// ];
///
/// cases.test_each(|&Case { size, step, expected }| {
///     let strided = if size == 0 { 0 } else { (size - 1) / step + 1 };
///     assert_eq!(strided, expected);
/// });
/// ```
///
/// Cases and the values captured by the test closure must be unwind safe.
/// Containers share their storage through reference counting, so the
/// simplest approach is to describe the container in the case (shape,
/// storage kind) and build it inside the test closure.
pub trait TestCases {
    /// The data for a single test case.
    type Case;

    /// Call `test` with a reference to each case, catching panics.
    fn test_each(self, test: impl Fn(&Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe;

    /// Variant of [`test_each`](TestCases::test_each) which passes cases by
    /// value. Each case is formatted before the test runs so that it can be
    /// reported if the test panics.
    fn test_each_value(self, test: impl Fn(Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + UnwindSafe;
}

impl<I: IntoIterator> TestCases for I {
    type Case = I::Item;

    fn test_each(self, test: impl Fn(&I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe,
    {
        let failures: Vec<_> = self
            .into_iter()
            .filter(|case| std::panic::catch_unwind(|| test(case)).is_err())
            .collect();
        report_failures(&failures);
    }

    fn test_each_value(self, test: impl Fn(I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + UnwindSafe,
    {
        let mut failures = Vec::new();
        for case in self {
            let test = &test;
            let case_str = format!("{:?}", case);
            if std::panic::catch_unwind(move || test(case)).is_err() {
                failures.push(case_str);
            }
        }
        report_failures(&failures);
    }
}

fn report_failures<T: Debug>(failures: &[T]) {
    assert_eq!(
        failures.len(),
        0,
        "{} test cases failed: {:?}",
        failures.len(),
        failures
    );
}

/// Trait that tests whether two values are approximately equal.
///
/// Uses the same formula as NumPy's `allclose`:
///
/// ```text
/// (self - other).abs() <= atol + rtol * other.abs()
/// ```
pub trait ApproxEq: Sized {
    fn default_abs_tolerance() -> Self;

    fn default_rel_tolerance() -> Self;

    fn approx_eq_with_atol_rtol(&self, other: &Self, atol: Self, rtol: Self) -> bool;

    /// Test if `other` is within `epsilon` of `self`, ignoring relative
    /// tolerance.
    fn approx_eq_with_tolerance(&self, other: &Self, epsilon: Self) -> bool;

    fn approx_eq(&self, other: &Self) -> bool {
        self.approx_eq_with_atol_rtol(
            other,
            Self::default_abs_tolerance(),
            Self::default_rel_tolerance(),
        )
    }
}

impl ApproxEq for f64 {
    #[inline]
    fn default_abs_tolerance() -> f64 {
        1e-10
    }

    #[inline]
    fn default_rel_tolerance() -> f64 {
        1e-12
    }

    #[inline]
    fn approx_eq_with_atol_rtol(&self, other: &f64, atol: f64, rtol: f64) -> bool {
        (self - other).abs() <= atol + rtol * other.abs()
    }

    #[inline]
    fn approx_eq_with_tolerance(&self, other: &f64, epsilon: f64) -> bool {
        (self - other).abs() <= epsilon
    }
}

/// Assert that two slices have the same length and approximately equal
/// elements, reporting the first mismatch.
#[track_caller]
pub fn assert_slices_approx_eq(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "lengths differ");
    if let Some((i, (a, e))) = actual
        .iter()
        .zip(expected)
        .enumerate()
        .find(|(_, (a, e))| !a.approx_eq(e))
    {
        panic!("mismatch at {}: actual {} expected {}", i, a, e);
    }
}

/// Simple, non-cryptographically secure random number generator used to
/// fill containers with reproducible test data.
///
/// See <https://en.wikipedia.org/wiki/Xorshift>.
pub struct XorShiftRng {
    state: u64,
}

impl XorShiftRng {
    pub fn new(seed: u64) -> XorShiftRng {
        XorShiftRng { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut tmp = self.state;
        tmp ^= tmp << 13;
        tmp ^= tmp >> 7;
        tmp ^= tmp << 17;
        self.state = tmp;
        tmp
    }

    /// Return a random value in the range [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        // 53 bits is the mantissa width of an f64.
        let scale = 1.0 / (1u64 << 53) as f64;
        (self.next_u64() >> 11) as f64 * scale
    }

    /// Return `len` random values in the range [0, 1).
    pub fn values(&mut self, len: usize) -> Vec<f64> {
        (0..len).map(|_| self.next_f64()).collect()
    }
}
