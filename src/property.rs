use crate::container::NdContainer;

/// Tolerance-based comparisons of containers.
///
/// Two values are equal if their difference is at most `tolerance`. Two
/// NaNs are equal to each other, and an infinity is equal to itself.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Property {
    pub tolerance: f64,
}

impl Default for Property {
    fn default() -> Self {
        Property { tolerance: 1e-9 }
    }
}

impl Property {
    pub fn new(tolerance: f64) -> Property {
        Property {
            tolerance: tolerance.abs(),
        }
    }

    /// Return true if `a` and `b` are equal within the tolerance.
    pub fn values_equal(&self, a: f64, b: f64) -> bool {
        let mut diff = (a - b).abs();
        if diff.is_nan() && ((a.is_nan() && b.is_nan()) || a == b) {
            diff = 0.;
        }
        diff <= self.tolerance
    }

    /// Return true if every element of `a` equals `value`.
    pub fn equals_value<const N: usize>(&self, a: &NdContainer<N>, value: f64) -> bool {
        a.iter().all(|x| self.values_equal(value, x))
    }

    /// Return true if `a` and `b` have the same shape and equal elements.
    pub fn equals<const N: usize>(&self, a: &NdContainer<N>, b: &NdContainer<N>) -> bool {
        if a.shape() != b.shape() {
            return false;
        }
        a.iter()
            .zip(b.iter())
            .all(|(x, y)| self.values_equal(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::Property;
    use crate::{Matrix, Vector};

    #[test]
    fn test_values_equal() {
        let prop = Property::default();
        assert!(prop.values_equal(1., 1. + 1e-10));
        assert!(!prop.values_equal(1., 1.1));
        assert!(prop.values_equal(f64::NAN, f64::NAN));
        assert!(!prop.values_equal(f64::NAN, 0.));
        assert!(prop.values_equal(f64::INFINITY, f64::INFINITY));
        assert!(!prop.values_equal(f64::INFINITY, f64::NEG_INFINITY));
    }

    #[test]
    fn test_equals_value() {
        let mut v = Vector::sparse(10);
        v.assign(1.);
        let prop = Property::default();
        assert!(prop.equals_value(&v, 1.));
        assert!(!prop.equals_value(&v, 2.));
        assert!(Property::new(1.5).equals_value(&v, 2.));
    }

    #[test]
    fn test_equals() {
        let prop = Property::default();
        let a = Matrix::from_rows(&[vec![1., 2.], vec![2., 1.]]).unwrap();
        assert!(prop.equals(&a, &a.view_dice()));
        assert!(prop.equals(&a, &a.copy_with_kind(crate::StorageKind::Sparse)));
        assert!(!prop.equals(&a, &a.view_row_flip()));
        assert!(!prop.equals(&a, &Matrix::zeros(2, 3)));
    }
}
