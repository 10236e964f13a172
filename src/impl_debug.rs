use std::fmt::{Debug, Error, Formatter};

use crate::container::NdContainer;

/// Entry in the formatted list of a container's values.
enum Entry {
    Value(f64),

    /// "..." used to elide long containers.
    Ellipsis,
}

impl Debug for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Entry::Value(val) => write!(f, "{:?}", val),
            Entry::Ellipsis => write!(f, "..."),
        }
    }
}

/// Maximum number of values printed before eliding the middle.
const MAX_VALUES: usize = 10;

/// Write `values` as a flat list, eliding the middle if there are more than
/// `max_values`.
fn write_values<I: ExactSizeIterator<Item = f64>>(
    f: &mut Formatter<'_>,
    values: impl Fn() -> I,
    max_values: usize,
) -> Result<(), Error> {
    let len = values().len();
    let head = values().take(max_values / 2);
    let tail = values()
        .skip(max_values / 2)
        .skip(len.saturating_sub(max_values));

    let mut list = f.debug_list();
    list.entries(head.map(Entry::Value));
    if len > max_values {
        list.entry(&Entry::Ellipsis);
    }
    list.entries(tail.map(Entry::Value));
    list.finish()
}

impl<const N: usize> Debug for NdContainer<N> {
    /// Print the values in row-major order followed by the shape and
    /// storage kind.
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write_values(f, || self.iter(), MAX_VALUES)?;
        write!(f, ", shape={:?}, kind={:?}", self.shape(), self.kind())?;
        if self.is_view() {
            write!(f, ", view")?;
        }
        Ok(())
    }
}
