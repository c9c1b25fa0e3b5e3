//! `Display` formatting for [`DenseMatrix`] and [`FixedMatrix3x3`].

use core::fmt;

use crate::{Float, Scalar};

use super::{DenseMatrix, FixedMatrix3x3};

fn write_rows<'a, T: Scalar>(
    f: &mut fmt::Formatter<'_>,
    rows: impl ExactSizeIterator<Item = &'a [T]>,
) -> fmt::Result {
    let last = rows.len().saturating_sub(1);
    writeln!(f, "matrix([")?;
    for (r, row) in rows.enumerate() {
        write!(f, "  [")?;
        for (c, v) in row.iter().enumerate() {
            if c > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        if r < last {
            writeln!(f, "],")?;
        } else {
            writeln!(f, "]")?;
        }
    }
    write!(f, "])")
}

impl<T: Scalar> fmt::Display for DenseMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "matrix([], shape=({}, {}))", self.num_rows, self.num_cols);
        }
        write_rows(f, (0..self.num_rows).map(|r| self.row(r)))
    }
}

impl<T: Float> fmt::Display for FixedMatrix3x3<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.to_rows();
        write_rows(f, rows.iter().map(<[T; 3]>::as_slice))
    }
}
