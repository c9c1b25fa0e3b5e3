//! Matrix creation functions.

use crate::Scalar;

use super::DenseMatrix;

impl<T: Scalar> DenseMatrix<T> {
    /// Create a matrix filled with zeros.
    ///
    /// ```
    /// # use linsolve_core::matrix::DenseMatrix;
    /// let m = DenseMatrix::<f64>::zeros(2, 3);
    /// assert_eq!(m.shape(), (2, 3));
    /// assert!(m.iter().all(|&x| x == 0.0));
    /// ```
    pub fn zeros(num_rows: usize, num_cols: usize) -> Self {
        Self::filled(num_rows, num_cols, T::zero())
    }

    /// Create a matrix filled with a constant value.
    pub fn filled(num_rows: usize, num_cols: usize, value: T) -> Self {
        Self {
            data: vec![value; num_rows * num_cols],
            num_rows,
            num_cols,
        }
    }

    /// Create an identity matrix of size `n x n`.
    ///
    /// ```
    /// # use linsolve_core::matrix::DenseMatrix;
    /// let eye = DenseMatrix::<f64>::identity(3);
    /// assert_eq!(eye.get(0, 0).unwrap(), 1.0);
    /// assert_eq!(eye.get(0, 1).unwrap(), 0.0);
    /// ```
    pub fn identity(n: usize) -> Self {
        let mut data = vec![T::zero(); n * n];
        for i in 0..n {
            data[i * n + i] = T::one();
        }
        Self {
            data,
            num_rows: n,
            num_cols: n,
        }
    }

    /// Create an `n x 1` column vector.
    pub fn column_vector(values: Vec<T>) -> Self {
        let n = values.len();
        Self {
            data: values,
            num_rows: n,
            num_cols: 1,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let eye = DenseMatrix::<f64>::identity(3);
        assert_eq!(
            eye.as_slice(),
            &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_filled() {
        let m = DenseMatrix::filled(2, 2, 3.5_f32);
        assert!(m.iter().all(|&x| x == 3.5));
    }

    #[test]
    fn test_column_vector() {
        let v = DenseMatrix::column_vector(vec![1.0, 2.0, 3.0]);
        assert_eq!(v.shape(), (3, 1));
    }

    #[test]
    fn test_empty() {
        let m = DenseMatrix::<f64>::zeros(0, 0);
        assert!(m.is_empty());
        assert!(m.is_square());
    }
}
