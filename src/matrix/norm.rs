use crate::traits::FloatScalar;

use super::Matrix;

// ── Matrix norms ────────────────────────────────────────────────────

impl<T: FloatScalar> Matrix<T> {
    /// Frobenius norm (square root of the sum of squared elements).
    ///
    /// ```
    /// use numeig::Matrix;
    /// let m = Matrix::from_rows(2, 2, &[3.0_f64, 0.0, 0.0, 4.0]);
    /// assert!((m.norm_fro() - 5.0).abs() < 1e-12);
    /// ```
    pub fn norm_fro(&self) -> T {
        let mut sum = T::zero();
        for &x in self.data.iter() {
            sum = sum + x * x;
        }
        sum.sqrt()
    }

    /// Sum of absolute values of all elements.
    ///
    /// ```
    /// use numeig::Matrix;
    /// let m = Matrix::from_rows(2, 2, &[1.0_f64, -2.0, 3.0, -4.0]);
    /// assert!((m.norm_l1() - 10.0).abs() < 1e-12);
    /// ```
    pub fn norm_l1(&self) -> T {
        let mut sum = T::zero();
        for &x in self.data.iter() {
            sum = sum + x.abs();
        }
        sum
    }

    /// Largest absolute element value.
    ///
    /// ```
    /// use numeig::Matrix;
    /// let m = Matrix::from_rows(2, 2, &[1.0_f64, -7.0, 3.0, 4.0]);
    /// assert!((m.norm_max() - 7.0).abs() < 1e-12);
    /// ```
    pub fn norm_max(&self) -> T {
        let mut max = T::zero();
        for &x in self.data.iter() {
            if x.abs() > max {
                max = x.abs();
            }
        }
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frobenius() {
        let m = Matrix::from_rows(2, 3, &[1.0_f64, 2.0, 2.0, 0.0, -2.0, 1.0]);
        // 1 + 4 + 4 + 0 + 4 + 1 = 14
        assert!((m.norm_fro() - 14.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn zero_matrix_norms() {
        let m = Matrix::zeros(3, 3, 0.0_f64);
        assert_eq!(m.norm_fro(), 0.0);
        assert_eq!(m.norm_l1(), 0.0);
        assert_eq!(m.norm_max(), 0.0);
    }
}
