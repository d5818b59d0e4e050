use alloc::vec;
use alloc::vec::Vec;

use crate::linalg::LinalgError;
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};
use crate::Matrix;

/// Cholesky decomposition in place: `A = L * L^T`.
///
/// On return, the lower triangle of `a` (including diagonal) contains L.
/// The upper triangle is left unchanged.
///
/// Returns [`LinalgError::NotPositiveDefinite`] carrying the 1-based index
/// of the first failing leading minor, the same status convention the QR
/// iteration uses for its first unconverged row.
pub fn cholesky_in_place<T: FloatScalar>(a: &mut impl MatrixMut<T>) -> Result<(), LinalgError> {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "Cholesky decomposition requires a square matrix");

    for j in 0..n {
        for k in 0..j {
            let ljk = *a.get(j, k);
            for i in j..n {
                *a.get_mut(i, j) = *a.get(i, j) - ljk * *a.get(i, k);
            }
        }

        let diag = *a.get(j, j);
        if diag <= T::zero() {
            return Err(LinalgError::NotPositiveDefinite(j + 1));
        }
        let ljj = diag.sqrt();
        *a.get_mut(j, j) = ljj;

        let inv_ljj = T::one() / ljj;
        for i in (j + 1)..n {
            *a.get_mut(i, j) = *a.get(i, j) * inv_ljj;
        }
    }

    Ok(())
}

/// Solve `L*x = b` by forward substitution, where L is lower triangular.
#[inline]
pub fn forward_substitute<T: FloatScalar>(l: &impl MatrixRef<T>, b: &[T], x: &mut [T]) {
    let n = l.nrows();
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum = sum - *l.get(i, j) * x[j];
        }
        x[i] = sum / *l.get(i, i);
    }
}

/// Solve `L^T*x = b` by back substitution, where L is lower triangular.
#[inline]
pub fn back_substitute_lt<T: FloatScalar>(l: &impl MatrixRef<T>, b: &[T], x: &mut [T]) {
    let n = l.nrows();
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum = sum - *l.get(j, i) * x[j];
        }
        x[i] = sum / *l.get(i, i);
    }
}

/// Cholesky decomposition of a symmetric positive-definite matrix.
///
/// # Example
///
/// ```
/// use numeig::Matrix;
///
/// let a = Matrix::from_rows(2, 2, &[4.0_f64, 2.0, 2.0, 3.0]);
/// let chol = a.cholesky().unwrap();
///
/// let x = chol.solve(&[8.0, 7.0]); // solve Ax = b
/// let det = chol.det();
/// assert!((det - 8.0).abs() < 1e-12);
/// assert!((x[0] - 1.25).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct CholeskyDecomposition<T> {
    /// Lower triangular Cholesky factor L (A = L·L^T).
    l: Matrix<T>,
}

impl<T: FloatScalar> CholeskyDecomposition<T> {
    /// Decompose a symmetric positive-definite matrix.
    ///
    /// Returns an error if the matrix is not positive definite.
    #[inline]
    pub fn new(a: &Matrix<T>) -> Result<Self, LinalgError> {
        assert!(a.is_square(), "Cholesky decomposition requires a square matrix");
        let mut l = a.clone();
        cholesky_in_place(&mut l)?;
        Ok(Self { l })
    }

    /// Extract the full lower triangular factor (zeros above diagonal).
    pub fn l_full(&self) -> Matrix<T> {
        let n = self.l.nrows();
        let mut out = self.l.clone();
        for j in 1..n {
            for i in 0..j {
                out[(i, j)] = T::zero();
            }
        }
        out
    }

    /// Solve `A*x = b` for x, where `A = L·L^T`.
    pub fn solve(&self, b: &[T]) -> Vec<T> {
        let n = self.l.nrows();
        assert_eq!(b.len(), n, "rhs length mismatch");
        let mut y = vec![T::zero(); n];
        let mut x = vec![T::zero(); n];

        forward_substitute(&self.l, b, &mut y);
        back_substitute_lt(&self.l, &y, &mut x);

        x
    }

    /// Compute the determinant: `det(A) = (Π L[i,i])²`.
    pub fn det(&self) -> T {
        let n = self.l.nrows();
        let mut prod = T::one();
        for i in 0..n {
            prod = prod * self.l[(i, i)];
        }
        prod * prod
    }

    /// Compute the matrix inverse using the Cholesky factorization.
    pub fn inverse(&self) -> Matrix<T> {
        let n = self.l.nrows();
        let mut inv = Matrix::zeros(n, n, T::zero());
        let mut e = vec![T::zero(); n];
        let mut y = vec![T::zero(); n];
        let mut x = vec![T::zero(); n];

        for col in 0..n {
            if col > 0 {
                e[col - 1] = T::zero();
            }
            e[col] = T::one();

            forward_substitute(&self.l, &e, &mut y);
            back_substitute_lt(&self.l, &y, &mut x);

            for row in 0..n {
                inv[(row, col)] = x[row];
            }
        }

        inv
    }
}

/// Convenience methods on square matrices.
impl<T: FloatScalar> Matrix<T> {
    /// Cholesky decomposition (`A = L * L^T`).
    ///
    /// Returns an error if the matrix is not positive definite.
    ///
    /// ```
    /// use numeig::Matrix;
    /// let spd = Matrix::from_rows(2, 2, &[4.0_f64, 2.0, 2.0, 3.0]);
    /// let chol = spd.cholesky().unwrap();
    /// let l = chol.l_full();
    /// let reconstructed = &l * &l.transpose();
    /// assert!((reconstructed[(0, 0)] - 4.0).abs() < 1e-12);
    /// ```
    #[inline]
    pub fn cholesky(&self) -> Result<CholeskyDecomposition<T>, LinalgError> {
        CholeskyDecomposition::new(self)
    }
}
