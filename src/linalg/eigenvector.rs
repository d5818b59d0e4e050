use alloc::vec::Vec;
use num_complex::Complex;

use crate::linalg::schur::SchurDecomposition;
use crate::linalg::LinalgError;
use crate::traits::{FloatScalar, MatrixMut};
use crate::Matrix;

/// Helper: get element with dereference for calling Float methods.
#[inline]
fn g<T: Copy>(m: &impl crate::traits::MatrixRef<T>, i: usize, j: usize) -> T {
    *m.get(i, j)
}

/// Smallest magnitude that still fails to perturb `scale` when added to it.
///
/// Back-substitution divisors of the form `H(i,i) - lambda` can vanish for
/// repeated eigenvalues; flooring them at this value bounds the solution
/// components instead of overflowing.
fn divisor_floor<T: FloatScalar>(scale: T) -> T {
    let one = T::one();
    let two = one + one;
    let ten = two * (two + two + one);
    let hundredth = one / (ten * ten);

    let mut t = scale;
    loop {
        t = t * hundredth;
        if scale + t <= scale {
            break;
        }
    }
    t
}

/// Recover eigenvectors from a converged real Schur form by
/// back-substitution.
///
/// `h` must be the quasi-upper-triangular output of
/// [`hessenberg_schur`](crate::linalg::hessenberg_schur), `wr`/`wi` its
/// eigenvalue arrays, `z` the accumulated orthogonal transform, and `norm`
/// the matrix norm the iteration returned (every near-singular divisor is
/// floored relative to it). On return the columns of `z` hold the
/// eigenvectors of the original matrix in the paired real storage scheme:
///
/// - `wi[j] == 0`: column `j` is a real eigenvector;
/// - `wi[j] > 0`: the eigenvector is `z[:,j] + i * z[:,j+1]`;
/// - `wi[j] < 0`: the conjugate of the previous pair, `z[:,j-1] - i * z[:,j]`.
///
/// An inconsistently paired `wi` (a complex entry without its adjacent
/// conjugate) returns [`LinalgError::BadPairing`] rather than truncating.
pub fn schur_to_eigen<T: FloatScalar>(
    h: &mut impl MatrixMut<T>,
    low: usize,
    high: usize,
    wr: &[T],
    wi: &[T],
    z: &mut impl MatrixMut<T>,
    norm: T,
) -> Result<(), LinalgError> {
    let n = h.nrows();
    assert_eq!(n, h.ncols(), "schur_to_eigen requires a square matrix");
    assert_eq!(wr.len(), n, "wr length must equal the matrix order");
    assert_eq!(wi.len(), n, "wi length must equal the matrix order");
    assert_eq!(z.nrows(), n, "transform matrix row count mismatch");
    assert_eq!(z.ncols(), n, "transform matrix column count mismatch");
    if n == 0 {
        return Ok(());
    }
    assert!(
        low <= high && high < n,
        "window [{}, {}] out of range for order {}",
        low,
        high,
        n
    );

    if norm == T::zero() {
        return Ok(());
    }

    let one = T::one();
    let two = one + one;

    // Back-substitute each eigenvector into the columns of h, bottom up
    for en in (0..n).rev() {
        let p = wr[en];
        let q = wi[en];

        if q > T::zero() {
            // First member of a conjugate pair: handled together with its
            // partner below. Just validate the pairing.
            if en + 1 >= n || wi[en + 1] != -q {
                return Err(LinalgError::BadPairing);
            }
        } else if q == T::zero() {
            // Real eigenvector
            let mut m = en;
            *h.get_mut(en, en) = one;

            let mut zz = T::zero();
            let mut s = T::zero();
            for i in (0..en).rev() {
                let w = g(h, i, i) - p;
                let mut r = T::zero();
                for j in m..=en {
                    r = r + g(h, i, j) * g(h, j, en);
                }

                if wi[i] < T::zero() {
                    // Lower member of a pair above: defer to the 2x2 solve
                    zz = w;
                    s = r;
                    continue;
                }

                m = i;
                if wi[i] == T::zero() {
                    let mut t = w;
                    if t == T::zero() {
                        t = divisor_floor(norm);
                    }
                    *h.get_mut(i, en) = -r / t;
                } else {
                    // Solve the real 2x2 system for the pair rows i, i+1
                    let x = g(h, i, i + 1);
                    let y = g(h, i + 1, i);
                    let denom = (wr[i] - p) * (wr[i] - p) + wi[i] * wi[i];
                    let t = (x * s - zz * r) / denom;
                    *h.get_mut(i, en) = t;
                    if x.abs() > zz.abs() {
                        *h.get_mut(i + 1, en) = (-r - w * t) / x;
                    } else {
                        *h.get_mut(i + 1, en) = (-s - y * t) / zz;
                    }
                }

                // Overflow control
                let t = g(h, i, en).abs();
                if t != T::zero() && t + one / t <= t {
                    for j in i..=en {
                        *h.get_mut(j, en) = g(h, j, en) / t;
                    }
                }
            }
        } else {
            // Second member of a conjugate pair: complex eigenvector in
            // columns en-1 (real part) and en (imaginary part)
            if en == 0 || wi[en - 1] != -q {
                return Err(LinalgError::BadPairing);
            }
            let na = en - 1;
            let mut m = na;

            if g(h, en, na).abs() > g(h, na, en).abs() {
                *h.get_mut(na, na) = q / g(h, en, na);
                *h.get_mut(na, en) = -(g(h, en, en) - p) / g(h, en, na);
            } else {
                let c = Complex::new(T::zero(), -g(h, na, en))
                    / Complex::new(g(h, na, na) - p, q);
                *h.get_mut(na, na) = c.re;
                *h.get_mut(na, en) = c.im;
            }
            *h.get_mut(en, na) = T::zero();
            *h.get_mut(en, en) = one;

            let mut zz = T::zero();
            let mut r = T::zero();
            let mut s = T::zero();
            for i in (0..na).rev() {
                let w = g(h, i, i) - p;
                let mut ra = T::zero();
                let mut sa = T::zero();
                for j in m..=en {
                    ra = ra + g(h, i, j) * g(h, j, na);
                    sa = sa + g(h, i, j) * g(h, j, en);
                }

                if wi[i] < T::zero() {
                    zz = w;
                    r = ra;
                    s = sa;
                    continue;
                }

                m = i;
                if wi[i] == T::zero() {
                    let c = Complex::new(-ra, -sa) / Complex::new(w, q);
                    *h.get_mut(i, na) = c.re;
                    *h.get_mut(i, en) = c.im;
                } else {
                    // Solve the complex 2x2 system for the pair rows i, i+1
                    let x = g(h, i, i + 1);
                    let y = g(h, i + 1, i);
                    let mut vr = (wr[i] - p) * (wr[i] - p) + wi[i] * wi[i] - q * q;
                    let vi = (wr[i] - p) * two * q;
                    if vr == T::zero() && vi == T::zero() {
                        vr = divisor_floor(
                            norm * (w.abs() + q.abs() + x.abs() + y.abs() + zz.abs()),
                        );
                    }
                    let c = Complex::new(
                        x * r - zz * ra + q * sa,
                        x * s - zz * sa - q * ra,
                    ) / Complex::new(vr, vi);
                    *h.get_mut(i, na) = c.re;
                    *h.get_mut(i, en) = c.im;

                    if x.abs() > zz.abs() + q.abs() {
                        *h.get_mut(i + 1, na) =
                            (-ra - w * g(h, i, na) + q * g(h, i, en)) / x;
                        *h.get_mut(i + 1, en) =
                            (-sa - w * g(h, i, en) - q * g(h, i, na)) / x;
                    } else {
                        let c = Complex::new(-r - y * g(h, i, na), -s - y * g(h, i, en))
                            / Complex::new(zz, q);
                        *h.get_mut(i + 1, na) = c.re;
                        *h.get_mut(i + 1, en) = c.im;
                    }
                }

                // Overflow control
                let t = if g(h, i, na).abs() > g(h, i, en).abs() {
                    g(h, i, na).abs()
                } else {
                    g(h, i, en).abs()
                };
                if t != T::zero() && t + one / t <= t {
                    for j in i..=en {
                        *h.get_mut(j, na) = g(h, j, na) / t;
                        *h.get_mut(j, en) = g(h, j, en) / t;
                    }
                }
            }
        }
    }

    // Vectors of isolated rows outside the window are unit coordinate
    // directions scaled by the triangle already in h
    for i in 0..n {
        if i < low || i > high {
            for j in i..n {
                *z.get_mut(i, j) = g(h, i, j);
            }
        }
    }

    // Back-transform: Z <- Z * H over the computed triangle, turning
    // eigenvectors of the Schur form into eigenvectors of the original
    for j in (low..n).rev() {
        let mtop = if j < high { j } else { high };
        for i in low..=high {
            let mut zz = T::zero();
            for k in low..=mtop {
                zz = zz + g(z, i, k) * g(h, k, j);
            }
            *z.get_mut(i, j) = zz;
        }
    }

    Ok(())
}

/// Eigendecomposition of a real square matrix.
///
/// Computes the Schur decomposition and back-substitutes for the full set
/// of (possibly complex) eigenvectors.
///
/// # Example
///
/// ```
/// use numeig::Matrix;
///
/// let a = Matrix::from_rows(2, 2, &[0.0_f64, -1.0, 1.0, 0.0]);
/// let eig = a.eigen().unwrap();
/// let values = eig.eigenvalues();
/// assert!((values[0].im - 1.0).abs() < 1e-10);
/// assert!((values[1].im + 1.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct EigenDecomposition<T> {
    wr: Vec<T>,
    wi: Vec<T>,
    vectors: Matrix<T>,
}

impl<T: FloatScalar> EigenDecomposition<T> {
    /// Compute eigenvalues and eigenvectors of a square matrix.
    pub fn new(a: &Matrix<T>) -> Result<Self, LinalgError> {
        let schur = SchurDecomposition::new(a)?;
        Self::from_schur(schur)
    }

    /// Back-substitute an existing Schur decomposition for eigenvectors.
    pub fn from_schur(schur: SchurDecomposition<T>) -> Result<Self, LinalgError> {
        let (mut s, mut q, wr, wi, norm) = schur.into_parts();
        let n = s.nrows();
        if n > 0 {
            schur_to_eigen(&mut s, 0, n - 1, &wr, &wi, &mut q, norm)?;
        }
        Ok(Self {
            wr,
            wi,
            vectors: q,
        })
    }

    /// Eigenvalues as complex numbers, ordered by their row in the Schur
    /// form; conjugate pairs are adjacent with positive imaginary part
    /// first.
    pub fn eigenvalues(&self) -> Vec<Complex<T>> {
        self.wr
            .iter()
            .zip(self.wi.iter())
            .map(|(&re, &im)| Complex::new(re, im))
            .collect()
    }

    /// The eigenvector for eigenvalue `j`, normalized to unit Euclidean
    /// length.
    pub fn eigenvector(&self, j: usize) -> Vec<Complex<T>> {
        let n = self.vectors.nrows();
        assert!(j < n, "eigenvector index {} out of range for order {}", j, n);

        let mut v: Vec<Complex<T>> = (0..n)
            .map(|i| {
                if self.wi[j] == T::zero() {
                    Complex::new(self.vectors[(i, j)], T::zero())
                } else if self.wi[j] > T::zero() {
                    Complex::new(self.vectors[(i, j)], self.vectors[(i, j + 1)])
                } else {
                    Complex::new(self.vectors[(i, j - 1)], -self.vectors[(i, j)])
                }
            })
            .collect();

        let mut norm_sq = T::zero();
        for c in v.iter() {
            norm_sq = norm_sq + c.norm_sqr();
        }
        let scale = norm_sq.sqrt();
        if scale > T::zero() {
            for c in v.iter_mut() {
                *c = c.unscale(scale);
            }
        }
        v
    }
}

/// Convenience methods for eigendecomposition.
impl<T: FloatScalar> Matrix<T> {
    /// Eigenvalues and eigenvectors via Schur decomposition.
    ///
    /// ```
    /// use numeig::Matrix;
    ///
    /// let a = Matrix::from_rows(2, 2, &[2.0_f64, 1.0, 0.0, 3.0]);
    /// let eig = a.eigen().unwrap();
    /// let v = eig.eigenvector(0);
    /// // eigenvector for the eigenvalue 2 (or 3, depending on ordering)
    /// assert!(v.iter().any(|c| c.re.abs() > 0.1));
    /// ```
    pub fn eigen(&self) -> Result<EigenDecomposition<T>, LinalgError> {
        EigenDecomposition::new(self)
    }

    /// General eigenvalues as complex numbers.
    ///
    /// Uses the Schur decomposition internally.
    ///
    /// ```
    /// use numeig::Matrix;
    ///
    /// let a = Matrix::from_rows(2, 2, &[2.0_f64, -1.0, 1.0, 0.0]);
    /// let values = a.eigenvalues().unwrap();
    /// assert!((values[0].re - 1.0).abs() < 1e-10);
    /// assert!((values[1].re - 1.0).abs() < 1e-10);
    /// ```
    pub fn eigenvalues(&self) -> Result<Vec<Complex<T>>, LinalgError> {
        let schur = self.schur()?;
        let (re, im) = schur.eigenvalues();
        Ok(re
            .iter()
            .zip(im.iter())
            .map(|(&a, &b)| Complex::new(a, b))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    const TOL: f64 = 1e-10;

    /// Residual ‖A v - λ v‖ for a complex eigenpair.
    fn eigenpair_residual(a: &Matrix<f64>, lambda: Complex<f64>, v: &[Complex<f64>]) -> f64 {
        let n = a.nrows();
        let mut worst = 0.0_f64;
        for i in 0..n {
            let mut av = Complex::new(0.0, 0.0);
            for j in 0..n {
                av += Complex::new(a[(i, j)], 0.0) * v[j];
            }
            let res = (av - lambda * v[i]).norm();
            if res > worst {
                worst = res;
            }
        }
        worst
    }

    fn verify_eigenpairs(a: &Matrix<f64>, tol: f64) {
        let eig = a.eigen().unwrap();
        let values = eig.eigenvalues();
        for j in 0..a.nrows() {
            let v = eig.eigenvector(j);
            // Unit length
            let norm_sq: f64 = v.iter().map(|c| c.norm_sqr()).sum();
            assert!((norm_sq - 1.0).abs() < tol, "‖v[{}]‖² = {}", j, norm_sq);
            let res = eigenpair_residual(a, values[j], &v);
            assert!(res < tol, "residual for eigenpair {} = {}", j, res);
        }
    }

    #[test]
    fn triangular_eigenvectors() {
        let a = Matrix::from_rows(2, 2, &[1.0_f64, 1.0, 0.0, 2.0]);
        verify_eigenpairs(&a, TOL);

        // The eigenvector for λ=2 of [[1,1],[0,2]] is (1,1)/√2
        let eig = a.eigen().unwrap();
        let values = eig.eigenvalues();
        let j = if (values[0].re - 2.0).abs() < TOL { 0 } else { 1 };
        let v = eig.eigenvector(j);
        let ratio = v[0].re / v[1].re;
        assert!((ratio - 1.0).abs() < TOL, "ratio = {}", ratio);
    }

    #[test]
    fn complex_pair_eigenvectors() {
        // Rotation generator: eigenpairs (±i, (1, ∓i)/√2)
        let a = Matrix::from_rows(2, 2, &[0.0_f64, -1.0, 1.0, 0.0]);
        verify_eigenpairs(&a, TOL);

        let eig = a.eigen().unwrap();
        let values = eig.eigenvalues();
        assert!((values[0] - Complex::new(0.0, 1.0)).norm() < TOL);
        assert!((values[1] - Complex::new(0.0, -1.0)).norm() < TOL);

        // Conjugate convention: v(λ̄) = conj(v(λ))
        let v0 = eig.eigenvector(0);
        let v1 = eig.eigenvector(1);
        for i in 0..2 {
            assert!((v0[i].conj() - v1[i]).norm() < TOL);
        }
    }

    #[test]
    fn mixed_spectrum_3x3() {
        // One real eigenvalue and one conjugate pair
        let a = Matrix::from_rows(3, 3, &[1.0_f64, -4.0, 2.0, 2.0, 3.0, -1.0, 0.0, 0.0, 5.0]);
        verify_eigenpairs(&a, 1e-9);
    }

    #[test]
    fn defective_like_matrix_stays_bounded() {
        // Nearly defective: a Jordan-ish block. Eigenvectors may be poorly
        // conditioned but must come back finite and normalized.
        let a = Matrix::from_rows(2, 2, &[1.0_f64, 1.0, 0.0, 1.0 + 1e-13]);
        let eig = a.eigen().unwrap();
        for j in 0..2 {
            let v = eig.eigenvector(j);
            for c in v.iter() {
                assert!(c.re.is_finite() && c.im.is_finite());
            }
        }
    }

    #[test]
    fn bad_pairing_negative_without_partner() {
        let mut h = Matrix::from_rows(2, 2, &[1.0_f64, 1.0, 0.0, 2.0]);
        let mut z = Matrix::eye(2, 0.0_f64);
        let wr = vec![0.0, 0.0];
        let wi = vec![0.0, -1.0];
        let res = schur_to_eigen(&mut h, 0, 1, &wr, &wi, &mut z, 1.0);
        assert_eq!(res.unwrap_err(), LinalgError::BadPairing);
    }

    #[test]
    fn bad_pairing_positive_without_partner() {
        let mut h = Matrix::from_rows(2, 2, &[1.0_f64, 1.0, 0.0, 2.0]);
        let mut z = Matrix::eye(2, 0.0_f64);
        let wr = vec![0.0, 0.0];
        let wi = vec![1.0, 0.0];
        let res = schur_to_eigen(&mut h, 0, 1, &wr, &wi, &mut z, 1.0);
        assert_eq!(res.unwrap_err(), LinalgError::BadPairing);
    }

    #[test]
    fn divisor_floor_perturbs_nothing() {
        let norm = 3.5_f64;
        let t = divisor_floor(norm);
        assert!(t > 0.0);
        assert_eq!(norm + t, norm);
        // The floor is within a couple of orders of magnitude of eps*norm
        assert!(t > f64::EPSILON * norm * 1e-3);
    }

    #[test]
    fn eigenvalues_convenience() {
        let a = Matrix::from_rows(2, 2, &[2.0_f64, -1.0, 1.0, 0.0]);
        let values = a.eigenvalues().unwrap();
        assert!((values[0].re - 1.0).abs() < TOL);
        assert!((values[1].re - 1.0).abs() < TOL);
        assert!(values[0].im.abs() < TOL);
    }
}
