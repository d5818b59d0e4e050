use crate::traits::{FloatScalar, MatrixMut};

/// Helper: get element by value.
#[inline]
fn g<T: Copy>(m: &impl crate::traits::MatrixRef<T>, i: usize, j: usize) -> T {
    *m.get(i, j)
}

/// Reduce a real square matrix to upper Hessenberg form via Householder
/// similarity transforms: `Q^T A Q = H`.
///
/// On return:
/// - `a` is overwritten with the upper Hessenberg matrix H
/// - `q` is overwritten with the accumulated orthogonal transform Q
///
/// The result satisfies `A = Q H Q^T`, which is the seeding contract the
/// QR iteration in [`crate::linalg::hessenberg_schur`] expects for its
/// Schur-vector matrix.
pub fn hessenberg<T: FloatScalar>(a: &mut impl MatrixMut<T>, q: &mut impl MatrixMut<T>) {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "hessenberg requires a square matrix");
    assert_eq!(q.nrows(), n, "transform matrix row count mismatch");
    assert_eq!(q.ncols(), n, "transform matrix column count mismatch");

    // Initialize Q = I
    for i in 0..n {
        for j in 0..n {
            *q.get_mut(i, j) = if i == j { T::one() } else { T::zero() };
        }
    }

    for k in 0..n.saturating_sub(2) {
        // Form the Householder vector from a[k+1:n, k], scaling by the
        // column magnitude so uniformly tiny columns still reduce instead
        // of being passed through un-annihilated
        let mut scale = T::zero();
        for i in (k + 1)..n {
            scale = scale + g(a, i, k).abs();
        }
        if scale == T::zero() {
            continue;
        }

        let mut norm_sq = T::zero();
        for i in (k + 1)..n {
            let v = g(a, i, k) / scale;
            norm_sq = norm_sq + v * v;
        }

        let norm = scale * norm_sq.sqrt();
        let ak1k = g(a, k + 1, k);
        let sigma = if ak1k >= T::zero() { norm } else { -norm };
        let v0 = ak1k + sigma;

        // Store the normalized reflector in a[k+2:n, k]; v[0] = 1 implicit
        for i in (k + 2)..n {
            *a.get_mut(i, k) = g(a, i, k) / v0;
        }
        let tau = v0 / sigma;

        // Apply from the left: A[k+1:n, k+1:n] = (I - tau v v^T) A[k+1:n, k+1:n].
        // Column k is excluded; its result is set explicitly below.
        for j in (k + 1)..n {
            let mut dot = g(a, k + 1, j);
            for i in (k + 2)..n {
                dot = dot + g(a, i, k) * g(a, i, j);
            }
            dot = dot * tau;

            *a.get_mut(k + 1, j) = g(a, k + 1, j) - dot;
            for i in (k + 2)..n {
                let vi = g(a, i, k);
                *a.get_mut(i, j) = g(a, i, j) - dot * vi;
            }
        }

        // Apply from the right: A[0:n, k+1:n] = A[0:n, k+1:n] (I - tau v v^T)
        for i in 0..n {
            let mut dot = g(a, i, k + 1);
            for jj in (k + 2)..n {
                dot = dot + g(a, i, jj) * g(a, jj, k);
            }
            dot = dot * tau;

            *a.get_mut(i, k + 1) = g(a, i, k + 1) - dot;
            for jj in (k + 2)..n {
                let vj = g(a, jj, k);
                *a.get_mut(i, jj) = g(a, i, jj) - dot * vj;
            }
        }

        // Accumulate Q = Q * (I - tau v v^T)
        for i in 0..n {
            let mut dot = g(q, i, k + 1);
            for jj in (k + 2)..n {
                dot = dot + g(q, i, jj) * g(a, jj, k);
            }
            dot = dot * tau;

            *q.get_mut(i, k + 1) = g(q, i, k + 1) - dot;
            for jj in (k + 2)..n {
                let vj = g(a, jj, k);
                *q.get_mut(i, jj) = g(q, i, jj) - dot * vj;
            }
        }

        // Zero the annihilated column and set the surviving subdiagonal entry
        *a.get_mut(k + 1, k) = -sigma;
        for i in (k + 2)..n {
            *a.get_mut(i, k) = T::zero();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Matrix;

    const TOL: f64 = 1e-10;

    #[test]
    fn hessenberg_3x3() {
        let orig = Matrix::from_rows(3, 3, &[4.0_f64, 1.0, -2.0, 1.0, 2.0, 0.0, -2.0, 0.0, 3.0]);
        let mut a = orig.clone();
        let mut q = Matrix::zeros(3, 3, 0.0_f64);
        hessenberg(&mut a, &mut q);

        // H is upper Hessenberg: below sub-diagonal is zero
        for i in 2..3 {
            for j in 0..i - 1 {
                assert!(a[(i, j)].abs() < TOL, "H[({},{})] = {}", i, j, a[(i, j)]);
            }
        }

        // Q^T A Q = H
        let qtaq = q.transpose() * &orig * &q;
        for i in 0..3 {
            for j in 0..3 {
                assert!(
                    (qtaq[(i, j)] - a[(i, j)]).abs() < TOL,
                    "Q^TAQ[({},{})] = {}, H = {}",
                    i,
                    j,
                    qtaq[(i, j)],
                    a[(i, j)]
                );
            }
        }

        // Q is orthogonal
        let qtq = q.transpose() * &q;
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (qtq[(i, j)] - expected).abs() < TOL,
                    "QtQ[({},{})] = {}",
                    i,
                    j,
                    qtq[(i, j)]
                );
            }
        }
    }

    #[test]
    fn hessenberg_4x4() {
        let orig = Matrix::from_rows(
            4,
            4,
            &[
                1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0,
                15.0, 16.0,
            ],
        );
        let mut a = orig.clone();
        let mut q = Matrix::zeros(4, 4, 0.0_f64);
        hessenberg(&mut a, &mut q);

        for i in 0usize..4 {
            for j in 0..i.saturating_sub(1) {
                assert!(a[(i, j)].abs() < TOL, "H[({},{})] = {}", i, j, a[(i, j)]);
            }
        }

        let qtaq = q.transpose() * &orig * &q;
        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    (qtaq[(i, j)] - a[(i, j)]).abs() < TOL,
                    "Q^TAQ[({},{})] diff = {}",
                    i,
                    j,
                    (qtaq[(i, j)] - a[(i, j)]).abs()
                );
            }
        }
    }

    #[test]
    fn hessenberg_tiny_scale() {
        // All entries far below machine epsilon: the reduction must still
        // annihilate the below-subdiagonal entries, not pass them through
        let s = 1e-20_f64;
        let orig = Matrix::from_rows(
            3,
            3,
            &[
                4.0 * s,
                1.0 * s,
                -2.0 * s,
                1.0 * s,
                2.0 * s,
                3.0 * s,
                -2.0 * s,
                3.0 * s,
                1.0 * s,
            ],
        );
        let mut a = orig.clone();
        let mut q = Matrix::zeros(3, 3, 0.0_f64);
        hessenberg(&mut a, &mut q);

        assert!(a[(2, 0)].abs() < TOL * s, "H[(2,0)] = {}", a[(2, 0)]);

        let qtq = q.transpose() * &q;
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((qtq[(i, j)] - expected).abs() < TOL, "QtQ[({},{})]", i, j);
            }
        }

        // Q^T A Q = H to relative accuracy at the input's scale
        let qtaq = q.transpose() * &orig * &q;
        for i in 0..3 {
            for j in 0..3 {
                assert!(
                    (qtaq[(i, j)] - a[(i, j)]).abs() < TOL * s,
                    "Q^TAQ[({},{})] diff = {}",
                    i,
                    j,
                    (qtaq[(i, j)] - a[(i, j)]).abs()
                );
            }
        }
    }

    #[test]
    fn hessenberg_already_hessenberg() {
        let orig = Matrix::from_rows(3, 3, &[1.0_f64, 2.0, 3.0, 0.0, 4.0, 5.0, 0.0, 0.0, 6.0]);
        let mut a = orig.clone();
        let mut q = Matrix::zeros(3, 3, 0.0_f64);
        hessenberg(&mut a, &mut q);

        let qtaq = q.transpose() * &orig * &q;
        for i in 0..3 {
            for j in 0..3 {
                assert!((qtaq[(i, j)] - a[(i, j)]).abs() < TOL, "Q^TAQ[({},{})]", i, j);
            }
        }
    }
}
