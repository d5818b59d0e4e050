use alloc::vec;
use alloc::vec::Vec;

use crate::linalg::hessenberg::hessenberg;
use crate::linalg::LinalgError;
use crate::traits::{FloatScalar, MatrixMut};
use crate::Matrix;

/// Helper: get element with dereference for calling Float methods.
#[inline]
fn g<T: Copy>(m: &impl crate::traits::MatrixRef<T>, i: usize, j: usize) -> T {
    *m.get(i, j)
}

/// Iteration state threaded between the driver and the shift strategy.
///
/// `its` counts sweeps since the last deflation of the current window and
/// selects the exceptional shift; `itn` is the global sweep budget, never
/// replenished. `t` accumulates the total diagonal shift applied by
/// exceptional shifts so eigenvalues can be un-shifted at deflation.
/// `s`, `x`, `y`, `w` are the shift scalars handed to the QR sweep.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ShiftState<T> {
    pub its: usize,
    pub itn: usize,
    pub s: T,
    pub t: T,
    pub x: T,
    pub y: T,
    pub w: T,
}

impl<T: FloatScalar> ShiftState<T> {
    fn new(budget: usize) -> Self {
        Self {
            its: 0,
            itn: budget,
            s: T::zero(),
            t: T::zero(),
            x: T::zero(),
            y: T::zero(),
            w: T::zero(),
        }
    }
}

/// What the driver should do next, decided from the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShiftAction {
    /// `l == en`: a single eigenvalue has deflated; `x` holds `H(en,en)`.
    OneRoot,
    /// `l == en-1`: a trailing 2x2 block has deflated; `y` holds
    /// `H(en-1,en-1)` and `w` the subdiagonal/superdiagonal product.
    TwoRoots,
    /// The sweep budget is spent; report non-convergence.
    Exhausted,
    /// Run one more double-shift sweep with the shift in `(x, y, w)`.
    Sweep,
}

/// Shift strategy for the implicit double-shift QR iteration.
///
/// Classifies the trailing block of the active window `[l, en]` and, when
/// another sweep is needed, leaves the double-shift parameters in the state:
/// `x + y` is the shift-pair trace and `x*y - w` its determinant, i.e. the
/// eigenvalues of the trailing 2x2 submatrix (the Wilkinson double shift).
/// At 10 and 20 stagnating sweeps an exceptional shift is substituted
/// instead: the diagonal of `[low, en]` is re-centered by `x` (recorded in
/// `t`) and an ad hoc pair built from the two lowest subdiagonal magnitudes
/// replaces the analytic one.
pub(crate) fn form_shift<T: FloatScalar>(
    h: &mut impl MatrixMut<T>,
    low: usize,
    en: usize,
    l: usize,
    st: &mut ShiftState<T>,
) -> ShiftAction {
    st.x = g(h, en, en);
    if l == en {
        return ShiftAction::OneRoot;
    }
    st.y = g(h, en - 1, en - 1);
    st.w = g(h, en, en - 1) * g(h, en - 1, en);
    if l == en - 1 {
        return ShiftAction::TwoRoots;
    }
    if st.itn == 0 {
        return ShiftAction::Exhausted;
    }
    if st.its == 10 || st.its == 20 {
        // Exceptional shift to break slow-convergence cycles
        let one = T::one();
        let two = one + one;
        let four = two + two;
        let three_quarters = (two + one) / four;
        let seven_sixteenths = (four + two + one) / (four * four);

        st.t = st.t + st.x;
        for i in low..=en {
            *h.get_mut(i, i) = g(h, i, i) - st.x;
        }
        st.s = g(h, en, en - 1).abs() + g(h, en - 1, en - 2).abs();
        st.x = three_quarters * st.s;
        st.y = st.x;
        st.w = -(seven_sixteenths * st.s * st.s);
    }
    ShiftAction::Sweep
}

/// One implicit double-shift QR sweep over the window `[l, en]`.
///
/// Chases a 3x3 bulge down the subdiagonal with Householder eliminations,
/// performing `H <- Q^T H Q` for the orthogonal `Q` determined by the shift
/// pair in `st` without ever forming the shifted matrix. Every elimination
/// is mirrored onto the columns of `z` when Schur vectors are wanted.
///
/// The bulge does not necessarily start at `l`: a lookback from `en-2`
/// stops early where two consecutive subdiagonal entries are small enough
/// that starting below them is numerically equivalent.
pub(crate) fn qr_sweep<T: FloatScalar, H: MatrixMut<T>, Z: MatrixMut<T>>(
    h: &mut H,
    low: usize,
    high: usize,
    l: usize,
    en: usize,
    st: &ShiftState<T>,
    mut z: Option<&mut Z>,
) {
    let n = h.nrows();
    let eps = T::epsilon();
    let na = en - 1;

    // Look for two consecutive small subdiagonal elements
    let mut p;
    let mut q;
    let mut r;
    let mut m = en - 2;
    loop {
        let zz = g(h, m, m);
        let rr = st.x - zz;
        let ss = st.y - zz;
        p = (rr * ss - st.w) / g(h, m + 1, m) + g(h, m, m + 1);
        q = g(h, m + 1, m + 1) - zz - rr - ss;
        r = g(h, m + 2, m + 1);
        let scale = p.abs() + q.abs() + r.abs();
        p = p / scale;
        q = q / scale;
        r = r / scale;
        if m == l {
            break;
        }
        let lhs = g(h, m, m - 1).abs() * (q.abs() + r.abs());
        let rhs = p.abs() * (g(h, m - 1, m - 1).abs() + zz.abs() + g(h, m + 1, m + 1).abs());
        if lhs <= eps * rhs {
            break;
        }
        m -= 1;
    }

    // Clear stale fill-in below the second subdiagonal inside the window
    for i in (m + 2)..=en {
        *h.get_mut(i, i - 2) = T::zero();
        if i > m + 2 {
            *h.get_mut(i, i - 3) = T::zero();
        }
    }

    // Double QR step on rows l to en and (coupled) columns of the full matrix
    for k in m..=na {
        let notlast = k != na;
        let mut col_scale = T::zero();
        if k != m {
            p = g(h, k, k - 1);
            q = g(h, k + 1, k - 1);
            r = if notlast { g(h, k + 2, k - 1) } else { T::zero() };
            col_scale = p.abs() + q.abs() + r.abs();
            if col_scale == T::zero() {
                continue;
            }
            p = p / col_scale;
            q = q / col_scale;
            r = r / col_scale;
        }
        let s = {
            let mag = (p * p + q * q + r * r).sqrt();
            if p < T::zero() {
                -mag
            } else {
                mag
            }
        };
        if k != m {
            *h.get_mut(k, k - 1) = -s * col_scale;
        } else if l != m {
            *h.get_mut(k, k - 1) = -g(h, k, k - 1);
        }
        p = p + s;
        let x = p / s;
        let y = q / s;
        let zz = r / s;
        q = q / p;
        r = r / p;

        if notlast {
            // Row modification
            for j in k..n {
                let pp = g(h, k, j) + q * g(h, k + 1, j) + r * g(h, k + 2, j);
                *h.get_mut(k, j) = g(h, k, j) - pp * x;
                *h.get_mut(k + 1, j) = g(h, k + 1, j) - pp * y;
                *h.get_mut(k + 2, j) = g(h, k + 2, j) - pp * zz;
            }
            // Column modification
            let iend = if en < k + 3 { en } else { k + 3 };
            for i in 0..=iend {
                let pp = x * g(h, i, k) + y * g(h, i, k + 1) + zz * g(h, i, k + 2);
                *h.get_mut(i, k) = g(h, i, k) - pp;
                *h.get_mut(i, k + 1) = g(h, i, k + 1) - pp * q;
                *h.get_mut(i, k + 2) = g(h, i, k + 2) - pp * r;
            }
            // Accumulate the transform
            if let Some(zm) = z.as_deref_mut() {
                for i in low..=high {
                    let pp = x * g(zm, i, k) + y * g(zm, i, k + 1) + zz * g(zm, i, k + 2);
                    *zm.get_mut(i, k) = g(zm, i, k) - pp;
                    *zm.get_mut(i, k + 1) = g(zm, i, k + 1) - pp * q;
                    *zm.get_mut(i, k + 2) = g(zm, i, k + 2) - pp * r;
                }
            }
        } else {
            // Row modification
            for j in k..n {
                let pp = g(h, k, j) + q * g(h, k + 1, j);
                *h.get_mut(k, j) = g(h, k, j) - pp * x;
                *h.get_mut(k + 1, j) = g(h, k + 1, j) - pp * y;
            }
            // Column modification
            let iend = if en < k + 3 { en } else { k + 3 };
            for i in 0..=iend {
                let pp = x * g(h, i, k) + y * g(h, i, k + 1);
                *h.get_mut(i, k) = g(h, i, k) - pp;
                *h.get_mut(i, k + 1) = g(h, i, k + 1) - pp * q;
            }
            // Accumulate the transform
            if let Some(zm) = z.as_deref_mut() {
                for i in low..=high {
                    let pp = x * g(zm, i, k) + y * g(zm, i, k + 1);
                    *zm.get_mut(i, k) = g(zm, i, k) - pp;
                    *zm.get_mut(i, k + 1) = g(zm, i, k + 1) - pp * q;
                }
            }
        }
    }
}

/// Implicit double-shift QR iteration on an upper Hessenberg matrix.
///
/// Transforms `h` in place to real Schur form (quasi-upper-triangular):
/// real eigenvalues become 1x1 diagonal blocks, complex conjugate pairs
/// 2x2 blocks. Eigenvalues are written to `wr`/`wi` at their final row
/// positions; a conjugate pair occupies adjacent rows k, k+1 with
/// `wi[k] = -wi[k+1] > 0`. When `z` is supplied, every elementary
/// transformation is accumulated into it; seed it with the orthogonal
/// factor of the Hessenberg reduction (or the identity) so that on return
/// `original = Z * H_schur * Z^T`.
///
/// Rows outside `[low, high]` are assumed already isolated (their diagonal
/// entries are taken as eigenvalues verbatim); pass `0, n-1` for a full
/// matrix. `max_iter` bounds the total number of sweeps across all windows.
///
/// On success returns the matrix norm used for the deflation thresholds,
/// which [`schur_to_eigen`](crate::linalg::schur_to_eigen) reuses for its
/// back-substitution tolerances. On budget exhaustion returns
/// [`LinalgError::Convergence`] carrying the 1-based row of the first
/// unconverged eigenvalue; entries of `wr`/`wi` above that row are valid.
pub fn hessenberg_schur<T: FloatScalar, H: MatrixMut<T>, Z: MatrixMut<T>>(
    h: &mut H,
    low: usize,
    high: usize,
    wr: &mut [T],
    wi: &mut [T],
    mut z: Option<&mut Z>,
    max_iter: usize,
) -> Result<T, LinalgError> {
    let n = h.nrows();
    assert_eq!(n, h.ncols(), "hessenberg_schur requires a square matrix");
    assert_eq!(wr.len(), n, "wr length must equal the matrix order");
    assert_eq!(wi.len(), n, "wi length must equal the matrix order");
    if let Some(zm) = z.as_deref_mut() {
        assert_eq!(zm.nrows(), n, "transform matrix row count mismatch");
        assert_eq!(zm.ncols(), n, "transform matrix column count mismatch");
    }
    if n == 0 {
        return Ok(T::zero());
    }
    assert!(
        low <= high && high < n,
        "window [{}, {}] out of range for order {}",
        low,
        high,
        n
    );

    let eps = T::epsilon();
    let one = T::one();
    let half = one / (one + one);

    // Norm of the Hessenberg part, computed once up front; all deflation
    // thresholds scale with it. Isolated rows outside the window already
    // hold their eigenvalues on the diagonal.
    let mut norm = T::zero();
    for i in 0..n {
        for j in i.saturating_sub(1)..n {
            norm = norm + g(h, i, j).abs();
        }
        if i < low || i > high {
            wr[i] = g(h, i, i);
            wi[i] = T::zero();
        }
    }

    let mut st = ShiftState::new(max_iter);
    let mut bot = high + 1; // exclusive bottom of the unconverged region

    while bot > low {
        let en = bot - 1;
        st.its = 0;

        loop {
            // Deflation search: smallest l with a negligible subdiagonal
            // entry at (l, l-1), or l == low. A NaN compares as "not
            // negligible", so a poisoned matrix burns budget instead of
            // spuriously deflating.
            let mut l = en;
            while l > low {
                let mut s = g(h, l - 1, l - 1).abs() + g(h, l, l).abs();
                if s == T::zero() {
                    s = norm;
                }
                if g(h, l, l - 1).abs() <= eps * s {
                    break;
                }
                l -= 1;
            }

            match form_shift(h, low, en, l, &mut st) {
                ShiftAction::OneRoot => {
                    *h.get_mut(en, en) = st.x + st.t;
                    wr[en] = g(h, en, en);
                    wi[en] = T::zero();
                    if en > low {
                        *h.get_mut(en, en - 1) = T::zero();
                    }
                    bot -= 1;
                    break;
                }
                ShiftAction::TwoRoots => {
                    let na = en - 1;
                    let p = (st.y - st.x) * half;
                    let disc = p * p + st.w;
                    let mut zz = disc.abs().sqrt();
                    let x = st.x + st.t;
                    *h.get_mut(en, en) = x;
                    *h.get_mut(na, na) = st.y + st.t;

                    if disc >= T::zero() {
                        // Real pair: split the block into two 1x1 blocks
                        // with a Givens rotation
                        zz = if p >= T::zero() { p + zz } else { p - zz };
                        wr[na] = x + zz;
                        wr[en] = wr[na];
                        if zz != T::zero() {
                            wr[en] = x - st.w / zz;
                        }
                        wi[na] = T::zero();
                        wi[en] = T::zero();

                        let sub = g(h, en, na);
                        let s = sub.abs() + zz.abs();
                        let mut cp = sub / s;
                        let mut cq = zz / s;
                        let cr = (cp * cp + cq * cq).sqrt();
                        cp = cp / cr;
                        cq = cq / cr;
                        for j in na..n {
                            let tmp = g(h, na, j);
                            *h.get_mut(na, j) = cq * tmp + cp * g(h, en, j);
                            *h.get_mut(en, j) = cq * g(h, en, j) - cp * tmp;
                        }
                        for i in 0..=en {
                            let tmp = g(h, i, na);
                            *h.get_mut(i, na) = cq * tmp + cp * g(h, i, en);
                            *h.get_mut(i, en) = cq * g(h, i, en) - cp * tmp;
                        }
                        if let Some(zm) = z.as_deref_mut() {
                            for i in low..=high {
                                let tmp = g(zm, i, na);
                                *zm.get_mut(i, na) = cq * tmp + cp * g(zm, i, en);
                                *zm.get_mut(i, en) = cq * g(zm, i, en) - cp * tmp;
                            }
                        }
                        *h.get_mut(en, na) = T::zero();
                    } else {
                        // Complex conjugate pair
                        wr[na] = x + p;
                        wr[en] = x + p;
                        wi[na] = zz;
                        wi[en] = -zz;
                    }
                    if na > low {
                        *h.get_mut(na, na - 1) = T::zero();
                    }
                    bot -= 2;
                    break;
                }
                ShiftAction::Exhausted => {
                    return Err(LinalgError::Convergence(en + 1));
                }
                ShiftAction::Sweep => {
                    st.its += 1;
                    st.itn -= 1;
                    qr_sweep(h, low, high, l, en, &st, z.as_deref_mut());
                }
            }
        }
    }

    Ok(norm)
}

/// Real Schur decomposition of a square matrix.
///
/// For a real matrix A, computes orthogonal Q and quasi-upper-triangular S
/// such that `A = Q S Q^T`. The diagonal of S consists of 1x1 blocks (real
/// eigenvalues) and 2x2 blocks (complex conjugate pairs).
///
/// # Example
///
/// ```
/// use numeig::Matrix;
///
/// let a = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
/// let schur = a.schur().unwrap();
/// let (re, _im) = schur.eigenvalues();
///
/// // For this matrix, eigenvalues are real: (5 ± √33) / 2
/// let expected = (5.0 + 33.0_f64.sqrt()) / 2.0;
/// assert!(re.iter().any(|&x| (x - expected).abs() < 1e-10));
/// ```
#[derive(Debug, Clone)]
pub struct SchurDecomposition<T> {
    s: Matrix<T>,
    q: Matrix<T>,
    wr: Vec<T>,
    wi: Vec<T>,
    norm: T,
}

impl<T: FloatScalar> SchurDecomposition<T> {
    /// Compute the real Schur decomposition of a square matrix.
    ///
    /// Reduces to Hessenberg form first, then runs the QR iteration with a
    /// budget of `30 * n` sweeps. Returns [`LinalgError::Convergence`] if
    /// the budget is exhausted.
    pub fn new(a: &Matrix<T>) -> Result<Self, LinalgError> {
        assert!(a.is_square(), "Schur decomposition requires a square matrix");
        let n = a.nrows();
        let mut s = a.clone();
        let mut q = Matrix::zeros(n, n, T::zero());
        let mut wr = vec![T::zero(); n];
        let mut wi = vec![T::zero(); n];

        if n == 0 {
            return Ok(Self {
                s,
                q,
                wr,
                wi,
                norm: T::zero(),
            });
        }

        hessenberg(&mut s, &mut q);
        let norm = hessenberg_schur(&mut s, 0, n - 1, &mut wr, &mut wi, Some(&mut q), 30 * n)?;

        Ok(Self { s, q, wr, wi, norm })
    }

    /// The quasi-upper-triangular Schur form S.
    #[inline]
    pub fn schur_form(&self) -> &Matrix<T> {
        &self.s
    }

    /// The orthogonal Schur vectors Q.
    #[inline]
    pub fn schur_vectors(&self) -> &Matrix<T> {
        &self.q
    }

    /// Eigenvalues as `(real_parts, imaginary_parts)` slices, ordered by
    /// their row in the Schur form. Conjugate pairs are adjacent with the
    /// positive imaginary part first.
    #[inline]
    pub fn eigenvalues(&self) -> (&[T], &[T]) {
        (&self.wr, &self.wi)
    }

    #[inline]
    pub(crate) fn into_parts(self) -> (Matrix<T>, Matrix<T>, Vec<T>, Vec<T>, T) {
        (self.s, self.q, self.wr, self.wi, self.norm)
    }
}

/// Convenience methods for Schur decomposition.
impl<T: FloatScalar> Matrix<T> {
    /// Real Schur decomposition: `A = Q S Q^T`.
    ///
    /// ```
    /// use numeig::Matrix;
    ///
    /// let a = Matrix::from_rows(2, 2, &[0.0_f64, -1.0, 1.0, 0.0]);
    /// let schur = a.schur().unwrap();
    /// let (re, im) = schur.eigenvalues();
    /// // 90° rotation: eigenvalues ±i
    /// assert!(re[0].abs() < 1e-10);
    /// assert!((im[0] - 1.0).abs() < 1e-10);
    /// assert!((im[1] + 1.0).abs() < 1e-10);
    /// ```
    pub fn schur(&self) -> Result<SchurDecomposition<T>, LinalgError> {
        SchurDecomposition::new(self)
    }
}
