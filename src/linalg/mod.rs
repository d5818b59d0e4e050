pub(crate) mod cholesky;
pub(crate) mod eigenvector;
pub(crate) mod hessenberg;
pub(crate) mod schur;

pub use cholesky::{cholesky_in_place, CholeskyDecomposition};
pub use eigenvector::{schur_to_eigen, EigenDecomposition};
pub use hessenberg::hessenberg;
pub use schur::{hessenberg_schur, SchurDecomposition};

/// Errors from linear algebra operations.
///
/// Two error classes are kept deliberately distinct throughout the crate:
/// precondition violations (non-square input, mismatched lengths) panic
/// immediately via `assert!`, while numerical outcomes are reported through
/// this enum and are recoverable by the caller (retry with a larger budget,
/// accept a partial result, pick a different factorization).
///
/// Index payloads are 1-based, following the status-code convention shared
/// by [`LinalgError::NotPositiveDefinite`] and [`LinalgError::Convergence`].
///
/// ```
/// use numeig::Matrix;
/// use numeig::linalg::LinalgError;
///
/// let not_pd = Matrix::from_rows(2, 2, &[1.0_f64, 5.0, 5.0, 1.0]);
/// assert_eq!(not_pd.cholesky().unwrap_err(), LinalgError::NotPositiveDefinite(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinalgError {
    /// Matrix is singular or nearly singular.
    Singular,
    /// Matrix is not positive definite; the payload is the 1-based index
    /// of the leading minor that failed.
    NotPositiveDefinite(usize),
    /// QR iteration exhausted its budget; the payload is the 1-based row
    /// index of the first eigenvalue that failed to converge. Eigenvalues
    /// at higher indices are already valid.
    Convergence(usize),
    /// The quasi-triangular form carries an inconsistently paired complex
    /// eigenvalue run (a `wi` entry without its adjacent conjugate).
    BadPairing,
}

impl core::fmt::Display for LinalgError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinalgError::Singular => write!(f, "matrix is singular"),
            LinalgError::NotPositiveDefinite(k) => {
                write!(f, "matrix is not positive definite (leading minor {})", k)
            }
            LinalgError::Convergence(k) => {
                write!(f, "QR iteration did not converge (eigenvalue row {})", k)
            }
            LinalgError::BadPairing => {
                write!(f, "inconsistent complex conjugate pairing in Schur form")
            }
        }
    }
}
