//! # numeig
//!
//! Real eigenvalue and Schur decomposition routines for dense matrices,
//! built on the implicit double-shift QR iteration.
//!
//! The crate is `no_std` compatible (requires `alloc`) and generic over
//! the floating-point scalar (`f32` or `f64`, or any type implementing
//! [`traits::FloatScalar`]).
//!
//! ## Modules
//!
//! - [`matrix`] — runtime-sized, column-major dense [`Matrix`] with
//!   arithmetic operators and norms
//! - [`linalg`] — decompositions:
//!   - [`linalg::hessenberg`] — Householder reduction to upper Hessenberg form
//!   - [`linalg::hessenberg_schur`] — real Schur form of a Hessenberg matrix
//!     (Francis double-shift QR)
//!   - [`linalg::schur_to_eigen`] — eigenvectors by back-substitution on the
//!     quasi-triangular Schur form
//!   - [`linalg::cholesky_in_place`] — Cholesky factorization for symmetric
//!     positive-definite systems
//! - [`traits`] — scalar and matrix-access traits the kernels are written
//!   against
//!
//! ## Quick start
//!
//! ```
//! use numeig::Matrix;
//!
//! // A rotation-like matrix with eigenvalues 1 ± i
//! let a = Matrix::from_rows(2, 2, &[1.0_f64, -1.0, 1.0, 1.0]);
//!
//! let eig = a.eigen().unwrap();
//! let lambda = eig.eigenvalues();
//! assert!((lambda[0].re - 1.0).abs() < 1e-12);
//! assert!((lambda[0].im.abs() - 1.0).abs() < 1e-12);
//!
//! // Full Schur decomposition: A = Q S Q^T with S quasi-triangular
//! let schur = a.schur().unwrap();
//! let s = schur.schur_form();
//! let q = schur.schur_vectors();
//! let reconstructed = q * s * &schur.schur_vectors().transpose();
//! assert!((reconstructed[(0, 1)] - a[(0, 1)]).abs() < 1e-12);
//! ```
//!
//! ## Cargo features
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `std`   | yes     | Use the standard library for float math |
//! | `libm`  | no      | Use `libm` for float math in `no_std` builds |
//!
//! One of `std` or `libm` must be enabled.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod linalg;
pub mod matrix;
pub mod traits;

pub use matrix::Matrix;
pub use traits::{FloatScalar, MatrixMut, MatrixRef, Scalar};

pub use num_complex::Complex;
