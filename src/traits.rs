use core::fmt::Debug;
use num_traits::{Float, Num, One, Zero};

/// Trait for types that can be used as matrix elements.
///
/// Blanket-implemented for all types satisfying the bounds.
/// Covers `f32`, `f64`, and all integer types.
pub trait Scalar: Copy + PartialEq + Debug + Zero + One + Num {}

impl<T: Copy + PartialEq + Debug + Zero + One + Num> Scalar for T {}

/// Trait for floating-point matrix elements.
///
/// Required by everything that needs `sqrt`, `abs`, ordering, machine
/// epsilon, or a NaN predicate (the decompositions and norms). The
/// eigensolvers work on real matrices only; complex values appear solely
/// in their *outputs*, as `num_complex::Complex<T>` over a `FloatScalar`.
pub trait FloatScalar: Scalar + Float {}

impl<T: Scalar + Float> FloatScalar for T {}

/// Read-only access to a matrix-like type.
///
/// Algorithms take `&impl MatrixRef<T>` so they work with any storage that
/// exposes bounds-checked element access and its extents — no raw offset
/// arithmetic crosses the public contract.
pub trait MatrixRef<T> {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn get(&self, row: usize, col: usize) -> &T;
}

/// Mutable access to a matrix-like type.
///
/// Extends `MatrixRef` with mutable element access, enabling the in-place
/// algorithms (Hessenberg reduction, QR iteration, Cholesky) to mutate
/// caller-owned storage without ever reallocating it.
pub trait MatrixMut<T>: MatrixRef<T> {
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T;
}
