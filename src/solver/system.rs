//! Net force system assembly and solving.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::{CooMatrix, CscMatrix};

use crate::circuit::Axis;
use crate::error::{PlacerError, Result};

/// Linear system `C x = -d` for one axis.
///
/// `C` is collected as triplets, so repeated stamps on the same cell add up
/// when the matrix is compressed.
#[derive(Debug, Clone)]
pub struct ForceSystem {
    /// Axis this system solves for
    axis: Axis,
    /// Number of unknowns (free modules)
    size: usize,
    /// Matrix C as unsummed triplets
    triplets: CooMatrix<f64>,
    /// Running diagonal of C
    diagonal: Vec<f64>,
    /// Vector d
    rhs: DVector<f64>,
}

impl ForceSystem {
    /// Create an empty system with `size` unknowns.
    pub fn new(axis: Axis, size: usize) -> Self {
        Self {
            axis,
            size,
            triplets: CooMatrix::new(size, size),
            diagonal: vec![0.0; size],
            rhs: DVector::zeros(size),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Clear the matrix and vector to zero.
    pub fn clear(&mut self) {
        self.triplets = CooMatrix::new(self.size, self.size);
        self.diagonal.fill(0.0);
        self.rhs.fill(0.0);
    }

    /// Stamp a spring of weight `w` between unknowns `i` and `j`.
    ///   C[i,i] += w
    ///   C[j,j] += w
    ///   C[i,j] -= w
    ///   C[j,i] -= w
    pub fn stamp_spring(&mut self, i: usize, j: usize, w: f64) {
        if i == j {
            return;
        }
        self.stamp_anchor(i, w);
        self.stamp_anchor(j, w);
        self.triplets.push(i, j, -w);
        self.triplets.push(j, i, -w);
    }

    /// Stamp a spring of weight `w` from unknown `i` to a constant position.
    /// Only C[i,i] changes; the position goes into `d` via [`Self::add_rhs`].
    pub fn stamp_anchor(&mut self, i: usize, w: f64) {
        self.triplets.push(i, i, w);
        self.diagonal[i] += w;
    }

    /// Add to d[i].
    pub fn add_rhs(&mut self, i: usize, value: f64) {
        self.rhs[i] += value;
    }

    /// Vector d.
    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }

    /// Diagonal of C.
    pub fn diagonal(&self) -> &[f64] {
        &self.diagonal
    }

    /// Number of stamped triplets, before duplicates are summed.
    pub fn num_triplets(&self) -> usize {
        self.triplets.nnz()
    }

    /// Matrix C in compressed column form.
    pub fn matrix(&self) -> CscMatrix<f64> {
        CscMatrix::from(&self.triplets)
    }

    /// First unknown with nothing stamped on its diagonal.
    pub fn first_unconstrained_row(&self) -> Option<usize> {
        self.diagonal.iter().position(|&value| value <= 0.0)
    }

    /// Solve `C x = -d` with a sparse Cholesky factorization.
    pub fn solve(&self) -> Result<DVector<f64>> {
        if self.size == 0 {
            return Ok(DVector::zeros(0));
        }

        let cholesky = CscCholesky::factor(&self.matrix())
            .map_err(|_| PlacerError::SingularMatrix { axis: self.axis })?;

        let b = DMatrix::from_iterator(self.size, 1, self.rhs.iter().map(|v| -v));
        let solution = cholesky.solve(&b);

        if solution.iter().any(|v| !v.is_finite()) {
            return Err(PlacerError::NonFiniteSolution { axis: self.axis });
        }
        Ok(solution.column(0).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra_sparse::convert::serial::convert_csc_dense;

    #[test]
    fn test_spring_stamp_is_laplacian() {
        let mut system = ForceSystem::new(Axis::X, 3);
        system.stamp_spring(0, 2, 0.5);
        system.stamp_spring(2, 0, 0.25);

        let c = convert_csc_dense(&system.matrix());
        assert_relative_eq!(c[(0, 0)], 0.75);
        assert_relative_eq!(c[(2, 2)], 0.75);
        assert_relative_eq!(c[(0, 2)], -0.75);
        assert_relative_eq!(c[(2, 0)], -0.75);
        assert_eq!(c[(1, 1)], 0.0);
        for row in 0..3 {
            assert_relative_eq!(c.row(row).sum(), 0.0);
        }
        assert_eq!(c, c.transpose());
    }

    #[test]
    fn test_self_spring_is_ignored() {
        let mut system = ForceSystem::new(Axis::Y, 1);
        system.stamp_spring(0, 0, 1.0);
        assert_eq!(system.num_triplets(), 0);
        assert_eq!(system.first_unconstrained_row(), Some(0));
    }

    #[test]
    fn test_anchor_touches_only_diagonal() {
        let mut system = ForceSystem::new(Axis::X, 2);
        system.stamp_anchor(1, 2.0);
        let c = convert_csc_dense(&system.matrix());
        assert_eq!(c[(1, 1)], 2.0);
        assert_eq!(c[(0, 0)], 0.0);
        assert_eq!(c[(0, 1)], 0.0);
        assert_eq!(system.first_unconstrained_row(), Some(0));
    }

    #[test]
    fn test_solve_anchored_chain() {
        // anchor(0) at 0, spring 0-1, anchor(1) at 30
        let mut system = ForceSystem::new(Axis::X, 2);
        system.stamp_anchor(0, 1.0);
        system.stamp_spring(0, 1, 1.0);
        system.stamp_anchor(1, 1.0);
        system.add_rhs(1, -30.0);

        let x = system.solve().unwrap();
        assert_relative_eq!(x[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(x[1], 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_floating_pair_is_singular() {
        let mut system = ForceSystem::new(Axis::Y, 2);
        system.stamp_spring(0, 1, 1.0);
        assert_eq!(system.first_unconstrained_row(), None);
        assert!(matches!(
            system.solve(),
            Err(PlacerError::SingularMatrix { axis: Axis::Y })
        ));
    }

    #[test]
    fn test_clear() {
        let mut system = ForceSystem::new(Axis::X, 2);
        system.stamp_spring(0, 1, 1.0);
        system.add_rhs(0, 3.0);
        system.clear();
        assert_eq!(system.num_triplets(), 0);
        assert_eq!(system.rhs()[0], 0.0);
        assert_eq!(system.diagonal(), &[0.0, 0.0]);
    }

    #[test]
    fn test_empty_system() {
        let system = ForceSystem::new(Axis::X, 0);
        assert_eq!(system.solve().unwrap().len(), 0);
    }
}
