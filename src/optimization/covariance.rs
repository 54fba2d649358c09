//! Covariance of the estimates at the minimum.
//!
//! Purpose
//! -------
//! Approximate the covariance of the optimizer-space estimates by the
//! inverse of the objective's Hessian at `θ̂`. With the objective a
//! negative log-posterior, the Hessian is the observed information.
//!
//! Key behaviors
//! -------------
//! - The Hessian is a finite-difference Jacobian of the finite-difference
//!   gradient, built by [`compute_hessian`].
//! - Inversion goes through a symmetric eigendecomposition; eigenvalues at
//!   or below [`EIGEN_EPS`] are dropped (pseudo-inverse), so a flat
//!   direction yields zero variance rather than a panic.
//! - The model is re-evaluated at `θ̂` afterwards, leaving it in the
//!   best-fit state.
//!
//! Invariants & assumptions
//! ------------------------
//! - All results are in optimizer (transformed) space, ordered like the
//!   estimate set's enabled order.
use std::cell::RefCell;

use nalgebra::DMatrix;
use ndarray::Array1;

use crate::{
    model::Model,
    objective::ObjectiveFunction,
    optimization::{
        calibration::Calibration,
        errors::{OptError, OptResult},
        minimiser::{
            finite_diff::{compute_hessian, fd_gradient},
            types::{Grad, Hessian, Theta},
        },
    },
};

/// Eigenvalues at or below this are treated as zero.
pub const EIGEN_EPS: f64 = 1e-10;

/// Covariance matrix of the estimates at `theta_hat`.
///
/// # Errors
/// - [`OptError::SingularHessian`] if no eigenvalue is positive.
/// - Any evaluation or validation error raised while differentiating.
pub fn covariance_matrix<M: Model, O: ObjectiveFunction>(
    calibration: &Calibration<M, O>, theta_hat: &Theta,
) -> OptResult<Hessian> {
    let hessian = objective_hessian(calibration, theta_hat)?;
    calibration.evaluate_theta(theta_hat)?;
    pseudo_inverse(&hessian)
}

/// Square roots of the covariance diagonal.
pub fn standard_errors<M: Model, O: ObjectiveFunction>(
    calibration: &Calibration<M, O>, theta_hat: &Theta,
) -> OptResult<Array1<f64>> {
    let covariance = covariance_matrix(calibration, theta_hat)?;
    Ok(covariance.diag().mapv(f64::sqrt))
}

/// Correlation matrix derived from a covariance matrix.
pub fn correlation(covariance: &Hessian) -> Hessian {
    let sd = covariance.diag().mapv(f64::sqrt);
    let mut corr = covariance.clone();
    for ((i, j), v) in corr.indexed_iter_mut() {
        let denom = sd[i] * sd[j];
        *v = if denom > 0.0 { *v / denom } else { 0.0 };
    }
    corr
}

// ---- Helper methods ----

fn objective_hessian<M: Model, O: ObjectiveFunction>(
    calibration: &Calibration<M, O>, theta_hat: &Theta,
) -> OptResult<Hessian> {
    let first_err: RefCell<Option<OptError>> = RefCell::new(None);
    let grad_fn = |theta: &Theta| -> Grad {
        fd_gradient(theta, |t| Ok(calibration.evaluate_theta(t)?)).unwrap_or_else(|e| {
            let mut slot = first_err.borrow_mut();
            if slot.is_none() {
                *slot = Some(e);
            }
            Array1::from_elem(theta.len(), f64::NAN)
        })
    };
    let hessian = compute_hessian(&grad_fn, theta_hat);
    if let Some(err) = first_err.take() {
        return Err(err);
    }
    hessian
}

fn pseudo_inverse(hessian: &Hessian) -> OptResult<Hessian> {
    let n = hessian.nrows();
    let h = DMatrix::from_fn(n, n, |i, j| hessian[[i, j]]);
    let eigen = h.symmetric_eigen();
    if !eigen.eigenvalues.iter().any(|&lambda| lambda > EIGEN_EPS) {
        return Err(OptError::SingularHessian);
    }
    let q = &eigen.eigenvectors;
    let mut covariance = Hessian::zeros((n, n));
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda <= EIGEN_EPS {
            continue;
        }
        for i in 0..n {
            for j in 0..n {
                covariance[[i, j]] += q[(i, k)] * q[(j, k)] / lambda;
            }
        }
    }
    Ok(covariance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // The pseudo-inverse of a positive-definite matrix is its inverse.
    fn pseudo_inverse_inverts_positive_definite() {
        let h = array![[4.0, 0.0], [0.0, 0.25]];

        let cov = pseudo_inverse(&h).unwrap();

        assert!((cov[[0, 0]] - 0.25).abs() < 1e-12);
        assert!((cov[[1, 1]] - 4.0).abs() < 1e-12);
        assert!(cov[[0, 1]].abs() < 1e-12);
    }

    #[test]
    fn flat_directions_are_dropped_and_all_flat_is_singular() {
        let partly_flat = array![[2.0, 0.0], [0.0, 0.0]];
        let flat = array![[0.0, 0.0], [0.0, 0.0]];

        let cov = pseudo_inverse(&partly_flat).unwrap();

        assert!((cov[[0, 0]] - 0.5).abs() < 1e-12);
        assert!(cov[[1, 1]].abs() < 1e-12);
        assert_eq!(pseudo_inverse(&flat), Err(OptError::SingularHessian));
    }

    #[test]
    fn correlation_has_unit_diagonal() {
        let cov = array![[4.0, 1.0], [1.0, 1.0]];

        let corr = correlation(&cov);

        assert_eq!(corr[[0, 0]], 1.0);
        assert_eq!(corr[[1, 1]], 1.0);
        assert!((corr[[0, 1]] - 0.5).abs() < 1e-15);
    }
}
