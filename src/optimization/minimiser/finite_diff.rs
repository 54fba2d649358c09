//! Finite-difference derivatives of the objective.
//!
//! Purpose
//! -------
//! Provide the gradient and Hessian approximations used by L-BFGS and by
//! covariance estimation. The model exposes no analytic derivatives, so
//! every derivative here is built from repeated objective evaluations.
//!
//! Key behaviors
//! -------------
//! - [`fd_gradient`]: central differences first, forward differences as a
//!   fallback when an evaluation failed or the result is non-finite.
//! - [`compute_hessian`]: central-difference Hessian of a gradient
//!   function, forward fallback, symmetrized in place.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objective closures cannot return `Result` inside `finitediff`, so the
//!   first error is captured in a `RefCell` and the closure returns `NaN`;
//!   the captured error is surfaced afterwards.
use std::cell::RefCell;

use argmin::core::Error;
use finitediff::FiniteDiff;

use crate::optimization::{
    errors::OptResult,
    minimiser::{
        types::{Grad, Hessian, Theta},
        validation::{validate_grad, validate_hessian},
    },
};

/// Finite-difference gradient of a fallible scalar function.
///
/// Tries central differences. If any evaluation failed, or the gradient is
/// not finite, retries once with forward differences.
///
/// # Errors
/// - The first error raised by `func` during the forward pass.
/// - Validation errors for the forward-difference gradient.
pub fn fd_gradient<F>(theta: &Theta, func: F) -> OptResult<Grad>
where
    F: Fn(&Theta) -> Result<f64, Error>,
{
    let closure_err: RefCell<Option<Error>> = RefCell::new(None);
    let cost_func = |t: &Theta| -> f64 {
        match func(t) {
            Ok(val) => val,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let fd_grad = theta.central_diff(&cost_func);
    if closure_err.borrow().is_none() && validate_grad(&fd_grad, theta.len()).is_ok() {
        return Ok(fd_grad);
    }
    run_fd_diff(theta, &cost_func, &closure_err)
}

/// Forward-difference gradient of `func` at `theta`, with error capture.
///
/// Clears `closure_err`, runs `forward_diff`, then returns the captured
/// error if one occurred, otherwise the validated gradient.
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// Finite-difference Hessian of a gradient function at `theta`.
///
/// Central scheme first; forward scheme if the central result fails
/// validation. The returned matrix is symmetric.
///
/// # Errors
/// - [`OptError::HessianDimMismatch`](crate::optimization::errors::OptError::HessianDimMismatch)
///   or [`OptError::InvalidHessian`](crate::optimization::errors::OptError::InvalidHessian)
///   if both schemes fail validation.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut cent_hess = theta.central_hessian(f);
    match validate_hessian(&cent_hess, dim) {
        Ok(_) => {
            symmetrize_hess(&mut cent_hess);
            Ok(cent_hess)
        }
        Err(_) => {
            let mut forward_hess = theta.forward_hessian(f);
            validate_hessian(&forward_hess, dim)?;
            symmetrize_hess(&mut forward_hess);
            Ok(forward_hess)
        }
    }
}

// ---- Helper methods ----

fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
