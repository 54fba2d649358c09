//! minimiser::builders — solver construction helpers.
//!
//! Purpose
//! -------
//! Build the argmin solvers the minimiser supports and apply the crate's
//! options to them, so the runner never touches argmin-specific setup.
//!
//! Key behaviors
//! -------------
//! - L-BFGS with either Hager–Zhang or More–Thuente line search; optional
//!   gradient and cost-change tolerances are applied by [`configure_lbfgs`].
//! - Nelder–Mead with an initial simplex built around `θ₀`: one vertex at
//!   `θ₀` and one per coordinate, displaced by
//!   `simplex_scale * max(1, |θ₀_i|)`.
//!
//! Conventions
//! -----------
//! - Builders do not set `θ₀` on the executor state or `max_iters`; those
//!   are runtime concerns handled by [`run_solver`](super::run::run_solver).
use argmin::solver::quasinewton::LBFGS;
use tracing::debug;

use crate::optimization::{
    errors::OptResult,
    minimiser::{
        options::MinimiserOptions,
        types::{
            Cost, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente, MoreThuenteLS,
            NelderMeadSolver, Theta,
        },
    },
};

/// Construct an L-BFGS solver using the Hager–Zhang line search.
pub fn build_optimizer_hager_zhang(opts: &MinimiserOptions) -> OptResult<LbfgsHagerZhang> {
    let lbfgs = LbfgsHagerZhang::new(HagerZhangLS::new(), opts.lbfgs_mem());
    configure_lbfgs(lbfgs, opts)
}

/// Construct an L-BFGS solver using the More–Thuente line search.
pub fn build_optimizer_more_thuente(opts: &MinimiserOptions) -> OptResult<LbfgsMoreThuente> {
    let lbfgs = LbfgsMoreThuente::new(MoreThuenteLS::new(), opts.lbfgs_mem());
    configure_lbfgs(lbfgs, opts)
}

/// Apply optional tolerances to an L-BFGS solver.
///
/// # Errors
/// Argmin's own tolerance validation, converted into
/// [`OptError`](crate::optimization::errors::OptError).
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MinimiserOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

/// Construct a Nelder–Mead solver with a simplex around `theta0`.
///
/// `tol_cost`, when set, becomes the simplex standard-deviation
/// tolerance. `tol_grad` has no meaning without gradients and is ignored.
pub fn build_nelder_mead(theta0: &Theta, opts: &MinimiserOptions) -> OptResult<NelderMeadSolver> {
    let mut vertices = Vec::with_capacity(theta0.len() + 1);
    vertices.push(theta0.clone());
    for i in 0..theta0.len() {
        let mut vertex = theta0.clone();
        vertex[i] += opts.simplex_scale * theta0[i].abs().max(1.0);
        vertices.push(vertex);
    }
    let mut solver = NelderMeadSolver::new(vertices);
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_sd_tolerance(c)?;
    }
    if opts.tols.tol_grad.is_some() {
        debug!("gradient tolerance ignored by Nelder-Mead");
    }
    Ok(solver)
}
