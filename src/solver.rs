//! Chromaticity solver.
//!
//! Inverts the fixture's color-mixing model: given a target chromaticity,
//! find the unscaled drive coefficient of each emitter.
//!
//! The three emitter chromaticities span a triangle in CIE 1976 UCS space.
//! Under calibration the triangle's edges are not straight: the physical
//! mixing locus between two emitters bows away from the chord because the
//! emitters respond nonlinearly. The solver works one emitter at a time:
//! cast a sight line from the opposite vertex through the target, intersect
//! it with the calibrated edge between this emitter and its neighbor, and
//! read this emitter's drive level off its own response curve at the
//! intersection. Rotating the emitter roles three times yields the full
//! coefficient set.

use crate::calibration::ResponseFit;
use crate::color::Uv;

/// Denominators below this are treated as singular rather than divided by.
const SINGULAR_EPS: f64 = 1e-12;

/// Solver failure on inputs outside the model's domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverError {
    /// The sight line is undefined or parallel to the mixing edge, so the
    /// intersection has no unique solution (e.g. target at the opposite
    /// emitter's own chromaticity).
    DegenerateTarget,
    /// The sight line misses the calibrated edge entirely; the target is
    /// outside the region the curve model can represent.
    Unreachable,
}

/// 2D cross product of `(a - origin)` and `(b - origin)`.
fn cross_from(origin: Uv, a: Uv, b: Uv) -> f64 {
    let au = f64::from(a.u) - f64::from(origin.u);
    let av = f64::from(a.v) - f64::from(origin.v);
    let bu = f64::from(b.u) - f64::from(origin.u);
    let bv = f64::from(b.v) - f64::from(origin.v);
    au * bv - av * bu
}

/// Unscaled mixing coefficient of one emitter for a target chromaticity.
///
/// * `own`, `next` - the two emitters spanning the edge being intersected;
///   the returned coefficient belongs to `own`
/// * `opposite` - the remaining emitter, the sight-line origin
/// * `own_fit` - `own`'s level vs. distance along the `own -> next` edge
/// * `adjacent_fit` - the neighbor edge's fit, which supplies the curvature
///   of the `own -> next` mixing locus
///
/// The edge is modeled as the chord warped by the adjacent emitter's
/// departure from a linear (ideal) emitter:
///
/// ```text
/// W(d) = (1 - d) * own + d * next + delta(d) * (opposite - next)
/// delta(d) = f_adj(d) - linear(d)
/// ```
///
/// where `linear(d)` is `d` for an increasing fit (`p1 >= 0`) and `1 - d`
/// for a decreasing one, so the warp vanishes at both edge endpoints.
/// Requiring `W(d)` to be collinear with `opposite` and the target, and
/// clearing the fit's rational denominator `(d + q1)`, gives one quadratic
/// in `d`.
///
/// The sight line can cross the bowed curve twice. The physical
/// intersection is the branch that collapses onto the straight-chord
/// intersection as the calibration approaches the linear ideal, so of the
/// two roots the one nearer the chord solution is taken. Each root is
/// evaluated through the cancellation-free form for its sign regime
/// (standard and inverted quadratic formula); the choice between those two
/// expressions is numerical conditioning only, never a different geometric
/// solution.
pub fn mix_coefficient(
    target: Uv,
    own: Uv,
    next: Uv,
    opposite: Uv,
    own_fit: ResponseFit,
    adjacent_fit: ResponseFit,
) -> Result<f32, SolverError> {
    // Signed areas between the sight line and the two edge endpoints.
    // c0 vanishes when the target sits on the own-opposite line, c1 on the
    // next-opposite line; for targets inside the gamut they have opposite
    // signs.
    let c0 = cross_from(target, own, opposite);
    let c1 = cross_from(target, next, opposite);

    // Straight-chord intersection; undefined when the sight line runs
    // parallel to the edge (or the target coincides with `opposite`).
    if (c0 - c1).abs() < SINGULAR_EPS {
        return Err(SolverError::DegenerateTarget);
    }
    let d_chord = c0 / (c0 - c1);

    let p1 = f64::from(adjacent_fit.p1);
    let p2 = f64::from(adjacent_fit.p2);
    let q1 = f64::from(adjacent_fit.q1);

    // Collinearity of W(d), target and opposite, cleared by (d + q1).
    let (a, b, c) = if p1 < 0.0 {
        // Decreasing adjacent fit: linear(d) = 1 - d.
        // [(c0 + c1) - d*c0] * (d + q1) - (p1*d + p2)*c1 = 0
        (
            -c0,
            (c0 + c1) - q1 * c0 - p1 * c1,
            q1 * (c0 + c1) - p2 * c1,
        )
    } else {
        // Increasing adjacent fit: linear(d) = d.
        // [(1 - d)*c0 + 2*d*c1] * (d + q1) - (p1*d + p2)*c1 = 0
        (
            2.0 * c1 - c0,
            c0 * (1.0 - q1) + (2.0 * q1 - p1) * c1,
            q1 * c0 - p2 * c1,
        )
    };

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Err(SolverError::Unreachable);
    }

    // Sign-aware factor: q carries no cancellation regardless of b's sign,
    // so both roots q/a and c/q come out well conditioned.
    let sqrt_disc = libm::sqrt(disc);
    let q = -0.5 * (b + if b < 0.0 { -sqrt_disc } else { sqrt_disc });

    let first = if a.abs() > SINGULAR_EPS { Some(q / a) } else { None };
    let second = if q.abs() > SINGULAR_EPS { Some(c / q) } else { None };

    let d = match (first, second) {
        (Some(r1), Some(r2)) => {
            if (r1 - d_chord).abs() <= (r2 - d_chord).abs() {
                r1
            } else {
                r2
            }
        }
        (Some(root), None) | (None, Some(root)) => root,
        (None, None) => return Err(SolverError::DegenerateTarget),
    };

    Ok(own_fit.level_at(d))
}
