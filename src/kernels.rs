//! Per-cell passes of the Stable-Fluids step.
//!
//! Every pass reads settled input fields and writes a separate output field,
//! so no output cell depends on another output cell of the same pass. Rows
//! are filled independently through `rows_mut`.

use glam::{BVec2, Vec2};

use crate::field::{Cell, Field, ScalarField, VectorField};

/// Clamp `p` into `[lo, hi]` per axis. A single-cell axis has no interior
/// band (`lo > hi`) and is pinned to the middle.
#[inline]
fn clamp_inside(p: Vec2, lo: Vec2, hi: Vec2) -> Vec2 {
    let collapsed: BVec2 = lo.cmpgt(hi);
    Vec2::select(collapsed, Vec2::splat(0.5), p.max(lo).min(hi))
}

/// Semi-Lagrangian advection of `source` along `velocity` into `out`.
///
/// The backward trace is measured in texels and clamped one texel inside
/// the domain.
pub fn advect<T: Cell>(
    velocity: &VectorField,
    source: &Field<T>,
    out: &mut Field<T>,
    dt: f32,
    dissipation: f32,
) {
    let size = out.size();
    let texel = size.texel();
    let (lo, hi) = (texel, Vec2::ONE - texel);

    for (j, row) in out.rows_mut().enumerate() {
        for (i, cell) in row.iter_mut().enumerate() {
            let p = size.center(i, j);
            let back = clamp_inside(p - dt * velocity.sample(p) * texel, lo, hi);
            *cell = source.sample(back) * dissipation;
        }
    }
}

/// Central-difference divergence with edge-clamped neighbours.
pub fn divergence(velocity: &VectorField, out: &mut ScalarField) {
    for (j, row) in out.rows_mut().enumerate() {
        let j = j as isize;
        for (i, cell) in row.iter_mut().enumerate() {
            let i = i as isize;
            let e = velocity.get_clamped(i + 1, j).x;
            let w = velocity.get_clamped(i - 1, j).x;
            let n = velocity.get_clamped(i, j + 1).y;
            let s = velocity.get_clamped(i, j - 1).y;
            *cell = 0.5 * ((e - w) + (n - s));
        }
    }
}

/// One Jacobi sweep of the pressure Poisson equation.
pub fn jacobi(pressure: &ScalarField, divergence: &ScalarField, out: &mut ScalarField) {
    for (j, row) in out.rows_mut().enumerate() {
        let j = j as isize;
        for (i, cell) in row.iter_mut().enumerate() {
            let i = i as isize;
            let n = pressure.get_clamped(i, j + 1);
            let s = pressure.get_clamped(i, j - 1);
            let e = pressure.get_clamped(i + 1, j);
            let w = pressure.get_clamped(i - 1, j);
            let div = divergence.get(i as usize, j as usize);
            *cell = 0.25 * (n + s + e + w - div);
        }
    }
}

/// Projection: remove the pressure gradient from `velocity`.
pub fn subtract_gradient(pressure: &ScalarField, velocity: &VectorField, out: &mut VectorField) {
    for (j, row) in out.rows_mut().enumerate() {
        let j = j as isize;
        for (i, cell) in row.iter_mut().enumerate() {
            let i = i as isize;
            let gradient = Vec2::new(
                pressure.get_clamped(i + 1, j) - pressure.get_clamped(i - 1, j),
                pressure.get_clamped(i, j + 1) - pressure.get_clamped(i, j - 1),
            );
            *cell = velocity.get(i as usize, j as usize) - 0.5 * gradient;
        }
    }
}

/// Add `value` scaled by `1 - d / radius` to every cell whose centre lies
/// within `radius` of `point`; copy every other cell unchanged.
pub fn splat<T: Cell>(source: &Field<T>, out: &mut Field<T>, point: Vec2, value: T, radius: f32) {
    let size = out.size();
    for (j, row) in out.rows_mut().enumerate() {
        for (i, cell) in row.iter_mut().enumerate() {
            let v = source.get(i, j);
            let d = size.center(i, j).distance(point);
            *cell = if d < radius {
                v + value * (1.0 - d / radius)
            } else {
                v
            };
        }
    }
}
