//! Field measurements for logging and tests.

use crate::field::{Cell, Field, ScalarField, VectorField};
use crate::kernels;

/// Mean of `|value|` over a scalar field.
pub fn mean_abs(field: &ScalarField) -> f32 {
    let cells = field.cells();
    let total: f64 = cells.iter().map(|c| c.abs() as f64).sum();
    (total / cells.len() as f64) as f32
}

/// Mean absolute divergence of a velocity field.
pub fn mean_abs_divergence(velocity: &VectorField) -> f32 {
    let mut div = ScalarField::zeroed(velocity.size());
    kernels::divergence(velocity, &mut div);
    mean_abs(&div)
}

/// Euclidean norm over every component of every cell.
pub fn l2_norm<T: Cell>(field: &Field<T>) -> f32 {
    let sum: f64 = field.cells().iter().map(|c| c.norm_squared() as f64).sum();
    sum.sqrt() as f32
}

/// Largest component magnitude in the field.
pub fn max_abs<T: Cell>(field: &Field<T>) -> f32 {
    field.cells().iter().fold(0.0f32, |acc, c| acc.max(c.peak()))
}
