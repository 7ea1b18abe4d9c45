//! Grid-sized storage: single fields and the read/write double buffer.

use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

use glam::{Vec2, Vec3};

use crate::error::{FluidError, Result};

/// Grid dimensions in cells. Both sides are at least one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FluidError::EmptyGrid { width, height });
        }
        Ok(Self { width, height })
    }

    /// Grid for a viewport of `px_width` x `px_height` pixels at `scale`
    /// pixels per cell. Never smaller than 1x1.
    pub fn from_viewport(px_width: f64, px_height: f64, scale: f64) -> Self {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let cells = |px: f64| ((px / scale).floor().max(1.0)) as usize;
        Self {
            width: cells(px_width),
            height: cells(px_height),
        }
    }

    pub fn cells(&self) -> usize {
        self.width * self.height
    }

    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// One cell in normalized coordinates.
    pub fn texel(&self) -> Vec2 {
        self.extent().recip()
    }

    /// Normalized centre of cell `(i, j)`.
    #[inline]
    pub fn center(&self, i: usize, j: usize) -> Vec2 {
        (Vec2::new(i as f32, j as f32) + 0.5) / self.extent()
    }
}

/// Value stored in one grid cell: a scalar, a 2D vector or an RGB colour.
pub trait Cell:
    Copy + Default + PartialEq + Debug + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self>
{
    fn norm_squared(self) -> f32;

    /// Largest absolute component.
    fn peak(self) -> f32;
}

impl Cell for f32 {
    fn norm_squared(self) -> f32 {
        self * self
    }

    fn peak(self) -> f32 {
        self.abs()
    }
}

impl Cell for Vec2 {
    fn norm_squared(self) -> f32 {
        self.dot(self)
    }

    fn peak(self) -> f32 {
        self.abs().max_element()
    }
}

impl Cell for Vec3 {
    fn norm_squared(self) -> f32 {
        self.dot(self)
    }

    fn peak(self) -> f32 {
        self.abs().max_element()
    }
}

/// One `T` per cell, row-major, row 0 at the bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    size: GridSize,
    data: Vec<T>,
}

pub type ScalarField = Field<f32>;
pub type VectorField = Field<Vec2>;
pub type ColorField = Field<Vec3>;

impl<T: Cell> Field<T> {
    pub fn zeroed(size: GridSize) -> Self {
        Self {
            size,
            data: vec![T::default(); size.cells()],
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.size.width + i
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[self.index(i, j)]
    }

    /// Cell value with out-of-range indices clamped to the edge.
    #[inline]
    pub fn get_clamped(&self, i: isize, j: isize) -> T {
        let i = i.clamp(0, self.size.width as isize - 1) as usize;
        let j = j.clamp(0, self.size.height as isize - 1) as usize;
        self.get(i, j)
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let idx = self.index(i, j);
        self.data[idx] = value;
    }

    pub fn cells(&self) -> &[T] {
        &self.data
    }

    /// Mutable rows, bottom first.
    pub fn rows_mut(&mut self) -> std::slice::ChunksMut<'_, T> {
        self.data.chunks_mut(self.size.width)
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn clear(&mut self) {
        self.fill(T::default());
    }

    /// Bilinear sample at normalized position `p`, clamp-to-edge addressing.
    pub fn sample(&self, p: Vec2) -> T {
        let pos = p * self.size.extent() - 0.5;
        let base = pos.floor();
        let f = pos - base;
        let (i0, j0) = (base.x as isize, base.y as isize);

        let a = self.get_clamped(i0, j0);
        let b = self.get_clamped(i0 + 1, j0);
        let c = self.get_clamped(i0, j0 + 1);
        let d = self.get_clamped(i0 + 1, j0 + 1);

        let bottom = a + (b - a) * f.x;
        let top = c + (d - c) * f.x;
        bottom + (top - bottom) * f.y
    }
}

/// Two same-sized fields; one is read, the other written.
#[derive(Debug, Clone)]
pub struct DoubleBuffer<T> {
    slots: [Field<T>; 2],
    read: usize,
}

impl<T: Cell> DoubleBuffer<T> {
    pub fn zeroed(size: GridSize) -> Self {
        Self {
            slots: [Field::zeroed(size), Field::zeroed(size)],
            read: 0,
        }
    }

    pub fn read(&self) -> &Field<T> {
        &self.slots[self.read]
    }

    pub fn read_mut(&mut self) -> &mut Field<T> {
        &mut self.slots[self.read]
    }

    pub fn write(&mut self) -> &mut Field<T> {
        &mut self.slots[1 - self.read]
    }

    /// Slot index currently labelled `read`.
    pub fn read_slot(&self) -> usize {
        self.read
    }

    /// Borrow the read field and the write field at once.
    pub fn split(&mut self) -> (&Field<T>, &mut Field<T>) {
        let (first, second) = self.slots.split_at_mut(1);
        if self.read == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        }
    }

    pub fn swap(&mut self) {
        self.read = 1 - self.read;
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(w: usize, h: usize) -> GridSize {
        GridSize::new(w, h).unwrap()
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert!(matches!(
            GridSize::new(0, 4),
            Err(FluidError::EmptyGrid { width: 0, height: 4 })
        ));
    }

    #[test]
    fn viewport_grid_floors_and_clamps() {
        assert_eq!(
            GridSize::from_viewport(1280.0, 721.0, 3.0),
            GridSize { width: 426, height: 240 }
        );
        assert_eq!(
            GridSize::from_viewport(0.0, 2.0, 3.0),
            GridSize { width: 1, height: 1 }
        );
    }

    #[test]
    fn centres_and_texels() {
        let grid = size(4, 2);
        assert_eq!(grid.texel(), Vec2::new(0.25, 0.5));
        assert_eq!(grid.center(0, 0), Vec2::new(0.125, 0.25));
        assert_eq!(grid.center(3, 1), Vec2::new(0.875, 0.75));
    }

    #[test]
    fn sample_at_centre_returns_cell() {
        let grid = size(4, 4);
        let mut f = ScalarField::zeroed(grid);
        f.set(2, 1, 3.0);
        assert_eq!(f.sample(grid.center(2, 1)), 3.0);
    }

    #[test]
    fn sample_between_cells_interpolates() {
        let grid = size(4, 1);
        let mut f = VectorField::zeroed(grid);
        f.set(1, 0, Vec2::new(2.0, -2.0));
        f.set(2, 0, Vec2::new(4.0, -4.0));
        let v = f.sample(Vec2::new(0.5, 0.5));
        assert!(v.abs_diff_eq(Vec2::new(3.0, -3.0), 1e-6));
    }

    #[test]
    fn sample_clamps_to_edge() {
        let grid = size(3, 3);
        let mut f = ScalarField::zeroed(grid);
        f.fill(1.0);
        f.set(0, 0, 5.0);
        assert_eq!(f.sample(Vec2::ZERO), 5.0);
        assert_eq!(f.sample(Vec2::splat(-1.0)), 5.0);
    }

    #[test]
    fn cell_norms() {
        assert_eq!((-3.0f32).peak(), 3.0);
        assert_eq!(Vec2::new(3.0, -4.0).norm_squared(), 25.0);
        assert_eq!(Vec3::new(0.5, -2.0, 1.0).peak(), 2.0);
    }

    #[test]
    fn split_hands_out_distinct_slots() {
        let mut buf = DoubleBuffer::<f32>::zeroed(size(2, 2));
        {
            let (read, write) = buf.split();
            assert!(!std::ptr::eq(read, write));
            write.fill(7.0);
        }
        assert_eq!(buf.read().get(0, 0), 0.0);
        buf.swap();
        assert_eq!(buf.read().get(1, 1), 7.0);
    }
}
