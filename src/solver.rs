//! Stable-Fluids grid solver: owns every grid-sized field for one size.

use glam::{Vec2, Vec3};

use crate::config::FluidConfig;
use crate::diagnostics;
use crate::display::DisplayPass;
use crate::field::{ColorField, DoubleBuffer, GridSize, ScalarField, VectorField};
use crate::impulse::{self, Impulse, PointerState};
use crate::kernels;

/// Fields and constants for one grid size. `resize` replaces every field.
#[derive(Debug, Clone)]
pub struct FluidSolver {
    config: FluidConfig,
    size: GridSize,
    velocity: DoubleBuffer<Vec2>,
    dye: DoubleBuffer<Vec3>,
    divergence: ScalarField,
    pressure: DoubleBuffer<f32>,
}

impl FluidSolver {
    /// Allocate cleared fields: zero velocity and pressure, black dye.
    pub fn new(config: FluidConfig, size: GridSize) -> Self {
        log::debug!(
            "allocating fluid grid {}x{} ({} jacobi iterations)",
            size.width,
            size.height,
            config.jacobi_iterations
        );
        Self {
            config,
            size,
            velocity: DoubleBuffer::zeroed(size),
            dye: DoubleBuffer::zeroed(size),
            divergence: ScalarField::zeroed(size),
            pressure: DoubleBuffer::zeroed(size),
        }
    }

    /// Drop every field and allocate new cleared ones at `size`.
    pub fn resize(&mut self, size: GridSize) {
        *self = Self::new(self.config.clone(), size);
    }

    pub fn config(&self) -> &FluidConfig {
        &self.config
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn velocity(&self) -> &VectorField {
        self.velocity.read()
    }

    pub fn velocity_mut(&mut self) -> &mut VectorField {
        self.velocity.read_mut()
    }

    pub fn dye(&self) -> &ColorField {
        self.dye.read()
    }

    pub fn divergence(&self) -> &ScalarField {
        &self.divergence
    }

    pub fn pressure(&self) -> &ScalarField {
        self.pressure.read()
    }

    /// Additive force splat into the velocity field.
    pub fn splat_force(&mut self, point: Vec2, force: Vec2, radius: f32) {
        let (read, write) = self.velocity.split();
        kernels::splat(read, write, point, force, radius);
        self.velocity.swap();
    }

    /// Additive colour splat into the dye field.
    pub fn splat_dye(&mut self, point: Vec2, color: Vec3, radius: f32) {
        let (read, write) = self.dye.split();
        kernels::splat(read, write, point, color, radius);
        self.dye.swap();
    }

    pub fn apply_impulse(&mut self, impulse: &Impulse) {
        self.splat_force(impulse.point, impulse.force, impulse.radius);
        self.splat_dye(impulse.point, impulse.color, impulse.radius);
    }

    /// Startup vortex ring.
    pub fn seed_vortex(&mut self) {
        for imp in impulse::vortex(&self.config) {
            self.apply_impulse(&imp);
        }
    }

    /// Startup vortex followed by the scripted pressed drag.
    pub fn seed(&mut self, time_secs: f64) {
        self.seed_vortex();
        for imp in impulse::startup_drag(&self.config, time_secs) {
            self.apply_impulse(&imp);
        }
    }

    pub fn inject_pointer(&mut self, pointer: &mut PointerState, time_secs: f64) {
        if let Some(imp) = pointer.take_impulse(&self.config, time_secs) {
            self.apply_impulse(&imp);
        }
    }

    /// Advect velocity by itself, then dye by the new velocity.
    pub fn advect(&mut self) {
        let dt = self.config.dt;
        {
            let (read, write) = self.velocity.split();
            kernels::advect(read, read, write, dt, self.config.velocity_dissipation);
        }
        self.velocity.swap();

        let (read, write) = self.dye.split();
        kernels::advect(
            self.velocity.read(),
            read,
            write,
            dt,
            self.config.density_dissipation,
        );
        self.dye.swap();
    }

    pub fn compute_divergence(&mut self) {
        kernels::divergence(self.velocity.read(), &mut self.divergence);
    }

    /// Reset pressure to zero, then run the configured Jacobi iterations.
    pub fn solve_pressure(&mut self) {
        self.pressure.clear();
        for _ in 0..self.config.jacobi_iterations {
            let (read, write) = self.pressure.split();
            kernels::jacobi(read, &self.divergence, write);
            self.pressure.swap();
        }
    }

    pub fn subtract_gradient(&mut self) {
        let (read, write) = self.velocity.split();
        kernels::subtract_gradient(self.pressure.read(), read, write);
        self.velocity.swap();
    }

    /// One simulation step without the display pass.
    pub fn step(&mut self, pointer: &mut PointerState, time_secs: f64) {
        self.inject_pointer(pointer, time_secs);
        self.advect();
        self.compute_divergence();
        self.solve_pressure();
        self.subtract_gradient();
    }

    pub fn display_pass(&self) -> DisplayPass {
        DisplayPass {
            style: self.config.display,
            palette: self.config.palette,
            alpha: self.config.alpha,
        }
    }

    pub fn render(&self, time_secs: f64, pixels: &mut Vec<u8>) {
        self.display_pass().render(self.dye.read(), time_secs, pixels);
    }

    /// Full frame: step, then draw the dye field into `pixels`.
    pub fn frame(&mut self, pointer: &mut PointerState, time_secs: f64, pixels: &mut Vec<u8>) {
        self.step(pointer, time_secs);
        self.render(time_secs, pixels);
    }

    /// Mean absolute divergence measured before the last projection.
    pub fn last_divergence(&self) -> f32 {
        diagnostics::mean_abs(&self.divergence)
    }
}
