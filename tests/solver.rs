//! Behaviour of the fluid solver as a whole.

use fluid_backdrop::diagnostics::{l2_norm, max_abs, mean_abs_divergence};
use glam::{Vec2, Vec3};
use fluid_backdrop::field::{ColorField, DoubleBuffer, GridSize, VectorField};
use fluid_backdrop::{kernels, FluidConfig, FluidSolver, PointerState};

fn grid(w: usize, h: usize) -> GridSize {
    GridSize::new(w, h).unwrap()
}

#[test]
fn projection_reduces_divergence() {
    for cfg in [FluidConfig::standard(), FluidConfig::reduced()] {
        let mut solver = FluidSolver::new(cfg, grid(32, 32));
        // a pure outflow source in the middle of the grid
        let vel = solver.velocity_mut();
        for j in 0..32 {
            for i in 0..32 {
                let r = vel.size().center(i, j) - 0.5;
                let fall = (-r.length_squared() / 0.01).exp();
                vel.set(i, j, r * fall * 20.0);
            }
        }

        solver.advect();
        let before = mean_abs_divergence(solver.velocity());
        assert!(before > 0.0);

        solver.compute_divergence();
        solver.solve_pressure();
        solver.subtract_gradient();
        let after = mean_abs_divergence(solver.velocity());

        assert!(after < before, "divergence grew: {before} -> {after}");
    }
}

#[test]
fn full_step_reports_pre_projection_divergence() {
    let mut solver = FluidSolver::new(FluidConfig::standard(), grid(24, 24));
    solver.splat_force(Vec2::splat(0.5), Vec2::new(0.0, 40.0), 0.2);
    let mut pointer = PointerState::default();
    solver.step(&mut pointer, 0.0);
    let after = mean_abs_divergence(solver.velocity());
    assert!(solver.last_divergence() > 0.0);
    assert!(after < solver.last_divergence());
}

#[test]
fn splat_falloff_boundary() {
    // 8x8 grid: cell centres are exact binary fractions 1/16 + k/8
    let mut solver = FluidSolver::new(FluidConfig::standard(), grid(8, 8));
    let centre = solver.size().center(3, 3);
    solver.splat_force(centre, Vec2::new(4.0, -2.0), 0.125);

    let vel = solver.velocity();
    assert_eq!(vel.get(3, 3), Vec2::new(4.0, -2.0));
    for (i, j) in [(4, 3), (2, 3), (3, 4), (3, 2), (5, 5), (0, 0)] {
        assert_eq!(vel.get(i, j), Vec2::ZERO, "cell ({i}, {j}) changed");
    }
}

#[test]
fn splat_dye_has_linear_falloff() {
    let mut solver = FluidSolver::new(FluidConfig::standard(), grid(8, 8));
    let centre = solver.size().center(3, 3);
    solver.splat_dye(centre, Vec3::new(1.0, 0.5, 0.0), 0.25);
    // one cell over is half the radius away
    let dyed = solver.dye().get(4, 3);
    assert!(dyed.abs_diff_eq(Vec3::new(0.5, 0.25, 0.0), 1e-6));
    assert_eq!(dyed.z, 0.0);
}

#[test]
fn swap_is_a_relabelling() {
    let mut buf = DoubleBuffer::<Vec2>::zeroed(grid(4, 4));
    buf.read_mut().fill(Vec2::ONE);
    buf.write().fill(Vec2::splat(2.0));

    let a: *const VectorField = buf.read();
    let b: *const VectorField = buf.write();
    let a_data = buf.read().cells().as_ptr();
    let b_data = buf.write().cells().as_ptr();
    let slot = buf.read_slot();

    buf.swap();

    assert!(std::ptr::eq(buf.read(), b));
    assert!(std::ptr::eq(buf.write(), a));
    assert_eq!(buf.read().cells().as_ptr(), b_data);
    assert_eq!(buf.write().cells().as_ptr(), a_data);
    assert_ne!(buf.read_slot(), slot);
    assert_eq!(buf.read().get(0, 0), Vec2::splat(2.0));
}

#[test]
fn dissipation_decays_static_dye() {
    let size = grid(32, 32);
    let velocity = VectorField::zeroed(size);
    let mut dye = DoubleBuffer::<Vec3>::zeroed(size);
    {
        let (read, write) = dye.split();
        kernels::splat(read, write, Vec2::splat(0.5), Vec3::new(1.0, 0.6, 0.2), 0.2);
    }
    dye.swap();

    let start = l2_norm(dye.read());
    let mut last = start;
    for _ in 0..400 {
        let (read, write) = dye.split();
        kernels::advect(&velocity, read, write, 0.15, 0.99);
        dye.swap();
        let norm = l2_norm(dye.read());
        assert!(norm < last, "norm did not shrink: {last} -> {norm}");
        last = norm;
    }
    assert!(last < start * 0.05);
}

#[test]
fn resize_reallocates_cleared_fields() {
    let mut solver = FluidSolver::new(FluidConfig::standard(), grid(20, 10));
    solver.seed(3.0);
    let mut pointer = PointerState::default();
    solver.step(&mut pointer, 3.0);
    assert!(max_abs(solver.dye()) > 0.0);

    let new_size = grid(13, 29);
    solver.resize(new_size);

    assert_eq!(solver.size(), new_size);
    assert_eq!(solver.velocity().size(), new_size);
    assert_eq!(solver.dye().size(), new_size);
    assert_eq!(solver.pressure().size(), new_size);
    assert_eq!(solver.divergence().size(), new_size);
    assert_eq!(max_abs(solver.velocity()), 0.0);
    assert_eq!(max_abs(solver.dye()), 0.0);
    assert_eq!(max_abs(solver.pressure()), 0.0);
    assert_eq!(max_abs(solver.divergence()), 0.0);
    assert_eq!(solver.dye(), &ColorField::zeroed(new_size));
}

#[test]
fn rightward_force_scenario() {
    let mut solver = FluidSolver::new(FluidConfig::standard(), grid(64, 64));
    solver.splat_force(Vec2::splat(0.5), Vec2::new(10.0, 0.0), 0.05);

    // 0.1 away from the centre, outside the radius: untouched by the splat
    assert_eq!(solver.velocity().sample(Vec2::new(0.6, 0.5)), Vec2::ZERO);
    assert_eq!(solver.velocity().sample(Vec2::new(0.5, 0.4)), Vec2::ZERO);

    solver.advect();
    let v = solver.velocity().sample(Vec2::splat(0.5));
    assert!(v.x > 0.0, "expected rightward flow, got {v}");
    assert!(v.x.abs() > v.y.abs());
}

#[test]
fn pointer_drag_pushes_fluid_along_drag() {
    let mut solver = FluidSolver::new(FluidConfig::reduced(), grid(48, 48));
    let mut pointer = PointerState::default();
    pointer.press();
    pointer.move_to(Vec2::new(0.55, 0.5));
    solver.inject_pointer(&mut pointer, 0.0);

    let v = solver.velocity().sample(Vec2::new(0.55, 0.5));
    assert!(v.x > 0.0);
    assert_eq!(v.y, 0.0);
    assert!(max_abs(solver.dye()) > 0.0);
    // movement is consumed by the injection
    assert_eq!(pointer.delta(), Vec2::ZERO);

    let mut idle = PointerState::default();
    solver.step(&mut idle, 0.0);
    assert!(max_abs(solver.dye()) > 0.0);
}
