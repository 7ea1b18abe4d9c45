//! Pointer interaction state and the splat impulses it produces.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use crate::config::FluidConfig;

/// Pointer movement below this (normalized units, per axis) is ignored
/// unless the pointer is pressed.
pub const MOVE_THRESHOLD: f32 = 0.001;

/// Radius factor for impulses made while the pointer is pressed.
pub const PRESSED_RADIUS_SCALE: f32 = 1.5;

/// Colour factor for impulses made while the pointer only hovers.
pub const HOVER_COLOR_SCALE: f32 = 0.8;

/// A force splat and a dye splat sharing one centre and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impulse {
    pub point: Vec2,
    pub force: Vec2,
    pub color: Vec3,
    pub radius: f32,
}

/// `0.5 + 0.5 * sin(phase + {0, 2, 4})`.
pub fn cycle_color(phase: f32) -> Vec3 {
    let s = Vec3::new(phase.sin(), (phase + 2.0).sin(), (phase + 4.0).sin());
    Vec3::splat(0.5) + 0.5 * s
}

impl Impulse {
    /// Impulse for a pointer at `point` that moved by `delta` since the
    /// last frame.
    pub fn from_pointer(
        config: &FluidConfig,
        point: Vec2,
        delta: Vec2,
        pressed: bool,
        time_secs: f64,
    ) -> Self {
        let gain = config.force_multiplier * config.pointer_force_scale;
        let (radius_scale, color_scale) = if pressed {
            (PRESSED_RADIUS_SCALE, config.color_multiplier)
        } else {
            (1.0, config.color_multiplier * HOVER_COLOR_SCALE)
        };
        // keep the phase small before narrowing to f32
        let phase = (time_secs % std::f64::consts::TAU) as f32;
        Self {
            point,
            force: delta * gain,
            color: cycle_color(phase) * color_scale,
            radius: config.splat_radius * radius_scale,
        }
    }
}

/// Startup vortex: points on a circle pushing tangentially, each with its
/// own hue.
pub fn vortex(config: &FluidConfig) -> Vec<Impulse> {
    let n = config.vortex_points;
    let speed = config.vortex_speed * config.force_multiplier;
    (0..n)
        .map(|i| {
            let angle = i as f32 / n as f32 * TAU;
            let dir = Vec2::from_angle(angle);
            Impulse {
                point: Vec2::splat(0.5) + dir * config.vortex_radius,
                force: dir.perp() * speed,
                color: cycle_color(angle),
                radius: config.vortex_splat_radius,
            }
        })
        .collect()
}

/// Scripted pressed drag out from the centre, played once after startup.
pub fn startup_drag(config: &FluidConfig, time_secs: f64) -> [Impulse; 2] {
    let origin = Vec2::splat(0.5);
    [Vec2::splat(0.3), Vec2::splat(0.7)]
        .map(|to| Impulse::from_pointer(config, to, to - origin, true, time_secs))
}

/// Latest pointer position and press state, in normalized grid coordinates
/// with the origin at the bottom left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub current: Vec2,
    pub previous: Vec2,
    pub pressed: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            current: Vec2::splat(0.5),
            previous: Vec2::splat(0.5),
            pressed: false,
        }
    }
}

impl PointerState {
    /// Map client coordinates to normalized grid coordinates (y flipped).
    pub fn normalize(client: Vec2, rect_origin: Vec2, canvas_size: Vec2) -> Vec2 {
        let uv = (client - rect_origin) / canvas_size.max(Vec2::ONE);
        Vec2::new(uv.x, 1.0 - uv.y)
    }

    /// Pointer moved to `point`.
    pub fn move_to(&mut self, point: Vec2) {
        self.previous = self.current;
        self.current = point;
    }

    /// Touch began at `point`; no movement is implied.
    pub fn press_at(&mut self, point: Vec2) {
        self.pressed = true;
        self.current = point;
        self.previous = point;
    }

    pub fn press(&mut self) {
        self.pressed = true;
    }

    pub fn release(&mut self) {
        self.pressed = false;
    }

    pub fn delta(&self) -> Vec2 {
        self.current - self.previous
    }

    /// Impulse for this frame, if any. The delta is consumed here so a
    /// pointer that stops moving stops pushing.
    pub fn take_impulse(&mut self, config: &FluidConfig, time_secs: f64) -> Option<Impulse> {
        let delta = self.delta();
        let moved = delta.abs().cmpgt(Vec2::splat(MOVE_THRESHOLD)).any();
        if !moved && !self.pressed {
            return None;
        }
        self.previous = self.current;
        Some(Impulse::from_pointer(
            config,
            self.current,
            delta,
            self.pressed,
            time_secs,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_flips_y() {
        let rect = Vec2::new(10.0, 20.0);
        let canvas = Vec2::new(200.0, 100.0);
        let at = |x, y| PointerState::normalize(Vec2::new(x, y), rect, canvas);
        assert_eq!(at(10.0, 20.0), Vec2::new(0.0, 1.0));
        assert_eq!(at(110.0, 95.0), Vec2::new(0.5, 0.25));
        assert_eq!(at(210.0, 120.0), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn resting_pointer_makes_no_impulse() {
        let cfg = FluidConfig::standard();
        let mut ptr = PointerState::default();
        assert_eq!(ptr.take_impulse(&cfg, 0.0), None);
        ptr.move_to(Vec2::new(0.5005, 0.5));
        assert_eq!(ptr.take_impulse(&cfg, 0.0), None);
    }

    #[test]
    fn movement_is_consumed_once() {
        let cfg = FluidConfig::standard();
        let mut ptr = PointerState::default();
        ptr.move_to(Vec2::new(0.6, 0.5));
        let imp = ptr.take_impulse(&cfg, 0.0).unwrap();
        let expected = 0.1 * cfg.force_multiplier * cfg.pointer_force_scale;
        assert!((imp.force.x - expected).abs() < expected * 1e-4);
        assert_eq!(imp.force.y, 0.0);
        assert_eq!(imp.radius, cfg.splat_radius);
        assert_eq!(ptr.delta(), Vec2::ZERO);
        assert_eq!(ptr.take_impulse(&cfg, 0.0), None);
    }

    #[test]
    fn pressed_pointer_grows_radius_and_color() {
        let cfg = FluidConfig::reduced();
        let mut ptr = PointerState::default();
        ptr.press();
        let pressed = ptr.take_impulse(&cfg, 1.0).unwrap();
        assert_eq!(pressed.force, Vec2::ZERO);
        assert_eq!(pressed.radius, cfg.splat_radius * PRESSED_RADIUS_SCALE);

        let hover = Impulse::from_pointer(&cfg, Vec2::splat(0.5), Vec2::new(0.01, 0.0), false, 1.0);
        let ratio = hover.color / pressed.color;
        assert!(ratio.abs_diff_eq(Vec3::splat(HOVER_COLOR_SCALE), 1e-5));
    }

    #[test]
    fn touch_start_sets_both_positions() {
        let mut ptr = PointerState::default();
        ptr.press_at(Vec2::new(0.2, 0.9));
        assert_eq!(ptr.delta(), Vec2::ZERO);
        assert!(ptr.pressed);
        ptr.release();
        assert!(!ptr.pressed);
    }

    #[test]
    fn vortex_forces_are_tangential() {
        let cfg = FluidConfig::standard();
        let points = vortex(&cfg);
        assert_eq!(points.len(), 12);
        for imp in &points {
            let r = imp.point - Vec2::splat(0.5);
            let dot = r.dot(imp.force);
            assert!(dot.abs() < 1e-3, "radial component {dot}");
            assert!((r.length() - 0.3).abs() < 1e-5);
        }
        assert_eq!(vortex(&FluidConfig::reduced()).len(), 6);
    }

    #[test]
    fn startup_drag_measures_from_centre() {
        let cfg = FluidConfig::standard();
        let [first, second] = startup_drag(&cfg, 0.0);
        assert!(first.force.cmplt(Vec2::ZERO).all());
        assert!(second.force.cmpgt(Vec2::ZERO).all());
        assert_eq!(second.point, Vec2::splat(0.7));
    }
}
