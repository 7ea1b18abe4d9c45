//! Simulation presets and the launch options read from the host page.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;

use crate::error::FluidError;

/// Element id the backdrop mounts into when no other container is given.
pub const DEFAULT_CONTAINER_ID: &str = "webgl-fluid-container";

/// Viewports at or below this width get the reduced preset under `auto`.
pub const NARROW_VIEWPORT_PX: f64 = 768.0;

/// Named preset a backdrop runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Standard,
    Reduced,
}

impl Profile {
    /// Pick a preset from the viewport width and the browser user agent.
    pub fn detect(viewport_width: f64, user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        let mobile_ua = ["mobi", "android", "iphone", "ipad"]
            .iter()
            .any(|needle| ua.contains(needle));
        if viewport_width <= NARROW_VIEWPORT_PX || mobile_ua {
            Profile::Reduced
        } else {
            Profile::Standard
        }
    }

    pub fn config(self) -> FluidConfig {
        match self {
            Profile::Standard => FluidConfig::standard(),
            Profile::Reduced => FluidConfig::reduced(),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Standard => f.write_str("standard"),
            Profile::Reduced => f.write_str("reduced"),
        }
    }
}

/// Profile choice as written in the page: a fixed preset or `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileChoice {
    #[default]
    Auto,
    Fixed(Profile),
}

impl ProfileChoice {
    pub fn resolve(self, viewport_width: f64, user_agent: &str) -> Profile {
        match self {
            ProfileChoice::Auto => Profile::detect(viewport_width, user_agent),
            ProfileChoice::Fixed(profile) => profile,
        }
    }
}

impl FromStr for ProfileChoice {
    type Err = FluidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(ProfileChoice::Auto),
            "standard" | "desktop" => Ok(ProfileChoice::Fixed(Profile::Standard)),
            "reduced" | "mobile" => Ok(ProfileChoice::Fixed(Profile::Reduced)),
            _ => Err(FluidError::UnknownProfile(s.to_string())),
        }
    }
}

/// How the display pass blends the palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayStyle {
    /// Palette weights vary with time and screen position, quadratic vignette.
    Standard,
    /// Palette weights vary with time only, linear vignette.
    Reduced,
}

/// Three palette colours blended by the display pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub colors: [Vec3; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: [
                Vec3::new(0.1, 0.14, 0.39), // deep blue
                Vec3::new(0.24, 0.57, 0.8), // bright blue
                Vec3::new(0.54, 0.31, 1.0), // purple
            ],
        }
    }
}

/// Solver constants. Fixed for the lifetime of a solver.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidConfig {
    /// Screen pixels per grid cell.
    pub grid_scale: f64,
    pub dt: f32,
    pub jacobi_iterations: usize,
    pub velocity_dissipation: f32,
    pub density_dissipation: f32,
    pub force_multiplier: f32,
    /// Extra factor on pointer-driven forces.
    pub pointer_force_scale: f32,
    pub color_multiplier: f32,
    pub splat_radius: f32,
    pub vortex_points: usize,
    pub vortex_radius: f32,
    pub vortex_splat_radius: f32,
    pub vortex_speed: f32,
    /// Frames skipped between two simulated frames.
    pub skip_frames: u32,
    pub resize_debounce_ms: i32,
    pub display: DisplayStyle,
    pub palette: Palette,
    pub alpha: f32,
}

impl FluidConfig {
    pub fn standard() -> Self {
        Self {
            grid_scale: 1.0,
            dt: 0.15,
            jacobi_iterations: 20,
            velocity_dissipation: 0.999,
            density_dissipation: 0.999,
            force_multiplier: 3000.0,
            pointer_force_scale: 30.0,
            color_multiplier: 10.0,
            splat_radius: 0.01,
            vortex_points: 12,
            vortex_radius: 0.3,
            vortex_splat_radius: 0.08,
            vortex_speed: 0.02,
            skip_frames: 0,
            resize_debounce_ms: 250,
            display: DisplayStyle::Standard,
            palette: Palette::default(),
            alpha: 0.95,
        }
    }

    /// Coarser grid, fewer iterations and weaker impulses for small devices.
    pub fn reduced() -> Self {
        Self {
            grid_scale: 3.0,
            jacobi_iterations: 10,
            velocity_dissipation: 0.99,
            density_dissipation: 0.99,
            force_multiplier: 800.0,
            pointer_force_scale: 3.0,
            color_multiplier: 8.0,
            splat_radius: 0.015,
            vortex_points: 6,
            skip_frames: 1,
            resize_debounce_ms: 500,
            display: DisplayStyle::Reduced,
            ..Self::standard()
        }
    }

    /// Whether frame number `frame` runs a step; the rest are skipped.
    pub fn runs_frame(&self, frame: u64) -> bool {
        frame % (self.skip_frames as u64 + 1) == 0
    }
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Options a page sets on the container element.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    pub profile: ProfileChoice,
    pub log_level: log::LevelFilter,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            profile: ProfileChoice::Auto,
            log_level: log::LevelFilter::Info,
        }
    }
}

impl LaunchOptions {
    pub const PROFILE_ATTR: &'static str = "data-fluid-profile";
    pub const LOG_ATTR: &'static str = "data-fluid-log";

    /// Build options from attribute lookups; missing attributes keep defaults.
    pub fn from_attributes<F>(lookup: F) -> Result<Self, FluidError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();
        if let Some(profile) = lookup(Self::PROFILE_ATTR) {
            options.profile = profile.parse()?;
        }
        if let Some(level) = lookup(Self::LOG_ATTR) {
            options.log_level = level
                .trim()
                .parse()
                .map_err(|_| FluidError::UnknownLogLevel(level.clone()))?;
        }
        Ok(options)
    }
}
