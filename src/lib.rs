#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Stable-Fluids backdrop for a web page.
//!
//! The solver, its fields and the display pass are plain Rust and build on
//! any target. The browser host (canvas, WebGL2 presenter, input, frame
//! loop) only compiles for wasm32.

pub mod config;
pub mod diagnostics;
pub mod display;
pub mod error;
pub mod field;
pub mod impulse;
pub mod kernels;
pub mod solver;

pub use config::{FluidConfig, LaunchOptions, Profile, ProfileChoice};
pub use error::FluidError;
pub use field::{DoubleBuffer, Field, GridSize};
pub use impulse::{Impulse, PointerState};
pub use solver::FluidSolver;

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub mod wasm;
