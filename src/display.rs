//! Maps the dye field to RGBA8 pixels through the animated palette.

use glam::{Vec2, Vec3, Vec4};

use crate::config::{DisplayStyle, Palette};
use crate::field::ColorField;

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Display pass settings for one frame.
#[derive(Debug, Clone, Copy)]
pub struct DisplayPass {
    pub style: DisplayStyle,
    pub palette: Palette,
    pub alpha: f32,
}

impl DisplayPass {
    /// Colour of one pixel at normalized position `uv` before quantizing.
    pub fn shade(&self, dye: Vec3, uv: Vec2, time_secs: f64) -> Vec4 {
        let [c1, c2, c3] = self.palette.colors;
        let (u, v) = (uv.x, uv.y);
        let r = uv - 0.5;

        let (m1, m2, gain, vignette): (f32, f32, f32, f32) = match self.style {
            DisplayStyle::Standard => {
                let t = (time_secs * 0.05) as f32;
                let m1 = (t + u * 3.0 + v * 2.0).sin() * 0.5 + 0.5;
                let m2 = (t * 0.7 + u * 2.0 - v * 3.0).cos() * 0.5 + 0.5;
                (m1, m2, 2.0, 1.0 - r.length_squared() * 0.5)
            }
            DisplayStyle::Reduced => {
                let t = (time_secs * 0.03) as f32;
                let m1 = 0.5 + 0.5 * t.sin();
                let m2 = 0.5 + 0.5 * (t * 0.7).cos();
                (m1, m2, 1.5, 1.0 - r.length() * 0.7)
            }
        };

        let base = c1.lerp(c2, m1).lerp(c3, m2);
        ((base + dye * gain) * vignette).extend(self.alpha)
    }

    /// Fill `pixels` (4 bytes per cell, row 0 = bottom) from `dye`.
    pub fn render(&self, dye: &ColorField, time_secs: f64, pixels: &mut Vec<u8>) {
        let size = dye.size();
        pixels.resize(size.cells() * 4, 0);
        let width = size.width;
        for (idx, (cell, px)) in dye.cells().iter().zip(pixels.chunks_exact_mut(4)).enumerate() {
            let uv = size.center(idx % width, idx / width);
            let rgba = self.shade(*cell, uv, time_secs);
            for (byte, value) in px.iter_mut().zip(rgba.to_array()) {
                *byte = to_byte(value);
            }
        }
    }
}
