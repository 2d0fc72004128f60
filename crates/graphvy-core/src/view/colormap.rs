use serde::{Deserialize, Serialize};

use crate::graph::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(rgb: u32) -> Self {
        let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0), 1.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn lerp(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        if t >= 1.0 {
            return other;
        }
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }
}

pub mod palette {
    use super::Rgba;

    pub const BACKGROUND: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const SOURCE: Rgba = Rgba::new(0.770, 0.245, 0.249, 0.0);
    pub const NODE: Rgba = Rgba::new(0.051, 0.278, 0.631, 1.0);
    pub const HIGHLIGHTED_NODE: Rgba = Rgba::new(0.758, 0.823, 0.92, 1.0);
    pub const SELECTED: Rgba = Rgba::new(0.514, 0.646, 0.839, 1.0);
    pub const PINNED: Rgba = Rgba::new(0.770, 0.455, 0.350, 1.0);
    pub const EDGE: Rgba = Rgba::new(0.16, 0.176, 0.467, 0.8);
    pub const HIGHLIGHTED_EDGE: Rgba = Rgba::new(0.760, 0.235, 0.239, 1.0);
    pub const SELECT_RECT: Rgba = Rgba::new(1.0, 1.0, 1.0, 0.8);
    pub const HEAD: Rgba = Rgba::new(0.16, 0.176, 0.467, 1.0);
    pub const HIGHLIGHTED_HEAD: Rgba = HIGHLIGHTED_EDGE;

    pub(crate) const VIVID: [u32; 10] = [
        0xE58606, 0x5D69B1, 0x52BCA3, 0x99C945, 0xCC61B0, 0x24796C, 0xDAA51B, 0x2F8AC4, 0x764E9F,
        0xED645A,
    ];

    pub(crate) const EMRLD: [u32; 7] = [
        0xd3f2a3, 0x97e196, 0x6cc08b, 0x4c9b82, 0x217a79, 0x105965, 0x074050,
    ];
}

/// Property value -> color.
#[derive(Debug, Clone, PartialEq)]
pub enum Colormap {
    Constant(Rgba),
    /// Indexed by integer state; out-of-range states wrap.
    Discrete(Vec<Rgba>),
    /// Sequential ramp over `[start, end]`.
    Continuous { start: f64, end: f64 },
}

impl Colormap {
    /// `states == 1` gives the default element color, up to ten states a
    /// qualitative palette, more a sampled sequential ramp. With `end` the
    /// map is continuous over `[states, end]`.
    pub fn build(states: usize, end: Option<f64>, for_vertices: bool) -> Self {
        if let Some(end) = end {
            return Colormap::Continuous {
                start: states as f64,
                end,
            };
        }
        match states {
            0 | 1 => Colormap::Constant(if for_vertices {
                palette::NODE
            } else {
                palette::EDGE
            }),
            2..=10 => Colormap::Discrete(
                palette::VIVID
                    .iter()
                    .take(states)
                    .map(|c| Rgba::from_hex(*c))
                    .collect(),
            ),
            n => Colormap::Discrete(
                (0..n)
                    .map(|i| emrld(i as f64 / (n - 1) as f64))
                    .collect(),
            ),
        }
    }

    pub fn default_for(for_vertices: bool) -> Self {
        Self::build(1, None, for_vertices)
    }

    pub fn color(&self, value: Option<Scalar>) -> Rgba {
        match self {
            Colormap::Constant(c) => *c,
            Colormap::Discrete(colors) => {
                let Some(first) = colors.first() else {
                    return palette::NODE;
                };
                let Some(value) = value else {
                    return *first;
                };
                let i = value.as_f64();
                if !i.is_finite() {
                    return *first;
                }
                let i = (i as i64).rem_euclid(colors.len() as i64) as usize;
                colors.get(i).copied().unwrap_or(*first)
            }
            Colormap::Continuous { start, end } => {
                let x = value.map(Scalar::as_f64).unwrap_or(*start);
                let span = end - start;
                let t = if span.abs() <= f64::EPSILON {
                    0.0
                } else {
                    (x - start) / span
                };
                emrld(t)
            }
        }
    }
}

/// Linear interpolation along the Emrld ramp, `t` clamped to `[0, 1]`.
fn emrld(t: f64) -> Rgba {
    let stops = &palette::EMRLD;
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let x = t * (stops.len() - 1) as f64;
    let i = (x.floor() as usize).min(stops.len() - 2);
    let frac = (x - i as f64) as f32;
    Rgba::from_hex(stops[i]).lerp(Rgba::from_hex(stops[i + 1]), frac)
}
