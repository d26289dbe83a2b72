//! Procedural starfield generation: deterministic star placement in a cube
//! volume with colors drawn from a narrow HSL hue band.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A single star in the generated point cloud.
#[derive(Clone, Debug)]
pub struct StarPoint {
    /// Position in world space, each coordinate within the cube volume.
    pub position: glam::Vec3,
    /// Linear RGB color derived from the hue band.
    pub color: [f32; 3],
}

/// Generates a deterministic star catalog from a seed.
pub struct StarfieldGenerator {
    seed: u64,
    star_count: u32,
    /// Half-extent of the cube volume stars are scattered in.
    extent: f32,
    /// Hue band `[hue_min, hue_max]` in HSL hue units.
    hue_min: f32,
    hue_max: f32,
    saturation: f32,
}

impl StarfieldGenerator {
    /// Create a generator with the given seed and star count, scattering over
    /// `[-extent, extent]` per axis with colors from the given hue band.
    pub fn new(
        seed: u64,
        star_count: u32,
        extent: f32,
        hue_min: f32,
        hue_max: f32,
        saturation: f32,
    ) -> Self {
        Self {
            seed,
            star_count,
            extent,
            hue_min,
            hue_max,
            saturation,
        }
    }

    /// Generate the star catalog. Deterministic for a given seed.
    pub fn generate(&self) -> Vec<StarPoint> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut stars = Vec::with_capacity(self.star_count as usize);

        for _ in 0..self.star_count {
            let x = (rng.random::<f32>() - 0.5) * 2.0 * self.extent;
            let y = (rng.random::<f32>() - 0.5) * 2.0 * self.extent;
            let z = (rng.random::<f32>() - 0.5) * 2.0 * self.extent;

            let hue = self.hue_min + rng.random::<f32>() * (self.hue_max - self.hue_min);
            // Half the stars sit in the upper lightness range, so none are
            // dimmer than half intensity.
            let lightness = rng.random::<f32>() * 0.5 + 0.5;
            let color = hsl_to_rgb(hue, self.saturation, lightness);

            stars.push(StarPoint {
                position: glam::Vec3::new(x, y, z),
                color,
            });
        }

        stars
    }
}

/// Convert an HSL color to linear RGB. Hue wraps modulo 1.0.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l, l, l];
    }

    let q = if l <= 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    [
        hue_channel(p, q, hue + 1.0 / 3.0),
        hue_channel(p, q, hue),
        hue_channel(p, q, hue - 1.0 / 3.0),
    ]
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}
