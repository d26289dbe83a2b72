//! ACES filmic tone mapping.
//!
//! The fragment shaders map HDR lighting to display range with the ACES
//! filmic fit (Narkowicz approximation) after multiplying by the configured
//! exposure. The Rust implementation here is the reference the shader
//! constant mirrors, and what the tests exercise.

/// WGSL implementation of the ACES filmic curve. Prepend to shader sources
/// that call `aces_filmic(...)`.
pub const ACES_WGSL: &str = r#"
fn aces_filmic(color: vec3<f32>) -> vec3<f32> {
    let a = 2.51;
    let b = 0.03;
    let c = 2.43;
    let d = 0.59;
    let e = 0.14;
    return clamp(
        (color * (a * color + vec3<f32>(b))) / (color * (c * color + vec3<f32>(d)) + vec3<f32>(e)),
        vec3<f32>(0.0),
        vec3<f32>(1.0),
    );
}
"#;

/// ACES filmic curve for a single channel.
pub fn aces_filmic(x: f32) -> f32 {
    let (a, b, c, d, e) = (2.51, 0.03, 2.43, 0.59, 0.14);
    ((x * (a * x + b)) / (x * (c * x + d) + e)).clamp(0.0, 1.0)
}

/// ACES filmic curve applied per channel.
pub fn aces_filmic_rgb(rgb: [f32; 3]) -> [f32; 3] {
    [
        aces_filmic(rgb[0]),
        aces_filmic(rgb[1]),
        aces_filmic(rgb[2]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_maps_to_black() {
        assert_eq!(aces_filmic(0.0), 0.0);
    }

    #[test]
    fn test_output_bounded_by_one() {
        for x in [0.5, 1.0, 2.0, 10.0, 1000.0] {
            let y = aces_filmic(x);
            assert!((0.0..=1.0).contains(&y), "aces({x}) = {y} out of range");
        }
    }

    #[test]
    fn test_curve_is_monotonic() {
        let mut prev = aces_filmic(0.0);
        for i in 1..=1000 {
            let x = i as f32 * 0.01;
            let y = aces_filmic(x);
            assert!(y >= prev, "curve decreased at x = {x}");
            prev = y;
        }
    }

    #[test]
    fn test_highlights_compress() {
        // Doubling a bright input must less-than-double the output.
        let y1 = aces_filmic(2.0);
        let y2 = aces_filmic(4.0);
        assert!(y2 < 2.0 * y1);
    }

    #[test]
    fn test_rgb_applies_per_channel() {
        let rgb = aces_filmic_rgb([0.0, 0.18, 10.0]);
        assert_eq!(rgb[0], 0.0);
        assert_eq!(rgb[1], aces_filmic(0.18));
        assert_eq!(rgb[2], aces_filmic(10.0));
    }

    #[test]
    fn test_wgsl_matches_reference_constants() {
        // The shader copy must carry the same fit constants.
        for constant in ["2.51", "0.03", "2.43", "0.59", "0.14"] {
            assert!(
                ACES_WGSL.contains(constant),
                "WGSL tonemap is missing constant {constant}"
            );
        }
    }
}
