//! UV-sphere mesh generation for celestial bodies.
//!
//! Latitude/longitude grid tessellation: `segments` slices around the
//! equator, `rings` stacks pole to pole. The seam column is duplicated so
//! texture coordinates stay continuous.

use crate::buffer::VertexPositionNormalUv;

/// CPU-side sphere mesh ready for buffer upload.
pub struct SphereMesh {
    pub vertices: Vec<VertexPositionNormalUv>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Generate a UV sphere of the given radius.
///
/// Produces `(segments + 1) * (rings + 1)` vertices and
/// `6 * segments * rings` indices. Normals point outward; UVs map longitude
/// to `u` and latitude to `v` with `v = 0` at the north pole.
pub fn generate_uv_sphere(radius: f32, segments: u32, rings: u32) -> SphereMesh {
    assert!(segments >= 3, "sphere needs at least 3 segments");
    assert!(rings >= 2, "sphere needs at least 2 rings");

    let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = v * std::f32::consts::PI;
        let (sin_phi, cos_phi) = phi.sin_cos();

        for segment in 0..=segments {
            let u = segment as f32 / segments as f32;
            let theta = u * std::f32::consts::TAU;
            let (sin_theta, cos_theta) = theta.sin_cos();

            let normal = [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta];
            vertices.push(VertexPositionNormalUv {
                position: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                normal,
                uv: [u, v],
            });
        }
    }

    let mut indices = Vec::with_capacity((6 * segments * rings) as usize);
    let stride = segments + 1;
    for ring in 0..rings {
        for segment in 0..segments {
            let a = ring * stride + segment;
            let b = a + stride;

            indices.extend_from_slice(&[a, b, a + 1]);
            indices.extend_from_slice(&[a + 1, b, b + 1]);
        }
    }

    SphereMesh { vertices, indices }
}
