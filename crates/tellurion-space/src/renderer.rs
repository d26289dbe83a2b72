//! GPU point-list renderer for the starfield.
//!
//! Uploads the star catalog once as a vertex buffer and draws it as
//! alpha-blended points, tone mapped like the rest of the scene. The points
//! do not write depth; opaque bodies drawn afterwards occlude them via the
//! depth test.

use tellurion_render::{ACES_WGSL, CameraUniform, DepthBuffer, VertexPositionColor};

use crate::starfield::StarPoint;

/// Alpha applied to every star point.
pub const STAR_OPACITY: f32 = 0.8;

const STARFIELD_SHADER_BODY: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: CameraUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = camera.view_proj * vec4<f32>(in.position, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let mapped = aces_filmic(in.color.rgb * camera.params.x);
    return vec4<f32>(mapped, in.color.a);
}
"#;

/// GPU renderer for the starfield point cloud.
pub struct StarfieldRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    star_count: u32,
}

impl StarfieldRenderer {
    /// Create the renderer, uploading the star catalog to the GPU.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        camera_buffer: &wgpu::Buffer,
        stars: &[StarPoint],
    ) -> Self {
        let source = format!("{ACES_WGSL}\n{STARFIELD_SHADER_BODY}");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("starfield-shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let camera_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("starfield-camera-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<CameraUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("starfield-pipeline-layout"),
            bind_group_layouts: &[&camera_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("starfield-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[VertexPositionColor::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: false,
                depth_compare: DepthBuffer::COMPARE_FUNCTION,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let vertices: Vec<VertexPositionColor> = stars
            .iter()
            .map(|star| VertexPositionColor {
                position: star.position.to_array(),
                color: [star.color[0], star.color[1], star.color[2], STAR_OPACITY],
            })
            .collect();

        use wgpu::util::DeviceExt;
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("starfield-vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("starfield-camera-bg"),
            layout: &camera_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        log::info!("Starfield renderer initialized: {} points", stars.len());

        Self {
            pipeline,
            vertex_buffer,
            camera_bind_group,
            star_count: stars.len() as u32,
        }
    }

    /// Number of points uploaded.
    pub fn star_count(&self) -> u32 {
        self.star_count
    }

    /// Draw the starfield. Runs before the opaque bodies.
    pub fn render<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..self.star_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_has_entry_points() {
        assert!(STARFIELD_SHADER_BODY.contains("fn vs_main"));
        assert!(STARFIELD_SHADER_BODY.contains("fn fs_main"));
    }

    #[test]
    fn test_shader_tone_maps() {
        // The fragment stage must call the shared ACES function, and the
        // concatenated source must actually define it.
        assert!(STARFIELD_SHADER_BODY.contains("aces_filmic("));
        assert!(ACES_WGSL.contains("fn aces_filmic"));
    }

    #[test]
    fn test_star_opacity() {
        assert!((STAR_OPACITY - 0.8).abs() < f32::EPSILON);
    }
}
