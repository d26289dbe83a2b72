//! GPU renderer for the lit celestial bodies.
//!
//! Three pipelines: a depth-only shadow pass from the sun's view, an opaque
//! Phong body pass (Earth, Moon), and an additive translucent cloud pass
//! drawn last. All passes share the camera uniform and reverse-Z depth
//! convention; the body pass samples the sun shadow map and tone maps with
//! the shared ACES curve.

use std::num::NonZeroU64;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use tellurion_lighting::{LightRig, LightRigUniform, ShadowUniform, sun_shadow_matrix};
use tellurion_render::{
    ACES_WGSL, BufferAllocator, CameraUniform, DepthBuffer, ManagedTexture, MeshBuffer,
    VertexPositionNormalUv, generate_uv_sphere,
};

use crate::bodies::{BodyParams, SceneAssembly};

/// Half-width of the sun's orthographic shadow volume. Covers the Moon's
/// orbit circle with margin.
pub const SHADOW_HALF_EXTENT: f32 = 40.0;
/// Distance of the shadow eye from the origin along the sun direction.
pub const SHADOW_EYE_DISTANCE: f32 = 100.0;

/// The five surface textures the scene samples. Any of them may be a 1x1
/// fallback when its download failed.
pub struct SceneTextures {
    pub earth_color: Arc<ManagedTexture>,
    pub earth_normal: Arc<ManagedTexture>,
    pub earth_specular: Arc<ManagedTexture>,
    pub clouds: Arc<ManagedTexture>,
    pub moon: Arc<ManagedTexture>,
}

/// Per-body GPU uniform. 112 bytes, std140-compatible.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct BodyUniform {
    /// World transform of the body's node.
    model: [[f32; 4]; 4],
    /// x = shininess, y = bump scale, z = normal-map scale, w = opacity.
    params0: [f32; 4],
    /// xyz = specular tint, w = padding.
    specular: [f32; 4],
    /// x = normal map enabled, y = specular map enabled, zw = color-map
    /// texel size for the bump gradient.
    params1: [f32; 4],
}

impl BodyUniform {
    fn new(model: glam::Mat4, params: &BodyParams, color_dimensions: (u32, u32)) -> Self {
        let m = &params.material;
        Self {
            model: model.to_cols_array_2d(),
            params0: [m.shininess, m.bump_scale, m.normal_scale, m.opacity],
            specular: [
                m.specular_color[0],
                m.specular_color[1],
                m.specular_color[2],
                0.0,
            ],
            params1: [
                if params.textures.normal.is_some() { 1.0 } else { 0.0 },
                if params.textures.specular.is_some() { 1.0 } else { 0.0 },
                1.0 / color_dimensions.0.max(1) as f32,
                1.0 / color_dimensions.1.max(1) as f32,
            ],
        }
    }
}

const BODY_SHADER_BODY: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    params: vec4<f32>,
};

struct LightRig {
    sun_direction_intensity: vec4<f32>,
    sun_color: vec4<f32>,
    rim_direction_intensity: vec4<f32>,
    rim_color: vec4<f32>,
    ambient_color: vec4<f32>,
};

struct ShadowUniform {
    light_view_proj: mat4x4<f32>,
};

struct BodyUniform {
    model: mat4x4<f32>,
    params0: vec4<f32>,
    specular: vec4<f32>,
    params1: vec4<f32>,
};

@group(0) @binding(0) var<uniform> camera: CameraUniform;
@group(0) @binding(1) var<uniform> lights: LightRig;
@group(0) @binding(2) var<uniform> shadow: ShadowUniform;
@group(0) @binding(3) var shadow_map: texture_depth_2d;
@group(0) @binding(4) var shadow_sampler: sampler_comparison;

@group(1) @binding(0) var<uniform> body: BodyUniform;

@group(2) @binding(0) var t_color: texture_2d<f32>;
@group(2) @binding(1) var t_normal: texture_2d<f32>;
@group(2) @binding(2) var t_specular: texture_2d<f32>;
@group(2) @binding(3) var s_surface: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tangent: vec3<f32>,
    @location(3) uv: vec2<f32>,
    @location(4) shadow_pos: vec4<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let world = body.model * vec4<f32>(in.position, 1.0);
    // The model transform is rotation + translation, so normals rotate by
    // the same upper 3x3.
    let rot = mat3x3<f32>(body.model[0].xyz, body.model[1].xyz, body.model[2].xyz);

    // Eastward tangent of the UV-sphere parameterization, degenerate only
    // at the poles where the texture pinches anyway.
    var tangent_obj = vec3<f32>(-in.normal.z, 0.0, in.normal.x);
    if (dot(tangent_obj, tangent_obj) < 1e-8) {
        tangent_obj = vec3<f32>(1.0, 0.0, 0.0);
    }

    var out: VertexOutput;
    out.clip_position = camera.view_proj * world;
    out.world_pos = world.xyz;
    out.normal = rot * in.normal;
    out.tangent = rot * normalize(tangent_obj);
    out.uv = in.uv;
    out.shadow_pos = shadow.light_view_proj * world;
    return out;
}

fn luminance(c: vec3<f32>) -> f32 {
    return dot(c, vec3<f32>(0.299, 0.587, 0.114));
}

fn shadow_factor(shadow_pos: vec4<f32>) -> f32 {
    let ndc = shadow_pos.xyz / shadow_pos.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);
    // Reverse-Z: lit when the fragment is at least as close to the sun as
    // the nearest recorded caster.
    let lit = textureSampleCompareLevel(shadow_map, shadow_sampler, uv, ndc.z + 0.001);
    let inside = select(0.0, 1.0, abs(ndc.x) <= 1.0 && abs(ndc.y) <= 1.0);
    return mix(1.0, lit, inside);
}

fn surface_normal(in: VertexOutput) -> vec3<f32> {
    let n = normalize(in.normal);
    let t = normalize(in.tangent - n * dot(in.tangent, n));
    let b = cross(n, t);

    if (body.params1.x > 0.5) {
        var tn = textureSample(t_normal, s_surface, in.uv).xyz * 2.0 - 1.0;
        tn = vec3<f32>(tn.xy * body.params0.z, tn.z);
        return normalize(t * tn.x + b * tn.y + n * tn.z);
    }
    if (body.params0.y > 0.0) {
        // Bump from the color map's own luminance gradient.
        let texel = body.params1.zw;
        let h0 = luminance(textureSample(t_color, s_surface, in.uv).rgb);
        let hu = luminance(textureSample(t_color, s_surface, in.uv + vec2<f32>(texel.x, 0.0)).rgb);
        let hv = luminance(textureSample(t_color, s_surface, in.uv + vec2<f32>(0.0, texel.y)).rgb);
        let grad = vec2<f32>(hu - h0, hv - h0) * body.params0.y;
        return normalize(n - t * grad.x - b * grad.y);
    }
    return n;
}

fn shade_directional(
    dir_intensity: vec4<f32>,
    light_color: vec3<f32>,
    albedo: vec3<f32>,
    spec_tint: vec3<f32>,
    n: vec3<f32>,
    view_dir: vec3<f32>,
) -> vec3<f32> {
    let to_light = -dir_intensity.xyz;
    let diffuse = max(dot(n, to_light), 0.0);
    let halfway = normalize(to_light + view_dir);
    let spec_mask = select(0.0, 1.0, diffuse > 0.0);
    let spec = pow(max(dot(n, halfway), 0.0), body.params0.x) * spec_mask;
    return light_color * dir_intensity.w * (albedo * diffuse + spec_tint * spec);
}

@fragment
fn fs_body(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(t_color, s_surface, in.uv).rgb;
    let n = surface_normal(in);
    let view_dir = normalize(camera.camera_pos.xyz - in.world_pos);

    var spec_tint = body.specular.rgb;
    if (body.params1.y > 0.5) {
        spec_tint = spec_tint * textureSample(t_specular, s_surface, in.uv).rgb;
    }

    let sun_visibility = shadow_factor(in.shadow_pos);
    var lit = lights.ambient_color.rgb * albedo;
    lit += shade_directional(
        lights.sun_direction_intensity, lights.sun_color.rgb,
        albedo, spec_tint, n, view_dir,
    ) * sun_visibility;
    lit += shade_directional(
        lights.rim_direction_intensity, lights.rim_color.rgb,
        albedo, spec_tint, n, view_dir,
    );

    let mapped = aces_filmic(lit * camera.params.x);
    return vec4<f32>(mapped, 1.0);
}

@fragment
fn fs_clouds(in: VertexOutput) -> @location(0) vec4<f32> {
    let sample = textureSample(t_color, s_surface, in.uv);
    let n = normalize(in.normal);
    let sun = max(dot(n, -lights.sun_direction_intensity.xyz), 0.0)
        * lights.sun_direction_intensity.w;
    let lit = sample.rgb * (lights.ambient_color.rgb + lights.sun_color.rgb * sun);
    let mapped = aces_filmic(lit * camera.params.x);
    return vec4<f32>(mapped, sample.a * body.params0.w);
}
"#;

const SHADOW_SHADER: &str = r#"
struct ShadowUniform {
    light_view_proj: mat4x4<f32>,
};

struct BodyUniform {
    model: mat4x4<f32>,
    params0: vec4<f32>,
    specular: vec4<f32>,
    params1: vec4<f32>,
};

@group(0) @binding(0) var<uniform> shadow: ShadowUniform;
@group(1) @binding(0) var<uniform> body: BodyUniform;

@vertex
fn vs_shadow(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
) -> @builtin(position) vec4<f32> {
    return shadow.light_view_proj * body.model * vec4<f32>(position, 1.0);
}
"#;

/// One drawable body: its mesh, uniform buffer, and bind groups.
struct BodyDraw {
    params: BodyParams,
    mesh: MeshBuffer,
    uniform_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    color_dimensions: (u32, u32),
}

/// Renders the Earth, Moon, and cloud shell with the sun shadow map.
pub struct SceneRenderer {
    body_pipeline: wgpu::RenderPipeline,
    cloud_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    shared_bind_group: wgpu::BindGroup,
    shadow_pass_bind_group: wgpu::BindGroup,
    shadow_view: wgpu::TextureView,
    earth: BodyDraw,
    clouds: BodyDraw,
    moon: BodyDraw,
}

impl SceneRenderer {
    /// Build the pipelines, meshes, shadow map, and uniform buffers.
    ///
    /// `camera_buffer` is the shared [`CameraUniform`] buffer owned by the
    /// caller; `surface_sampler` the shared anisotropic sampler.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        camera_buffer: &wgpu::Buffer,
        rig: &LightRig,
        textures: &SceneTextures,
        surface_sampler: &wgpu::Sampler,
        shadow_map_size: u32,
    ) -> Self {
        use wgpu::util::DeviceExt;

        // Static uniforms: the rig and the sun's shadow matrix never change
        // after startup.
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("light-rig-uniform"),
            contents: bytemuck::cast_slice(&[rig.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let light_matrix =
            sun_shadow_matrix(rig.sun.direction, SHADOW_HALF_EXTENT, SHADOW_EYE_DISTANCE);
        let shadow_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sun-shadow-uniform"),
            contents: bytemuck::cast_slice(&[ShadowUniform::new(light_matrix)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let shadow_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sun-shadow-map"),
            size: wgpu::Extent3d {
                width: shadow_map_size.max(1),
                height: shadow_map_size.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DepthBuffer::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let shadow_view = shadow_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let shadow_compare_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow-compare-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(DepthBuffer::COMPARE_FUNCTION),
            ..Default::default()
        });

        // Group 0: camera + lights + shadow resources, shared by every body.
        let shared_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene-shared-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<CameraUniform>() as u64
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<LightRigUniform>() as u64
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<ShadowUniform>() as u64
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        // Group 1: the per-body uniform.
        let model_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene-model-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<BodyUniform>() as u64),
                },
                count: None,
            }],
        });

        // Group 2: color/normal/specular maps plus the shared sampler.
        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene-texture-bgl"),
            entries: &[
                texture_layout_entry(0),
                texture_layout_entry(1),
                texture_layout_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let shared_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene-shared-bg"),
            layout: &shared_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: shadow_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&shadow_compare_sampler),
                },
            ],
        });

        let source = format!("{ACES_WGSL}\n{BODY_SHADER_BODY}");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("body-shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("body-pipeline-layout"),
            bind_group_layouts: &[&shared_bgl, &model_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let body_pipeline = create_body_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            "body-pipeline",
            "fs_body",
            true,
            None,
        );
        // Clouds: additive blend, no depth write, drawn after the opaque
        // bodies so the surface shows through.
        let cloud_pipeline = create_body_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            "cloud-pipeline",
            "fs_clouds",
            false,
            Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            }),
        );

        // Depth-only shadow pass, reusing the body uniform for the model
        // matrix.
        let shadow_pass_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow-pass-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<ShadowUniform>() as u64),
                },
                count: None,
            }],
        });
        let shadow_pass_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow-pass-bg"),
            layout: &shadow_pass_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: shadow_buffer.as_entire_binding(),
            }],
        });

        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow-shader"),
            source: wgpu::ShaderSource::Wgsl(SHADOW_SHADER.into()),
        });
        let shadow_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("shadow-pipeline-layout"),
                bind_group_layouts: &[&shadow_pass_bgl, &model_bgl],
                immediate_size: 0,
            });
        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow-depth-pipeline"),
            layout: Some(&shadow_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_shadow"),
                buffers: &[VertexPositionNormalUv::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Front-face culling reduces acne on the casters.
                cull_mode: Some(wgpu::Face::Front),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: true,
                depth_compare: DepthBuffer::COMPARE_FUNCTION,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 1.75,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: None,
            multiview_mask: None,
            cache: None,
        });

        let allocator = BufferAllocator::new(device);
        let earth = build_body(
            device,
            &allocator,
            &model_bgl,
            &texture_bgl,
            surface_sampler,
            BodyParams::earth(),
            "earth",
            &textures.earth_color,
            &textures.earth_normal,
            &textures.earth_specular,
        );
        let clouds = build_body(
            device,
            &allocator,
            &model_bgl,
            &texture_bgl,
            surface_sampler,
            BodyParams::clouds(),
            "clouds",
            &textures.clouds,
            &textures.clouds,
            &textures.clouds,
        );
        let moon = build_body(
            device,
            &allocator,
            &model_bgl,
            &texture_bgl,
            surface_sampler,
            BodyParams::moon(),
            "moon",
            &textures.moon,
            &textures.moon,
            &textures.moon,
        );

        log::info!(
            "Scene renderer initialized: {}x{} shadow map, {} body triangles",
            shadow_map_size,
            shadow_map_size,
            earth.mesh.index_count / 3 + clouds.mesh.index_count / 3 + moon.mesh.index_count / 3,
        );

        Self {
            body_pipeline,
            cloud_pipeline,
            shadow_pipeline,
            shared_bind_group,
            shadow_pass_bind_group,
            shadow_view,
            earth,
            clouds,
            moon,
        }
    }

    /// Write the current world transforms into the per-body uniforms.
    pub fn update_transforms(&self, queue: &wgpu::Queue, assembly: &SceneAssembly) {
        for (draw, id) in [
            (&self.earth, assembly.earth),
            (&self.clouds, assembly.clouds),
            (&self.moon, assembly.moon),
        ] {
            let uniform = BodyUniform::new(
                assembly.graph.world_matrix(id),
                &draw.params,
                draw.color_dimensions,
            );
            queue.write_buffer(&draw.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
    }

    /// Render the shadow casters (Earth, Moon) into the sun's depth map.
    pub fn render_shadow_pass(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("sun-shadow-pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.shadow_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&self.shadow_pipeline);
        pass.set_bind_group(0, &self.shadow_pass_bind_group, &[]);
        for draw in [&self.earth, &self.moon] {
            pass.set_bind_group(1, &draw.model_bind_group, &[]);
            draw.mesh.bind(&mut pass);
            draw.mesh.draw(&mut pass);
        }
    }

    /// Draw the opaque bodies. Runs after the starfield in the main pass.
    pub fn render_opaque<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_pipeline(&self.body_pipeline);
        pass.set_bind_group(0, &self.shared_bind_group, &[]);
        for draw in [&self.earth, &self.moon] {
            pass.set_bind_group(1, &draw.model_bind_group, &[]);
            pass.set_bind_group(2, &draw.texture_bind_group, &[]);
            draw.mesh.bind(pass);
            draw.mesh.draw(pass);
        }
    }

    /// Draw the translucent cloud shell. Runs last in the main pass.
    pub fn render_clouds<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_pipeline(&self.cloud_pipeline);
        pass.set_bind_group(0, &self.shared_bind_group, &[]);
        pass.set_bind_group(1, &self.clouds.model_bind_group, &[]);
        pass.set_bind_group(2, &self.clouds.texture_bind_group, &[]);
        self.clouds.mesh.bind(pass);
        self.clouds.mesh.draw(pass);
    }
}

fn texture_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn create_body_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    label: &str,
    fragment_entry: &str,
    depth_write: bool,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[VertexPositionNormalUv::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: DepthBuffer::COMPARE_FUNCTION,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

#[allow(clippy::too_many_arguments)]
fn build_body(
    device: &wgpu::Device,
    allocator: &BufferAllocator,
    model_bgl: &wgpu::BindGroupLayout,
    texture_bgl: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    params: BodyParams,
    label: &str,
    color: &ManagedTexture,
    normal: &ManagedTexture,
    specular: &ManagedTexture,
) -> BodyDraw {
    use wgpu::util::DeviceExt;

    let sphere = generate_uv_sphere(params.radius, params.segments, params.rings);
    let mesh = allocator.create_mesh(
        label,
        bytemuck::cast_slice(&sphere.vertices),
        tellurion_render::IndexData::U32(&sphere.indices),
    );

    let uniform = BodyUniform::new(glam::Mat4::IDENTITY, &params, color.dimensions);
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label}-uniform")),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label}-model-bg")),
        layout: model_bgl,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label}-texture-bg")),
        layout: texture_bgl,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&color.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&normal.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(&specular.view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    BodyDraw {
        params,
        mesh,
        uniform_buffer,
        model_bind_group,
        texture_bind_group,
        color_dimensions: color.dimensions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tellurion_render::TextureManager;

    fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .ok()?;

            adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()
        })
    }

    #[test]
    fn test_body_uniform_layout() {
        assert_eq!(std::mem::size_of::<BodyUniform>(), 112);
        assert_eq!(std::mem::offset_of!(BodyUniform, model), 0);
        assert_eq!(std::mem::offset_of!(BodyUniform, params0), 64);
        assert_eq!(std::mem::offset_of!(BodyUniform, specular), 80);
        assert_eq!(std::mem::offset_of!(BodyUniform, params1), 96);
    }

    #[test]
    fn test_body_uniform_packs_material() {
        let params = BodyParams::earth();
        let uniform = BodyUniform::new(glam::Mat4::IDENTITY, &params, (2048, 1024));
        assert_eq!(uniform.params0, [25.0, 0.8, 0.85, 1.0]);
        // Earth has both maps, and texel size is the reciprocal of the
        // color map dimensions.
        assert_eq!(uniform.params1[0], 1.0);
        assert_eq!(uniform.params1[1], 1.0);
        assert!((uniform.params1[2] - 1.0 / 2048.0).abs() < 1e-9);
        assert!((uniform.params1[3] - 1.0 / 1024.0).abs() < 1e-9);
    }

    #[test]
    fn test_moon_uniform_disables_maps() {
        let uniform = BodyUniform::new(glam::Mat4::IDENTITY, &BodyParams::moon(), (1, 1));
        assert_eq!(uniform.params1[0], 0.0);
        assert_eq!(uniform.params1[1], 0.0);
        // Bump stays active via the bump scale.
        assert!(uniform.params0[1] > 0.0);
    }

    #[test]
    fn test_shaders_have_entry_points() {
        assert!(BODY_SHADER_BODY.contains("fn vs_main"));
        assert!(BODY_SHADER_BODY.contains("fn fs_body"));
        assert!(BODY_SHADER_BODY.contains("fn fs_clouds"));
        assert!(SHADOW_SHADER.contains("fn vs_shadow"));
    }

    #[test]
    fn test_body_shader_tone_maps() {
        assert!(BODY_SHADER_BODY.contains("aces_filmic("));
        assert!(ACES_WGSL.contains("fn aces_filmic"));
    }

    #[test]
    fn test_renderer_construction() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let mut manager = TextureManager::new(&device, 1);
        let neutral = manager.create_fallback(&device, &queue, "neutral", [128, 128, 128, 255]);
        let textures = SceneTextures {
            earth_color: neutral.clone(),
            earth_normal: neutral.clone(),
            earth_specular: neutral.clone(),
            clouds: neutral.clone(),
            moon: neutral,
        };
        use wgpu::util::DeviceExt;
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("test-camera"),
            contents: bytemuck::cast_slice(&[tellurion_render::Camera::default().to_uniform(0.5)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let renderer = SceneRenderer::new(
            &device,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            &camera_buffer,
            &LightRig::default(),
            &textures,
            manager.surface_sampler(),
            256,
        );

        // The uniforms update without panicking against a real assembly.
        let assembly = crate::bodies::assemble();
        renderer.update_transforms(&queue, &assembly);
    }
}
