//! wgpu rendering primitives: device/surface management, camera, depth buffer,
//! sphere meshes, texture management, and render pass helpers.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod sphere;
pub mod surface;
pub mod texture;
pub mod tonemap;

pub use buffer::{
    BufferAllocator, IndexData, MeshBuffer, VertexPositionColor, VertexPositionNormalUv,
};
pub use camera::{Camera, CameraUniform};
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{FrameEncoder, RenderPassBuilder, SPACE_BLACK};
pub use sphere::{SphereMesh, generate_uv_sphere};
pub use surface::{PhysicalSize, SurfaceResizeEvent, SurfaceWrapper};
pub use texture::{ManagedTexture, TextureError, TextureManager};
pub use tonemap::{ACES_WGSL, aces_filmic, aces_filmic_rgb};
