//! Surface size tracking with a clamped render scale.
//!
//! Normalizes platform resize behavior (Wayland zero-size windows, Retina and
//! Windows DPI scaling) and derives the drawing-buffer size from the logical
//! window size times a render scale clamped to an upper bound, so very dense
//! displays do not quadruple the pixel load.

/// Minimum buffer dimension (prevents zero-size surfaces).
pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// Physical pixel dimensions of the drawing buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    /// Width in physical pixels.
    pub width: u32,
    /// Height in physical pixels.
    pub height: u32,
}

/// Event produced when the surface dimensions or scale factor change.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceResizeEvent {
    /// New drawing-buffer dimensions (logical size x clamped render scale).
    pub buffer: PhysicalSize,
    /// New logical width.
    pub logical_width: f64,
    /// New logical height.
    pub logical_height: f64,
    /// Display scale factor as reported by the window system.
    pub scale_factor: f64,
    /// Scale actually applied to the buffer: `min(scale_factor, max)`.
    pub render_scale: f64,
}

/// Tracks window dimensions and derives the clamped drawing-buffer size.
///
/// Resize handling is idempotent: re-reporting the current size produces no
/// event and no surface reconfiguration.
pub struct SurfaceWrapper {
    /// Logical window width.
    logical_width: f64,
    /// Logical window height.
    logical_height: f64,
    /// Display scale factor (physical pixels per logical pixel).
    scale_factor: f64,
    /// Upper bound for the render scale.
    max_render_scale: f64,
    /// Current drawing-buffer width (clamped to >= 1).
    buffer_width: u32,
    /// Current drawing-buffer height (clamped to >= 1).
    buffer_height: u32,
}

impl SurfaceWrapper {
    /// Creates a new `SurfaceWrapper` from the window's physical dimensions
    /// and scale factor. `max_render_scale` caps the scale applied to the
    /// drawing buffer.
    pub fn new(
        physical_width: u32,
        physical_height: u32,
        scale_factor: f64,
        max_render_scale: f64,
    ) -> Self {
        let mut wrapper = Self {
            logical_width: 0.0,
            logical_height: 0.0,
            scale_factor,
            max_render_scale,
            buffer_width: MIN_SURFACE_DIMENSION,
            buffer_height: MIN_SURFACE_DIMENSION,
        };
        wrapper.recompute(physical_width, physical_height);
        wrapper
    }

    /// Handle a window resize event with new physical dimensions. Returns a
    /// resize event if the buffer dimensions actually changed.
    pub fn handle_resize(
        &mut self,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        let (old_w, old_h) = (self.buffer_width, self.buffer_height);
        self.recompute(physical_width, physical_height);

        if self.buffer_width == old_w && self.buffer_height == old_h {
            return None;
        }

        Some(self.resize_event())
    }

    /// Handle a scale factor change event. Returns a resize event because the
    /// buffer dimensions change even when the logical size stays the same.
    pub fn handle_scale_factor_changed(
        &mut self,
        new_scale_factor: f64,
        new_physical_width: u32,
        new_physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        self.scale_factor = new_scale_factor;
        self.handle_resize(new_physical_width, new_physical_height)
    }

    fn recompute(&mut self, physical_width: u32, physical_height: u32) {
        self.logical_width = physical_width as f64 / self.scale_factor;
        self.logical_height = physical_height as f64 / self.scale_factor;
        let scale = self.render_scale();
        self.buffer_width =
            ((self.logical_width * scale).round() as u32).max(MIN_SURFACE_DIMENSION);
        self.buffer_height =
            ((self.logical_height * scale).round() as u32).max(MIN_SURFACE_DIMENSION);
    }

    fn resize_event(&self) -> SurfaceResizeEvent {
        SurfaceResizeEvent {
            buffer: self.buffer_size(),
            logical_width: self.logical_width,
            logical_height: self.logical_height,
            scale_factor: self.scale_factor,
            render_scale: self.render_scale(),
        }
    }

    /// The scale applied to the drawing buffer: `min(scale_factor, max)`.
    pub fn render_scale(&self) -> f64 {
        self.scale_factor.min(self.max_render_scale)
    }

    /// Current drawing-buffer dimensions for surface configuration.
    pub fn buffer_size(&self) -> PhysicalSize {
        PhysicalSize {
            width: self.buffer_width,
            height: self.buffer_height,
        }
    }

    /// Current drawing-buffer width in pixels.
    pub fn buffer_width(&self) -> u32 {
        self.buffer_width
    }

    /// Current drawing-buffer height in pixels.
    pub fn buffer_height(&self) -> u32 {
        self.buffer_height
    }

    /// Current logical width.
    pub fn logical_width(&self) -> f64 {
        self.logical_width
    }

    /// Current logical height.
    pub fn logical_height(&self) -> f64 {
        self.logical_height
    }

    /// Display scale factor as reported by the window system.
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Aspect ratio of the logical window (width / height).
    pub fn aspect_ratio(&self) -> f32 {
        if self.logical_height <= 0.0 {
            return 1.0;
        }
        (self.logical_width / self.logical_height) as f32
    }
}
