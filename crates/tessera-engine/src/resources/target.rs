use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::RenderError;

/// Off-screen target description.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TargetConfig {
    pub width: u32,
    pub height: u32,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            color_format: wgpu::TextureFormat::Rgba8Unorm,
            depth_format: wgpu::TextureFormat::Depth24Plus,
        }
    }
}

impl TargetConfig {
    /// Sizes the target as a fraction of the window, never below 1x1.
    ///
    /// A small target makes the individual texels visible once composited.
    pub fn from_window(width: u32, height: u32, divisor: u32) -> Self {
        let divisor = divisor.max(1);
        Self {
            width: (width / divisor).max(1),
            height: (height / divisor).max(1),
            ..Default::default()
        }
    }

    /// Completeness check performed before anything is allocated.
    pub fn status(&self, limits: &wgpu::Limits) -> TargetStatus {
        if self.width == 0 || self.height == 0 {
            return TargetStatus::IncompleteDimensions;
        }
        let max = limits.max_texture_dimension_2d;
        if self.width > max || self.height > max {
            return TargetStatus::Unsupported;
        }
        if self.color_format.is_depth_stencil_format() || !self.depth_format.has_depth_aspect() {
            return TargetStatus::IncompleteAttachment;
        }
        TargetStatus::Complete
    }

    fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

/// Result of a completeness check.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TargetStatus {
    Complete,
    /// Zero-sized, or attachments whose dimensions differ.
    IncompleteDimensions,
    /// An attachment format cannot serve its attachment point.
    IncompleteAttachment,
    /// Dimensions exceed what the device supports.
    Unsupported,
}

impl TargetStatus {
    /// Checks that the allocated attachments agree on their size.
    pub fn of_attachments(color: wgpu::Extent3d, depth: wgpu::Extent3d) -> Self {
        let zero = color.width == 0 || color.height == 0;
        if zero || color.width != depth.width || color.height != depth.height {
            TargetStatus::IncompleteDimensions
        } else {
            TargetStatus::Complete
        }
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetStatus::Complete => "complete",
            TargetStatus::IncompleteDimensions => "attachment dimensions are zero or mismatched",
            TargetStatus::IncompleteAttachment => "attachment format not usable at its attachment point",
            TargetStatus::Unsupported => "dimensions exceed device limits",
        };
        f.write_str(s)
    }
}

/// Process-unique target identity, used by borrowers to cache bind groups.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TargetId(u64);

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// Off-screen color + depth destination.
///
/// Created once by [`initialize`]; lives until the process exits.
pub struct RenderTarget {
    id: TargetId,
    config: TargetConfig,

    // Textures are kept alive alongside their views.
    _color: wgpu::Texture,
    color_view: wgpu::TextureView,
    _depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl RenderTarget {
    pub fn id(&self) -> TargetId {
        self.id
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.color_format
    }

    pub fn depth_format(&self) -> wgpu::TextureFormat {
        self.config.depth_format
    }

    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color_view
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Nearest-filtering, edge-clamped sampler for reading the color attachment.
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

/// Allocates and validates the off-screen target.
///
/// Any failure here is an allocation-class error: the caller must not enter
/// the frame loop.
pub fn initialize(device: &wgpu::Device, config: &TargetConfig) -> Result<RenderTarget, RenderError> {
    if config.width == 0 || config.height == 0 {
        return Err(RenderError::ZeroSizedTarget {
            width: config.width,
            height: config.height,
        });
    }

    let status = config.status(&device.limits());
    if status != TargetStatus::Complete {
        log::error!("off-screen target {}x{} rejected: {status}", config.width, config.height);
        return Err(RenderError::TargetIncomplete(status));
    }

    let color = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("tessera offscreen color"),
        size: config.extent(),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: config.color_format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });

    let depth = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("tessera offscreen depth"),
        size: config.extent(),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: config.depth_format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });

    let status = TargetStatus::of_attachments(color.size(), depth.size());
    if status != TargetStatus::Complete {
        log::error!("off-screen target attachments disagree: {status}");
        return Err(RenderError::TargetIncomplete(status));
    }

    let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
    let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("tessera offscreen sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    let id = TargetId(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed));
    log::info!(
        "off-screen target {:?} ready: {}x{} {:?} + {:?}",
        id,
        config.width,
        config.height,
        config.color_format,
        config.depth_format
    );

    Ok(RenderTarget {
        id,
        config: *config,
        _color: color,
        color_view,
        _depth: depth,
        depth_view,
        sampler,
    })
}
