/// A single acquired frame.
///
/// Short-lived: holding the surface texture blocks acquisition of the next one.
/// `Gpu::submit` consumes it and presents the frame.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
