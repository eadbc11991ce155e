/// Response to a surface acquisition error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering resumes next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Unrecoverable (out of memory).
    Fatal,
}

impl SurfaceErrorAction {
    /// Classification without side effects. Reconfiguration itself is done by
    /// [`super::Gpu::handle_surface_error`].
    pub fn classify(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
            wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
        }
    }
}

/// Validation and out-of-memory scopes around one frame's GPU work.
///
/// Scopes are thread-local and must be popped innermost first. Fields drop
/// in declaration order, so an unclosed scope still unwinds correctly.
pub struct FrameErrorScope {
    validation: wgpu::ErrorScopeGuard,
    oom: wgpu::ErrorScopeGuard,
}

impl FrameErrorScope {
    pub fn open(device: &wgpu::Device) -> Self {
        let oom = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);
        Self { validation, oom }
    }

    /// Pops both scopes. Out-of-memory wins when both caught something.
    pub fn close(self) -> Option<wgpu::Error> {
        let Self { validation, oom } = self;
        let validation = pollster::block_on(validation.pop());
        let oom = pollster::block_on(oom.pop());
        match (validation, oom) {
            (Some(v), Some(o)) => {
                log::error!("validation error shadowed by out-of-memory: {v}");
                Some(o)
            }
            (v, o) => o.or(v),
        }
    }
}

/// Reports GPU errors raised outside any frame scope instead of panicking.
pub(crate) fn log_uncaptured(err: wgpu::Error) {
    match err {
        wgpu::Error::OutOfMemory { .. } => log::error!("uncaptured gpu error: out of memory"),
        wgpu::Error::Validation { description, .. } => {
            log::error!("uncaptured gpu validation error: {description}")
        }
        wgpu::Error::Internal { description, .. } => {
            log::error!("uncaptured gpu internal error: {description}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_errors_map_to_actions() {
        use wgpu::SurfaceError as E;
        assert_eq!(SurfaceErrorAction::classify(&E::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(SurfaceErrorAction::classify(&E::Outdated), SurfaceErrorAction::Reconfigured);
        assert_eq!(SurfaceErrorAction::classify(&E::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(SurfaceErrorAction::classify(&E::Other), SurfaceErrorAction::SkipFrame);
        assert_eq!(SurfaceErrorAction::classify(&E::OutOfMemory), SurfaceErrorAction::Fatal);
    }

    #[test]
    fn uncaptured_errors_are_logged_not_raised() {
        log_uncaptured(wgpu::Error::Validation {
            source: Box::new(std::fmt::Error),
            description: "buffer destroyed".into(),
        });
        log_uncaptured(wgpu::Error::OutOfMemory {
            source: Box::new(std::fmt::Error),
        });
    }
}
