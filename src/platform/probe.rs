//! Best-effort graphics capability probe.
//!
//! Browsers on Apple Silicon still report the platform as `MacIntel`, so the
//! only hint left is the renderer string of a graphics context. Reading it
//! needs a transient off-screen surface and a debug extension, either of
//! which may be missing.

use anyhow::Result;
use log::{debug, warn};

/// Reads the unmasked renderer identifier of a graphics context.
///
/// Implementations acquire whatever transient surface they need and must
/// release it before returning, on success and on error alike.
#[cfg_attr(test, mockall::automock)]
pub trait GraphicsProbe {
    /// Returns `Ok(None)` when no context or no debug extension is available.
    fn renderer(&self) -> Result<Option<String>>;
}

/// Probe for hosts without any graphics capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGraphicsProbe;

impl GraphicsProbe for NoGraphicsProbe {
    fn renderer(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Probe that reports a renderer string known ahead of time.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedRendererProbe {
    renderer: String,
}

impl FixedRendererProbe {
    pub fn new(renderer: impl Into<String>) -> Self {
        Self {
            renderer: renderer.into(),
        }
    }
}

impl GraphicsProbe for FixedRendererProbe {
    fn renderer(&self) -> Result<Option<String>> {
        Ok(Some(self.renderer.clone()))
    }
}

/// Whether the probe reports an Apple system-on-chip renderer.
///
/// Renderer strings such as "Apple M1" count; the generic "Apple GPU" string
/// does not. Any failure is logged and classified as not Apple Silicon.
pub fn is_apple_silicon(probe: &dyn GraphicsProbe) -> bool {
    match probe.renderer() {
        Ok(Some(renderer)) => {
            debug!("Graphics renderer: {}", renderer);
            renderer.contains("Apple") && !renderer.contains("Apple GPU")
        }
        Ok(None) => {
            debug!("Graphics renderer info unavailable");
            false
        }
        Err(e) => {
            warn!("Could not determine Mac hardware via graphics probe: {:#}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apple_soc_renderers() {
        for renderer in ["Apple M1", "Apple M3 Max", "ANGLE (Apple, Apple M2, OpenGL 4.1)"] {
            assert!(
                is_apple_silicon(&FixedRendererProbe::new(renderer)),
                "{}",
                renderer
            );
        }
    }

    #[test]
    fn test_non_apple_renderers() {
        for renderer in [
            "Apple GPU",
            "Intel Iris Pro OpenGL Engine",
            "AMD Radeon Pro 5500M",
            "",
        ] {
            assert!(
                !is_apple_silicon(&FixedRendererProbe::new(renderer)),
                "{}",
                renderer
            );
        }
    }

    #[test]
    fn test_unavailable_probe_is_not_apple_silicon() {
        assert!(!is_apple_silicon(&NoGraphicsProbe));
    }

    #[test_log::test]
    fn test_failing_probe_is_swallowed() {
        let mut probe = MockGraphicsProbe::new();
        probe
            .expect_renderer()
            .times(1)
            .returning(|| Err(anyhow::anyhow!("WEBGL_debug_renderer_info threw")));

        assert!(!is_apple_silicon(&probe));
    }
}
