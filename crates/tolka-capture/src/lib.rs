use image::{DynamicImage, RgbImage};
use tolka_types::Region;
use xcap::Monitor;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no monitor available")]
    NoMonitor,

    #[error("capture backend error: {0}")]
    Backend(#[from] xcap::XCapError),
}

/// Display identity shown in the settings UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    pub id: u32,
    pub name: String,
}

/// Something that can produce a cropped screenshot of a region.
///
/// The runtime only talks to this trait so tests can run without a display.
pub trait ScreenSource: Send + Sync {
    fn capture(&self, region: &Region) -> Result<RgbImage, CaptureError>;
}

/// Opens a `ScreenSource` for a monitor id.
///
/// The runtime re-opens its source on every start, so a monitor change in
/// the config takes effect on the next overlay refresh.
pub trait ScreenFactory: Send + Sync {
    fn open(&self, monitor: u32) -> Result<std::sync::Arc<dyn ScreenSource>, CaptureError>;
}

/// Factory over the real xcap backend.
pub struct XcapScreens;

impl ScreenFactory for XcapScreens {
    fn open(&self, monitor: u32) -> Result<std::sync::Arc<dyn ScreenSource>, CaptureError> {
        Ok(std::sync::Arc::new(MonitorHandle::open(monitor)?))
    }
}

/// A selected physical monitor.
pub struct MonitorHandle {
    monitor: Monitor,
}

impl MonitorHandle {
    /// Enumerate attached monitors.
    pub fn all() -> Result<Vec<MonitorInfo>, CaptureError> {
        let monitors = Monitor::all()?;
        Ok(monitors
            .into_iter()
            .map(|m| MonitorInfo {
                id: m.id(),
                name: m.name().to_string(),
            })
            .collect())
    }

    /// Open the monitor with the given id, falling back to the first one
    /// when the id is stale (monitors get unplugged between sessions).
    pub fn open(id: u32) -> Result<Self, CaptureError> {
        let monitors = Monitor::all()?;
        let monitor = monitors
            .iter()
            .find(|m| m.id() == id)
            .or_else(|| {
                tracing::warn!(id, "monitor not found, falling back to first");
                monitors.first()
            })
            .cloned()
            .ok_or(CaptureError::NoMonitor)?;

        Ok(Self { monitor })
    }
}

impl ScreenSource for MonitorHandle {
    /// Capture the whole monitor and crop to `region`, converting the
    /// logical-pixel region to physical pixels via the scale factor.
    fn capture(&self, region: &Region) -> Result<RgbImage, CaptureError> {
        let capture = self.monitor.capture_image()?;
        let sf = self.monitor.scale_factor();

        Ok(DynamicImage::ImageRgba8(capture)
            .crop_imm(
                (region.x as f32 * sf) as u32,
                (region.y as f32 * sf) as u32,
                (region.w as f32 * sf) as u32,
                (region.h as f32 * sf) as u32,
            )
            .to_rgb8())
    }
}
