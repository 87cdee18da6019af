use serde::{Deserialize, Serialize};

/// Capture rectangle in monitor-relative logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Region {
    /// A region must cover at least one pixel to be usable.
    pub fn is_valid(&self) -> bool {
        self.w > 0 && self.h > 0
    }
}

/// Anchor of the translated text inside the overlay, vertical then
/// horizontal. The wire form is the two-letter token ("C:C" etc.) that the
/// config file and the overlay consumer agree on; anything else is rejected
/// at deserialization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[serde(rename = "T:L")]
    TopLeft,
    #[serde(rename = "T:C")]
    TopCenter,
    #[serde(rename = "T:R")]
    TopRight,
    #[serde(rename = "C:L")]
    CenterLeft,
    #[default]
    #[serde(rename = "C:C")]
    Center,
    #[serde(rename = "C:R")]
    CenterRight,
    #[serde(rename = "B:L")]
    BottomLeft,
    #[serde(rename = "B:C")]
    BottomCenter,
    #[serde(rename = "B:R")]
    BottomRight,
}

impl TextAlign {
    pub const ALL: [TextAlign; 9] = [
        TextAlign::TopLeft,
        TextAlign::TopCenter,
        TextAlign::TopRight,
        TextAlign::CenterLeft,
        TextAlign::Center,
        TextAlign::CenterRight,
        TextAlign::BottomLeft,
        TextAlign::BottomCenter,
        TextAlign::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::TopLeft => "T:L",
            TextAlign::TopCenter => "T:C",
            TextAlign::TopRight => "T:R",
            TextAlign::CenterLeft => "C:L",
            TextAlign::Center => "C:C",
            TextAlign::CenterRight => "C:R",
            TextAlign::BottomLeft => "B:L",
            TextAlign::BottomCenter => "B:C",
            TextAlign::BottomRight => "B:R",
        }
    }
}

/// Snapshot of one file transfer, emitted repeatedly by the downloader.
///
/// Immutable once emitted; `total_size` is 0 until the response headers
/// reveal the real length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub file: String,
    pub progress: u64,
    pub total_size: u64,
}

impl DownloadProgress {
    pub fn is_complete(&self) -> bool {
        self.total_size > 0 && self.progress >= self.total_size
    }

    /// Completion ratio in [0, 1], None while the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        (self.total_size > 0).then(|| self.progress as f64 / self.total_size as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_rejects_degenerate_rectangles() {
        let flat = Region { x: 10, y: 10, w: 100, h: 0 };
        let thin = Region { x: 0, y: 0, w: 0, h: 50 };
        let ok = Region { x: 0, y: 0, w: 1, h: 1 };
        assert!(!flat.is_valid());
        assert!(!thin.is_valid());
        assert!(ok.is_valid());
    }

    #[test]
    fn text_align_accepts_exactly_nine_tokens() {
        for align in TextAlign::ALL {
            let json = format!("\"{}\"", align.as_str());
            let parsed: TextAlign = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, align);
        }

        for bad in ["", "M:L", "T:X", "center", "C-C", "c:c", "T:L "] {
            let json = format!("\"{bad}\"");
            assert!(
                serde_json::from_str::<TextAlign>(&json).is_err(),
                "token {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn text_align_default_is_centered() {
        assert_eq!(TextAlign::default().as_str(), "C:C");
    }

    #[test]
    fn progress_completion() {
        let unknown = DownloadProgress {
            file: "model.bin".into(),
            progress: 42,
            total_size: 0,
        };
        assert!(!unknown.is_complete());
        assert_eq!(unknown.fraction(), None);

        let done = DownloadProgress {
            file: "model.bin".into(),
            progress: 1000,
            total_size: 1000,
        };
        assert!(done.is_complete());
        assert_eq!(done.fraction(), Some(1.0));
    }

    #[test]
    fn progress_wire_field_names() {
        let snapshot = DownloadProgress {
            file: "model.bin".into(),
            progress: 500,
            total_size: 1000,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["file"], "model.bin");
        assert_eq!(json["progress"], 500);
        assert_eq!(json["total_size"], 1000);
    }
}
