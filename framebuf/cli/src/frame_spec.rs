use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use framebuf_types::{Layout, PixelFormat};
use serde::{Deserialize, Serialize};

/// Geometry of a raw frame dump, stored next to it as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSpec {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Signed row pitch; tightly packed bottom-up rows when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<i32>,
}

impl FrameSpec {
    /// Create a spec describing `layout` at the given size.
    pub fn from_layout(width: u32, height: u32, layout: Layout) -> Self {
        Self {
            width,
            height,
            format: layout.format,
            pitch: Some(layout.pitch),
        }
    }

    /// The layout described by this spec, filling in the default pitch.
    pub fn layout(&self) -> Layout {
        match self.pitch {
            Some(pitch) => Layout::new(self.format, pitch),
            None => Layout::packed(self.format, self.width),
        }
    }

    /// Load a frame spec from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read frame spec {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("invalid frame spec {}", path.display()))
    }

    /// Save this frame spec as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)
            .with_context(|| format!("failed to write frame spec {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pitch_is_packed() {
        let spec: FrameSpec =
            serde_json::from_str(r#"{ "width": 4, "height": 2, "format": "bgra" }"#).unwrap();
        assert_eq!(spec.format, PixelFormat::BGRA);
        assert_eq!(spec.layout(), Layout::new(PixelFormat::BGRA, 16));
    }

    #[test]
    fn rejects_wide_format() {
        let result = serde_json::from_str::<FrameSpec>(
            r#"{ "width": 4, "height": 2, "format": "RGBAX" }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("frame.json");

        let spec = FrameSpec::from_layout(3, 2, Layout::new(PixelFormat::RGB, -12));
        spec.save(&path).unwrap();

        assert_eq!(FrameSpec::load(&path).unwrap(), spec);
    }

    #[test]
    fn load_missing_file_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = FrameSpec::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read frame spec"));
    }
}
