use crate::adapter::BackendKind;
use crate::geo::Viewport;
use crate::mode::Mode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Drawing options. A snapshot is captured when a gesture begins and stays
/// fixed for that gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrawOptions {
    pub mode: Mode,
    /// Polyline smoothing passed to the renderer for the live trace.
    pub smooth_factor: f64,
    /// Distance in pixels used by edge-handle editing downstream.
    pub elbow_distance: f64,
    /// Minimum vertex spacing in pixels kept by the clean pass.
    pub simplify_factor: f64,
    pub merge_polygons: bool,
    pub concave_polygon: bool,
    /// `None` means unlimited.
    pub maximum_polygons: Option<usize>,
    pub notify_after_edit_exit: bool,
    pub leave_mode_after_create: bool,
    pub stroke_width: f64,
    pub fill_color: String,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            mode: Mode::ALL,
            smooth_factor: 0.3,
            elbow_distance: 10.0,
            simplify_factor: 1.1,
            merge_polygons: true,
            concave_polygon: true,
            maximum_polygons: None,
            notify_after_edit_exit: false,
            leave_mode_after_create: false,
            stroke_width: 2.0,
            fill_color: "#3388ff".to_string(),
        }
    }
}

/// Configuration file for the replay tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub options: DrawOptions,
    pub backend: BackendKind,
    pub viewport: Viewport,
    /// When enabled the logger is initialised at debug level.
    pub debug_logging: bool,
    /// Optional file receiving log output in addition to stderr.
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_json::from_str(&content)?;
        settings.warn_on_suspicious_values();
        Ok(settings)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn warn_on_suspicious_values(&self) {
        if self.options.simplify_factor < 0.0 {
            tracing::warn!(
                simplify_factor = self.options.simplify_factor,
                "negative simplifyFactor behaves like 0"
            );
        }
        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            tracing::warn!(
                width = self.viewport.width,
                height = self.viewport.height,
                "viewport has no visible area"
            );
        }
        if (self.options.mode & Mode::ALL) != self.options.mode {
            tracing::warn!(
                bits = self.options.mode.bits(),
                "mode contains unknown flag bits"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_options_fall_back_to_defaults() {
        let options: DrawOptions =
            serde_json::from_str(r#"{ "simplifyFactor": 4.0, "mode": 1 }"#).unwrap();
        assert_eq!(options.simplify_factor, 4.0);
        assert_eq!(options.mode, Mode::CREATE);
        assert_eq!(options.elbow_distance, 10.0);
        assert!(options.merge_polygons);
        assert_eq!(options.maximum_polygons, None);
    }

    #[test]
    fn backend_kind_uses_snake_case() {
        let settings: Settings = serde_json::from_str(r#"{ "backend": "vector" }"#).unwrap();
        assert_eq!(settings.backend, BackendKind::Vector);
        assert_eq!(settings.viewport, Viewport::default());
    }
}
