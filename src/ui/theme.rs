use eframe::egui::{self, Color32, FontFamily, FontId, TextStyle, Visuals};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Application-wide theme descriptor. Consumers only read it.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeContext {
    theme: Value,
}

impl ThemeContext {
    pub fn new(theme: Value) -> Result<Self, ThemeError> {
        if !theme.is_object() {
            return Err(ThemeError::NotAnObject);
        }
        Ok(Self { theme })
    }

    pub fn from_path(path: &Path) -> Result<Self, ThemeError> {
        let payload = fs::read_to_string(path).map_err(|source| ThemeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let theme = serde_json::from_str(&payload)?;
        debug!(path = %path.display(), "loaded theme descriptor");
        Self::new(theme)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    pub fn theme(&self) -> &Value {
        &self.theme
    }

    /// Looks up a dotted path such as `palette.primary.main`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.theme, |value, segment| value.get(segment))
    }

    pub fn color(&self, path: &str) -> Option<Color32> {
        self.lookup(path)
            .and_then(Value::as_str)
            .and_then(parse_hex_color)
    }

    fn number(&self, path: &str) -> Option<f32> {
        self.lookup(path).and_then(Value::as_f64).map(|n| n as f32)
    }
}

impl Default for ThemeContext {
    fn default() -> Self {
        Self {
            theme: default_theme(),
        }
    }
}

fn default_theme() -> Value {
    json!({
        "mode": "light",
        "palette": {
            "primary": { "main": "#1D74F5", "contrastText": "#FFFFFF" },
            "secondary": { "main": "#EEEFF1", "contrastText": "#2F343D" },
            "background": { "default": "#FFFFFF", "paper": "#F7F8FA" },
            "text": { "primary": "#2F343D", "secondary": "#6C727A" },
            "error": { "main": "#EC0D2A" },
            "success": { "main": "#2DE0A5" }
        },
        "typography": {
            "fontFamily": "\"Inter\", -apple-system, \"Segoe UI\", sans-serif",
            "fontSize": 16
        },
        "spacing": { "unit": 12 },
        "shape": { "borderRadius": 4 },
        "messages": {
            "emptyState": "No messages yet.\nSay hello!"
        }
    })
}

pub fn parse_hex_color(value: &str) -> Option<Color32> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

pub fn apply_theme(ctx: &egui::Context, theme: &ThemeContext, dark_mode: bool) {
    let accent = theme.color("palette.primary.main").unwrap_or(if dark_mode {
        Color32::from_rgb(96, 170, 255)
    } else {
        Color32::from_rgb(45, 110, 230)
    });

    let mut visuals = if dark_mode {
        Visuals::dark()
    } else {
        Visuals::light()
    };
    visuals.hyperlink_color = accent;
    visuals.selection.bg_fill = accent.linear_multiply(if dark_mode { 0.65 } else { 0.8 });
    visuals.selection.stroke.color = accent;
    if !dark_mode {
        if let Some(background) = theme.color("palette.background.default") {
            visuals.panel_fill = background;
        }
        if let Some(paper) = theme.color("palette.background.paper") {
            visuals.window_fill = paper;
        }
    }
    ctx.set_visuals(visuals);

    let base = theme.number("typography.fontSize").unwrap_or(16.0);
    let unit = theme.number("spacing.unit").unwrap_or(12.0);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(unit, unit * 2.0 / 3.0);
    style.spacing.button_padding = egui::vec2(unit, unit * 2.0 / 3.0);
    style.spacing.tooltip_width = 360.0;
    style.interaction.tooltip_delay = 0.15;

    style.text_styles.insert(
        TextStyle::Heading,
        FontId::new(base * 1.5, FontFamily::Proportional),
    );
    style
        .text_styles
        .insert(TextStyle::Body, FontId::new(base, FontFamily::Proportional));
    style.text_styles.insert(
        TextStyle::Monospace,
        FontId::new(base - 2.0, FontFamily::Monospace),
    );
    style
        .text_styles
        .insert(TextStyle::Button, FontId::new(base, FontFamily::Proportional));
    style.text_styles.insert(
        TextStyle::Small,
        FontId::new(base * 0.8, FontFamily::Proportional),
    );

    ctx.set_style(style);
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("failed to read theme {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid theme JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("theme descriptor must be a JSON object")]
    NotAnObject,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rejects_non_object_themes() {
        assert!(matches!(
            ThemeContext::new(json!(["not", "a", "map"])),
            Err(ThemeError::NotAnObject)
        ));
    }

    #[test]
    fn lookup_walks_nested_keys() {
        let theme = ThemeContext::default();
        assert_eq!(
            theme.lookup("palette.primary.main").and_then(Value::as_str),
            Some("#1D74F5")
        );
        assert!(theme.lookup("palette.missing.main").is_none());
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#1D74F5"), Some(Color32::from_rgb(0x1D, 0x74, 0xF5)));
        assert_eq!(parse_hex_color("1D74F5"), None);
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
    }

    #[test]
    fn loads_theme_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r##"{{"palette": {{"primary": {{"main": "#000000"}}}}}}"##).unwrap();

        let theme = ThemeContext::from_path(file.path()).unwrap();
        assert_eq!(theme.color("palette.primary.main"), Some(Color32::BLACK));
    }

    #[test]
    fn load_without_path_uses_builtin_theme() {
        assert_eq!(ThemeContext::load(None).unwrap(), ThemeContext::default());
    }

    #[test]
    fn reports_missing_theme_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            ThemeContext::from_path(&missing),
            Err(ThemeError::Io { .. })
        ));
    }
}
