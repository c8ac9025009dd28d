use crate::config::AppConfig;
use crate::ui::theme_lab::LayoutStore;

pub const PANEL_WIDTH_RANGE: std::ops::RangeInclusive<f32> = 280.0..=560.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState {
    pub theme_lab_open: bool,
    pub panel_width: f32,
    pub dark_mode: bool,
}

impl LayoutState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            theme_lab_open: true,
            panel_width: config
                .panel_width
                .clamp(*PANEL_WIDTH_RANGE.start(), *PANEL_WIDTH_RANGE.end()),
            dark_mode: config.dark_mode,
        }
    }
}

impl LayoutStore for LayoutState {
    fn set_theme_lab_open(&mut self, open: bool) {
        self.theme_lab_open = open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_open_with_configured_width() {
        let layout = LayoutState::from_config(&AppConfig::default());
        assert!(layout.theme_lab_open);
        assert_eq!(layout.panel_width, 350.0);
    }

    #[test]
    fn clamps_out_of_range_widths() {
        let config = AppConfig {
            panel_width: 5000.0,
            ..AppConfig::default()
        };
        assert_eq!(LayoutState::from_config(&config).panel_width, 560.0);
    }
}
