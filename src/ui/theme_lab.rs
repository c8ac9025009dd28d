//! View state of the Theme Lab sidebar, independent of any renderer.
//!
//! The sidebar has two tabs and an overlay showing the generated theme
//! descriptor. Rendering code reads [`ThemeLabState`] and reports user input
//! back as [`ThemeLabAction`]s.

use crate::services::clipboard::Clipboard;
use crate::services::notify::{Notification, NotificationDispatcher};
use crate::ui::theme::ThemeContext;
use serde_json::Value;
use tracing::{debug, info, warn};

pub const COPY_SUCCESS_MESSAGE: &str = "Theme copied to clipboard.";
pub const COPY_FAILURE_MESSAGE: &str = "Copy to clipboard failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeLabTab {
    #[default]
    Theme,
    Layout,
}

impl ThemeLabTab {
    pub const ALL: [ThemeLabTab; 2] = [ThemeLabTab::Theme, ThemeLabTab::Layout];

    pub fn label(self) -> &'static str {
        match self {
            ThemeLabTab::Theme => "Theme",
            ThemeLabTab::Layout => "Layout",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeLabAction {
    SelectTab(ThemeLabTab),
    GenerateTheme,
    CopyTheme,
    CloseModal,
    ClosePanel,
}

/// Owner of the sidebar's visibility flag.
pub trait LayoutStore {
    fn set_theme_lab_open(&mut self, open: bool);
}

#[derive(Debug, Clone, Default)]
pub struct ThemeLabState {
    active_tab: ThemeLabTab,
    modal_open: bool,
    generated_theme: Option<String>,
}

impl ThemeLabState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tab(&self) -> ThemeLabTab {
        self.active_tab
    }

    pub fn is_active(&self, tab: ThemeLabTab) -> bool {
        self.active_tab == tab
    }

    pub fn select_tab(&mut self, tab: ThemeLabTab) {
        debug!(tab = tab.label(), "theme lab tab selected");
        self.active_tab = tab;
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    /// Last generated descriptor; kept after the overlay closes.
    pub fn generated_theme(&self) -> Option<&str> {
        self.generated_theme.as_deref()
    }

    pub fn generate_theme(&mut self, theme: &ThemeContext) -> &str {
        self.modal_open = true;
        info!("theme descriptor generated");
        self.generated_theme
            .insert(render_theme_text(theme.theme()))
            .as_str()
    }

    pub fn close_modal(&mut self) {
        self.modal_open = false;
    }

    pub fn close_panel(&self, layout: &mut dyn LayoutStore) {
        layout.set_theme_lab_open(false);
    }

    pub async fn copy_generated_theme(
        &self,
        clipboard: &dyn Clipboard,
        notifier: &dyn NotificationDispatcher,
    ) {
        copy_theme_text(self.generated_theme(), clipboard, notifier).await;
    }
}

/// Pretty-prints the theme for display.
///
/// Whole-number floats print without a fraction (`1.0` as `1`). Escaped
/// newlines become real line breaks and escaped double quotes become single
/// quotes, so the result is readable but no longer valid JSON.
pub fn render_theme_text(theme: &Value) -> String {
    let theme = whole_numbers_as_integers(theme);
    format!("{theme:#}")
        .replace("\\n", "\n")
        .replace("\\\"", "'")
}

const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn whole_numbers_as_integers(value: &Value) -> Value {
    match value {
        Value::Number(number) => match number.as_f64() {
            Some(float)
                if number.is_f64() && float.fract() == 0.0 && float.abs() < MAX_EXACT_INTEGER =>
            {
                Value::from(float as i64)
            }
            _ => value.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(whole_numbers_as_integers).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, child)| (key.clone(), whole_numbers_as_integers(child)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Writes `text` to the clipboard and reports the outcome to `notifier`.
/// Does nothing when there is no text.
pub async fn copy_theme_text(
    text: Option<&str>,
    clipboard: &dyn Clipboard,
    notifier: &dyn NotificationDispatcher,
) {
    let Some(text) = text else {
        debug!("no generated theme to copy");
        return;
    };

    match clipboard.write_text(text).await {
        Ok(()) => notifier.dispatch(Notification::success(COPY_SUCCESS_MESSAGE)),
        Err(err) => {
            warn!(error = %err, "clipboard write failed");
            notifier.dispatch(Notification::error(COPY_FAILURE_MESSAGE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clipboard::ClipboardError;
    use crate::services::notify::NotificationKind;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeClipboard {
        reject: bool,
        writes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Clipboard for FakeClipboard {
        async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            self.writes.lock().unwrap().push(text.to_owned());
            if self.reject {
                return Err(ClipboardError::Unavailable(arboard::Error::ClipboardOccupied));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<Notification>>,
    }

    impl NotificationDispatcher for RecordingNotifier {
        fn dispatch(&self, notification: Notification) {
            self.sent.lock().unwrap().push(notification);
        }
    }

    #[derive(Default)]
    struct Layout {
        open: bool,
    }

    impl LayoutStore for Layout {
        fn set_theme_lab_open(&mut self, open: bool) {
            self.open = open;
        }
    }

    fn sample_theme() -> ThemeContext {
        ThemeContext::new(json!({"a": "b\nc", "d": "e\"f\"g"})).unwrap()
    }

    #[test]
    fn theme_tab_is_active_by_default() {
        let state = ThemeLabState::new();
        assert_eq!(state.active_tab(), ThemeLabTab::Theme);
        assert!(!state.is_modal_open());
        assert!(state.generated_theme().is_none());
    }

    #[test]
    fn exactly_one_tab_is_active_after_each_selection() {
        let mut state = ThemeLabState::new();
        for tab in [ThemeLabTab::Layout, ThemeLabTab::Theme, ThemeLabTab::Layout] {
            state.select_tab(tab);
            let active: Vec<_> = ThemeLabTab::ALL
                .into_iter()
                .filter(|candidate| state.is_active(*candidate))
                .collect();
            assert_eq!(active, vec![tab]);
        }
    }

    #[test]
    fn generated_text_unescapes_newlines_and_quotes() {
        let mut state = ThemeLabState::new();
        let text = state.generate_theme(&sample_theme()).to_owned();

        assert_eq!(text, "{\n  \"a\": \"b\nc\",\n  \"d\": \"e'f'g\"\n}");
        assert!(!text.contains("\\\""));
        assert!(state.is_modal_open());
        assert_eq!(state.generated_theme(), Some(text.as_str()));
    }

    #[test]
    fn render_uses_two_space_indentation() {
        let text = render_theme_text(&json!({"outer": {"inner": 1}}));
        assert_eq!(text, "{\n  \"outer\": {\n    \"inner\": 1\n  }\n}");
    }

    #[test]
    fn whole_number_floats_print_as_integers() {
        let text = render_theme_text(&json!({
            "lineHeight": 1.0,
            "scale": 1e2,
            "ratio": 1.5,
            "sizes": [2.0, 12]
        }));
        assert_eq!(
            text,
            "{\n  \"lineHeight\": 1,\n  \"scale\": 100,\n  \"ratio\": 1.5,\n  \"sizes\": [\n    2,\n    12\n  ]\n}"
        );
    }

    #[test]
    fn closing_modal_keeps_generated_text() {
        let mut state = ThemeLabState::new();
        state.generate_theme(&sample_theme());
        state.close_modal();

        assert!(!state.is_modal_open());
        assert!(state.generated_theme().is_some());
    }

    #[test]
    fn close_panel_reports_to_layout_store() {
        let state = ThemeLabState::new();
        let mut layout = Layout { open: true };
        state.close_panel(&mut layout);
        assert!(!layout.open);
    }

    #[tokio::test]
    async fn copy_before_generation_does_nothing() {
        let state = ThemeLabState::new();
        let clipboard = FakeClipboard::default();
        let notifier = RecordingNotifier::default();

        state.copy_generated_theme(&clipboard, &notifier).await;

        assert!(clipboard.writes.lock().unwrap().is_empty());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_copy_sends_one_success_notification() {
        let mut state = ThemeLabState::new();
        let expected = state.generate_theme(&sample_theme()).to_owned();
        let clipboard = FakeClipboard::default();
        let notifier = RecordingNotifier::default();

        state.copy_generated_theme(&clipboard, &notifier).await;

        assert_eq!(*clipboard.writes.lock().unwrap(), vec![expected]);
        assert_eq!(
            *notifier.sent.lock().unwrap(),
            vec![Notification::success("Theme copied to clipboard.")]
        );
    }

    #[tokio::test]
    async fn rejected_copy_sends_one_error_notification() {
        let mut state = ThemeLabState::new();
        state.generate_theme(&sample_theme());
        let clipboard = FakeClipboard {
            reject: true,
            ..FakeClipboard::default()
        };
        let notifier = RecordingNotifier::default();

        state.copy_generated_theme(&clipboard, &notifier).await;

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::Error);
        assert_eq!(sent[0].message, "Copy to clipboard failed.");
    }
}
