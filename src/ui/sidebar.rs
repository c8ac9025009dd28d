use crate::ui::layout::{LayoutState, PANEL_WIDTH_RANGE};
use crate::ui::theme::{parse_hex_color, ThemeContext};
use crate::ui::theme_lab::{ThemeLabAction, ThemeLabState, ThemeLabTab};
use eframe::egui;
use serde_json::Value;

pub fn render(
    ui: &mut egui::Ui,
    state: &ThemeLabState,
    theme: &ThemeContext,
    layout: &mut LayoutState,
) -> Option<ThemeLabAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.heading("⚙ Theme Lab");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("✕").on_hover_text("Close").clicked() {
                action = Some(ThemeLabAction::ClosePanel);
            }
        });
    });
    ui.separator();

    ui.horizontal(|ui| {
        for tab in ThemeLabTab::ALL {
            if ui.selectable_label(state.is_active(tab), tab.label()).clicked() {
                action = Some(ThemeLabAction::SelectTab(tab));
            }
        }
    });
    ui.separator();

    let button_height = 32.0;
    egui::ScrollArea::vertical()
        .max_height(ui.available_height() - button_height * 2.0)
        .auto_shrink([false, false])
        .show(ui, |ui| match state.active_tab() {
            ThemeLabTab::Theme => render_theme_settings(ui, theme),
            ThemeLabTab::Layout => render_layout_settings(ui, layout),
        });

    ui.separator();
    if ui
        .add_sized(
            [ui.available_width(), button_height],
            egui::Button::new("Generate Theme 👀"),
        )
        .clicked()
    {
        action = Some(ThemeLabAction::GenerateTheme);
    }

    action
}

pub fn render_theme_modal(ctx: &egui::Context, state: &ThemeLabState) -> Option<ThemeLabAction> {
    if !state.is_modal_open() {
        return None;
    }

    let mut action = None;
    let mut open = true;
    let mut text = state.generated_theme().unwrap_or_default();

    egui::Window::new("🙂 Your theme is ready!")
        .collapsible(false)
        .resizable(true)
        .default_width(520.0)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .open(&mut open)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().max_height(420.0).show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut text)
                        .code_editor()
                        .desired_width(f32::INFINITY),
                );
            });
            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("📋 Copy").clicked() {
                    action = Some(ThemeLabAction::CopyTheme);
                }
                if ui.button("Close").clicked() {
                    action = Some(ThemeLabAction::CloseModal);
                }
            });
        });

    if !open {
        action = Some(ThemeLabAction::CloseModal);
    }
    action
}

fn render_theme_settings(ui: &mut egui::Ui, theme: &ThemeContext) {
    ui.label("Current theme");
    render_value(ui, "theme", None, theme.theme());
}

fn render_value(ui: &mut egui::Ui, path: &str, key: Option<&str>, value: &Value) {
    match value {
        Value::Object(map) => {
            let body = |ui: &mut egui::Ui| {
                for (child_key, child) in map {
                    let child_path = format!("{path}.{child_key}");
                    render_value(ui, &child_path, Some(child_key), child);
                }
            };
            match key {
                Some(key) => {
                    egui::CollapsingHeader::new(key)
                        .id_salt(path)
                        .show(ui, body);
                }
                None => body(ui),
            }
        }
        leaf => {
            ui.horizontal(|ui| {
                if let Some(key) = key {
                    ui.label(key);
                }
                if let Some(color) = leaf.as_str().and_then(parse_hex_color) {
                    ui.colored_label(color, "■");
                }
                let display = match leaf {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                ui.monospace(display);
            });
        }
    }
}

fn render_layout_settings(ui: &mut egui::Ui, layout: &mut LayoutState) {
    ui.label("Layout");
    ui.add(egui::Slider::new(&mut layout.panel_width, PANEL_WIDTH_RANGE).text("Panel width"));
    ui.checkbox(&mut layout.dark_mode, "Dark mode");
}
