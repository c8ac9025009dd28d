use crate::config::AppConfig;
use crate::services::clipboard::{Clipboard, SystemClipboard};
use crate::services::notify::{Notification, NotificationDispatcher};
use crate::services::token_storage::{
    redact_token, select_token_storage, StorageBackends, StorageKind, TokenStorage,
};
use crate::ui::{
    apply_theme, copy_theme_text, render_sidebar, render_theme_modal, LayoutState, ThemeContext,
    ThemeLabAction, ThemeLabState, ToastBar,
};
use anyhow::{anyhow, Result};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use eframe::{egui, App, CreationContext, NativeOptions};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, error, info};

pub fn run(config: AppConfig, theme: ThemeContext, backends: StorageBackends) -> Result<()> {
    let shared_config = Arc::new(config);
    let app_name = shared_config.application_name.clone();
    let native_options = NativeOptions::default();
    let storage = select_token_storage(shared_config.secure_token_storage, &backends);
    info!(storage = %storage.kind(), "starting {app_name}");

    eframe::run_native(
        &app_name,
        native_options,
        Box::new(move |cc| {
            Ok(ThemeLabApp::new(
                cc,
                shared_config.clone(),
                theme,
                storage,
            ))
        }),
    )
    .map_err(|err| anyhow!(err.to_string()))
}

struct ThemeLabApp {
    config: Arc<AppConfig>,
    theme: ThemeContext,
    lab: ThemeLabState,
    layout: LayoutState,
    toasts: ToastBar,
    command_tx: Sender<AppCommand>,
    event_rx: Receiver<AppEvent>,
    storage_kind: StorageKind,
    stored_token: Option<String>,
    token_input: String,
    applied_dark_mode: Option<bool>,
    worker_failed: bool,
}

impl ThemeLabApp {
    fn new(
        cc: &CreationContext<'_>,
        config: Arc<AppConfig>,
        theme: ThemeContext,
        storage: Box<dyn TokenStorage>,
    ) -> Box<dyn App> {
        let (command_tx, command_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        let storage_kind = storage.kind();

        spawn_background_worker(
            Arc::new(SystemClipboard::new()),
            storage,
            command_rx,
            event_tx,
            cc.egui_ctx.clone(),
        );

        let mut app = Self {
            layout: LayoutState::from_config(&config),
            toasts: ToastBar::new(Duration::from_secs(config.toast_duration_secs.max(1))),
            config,
            theme,
            lab: ThemeLabState::new(),
            command_tx,
            event_rx,
            storage_kind,
            stored_token: None,
            token_input: String::new(),
            applied_dark_mode: None,
            worker_failed: false,
        };

        app.send(AppCommand::LoadToken);

        Box::new(app)
    }

    fn send(&mut self, command: AppCommand) {
        if let Err(err) = self.command_tx.send(command) {
            self.worker_failed = true;
            error!(error = %err, "background worker unavailable");
            self.toasts
                .push(Notification::error(format!("Background worker unavailable: {err}")));
        }
    }

    fn consume_events(&mut self) {
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => self.handle_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.worker_failed {
                        self.worker_failed = true;
                        self.toasts.push(Notification::error(
                            "Background worker disconnected. Restart the application.",
                        ));
                    }
                    break;
                }
            }
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Notify(notification) => self.toasts.push(notification),
            AppEvent::TokenLoaded(token) => self.stored_token = token,
        }
    }

    fn handle_action(&mut self, action: ThemeLabAction) {
        debug!(?action, "theme lab action");
        match action {
            ThemeLabAction::SelectTab(tab) => self.lab.select_tab(tab),
            ThemeLabAction::GenerateTheme => {
                self.lab.generate_theme(&self.theme);
            }
            ThemeLabAction::CopyTheme => {
                if let Some(text) = self.lab.generated_theme().map(str::to_owned) {
                    self.send(AppCommand::CopyTheme { text });
                }
            }
            ThemeLabAction::CloseModal => self.lab.close_modal(),
            ThemeLabAction::ClosePanel => self.lab.close_panel(&mut self.layout),
        }
    }

    fn sync_theme(&mut self, ctx: &egui::Context) {
        if self.applied_dark_mode != Some(self.layout.dark_mode) {
            apply_theme(ctx, &self.theme, self.layout.dark_mode);
            self.applied_dark_mode = Some(self.layout.dark_mode);
        }
    }

    fn render_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(&self.config.application_name);
            ui.separator();
            if !self.layout.theme_lab_open && ui.button("⚙ Theme Lab").clicked() {
                self.layout.theme_lab_open = true;
            }
            ui.separator();

            ui.label(format!("Token ({}):", self.storage_kind));
            match &self.stored_token {
                Some(token) => {
                    ui.monospace(redact_token(token));
                }
                None => {
                    ui.weak("none stored");
                }
            }
            ui.add(
                egui::TextEdit::singleline(&mut self.token_input)
                    .password(true)
                    .hint_text("New token")
                    .desired_width(160.0),
            );
            let can_save = !self.token_input.trim().is_empty();
            if ui
                .add_enabled(can_save, egui::Button::new("Save token"))
                .clicked()
            {
                if let Some(token) = take_token_input(&mut self.token_input) {
                    self.send(AppCommand::SaveToken(token));
                }
            }
            if ui
                .add_enabled(self.stored_token.is_some(), egui::Button::new("Forget token"))
                .clicked()
            {
                self.send(AppCommand::DeleteToken);
            }
        });

        if self.worker_failed {
            ui.colored_label(
                egui::Color32::LIGHT_RED,
                "Background worker stopped. Clipboard and token actions are unavailable.",
            );
        }
    }

    fn render_preview(&self, ui: &mut egui::Ui) {
        ui.heading("Widget preview");
        ui.label("Messages render with the active theme.");
        ui.separator();

        let empty_state = self
            .theme
            .lookup("messages.emptyState")
            .and_then(|value| value.as_str())
            .unwrap_or("No messages yet.");
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.weak(empty_state);
        });

        let accent = ui.visuals().hyperlink_color;
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.colored_label(accent, "support.bot");
            ui.label("Welcome! How can we help today?");
        });
    }
}

impl App for ThemeLabApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.consume_events();
        self.sync_theme(ctx);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.render_top_bar(ui);
        });

        if self.layout.theme_lab_open {
            let action = egui::SidePanel::right("theme_lab")
                .exact_width(self.layout.panel_width)
                .resizable(false)
                .show(ctx, |ui| render_sidebar(ui, &self.lab, &self.theme, &mut self.layout))
                .inner;
            if let Some(action) = action {
                self.handle_action(action);
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_preview(ui);
        });

        if let Some(action) = render_theme_modal(ctx, &self.lab) {
            self.handle_action(action);
        }

        self.toasts.render(ctx);
    }
}

/// Takes the entered token as typed. Blank input is left in place.
fn take_token_input(input: &mut String) -> Option<String> {
    if input.trim().is_empty() {
        return None;
    }
    Some(std::mem::take(input))
}

#[derive(Debug)]
enum AppCommand {
    CopyTheme { text: String },
    SaveToken(String),
    LoadToken,
    DeleteToken,
}

enum AppEvent {
    Notify(Notification),
    TokenLoaded(Option<String>),
}

/// Forwards notifications to the UI thread.
struct ChannelNotifier {
    event_tx: Sender<AppEvent>,
    repaint: egui::Context,
}

impl NotificationDispatcher for ChannelNotifier {
    fn dispatch(&self, notification: Notification) {
        let _ = self.event_tx.send(AppEvent::Notify(notification));
        self.repaint.request_repaint();
    }
}

fn spawn_background_worker(
    clipboard: Arc<dyn Clipboard>,
    storage: Box<dyn TokenStorage>,
    command_rx: Receiver<AppCommand>,
    event_tx: Sender<AppEvent>,
    repaint: egui::Context,
) {
    thread::spawn(move || {
        let runtime = match Runtime::new() {
            Ok(runtime) => runtime,
            Err(err) => {
                error!(error = %err, "failed to start background runtime");
                return;
            }
        };
        let notifier = ChannelNotifier {
            event_tx: event_tx.clone(),
            repaint: repaint.clone(),
        };

        while let Ok(command) = command_rx.recv() {
            match command {
                AppCommand::CopyTheme { text } => {
                    runtime.block_on(copy_theme_text(
                        Some(&text),
                        clipboard.as_ref(),
                        &notifier,
                    ));
                }
                AppCommand::SaveToken(token) => {
                    let stored = runtime.block_on(async {
                        storage.save_token(&token).await;
                        storage.get_token().await
                    });
                    let notification = if stored.as_deref() == Some(token.as_str()) {
                        Notification::success(format!("Token saved to {}.", storage.kind()))
                    } else {
                        Notification::error(format!("Token could not be saved to {}.", storage.kind()))
                    };
                    let _ = event_tx.send(AppEvent::TokenLoaded(stored));
                    notifier.dispatch(notification);
                }
                AppCommand::LoadToken => {
                    let token = runtime.block_on(storage.get_token());
                    let _ = event_tx.send(AppEvent::TokenLoaded(token));
                    repaint.request_repaint();
                }
                AppCommand::DeleteToken => {
                    runtime.block_on(storage.delete_token());
                    let _ = event_tx.send(AppEvent::TokenLoaded(None));
                    notifier.dispatch(Notification::success("Token removed."));
                }
            }
        }
    });
}
