use crate::services::notify::{Notification, NotificationKind};
use eframe::egui;
use std::time::{Duration, Instant};

struct Toast {
    notification: Notification,
    shown_at: Instant,
}

/// Transient notifications shown in the bottom-right corner.
pub struct ToastBar {
    toasts: Vec<Toast>,
    lifetime: Duration,
}

impl ToastBar {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            lifetime,
        }
    }

    pub fn push(&mut self, notification: Notification) {
        self.push_at(notification, Instant::now());
    }

    fn push_at(&mut self, notification: Notification, shown_at: Instant) {
        self.toasts.push(Toast {
            notification,
            shown_at,
        });
    }

    pub fn prune(&mut self, now: Instant) {
        let lifetime = self.lifetime;
        self.toasts
            .retain(|toast| now.saturating_duration_since(toast.shown_at) < lifetime);
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn active(&self) -> impl Iterator<Item = &Notification> {
        self.toasts.iter().map(|toast| &toast.notification)
    }

    pub fn render(&mut self, ctx: &egui::Context) {
        self.prune(Instant::now());
        if self.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toast_bar"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
            .show(ctx, |ui| {
                for notification in self.active() {
                    let fill = match notification.kind {
                        NotificationKind::Success => egui::Color32::from_rgb(45, 160, 110),
                        NotificationKind::Error => egui::Color32::from_rgb(200, 50, 60),
                    };
                    egui::Frame::popup(ui.style()).fill(fill).show(ui, |ui| {
                        ui.colored_label(egui::Color32::WHITE, &notification.message);
                    });
                }
            });

        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_lifetime() {
        let start = Instant::now();
        let mut bar = ToastBar::new(Duration::from_secs(4));
        bar.push_at(Notification::success("Theme copied to clipboard."), start);
        bar.push_at(
            Notification::error("Copy to clipboard failed."),
            start + Duration::from_secs(3),
        );

        bar.prune(start + Duration::from_secs(2));
        assert_eq!(bar.active().count(), 2);

        bar.prune(start + Duration::from_secs(5));
        let remaining: Vec<_> = bar.active().cloned().collect();
        assert_eq!(remaining, vec![Notification::error("Copy to clipboard failed.")]);

        bar.prune(start + Duration::from_secs(8));
        assert!(bar.is_empty());
    }
}
