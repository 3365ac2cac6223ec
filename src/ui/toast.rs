/// Transient bottom-anchored notifications
///
/// Every storage round-trip reports back through one of these. A
/// [`Manager`] keeps at most [`MAX_VISIBLE`] cards on screen and queues
/// the rest; cards expire on a periodic tick or when clicked.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use iced::widget::{column, container, mouse_area, text, Column};
use iced::{alignment, Background, Border, Color, Element, Length, Theme};

use super::style::palette;

/// Maximum number of toasts visible at once.
const MAX_VISIBLE: usize = 3;

/// How long a toast stays up before the tick removes it.
const AUTO_DISMISS: Duration = Duration::from_secs(4);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastId(u64);

impl ToastId {
    fn next() -> Self {
        ToastId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    fn background(self) -> Color {
        match self {
            ToastKind::Success => palette::SUCCESS,
            ToastKind::Error => palette::DANGER,
        }
    }
}

/// Messages emitted by the toast layer.
#[derive(Debug, Clone)]
pub enum Message {
    Dismiss(ToastId),
}

#[derive(Debug, Clone)]
pub struct Toast {
    id: ToastId,
    kind: ToastKind,
    title: String,
    body: String,
    created_at: Instant,
}

impl Toast {
    fn new(kind: ToastKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Toast {
            id: ToastId::next(),
            kind,
            title: title.into(),
            body: body.into(),
            created_at: Instant::now(),
        }
    }

    pub fn success(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, title, body)
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, title, body)
    }

    pub fn id(&self) -> ToastId {
        self.id
    }

    pub fn kind(&self) -> ToastKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn expired(&self) -> bool {
        self.created_at.elapsed() >= AUTO_DISMISS
    }

    #[cfg(test)]
    fn backdate(&mut self, by: Duration) {
        self.created_at -= by;
    }
}

/// Owns the visible toasts and the overflow queue.
#[derive(Debug, Default)]
pub struct Manager {
    /// Currently visible toasts (newest first)
    visible: VecDeque<Toast>,
    /// Waiting for a visible slot
    queue: VecDeque<Toast>,
}

impl Manager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a toast, or queue it when the screen is full.
    pub fn push(&mut self, toast: Toast) {
        if self.visible.len() < MAX_VISIBLE {
            self.visible.push_front(toast);
        } else {
            self.queue.push_back(toast);
        }
    }

    /// Remove a toast by id, promoting a queued one into the freed slot.
    /// Returns whether anything was removed.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        if let Some(pos) = self.visible.iter().position(|t| t.id == id) {
            self.visible.remove(pos);
            self.promote_from_queue();
            return true;
        }

        if let Some(pos) = self.queue.iter().position(|t| t.id == id) {
            self.queue.remove(pos);
            return true;
        }

        false
    }

    /// Drop every visible toast that has outlived [`AUTO_DISMISS`].
    /// Called from the app's tick subscription.
    pub fn tick(&mut self) {
        let expired: Vec<ToastId> = self
            .visible
            .iter()
            .filter(|t| t.expired())
            .map(Toast::id)
            .collect();

        for id in expired {
            self.dismiss(id);
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.visible.iter()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    /// Whether the tick subscription needs to keep running.
    pub fn has_toasts(&self) -> bool {
        !self.visible.is_empty() || !self.queue.is_empty()
    }

    fn promote_from_queue(&mut self) {
        while self.visible.len() < MAX_VISIBLE {
            if let Some(toast) = self.queue.pop_front() {
                self.visible.push_back(toast);
            } else {
                break;
            }
        }
    }
}

/// Render one toast card. Clicking anywhere on it dismisses it.
fn view_toast(toast: &Toast) -> Element<'_, Message> {
    let content = column![
        text(&toast.title).size(16).style(|_theme: &Theme| {
            text::Style {
                color: Some(palette::TEXT),
            }
        }),
        text(&toast.body).size(14).style(|_theme: &Theme| {
            text::Style {
                color: Some(palette::TEXT),
            }
        }),
    ]
    .spacing(4);

    let kind = toast.kind;
    let card = container(content)
        .width(Length::Fixed(320.0))
        .padding(12)
        .style(move |_theme: &Theme| container::Style {
            background: Some(Background::Color(kind.background())),
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: 12.0.into(),
            },
            text_color: Some(palette::TEXT),
            ..container::Style::default()
        });

    mouse_area(card)
        .on_press(Message::Dismiss(toast.id))
        .into()
}

/// The bottom-centered overlay layer with every visible toast.
pub fn view_overlay(manager: &Manager) -> Element<'_, Message> {
    let cards: Vec<Element<'_, Message>> = manager.visible().map(view_toast).collect();

    container(Column::with_children(cards).spacing(8))
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(alignment::Horizontal::Center)
        .align_y(alignment::Vertical::Bottom)
        .padding(24)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manager_is_empty() {
        let manager = Manager::new();
        assert_eq!(manager.visible_count(), 0);
        assert_eq!(manager.queued_count(), 0);
        assert!(!manager.has_toasts());
    }

    #[test]
    fn push_shows_until_screen_is_full_then_queues() {
        let mut manager = Manager::new();

        for i in 0..MAX_VISIBLE {
            manager.push(Toast::success("Saved", format!("number {i}")));
        }
        assert_eq!(manager.visible_count(), MAX_VISIBLE);
        assert_eq!(manager.queued_count(), 0);

        manager.push(Toast::success("Saved", "overflow"));
        assert_eq!(manager.visible_count(), MAX_VISIBLE);
        assert_eq!(manager.queued_count(), 1);
    }

    #[test]
    fn dismiss_removes_and_promotes_from_queue() {
        let mut manager = Manager::new();

        let mut first_id = None;
        for i in 0..MAX_VISIBLE {
            let toast = Toast::success("Saved", format!("number {i}"));
            if i == 0 {
                first_id = Some(toast.id());
            }
            manager.push(toast);
        }
        manager.push(Toast::error("Error", "queued"));
        assert_eq!(manager.queued_count(), 1);

        assert!(manager.dismiss(first_id.expect("captured id")));
        assert_eq!(manager.visible_count(), MAX_VISIBLE);
        assert_eq!(manager.queued_count(), 0);
    }

    #[test]
    fn dismiss_unknown_id_reports_false() {
        let mut manager = Manager::new();
        let stray = Toast::success("Saved", "never pushed");
        assert!(!manager.dismiss(stray.id()));
    }

    #[test]
    fn tick_expires_only_old_toasts() {
        let mut manager = Manager::new();

        let mut old = Toast::success("Saved", "stale");
        old.backdate(AUTO_DISMISS + Duration::from_secs(1));
        let old_id = old.id();

        manager.push(old);
        manager.push(Toast::error("Error", "fresh"));

        manager.tick();

        assert_eq!(manager.visible_count(), 1);
        assert!(manager.visible().all(|t| t.id() != old_id));
    }

    #[test]
    fn expiry_promotes_queued_toasts() {
        let mut manager = Manager::new();

        for _ in 0..MAX_VISIBLE {
            let mut toast = Toast::success("Saved", "stale");
            toast.backdate(AUTO_DISMISS + Duration::from_secs(1));
            manager.push(toast);
        }
        manager.push(Toast::success("Saved", "waiting"));

        manager.tick();

        assert_eq!(manager.visible_count(), 1);
        assert_eq!(manager.queued_count(), 0);
        assert_eq!(manager.visible().next().expect("promoted").title(), "Saved");
    }
}
