/// Modal action sheet for a marker
///
/// A bottom sheet over a dimmed backdrop offering three mutually
/// exclusive signals. Purely presentational; the overview screen decides
/// what each one means. Clicking the backdrop counts as cancel.

use iced::widget::{button, column, container, mouse_area, text, Stack};
use iced::{alignment, Element, Length};

use super::style;

/// Outward signals; the hosting screen interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ViewInfo,
    DeleteMarker,
    Cancel,
}

/// The sheet body plus the detached cancel button below it.
pub fn view(marker_title: &str) -> Element<'_, Event> {
    let sheet_body = column![
        text("Marker actions").size(22),
        text(marker_title).size(14).style(style::muted_text),
        sheet_button("Details", Event::ViewInfo),
        sheet_button("Delete marker", Event::DeleteMarker),
    ]
    .spacing(12);

    let sheet = container(sheet_body)
        .width(Length::Fill)
        .padding([20, 24])
        .style(style::sheet);

    let cancel = button(centered_label("Cancel"))
        .width(Length::Fill)
        .padding(14)
        .style(style::cancel_button)
        .on_press(Event::Cancel);

    column![
        sheet,
        container(cancel).width(Length::Fill).padding([16, 24]),
    ]
    .into()
}

/// Lay modal content over `base`, pinned to the bottom of a dimmed
/// backdrop. Any click that no button claims emits `on_dismiss`,
/// backdrop and sheet body alike.
pub fn overlay<'a, Message: Clone + 'a>(
    base: Element<'a, Message>,
    content: Element<'a, Message>,
    on_dismiss: Message,
) -> Element<'a, Message> {
    let backdrop = container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_y(alignment::Vertical::Bottom)
        .style(style::overlay_backdrop);

    Stack::new()
        .push(base)
        .push(mouse_area(backdrop).on_press(on_dismiss))
        .into()
}

fn sheet_button(label: &str, event: Event) -> Element<'_, Event> {
    button(centered_label(label))
        .width(Length::Fill)
        .padding(14)
        .style(style::primary_button)
        .on_press(event)
        .into()
}

fn centered_label(label: &str) -> Element<'_, Event> {
    container(text(label).size(16))
        .width(Length::Fill)
        .align_x(alignment::Horizontal::Center)
        .into()
}
