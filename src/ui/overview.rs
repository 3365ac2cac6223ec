/// Marker overview screen
///
/// Lists every marker with its gallery size, owns the new-marker input,
/// and tracks which marker the action sheet is open for. The sheet's
/// signals come back through [`Event::Sheet`]; the application decides
/// what they mean.

use iced::widget::{button, column, container, row, scrollable, text, text_input, Column, Space};
use iced::{Alignment, Element, Length};

use super::{action_sheet, style};
use crate::state::data::MarkerSummary;

#[derive(Debug, Clone)]
pub enum Event {
    NewTitleChanged(String),
    CreatePressed,
    RowPressed(i64),
    Sheet(action_sheet::Event),
}

#[derive(Debug, Default)]
pub struct State {
    /// Markers as last listed, newest first
    pub summaries: Vec<MarkerSummary>,
    /// Edit buffer for the new-marker title
    pub new_title: String,
    /// Marker id the action sheet is open for
    pub sheet_for: Option<i64>,
}

impl State {
    /// Replace the list wholesale with a fresh listing.
    pub fn apply_list(&mut self, summaries: Vec<MarkerSummary>) {
        self.summaries = summaries;
    }

    /// The new-marker title, or None when it is effectively blank.
    pub fn trimmed_title(&self) -> Option<&str> {
        let trimmed = self.new_title.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    pub fn summary(&self, id: i64) -> Option<&MarkerSummary> {
        self.summaries.iter().find(|s| s.marker.id == id)
    }

    pub fn open_sheet(&mut self, id: i64) {
        self.sheet_for = Some(id);
    }

    pub fn close_sheet(&mut self) {
        self.sheet_for = None;
    }
}

pub fn view(state: &State) -> Element<'_, Event> {
    let header = text("Waymark").size(28);

    let create_row = row![
        text_input("New marker title", &state.new_title)
            .on_input(Event::NewTitleChanged)
            .on_submit(Event::CreatePressed)
            .padding(10)
            .size(16),
        button(text("Add").size(16))
            .padding([10, 20])
            .style(style::primary_button)
            .on_press(Event::CreatePressed),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let list: Element<'_, Event> = if state.summaries.is_empty() {
        container(
            text("No markers yet, add one above")
                .size(14)
                .style(style::muted_text),
        )
        .padding(8)
        .into()
    } else {
        let rows: Vec<Element<'_, Event>> = state.summaries.iter().map(row_view).collect();
        scrollable(Column::with_children(rows).spacing(8))
            .height(Length::Fill)
            .into()
    };

    column![header, create_row, list]
        .spacing(16)
        .padding(20)
        .height(Length::Fill)
        .into()
}

fn row_view(summary: &MarkerSummary) -> Element<'_, Event> {
    let details = column![
        text(&summary.marker.title).size(16),
        text(row_subtitle(summary)).size(13).style(style::muted_text),
    ]
    .spacing(2);

    let count = text(photo_count_label(summary.image_count))
        .size(13)
        .style(style::muted_text);

    button(
        row![details, Space::with_width(Length::Fill), count].align_y(Alignment::Center),
    )
    .width(Length::Fill)
    .padding(12)
    .style(style::row_button)
    .on_press(Event::RowPressed(summary.marker.id))
    .into()
}

/// Address when known, creation date otherwise.
fn row_subtitle(summary: &MarkerSummary) -> String {
    if !summary.marker.address.is_empty() {
        return summary.marker.address.clone();
    }

    match chrono::DateTime::from_timestamp(summary.marker.created_at, 0) {
        Some(ts) => format!("Added {}", ts.format("%Y-%m-%d")),
        None => String::new(),
    }
}

fn photo_count_label(count: u32) -> String {
    if count == 1 {
        "1 photo".to_string()
    } else {
        format!("{count} photos")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::Marker;

    fn summary(id: i64, title: &str, address: &str, image_count: u32) -> MarkerSummary {
        MarkerSummary {
            marker: Marker {
                id,
                title: title.to_string(),
                description: String::new(),
                address: address.to_string(),
                latitude: None,
                longitude: None,
                created_at: 1_700_000_000,
            },
            image_count,
        }
    }

    #[test]
    fn blank_titles_do_not_count() {
        let mut state = State::default();
        assert_eq!(state.trimmed_title(), None);

        state.new_title = "   ".to_string();
        assert_eq!(state.trimmed_title(), None);

        state.new_title = "  Harbor  ".to_string();
        assert_eq!(state.trimmed_title(), Some("Harbor"));
    }

    #[test]
    fn apply_list_replaces_previous_rows() {
        let mut state = State::default();
        state.apply_list(vec![summary(1, "A", "", 0)]);
        state.apply_list(vec![summary(2, "B", "", 0), summary(3, "C", "", 1)]);

        assert_eq!(state.summaries.len(), 2);
        assert!(state.summary(1).is_none());
        assert_eq!(state.summary(3).map(|s| s.image_count), Some(1));
    }

    #[test]
    fn sheet_tracks_one_marker_at_a_time() {
        let mut state = State::default();
        state.open_sheet(7);
        assert_eq!(state.sheet_for, Some(7));

        state.open_sheet(9);
        assert_eq!(state.sheet_for, Some(9));

        state.close_sheet();
        assert_eq!(state.sheet_for, None);
    }

    #[test]
    fn subtitle_prefers_address_over_date() {
        let with_address = summary(1, "A", "1 Main St", 0);
        assert_eq!(row_subtitle(&with_address), "1 Main St");

        let without = summary(2, "B", "", 0);
        assert_eq!(row_subtitle(&without), "Added 2023-11-14");
    }

    #[test]
    fn photo_counts_read_naturally() {
        assert_eq!(photo_count_label(0), "0 photos");
        assert_eq!(photo_count_label(1), "1 photo");
        assert_eq!(photo_count_label(3), "3 photos");
    }
}
