/// Marker detail screen
///
/// Owns the in-memory copy of one marker and its gallery. Storage results
/// are folded in through small merge functions kept free of IO so the
/// reconciliation rules stay independently testable.

use std::collections::HashMap;
use std::path::PathBuf;

use iced::widget::{
    button, column, container, row, scrollable, text, text_editor, text_input, Space,
};
use iced::{Alignment, Element, Length};

use super::{gallery, style};
use crate::state::data::{Marker, MarkerImage};

/// A marker plus its full gallery, fetched together and applied wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub marker: Marker,
    pub images: Vec<MarkerImage>,
}

/// What the user did on the screen; storage results arrive separately
/// through the application messages.
#[derive(Debug, Clone)]
pub enum Event {
    BackPressed,
    TitleChanged(String),
    DescriptionEdited(text_editor::Action),
    SavePressed,
    Gallery(gallery::Event),
}

/// Screen state for one marker.
pub struct State {
    /// Last snapshot of the marker as storage knows it
    pub marker: Marker,
    /// Edit buffer for the title field
    pub title_input: String,
    /// Edit buffer for the description field
    pub description: text_editor::Content,
    /// The gallery, in insertion order
    pub images: Vec<MarkerImage>,
    /// Cached thumbnail paths by image id
    pub thumbnails: HashMap<i64, PathBuf>,
}

impl State {
    /// Seed the screen from an overview row. The gallery stays empty
    /// until the load round-trip replaces the whole state.
    pub fn seeded(marker: Marker) -> Self {
        State {
            title_input: marker.title.clone(),
            description: text_editor::Content::with_text(&marker.description),
            marker,
            images: Vec::new(),
            thumbnails: HashMap::new(),
        }
    }

    /// The marker as currently edited, ready for the save payload.
    /// Address and coordinates ride along unchanged.
    pub fn edited_marker(&self) -> Marker {
        let mut marker = self.marker.clone();
        marker.title = self.title_input.clone();
        // The editor reports a final newline that was never typed
        let description = self.description.text();
        marker.description = description
            .strip_suffix('\n')
            .unwrap_or(&description)
            .to_string();
        marker
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("marker_id", &self.marker.id)
            .field("images", &self.images.len())
            .finish()
    }
}

/// Replace local state wholesale with a fetched snapshot. Edit buffers
/// are reset too; nothing stale survives a reload.
pub fn apply_snapshot(state: &mut State, snapshot: Snapshot) {
    state.title_input = snapshot.marker.title.clone();
    state.description = text_editor::Content::with_text(&snapshot.marker.description);
    state.marker = snapshot.marker;
    state.images = snapshot.images;
}

/// Append an acknowledged image to the gallery.
pub fn append_image(images: &mut Vec<MarkerImage>, image: MarkerImage) {
    images.push(image);
}

/// Remove by id. A target without an id, or an id matching nothing,
/// leaves the gallery unchanged.
pub fn remove_image_by_id(images: &mut Vec<MarkerImage>, id: Option<i64>) {
    let Some(id) = id else { return };
    images.retain(|img| img.id != Some(id));
}

pub fn view(state: &State) -> Element<'_, Event> {
    let header = row![
        button(text("← Back").size(14))
            .padding([6, 12])
            .style(style::cancel_button)
            .on_press(Event::BackPressed),
        text("Marker details").size(24),
        Space::with_width(Length::Fill),
        button(text("Save").size(16))
            .padding([10, 20])
            .style(style::primary_button)
            .on_press(Event::SavePressed),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let mut fields = column![
        text("Title:").size(14).style(style::muted_text),
        text_input("Marker title", &state.title_input)
            .on_input(Event::TitleChanged)
            .padding(10)
            .size(16),
        text("Description:").size(14).style(style::muted_text),
        text_editor(&state.description)
            .on_action(Event::DescriptionEdited)
            .padding(10)
            .height(Length::Fixed(140.0)),
        text("Address:").size(14).style(style::muted_text),
        text(display_or_dash(&state.marker.address)).size(16),
    ]
    .spacing(8);

    if let (Some(lat), Some(lon)) = (state.marker.latitude, state.marker.longitude) {
        fields = fields.push(
            text(format!("{lat:.5}, {lon:.5}"))
                .size(13)
                .style(style::muted_text),
        );
    }

    let form = container(fields)
        .width(Length::Fill)
        .padding(16)
        .style(style::card);

    let photos = container(gallery::view(&state.images, &state.thumbnails).map(Event::Gallery))
        .width(Length::Fill)
        .padding(16)
        .style(style::card);

    let content = column![header, form, photos].spacing(16).padding(20);

    scrollable(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "—"
    } else {
        value
    }
}
