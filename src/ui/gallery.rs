/// Stateless photo gallery for the marker detail screen
///
/// Renders the header with the add affordance, an empty-state line, or
/// one card per image. Holds no state and talks to no storage; all
/// mutation is delegated upward through [`Event`].

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use iced::widget::{button, column, container, image, keyed_column, row, text, Space};
use iced::{Alignment, ContentFit, Element, Length};

use super::style;
use crate::state::data::MarkerImage;

/// Outward signals; the hosting screen decides what they mean.
#[derive(Debug, Clone)]
pub enum Event {
    AddRequested,
    RemoveRequested(MarkerImage),
}

/// Photo card height in logical pixels
const CARD_HEIGHT: f32 = 200.0;

/// Render the gallery. Cards are keyed by source locator, which is
/// unique within a gallery at render time.
pub fn view<'a>(
    images: &'a [MarkerImage],
    thumbnails: &'a HashMap<i64, PathBuf>,
) -> Element<'a, Event> {
    let header = row![
        text("Photos").size(20),
        Space::with_width(Length::Fill),
        button(text("+").size(18))
            .padding([2, 14])
            .style(style::primary_button)
            .on_press(Event::AddRequested),
    ]
    .align_y(Alignment::Center);

    if images.is_empty() {
        return column![
            header,
            text("No photos yet").size(14).style(style::muted_text),
        ]
        .spacing(12)
        .into();
    }

    let cards = keyed_column(
        images
            .iter()
            .map(|img| (uri_key(&img.uri), card(img, thumbnails))),
    )
    .spacing(12);

    column![header, cards].spacing(12).into()
}

fn card<'a>(
    image_row: &'a MarkerImage,
    thumbnails: &'a HashMap<i64, PathBuf>,
) -> Element<'a, Event> {
    let photo = image(handle_for(image_row, thumbnails))
        .width(Length::Fill)
        .height(Length::Fixed(CARD_HEIGHT))
        .content_fit(ContentFit::Cover);

    let remove = button(text("Remove").size(14))
        .padding([6, 16])
        .style(style::primary_button)
        .on_press(Event::RemoveRequested(image_row.clone()));

    container(column![photo, remove].spacing(8))
        .width(Length::Fill)
        .padding(8)
        .style(style::field)
        .into()
}

/// Cached thumbnail when one is ready, full source decode otherwise.
fn handle_for(image_row: &MarkerImage, thumbnails: &HashMap<i64, PathBuf>) -> image::Handle {
    match image_row.id.and_then(|id| thumbnails.get(&id)) {
        Some(thumb) => image::Handle::from_path(thumb),
        None => image::Handle::from_path(&image_row.uri),
    }
}

fn uri_key(uri: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    uri.hash(&mut hasher);
    hasher.finish()
}
