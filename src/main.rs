use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use iced::widget::Stack;
use iced::{Element, Size, Subscription, Task, Theme};

mod picker;
mod state;
mod thumbs;
mod ui;

use picker::PickOutcome;
use state::data::{Marker, MarkerImage, MarkerSummary, NewImage, NewMarker};
use state::library::SqliteStore;
use state::prefs::Prefs;
use state::store::{run_blocking, MarkerStore, StoreError};
use ui::detail::{self, Snapshot};
use ui::toast::{self, Toast};
use ui::{action_sheet, gallery, overview, style};

/// Which screen is in front. The overview keeps its state in the app
/// itself; the detail screen's state lives and dies with the variant.
#[derive(Debug)]
enum Screen {
    Overview,
    Detail(detail::State),
}

/// Main application state
struct App {
    /// Storage behind a trait object so tests can swap in a double
    store: Arc<dyn MarkerStore>,
    screen: Screen,
    overview: overview::State,
    toasts: toast::Manager,
    prefs: Prefs,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User interaction on the overview screen
    Overview(overview::Event),
    /// Background listing completed
    MarkersListed(Result<Vec<MarkerSummary>, StoreError>),
    /// Background insert completed
    MarkerCreated(Result<Marker, StoreError>),
    /// Background delete completed, with the affected id
    MarkerDeleted(Result<i64, StoreError>),

    /// User interaction on the detail screen
    Detail(detail::Event),
    /// Fresh snapshot for the open marker
    DetailLoaded(Result<Snapshot, StoreError>),
    /// Save round-trip finished with the reloaded snapshot
    SaveFinished(Result<Snapshot, StoreError>),
    /// The image picker resolved
    PickFinished(PickOutcome),
    /// Background image insert completed
    ImageAdded(Result<MarkerImage, StoreError>),
    /// Background image delete completed, with the removed row
    ImageRemoved(Result<MarkerImage, StoreError>),
    /// A thumbnail finished generating for the given image id
    ThumbnailReady(i64, Result<PathBuf, String>),

    /// Toast interaction
    Toast(toast::Message),
    /// Periodic toast expiry check
    Tick,
}

impl App {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        // If this fails, we panic because the app cannot function
        // without its database
        let store = SqliteStore::new()
            .expect("Failed to initialize database. Check permissions and disk space.");

        let (prefs, warning) = Prefs::load();
        if let Some(warning) = warning {
            log::warn!("could not load preferences: {warning}");
        }

        Self::with_store(Arc::new(store), prefs)
    }

    /// Wire the app around any [`MarkerStore`] and kick off the first
    /// listing. This is the seam the tests use.
    fn with_store(store: Arc<dyn MarkerStore>, prefs: Prefs) -> (Self, Task<Message>) {
        let app = App {
            store,
            screen: Screen::Overview,
            overview: overview::State::default(),
            toasts: toast::Manager::new(),
            prefs,
        };

        let refresh = app.refresh_markers();
        (app, refresh)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Overview(event) => self.update_overview(event),
            Message::Detail(event) => self.update_detail(event),

            Message::MarkersListed(Ok(summaries)) => {
                self.overview.apply_list(summaries);
                Task::none()
            }
            Message::MarkersListed(Err(e)) => {
                log::error!("could not list markers: {e}");
                self.toasts.push(Toast::error("Error", "Could not load markers"));
                Task::none()
            }

            Message::MarkerCreated(Ok(marker)) => {
                log::info!("created marker {} ({})", marker.id, marker.title);
                self.overview.new_title.clear();
                self.toasts.push(Toast::success("Saved", "Marker added"));
                self.refresh_markers()
            }
            Message::MarkerCreated(Err(e)) => {
                log::error!("could not create marker: {e}");
                self.toasts.push(Toast::error("Error", "Could not create marker"));
                Task::none()
            }

            Message::MarkerDeleted(Ok(marker_id)) => {
                log::info!("deleted marker {marker_id}");
                self.toasts.push(Toast::success("Deleted", "Marker removed"));
                self.refresh_markers()
            }
            Message::MarkerDeleted(Err(e)) => {
                log::error!("could not delete marker: {e}");
                self.toasts.push(Toast::error("Error", "Could not delete marker"));
                Task::none()
            }

            Message::DetailLoaded(Ok(snapshot)) => {
                if let Screen::Detail(detail_state) = &mut self.screen {
                    if detail_state.marker.id == snapshot.marker.id {
                        detail::apply_snapshot(detail_state, snapshot);
                        return self.warm_thumbnails();
                    }
                }
                Task::none()
            }
            Message::DetailLoaded(Err(e)) => {
                // No user-facing signal on the initial load; the seeded
                // state stays up and the failure goes to the log
                log::error!("could not load marker details: {e}");
                Task::none()
            }

            Message::SaveFinished(Ok(snapshot)) => {
                if let Screen::Detail(detail_state) = &mut self.screen {
                    if detail_state.marker.id == snapshot.marker.id {
                        detail::apply_snapshot(detail_state, snapshot);
                    }
                }
                self.toasts.push(Toast::success("Saved", "Marker updated"));
                self.warm_thumbnails()
            }
            Message::SaveFinished(Err(e)) => {
                log::error!("could not save marker: {e}");
                self.toasts.push(Toast::error("Error", "Could not save marker"));
                Task::none()
            }

            Message::PickFinished(outcome) => self.handle_pick(outcome),

            Message::ImageAdded(Ok(image)) => {
                let mut follow_up = Task::none();
                if let Screen::Detail(detail_state) = &mut self.screen {
                    if detail_state.marker.id == image.marker_id {
                        detail::append_image(&mut detail_state.images, image.clone());
                        if let Some(id) = image.id {
                            let source = PathBuf::from(&image.uri);
                            follow_up = Task::perform(
                                thumbs::ensure_thumbnail(id, source),
                                move |result| Message::ThumbnailReady(id, result),
                            );
                        }
                    }
                }
                self.toasts.push(Toast::success("Saved", "Image added"));
                follow_up
            }
            Message::ImageAdded(Err(e)) => {
                log::error!("could not add image: {e}");
                self.toasts.push(Toast::error("Error", "Could not add image"));
                Task::none()
            }

            Message::ImageRemoved(Ok(image)) => {
                if let Screen::Detail(detail_state) = &mut self.screen {
                    detail::remove_image_by_id(&mut detail_state.images, image.id);
                    if let Some(id) = image.id {
                        detail_state.thumbnails.remove(&id);
                    }
                }
                self.toasts.push(Toast::success("Saved", "Image removed"));
                Task::none()
            }
            Message::ImageRemoved(Err(e)) => {
                log::error!("could not remove image: {e}");
                self.toasts.push(Toast::error("Error", "Could not remove image"));
                Task::none()
            }

            Message::ThumbnailReady(image_id, Ok(path)) => {
                if let Screen::Detail(detail_state) = &mut self.screen {
                    detail_state.thumbnails.insert(image_id, path);
                }
                Task::none()
            }
            Message::ThumbnailReady(image_id, Err(e)) => {
                log::warn!("thumbnail for image {image_id} failed: {e}");
                Task::none()
            }

            Message::Toast(toast::Message::Dismiss(id)) => {
                self.toasts.dismiss(id);
                Task::none()
            }
            Message::Tick => {
                self.toasts.tick();
                Task::none()
            }
        }
    }

    fn update_overview(&mut self, event: overview::Event) -> Task<Message> {
        match event {
            overview::Event::NewTitleChanged(value) => {
                self.overview.new_title = value;
                Task::none()
            }
            overview::Event::CreatePressed => {
                // Blank titles never reach storage
                let Some(title) = self.overview.trimmed_title() else {
                    return Task::none();
                };

                let marker = NewMarker {
                    title: title.to_string(),
                    ..NewMarker::default()
                };
                let store = self.store.clone();
                Task::perform(
                    async move {
                        run_blocking("create marker", move || store.create_marker(marker)).await
                    },
                    Message::MarkerCreated,
                )
            }
            overview::Event::RowPressed(id) => {
                self.overview.open_sheet(id);
                Task::none()
            }
            overview::Event::Sheet(signal) => self.handle_sheet(signal),
        }
    }

    /// Interpret the three action-sheet signals for the marker the
    /// sheet was opened on.
    fn handle_sheet(&mut self, signal: action_sheet::Event) -> Task<Message> {
        let Some(marker_id) = self.overview.sheet_for else {
            return Task::none();
        };

        match signal {
            action_sheet::Event::ViewInfo => {
                self.overview.close_sheet();
                let Some(summary) = self.overview.summary(marker_id) else {
                    return Task::none();
                };

                // Seed from the row we already have, then replace with
                // the fetched snapshot when it arrives
                self.screen = Screen::Detail(detail::State::seeded(summary.marker.clone()));
                self.load_detail(marker_id)
            }
            action_sheet::Event::DeleteMarker => {
                self.overview.close_sheet();
                self.delete_marker(marker_id)
            }
            action_sheet::Event::Cancel => {
                self.overview.close_sheet();
                Task::none()
            }
        }
    }

    fn update_detail(&mut self, event: detail::Event) -> Task<Message> {
        match event {
            detail::Event::BackPressed => {
                self.screen = Screen::Overview;
                self.refresh_markers()
            }
            detail::Event::TitleChanged(value) => {
                if let Screen::Detail(detail_state) = &mut self.screen {
                    detail_state.title_input = value;
                }
                Task::none()
            }
            detail::Event::DescriptionEdited(action) => {
                if let Screen::Detail(detail_state) = &mut self.screen {
                    detail_state.description.perform(action);
                }
                Task::none()
            }
            detail::Event::SavePressed => {
                let Screen::Detail(detail_state) = &self.screen else {
                    return Task::none();
                };
                self.save_marker(detail_state.edited_marker())
            }
            detail::Event::Gallery(gallery::Event::AddRequested) => self.open_picker(),
            detail::Event::Gallery(gallery::Event::RemoveRequested(image)) => {
                self.remove_image(image)
            }
        }
    }

    fn handle_pick(&mut self, outcome: PickOutcome) -> Task<Message> {
        match outcome {
            PickOutcome::PermissionDenied => {
                // The picker already showed the blocking alert; the add
                // flow just stops here
                log::warn!("add image aborted: photo access denied");
                Task::none()
            }
            PickOutcome::Canceled => Task::none(),
            PickOutcome::Picked(path) => {
                self.prefs.set_last_picker_dir_from_file(&path);
                if let Some(warning) = self.prefs.save() {
                    log::warn!("could not persist preferences: {warning}");
                }

                let Screen::Detail(detail_state) = &self.screen else {
                    return Task::none();
                };
                self.persist_image(detail_state.marker.id, path.to_string_lossy().into_owned())
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let screen: Element<Message> = match &self.screen {
            Screen::Overview => {
                let base = overview::view(&self.overview).map(Message::Overview);

                match self.overview.sheet_for.and_then(|id| self.overview.summary(id)) {
                    Some(summary) => {
                        let sheet = action_sheet::view(&summary.marker.title)
                            .map(|event| Message::Overview(overview::Event::Sheet(event)));
                        action_sheet::overlay(
                            base,
                            sheet,
                            Message::Overview(overview::Event::Sheet(action_sheet::Event::Cancel)),
                        )
                    }
                    None => base,
                }
            }
            Screen::Detail(detail_state) => detail::view(detail_state).map(Message::Detail),
        };

        if self.toasts.has_toasts() {
            Stack::new()
                .push(screen)
                .push(toast::view_overlay(&self.toasts).map(Message::Toast))
                .into()
        } else {
            screen
        }
    }

    /// Run the toast expiry tick only while there is something to expire
    fn subscription(&self) -> Subscription<Message> {
        if self.toasts.has_toasts() {
            iced::time::every(Duration::from_millis(500)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        style::app_theme()
    }

    // ----- background tasks -----

    fn refresh_markers(&self) -> Task<Message> {
        let store = self.store.clone();
        Task::perform(
            async move { run_blocking("list markers", move || store.list_markers()).await },
            Message::MarkersListed,
        )
    }

    fn load_detail(&self, marker_id: i64) -> Task<Message> {
        let store = self.store.clone();
        Task::perform(fetch_snapshot(store, marker_id), Message::DetailLoaded)
    }

    fn save_marker(&self, edited: Marker) -> Task<Message> {
        let store = self.store.clone();
        Task::perform(save_and_reload(store, edited), Message::SaveFinished)
    }

    fn delete_marker(&self, marker_id: i64) -> Task<Message> {
        let store = self.store.clone();
        Task::perform(
            async move {
                run_blocking("delete marker", move || {
                    // Collect the gallery first so its thumbnails can go too
                    let images = store.images_for(marker_id)?;
                    store.delete_marker(marker_id)?;
                    for image in &images {
                        if let Some(id) = image.id {
                            thumbs::remove_thumbnail(id);
                        }
                    }
                    Ok(marker_id)
                })
                .await
            },
            Message::MarkerDeleted,
        )
    }

    fn open_picker(&self) -> Task<Message> {
        let last_dir = self.prefs.last_picker_dir.clone();
        Task::perform(picker::pick_image(last_dir), Message::PickFinished)
    }

    fn persist_image(&self, marker_id: i64, uri: String) -> Task<Message> {
        let store = self.store.clone();
        Task::perform(
            async move {
                run_blocking("add image", move || {
                    store.add_image(NewImage { marker_id, uri })
                })
                .await
            },
            Message::ImageAdded,
        )
    }

    fn remove_image(&self, image: MarkerImage) -> Task<Message> {
        let store = self.store.clone();
        Task::perform(
            async move {
                let target = image.clone();
                run_blocking("remove image", move || {
                    store.delete_image(&target)?;
                    if let Some(id) = target.id {
                        thumbs::remove_thumbnail(id);
                    }
                    Ok(())
                })
                .await
                .map(|()| image)
            },
            Message::ImageRemoved,
        )
    }

    /// Generate any thumbnails the open gallery is still missing.
    fn warm_thumbnails(&self) -> Task<Message> {
        let Screen::Detail(detail_state) = &self.screen else {
            return Task::none();
        };

        let pending: Vec<Task<Message>> = detail_state
            .images
            .iter()
            .filter_map(|image| {
                let id = image.id?;
                if detail_state.thumbnails.contains_key(&id) {
                    return None;
                }
                let source = PathBuf::from(&image.uri);
                Some(Task::perform(
                    thumbs::ensure_thumbnail(id, source),
                    move |result| Message::ThumbnailReady(id, result),
                ))
            })
            .collect();

        Task::batch(pending)
    }
}

fn main() -> iced::Result {
    env_logger::init();
    log::info!("starting waymark {}", env!("CARGO_PKG_VERSION"));

    iced::application("Waymark", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window_size(Size::new(480.0, 780.0))
        .centered()
        .run_with(App::new)
}

/// Fetch a marker and its gallery as one snapshot.
/// A vanished marker is an error here, unlike at the store level: the
/// screen asking for it believes it exists.
async fn fetch_snapshot(
    store: Arc<dyn MarkerStore>,
    marker_id: i64,
) -> Result<Snapshot, StoreError> {
    run_blocking("load marker", move || {
        let marker = store
            .marker_by_id(marker_id)?
            .ok_or(StoreError::MarkerMissing(marker_id))?;
        let images = store.images_for(marker_id)?;
        Ok(Snapshot { marker, images })
    })
    .await
}

/// Persist the edited marker, then reload marker and gallery fresh so
/// local state ends up matching the persisted truth.
async fn save_and_reload(
    store: Arc<dyn MarkerStore>,
    edited: Marker,
) -> Result<Snapshot, StoreError> {
    run_blocking("save marker", move || {
        store.update_marker(&edited)?;
        let marker = store
            .marker_by_id(edited.id)?
            .ok_or(StoreError::MarkerMissing(edited.id))?;
        let images = store.images_for(edited.id)?;
        Ok(Snapshot { marker, images })
    })
    .await
}
