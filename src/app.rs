use crate::config::Config;
use crate::error::Error;
use crate::imaging::{DicomImageLoader, ImageLoader, Viewport};
use crate::message::Message;
use crate::model::{resolve_sequence, FileSource, ImageSequence};
use crate::navigator::{LoadOutcome, LoadRequest, SliceNavigator};
use crate::views::{quick_jump_panel, viewport_panel};
use iced::mouse::ScrollDelta;
use iced::widget::{button, column, container, row};
use iced::{application, Alignment, Element, Length, Task, Theme};
use rfd::AsyncFileDialog;
use std::path::PathBuf;
use std::sync::Arc;

const APP_TITLE: &str = "Slicestack";

pub fn run(config: Config, source: Option<FileSource>) -> iced::Result {
    let window = config.window;

    application(APP_TITLE, App::update, App::view)
        .theme(App::theme)
        .window_size((window.width, window.height))
        .run_with(move || {
            let loader = Arc::new(DicomImageLoader::new(&config.imaging));
            App::with_loader(config, loader, source)
        })
}

pub struct App {
    config: Arc<Config>,
    loader: Arc<dyn ImageLoader>,
    source: Option<FileSource>,
    generation: u64,
    navigator: SliceNavigator,
}

impl App {
    pub fn with_loader(
        config: Config,
        loader: Arc<dyn ImageLoader>,
        source: Option<FileSource>,
    ) -> (Self, Task<Message>) {
        Self::mount(Arc::new(config), loader, source, 0)
    }

    /// Builds a fresh viewer state and starts resolving `source`.
    fn mount(
        config: Arc<Config>,
        loader: Arc<dyn ImageLoader>,
        source: Option<FileSource>,
        generation: u64,
    ) -> (Self, Task<Message>) {
        let mut app = Self {
            config,
            loader,
            source,
            generation,
            navigator: SliceNavigator::new(Viewport::enable(format!("slices-{generation}"))),
        };

        let Some(source) = app.source.clone() else {
            return (app, Task::none());
        };
        if let Err(err) = app.navigator.initialize() {
            log::warn!("{err}");
            return (app, Task::none());
        }

        let loader = Arc::clone(&app.loader);
        let expand = app.config.imaging.expand_multiframe;
        let task = Task::perform(resolve(loader, source, expand), move |result| {
            Message::SequenceResolved(generation, result)
        });
        (app, task)
    }

    fn remount(&mut self, source: Option<FileSource>) -> Task<Message> {
        let (app, task) = Self::mount(
            Arc::clone(&self.config),
            Arc::clone(&self.loader),
            source,
            self.generation + 1,
        );
        std::mem::replace(self, app).navigator.unmount();
        task
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SequenceResolved(generation, _) | Message::SliceLoaded(generation, _)
                if generation != self.generation =>
            {
                log::debug!("Dropping message from unmounted viewer #{generation}");
                Task::none()
            }
            Message::SequenceResolved(_, Ok(sequence)) => {
                match self.navigator.attach_sequence(sequence) {
                    Ok(request) => self.load(request),
                    Err(err) => {
                        log::warn!("{err}");
                        Task::none()
                    }
                }
            }
            Message::SequenceResolved(_, Err(err)) => {
                self.navigator.fail(err.to_string());
                Task::none()
            }
            Message::SliceLoaded(_, outcome) => {
                self.navigator.complete(outcome);
                Task::none()
            }
            Message::WheelScrolled(delta) => match wheel_step(&delta) {
                0 => Task::none(),
                step => {
                    let request = self.navigator.step(step);
                    self.load(request)
                }
            },
            Message::JumpToSlice(number) => {
                let request = self.navigator.jump_to_slice_number(number);
                self.load(request)
            }
            Message::DismissNotice => {
                self.navigator.clear_navigation_error();
                Task::none()
            }
            Message::Retry => self.remount(self.source.clone()),
            Message::PickFiles => Task::perform(
                async {
                    match AsyncFileDialog::new()
                        .add_filter("DICOM", &["dcm", "DCM"])
                        .pick_files()
                        .await
                    {
                        Some(handles) => handles
                            .into_iter()
                            .map(|handle| handle.path().to_path_buf())
                            .collect(),
                        None => Vec::new(),
                    }
                },
                Message::FilesPicked,
            ),
            Message::FilesPicked(mut paths) => {
                if paths.is_empty() {
                    return Task::none();
                }
                paths.sort();
                self.remount(Some(FileSource::Files { paths }))
            }
        }
    }

    fn load(&self, request: Option<LoadRequest>) -> Task<Message> {
        let Some(request) = request else {
            return Task::none();
        };
        let loader = Arc::clone(&self.loader);
        let generation = self.generation;
        Task::perform(load_slice(loader, request), move |outcome| {
            Message::SliceLoaded(generation, outcome)
        })
    }

    pub fn view(&self) -> Element<'_, Message> {
        let open_button = button("Open DICOM Files").on_press(Message::PickFiles);

        let viewport = container(viewport_panel(&self.navigator))
            .padding(16)
            .width(Length::FillPortion(3))
            .height(Length::Fill)
            .align_x(Alignment::Center)
            .align_y(Alignment::Center);

        let navigation = container(quick_jump_panel(&self.config.quick_jump, &self.navigator))
            .padding(16)
            .width(Length::FillPortion(1));

        column![
            open_button,
            row![viewport, navigation]
                .spacing(16)
                .width(Length::Fill)
                .height(Length::Fill),
        ]
        .padding(20)
        .spacing(20)
        .align_x(Alignment::Start)
        .into()
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}

async fn resolve(
    loader: Arc<dyn ImageLoader>,
    source: FileSource,
    expand_multiframe: bool,
) -> Result<ImageSequence, Error> {
    tokio::task::spawn_blocking(move || -> Result<ImageSequence, Error> {
        let files: Vec<PathBuf> = source.collect()?;
        Ok(resolve_sequence(&files, loader.as_ref(), expand_multiframe))
    })
    .await
    .map_err(|err| Error::Io(format!("sequence resolution did not finish: {err}")))?
}

async fn load_slice(loader: Arc<dyn ImageLoader>, request: LoadRequest) -> LoadOutcome {
    let fallback = request.clone();
    tokio::task::spawn_blocking(move || request.execute(loader.as_ref()))
        .await
        .unwrap_or_else(|err| LoadOutcome {
            request: fallback,
            result: Err(Error::Decode(format!("slice load did not finish: {err}"))),
        })
}

/// Sign of a wheel event in DOM convention: positive when scrolling down.
fn wheel_step(delta: &ScrollDelta) -> i32 {
    let y = match delta {
        ScrollDelta::Lines { y, .. } | ScrollDelta::Pixels { y, .. } => *y,
    };
    if y > 0.0 {
        -1
    } else if y < 0.0 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::imaging::DecodedImage;
    use crate::model::ImageId;
    use crate::navigator::Phase;
    use iced::widget::image::Handle;
    use std::path::Path;

    struct BlankLoader;

    impl ImageLoader for BlankLoader {
        fn frame_count(&self, _path: &Path) -> Result<u32> {
            Ok(1)
        }

        fn load_image(&self, id: &ImageId) -> Result<DecodedImage> {
            Ok(DecodedImage {
                id: id.clone(),
                width: 1,
                height: 1,
                handle: Handle::from_rgba(1, 1, vec![0, 0, 0, 255]),
            })
        }
    }

    fn source(count: usize) -> FileSource {
        FileSource::Numbered {
            dir: PathBuf::from("series"),
            count,
        }
    }

    fn mounted(count: usize) -> App {
        let (app, _) = App::with_loader(
            Config::default(),
            Arc::new(BlankLoader),
            Some(source(count)),
        );
        app
    }

    fn sequence(count: usize) -> ImageSequence {
        let files = source(count).collect().expect("numbered source");
        resolve_sequence(&files, &BlankLoader, false)
    }

    fn ready(count: usize) -> App {
        let mut app = mounted(count);
        let request = app
            .navigator
            .attach_sequence(sequence(count))
            .expect("loading")
            .expect("first slice requested");
        let _ = app.update(Message::SliceLoaded(
            app.generation,
            request.execute(&BlankLoader),
        ));
        app
    }

    #[test]
    fn wheel_down_moves_toward_first_slice() {
        assert_eq!(wheel_step(&ScrollDelta::Lines { x: 0.0, y: -1.0 }), 1);
        assert_eq!(wheel_step(&ScrollDelta::Pixels { x: 0.0, y: 40.0 }), -1);
        assert_eq!(wheel_step(&ScrollDelta::Lines { x: 3.0, y: 0.0 }), 0);
    }

    #[test]
    fn mount_without_source_stays_uninitialized() {
        let (app, _) = App::with_loader(Config::default(), Arc::new(BlankLoader), None);
        assert_eq!(app.navigator.phase(), Phase::Uninitialized);
    }

    #[test]
    fn mount_with_source_starts_loading() {
        assert_eq!(mounted(3).navigator.phase(), Phase::Loading);
    }

    #[test]
    fn first_slice_makes_viewer_ready() {
        let app = ready(3);
        assert!(app.navigator.is_ready());
        assert_eq!(app.navigator.current_index(), Some(0));
    }

    #[test]
    fn resolution_failure_shows_error() {
        let mut app = mounted(3);
        let _ = app.update(Message::SequenceResolved(
            app.generation,
            Err(Error::Io(String::from("permission denied"))),
        ));
        assert_eq!(app.navigator.phase(), Phase::Error);
        assert_eq!(
            app.navigator.error_message(),
            Some("I/O error: permission denied")
        );
    }

    #[test]
    fn messages_from_previous_mount_are_dropped() {
        let mut app = ready(3);
        let _ = app.update(Message::Retry);
        assert_eq!(app.generation, 1);
        assert_eq!(app.navigator.phase(), Phase::Loading);

        let _ = app.update(Message::SequenceResolved(0, Ok(ImageSequence::default())));
        assert_eq!(app.navigator.phase(), Phase::Loading);
    }

    #[test]
    fn picking_nothing_keeps_current_mount() {
        let mut app = ready(3);
        let _ = app.update(Message::FilesPicked(Vec::new()));
        assert_eq!(app.generation, 0);
        assert!(app.navigator.is_ready());
    }
}
