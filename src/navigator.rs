//! Slice navigation state machine.
//!
//! The navigator never loads pixels itself. Each operation that needs a slice
//! returns a [`LoadRequest`]; the caller runs it against an [`ImageLoader`]
//! (usually off the UI thread) and hands the [`LoadOutcome`] back through
//! [`SliceNavigator::complete`].
//!
//! Requests are numbered with a monotonically increasing [`RequestId`]. Only
//! the outcome of the most recently issued request is applied; a slower load
//! finishing after a newer request was issued is dropped, so a rapid wheel
//! burst never flashes an older frame over a newer one.

use crate::error::Error;
use crate::imaging::{DecodedImage, ImageLoader, Viewport};
use crate::model::{ImageId, ImageSequence};

pub const INIT_FAILURE_MESSAGE: &str =
    "Failed to load DICOM images. Please check if files exist and are accessible.";
pub const EMPTY_SEQUENCE_MESSAGE: &str = "No DICOM files found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPurpose {
    Initial,
    Navigation,
}

#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub id: RequestId,
    pub purpose: LoadPurpose,
    pub index: usize,
    pub image_id: ImageId,
}

impl LoadRequest {
    pub fn execute(self, loader: &dyn ImageLoader) -> LoadOutcome {
        let result = loader.load_image(&self.image_id);
        LoadOutcome {
            request: self,
            result,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub request: LoadRequest,
    pub result: Result<DecodedImage, Error>,
}

/// What [`SliceNavigator::complete`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Displayed,
    Failed,
    /// A newer request was issued after this one.
    Stale,
    /// The outcome does not match the current phase.
    Ignored,
}

/// A single slice that could not be shown; the viewer stays usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationError {
    pub slice_number: usize,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NavigatorError {
    #[error("viewer has already been initialized")]
    AlreadyInitialized,
    #[error("viewer is not waiting for an image sequence")]
    NotLoading,
}

#[derive(Debug)]
pub struct SliceNavigator {
    phase: Phase,
    sequence: ImageSequence,
    current_index: Option<usize>,
    viewport: Viewport,
    last_request: u64,
    error: Option<String>,
    navigation_error: Option<NavigationError>,
}

impl SliceNavigator {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            phase: Phase::Uninitialized,
            sequence: ImageSequence::default(),
            current_index: None,
            viewport,
            last_request: 0,
            error: None,
            navigation_error: None,
        }
    }

    /// Starts the mount. Allowed once per navigator.
    pub fn initialize(&mut self) -> Result<(), NavigatorError> {
        if self.phase != Phase::Uninitialized {
            return Err(NavigatorError::AlreadyInitialized);
        }
        self.phase = Phase::Loading;
        log::info!("Viewer initializing");
        Ok(())
    }

    /// Installs the resolved sequence and requests the first slice.
    pub fn attach_sequence(
        &mut self,
        sequence: ImageSequence,
    ) -> Result<Option<LoadRequest>, NavigatorError> {
        if self.phase != Phase::Loading {
            return Err(NavigatorError::NotLoading);
        }
        self.sequence = sequence;
        if self.sequence.is_empty() {
            self.fail(EMPTY_SEQUENCE_MESSAGE);
            return Ok(None);
        }
        Ok(self.issue(LoadPurpose::Initial, 0))
    }

    /// Moves a loading viewer into the error phase.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.phase != Phase::Loading {
            return;
        }
        let message = message.into();
        log::error!("Viewer initialization failed: {message}");
        self.phase = Phase::Error;
        self.error = Some(message);
    }

    /// Requests slice `index`. Does not clamp: indexes outside the sequence
    /// issue nothing.
    pub fn go_to(&mut self, index: usize) -> Option<LoadRequest> {
        if self.phase != Phase::Ready {
            return None;
        }
        if index >= self.sequence.len() {
            log::warn!(
                "Ignoring request for slice index {index} of {}",
                self.sequence.len()
            );
            return None;
        }
        self.issue(LoadPurpose::Navigation, index)
    }

    /// Wheel step. A positive `delta` moves toward slice 0.
    pub fn step(&mut self, delta: i32) -> Option<LoadRequest> {
        if self.phase != Phase::Ready || self.sequence.is_empty() {
            return None;
        }
        let current = self.current_index?;
        let last = self.sequence.len() as i64 - 1;
        let next = (current as i64 - i64::from(delta.signum())).clamp(0, last) as usize;
        if next == current {
            return None;
        }
        self.go_to(next)
    }

    /// Jumps to a 1-based slice number; out-of-range numbers are ignored.
    pub fn jump_to_slice_number(&mut self, number: usize) -> Option<LoadRequest> {
        if !self.slice_exists(number) {
            return None;
        }
        self.go_to(number - 1)
    }

    pub fn complete(&mut self, outcome: LoadOutcome) -> Completion {
        let LoadOutcome { request, result } = outcome;
        if request.id != RequestId(self.last_request) {
            log::debug!(
                "Dropping stale load of slice {} ({:?})",
                request.index + 1,
                request.id
            );
            return Completion::Stale;
        }

        match (self.phase, request.purpose) {
            (Phase::Loading, LoadPurpose::Initial) => match result {
                Ok(image) => {
                    self.viewport.display(image);
                    self.current_index = Some(request.index);
                    self.phase = Phase::Ready;
                    log::info!("Viewer ready with {} slice(s)", self.sequence.len());
                    Completion::Displayed
                }
                Err(err) => {
                    log::error!("Error loading first image {}: {err}", request.image_id);
                    self.fail(INIT_FAILURE_MESSAGE);
                    Completion::Failed
                }
            },
            (Phase::Ready, LoadPurpose::Navigation) => match result {
                Ok(image) => {
                    self.viewport.display(image);
                    self.current_index = Some(request.index);
                    self.navigation_error = None;
                    Completion::Displayed
                }
                Err(err) => {
                    log::error!(
                        "Error displaying image at slice {}: {err}",
                        request.index + 1
                    );
                    self.navigation_error = Some(NavigationError {
                        slice_number: request.index + 1,
                        message: err.to_string(),
                    });
                    Completion::Failed
                }
            },
            _ => Completion::Ignored,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn slice_exists(&self, number: usize) -> bool {
        number >= 1 && number <= self.sequence.len()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn navigation_error(&self) -> Option<&NavigationError> {
        self.navigation_error.as_ref()
    }

    pub fn clear_navigation_error(&mut self) {
        self.navigation_error = None;
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Ends the mount, releasing the viewport.
    pub fn unmount(self) {
        log::debug!("Viewer unmounted at slice {:?}", self.current_index);
        self.viewport.disable();
    }

    fn issue(&mut self, purpose: LoadPurpose, index: usize) -> Option<LoadRequest> {
        let image_id = self.sequence.get(index)?.clone();
        self.last_request += 1;
        Some(LoadRequest {
            id: RequestId(self.last_request),
            purpose,
            index,
            image_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use iced::widget::image::Handle;
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};

    #[derive(Default)]
    struct ScriptedLoader {
        broken: HashSet<ImageId>,
    }

    impl ImageLoader for ScriptedLoader {
        fn frame_count(&self, _path: &Path) -> Result<u32> {
            Ok(1)
        }

        fn load_image(&self, id: &ImageId) -> Result<DecodedImage> {
            if self.broken.contains(id) {
                return Err(Error::Decode(format!("cannot decode {id}")));
            }
            Ok(DecodedImage {
                id: id.clone(),
                width: 1,
                height: 1,
                handle: Handle::from_rgba(1, 1, vec![0, 0, 0, 255]),
            })
        }
    }

    fn files(count: usize) -> Vec<PathBuf> {
        (1..=count).map(|i| PathBuf::from(format!("f{i}.dcm"))).collect()
    }

    fn sequence(count: usize) -> ImageSequence {
        ImageSequence::new(files(count).into_iter().map(ImageId::file).collect())
    }

    fn settle(
        navigator: &mut SliceNavigator,
        loader: &ScriptedLoader,
        request: Option<LoadRequest>,
    ) -> Option<Completion> {
        request.map(|request| navigator.complete(request.execute(loader)))
    }

    fn ready(count: usize, loader: &ScriptedLoader) -> SliceNavigator {
        let mut navigator = SliceNavigator::new(Viewport::enable("test"));
        navigator.initialize().expect("first initialize");
        let request = navigator
            .attach_sequence(sequence(count))
            .expect("loading phase");
        assert_eq!(
            settle(&mut navigator, loader, request),
            Some(Completion::Displayed)
        );
        navigator
    }

    fn displayed(navigator: &SliceNavigator) -> Option<ImageId> {
        navigator.viewport().image().map(|image| image.id.clone())
    }

    #[test]
    fn initialize_displays_first_slice() {
        let loader = ScriptedLoader::default();
        let navigator = ready(5, &loader);

        assert!(navigator.is_ready());
        assert_eq!(navigator.current_index(), Some(0));
        assert_eq!(navigator.len(), 5);
        assert_eq!(displayed(&navigator), Some(ImageId::file("f1.dcm")));
    }

    #[test]
    fn initialize_twice_is_rejected() {
        let loader = ScriptedLoader::default();
        let mut navigator = ready(2, &loader);
        assert_eq!(
            navigator.initialize(),
            Err(NavigatorError::AlreadyInitialized)
        );

        let mut fresh = SliceNavigator::new(Viewport::enable("fresh"));
        fresh.initialize().expect("first initialize");
        assert_eq!(fresh.initialize(), Err(NavigatorError::AlreadyInitialized));
    }

    #[test]
    fn sequence_requires_loading_phase() {
        let mut navigator = SliceNavigator::new(Viewport::enable("test"));
        assert_eq!(
            navigator.attach_sequence(sequence(1)).unwrap_err(),
            NavigatorError::NotLoading
        );
    }

    #[test]
    fn first_slice_failure_enters_error() {
        let mut loader = ScriptedLoader::default();
        loader.broken.insert(ImageId::file("f1.dcm"));

        let mut navigator = SliceNavigator::new(Viewport::enable("test"));
        navigator.initialize().expect("first initialize");
        let request = navigator.attach_sequence(sequence(3)).expect("loading");
        assert_eq!(
            settle(&mut navigator, &loader, request),
            Some(Completion::Failed)
        );

        assert_eq!(navigator.phase(), Phase::Error);
        assert_eq!(navigator.current_index(), None);
        assert_eq!(navigator.error_message(), Some(INIT_FAILURE_MESSAGE));
        assert!(navigator.viewport().image().is_none());
        assert!(navigator.jump_to_slice_number(2).is_none());
    }

    #[test]
    fn empty_sequence_enters_error() {
        let mut navigator = SliceNavigator::new(Viewport::enable("test"));
        navigator.initialize().expect("first initialize");
        let request = navigator
            .attach_sequence(ImageSequence::default())
            .expect("loading");

        assert!(request.is_none());
        assert_eq!(navigator.phase(), Phase::Error);
        assert_eq!(navigator.error_message(), Some(EMPTY_SEQUENCE_MESSAGE));
    }

    #[test]
    fn navigation_is_inert_before_ready() {
        let mut navigator = SliceNavigator::new(Viewport::enable("test"));
        assert!(navigator.go_to(0).is_none());
        assert!(navigator.step(-1).is_none());
        assert!(navigator.jump_to_slice_number(1).is_none());
    }

    #[test]
    fn jump_reaches_every_valid_slice_number() {
        let loader = ScriptedLoader::default();
        let mut navigator = ready(12, &loader);

        for number in 1..=12 {
            let request = navigator.jump_to_slice_number(number);
            assert_eq!(
                settle(&mut navigator, &loader, request),
                Some(Completion::Displayed)
            );
            assert_eq!(navigator.current_index(), Some(number - 1));
        }
    }

    #[test]
    fn jump_outside_range_is_ignored() {
        let loader = ScriptedLoader::default();
        let mut navigator = ready(5, &loader);
        let request = navigator.jump_to_slice_number(3);
        settle(&mut navigator, &loader, request);

        for number in [0, 6, 100] {
            assert!(navigator.jump_to_slice_number(number).is_none());
            assert_eq!(navigator.current_index(), Some(2));
        }
    }

    #[test]
    fn go_to_does_not_clamp() {
        let loader = ScriptedLoader::default();
        let mut navigator = ready(3, &loader);
        assert!(navigator.go_to(3).is_none());
        assert_eq!(navigator.current_index(), Some(0));
    }

    #[test]
    fn step_is_clamped_at_both_ends() {
        let loader = ScriptedLoader::default();
        let mut navigator = ready(4, &loader);

        assert!(navigator.step(1).is_none());
        assert_eq!(navigator.current_index(), Some(0));

        let request = navigator.jump_to_slice_number(4);
        settle(&mut navigator, &loader, request);
        assert!(navigator.step(-1).is_none());
        assert_eq!(navigator.current_index(), Some(3));
    }

    #[test]
    fn five_file_walkthrough() {
        let loader = ScriptedLoader::default();
        let mut navigator = ready(5, &loader);
        assert_eq!(navigator.current_index(), Some(0));
        assert_eq!(navigator.len(), 5);

        let request = navigator.jump_to_slice_number(5);
        settle(&mut navigator, &loader, request);
        assert_eq!(navigator.current_index(), Some(4));

        assert!(navigator.step(-1).is_none());
        assert_eq!(navigator.current_index(), Some(4));

        for _ in 0..2 {
            let request = navigator.step(1);
            settle(&mut navigator, &loader, request);
        }
        assert_eq!(navigator.current_index(), Some(2));
        assert_eq!(displayed(&navigator), Some(ImageId::file("f3.dcm")));
    }

    #[test]
    fn navigation_failure_keeps_viewer_usable() {
        let mut loader = ScriptedLoader::default();
        loader.broken.insert(ImageId::file("f3.dcm"));
        let mut navigator = ready(5, &loader);

        let request = navigator.jump_to_slice_number(3);
        assert_eq!(
            settle(&mut navigator, &loader, request),
            Some(Completion::Failed)
        );
        assert!(navigator.is_ready());
        assert_eq!(navigator.current_index(), Some(0));
        assert_eq!(displayed(&navigator), Some(ImageId::file("f1.dcm")));
        let failure = navigator.navigation_error().expect("failure surfaced");
        assert_eq!(failure.slice_number, 3);

        let request = navigator.jump_to_slice_number(4);
        settle(&mut navigator, &loader, request);
        assert_eq!(navigator.current_index(), Some(3));
        assert!(navigator.navigation_error().is_none());
    }

    #[test]
    fn stale_outcome_is_dropped() {
        let loader = ScriptedLoader::default();
        let mut navigator = ready(10, &loader);

        let slow = navigator.jump_to_slice_number(2).expect("valid slice");
        let fast = navigator.jump_to_slice_number(7).expect("valid slice");
        assert!(fast.id > slow.id);

        assert_eq!(
            navigator.complete(fast.execute(&loader)),
            Completion::Displayed
        );
        assert_eq!(
            navigator.complete(slow.execute(&loader)),
            Completion::Stale
        );
        assert_eq!(navigator.current_index(), Some(6));
        assert_eq!(displayed(&navigator), Some(ImageId::file("f7.dcm")));
    }
}
