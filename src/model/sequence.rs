use super::ImageId;
use crate::imaging::ImageLoader;
use std::path::PathBuf;

/// Ordered identifiers, one per displayable slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSequence {
    ids: Vec<ImageId>,
}

impl ImageSequence {
    pub fn new(ids: Vec<ImageId>) -> Self {
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageId> {
        self.ids.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageId> {
        self.ids.iter()
    }
}

/// Turns a file list into an [`ImageSequence`], keeping input order.
///
/// With `expand_multiframe`, a file reporting more than one frame contributes
/// one id per frame. A file whose frame count cannot be read still gets its
/// base id so slice numbering stays stable; loading that slice reports the
/// failure later.
pub fn resolve_sequence(
    files: &[PathBuf],
    probe: &dyn ImageLoader,
    expand_multiframe: bool,
) -> ImageSequence {
    let mut ids = Vec::with_capacity(files.len());

    for path in files {
        if !expand_multiframe {
            ids.push(ImageId::file(path));
            continue;
        }

        match probe.frame_count(path) {
            Ok(frames) if frames > 1 => {
                log::debug!("{}: expanding {frames} frames", path.display());
                ids.extend((0..frames).map(|frame| ImageId::frame(path, frame)));
            }
            Ok(_) => ids.push(ImageId::file(path)),
            Err(err) => {
                log::error!("Unable to read {}: {err}", path.display());
                ids.push(ImageId::file(path));
            }
        }
    }

    log::info!(
        "Resolved {} slice(s) from {} file(s)",
        ids.len(),
        files.len()
    );
    ImageSequence::new(ids)
}
