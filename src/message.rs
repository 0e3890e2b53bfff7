use crate::error::Error;
use crate::model::ImageSequence;
use crate::navigator::LoadOutcome;
use iced::mouse::ScrollDelta;
use std::path::PathBuf;

/// Messages tagged with a mount generation are dropped once the viewer has
/// been remounted.
#[derive(Debug, Clone)]
pub enum Message {
    SequenceResolved(u64, Result<ImageSequence, Error>),
    SliceLoaded(u64, LoadOutcome),
    WheelScrolled(ScrollDelta),
    JumpToSlice(usize),
    DismissNotice,
    Retry,
    PickFiles,
    FilesPicked(Vec<PathBuf>),
}
