pub mod dicom_loader;
pub mod pipeline;
pub mod viewport;

pub use dicom_loader::DicomImageLoader;
pub use viewport::Viewport;

use crate::error::Result;
use crate::model::ImageId;
use iced::widget::image::Handle;
use std::path::Path;

/// One decoded slice, ready to be shown in a [`Viewport`].
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub id: ImageId,
    pub width: u32,
    pub height: u32,
    pub handle: Handle,
}

/// Blocking access to slice pixel data.
///
/// Implementations are called from tokio's blocking pool, one call per slice
/// request.
pub trait ImageLoader: Send + Sync {
    /// Number of frames stored in the file at `path`.
    fn frame_count(&self, path: &Path) -> Result<u32>;

    fn load_image(&self, id: &ImageId) -> Result<DecodedImage>;
}
