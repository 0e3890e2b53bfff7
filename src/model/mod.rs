pub mod image_id;
pub mod sequence;
pub mod source;

pub use image_id::ImageId;
pub use sequence::{resolve_sequence, ImageSequence};
pub use source::FileSource;
