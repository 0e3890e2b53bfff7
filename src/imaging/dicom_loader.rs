use super::pipeline::FramePipeline;
use super::{DecodedImage, ImageLoader};
use crate::config::ImagingConfig;
use crate::error::{Error, Result};
use crate::model::ImageId;
use dicom::dictionary_std::tags;
use dicom::object::{open_file, DefaultDicomObject};
use dicom::pixeldata::PixelDecoder;
use iced::widget::image::Handle;
use std::path::Path;

/// [`ImageLoader`] reading DICOM files from disk through dicom-rs.
pub struct DicomImageLoader {
    pipeline: FramePipeline,
}

impl DicomImageLoader {
    pub fn new(config: &ImagingConfig) -> Self {
        Self {
            pipeline: FramePipeline::new(config.voi_lut),
        }
    }
}

impl ImageLoader for DicomImageLoader {
    fn frame_count(&self, path: &Path) -> Result<u32> {
        let object = open(path)?;
        Ok(number_of_frames(&object).unwrap_or(1))
    }

    fn load_image(&self, id: &ImageId) -> Result<DecodedImage> {
        log::debug!("Loading {id}");
        let object = open(id.path())?;
        let decoded = object
            .decode_pixel_data()
            .map_err(|err| Error::Decode(format!("Failed to decode pixel data: {err}")))?;

        let frame = self
            .pipeline
            .render(&decoded, id.frame_index().unwrap_or(0))?;

        Ok(DecodedImage {
            id: id.clone(),
            width: frame.width,
            height: frame.height,
            handle: Handle::from_rgba(frame.width, frame.height, frame.pixels),
        })
    }
}

fn open(path: &Path) -> Result<DefaultDicomObject> {
    open_file(path).map_err(|err| Error::dicom(path, err))
}

fn number_of_frames(object: &DefaultDicomObject) -> Option<u32> {
    object
        .element(tags::NUMBER_OF_FRAMES)
        .ok()
        .and_then(|element| element.to_int::<u32>().ok())
}
