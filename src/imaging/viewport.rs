use super::DecodedImage;

/// Rendering binding of the slice area.
///
/// Enabled once at mount and released exactly once, either by
/// [`Viewport::disable`] or when dropped with the viewer state.
#[derive(Debug)]
pub struct Viewport {
    label: String,
    image: Option<DecodedImage>,
    released: bool,
}

impl Viewport {
    pub fn enable(label: impl Into<String>) -> Self {
        let label = label.into();
        log::debug!("Viewport `{label}` enabled");
        Self {
            label,
            image: None,
            released: false,
        }
    }

    pub fn display(&mut self, image: DecodedImage) {
        self.image = Some(image);
    }

    /// Currently displayed slice, if any.
    pub fn image(&self) -> Option<&DecodedImage> {
        self.image.as_ref()
    }

    pub fn disable(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.image = None;
        log::debug!("Viewport `{}` released", self.label);
    }
}

impl Drop for Viewport {
    fn drop(&mut self) {
        self.release();
    }
}
