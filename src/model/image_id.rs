use crate::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const SCHEME: &str = "dicomfile";
const FRAME_SUFFIX: &str = "?frame=";

/// Identifier of one displayable slice: a whole file, or one frame of a
/// multi-frame file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageId {
    path: PathBuf,
    frame: Option<u32>,
}

impl ImageId {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            frame: None,
        }
    }

    pub fn frame(path: impl Into<PathBuf>, frame: u32) -> Self {
        Self {
            path: path.into(),
            frame: Some(frame),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frame index inside the file; `None` addresses the file as a whole.
    pub fn frame_index(&self) -> Option<u32> {
        self.frame
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}:{}", self.path.display())?;
        if let Some(frame) = self.frame {
            write!(f, "{FRAME_SUFFIX}{frame}")?;
        }
        Ok(())
    }
}

impl FromStr for ImageId {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let rest = value
            .strip_prefix(SCHEME)
            .and_then(|rest| rest.strip_prefix(':'))
            .filter(|rest| !rest.is_empty())
            .ok_or_else(|| Error::InvalidImageId(value.to_string()))?;

        match rest.rsplit_once(FRAME_SUFFIX) {
            Some((path, frame)) if !path.is_empty() => {
                let frame = frame
                    .parse::<u32>()
                    .map_err(|_| Error::InvalidImageId(value.to_string()))?;
                Ok(Self::frame(path, frame))
            }
            _ => Ok(Self::file(rest)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_id_has_scheme_prefix() {
        let id = ImageId::file("series/00000001.dcm");
        assert_eq!(id.to_string(), "dicomfile:series/00000001.dcm");
        assert_eq!(id.frame_index(), None);
    }

    #[test]
    fn frame_id_appends_frame_suffix() {
        let id = ImageId::frame("cine.dcm", 4);
        assert_eq!(id.to_string(), "dicomfile:cine.dcm?frame=4");
    }

    #[test]
    fn parses_textual_form() {
        let id: ImageId = "dicomfile:cine.dcm?frame=2".parse().expect("valid id");
        assert_eq!(id.path(), Path::new("cine.dcm"));
        assert_eq!(id.frame_index(), Some(2));

        let id: ImageId = "dicomfile:plain.dcm".parse().expect("valid id");
        assert_eq!(id, ImageId::file("plain.dcm"));
    }

    #[test]
    fn rejects_foreign_scheme_and_bad_frame() {
        assert!("wadouri:a.dcm".parse::<ImageId>().is_err());
        assert!("dicomfile:".parse::<ImageId>().is_err());
        assert!("dicomfile:a.dcm?frame=x".parse::<ImageId>().is_err());
    }
}
