use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Where the viewer gets its ordered file list from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FileSource {
    /// `dir/00000001.dcm` through `dir/<count>.dcm`, 8-digit zero padded.
    Numbered { dir: PathBuf, count: usize },
    /// Every `.dcm` file in `dir`, ordered by file name.
    Directory { dir: PathBuf },
    Files { paths: Vec<PathBuf> },
}

impl FileSource {
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        match self {
            FileSource::Numbered { dir, count } => Ok((1..=*count)
                .map(|index| dir.join(format!("{index:08}.dcm")))
                .collect()),
            FileSource::Directory { dir } => {
                let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
                    .filter_map(std::result::Result::ok)
                    .map(|entry| entry.path())
                    .filter(|path| {
                        path.is_file()
                            && path
                                .extension()
                                .and_then(|ext| ext.to_str())
                                .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
                    })
                    .collect();
                paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
                Ok(paths)
            }
            FileSource::Files { paths } => Ok(paths.clone()),
        }
    }
}
