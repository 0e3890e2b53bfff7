use crate::error::{Error, Result};
use crate::model::FileSource;
use pico_args::Arguments;
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: slicestack [--config FILE] [--count N] [PATH...]

  PATH           a directory of .dcm files, or one or more DICOM files
  --count N      treat the directory as 00000001.dcm ... N, zero padded to 8 digits
  --config FILE  settings file to use instead of the platform default
";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub help: bool,
    pub config: Option<PathBuf>,
    pub source: Option<FileSource>,
}

pub fn parse(mut args: Arguments) -> Result<CliArgs> {
    let help = args.contains(["-h", "--help"]);
    let config = args
        .opt_value_from_str::<_, PathBuf>("--config")
        .map_err(|err| Error::Config(err.to_string()))?;
    let count = args
        .opt_value_from_str::<_, usize>("--count")
        .map_err(|err| Error::Config(err.to_string()))?;
    let paths: Vec<PathBuf> = args.finish().into_iter().map(PathBuf::from).collect();

    let source = match (paths.as_slice(), count) {
        ([], None) => None,
        ([dir], Some(count)) => Some(FileSource::Numbered {
            dir: dir.clone(),
            count,
        }),
        (_, Some(_)) => {
            return Err(Error::Config(String::from(
                "--count expects exactly one directory",
            )))
        }
        ([dir], None) if dir.is_dir() => Some(FileSource::Directory { dir: dir.clone() }),
        (paths, None) => Some(FileSource::Files {
            paths: paths.to_vec(),
        }),
    };

    Ok(CliArgs {
        help,
        config,
        source,
    })
}
