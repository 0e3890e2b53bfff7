use crate::error::{Error, Result};
use dicom::pixeldata::{
    ConvertOptions, DecodedPixelData, PhotometricInterpretation, PlanarConfiguration,
    VoiLutOption,
};

/// RGBA pixels of one rendered frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Renders decoded DICOM frames into 8-bit RGBA buffers.
pub struct FramePipeline {
    voi_lut: bool,
}

impl FramePipeline {
    pub fn new(voi_lut: bool) -> Self {
        Self { voi_lut }
    }

    pub fn render(&self, decoded: &DecodedPixelData<'_>, frame_idx: u32) -> Result<RgbaFrame> {
        if frame_idx >= decoded.number_of_frames() {
            return Err(Error::Decode(format!(
                "Requested frame {frame_idx}, but only {} frame(s) are available",
                decoded.number_of_frames()
            )));
        }

        match decoded.photometric_interpretation() {
            photometric if photometric.is_monochrome() && self.voi_lut => {
                windowed_monochrome(decoded, frame_idx)
            }
            photometric if photometric.is_monochrome() => monochrome(decoded, frame_idx),
            PhotometricInterpretation::Rgb => rgb(decoded, frame_idx),
            other => fallback_to_dynamic(decoded, frame_idx, other.as_str()),
        }
    }
}

fn monochrome(decoded: &DecodedPixelData<'_>, frame_idx: u32) -> Result<RgbaFrame> {
    let width = decoded.columns();
    let height = decoded.rows();
    let invert = matches!(
        decoded.photometric_interpretation(),
        PhotometricInterpretation::Monochrome1
    );

    if decoded.bits_allocated() <= 8 {
        let samples = decoded
            .to_vec_frame::<u8>(frame_idx)
            .map_err(|err| Error::Decode(format!("Failed to materialize frame data: {err}")))?;
        let mut rgba = Vec::with_capacity(samples.len() * 4);
        for &gray in &samples {
            let value = if invert {
                255u8.saturating_sub(gray)
            } else {
                gray
            };
            rgba.extend_from_slice(&[value, value, value, 255]);
        }
        return Ok(RgbaFrame {
            width,
            height,
            pixels: rgba,
        });
    }

    let samples = decoded
        .to_vec_frame::<u16>(frame_idx)
        .map_err(|err| Error::Decode(format!("Failed to materialize frame data: {err}")))?;
    let (min, max) = min_max_u16(&samples).unwrap_or((0, 0));
    let mut rgba = Vec::with_capacity(samples.len() * 4);
    for &value in &samples {
        let mut gray = normalize_u16(value, min, max);
        if invert {
            gray = 255 - gray;
        }
        rgba.extend_from_slice(&[gray, gray, gray, 255]);
    }
    Ok(RgbaFrame {
        width,
        height,
        pixels: rgba,
    })
}

// Applies the modality LUT and the first VOI window stored in the file.
fn windowed_monochrome(decoded: &DecodedPixelData<'_>, frame_idx: u32) -> Result<RgbaFrame> {
    let options = ConvertOptions::new().with_voi_lut(VoiLutOption::Default);
    let image = decoded
        .to_dynamic_image_with_options(frame_idx, &options)
        .map_err(|err| Error::Decode(format!("Failed to apply VOI LUT: {err}")))?;
    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(RgbaFrame {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

fn rgb(decoded: &DecodedPixelData<'_>, frame_idx: u32) -> Result<RgbaFrame> {
    let width = decoded.columns();
    let height = decoded.rows();
    let pixel_count = (width * height) as usize;

    let pixels = if decoded.bits_allocated() <= 8 {
        let samples = decoded
            .to_vec_frame::<u8>(frame_idx)
            .map_err(|err| Error::Decode(format!("Failed to materialize RGB frame: {err}")))?;
        match decoded.planar_configuration() {
            PlanarConfiguration::Standard => rgb_interleaved_to_rgba(&samples)?,
            PlanarConfiguration::PixelFirst => rgb_planar_to_rgba(&samples, pixel_count)?,
        }
    } else {
        let samples = decoded
            .to_vec_frame::<u16>(frame_idx)
            .map_err(|err| Error::Decode(format!("Failed to materialize RGB frame: {err}")))?;
        match decoded.planar_configuration() {
            PlanarConfiguration::Standard => rgb_interleaved_u16_to_rgba(&samples)?,
            PlanarConfiguration::PixelFirst => rgb_planar_u16_to_rgba(&samples, pixel_count)?,
        }
    };

    Ok(RgbaFrame {
        width,
        height,
        pixels,
    })
}

fn fallback_to_dynamic(
    decoded: &DecodedPixelData<'_>,
    frame_idx: u32,
    interpretation: &str,
) -> Result<RgbaFrame> {
    let image = decoded.to_dynamic_image(frame_idx).map_err(|err| {
        Error::Decode(format!(
            "Unsupported photometric interpretation `{interpretation}`: {err}"
        ))
    })?;
    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(RgbaFrame {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

fn rgb_interleaved_to_rgba(samples: &[u8]) -> Result<Vec<u8>> {
    if samples.len() % 3 != 0 {
        return Err(Error::Decode(format!(
            "RGB buffer length {} is not divisible by 3",
            samples.len()
        )));
    }
    Ok(samples
        .chunks_exact(3)
        .flat_map(|chunk| [chunk[0], chunk[1], chunk[2], 255])
        .collect())
}

fn rgb_planar_to_rgba(samples: &[u8], pixel_count: usize) -> Result<Vec<u8>> {
    let (r_plane, g_plane, b_plane) = split_planes(samples, pixel_count)?;

    let mut rgba = Vec::with_capacity(pixel_count * 4);
    for idx in 0..pixel_count {
        rgba.extend_from_slice(&[r_plane[idx], g_plane[idx], b_plane[idx], 255]);
    }
    Ok(rgba)
}

fn rgb_interleaved_u16_to_rgba(samples: &[u16]) -> Result<Vec<u8>> {
    if samples.len() % 3 != 0 {
        return Err(Error::Decode(format!(
            "RGB buffer length {} is not divisible by 3",
            samples.len()
        )));
    }

    let channel = |offset: usize| {
        min_max_u16(&samples.iter().skip(offset).step_by(3).copied().collect::<Vec<_>>())
            .unwrap_or((0, 0))
    };
    let (r_min, r_max) = channel(0);
    let (g_min, g_max) = channel(1);
    let (b_min, b_max) = channel(2);

    Ok(samples
        .chunks_exact(3)
        .flat_map(|chunk| {
            [
                normalize_u16(chunk[0], r_min, r_max),
                normalize_u16(chunk[1], g_min, g_max),
                normalize_u16(chunk[2], b_min, b_max),
                255,
            ]
        })
        .collect())
}

fn rgb_planar_u16_to_rgba(samples: &[u16], pixel_count: usize) -> Result<Vec<u8>> {
    let (r_plane, g_plane, b_plane) = split_planes(samples, pixel_count)?;

    let (r_min, r_max) = min_max_u16(r_plane).unwrap_or((0, 0));
    let (g_min, g_max) = min_max_u16(g_plane).unwrap_or((0, 0));
    let (b_min, b_max) = min_max_u16(b_plane).unwrap_or((0, 0));

    let mut rgba = Vec::with_capacity(pixel_count * 4);
    for idx in 0..pixel_count {
        rgba.extend_from_slice(&[
            normalize_u16(r_plane[idx], r_min, r_max),
            normalize_u16(g_plane[idx], g_min, g_max),
            normalize_u16(b_plane[idx], b_min, b_max),
            255,
        ]);
    }
    Ok(rgba)
}

fn split_planes<T>(samples: &[T], pixel_count: usize) -> Result<(&[T], &[T], &[T])> {
    if samples.len() < pixel_count * 3 {
        return Err(Error::Decode(format!(
            "RGB buffer length {} is too small for {pixel_count} pixels",
            samples.len()
        )));
    }
    let (r_plane, rest) = samples.split_at(pixel_count);
    let (g_plane, rest) = rest.split_at(pixel_count);
    Ok((r_plane, g_plane, &rest[..pixel_count]))
}

fn min_max_u16(values: &[u16]) -> Option<(u16, u16)> {
    values.iter().copied().fold(None, |acc, value| match acc {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
}

fn normalize_u16(value: u16, min: u16, max: u16) -> u8 {
    if max <= min {
        return 0;
    }

    let range = (max - min) as f32;
    let normalized = (value.saturating_sub(min)) as f32 / range;
    (normalized * 255.0).clamp(0.0, 255.0).round() as u8
}
