//! Inline preview images for media files.
//!
//! Previews are handed to the explorer as `data:` URLs so a record stays a
//! plain string triple no matter where its icon came from.

use anyhow::{Context, Result};
use base64::Engine as _;
use id3::TagLike;
use image::{DynamicImage, GenericImageView, ImageFormat};
use log::debug;
use std::io::Cursor;
use std::path::Path;

use crate::constants::PREVIEW_FRAME_SECOND;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewSettings {
    /// Largest edge of a generated thumbnail; `None` keeps the source bytes.
    pub thumbnail_size: Option<u32>,
    /// Offset into a video where the preview frame is taken.
    pub frame_second: f64,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            thumbnail_size: None,
            frame_second: PREVIEW_FRAME_SECOND,
        }
    }
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .context("Failed to encode preview")?;
    Ok(buffer.into_inner())
}

/// Encodes `contents` as a preview, shrinking it first when it is larger than
/// the configured thumbnail size and the image decoder understands it.
fn encoded_preview(mime: &str, contents: &[u8], settings: &PreviewSettings) -> Result<String> {
    if let Some(size) = settings.thumbnail_size {
        match image::load_from_memory(contents) {
            Ok(decoded) => {
                let (width, height) = decoded.dimensions();
                if width > size || height > size {
                    let png = encode_png(&decoded.thumbnail(size, size))?;
                    return Ok(data_url(mime::IMAGE_PNG.essence_str(), &png));
                }
            }
            Err(e) => debug!("Keeping original bytes for {mime} preview: {e}"),
        }
    }

    Ok(data_url(mime, contents))
}

pub fn image_preview(extension: &str, contents: &[u8], settings: &PreviewSettings) -> Result<String> {
    let mime = mime_guess::from_ext(extension.trim_start_matches('.')).first_or_octet_stream();
    encoded_preview(mime.essence_str(), contents, settings)
}

/// Cover art embedded in the ID3 tags of an MP3, front cover first.
pub fn audio_cover(contents: &[u8], settings: &PreviewSettings) -> Result<Option<String>> {
    let tag = match id3::Tag::read_from2(Cursor::new(contents)) {
        Ok(tag) => tag,
        Err(e) if matches!(e.kind, id3::ErrorKind::NoTag) => return Ok(None),
        Err(e) => return Err(e).context("Failed to read ID3 tags"),
    };

    let cover = tag
        .pictures()
        .find(|picture| picture.picture_type == id3::frame::PictureType::CoverFront)
        .or_else(|| tag.pictures().next());

    let Some(cover) = cover else {
        return Ok(None);
    };

    let mime = if cover.mime_type.is_empty() {
        mime::IMAGE_JPEG.essence_str()
    } else {
        cover.mime_type.as_str()
    };

    encoded_preview(mime, &cover.data, settings).map(Some)
}

/// One frame of a video on the host, encoded as PNG.
#[cfg(feature = "video-preview")]
pub fn video_frame(host_path: Option<&Path>, settings: &PreviewSettings) -> Result<Option<String>> {
    let Some(path) = host_path else {
        debug!("Video preview needs a host path");
        return Ok(None);
    };

    let frame = video::decode_frame(path, settings.frame_second)?;
    let png = encode_png(&frame)?;
    encoded_preview(mime::IMAGE_PNG.essence_str(), &png, settings).map(Some)
}

#[cfg(not(feature = "video-preview"))]
pub fn video_frame(host_path: Option<&Path>, _settings: &PreviewSettings) -> Result<Option<String>> {
    if let Some(path) = host_path {
        debug!(
            "Built without video-preview; no frame for {}",
            path.display()
        );
    }
    Ok(None)
}

/// Whether a decoded frame with this timestamp, in `time_base` seconds per
/// tick, is at or past `second`. Frames without a timestamp count as reached.
#[cfg_attr(not(feature = "video-preview"), allow(dead_code))]
fn frame_reaches(timestamp: Option<i64>, time_base: f64, second: f64) -> bool {
    timestamp.map_or(true, |ticks| ticks as f64 * time_base >= second)
}

#[cfg(feature = "video-preview")]
mod video {
    use anyhow::{Context, Result};
    use image::{DynamicImage, RgbaImage};
    use log::debug;
    use std::path::Path;
    use std::sync::Once;

    static FFMPEG_INIT: Once = Once::new();

    fn init_ffmpeg() -> Result<()> {
        let mut init_result = Ok(());

        FFMPEG_INIT.call_once(|| {
            if let Err(e) = ffmpeg_next::init() {
                init_result = Err(anyhow::anyhow!("FFmpeg initialization failed: {e}"));
                return;
            }

            // SAFETY: av_log_set_level only changes the global log threshold.
            unsafe {
                ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_ERROR);
            }
        });

        init_result
    }

    /// Decodes the first frame at or after `second`, or the last frame of the
    /// stream when the video is shorter than that.
    pub(super) fn decode_frame(path: &Path, second: f64) -> Result<DynamicImage> {
        init_ffmpeg()?;

        let mut ictx = ffmpeg_next::format::input(&path)
            .with_context(|| format!("Failed to open video file: {}", path.display()))?;

        let timestamp = (second * ffmpeg_next::ffi::AV_TIME_BASE as f64) as i64;
        if let Err(e) = ictx.seek(timestamp, ..timestamp) {
            debug!("Seek to {second}s failed, decoding from the start: {e}");
        }

        let input = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| anyhow::anyhow!("No video stream found"))?;
        let stream_index = input.index();
        let time_base = f64::from(input.time_base());

        let context = ffmpeg_next::codec::context::Context::from_parameters(input.parameters())
            .context("Failed to create codec context")?;
        let mut decoder = context
            .decoder()
            .video()
            .context("Failed to create video decoder")?;

        let (width, height) = (decoder.width(), decoder.height());
        if width == 0 || height == 0 {
            anyhow::bail!("Invalid video dimensions: {width}x{height}");
        }

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGBA,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .context("Failed to create scaler")?;

        let mut decoded = ffmpeg_next::frame::Video::empty();
        let mut rgba = ffmpeg_next::frame::Video::empty();
        let mut last = ffmpeg_next::frame::Video::empty();
        let mut have_last = false;
        let mut reached = false;

        // The seek lands on the keyframe before `second`; decode forward from there.
        'packets: for (stream, packet) in ictx.packets() {
            if stream.index() != stream_index {
                continue;
            }
            decoder
                .send_packet(&packet)
                .context("Failed to send packet")?;
            while decoder.receive_frame(&mut decoded).is_ok() {
                if super::frame_reaches(decoded.timestamp().or(decoded.pts()), time_base, second) {
                    reached = true;
                    break 'packets;
                }
                std::mem::swap(&mut decoded, &mut last);
                have_last = true;
            }
        }

        if !reached {
            decoder.send_eof().context("Failed to flush decoder")?;
            while decoder.receive_frame(&mut decoded).is_ok() {
                if super::frame_reaches(decoded.timestamp().or(decoded.pts()), time_base, second) {
                    reached = true;
                    break;
                }
                std::mem::swap(&mut decoded, &mut last);
                have_last = true;
            }
        }

        let frame = if reached {
            &decoded
        } else if have_last {
            debug!("{} ends before {second}s, using its last frame", path.display());
            &last
        } else {
            anyhow::bail!("Could not decode a frame from {}", path.display());
        };

        scaler
            .run(frame, &mut rgba)
            .context("Failed to scale frame")?;

        let stride = rgba.stride(0);
        let data = rgba.data(0);
        let row_len = width as usize * 4;
        let mut pixels = Vec::with_capacity(row_len * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            pixels.extend_from_slice(&data[start..start + row_len]);
        }

        let image = RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| anyhow::anyhow!("Frame buffer does not match {width}x{height}"))?;
        Ok(DynamicImage::ImageRgba8(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use id3::frame::{Picture, PictureType};
    use image::{Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
        encode_png(&DynamicImage::ImageRgba8(image)).unwrap()
    }

    fn decode_data_url(url: &str) -> (String, Vec<u8>) {
        let rest = url.strip_prefix("data:").unwrap();
        let (mime, payload) = rest.split_once(";base64,").unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .unwrap();
        (mime.to_string(), bytes)
    }

    fn mp3_with_pictures(pictures: Vec<Picture>) -> Vec<u8> {
        let mut tag = id3::Tag::new();
        tag.set_title("Track");
        for picture in pictures {
            tag.add_frame(picture);
        }
        let mut bytes = Vec::new();
        tag.write_to(&mut bytes, id3::Version::Id3v24).unwrap();
        bytes.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
        bytes
    }

    fn picture(picture_type: PictureType, data: &[u8]) -> Picture {
        Picture {
            mime_type: "image/png".to_string(),
            picture_type,
            description: String::new(),
            data: data.to_vec(),
        }
    }

    #[test]
    fn test_data_url_encodes_base64() {
        assert_eq!(data_url("text/plain", b"hi"), "data:text/plain;base64,aGk=");
    }

    #[test]
    fn test_image_preview_keeps_source_without_thumbnail_size() {
        let source = png_bytes(4, 4);
        let url = image_preview(".png", &source, &PreviewSettings::default()).unwrap();
        let (mime, bytes) = decode_data_url(&url);
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, source);
    }

    #[test]
    fn test_image_preview_shrinks_large_images() {
        let settings = PreviewSettings {
            thumbnail_size: Some(16),
            ..PreviewSettings::default()
        };
        let url = image_preview(".png", &png_bytes(64, 32), &settings).unwrap();
        let (mime, bytes) = decode_data_url(&url);
        assert_eq!(mime, "image/png");

        let thumbnail = image::load_from_memory(&bytes).unwrap();
        assert_eq!(thumbnail.dimensions(), (16, 8));
    }

    #[test]
    fn test_image_preview_keeps_undecodable_images() {
        let settings = PreviewSettings {
            thumbnail_size: Some(16),
            ..PreviewSettings::default()
        };
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64"/>"#;
        let url = image_preview(".svg", svg, &settings).unwrap();
        let (mime, bytes) = decode_data_url(&url);
        assert_eq!(mime, "image/svg+xml");
        assert_eq!(bytes, svg.to_vec());
    }

    #[test]
    fn test_audio_cover_prefers_front_cover() {
        let contents = mp3_with_pictures(vec![
            picture(PictureType::Artist, b"artist"),
            picture(PictureType::CoverFront, b"front"),
        ]);

        let url = audio_cover(&contents, &PreviewSettings::default())
            .unwrap()
            .unwrap();
        assert_eq!(decode_data_url(&url), ("image/png".to_string(), b"front".to_vec()));
    }

    #[test]
    fn test_audio_cover_falls_back_to_first_picture() {
        let contents = mp3_with_pictures(vec![picture(PictureType::Artist, b"artist")]);

        let url = audio_cover(&contents, &PreviewSettings::default())
            .unwrap()
            .unwrap();
        assert_eq!(decode_data_url(&url).1, b"artist".to_vec());
    }

    #[test]
    fn test_audio_without_tags_has_no_cover() {
        let cover = audio_cover(b"plain audio frames", &PreviewSettings::default()).unwrap();
        assert!(cover.is_none());

        let contents = mp3_with_pictures(Vec::new());
        assert!(audio_cover(&contents, &PreviewSettings::default())
            .unwrap()
            .is_none());
    }

    #[cfg(not(feature = "video-preview"))]
    #[test]
    fn test_frame_before_preview_second_is_skipped() {
        // A keyframe at 0s followed by frames up to the 3s mark.
        let time_base = 1.0 / 512.0;
        assert!(!frame_reaches(Some(0), time_base, 3.0));
        assert!(!frame_reaches(Some(1535), time_base, 3.0));
        assert!(frame_reaches(Some(1536), time_base, 3.0));
        assert!(frame_reaches(Some(2048), time_base, 3.0));
        assert!(frame_reaches(None, time_base, 3.0));
    }

    #[cfg(not(feature = "video-preview"))]
    #[test]
    fn test_video_frame_is_unavailable_without_feature() {
        let frame = video_frame(Some(Path::new("/tmp/clip.mp4")), &PreviewSettings::default());
        assert!(frame.unwrap().is_none());
    }
}
