//! Decoding embedded image payloads to files.
//!
//! Label files carry the image as base64 text. Both the standard and the
//! URL-safe alphabet are accepted, padding is optional, and line breaks
//! inside the payload are ignored.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use log::debug;

use crate::error::LabelcocoError;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// What was written for one image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Materialized {
    pub bytes_written: usize,
    /// Width and height read from the image header, when the format is known.
    pub header_dimensions: Option<(u32, u32)>,
}

/// Decodes a base64 payload, trying the standard alphabet first and the
/// URL-safe alphabet second.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, String> {
    let compact: Vec<u8> = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    match STANDARD_LENIENT.decode(&compact) {
        Ok(bytes) => Ok(bytes),
        Err(standard_err) => URL_SAFE_LENIENT.decode(&compact).map_err(|url_safe_err| {
            format!("not valid base64 (standard: {standard_err}; url-safe: {url_safe_err})")
        }),
    }
}

/// Decodes `payload` and writes it to `destination`.
///
/// The payload is fully decoded before the destination is touched, and a
/// failed write removes whatever was partially written.
///
/// # Errors
/// Returns [`LabelcocoError::Materialize`] if the payload decodes under
/// neither alphabet or the file cannot be written.
pub fn materialize(payload: &str, destination: &Path) -> Result<Materialized, LabelcocoError> {
    let materialize_error = |reason: String| LabelcocoError::Materialize {
        path: destination.to_path_buf(),
        reason,
    };

    let bytes = decode_payload(payload).map_err(materialize_error)?;

    if let Err(source) = write_all(destination, &bytes) {
        if destination.exists() {
            let _ = fs::remove_file(destination);
        }
        return Err(materialize_error(source.to_string()));
    }

    let header_dimensions = imagesize::blob_size(&bytes)
        .ok()
        .and_then(|size| Some((u32::try_from(size.width).ok()?, u32::try_from(size.height).ok()?)));

    debug!("wrote {} byte(s) to {}", bytes.len(), destination.display());
    Ok(Materialized {
        bytes_written: bytes.len(),
        header_dimensions,
    })
}

fn write_all(destination: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(destination)?;
    file.write_all(bytes)?;
    file.flush()
}

/// Where the image named `image_path` is written inside `output_dir`.
///
/// Only the final component of `image_path` is kept, with `/` and `\` both
/// treated as separators, so a recorded `..\images\0001.jpg` still lands in
/// `output_dir`.
pub fn image_destination(output_dir: &Path, image_path: &str) -> Result<PathBuf, String> {
    let file_name = image_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if file_name.is_empty() || file_name == "." || file_name == ".." {
        return Err(format!("'imagePath' {image_path:?} does not name a file"));
    }
    Ok(output_dir.join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

    // 1x1 GIF
    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\x00\x00\x00\xff\xff\xff!\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";

    #[test]
    fn decodes_standard_and_url_safe() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        assert_eq!(decode_payload(&STANDARD.encode(&bytes)).unwrap(), bytes);
        assert_eq!(decode_payload(&URL_SAFE_NO_PAD.encode(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn decoding_ignores_line_breaks() {
        let encoded = STANDARD.encode(b"some image bytes, long enough to wrap");
        let wrapped = format!("{}\n{}\r\n", &encoded[..10], &encoded[10..]);
        assert_eq!(
            decode_payload(&wrapped).unwrap(),
            b"some image bytes, long enough to wrap"
        );
    }

    #[test]
    fn rejects_garbage() {
        let reason = decode_payload("not base64 at all!!").unwrap_err();
        assert!(reason.contains("url-safe"));
    }

    #[test]
    fn materialize_writes_file_and_reads_header() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dest = temp.path().join("pixel.gif");

        let result = materialize(&STANDARD.encode(GIF), &dest).expect("materialize");
        assert_eq!(result.bytes_written, GIF.len());
        assert_eq!(result.header_dimensions, Some((1, 1)));
        assert_eq!(fs::read(&dest).unwrap(), GIF);
    }

    #[test]
    fn undecodable_payload_creates_no_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dest = temp.path().join("broken.jpg");

        let err = materialize("%%%", &dest).unwrap_err();
        assert!(matches!(err, LabelcocoError::Materialize { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn unwritable_destination_is_an_error() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dest = temp.path().join("missing-dir").join("a.jpg");

        let err = materialize(&STANDARD.encode(GIF), &dest).unwrap_err();
        assert!(err.to_string().contains("a.jpg"));
    }

    #[test]
    fn destination_keeps_only_file_name() {
        let out = Path::new("out");
        assert_eq!(image_destination(out, "0001.jpg").unwrap(), out.join("0001.jpg"));
        assert_eq!(
            image_destination(out, "../images/0002.jpg").unwrap(),
            out.join("0002.jpg")
        );
        assert_eq!(
            image_destination(out, "..\\images\\0003.png").unwrap(),
            out.join("0003.png")
        );
        assert!(image_destination(out, "images/").is_err());
        assert!(image_destination(out, "..").is_err());
    }
}
