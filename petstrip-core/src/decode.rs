//! Image input: container screening, reading and raster decoding.
//!
//! HEIC/HEIF photos are rejected up front rather than handed to a decoder
//! that cannot read them.

use std::path::Path;

use crate::analysis::PixelBuffer;
use crate::error::{Error, Result};

/// Major brands of the ISO-BMFF `ftyp` box that identify HEIC/HEIF.
const HEIF_BRANDS: [&[u8; 4]; 10] = [
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"hevm", b"hevs", b"mif1", b"msf1",
];

const HEIF_EXTENSIONS: [&str; 2] = ["heic", "heif"];

/// Decodes image bytes into RGBA pixels.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer>;
}

/// Decoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer> {
        let img = image::load_from_memory(bytes).map_err(|e| Error::Decode(e.to_string()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(PixelBuffer::new(width, height, rgba.into_raw()))
    }
}

/// True when the bytes carry a HEIC/HEIF `ftyp` header.
pub fn is_heif(bytes: &[u8]) -> bool {
    bytes.len() >= 12
        && &bytes[4..8] == b"ftyp"
        && HEIF_BRANDS.iter().any(|brand| &bytes[8..12] == brand.as_slice())
}

/// Reject a file name with a HEIC/HEIF extension.
pub fn screen_name(name: Option<&str>) -> Result<()> {
    let heif_name = name
        .and_then(|n| Path::new(n).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            HEIF_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
        .unwrap_or(false);

    if heif_name {
        return Err(heif_rejected());
    }
    Ok(())
}

/// Reject inputs that must not reach the decoder.
pub fn screen_input(bytes: &[u8], name: Option<&str>) -> Result<()> {
    if bytes.is_empty() {
        return Err(Error::Input("Please choose a photo of the test strip.".to_string()));
    }

    screen_name(name)?;
    if is_heif(bytes) {
        return Err(heif_rejected());
    }

    Ok(())
}

fn heif_rejected() -> Error {
    Error::Input(
        "HEIC/HEIF photos are not supported. Please export the photo as JPEG or PNG.".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heic_header() -> Vec<u8> {
        let mut bytes = vec![0, 0, 0, 24];
        bytes.extend_from_slice(b"ftypheic");
        bytes.extend_from_slice(&[0; 12]);
        bytes
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(screen_input(&[], None), Err(Error::Input(_))));
    }

    #[test]
    fn test_heif_signature_rejected() {
        assert!(is_heif(&heic_header()));
        assert!(matches!(screen_input(&heic_header(), None), Err(Error::Input(_))));
    }

    #[test]
    fn test_heif_extension_rejected() {
        assert!(matches!(
            screen_input(b"whatever", Some("IMG_0001.HEIC")),
            Err(Error::Input(_))
        ));
    }

    #[test]
    fn test_other_input_passes_screening() {
        assert!(screen_input(b"\x89PNG\r\n\x1a\n", Some("strip.png")).is_ok());
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = ImageCrateDecoder.decode(b"not an image at all").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_png_decodes_to_rgba() {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let buffer = ImageCrateDecoder.decode(&bytes).unwrap();
        assert_eq!((buffer.width, buffer.height), (3, 2));
        assert_eq!(&buffer.data[0..4], &[10, 20, 30, 255]);
    }
}
