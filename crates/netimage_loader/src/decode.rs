use image::GenericImageView;

/// Decoded, display-ready image: tightly packed RGBA8 pixels.
pub struct ImageData {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageData {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Bytes-to-bitmap capability. Failure carries no format detail beyond the
/// underlying decoder's message.
pub trait Decode: Send + Sync + 'static {
    fn decode(&self, data: &[u8]) -> anyhow::Result<ImageData>;
}

/// Default decoder; guesses the container format from the byte content.
pub struct RgbaDecoder;

impl Decode for RgbaDecoder {
    fn decode(&self, data: &[u8]) -> anyhow::Result<ImageData> {
        let image = image::load_from_memory(data)?;
        let (width, height) = image.dimensions();
        Ok(ImageData {
            pixels: image.into_rgba8().into_raw(),
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let decoded = RgbaDecoder.decode(&tiny_png()).unwrap();
        assert_eq!(decoded.dimensions(), (2, 3));
        assert_eq!(decoded.pixels.len(), 2 * 3 * 4);
        assert_eq!(&decoded.pixels[0..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(RgbaDecoder.decode(&[0x00, 0x01, 0x02, 0x03]).is_err());
    }
}
