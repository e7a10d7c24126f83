use glam::{vec2, Vec2};

use crate::{Color, Rect};

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("pixel buffer holds {actual} bytes but a {width}x{height} RGBA image needs {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[cfg(feature = "png")]
    #[error(transparent)]
    Decode(#[from] ::image::ImageError),
}

/// An RGBA8 image, unpremultiplied.
///
/// Used both as the source of `draw_image` and as the
/// result of reading pixels back from a surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Image {
    /// Creates an image from tightly packed RGBA8 rows.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(ImageError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates an image filled with one color.
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let data = color
            .to_array()
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Collects row-major pixels. Missing pixels are transparent.
    pub(crate) fn from_pixels(
        width: u32,
        height: u32,
        pixels: impl IntoIterator<Item = Color>,
    ) -> Self {
        let len = width as usize * height as usize * 4;
        let mut data: Vec<u8> = pixels
            .into_iter()
            .flat_map(|pixel| pixel.to_array())
            .take(len)
            .collect();
        data.resize(len, 0);
        Self {
            width,
            height,
            data,
        }
    }

    /// Decodes an encoded image (PNG).
    #[cfg(feature = "png")]
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        let rgba = ::image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        vec2(self.width as f32, self.height as f32)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize * self.width as usize + x as usize) * 4;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.data[index..index + 4]);
        Some(Color::from_array(rgba))
    }
}

/// Where to put an image, mirroring the three forms of the
/// canvas `drawImage` call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ImagePlacement {
    /// Draws the whole image at its natural size with its top-left at the given point.
    At(Vec2),
    /// Draws the whole image scaled into the destination rectangle.
    Scaled(Rect),
    /// Draws the `source` region of the image scaled into `destination`.
    Cropped { source: Rect, destination: Rect },
}

impl ImagePlacement {
    /// The region of the image that is sampled.
    pub fn source(&self, image_size: Vec2) -> Rect {
        match *self {
            ImagePlacement::At(_) | ImagePlacement::Scaled(_) => Rect::new(Vec2::ZERO, image_size),
            ImagePlacement::Cropped { source, .. } => source,
        }
    }

    /// The rectangle the image covers, in user space.
    pub fn destination(&self, image_size: Vec2) -> Rect {
        match *self {
            ImagePlacement::At(pos) => Rect::new(pos, image_size),
            ImagePlacement::Scaled(destination) => destination,
            ImagePlacement::Cropped { destination, .. } => destination,
        }
    }
}
