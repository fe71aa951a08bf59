//! Replaced content lookup.
//!
//! Layout only needs intrinsic dimensions. Decoding and drawing stay with the
//! caller; a failed lookup is a warning and a zero-size box.

use std::collections::HashMap;

/// Intrinsic dimensions of an image.
///
/// [§ 5.1 Intrinsic Sizes](https://www.w3.org/TR/css-images-3/#intrinsic-dimensions)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntrinsicImage {
    /// Natural width in px.
    pub width: Option<f32>,
    /// Natural height in px.
    pub height: Option<f32>,
    /// Natural width over natural height.
    pub ratio: Option<f32>,
}

impl IntrinsicImage {
    /// An image with both natural dimensions.
    #[must_use]
    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ratio: (height > 0.0).then(|| width / height),
        }
    }
}

/// Where replaced content comes from.
pub trait ImageProvider {
    /// Intrinsic dimensions for `uri`, `None` when it cannot be loaded.
    fn get_image(&self, uri: &str) -> Option<IntrinsicImage>;
}

/// Images registered up front, by URI.
#[derive(Debug, Clone, Default)]
pub struct ImageMap {
    images: HashMap<String, IntrinsicImage>,
}

impl ImageMap {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image.
    #[must_use]
    pub fn with(mut self, uri: &str, image: IntrinsicImage) -> Self {
        let _ = self.images.insert(uri.to_string(), image);
        self
    }
}

impl ImageProvider for ImageMap {
    fn get_image(&self, uri: &str) -> Option<IntrinsicImage> {
        self.images.get(uri).copied()
    }
}

/// Provider that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImages;

impl ImageProvider for NoImages {
    fn get_image(&self, _uri: &str) -> Option<IntrinsicImage> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_lookup() {
        let map = ImageMap::new().with("a.png", IntrinsicImage::sized(40.0, 20.0));
        assert_eq!(map.get_image("a.png").and_then(|i| i.ratio), Some(2.0));
        assert!(map.get_image("b.png").is_none());
        assert!(NoImages.get_image("a.png").is_none());
    }
}
