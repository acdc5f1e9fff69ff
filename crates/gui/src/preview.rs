//! Conversion of images into egui textures.

use image::{imageops::FilterType, DynamicImage};

/// Longest side of an uploaded preview texture.
pub const MAX_PREVIEW_SIDE: u32 = 1024;

/// RGBA pixels for egui, downscaled so the longer side fits `max_side`.
pub fn color_image(img: &DynamicImage, max_side: u32) -> egui::ColorImage {
    let img = if img.width() > max_side || img.height() > max_side {
        img.resize(max_side, max_side, FilterType::Triangle)
    } else {
        img.clone()
    };
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw())
}

/// Size that fits `(w, h)` into `avail` width without upscaling.
pub fn display_size(w: u32, h: u32, avail_width: f32) -> egui::Vec2 {
    let (w, h) = (w.max(1) as f32, h.max(1) as f32);
    let k = (avail_width / w).min(1.0);
    egui::vec2(w * k, h * k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_small_image_kept() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 3, Rgba([1, 2, 3, 4])));
        let c = color_image(&img, MAX_PREVIEW_SIDE);
        assert_eq!(c.size, [4, 3]);
        assert_eq!(c.pixels.len(), 12);
    }

    #[test]
    fn test_large_image_downscaled() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(2000, 500));
        let c = color_image(&img, 1000);
        assert_eq!(c.size, [1000, 250]);
    }

    #[test]
    fn test_display_size() {
        assert_eq!(display_size(200, 100, 400.0), egui::vec2(200.0, 100.0));
        assert_eq!(display_size(800, 400, 400.0), egui::vec2(400.0, 200.0));
    }
}
