//! 2D compositing: place a cut-out foreground over a background.
//!
//! Two placement models are supported. The demo positions the foreground by
//! an offset from the background centre plus a uniform scale; the web editor
//! sends an explicit rectangle in canvas coordinates.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};

/// Top-left corner and size of the resized foreground, in background pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Foreground rectangle in canvas coordinates as sent by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 550.0,
        }
    }
}

/// Where the foreground lands for a centre offset and scale.
///
/// The corner may sit partly outside the background but never further than
/// one foreground width/height beyond its edges.
pub fn centered_placement(
    bg_size: (u32, u32),
    fg_size: (u32, u32),
    x_off: f64,
    y_off: f64,
    scale: f64,
) -> Result<Placement> {
    if !(scale > 0.0) || !scale.is_finite() {
        return Err(StudioError::InvalidScale(scale));
    }
    let (bw, bh) = (bg_size.0 as f64, bg_size.1 as f64);

    let width = ((fg_size.0 as f64 * scale) as u32).max(1);
    let height = ((fg_size.1 as f64 * scale) as u32).max(1);

    let cx = bw / 2.0 + x_off;
    let cy = bh / 2.0 + y_off;

    // `as` truncates toward zero
    let x = (cx - width as f64 / 2.0) as i64;
    let y = (cy - height as f64 / 2.0) as i64;

    Ok(Placement {
        x: x.clamp(-(width as i64), bg_size.0 as i64),
        y: y.clamp(-(height as i64), bg_size.1 as i64),
        width,
        height,
    })
}

/// Porter-Duff "over" of `top` onto `base` at a possibly negative offset.
pub fn alpha_over(base: &mut RgbaImage, top: &RgbaImage, x: i64, y: i64) {
    imageops::overlay(base, top, x, y);
}

/// Paste `top` onto `base` using its own alpha as the mask.
///
/// Every channel, alpha included, is interpolated between base and top by
/// the top pixel's alpha, so a half transparent pixel over a transparent
/// canvas stays half transparent with its colour at half strength.
pub fn paste_masked(base: &mut RgbaImage, top: &RgbaImage, x: i64, y: i64) {
    let (bw, bh) = (base.width() as i64, base.height() as i64);
    for (tx, ty, px) in top.enumerate_pixels() {
        let (dx, dy) = (x + tx as i64, y + ty as i64);
        if dx < 0 || dy < 0 || dx >= bw || dy >= bh {
            continue;
        }
        let mask = px.0[3] as u32;
        let dst = base.get_pixel_mut(dx as u32, dy as u32);
        for (d, s) in dst.0.iter_mut().zip(px.0) {
            *d = ((s as u32 * mask + *d as u32 * (255 - mask) + 127) / 255) as u8;
        }
    }
}

/// Demo flow: scale the foreground, offset it from the background centre and
/// composite. Output is RGB at background size.
pub fn blend_centered(
    bg: &DynamicImage,
    fg: &DynamicImage,
    x_off: f64,
    y_off: f64,
    scale: f64,
) -> Result<RgbImage> {
    let mut base = bg.to_rgba8();
    let fg = fg.to_rgba8();

    let placement = centered_placement(base.dimensions(), fg.dimensions(), x_off, y_off, scale)?;
    let fg = imageops::resize(&fg, placement.width, placement.height, FilterType::Lanczos3);

    alpha_over(&mut base, &fg, placement.x, placement.y);
    Ok(DynamicImage::ImageRgba8(base).to_rgb8())
}

/// Size of the background once letterboxed into the canvas.
pub fn fit_within(src: (u32, u32), canvas: (u32, u32)) -> (u32, u32) {
    let scale = f64::min(
        canvas.0 as f64 / src.0 as f64,
        canvas.1 as f64 / src.1 as f64,
    );
    (
        ((src.0 as f64 * scale) as u32).max(1),
        ((src.1 as f64 * scale) as u32).max(1),
    )
}

fn dimension(value: f64, what: &str) -> Result<u32> {
    let v = value as i64;
    if v < 1 || v > u32::MAX as i64 {
        return Err(StudioError::InvalidDimensions(format!("{what} = {value}")));
    }
    Ok(v as u32)
}

/// Web flow: letterbox the background into a transparent canvas, then paste
/// the foreground resized to exactly `rect`, kept fully inside the canvas
/// whenever it fits.
pub fn blend_canvas(
    bg: &DynamicImage,
    fg: &DynamicImage,
    rect: CanvasRect,
    canvas: CanvasSize,
) -> Result<RgbImage> {
    let cw = dimension(canvas.width, "canvas_w")?;
    let ch = dimension(canvas.height, "canvas_h")?;
    let w = dimension(rect.w, "w")?;
    let h = dimension(rect.h, "h")?;

    let bg = bg.to_rgba8();
    let fg = fg.to_rgba8();

    let mut base = RgbaImage::new(cw, ch);

    let (bw, bh) = fit_within(bg.dimensions(), (cw, ch));
    let bg = imageops::resize(&bg, bw, bh, FilterType::Lanczos3);
    let bx = (cw as i64 - bw as i64).div_euclid(2);
    let by = (ch as i64 - bh as i64).div_euclid(2);
    paste_masked(&mut base, &bg, bx, by);

    let fg = imageops::resize(&fg, w, h, FilterType::Lanczos3);
    let x = (rect.x as i64).min(cw as i64 - w as i64).max(0);
    let y = (rect.y as i64).min(ch as i64 - h as i64).max(0);
    paste_masked(&mut base, &fg, x, y);

    Ok(DynamicImage::ImageRgba8(base).to_rgb8())
}
