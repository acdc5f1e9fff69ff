//! Background removal.

use std::path::Path;

use image::{Rgba, RgbaImage};

use super::{expect_output, substitute, ToolCommand};
use crate::config::{RembgConfig, RemoverBackend};
use crate::error::Result;
use crate::storage::{open_rgba, save_rgba_png_at};

/// Cuts the subject out of an image, writing an RGBA PNG.
pub trait BackgroundRemover: Send + Sync {
    fn remove_background(&self, input: &Path, output: &Path) -> Result<()>;
}

pub fn remover_from_config(config: &RembgConfig) -> Box<dyn BackgroundRemover> {
    match config.backend {
        RemoverBackend::Command => Box::new(RembgCommand::new(config)),
        RemoverBackend::ColorKey => Box::new(ColorKeyRemover::new(config.color_key_tolerance)),
    }
}

/// The `rembg` command line tool.
#[derive(Debug, Clone)]
pub struct RembgCommand {
    program: String,
    args: Vec<String>,
}

impl RembgCommand {
    pub fn new(config: &RembgConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    pub fn command(&self, input: &Path, output: &Path) -> ToolCommand {
        let args = substitute(
            &self.args,
            &[
                ("input", input.display().to_string()),
                ("output", output.display().to_string()),
            ],
        );
        ToolCommand::new(&self.program).args(args)
    }
}

impl BackgroundRemover for RembgCommand {
    fn remove_background(&self, input: &Path, output: &Path) -> Result<()> {
        self.command(input, output).run("rembg")?;
        expect_output("rembg", output)
    }
}

/// Keys out the colour found along the image border.
///
/// Good enough for generated product shots on a plain backdrop and useful
/// when rembg is not installed.
#[derive(Debug, Clone, Copy)]
pub struct ColorKeyRemover {
    tolerance: u8,
}

impl ColorKeyRemover {
    pub fn new(tolerance: u8) -> Self {
        Self { tolerance }
    }

    /// Mean colour of the outermost pixel ring.
    pub fn border_color(img: &RgbaImage) -> [u8; 3] {
        let (w, h) = img.dimensions();
        let mut sum = [0u64; 3];
        let mut count = 0u64;
        for (x, y, px) in img.enumerate_pixels() {
            if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
                for (s, c) in sum.iter_mut().zip(px.0) {
                    *s += c as u64;
                }
                count += 1;
            }
        }
        if count == 0 {
            return [0; 3];
        }
        sum.map(|s| (s / count) as u8)
    }

    pub fn key(&self, img: &RgbaImage) -> RgbaImage {
        let key = Self::border_color(img);
        let mut out = img.clone();
        for px in out.pixels_mut() {
            let Rgba([r, g, b, _]) = *px;
            let distance = [r, g, b]
                .iter()
                .zip(key)
                .map(|(c, k)| c.abs_diff(k))
                .max()
                .unwrap_or(0);
            if distance <= self.tolerance {
                px.0[3] = 0;
            }
        }
        out
    }
}

impl BackgroundRemover for ColorKeyRemover {
    fn remove_background(&self, input: &Path, output: &Path) -> Result<()> {
        let img = open_rgba(input)?;
        let keyed = self.key(&img);
        save_rgba_png_at(&image::DynamicImage::ImageRgba8(keyed), output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(size: u32, backdrop: [u8; 4], subject: [u8; 4]) -> RgbaImage {
        RgbaImage::from_fn(size, size, |x, y| {
            let inside = x >= size / 4 && x < size * 3 / 4 && y >= size / 4 && y < size * 3 / 4;
            Rgba(if inside { subject } else { backdrop })
        })
    }

    #[test]
    fn test_command_substitution() {
        let cmd = RembgCommand::new(&RembgConfig::default())
            .command(Path::new("in.png"), Path::new("out.png"));
        assert_eq!(cmd.program, "rembg");
        assert_eq!(cmd.args, vec!["i", "in.png", "out.png"]);
    }

    #[test]
    fn test_border_color() {
        let img = framed(8, [250, 250, 250, 255], [10, 20, 30, 255]);
        assert_eq!(ColorKeyRemover::border_color(&img), [250, 250, 250]);
    }

    #[test]
    fn test_key_removes_backdrop_only() {
        let img = framed(8, [250, 250, 250, 255], [10, 20, 30, 255]);
        let keyed = ColorKeyRemover::new(10).key(&img);
        assert_eq!(keyed.get_pixel(0, 0).0[3], 0);
        assert_eq!(keyed.get_pixel(4, 4).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_key_tolerance() {
        let mut img = framed(8, [200, 200, 200, 255], [0, 0, 0, 255]);
        img.put_pixel(3, 3, Rgba([210, 200, 190, 255]));
        assert_eq!(ColorKeyRemover::new(10).key(&img).get_pixel(3, 3).0[3], 0);
        assert_eq!(ColorKeyRemover::new(9).key(&img).get_pixel(3, 3).0[3], 255);
    }

    #[test]
    fn test_remove_background_writes_png() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("in.png");
        let output = tmp.path().join("out.png");
        framed(8, [0, 255, 0, 255], [255, 0, 0, 255]).save(&input).unwrap();

        let remover = remover_from_config(&RembgConfig {
            backend: RemoverBackend::ColorKey,
            ..Default::default()
        });
        remover.remove_background(&input, &output).unwrap();

        let out = open_rgba(&output).unwrap();
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
        assert_eq!(out.get_pixel(4, 4).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_missing_rembg_binary() {
        let tmp = tempfile::tempdir().unwrap();
        let remover = RembgCommand::new(&RembgConfig {
            program: "scenecraft-no-rembg-here".into(),
            ..Default::default()
        });
        let err = remover
            .remove_background(&tmp.path().join("a.png"), &tmp.path().join("b.png"))
            .unwrap_err();
        assert!(matches!(err, crate::StudioError::ToolMissing { tool: "rembg", .. }));
    }
}
