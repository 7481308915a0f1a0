//! Deterministic stitch-to-raster rendering for categorization previews.

use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use log::debug;

use crate::error::RenderError;
use crate::pattern::{StitchCommand, StitchOp};

/// Rotating stroke palette. Indexed by a counter of color-change events,
/// so colors cycle deterministically; this is a visualization
/// approximation, not a color-accurate rendering of the thread chart.
const PALETTE: &[Rgb<u8>] = &[
    Rgb([0, 0, 0]),       // black
    Rgb([255, 0, 0]),     // red
    Rgb([0, 0, 255]),     // blue
    Rgb([0, 128, 0]),     // green
    Rgb([128, 0, 128]),   // purple
    Rgb([255, 165, 0]),   // orange
];

#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Target maximum canvas width, including padding.
    pub max_width: u32,
    /// Target maximum canvas height, including padding.
    pub max_height: u32,
    /// Padding added on each side of the scaled pattern.
    pub padding: u32,
    /// Background fill.
    pub background: Rgb<u8>,
    /// Stroke width in pixels.
    pub line_width: u32,
    /// JPEG quality for `render_to_file`.
    pub jpeg_quality: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_width: 800,
            max_height: 600,
            padding: 50,
            background: Rgb([255, 255, 255]),
            line_width: 2,
            jpeg_quality: 95,
        }
    }
}

pub struct StitchRenderer {
    config: RenderConfig,
}

impl StitchRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Scratch-path policy for intermediate previews: a `stitchsort`
    /// directory under the system temp dir, file named after the design.
    pub fn preview_path(&self, design_name: &str) -> PathBuf {
        std::env::temp_dir()
            .join("stitchsort")
            .join(format!("{}.jpg", design_name))
    }

    /// Rasterizes a stitch-command sequence. Fails when the sequence has
    /// no drawable geometry; both cases are recoverable skips for the
    /// caller, never a crash.
    pub fn render(&self, commands: &[StitchCommand]) -> Result<RgbImage, RenderError> {
        let _span = tracing::info_span!("render").entered();

        if commands.is_empty() {
            return Err(RenderError::NoStitches);
        }

        let coords: Vec<(f32, f32)> = commands
            .iter()
            .filter(|c| c.x.is_finite() && c.y.is_finite())
            .map(|c| (c.x, c.y))
            .collect();

        if coords.is_empty() {
            return Err(RenderError::NoCoordinates);
        }

        let (min_x, max_x) = min_max(coords.iter().map(|c| c.0));
        let (min_y, max_y) = min_max(coords.iter().map(|c| c.1));

        let pattern_width = max_x - min_x;
        let pattern_height = max_y - min_y;

        let padding = self.config.padding as f32;
        let scale = if pattern_width > 0.0 && pattern_height > 0.0 {
            let scale_x = (self.config.max_width as f32 - 2.0 * padding) / pattern_width;
            let scale_y = (self.config.max_height as f32 - 2.0 * padding) / pattern_height;
            scale_x.min(scale_y).min(1.0)
        } else {
            1.0
        };

        let canvas_width = (pattern_width * scale) as u32 + 2 * self.config.padding;
        let canvas_height = (pattern_height * scale) as u32 + 2 * self.config.padding;

        let mut canvas = RgbImage::from_pixel(canvas_width, canvas_height, self.config.background);

        let transform = |x: f32, y: f32| -> (i32, i32) {
            (
                ((x - min_x) * scale + padding) as i32,
                ((y - min_y) * scale + padding) as i32,
            )
        };

        let mut anchor: Option<(i32, i32)> = None;
        let mut color_changes: usize = 0;
        let mut color = PALETTE[0];

        for command in commands {
            if !command.x.is_finite() || !command.y.is_finite() {
                continue;
            }
            let point = transform(command.x, command.y);

            match command.op {
                StitchOp::ColorChange => {
                    color_changes += 1;
                    color = PALETTE[color_changes % PALETTE.len()];
                    anchor = Some(point);
                }
                StitchOp::Jump => {
                    anchor = Some(point);
                }
                StitchOp::Trim | StitchOp::Stop => {
                    anchor = None;
                }
                StitchOp::Stitch => {
                    if let Some(from) = anchor {
                        draw_line(&mut canvas, from, point, color, self.config.line_width);
                    }
                    anchor = Some(point);
                }
            }
        }

        debug!(
            "Rendered {} commands to {}x{} canvas (scale {:.3})",
            commands.len(),
            canvas_width,
            canvas_height,
            scale
        );

        Ok(canvas)
    }

    /// Renders and writes a JPEG preview at the configured quality,
    /// creating parent directories as needed.
    pub fn render_to_file(
        &self,
        commands: &[StitchCommand],
        output_path: &Path,
    ) -> Result<(), RenderError> {
        let canvas = self.render(commands)?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RenderError::WritePreview {
                path: output_path.to_path_buf(),
                source: e,
            })?;
        }

        let file = std::fs::File::create(output_path).map_err(|e| RenderError::WritePreview {
            path: output_path.to_path_buf(),
            source: e,
        })?;

        let encoder = JpegEncoder::new_with_quality(file, self.config.jpeg_quality);
        canvas
            .write_with_encoder(encoder)
            .map_err(|e| RenderError::Encode(e.to_string()))?;

        debug!("Wrote preview {}", output_path.display());
        Ok(())
    }
}

fn min_max(values: impl Iterator<Item = f32>) -> (f32, f32) {
    values.fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), v| {
        (min.min(v), max.max(v))
    })
}

/// Bresenham line with a square brush, plotted directly on the buffer.
fn draw_line(
    canvas: &mut RgbImage,
    from: (i32, i32),
    to: (i32, i32),
    color: Rgb<u8>,
    width: u32,
) {
    let (mut x, mut y) = from;
    let (x1, y1) = to;

    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let step_x = if x < x1 { 1 } else { -1 };
    let step_y = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        stamp(canvas, x, y, color, width);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += step_x;
        }
        if e2 <= dx {
            err += dx;
            y += step_y;
        }
    }
}

fn stamp(canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, width: u32) {
    let width = width.max(1) as i32;
    let offset = (width - 1) / 2;
    for dy in 0..width {
        for dx in 0..width {
            let px = x + dx - offset;
            let py = y + dy - offset;
            if px >= 0 && py >= 0 && (px as u32) < canvas.width() && (py as u32) < canvas.height() {
                canvas.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}
