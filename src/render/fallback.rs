//! Placeholder drawn when a chart cannot be plotted.
//!
//! The output depends only on the model, the reason and the canvas size:
//! a white canvas, a gray frame inset by [`FRAME_INSET`] pixels, a light
//! diagonal cross inside the frame, the title near the top and up to three
//! caption lines near the bottom.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use super::{RenderError, Typeface, WHITE, display_title};
use crate::document::ChartModel;

pub const FRAME_INSET: u32 = 10;

const FRAME: Rgba<u8> = Rgba([128, 128, 128, 255]);
const CROSS: Rgba<u8> = Rgba([220, 220, 220, 255]);
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const CAPTION_INK: Rgba<u8> = Rgba([90, 90, 90, 255]);

const TITLE_PX: f32 = 18.0;
const CAPTION_PX: f32 = 12.0;
/// Baselines of the caption lines, measured up from the bottom edge.
const CAPTION_OFFSETS: [u32; 3] = [60, 40, 20];

pub fn placeholder(
    model: &ChartModel,
    reason: &RenderError,
    width: u32,
    height: u32,
    typeface: &Typeface,
) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, WHITE);

    if width > 2 * FRAME_INSET && height > 2 * FRAME_INSET {
        let (inner_w, inner_h) = (width - 2 * FRAME_INSET, height - 2 * FRAME_INSET);
        let (left, top) = (FRAME_INSET as f32, FRAME_INSET as f32);
        let (right, bottom) = ((width - FRAME_INSET) as f32, (height - FRAME_INSET) as f32);

        draw_line_segment_mut(&mut canvas, (left, top), (right, bottom), CROSS);
        draw_line_segment_mut(&mut canvas, (right, top), (left, bottom), CROSS);
        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(FRAME_INSET as i32, FRAME_INSET as i32).of_size(inner_w, inner_h),
            FRAME,
        );
    }

    draw_centered(&mut canvas, typeface, display_title(model), 50, TITLE_PX, INK);

    let captions = captions(model, reason);
    for (caption, offset) in captions.iter().zip(CAPTION_OFFSETS) {
        if let Some(baseline) = height.checked_sub(offset) {
            draw_centered(&mut canvas, typeface, caption, baseline, CAPTION_PX, CAPTION_INK);
        }
    }

    canvas
}

/// Diagnostic lines shown under the cross.
pub fn captions(model: &ChartModel, reason: &RenderError) -> Vec<String> {
    let points: usize = model.series.iter().map(|s| s.len()).sum();
    vec![
        "Chart could not be drawn".to_string(),
        reason.to_string(),
        format!(
            "{} chart, {} series, {} points",
            model.kind,
            model.series.len(),
            points
        ),
    ]
}

fn draw_centered(canvas: &mut RgbaImage, typeface: &Typeface, text: &str, baseline: u32, px: f32, color: Rgba<u8>) {
    let width = canvas.width();
    let max_width = width.saturating_sub(2 * FRAME_INSET + 8).max(1);
    let text = typeface.fit(text, px, max_width);
    if text.is_empty() {
        return;
    }
    let (text_w, _) = typeface.measure(&text, px);
    let x = (width.saturating_sub(text_w) / 2) as i32;
    let y = baseline as i32 - px as i32;
    typeface.draw(canvas, &text, x, y, px, color);
}
