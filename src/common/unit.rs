//! Unit conversion utilities.
//!
//! Drawing extents are stored in EMUs, page geometry is expressed in points
//! (1/72 inch) and raster images are measured in pixels.

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_PT: i64 = 12_700;
pub const PT_PER_INCH: f32 = 72.0;

/// Raster images without their own resolution are shown at this density.
pub const DEFAULT_DPI: u32 = 96;

#[inline]
pub fn emu_to_pt(emu: i64) -> f32 {
    (emu as f64 / EMUS_PER_PT as f64) as f32
}

#[inline]
pub fn pt_to_emu(pt: f32) -> i64 {
    (pt as f64 * EMUS_PER_PT as f64) as i64
}

#[inline]
pub fn emu_to_px(emu: i64, dpi: u32) -> u32 {
    ((emu.max(0) as f64) * dpi as f64 / EMUS_PER_INCH as f64) as u32
}

/// Convert a pixel count at `dpi` into points.
#[inline]
pub fn px_to_pt(px: u32, dpi: u32) -> f32 {
    px as f32 * PT_PER_INCH / dpi.max(1) as f32
}
