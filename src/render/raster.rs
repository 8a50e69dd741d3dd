//! Default plotting backend: draws onto an `RgbaImage` with `imageproc`.
//!
//! Bar, line and area charts share a category axis built from the union of
//! all series' categories and a linear value axis from zero to a rounded
//! ceiling above the largest value. Negative values sit on the baseline.

use std::collections::HashMap;
use std::f32::consts::PI;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;

use super::{ChartBackend, RenderError, Typeface};
use crate::document::{ChartKind, ChartModel, Series};

const PALETTE: [Rgba<u8>; 8] = [
    Rgba([68, 114, 196, 255]),
    Rgba([237, 125, 49, 255]),
    Rgba([165, 165, 165, 255]),
    Rgba([255, 192, 0, 255]),
    Rgba([91, 155, 213, 255]),
    Rgba([112, 173, 71, 255]),
    Rgba([38, 68, 120, 255]),
    Rgba([158, 72, 14, 255]),
];

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const GRID: Rgba<u8> = Rgba([225, 225, 225, 255]);
const LABEL: Rgba<u8> = Rgba([64, 64, 64, 255]);
const SLICE_EDGE: Rgba<u8> = Rgba([255, 255, 255, 255]);

const MARGIN: u32 = 10;
const MIN_CANVAS_WIDTH: u32 = 120;
const MIN_CANVAS_HEIGHT: u32 = 90;
const MIN_PLOT_EDGE: f32 = 20.0;
const TICKS: u32 = 5;
/// Headroom above the largest value.
const VALUE_PADDING: f64 = 1.1;
const SWATCH: u32 = 10;
/// Largest angle covered by one edge of a slice polygon.
const ARC_STEP: f32 = PI / 90.0;

#[derive(Debug, Clone, Default)]
pub struct RasterBackend;

impl RasterBackend {
    fn color(index: usize) -> Rgba<u8> {
        PALETTE[index % PALETTE.len()]
    }
}

impl ChartBackend for RasterBackend {
    fn plot(&self, model: &ChartModel, canvas: &mut RgbaImage, typeface: &Typeface) -> Result<(), RenderError> {
        let (width, height) = canvas.dimensions();
        if width < MIN_CANVAS_WIDTH || height < MIN_CANVAS_HEIGHT {
            return Err(RenderError::CanvasTooSmall { width, height });
        }
        if !model.has_data() {
            return Err(RenderError::NoData);
        }

        let style = Style::for_canvas(height);
        let legend = legend_entries(model);
        let legend_width = legend_width(&legend, typeface, style.label_px, width);

        let mut top = MARGIN as f32;
        let title = model.title.trim();
        if !title.is_empty() {
            let title = typeface.fit(title, style.title_px, width - 2 * MARGIN);
            let (title_w, _) = typeface.measure(&title, style.title_px);
            let x = (width.saturating_sub(title_w) / 2) as i32;
            typeface.draw(canvas, &title, x, MARGIN as i32, style.title_px, INK);
            top += style.title_px + 8.0;
        }

        let right = (width - MARGIN - legend_width) as f32;
        match model.kind {
            ChartKind::Pie => {
                let area = Area {
                    left: MARGIN as f32,
                    top,
                    right,
                    bottom: (height - MARGIN) as f32,
                };
                area.check(width, height)?;
                plot_pie(canvas, &model.series[0], area)?;
            },
            ChartKind::Bar | ChartKind::Line | ChartKind::Area => {
                let (categories, grid) = align(model);
                let y_max = value_ceiling(&grid);
                let tick_labels: Vec<String> = (0..=TICKS)
                    .map(|i| format_tick(y_max * f64::from(i) / f64::from(TICKS)))
                    .collect();
                let tick_width = tick_labels
                    .iter()
                    .map(|label| typeface.measure(label, style.label_px).0)
                    .max()
                    .unwrap_or(0);
                let area = Area {
                    left: (MARGIN + tick_width + 6) as f32,
                    top,
                    right,
                    bottom: height as f32 - MARGIN as f32 - style.label_px - 6.0,
                };
                area.check(width, height)?;

                let axes = Axes {
                    area,
                    y_max,
                    columns: categories.len().max(1),
                };
                axes.draw_grid(canvas, typeface, &tick_labels, style.label_px);
                match model.kind {
                    ChartKind::Bar => plot_bars(canvas, &axes, &grid),
                    ChartKind::Line => plot_lines(canvas, &axes, &grid),
                    _ => plot_areas(canvas, &axes, &grid),
                }
                axes.draw_axis_lines(canvas);
                axes.draw_category_labels(canvas, typeface, &categories, style.label_px);
            },
            ChartKind::Unknown => return Err(RenderError::UnsupportedKind(model.kind)),
        }

        draw_legend(canvas, typeface, &legend, style.label_px, width - legend_width, top);
        Ok(())
    }
}

struct Style {
    title_px: f32,
    label_px: f32,
}

impl Style {
    fn for_canvas(height: u32) -> Self {
        Self {
            title_px: (height as f32 / 25.0).clamp(12.0, 24.0),
            label_px: (height as f32 / 40.0).clamp(9.0, 14.0),
        }
    }
}

/// Plot rectangle in canvas pixels.
#[derive(Debug, Clone, Copy)]
struct Area {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl Area {
    fn width(&self) -> f32 {
        self.right - self.left
    }

    fn height(&self) -> f32 {
        self.bottom - self.top
    }

    fn check(&self, width: u32, height: u32) -> Result<(), RenderError> {
        if self.width() < MIN_PLOT_EDGE || self.height() < MIN_PLOT_EDGE {
            Err(RenderError::CanvasTooSmall { width, height })
        } else {
            Ok(())
        }
    }
}

struct Axes {
    area: Area,
    y_max: f64,
    columns: usize,
}

impl Axes {
    fn band(&self) -> f32 {
        self.area.width() / self.columns as f32
    }

    fn x_center(&self, column: usize) -> f32 {
        self.area.left + (column as f32 + 0.5) * self.band()
    }

    fn y(&self, value: f64) -> f32 {
        let value = if value.is_finite() { value.clamp(0.0, self.y_max) } else { 0.0 };
        self.area.bottom - (value / self.y_max) as f32 * self.area.height()
    }

    fn draw_grid(&self, canvas: &mut RgbaImage, typeface: &Typeface, labels: &[String], px: f32) {
        for (i, label) in labels.iter().enumerate() {
            let value = self.y_max * i as f64 / f64::from(TICKS);
            let y = self.y(value);
            if i > 0 {
                draw_line_segment_mut(canvas, (self.area.left, y), (self.area.right, y), GRID);
            }
            let (label_w, _) = typeface.measure(label, px);
            let x = self.area.left as i32 - 6 - label_w as i32;
            typeface.draw(canvas, label, x, (y - px / 2.0) as i32, px, LABEL);
        }
    }

    fn draw_axis_lines(&self, canvas: &mut RgbaImage) {
        let Area {
            left,
            top,
            right,
            bottom,
        } = self.area;
        draw_line_segment_mut(canvas, (left, top), (left, bottom), INK);
        draw_line_segment_mut(canvas, (left, bottom), (right, bottom), INK);
    }

    fn draw_category_labels(&self, canvas: &mut RgbaImage, typeface: &Typeface, categories: &[&str], px: f32) {
        if categories.is_empty() {
            return;
        }
        let widest = categories
            .iter()
            .map(|c| typeface.measure(c, px).0)
            .max()
            .unwrap_or(0) as f32;
        let band = self.band();
        let step = ((widest + 4.0) / band).ceil().max(1.0) as usize;
        let room = (band * step as f32 - 4.0).max(1.0) as u32;

        for (column, category) in categories.iter().enumerate().step_by(step) {
            let label = typeface.fit(category, px, room);
            let (label_w, _) = typeface.measure(&label, px);
            let x = self.x_center(column) - label_w as f32 / 2.0;
            typeface.draw(canvas, &label, x as i32, self.area.bottom as i32 + 4, px, LABEL);
        }
    }
}

/// Lay every series' points on the shared category axis.
///
/// A label repeated within one series keeps one slot per occurrence.
fn align(model: &ChartModel) -> (Vec<&str>, Vec<Vec<Option<f64>>>) {
    let mut slots: HashMap<(&str, usize), usize> = HashMap::new();
    let mut axis = Vec::new();
    let mut placed = Vec::with_capacity(model.series.len());

    for series in &model.series {
        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        let mut points = Vec::with_capacity(series.len());
        for (category, value) in series.points() {
            let seen = occurrences.entry(category).or_insert(0);
            let key = (category, *seen);
            *seen += 1;
            let column = *slots.entry(key).or_insert_with(|| {
                axis.push(category);
                axis.len() - 1
            });
            points.push((column, value));
        }
        placed.push(points);
    }

    let grid = placed
        .into_iter()
        .map(|points| {
            let mut row = vec![None; axis.len()];
            for (column, value) in points {
                row[column] = Some(value);
            }
            row
        })
        .collect();
    (axis, grid)
}

fn value_ceiling(grid: &[Vec<Option<f64>>]) -> f64 {
    let max = grid
        .iter()
        .flatten()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    nice_ceiling(max * VALUE_PADDING)
}

/// Smallest of 1, 2, 2.5, 5 or 10 times a power of ten that is `>= value`.
fn nice_ceiling(value: f64) -> f64 {
    if !(value > 0.0) || !value.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(value.log10().floor());
    [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .map(|step| step * magnitude)
        .find(|candidate| *candidate >= value)
        .unwrap_or(10.0 * magnitude)
}

fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        let text = format!("{:.2}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn plot_bars(canvas: &mut RgbaImage, axes: &Axes, grid: &[Vec<Option<f64>>]) {
    let band = axes.band();
    let bar_width = band * 0.8 / grid.len().max(1) as f32;
    for (index, row) in grid.iter().enumerate() {
        let color = RasterBackend::color(index);
        for (column, value) in row.iter().enumerate() {
            let Some(value) = value else { continue };
            let x = axes.area.left + column as f32 * band + band * 0.1 + index as f32 * bar_width;
            let y = axes.y(*value);
            fill_rect(
                canvas,
                x.round() as i32,
                y.round() as i32,
                bar_width.round().max(1.0) as u32,
                (axes.area.bottom - y).round().max(0.0) as u32,
                color,
            );
        }
    }
}

fn plot_lines(canvas: &mut RgbaImage, axes: &Axes, grid: &[Vec<Option<f64>>]) {
    let markers = axes.band() >= 8.0;
    for (index, row) in grid.iter().enumerate() {
        let color = RasterBackend::color(index);
        let points: Vec<(f32, f32)> = row
            .iter()
            .enumerate()
            .filter_map(|(column, value)| value.map(|v| (axes.x_center(column), axes.y(v))))
            .collect();
        for pair in points.windows(2) {
            thick_segment(canvas, pair[0], pair[1], color);
        }
        if markers {
            for (x, y) in &points {
                draw_filled_circle_mut(canvas, (*x as i32, *y as i32), 3, color);
            }
        }
    }
}

fn plot_areas(canvas: &mut RgbaImage, axes: &Axes, grid: &[Vec<Option<f64>>]) {
    for (index, row) in grid.iter().enumerate() {
        let color = RasterBackend::color(index);
        let outline: Vec<(f32, f32)> = row
            .iter()
            .enumerate()
            .map(|(column, value)| (axes.x_center(column), axes.y(value.unwrap_or(0.0))))
            .collect();
        let (Some(first), Some(last)) = (outline.first(), outline.last()) else {
            continue;
        };

        let baseline = axes.area.bottom.round() as i32;
        let mut polygon = Vec::with_capacity(outline.len() + 2);
        polygon.push(Point::new(first.0.round() as i32, baseline));
        polygon.extend(outline.iter().map(|(x, y)| Point::new(x.round() as i32, y.round() as i32)));
        polygon.push(Point::new(last.0.round() as i32, baseline));
        fill_polygon(canvas, polygon, tint(color));

        for pair in outline.windows(2) {
            thick_segment(canvas, pair[0], pair[1], color);
        }
    }
}

fn plot_pie(canvas: &mut RgbaImage, series: &Series, area: Area) -> Result<(), RenderError> {
    let values: Vec<f32> = series
        .values
        .iter()
        .map(|v| if v.is_finite() { v.max(0.0) as f32 } else { 0.0 })
        .collect();
    let total: f32 = values.iter().sum();
    if !(total > 0.0) || !total.is_finite() {
        return Err(RenderError::NoData);
    }

    let center = (
        (area.left + area.right) / 2.0,
        (area.top + area.bottom) / 2.0,
    );
    let radius = (area.width().min(area.height()) / 2.0 - 4.0).max(1.0);

    let mut start = -PI / 2.0;
    let mut edges = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        let sweep = value / total * 2.0 * PI;
        if sweep <= 0.0 {
            continue;
        }
        let color = RasterBackend::color(index);
        if sweep >= 2.0 * PI - 1e-4 {
            draw_filled_circle_mut(
                canvas,
                (center.0.round() as i32, center.1.round() as i32),
                radius.round() as i32,
                color,
            );
            return Ok(());
        }

        let steps = (sweep / ARC_STEP).ceil().max(1.0) as usize;
        let mut polygon = Vec::with_capacity(steps + 2);
        polygon.push(Point::new(center.0.round() as i32, center.1.round() as i32));
        for step in 0..=steps {
            let angle = start + sweep * step as f32 / steps as f32;
            polygon.push(Point::new(
                (center.0 + radius * angle.cos()).round() as i32,
                (center.1 + radius * angle.sin()).round() as i32,
            ));
        }
        fill_polygon(canvas, polygon, color);
        edges.push(start);
        start += sweep;
    }

    if edges.len() > 1 {
        for angle in edges {
            let end = (center.0 + radius * angle.cos(), center.1 + radius * angle.sin());
            draw_line_segment_mut(canvas, center, end, SLICE_EDGE);
        }
    }
    Ok(())
}

/// Legend labels: slice categories for pies, series names when there is
/// more than one series.
fn legend_entries(model: &ChartModel) -> Vec<&str> {
    match model.kind {
        ChartKind::Pie => model
            .series
            .first()
            .map(|s| s.categories.iter().map(String::as_str).collect())
            .unwrap_or_default(),
        _ if model.series.len() > 1 => model.series.iter().map(|s| s.name.as_str()).collect(),
        _ => Vec::new(),
    }
}

fn legend_width(entries: &[&str], typeface: &Typeface, px: f32, canvas_width: u32) -> u32 {
    if entries.is_empty() {
        return 0;
    }
    let widest = entries
        .iter()
        .map(|e| typeface.measure(e, px).0)
        .max()
        .unwrap_or(0);
    (widest + SWATCH + 6 + MARGIN).min(canvas_width / 4)
}

fn draw_legend(canvas: &mut RgbaImage, typeface: &Typeface, entries: &[&str], px: f32, left: u32, top: f32) {
    let row_height = px.max(SWATCH as f32) + 4.0;
    let room = canvas.width().saturating_sub(left + SWATCH + 6 + MARGIN).max(1);
    let bottom = canvas.height().saturating_sub(MARGIN) as f32;

    for (index, entry) in entries.iter().enumerate() {
        let y = top + index as f32 * row_height;
        if y + row_height > bottom {
            break;
        }
        fill_rect(canvas, left as i32, y as i32, SWATCH, SWATCH, RasterBackend::color(index));
        let label = typeface.fit(entry, px, room);
        typeface.draw(canvas, &label, (left + SWATCH + 6) as i32, y as i32, px, LABEL);
    }
}

fn fill_rect(canvas: &mut RgbaImage, x: i32, y: i32, width: u32, height: u32, color: Rgba<u8>) {
    if width == 0 || height == 0 {
        return;
    }
    draw_filled_rect_mut(canvas, Rect::at(x, y).of_size(width, height), color);
}

fn fill_polygon(canvas: &mut RgbaImage, mut polygon: Vec<Point<i32>>, color: Rgba<u8>) {
    polygon.dedup();
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    if polygon.len() >= 3 {
        draw_polygon_mut(canvas, &polygon, color);
    }
}

fn thick_segment(canvas: &mut RgbaImage, from: (f32, f32), to: (f32, f32), color: Rgba<u8>) {
    for offset in [-1.0, 0.0, 1.0] {
        draw_line_segment_mut(canvas, (from.0, from.1 + offset), (to.0, to.1 + offset), color);
    }
}

/// Halfway between `color` and white.
fn tint(color: Rgba<u8>) -> Rgba<u8> {
    let Rgba([r, g, b, a]) = color;
    let mix = |c: u8| ((u16::from(c) + 255) / 2) as u8;
    Rgba([mix(r), mix(g), mix(b), a])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::WHITE;

    fn canvas() -> RgbaImage {
        RgbaImage::from_pixel(400, 300, WHITE)
    }

    fn series(name: &str, categories: &[&str], values: &[f64]) -> Series {
        Series::new(
            name,
            categories.iter().map(|c| c.to_string()).collect(),
            values.to_vec(),
        )
    }

    fn model(kind: ChartKind, series: Vec<Series>) -> ChartModel {
        ChartModel {
            title: String::new(),
            kind,
            series,
        }
    }

    fn count(canvas: &RgbaImage, color: Rgba<u8>) -> usize {
        canvas.pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn test_nice_ceiling() {
        assert_eq!(nice_ceiling(4.4), 5.0);
        assert_eq!(nice_ceiling(1.1), 2.0);
        assert_eq!(nice_ceiling(22.0), 25.0);
        assert_eq!(nice_ceiling(100.0), 100.0);
        assert_eq!(nice_ceiling(0.0), 1.0);
        assert_eq!(nice_ceiling(f64::NAN), 1.0);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(5.0), "5");
        assert_eq!(format_tick(0.5), "0.5");
        assert_eq!(format_tick(0.25), "0.25");
    }

    #[test]
    fn test_align_union_first_seen() {
        let chart = model(
            ChartKind::Bar,
            vec![
                series("a", &["X", "Y"], &[1.0, 2.0]),
                series("b", &["Y", "Z"], &[3.0, 4.0]),
            ],
        );
        let (axis, grid) = align(&chart);
        assert_eq!(axis, vec!["X", "Y", "Z"]);
        assert_eq!(grid[0], vec![Some(1.0), Some(2.0), None]);
        assert_eq!(grid[1], vec![None, Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_align_keeps_repeated_labels() {
        let chart = model(ChartKind::Line, vec![series("a", &["Q", "Q"], &[1.0, 2.0])]);
        let (axis, grid) = align(&chart);
        assert_eq!(axis, vec!["Q", "Q"]);
        assert_eq!(grid[0], vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_bars_use_series_colors() {
        let chart = model(
            ChartKind::Bar,
            vec![
                series("a", &["A", "B", "C"], &[1.0, 4.0, 3.0]),
                series("b", &["A", "B", "C"], &[2.0, 2.0, 2.0]),
            ],
        );
        let mut canvas = canvas();
        RasterBackend.plot(&chart, &mut canvas, &Typeface::none()).unwrap();
        assert!(count(&canvas, PALETTE[0]) > 0);
        assert!(count(&canvas, PALETTE[1]) > 0);
    }

    #[test]
    fn test_taller_bar_has_more_pixels() {
        let chart = model(ChartKind::Bar, vec![series("a", &["A", "B"], &[1.0, 4.0])]);
        let mut canvas = canvas();
        RasterBackend.plot(&chart, &mut canvas, &Typeface::none()).unwrap();

        let column_fill = |x: u32| (0..300).filter(|y| *canvas.get_pixel(x, *y) == PALETTE[0]).count();
        let (left, right): (Vec<u32>, Vec<u32>) = (0..400)
            .filter(|x| column_fill(*x) > 0)
            .partition(|x| *x < 200);
        assert!(!left.is_empty() && !right.is_empty());
        assert!(column_fill(right[0]) > column_fill(left[0]) * 3);
    }

    #[test]
    fn test_line_and_area_draw() {
        for kind in [ChartKind::Line, ChartKind::Area] {
            let chart = model(kind, vec![series("a", &["A", "B", "C"], &[1.0, -2.0, 3.0])]);
            let mut canvas = canvas();
            RasterBackend.plot(&chart, &mut canvas, &Typeface::none()).unwrap();
            assert!(count(&canvas, PALETTE[0]) > 0, "{kind}");
        }
    }

    #[test]
    fn test_pie_slices() {
        let chart = model(ChartKind::Pie, vec![series("a", &["A", "B", "C"], &[1.0, 0.0, 3.0])]);
        let mut canvas = canvas();
        RasterBackend.plot(&chart, &mut canvas, &Typeface::none()).unwrap();
        let first = count(&canvas, PALETTE[0]);
        let third = count(&canvas, PALETTE[2]);
        assert!(third > first * 2);
        // The zero slice has no area, only its legend swatch.
        assert_eq!(count(&canvas, PALETTE[1]), (SWATCH * SWATCH) as usize);
    }

    #[test]
    fn test_pie_single_slice() {
        let chart = model(ChartKind::Pie, vec![series("a", &["A"], &[5.0])]);
        let mut canvas = canvas();
        RasterBackend.plot(&chart, &mut canvas, &Typeface::none()).unwrap();
        assert!(count(&canvas, PALETTE[0]) > 10_000);
    }

    #[test]
    fn test_pie_all_zero_is_no_data() {
        let chart = model(ChartKind::Pie, vec![series("a", &["A", "B"], &[0.0, -1.0])]);
        let mut canvas = canvas();
        assert_eq!(
            RasterBackend.plot(&chart, &mut canvas, &Typeface::none()),
            Err(RenderError::NoData)
        );
    }

    #[test]
    fn test_small_canvas_rejected() {
        let chart = model(ChartKind::Bar, vec![series("a", &["A"], &[1.0])]);
        let mut canvas = RgbaImage::from_pixel(50, 40, WHITE);
        assert_eq!(
            RasterBackend.plot(&chart, &mut canvas, &Typeface::none()),
            Err(RenderError::CanvasTooSmall { width: 50, height: 40 })
        );
    }

    #[test]
    fn test_many_categories_do_not_panic() {
        let categories: Vec<String> = (0..5000).map(|i| i.to_string()).collect();
        let values: Vec<f64> = (0..5000).map(f64::from).collect();
        for kind in [ChartKind::Bar, ChartKind::Line, ChartKind::Area] {
            let chart = model(kind, vec![Series::new("big", categories.clone(), values.clone())]);
            let mut canvas = canvas();
            assert!(RasterBackend.plot(&chart, &mut canvas, &Typeface::none()).is_ok());
        }
    }

    #[test]
    fn test_tint() {
        assert_eq!(tint(Rgba([255, 1, 0, 255])), Rgba([255, 128, 127, 255]));
    }
}
