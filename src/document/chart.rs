use std::fmt;

use bytes::Bytes;
use once_cell::unsync::OnceCell;

use crate::common::Size;
use crate::ooxml::charts::ChartResolver;

/// Plot family of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Area,
    #[default]
    Unknown,
}

impl ChartKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Area => "area",
            ChartKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named series pairing category labels with values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub name: String,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
}

impl Series {
    /// Build a series, truncating both lists to the shorter one.
    pub fn new(name: impl Into<String>, mut categories: Vec<String>, mut values: Vec<f64>) -> Self {
        let len = categories.len().min(values.len());
        categories.truncate(len);
        values.truncate(len);
        Self {
            name: name.into(),
            categories,
            values,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.categories.len().min(self.values.len())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(category, value)` pairs in order.
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.categories
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// A chart reduced to what the renderer needs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartModel {
    pub title: String,
    pub kind: ChartKind,
    pub series: Vec<Series>,
}

impl ChartModel {
    /// Whether there is no point to plot at all.
    pub fn has_data(&self) -> bool {
        self.series.iter().any(|s| !s.is_empty())
    }

    /// Union of the category labels of every series, in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for category in self.series.iter().flat_map(|s| s.categories.iter()) {
            if !seen.contains(&category.as_str()) {
                seen.push(category.as_str());
            }
        }
        seen
    }
}

/// A chart part referenced from the document body.
///
/// The handle owns the part bytes; the model is resolved on first use and
/// cached for the rest of the conversion.
#[derive(Debug)]
pub struct ChartHandle {
    r_id: String,
    partname: String,
    xml: Bytes,
    size: Option<Size>,
    description: String,
    model: OnceCell<ChartModel>,
}

impl ChartHandle {
    pub fn new(
        r_id: impl Into<String>,
        partname: impl Into<String>,
        xml: Bytes,
        size: Option<Size>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            r_id: r_id.into(),
            partname: partname.into(),
            xml,
            size,
            description: description.into(),
            model: OnceCell::new(),
        }
    }

    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn partname(&self) -> &str {
        &self.partname
    }

    #[inline]
    pub fn xml(&self) -> &[u8] {
        &self.xml
    }

    /// Display size in points from the drawing extent.
    #[inline]
    pub fn size(&self) -> Option<Size> {
        self.size
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The resolved model, computed by `resolver` the first time only.
    pub fn model(&self, resolver: &ChartResolver) -> &ChartModel {
        self.model.get_or_init(|| resolver.resolve(&self.xml))
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.model.get().is_some()
    }
}
