//! Raw chart part model.
//!
//! What a chart part says, before any defaulting: which type groups the
//! plot area holds and, per series, where its name, categories and values
//! come from. Turning this into a [`ChartModel`](crate::document::ChartModel)
//! is the resolver's job.

/// A reference to a data source (cell range formula).
#[derive(Debug, Clone, PartialEq)]
pub struct DataSourceRef {
    /// Formula reference (e.g., "Sheet1!$A$1:$A$10")
    pub formula: String,
}

impl DataSourceRef {
    #[inline]
    pub fn new(formula: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
        }
    }
}

/// Where a piece of chart data comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource<T> {
    /// A snapshot stored in the chart part itself.
    Cached(T),
    /// Only a live reference into the embedded workbook is available.
    Live(DataSourceRef),
}

impl<T> DataSource<T> {
    /// Prefer the cached snapshot; fall back to the live reference.
    pub fn select(cache: Option<T>, formula: Option<String>) -> Option<Self> {
        match (cache, formula) {
            (Some(cache), _) => Some(DataSource::Cached(cache)),
            (None, Some(formula)) => Some(DataSource::Live(DataSourceRef::new(formula))),
            (None, None) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DataSource<U> {
        match self {
            DataSource::Cached(value) => DataSource::Cached(f(value)),
            DataSource::Live(r) => DataSource::Live(r),
        }
    }
}

/// One `c:pt` of a string or numeric cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPoint {
    pub idx: u32,
    pub text: String,
}

/// `c:strCache`, `c:numCache`, `c:strLit`, `c:numLit` or one level of a
/// multi-level cache.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointCache {
    pub pt_count: Option<u32>,
    pub format_code: Option<String>,
    pub points: Vec<CachedPoint>,
}

/// Upper bound on the number of points taken from one cache.
pub const MAX_POINTS: usize = 100_000;

impl PointCache {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point texts ordered by `idx`, with `None` for blank cells.
    ///
    /// The length is the larger of `ptCount` and the highest index plus
    /// one, capped at [`MAX_POINTS`]. A cache without points is empty
    /// whatever its `ptCount` says.
    pub fn dense(&self) -> Vec<Option<&str>> {
        let Some(max_idx) = self.points.iter().map(|p| p.idx as usize).max() else {
            return Vec::new();
        };
        let len = (max_idx + 1)
            .max(self.pt_count.unwrap_or(0) as usize)
            .min(MAX_POINTS);

        let mut dense = vec![None; len];
        for point in &self.points {
            if let Some(slot) = dense.get_mut(point.idx as usize) {
                *slot = Some(point.text.as_str());
            }
        }
        dense
    }

    /// Text of the lowest-indexed point.
    pub fn first(&self) -> Option<&str> {
        self.points
            .iter()
            .min_by_key(|p| p.idx)
            .map(|p| p.text.as_str())
    }
}

/// Element name of a plot-area type group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupTag {
    Bar,
    Bar3D,
    Line,
    Line3D,
    Pie,
    Pie3D,
    Area,
    Area3D,
    /// Scatter, doughnut, radar, stock, surface, bubble and the rest.
    Other(String),
}

impl GroupTag {
    /// Map a local element name such as `barChart`; `None` if the element is
    /// not a type group at all.
    pub fn from_local_name(name: &[u8]) -> Option<Self> {
        let tag = match name {
            b"barChart" => GroupTag::Bar,
            b"bar3DChart" => GroupTag::Bar3D,
            b"lineChart" => GroupTag::Line,
            b"line3DChart" => GroupTag::Line3D,
            b"pieChart" => GroupTag::Pie,
            b"pie3DChart" => GroupTag::Pie3D,
            b"areaChart" => GroupTag::Area,
            b"area3DChart" => GroupTag::Area3D,
            other if other.ends_with(b"Chart") => {
                GroupTag::Other(String::from_utf8_lossy(other).into_owned())
            },
            _ => return None,
        };
        Some(tag)
    }
}

/// One `c:ser`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSeries {
    /// `c:tx`
    pub name: Option<DataSource<String>>,
    /// `c:cat` (or `c:xVal`)
    pub categories: Option<DataSource<PointCache>>,
    /// `c:val` (or `c:yVal`)
    pub values: Option<DataSource<PointCache>>,
}

/// A type group of the plot area with its series in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeGroup {
    pub tag: GroupTag,
    pub series: Vec<RawSeries>,
}

/// A parsed chart part.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartPart {
    /// `c:chart/c:title`
    pub title: Option<DataSource<String>>,
    /// `None` when the part has no `c:plotArea`.
    pub groups: Option<Vec<TypeGroup>>,
}
