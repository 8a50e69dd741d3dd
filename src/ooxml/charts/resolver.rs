//! Chart data resolution.
//!
//! Turns the bytes of a chart part into a [`ChartModel`]. Every step below
//! returns a `Result`; [`ChartResolver::resolve`] is the only place where
//! errors are folded into defaults, so resolution as a whole never fails.

use thiserror::Error;

use crate::document::{ChartKind, ChartModel, Series};
use crate::ooxml::charts::models::{
    ChartPart, DataSource, DataSourceRef, GroupTag, PointCache, RawSeries, TypeGroup,
};
use crate::ooxml::charts::reader::parse_chart_part;

/// Name given to a series whose name cannot be determined.
pub const DEFAULT_SERIES_NAME: &str = "Series";

const DEMO_CATEGORIES: [&str; 3] = ["Category 1", "Category 2", "Category 3"];
const DEMO_VALUES: [f64; 3] = [10.0, 20.0, 15.0];

/// Kinds in the order they are looked for, each with its 2D and 3D tag.
const KIND_PRIORITY: [(ChartKind, GroupTag, GroupTag); 4] = [
    (ChartKind::Bar, GroupTag::Bar, GroupTag::Bar3D),
    (ChartKind::Line, GroupTag::Line, GroupTag::Line3D),
    (ChartKind::Pie, GroupTag::Pie, GroupTag::Pie3D),
    (ChartKind::Area, GroupTag::Area, GroupTag::Area3D),
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("chart part is malformed: {0}")]
    Malformed(String),

    #[error("chart has no plot area")]
    MissingPlotArea,

    #[error("no bar, line, pie or area group in plot area (found: {0})")]
    UnsupportedKind(String),

    #[error("chart has no title")]
    MissingTitle,

    #[error("series has no {0}")]
    MissingData(&'static str),

    #[error("live data for '{0}' is not available")]
    LiveUnavailable(String),

    #[error("point {0} is blank")]
    BlankPoint(usize),

    #[error("point {idx} is not a number: {text:?}")]
    BadNumber { idx: usize, text: String },
}

/// How missing series data is filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveMode {
    /// Missing data stays missing; the renderer shows a placeholder.
    #[default]
    Faithful,
    /// Missing categories and values are replaced by fixed sample data.
    Demo,
}

/// Provider for data behind live references (`c:f` formulas).
pub trait LiveDataSource: Send + Sync {
    fn strings(&self, reference: &DataSourceRef) -> Result<Vec<String>, ResolveError>;

    fn numbers(&self, reference: &DataSourceRef) -> Result<Vec<f64>, ResolveError>;
}

/// The default provider: no live reference can be followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLiveData;

impl LiveDataSource for NoLiveData {
    fn strings(&self, reference: &DataSourceRef) -> Result<Vec<String>, ResolveError> {
        Err(ResolveError::LiveUnavailable(reference.formula.clone()))
    }

    fn numbers(&self, reference: &DataSourceRef) -> Result<Vec<f64>, ResolveError> {
        Err(ResolveError::LiveUnavailable(reference.formula.clone()))
    }
}

/// Resolves chart parts into chart models.
pub struct ChartResolver {
    mode: ResolveMode,
    live: Box<dyn LiveDataSource>,
}

impl std::fmt::Debug for ChartResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartResolver").field("mode", &self.mode).finish_non_exhaustive()
    }
}

impl Default for ChartResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartResolver {
    pub fn new() -> Self {
        Self {
            mode: ResolveMode::default(),
            live: Box::new(NoLiveData),
        }
    }

    pub fn with_mode(mut self, mode: ResolveMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_live_data(mut self, live: impl LiveDataSource + 'static) -> Self {
        self.live = Box::new(live);
        self
    }

    #[inline]
    pub fn mode(&self) -> ResolveMode {
        self.mode
    }

    /// Resolve a chart part. Never fails; see the module docs.
    pub fn resolve(&self, xml: &[u8]) -> ChartModel {
        let part = match self.read(xml) {
            Ok(part) => part,
            Err(e) => {
                log::warn!("{}", e);
                return ChartModel::default();
            },
        };

        let title = self.title(&part).unwrap_or_else(|e| {
            log::debug!("{}", e);
            String::new()
        });

        let (kind, group) = match self.kind(&part) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("chart {:?}: {}", title, e);
                return ChartModel {
                    title,
                    kind: ChartKind::Unknown,
                    series: Vec::new(),
                };
            },
        };

        let raw_series = match kind {
            ChartKind::Pie => &group.series[..group.series.len().min(1)],
            _ => &group.series[..],
        };
        let series = raw_series
            .iter()
            .enumerate()
            .map(|(index, raw)| self.fold_series(index, raw))
            .collect();

        ChartModel {
            title,
            kind,
            series,
        }
    }

    fn fold_series(&self, index: usize, raw: &RawSeries) -> Series {
        let name = self.series_name(raw).unwrap_or_else(|e| {
            log::debug!("series {}: {}", index, e);
            DEFAULT_SERIES_NAME.to_string()
        });

        let values: Vec<f64> = match self.values(raw) {
            Ok(points) => points
                .into_iter()
                .map(|point| {
                    point.unwrap_or_else(|e| {
                        match e {
                            ResolveError::BlankPoint(_) => log::debug!("series {:?}: {}", name, e),
                            _ => log::warn!("series {:?}: {}; using 0", name, e),
                        }
                        0.0
                    })
                })
                .collect(),
            Err(e) => {
                log::warn!("series {:?}: {}", name, e);
                Vec::new()
            },
        };

        let categories = match self.categories(raw) {
            Ok(categories) => categories,
            Err(ResolveError::MissingData(_)) if !values.is_empty() => {
                (1..=values.len()).map(|i| i.to_string()).collect()
            },
            Err(e) => {
                log::warn!("series {:?}: {}", name, e);
                Vec::new()
            },
        };

        let (categories, values) = match self.mode {
            ResolveMode::Demo if categories.is_empty() || values.is_empty() => {
                log::info!("series {:?}: no data, using sample values", name);
                (
                    DEMO_CATEGORIES.iter().map(|c| c.to_string()).collect(),
                    DEMO_VALUES.to_vec(),
                )
            },
            _ => (categories, values),
        };

        if categories.len() != values.len() {
            log::warn!(
                "series {:?} has {} categories and {} values; truncating to {}",
                name,
                categories.len(),
                values.len(),
                categories.len().min(values.len())
            );
        }
        Series::new(name, categories, values)
    }

    pub fn read(&self, xml: &[u8]) -> Result<ChartPart, ResolveError> {
        parse_chart_part(xml).map_err(|e| ResolveError::Malformed(e.to_string()))
    }

    /// The highest-priority kind present in the plot area, with its group.
    pub fn kind<'p>(&self, part: &'p ChartPart) -> Result<(ChartKind, &'p TypeGroup), ResolveError> {
        let groups = part.groups.as_ref().ok_or(ResolveError::MissingPlotArea)?;
        for (kind, flat, solid) in &KIND_PRIORITY {
            let found = groups
                .iter()
                .find(|g| g.tag == *flat)
                .or_else(|| groups.iter().find(|g| g.tag == *solid));
            if let Some(group) = found {
                return Ok((*kind, group));
            }
        }

        let found: Vec<String> = groups
            .iter()
            .map(|g| match &g.tag {
                GroupTag::Other(name) => name.clone(),
                tag => format!("{:?}", tag),
            })
            .collect();
        Err(ResolveError::UnsupportedKind(if found.is_empty() {
            "nothing".to_string()
        } else {
            found.join(", ")
        }))
    }

    pub fn title(&self, part: &ChartPart) -> Result<String, ResolveError> {
        match &part.title {
            Some(DataSource::Cached(text)) => Ok(text.clone()),
            Some(DataSource::Live(r)) => self
                .live
                .strings(r)?
                .into_iter()
                .next()
                .ok_or(ResolveError::MissingTitle),
            None => Err(ResolveError::MissingTitle),
        }
    }

    pub fn series_name(&self, raw: &RawSeries) -> Result<String, ResolveError> {
        let name = match &raw.name {
            Some(DataSource::Cached(name)) => name.clone(),
            Some(DataSource::Live(r)) => self.live.strings(r)?.into_iter().next().unwrap_or_default(),
            None => return Err(ResolveError::MissingData("name")),
        };
        if name.is_empty() {
            return Err(ResolveError::MissingData("name"));
        }
        Ok(name)
    }

    pub fn categories(&self, raw: &RawSeries) -> Result<Vec<String>, ResolveError> {
        match &raw.categories {
            Some(DataSource::Cached(cache)) => Ok(cache
                .dense()
                .into_iter()
                .map(|text| text.unwrap_or_default().to_string())
                .collect()),
            Some(DataSource::Live(r)) => self.live.strings(r),
            None => Err(ResolveError::MissingData("categories")),
        }
    }

    /// Values point by point; a point that is blank or not a number is an
    /// error of its own.
    pub fn values(&self, raw: &RawSeries) -> Result<Vec<Result<f64, ResolveError>>, ResolveError> {
        match &raw.values {
            Some(DataSource::Cached(cache)) => Ok(parse_points(cache)),
            Some(DataSource::Live(r)) => Ok(self.live.numbers(r)?.into_iter().map(Ok).collect()),
            None => Err(ResolveError::MissingData("values")),
        }
    }
}

fn parse_points(cache: &PointCache) -> Vec<Result<f64, ResolveError>> {
    cache
        .dense()
        .into_iter()
        .enumerate()
        .map(|(idx, text)| match text {
            Some(text) => parse_number(idx, text),
            None => Err(ResolveError::BlankPoint(idx)),
        })
        .collect()
}

fn parse_number(idx: usize, text: &str) -> Result<f64, ResolveError> {
    fast_float2::parse::<f64, _>(text.trim())
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ResolveError::BadNumber {
            idx,
            text: text.to_string(),
        })
}
