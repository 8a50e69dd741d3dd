//! Chart XML reader.
//!
//! Parses a DrawingML chart part (`c:chartSpace`) into a [`ChartPart`].
//! Only what the resolver consumes is kept: the title, the type groups of
//! the plot area and the data sources of their series. Elements are
//! matched on local names, so any namespace prefix works.

use crate::common::xml::{attr_i64, read_text, skip_element};
use crate::ooxml::charts::models::{
    CachedPoint, ChartPart, DataSource, GroupTag, PointCache, RawSeries, TypeGroup,
};
use crate::ooxml::error::Result;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Parse a chart XML document.
pub fn parse_chart_part(xml: &[u8]) -> Result<ChartPart> {
    let mut reader = Reader::from_reader(xml);
    let mut part = ChartPart::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                // c:chartSpace and c:chart are walked through
                b"chartSpace" | b"chart" => {},
                b"title" if part.title.is_none() => part.title = parse_title(&mut reader)?,
                b"plotArea" => part.groups = Some(parse_plot_area(&mut reader)?),
                _ => skip_element(&mut reader, &e)?,
            },
            Event::Empty(e) if e.local_name().as_ref() == b"plotArea" => {
                part.groups = Some(Vec::new());
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(part)
}

fn parse_title(reader: &mut Reader<&[u8]>) -> Result<Option<DataSource<String>>> {
    let mut title = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tx" => title = parse_text_source(reader)?,
                _ => skip_element(reader, &e)?,
            },
            Event::End(_) | Event::Eof => return Ok(title),
            _ => {},
        }
    }
}

/// `c:tx` of a title or a series: rich text, a string reference or a
/// literal value.
fn parse_text_source(reader: &mut Reader<&[u8]>) -> Result<Option<DataSource<String>>> {
    let mut source = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"rich" => source = parse_rich(reader)?.map(DataSource::Cached),
                b"v" => source = Some(DataSource::Cached(read_text(reader)?)),
                b"strRef" => {
                    source = parse_reference(reader)?.map(|s| {
                        s.map(|cache| cache.first().unwrap_or_default().to_string())
                    })
                },
                _ => skip_element(reader, &e)?,
            },
            Event::End(_) | Event::Eof => return Ok(source),
            _ => {},
        }
    }
}

/// Text of the first run (`a:r/a:t`) of a rich-text body.
fn parse_rich(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut text = None;
    let mut in_run = false;
    let mut depth = 1usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"r" => {
                    in_run = true;
                    depth += 1;
                },
                b"t" if in_run && text.is_none() => text = Some(read_text(reader)?),
                b"p" => depth += 1,
                _ => skip_element(reader, &e)?,
            },
            Event::End(e) => {
                if e.local_name().as_ref() == b"r" {
                    in_run = false;
                }
                depth -= 1;
                if depth == 0 {
                    return Ok(text);
                }
            },
            Event::Eof => return Ok(text),
            _ => {},
        }
    }
}

fn parse_plot_area(reader: &mut Reader<&[u8]>) -> Result<Vec<TypeGroup>> {
    let mut groups = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match GroupTag::from_local_name(e.local_name().as_ref()) {
                Some(tag) => groups.push(TypeGroup {
                    tag,
                    series: parse_type_group(reader)?,
                }),
                None => skip_element(reader, &e)?,
            },
            Event::Empty(e) => {
                if let Some(tag) = GroupTag::from_local_name(e.local_name().as_ref()) {
                    groups.push(TypeGroup {
                        tag,
                        series: Vec::new(),
                    });
                }
            },
            Event::End(_) | Event::Eof => return Ok(groups),
            _ => {},
        }
    }
}

fn parse_type_group(reader: &mut Reader<&[u8]>) -> Result<Vec<RawSeries>> {
    let mut series = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"ser" => series.push(parse_series(reader)?),
                _ => skip_element(reader, &e)?,
            },
            Event::End(_) | Event::Eof => return Ok(series),
            _ => {},
        }
    }
}

fn parse_series(reader: &mut Reader<&[u8]>) -> Result<RawSeries> {
    let mut series = RawSeries::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tx" => series.name = parse_text_source(reader)?,
                b"cat" | b"xVal" => series.categories = parse_data_source(reader)?,
                b"val" | b"yVal" => series.values = parse_data_source(reader)?,
                _ => skip_element(reader, &e)?,
            },
            Event::End(_) | Event::Eof => return Ok(series),
            _ => {},
        }
    }
}

/// `c:cat` or `c:val`: a reference with an optional cache, or a literal.
fn parse_data_source(reader: &mut Reader<&[u8]>) -> Result<Option<DataSource<PointCache>>> {
    let mut source = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"strRef" | b"numRef" | b"multiLvlStrRef" => source = parse_reference(reader)?,
                b"strLit" | b"numLit" => {
                    let cache = parse_point_cache(reader)?;
                    source = (!cache.is_empty()).then_some(DataSource::Cached(cache));
                },
                _ => skip_element(reader, &e)?,
            },
            Event::End(_) | Event::Eof => return Ok(source),
            _ => {},
        }
    }
}

/// `c:strRef`, `c:numRef` or `c:multiLvlStrRef`. An empty cache counts as
/// no cache.
fn parse_reference(reader: &mut Reader<&[u8]>) -> Result<Option<DataSource<PointCache>>> {
    let mut formula = None;
    let mut cache = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"f" => {
                    let f = read_text(reader)?;
                    formula = (!f.trim().is_empty()).then_some(f);
                },
                b"strCache" | b"numCache" => cache = Some(parse_point_cache(reader)?),
                b"multiLvlStrCache" => cache = parse_multi_level_cache(reader)?,
                _ => skip_element(reader, &e)?,
            },
            Event::End(_) | Event::Eof => break,
            _ => {},
        }
    }
    Ok(DataSource::select(cache.filter(|c| !c.is_empty()), formula))
}

fn parse_point_cache(reader: &mut Reader<&[u8]>) -> Result<PointCache> {
    let mut cache = PointCache::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"pt" => {
                    let idx = attr_i64(&e, b"idx")
                        .and_then(|i| u32::try_from(i).ok())
                        .unwrap_or(cache.points.len() as u32);
                    let text = parse_point(reader)?;
                    cache.points.push(CachedPoint { idx, text });
                },
                b"formatCode" => cache.format_code = Some(read_text(reader)?),
                b"ptCount" => {
                    cache.pt_count = attr_i64(&e, b"val").and_then(|v| u32::try_from(v).ok());
                    skip_element(reader, &e)?;
                },
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) if e.local_name().as_ref() == b"ptCount" => {
                cache.pt_count = attr_i64(&e, b"val").and_then(|v| u32::try_from(v).ok());
            },
            Event::End(_) | Event::Eof => return Ok(cache),
            _ => {},
        }
    }
}

fn parse_point(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"v" => text = read_text(reader)?,
                _ => skip_element(reader, &e)?,
            },
            Event::End(_) | Event::Eof => return Ok(text),
            _ => {},
        }
    }
}

/// The first `c:lvl` of a multi-level cache holds the innermost labels.
fn parse_multi_level_cache(reader: &mut Reader<&[u8]>) -> Result<Option<PointCache>> {
    let mut pt_count = None;
    let mut level: Option<PointCache> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"lvl" if level.is_none() => level = Some(parse_point_cache(reader)?),
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) if e.local_name().as_ref() == b"ptCount" => {
                pt_count = attr_i64(&e, b"val").and_then(|v| u32::try_from(v).ok());
            },
            Event::End(_) | Event::Eof => break,
            _ => {},
        }
    }
    Ok(level.map(|mut cache| {
        cache.pt_count = cache.pt_count.or(pt_count);
        cache
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::charts::models::DataSourceRef;

    fn chart_space(title: &str, plot_area: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<c:date1904 val="0"/><c:lang val="en-US"/>
<c:chart>{}<c:autoTitleDeleted val="0"/><c:plotArea><c:layout/>{}<c:catAx><c:axId val="1"/><c:title><c:tx><c:rich><a:p><a:r><a:t>Axis</a:t></a:r></a:p></c:rich></c:tx></c:title></c:catAx></c:plotArea><c:legend><c:legendPos val="r"/></c:legend><c:plotVisOnly val="1"/></c:chart>
<c:externalData r:id="rId1"/></c:chartSpace>"#,
            title, plot_area
        )
    }

    const RICH_TITLE: &str = r#"<c:title><c:tx><c:rich><a:bodyPr/><a:lstStyle/><a:p><a:pPr><a:defRPr/></a:pPr><a:r><a:rPr lang="en-US"/><a:t>Sales &amp; Costs</a:t></a:r><a:r><a:t> 2024</a:t></a:r></a:p></c:rich></c:tx><c:overlay val="0"/></c:title>"#;

    const BAR_GROUP: &str = r#"<c:barChart><c:barDir val="col"/><c:grouping val="clustered"/><c:varyColors val="0"/>
<c:ser><c:idx val="0"/><c:order val="0"/>
<c:tx><c:strRef><c:f>Sheet1!$B$1</c:f><c:strCache><c:ptCount val="1"/><c:pt idx="0"><c:v>S1</c:v></c:pt></c:strCache></c:strRef></c:tx>
<c:spPr><a:solidFill><a:srgbClr val="4472C4"/></a:solidFill></c:spPr>
<c:cat><c:strRef><c:f>Sheet1!$A$2:$A$4</c:f><c:strCache><c:ptCount val="3"/><c:pt idx="0"><c:v>A</c:v></c:pt><c:pt idx="2"><c:v>C</c:v></c:pt><c:pt idx="1"><c:v>B</c:v></c:pt></c:strCache></c:strRef></c:cat>
<c:val><c:numRef><c:f>Sheet1!$B$2:$B$4</c:f><c:numCache><c:formatCode>General</c:formatCode><c:ptCount val="3"/><c:pt idx="0"><c:v>1</c:v></c:pt><c:pt idx="1"><c:v>4</c:v></c:pt><c:pt idx="2"><c:v>3</c:v></c:pt></c:numCache></c:numRef></c:val>
</c:ser><c:gapWidth val="219"/><c:axId val="1"/><c:axId val="2"/></c:barChart>"#;

    #[test]
    fn test_title_and_bar_group() {
        let xml = chart_space(RICH_TITLE, BAR_GROUP);
        let part = parse_chart_part(xml.as_bytes()).unwrap();

        assert_eq!(part.title, Some(DataSource::Cached("Sales & Costs".to_string())));

        let groups = part.groups.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].tag, GroupTag::Bar);

        let series = &groups[0].series[0];
        assert_eq!(series.name, Some(DataSource::Cached("S1".to_string())));

        let Some(DataSource::Cached(categories)) = &series.categories else {
            panic!("expected cached categories");
        };
        assert_eq!(categories.dense(), [Some("A"), Some("B"), Some("C")]);

        let Some(DataSource::Cached(values)) = &series.values else {
            panic!("expected cached values");
        };
        assert_eq!(values.format_code.as_deref(), Some("General"));
        assert_eq!(values.dense(), [Some("1"), Some("4"), Some("3")]);
    }

    #[test]
    fn test_reference_without_cache_is_live() {
        let group = r#"<c:lineChart><c:ser><c:tx><c:v>Literal name</c:v></c:tx>
<c:cat><c:numRef><c:f>Sheet1!$A$2:$A$3</c:f></c:numRef></c:cat>
<c:val><c:numRef><c:f>Sheet1!$B$2:$B$3</c:f><c:numCache><c:ptCount val="0"/></c:numCache></c:numRef></c:val></c:ser></c:lineChart>"#;
        let part = parse_chart_part(chart_space("", group).as_bytes()).unwrap();

        assert_eq!(part.title, None);
        let series = &part.groups.unwrap()[0].series[0];
        assert_eq!(series.name, Some(DataSource::Cached("Literal name".to_string())));
        assert_eq!(
            series.categories,
            Some(DataSource::Live(DataSourceRef::new("Sheet1!$A$2:$A$3")))
        );
        assert_eq!(
            series.values,
            Some(DataSource::Live(DataSourceRef::new("Sheet1!$B$2:$B$3")))
        );
    }

    #[test]
    fn test_literals_and_multi_level_categories() {
        let group = r#"<c:pie3DChart><c:ser>
<c:cat><c:multiLvlStrRef><c:f>Sheet1!$A$2:$B$3</c:f><c:multiLvlStrCache><c:ptCount val="2"/>
<c:lvl><c:pt idx="0"><c:v>Jan</c:v></c:pt><c:pt idx="1"><c:v>Feb</c:v></c:pt></c:lvl>
<c:lvl><c:pt idx="0"><c:v>Q1</c:v></c:pt></c:lvl></c:multiLvlStrCache></c:multiLvlStrRef></c:cat>
<c:val><c:numLit><c:ptCount val="2"/><c:pt idx="0"><c:v>5</c:v></c:pt><c:pt idx="1"><c:v>7.5</c:v></c:pt></c:numLit></c:val>
</c:ser></c:pie3DChart>"#;
        let part = parse_chart_part(chart_space("", group).as_bytes()).unwrap();
        let groups = part.groups.unwrap();
        assert_eq!(groups[0].tag, GroupTag::Pie3D);

        let series = &groups[0].series[0];
        let Some(DataSource::Cached(categories)) = &series.categories else {
            panic!("expected cached categories");
        };
        assert_eq!(categories.dense(), [Some("Jan"), Some("Feb")]);
        let Some(DataSource::Cached(values)) = &series.values else {
            panic!("expected cached values");
        };
        assert_eq!(values.dense(), [Some("5"), Some("7.5")]);
    }

    #[test]
    fn test_unknown_group_and_missing_plot_area() {
        let part = parse_chart_part(chart_space("", "<c:radarChart><c:ser/></c:radarChart>").as_bytes())
            .unwrap();
        let groups = part.groups.unwrap();
        assert_eq!(groups[0].tag, GroupTag::Other("radarChart".to_string()));

        let xml = r#"<c:chartSpace xmlns:c="urn:c"><c:chart/></c:chartSpace>"#;
        assert_eq!(parse_chart_part(xml.as_bytes()).unwrap().groups, None);
    }

    #[test]
    fn test_malformed_chart() {
        assert!(parse_chart_part(b"<c:chartSpace><c:chart></c:chartSpace>").is_err());
    }
}
