//! In-memory `.docx` packages for end-to-end tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use image::{ImageFormat, Rgba, RgbaImage};
use zip::write::SimpleFileOptions;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CHART_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
const PICTURE_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const CHART_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
const IMAGE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const HYPERLINK_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// 1 pt in EMU.
pub const EMU_PER_PT: i64 = 12_700;

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A `c:chartSpace` with one type group of `group` and the given series.
pub fn chart_xml(group: &str, title: Option<&str>, series: &[(&str, &[&str], &[f64])]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><c:chart>"#,
    );
    if let Some(title) = title {
        xml.push_str(&format!(
            "<c:title><c:tx><c:rich><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></c:rich></c:tx></c:title>",
            escape(title)
        ));
    }
    xml.push_str(&format!("<c:plotArea><c:layout/><c:{group}>"));
    for (index, (name, categories, values)) in series.iter().enumerate() {
        xml.push_str(&format!(
            "<c:ser><c:idx val=\"{index}\"/><c:tx><c:strRef><c:f>Sheet1!$B$1</c:f><c:strCache><c:ptCount val=\"1\"/><c:pt idx=\"0\"><c:v>{}</c:v></c:pt></c:strCache></c:strRef></c:tx>",
            escape(name)
        ));
        xml.push_str("<c:cat><c:strRef><c:f>Sheet1!$A$2:$A$9</c:f><c:strCache>");
        xml.push_str(&format!("<c:ptCount val=\"{}\"/>", categories.len()));
        for (idx, category) in categories.iter().enumerate() {
            xml.push_str(&format!("<c:pt idx=\"{idx}\"><c:v>{}</c:v></c:pt>", escape(category)));
        }
        xml.push_str("</c:strCache></c:strRef></c:cat>");
        xml.push_str("<c:val><c:numRef><c:f>Sheet1!$B$2:$B$9</c:f><c:numCache><c:formatCode>General</c:formatCode>");
        xml.push_str(&format!("<c:ptCount val=\"{}\"/>", values.len()));
        for (idx, value) in values.iter().enumerate() {
            xml.push_str(&format!("<c:pt idx=\"{idx}\"><c:v>{value}</c:v></c:pt>"));
        }
        xml.push_str("</c:numCache></c:numRef></c:val></c:ser>");
    }
    xml.push_str(&format!("<c:axId val=\"1\"/><c:axId val=\"2\"/></c:{group}></c:plotArea></c:chart></c:chartSpace>"));
    xml
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::new();
    RgbaImage::from_pixel(width, height, Rgba([30, 120, 200, 255]))
        .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .unwrap();
    data
}

#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    rels: Vec<(String, String, String, bool)>,
    parts: Vec<(String, Vec<u8>)>,
    overrides: Vec<(String, String)>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_rel(&self) -> String {
        format!("rId{}", self.rels.len() + 10)
    }

    pub fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    pub fn paragraph(self, text: &str) -> Self {
        let xml = format!(
            "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
            escape(text)
        );
        self.raw(&xml)
    }

    pub fn table(self, rows: &[&[&str]]) -> Self {
        let mut xml = String::from("<w:tbl><w:tblPr/>");
        for row in rows {
            xml.push_str("<w:tr>");
            for cell in *row {
                xml.push_str(&format!(
                    "<w:tc><w:tcPr/><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:tc>",
                    escape(cell)
                ));
            }
            xml.push_str("</w:tr>");
        }
        xml.push_str("</w:tbl>");
        self.raw(&xml)
    }

    /// A chart part referenced from its own paragraph, `cx`/`cy` in points.
    pub fn chart(mut self, chart_xml: &str, width_pt: i64, height_pt: i64) -> Self {
        let r_id = self.next_rel();
        let index = self.parts.len() + 1;
        let partname = format!("word/charts/chart{index}.xml");
        self.rels
            .push((r_id.clone(), CHART_REL.to_string(), format!("charts/chart{index}.xml"), false));
        self.overrides.push((
            format!("/{partname}"),
            "application/vnd.openxmlformats-officedocument.drawingml.chart+xml".to_string(),
        ));
        self.parts.push((partname, chart_xml.as_bytes().to_vec()));

        let graphic = format!("<a:graphicData uri=\"{CHART_URI}\"><c:chart r:id=\"{r_id}\"/></a:graphicData>");
        let xml = format!("<w:p><w:r>{}</w:r></w:p>", drawing(&graphic, width_pt, height_pt, &format!("Chart {index}")));
        self.raw(&xml)
    }

    /// A picture attached to a paragraph with `caption` as its text.
    pub fn picture(mut self, caption: &str, data: Vec<u8>, width_pt: i64, height_pt: i64) -> Self {
        let r_id = self.next_rel();
        let index = self.parts.len() + 1;
        self.rels
            .push((r_id.clone(), IMAGE_REL.to_string(), format!("media/image{index}.png"), false));
        self.parts.push((format!("word/media/image{index}.png"), data));

        let graphic = format!(
            "<a:graphicData uri=\"{PICTURE_URI}\"><pic:pic><pic:blipFill><a:blip r:embed=\"{r_id}\"/></pic:blipFill></pic:pic></a:graphicData>"
        );
        let xml = format!(
            "<w:p><w:r><w:t>{}</w:t></w:r><w:r>{}</w:r></w:p>",
            escape(caption),
            drawing(&graphic, width_pt, height_pt, "Picture")
        );
        self.raw(&xml)
    }

    /// A `c:chart` element whose relationship points at a picture.
    pub fn mislabeled_chart(mut self, data: Vec<u8>) -> Self {
        let r_id = self.next_rel();
        let index = self.parts.len() + 1;
        self.rels
            .push((r_id.clone(), IMAGE_REL.to_string(), format!("media/image{index}.png"), false));
        self.parts.push((format!("word/media/image{index}.png"), data));
        let graphic = format!("<a:graphicData uri=\"{CHART_URI}\"><c:chart r:id=\"{r_id}\"/></a:graphicData>");
        let xml = format!("<w:p><w:r>{}</w:r></w:p>", drawing(&graphic, 100, 100, "Mislabeled"));
        self.raw(&xml)
    }

    /// A paragraph linking to an external site.
    pub fn hyperlink(mut self, text: &str, url: &str) -> Self {
        let r_id = self.next_rel();
        self.rels
            .push((r_id.clone(), HYPERLINK_REL.to_string(), escape(url), true));
        let xml = format!(
            "<w:p><w:hyperlink r:id=\"{r_id}\"><w:r><w:t>{}</w:t></w:r></w:hyperlink></w:p>",
            escape(text)
        );
        self.raw(&xml)
    }

    pub fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="{PICTURE_URI}" xmlns:c="{CHART_URI}"><w:body>{}<w:sectPr/></w:body></w:document>"#,
            self.body
        )
    }

    pub fn build(self) -> Vec<u8> {
        let mut overrides = String::new();
        for (partname, content_type) in &self.overrides {
            overrides.push_str(&format!("<Override PartName=\"{partname}\" ContentType=\"{content_type}\"/>"));
        }
        let content_types = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>{overrides}</Types>"#
        );
        let package_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

        let mut document_rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (r_id, reltype, target, external) in &self.rels {
            let mode = if *external { " TargetMode=\"External\"" } else { "" };
            document_rels.push_str(&format!(
                "<Relationship Id=\"{r_id}\" Type=\"{reltype}\" Target=\"{target}\"{mode}/>"
            ));
        }
        document_rels.push_str("</Relationships>");

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let mut add = |name: &str, data: &[u8]| {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        };
        add("[Content_Types].xml", content_types.as_bytes());
        add("_rels/.rels", package_rels.as_bytes());
        add("word/document.xml", self.document_xml().as_bytes());
        add("word/_rels/document.xml.rels", document_rels.as_bytes());
        for (name, data) in &self.parts {
            add(name, data);
        }
        zip.finish().unwrap().into_inner()
    }
}

fn drawing(graphic: &str, width_pt: i64, height_pt: i64, name: &str) -> String {
    format!(
        "<w:drawing><wp:inline distT=\"0\" distB=\"0\"><wp:extent cx=\"{}\" cy=\"{}\"/><wp:docPr id=\"1\" name=\"{}\"/><a:graphic>{}</a:graphic></wp:inline></w:drawing>",
        width_pt * EMU_PER_PT,
        height_pt * EMU_PER_PT,
        escape(name),
        graphic
    )
}
