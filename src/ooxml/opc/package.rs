//! In-memory view of an OPC package.
//!
//! The whole zip container is read once; every member becomes a [`Part`]
//! holding its bytes, its content type and its own relationships. Part
//! blobs are [`Bytes`], so handing one to a content block is a reference
//! count bump rather than a copy.

use crate::ooxml::opc::constants::relationship_type as RT;
use crate::ooxml::opc::content_types::ContentTypeMap;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::rel::{Relationship, Relationships};
use bytes::Bytes;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// One part of the package.
#[derive(Debug, Clone)]
pub struct Part {
    partname: PackURI,
    content_type: String,
    blob: Bytes,
    rels: Relationships,
}

impl Part {
    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    #[inline]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[inline]
    pub fn blob(&self) -> &Bytes {
        &self.blob
    }

    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }
}

/// An opened OPC package.
#[derive(Debug)]
pub struct OpcPackage {
    parts: HashMap<PackURI, Part>,
    rels: Relationships,
}

impl OpcPackage {
    /// Open an OPC package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.display().to_string()));
        }
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
        Self::from_reader(Cursor::new(data.into()))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut members: HashMap<String, Vec<u8>> = HashMap::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut data = Vec::with_capacity(file.size().min(64 << 20) as usize);
            file.read_to_end(&mut data)?;
            members.insert(name, data);
        }

        let content_types = members
            .get(CONTENT_TYPES_URI.trim_start_matches('/'))
            .ok_or_else(|| OpcError::PartNotFound("[Content_Types].xml".to_string()))
            .and_then(|xml| ContentTypeMap::from_xml(xml))?;

        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let rels = Self::load_rels(&members, &package_uri)?;

        let mut parts = HashMap::with_capacity(members.len());
        for (name, data) in &members {
            if name.ends_with(".rels") || name.eq_ignore_ascii_case("[Content_Types].xml") {
                continue;
            }
            let partname = PackURI::from_membername(name).map_err(OpcError::InvalidPackUri)?;
            let content_type = match content_types.get(&partname) {
                Some(ct) => ct.to_string(),
                None => {
                    log::debug!("no content type for {}", partname);
                    String::new()
                },
            };
            let part_rels = Self::load_rels(&members, &partname)?;
            parts.insert(
                partname.clone(),
                Part {
                    partname,
                    content_type,
                    blob: Bytes::copy_from_slice(data),
                    rels: part_rels,
                },
            );
        }

        log::debug!("opened package with {} parts", parts.len());
        Ok(Self { parts, rels })
    }

    fn load_rels(members: &HashMap<String, Vec<u8>>, source: &PackURI) -> Result<Relationships> {
        let rels_uri = source.rels_uri().map_err(OpcError::InvalidPackUri)?;
        match members.get(rels_uri.membername()) {
            Some(xml) => Relationships::from_xml(xml, source.base_uri()),
            None => Ok(Relationships::new(source.base_uri().to_string())),
        }
    }

    /// Package-level relationships (`/_rels/.rels`).
    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    pub fn part(&self, partname: &PackURI) -> Result<&Part> {
        self.parts
            .get(partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// The part the package's `officeDocument` relationship points at.
    pub fn main_document_part(&self) -> Result<&Part> {
        let rel = self.rels.part_with_reltype(RT::is_office_document)?;
        self.part(&rel.target_partname()?)
    }

    /// Follow relationship `r_id` of `source` to the part it targets.
    pub fn related_part<'a>(
        &'a self,
        source: &'a Part,
        r_id: &str,
    ) -> Result<(&'a Relationship, &'a Part)> {
        let rel = source.rels.get(r_id).ok_or_else(|| {
            OpcError::RelationshipNotFound(format!("{} in {}", r_id, source.partname))
        })?;
        let part = self.part(&rel.target_partname()?)?;
        Ok((rel, part))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as CT;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    const CONTENT_TYPES: &[u8] = br#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

    const PACKAGE_RELS: &[u8] = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

    const DOCUMENT_RELS: &[u8] = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
<Relationship Id="rId6" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/missing.png"/>
</Relationships>"#;

    #[test]
    fn test_open_and_follow_relationships() {
        let data = build(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", PACKAGE_RELS),
            ("word/document.xml", b"<w:document/>"),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS),
            ("word/media/image1.png", b"\x89PNG"),
        ]);
        let package = OpcPackage::from_bytes(data).unwrap();

        let main = package.main_document_part().unwrap();
        assert_eq!(main.partname().as_str(), "/word/document.xml");
        assert_eq!(main.content_type(), CT::WML_DOCUMENT_MAIN);

        let (rel, image) = package.related_part(main, "rId5").unwrap();
        assert!(RT::is_image(rel.reltype()));
        assert_eq!(image.content_type(), CT::PNG);
        assert_eq!(image.blob().as_ref(), b"\x89PNG");

        assert!(matches!(
            package.related_part(main, "rId6"),
            Err(OpcError::PartNotFound(_))
        ));
        assert!(matches!(
            package.related_part(main, "rId99"),
            Err(OpcError::RelationshipNotFound(_))
        ));
    }

    #[test]
    fn test_missing_content_types() {
        let data = build(&[("word/document.xml", b"<w:document/>")]);
        assert!(matches!(
            OpcPackage::from_bytes(data),
            Err(OpcError::PartNotFound(_))
        ));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            OpcPackage::from_bytes(b"plain text".to_vec()),
            Err(OpcError::ZipError(_))
        ));
    }
}
