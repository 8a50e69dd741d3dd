//! File-level conversion: format sniffing, file to file, and batches.

use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use rayon::prelude::*;

use crate::common::{Error, Result};
use crate::ooxml::docx::Package;
use crate::pipeline::{ConversionReport, Converter};
use crate::sink::PdfSink;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Container family of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Zip-based XML package (.docx).
    Docx,
    /// Legacy binary compound document (.doc).
    LegacyDoc,
    Unknown,
}

/// Identify the container from its leading bytes.
pub fn detect_format(data: &[u8]) -> SourceFormat {
    if data.starts_with(ZIP_MAGIC) {
        SourceFormat::Docx
    } else if data.starts_with(OLE_MAGIC) {
        SourceFormat::LegacyDoc
    } else {
        SourceFormat::Unknown
    }
}

/// Convert an in-memory document to PDF bytes.
pub fn convert_bytes_to_pdf(converter: &Converter, data: impl Into<Bytes>) -> Result<(Vec<u8>, ConversionReport)> {
    let data = data.into();
    match detect_format(&data) {
        SourceFormat::Docx => {},
        SourceFormat::LegacyDoc => {
            return Err(Error::UnsupportedFormat(
                "legacy binary Word documents (.doc) cannot be converted".to_string(),
            ));
        },
        SourceFormat::Unknown => {
            return Err(Error::UnsupportedFormat("input is not a Word document".to_string()));
        },
    }

    let package = Package::from_bytes(data)?;
    let mut sink = PdfSink::new(Vec::new());
    let report = converter.convert_package(&package, &mut sink)?;
    Ok((sink.into_inner(), report))
}

/// Convert `input` into a PDF written to `output`.
pub fn convert_file(converter: &Converter, input: &Path, output: &Path) -> Result<ConversionReport> {
    let data = fs::read(input).map_err(|source| Error::SourceUnreadable {
        path: input.to_path_buf(),
        source,
    })?;
    let (pdf, report) = convert_bytes_to_pdf(converter, data)?;
    fs::write(output, pdf).map_err(|source| Error::DestinationUnwritable {
        path: output.to_path_buf(),
        source,
    })?;
    log::info!("{} -> {}: {}", input.display(), output.display(), report);
    Ok(report)
}

/// `input` with a `.pdf` extension, inside `out_dir` when given.
pub fn output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let renamed = input.with_extension("pdf");
    match (out_dir, renamed.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => renamed,
    }
}

/// Result of one file in [`convert_batch`].
#[derive(Debug)]
pub struct BatchOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<ConversionReport>,
}

/// Convert every `(input, output)` pair, one pipeline per file on the rayon
/// thread pool. Outcomes keep the order of `jobs`.
pub fn convert_batch(converter: &Converter, jobs: &[(PathBuf, PathBuf)]) -> Vec<BatchOutcome> {
    jobs.par_iter()
        .map(|(input, output)| BatchOutcome {
            input: input.clone(),
            output: output.clone(),
            result: convert_file(converter, input, output),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderConfig;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(b"PK\x03\x04rest"), SourceFormat::Docx);
        assert_eq!(detect_format(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0]), SourceFormat::LegacyDoc);
        assert_eq!(detect_format(b"%PDF-1.7"), SourceFormat::Unknown);
        assert_eq!(detect_format(b""), SourceFormat::Unknown);
    }

    #[test]
    fn test_legacy_rejected() {
        let converter = Converter::new(RenderConfig::default()).unwrap();
        let err = convert_bytes_to_pdf(&converter, OLE_MAGIC.to_vec()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_output_path() {
        assert_eq!(output_path(Path::new("a/report.docx"), None), PathBuf::from("a/report.pdf"));
        assert_eq!(
            output_path(Path::new("a/report.docx"), Some(Path::new("out"))),
            PathBuf::from("out/report.pdf")
        );
    }

    #[test]
    fn test_missing_source() {
        let converter = Converter::new(RenderConfig::default()).unwrap();
        let err = convert_file(&converter, Path::new("/nonexistent/in.docx"), Path::new("/tmp/out.pdf")).unwrap_err();
        assert!(matches!(err, Error::SourceUnreadable { .. }));
    }
}
