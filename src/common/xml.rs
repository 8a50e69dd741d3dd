//! Small helpers over `quick-xml` events shared by the part parsers.
//!
//! Every parser in this crate follows the same discipline: a `parse_*`
//! function is entered right after the `Start` event of its element and
//! returns after consuming the matching `End`. Unknown children are skipped
//! whole with [`skip_element`].

use crate::ooxml::error::Result;
use quick_xml::Reader;
use quick_xml::events::{BytesRef, BytesStart, Event};

/// Value of the first attribute whose local name is `local`.
///
/// Prefixes are ignored, so `r:id`, `r:embed` and `val` match on `id`,
/// `embed` and `val` whatever namespace prefix the producer picked.
pub(crate) fn attr_value(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == local)
        .and_then(|attr| attr.unescape_value().ok())
        .map(|value| value.into_owned())
}

/// Parse an integer attribute, returning `None` when absent or malformed.
pub(crate) fn attr_i64(e: &BytesStart<'_>, local: &[u8]) -> Option<i64> {
    attr_value(e, local).and_then(|v| v.trim().parse().ok())
}

/// Text for an entity or character reference that `quick-xml` reports
/// separately from the surrounding text.
pub(crate) fn resolve_reference(r: &BytesRef<'_>) -> Option<String> {
    let raw: &[u8] = r;
    let name = std::str::from_utf8(raw).ok()?;
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    let text = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        _ => return None,
    };
    Some(text.to_string())
}

/// Character content of a text-only element such as `w:t`, `a:t` or `c:v`,
/// entity and character references included.
pub(crate) fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(std::str::from_utf8(t.as_ref())?),
            Event::CData(t) => text.push_str(std::str::from_utf8(t.as_ref())?),
            Event::GeneralRef(r) => {
                if let Some(resolved) = resolve_reference(&r) {
                    text.push_str(&resolved);
                }
            },
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(_) | Event::Eof => return Ok(text),
            _ => {},
        }
    }
}

/// Consume everything up to and including the end of `start`.
pub(crate) fn skip_element(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
) -> Result<()> {
    reader.read_to_end(start.name())?;
    Ok(())
}
