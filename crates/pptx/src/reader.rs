//! Text outline of an existing `.pptx` deck.
//!
//! Used to turn a reference deck into inspiration text for a new request,
//! and to check exported decks in tests. Slides follow `p:sldIdLst` order;
//! text inside a slide is ordered top-to-bottom, then left-to-right.

use deck_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// One slide's text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineSlide {
    /// 1-based position in the deck.
    pub number: usize,
    /// Text blocks in reading order. Paragraphs of one block are joined by `\n`.
    pub lines: Vec<String>,
}

impl OutlineSlide {
    /// The top-most text block.
    pub fn title(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }
}

/// Text of a whole deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckOutline {
    pub slides: Vec<OutlineSlide>,
}

impl DeckOutline {
    pub fn titles(&self) -> Vec<&str> {
        self.slides.iter().filter_map(OutlineSlide::title).collect()
    }

    /// Plain-text rendering suitable for a request's inspiration field.
    pub fn to_inspiration(&self) -> String {
        let mut text = String::new();
        for slide in &self.slides {
            let Some(title) = slide.title() else {
                continue;
            };
            // Writing into a String cannot fail.
            let _ = writeln!(text, "Slide {}: {}", slide.number, title.replace('\n', " "));
            for line in slide.lines.iter().skip(1) {
                for part in line.lines().filter(|l| !l.trim().is_empty()) {
                    let _ = writeln!(text, "- {}", part.trim());
                }
            }
        }
        text.trim_end().to_string()
    }
}

/// Reads deck outlines from `.pptx` archives.
#[derive(Debug, Default)]
pub struct DeckReader;

impl DeckReader {
    pub fn new() -> Self {
        Self
    }

    /// Read the outline of a `.pptx` from any seekable source.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<DeckOutline> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        if archive.by_name("ppt/presentation.xml").is_err() {
            return Err(Error::UnsupportedFormat(
                "ZIP archive has no ppt/presentation.xml".to_string(),
            ));
        }

        let targets = self.slide_targets(&mut archive)?;
        let order = self.slide_order(&mut archive)?;

        let mut outline = DeckOutline::default();
        for rel_id in order {
            let Some(path) = targets.get(&rel_id) else {
                log::warn!("Slide relationship {} has no target, skipping", rel_id);
                continue;
            };
            let xml = read_part(&mut archive, path)?;
            outline.slides.push(OutlineSlide {
                number: outline.slides.len() + 1,
                lines: text_blocks(&xml),
            });
        }
        Ok(outline)
    }

    /// `r:id` of every slide in presentation order.
    fn slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let xml = read_part(archive, "ppt/presentation.xml")?;
        let mut reader = Reader::from_str(&xml);
        reader.trim_text(true);

        let mut order = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"sldId" => {
                    if let Some(id) = attr(e, b"r:id") {
                        order.push(id);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlError(format!("Error parsing presentation: {}", e))),
                _ => {}
            }
        }
        Ok(order)
    }

    /// Map of slide relationship id to archive path.
    fn slide_targets<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<HashMap<String, String>> {
        let xml = read_part(archive, "ppt/_rels/presentation.xml.rels")?;
        let mut reader = Reader::from_str(&xml);
        reader.trim_text(true);

        let mut targets = HashMap::new();
        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"Relationship" => {
                    let rel_type = attr(e, b"Type").unwrap_or_default();
                    if !rel_type.ends_with("/slide") {
                        continue;
                    }
                    if let (Some(id), Some(target)) = (attr(e, b"Id"), attr(e, b"Target")) {
                        let path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("ppt/{}", target),
                        };
                        targets.insert(id, path);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlError(format!("Error parsing relationships: {}", e))),
                _ => {}
            }
        }
        Ok(targets)
    }
}

/// A shape's text and where it sits.
#[derive(Debug, Default)]
struct TextBlock {
    text: String,
    x: i64,
    y: i64,
}

/// Text blocks of one slide part in reading order.
fn text_blocks(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut current: Option<TextBlock> = None;
    let mut paragraphs: Vec<String> = Vec::new();
    let mut in_paragraph = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    current = Some(TextBlock::default());
                    paragraphs.clear();
                }
                b"p" if current.is_some() => {
                    in_paragraph = true;
                    paragraphs.push(String::new());
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) if local_name(e.name().as_ref()) == b"off" => {
                if let Some(block) = current.as_mut() {
                    block.x = attr(e, b"x").and_then(|v| v.parse().ok()).unwrap_or(0);
                    block.y = attr(e, b"y").and_then(|v| v.parse().ok()).unwrap_or(0);
                }
            }
            Ok(Event::Text(ref e)) if in_paragraph => {
                if let Some(paragraph) = paragraphs.last_mut() {
                    paragraph.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"p" => in_paragraph = false,
                b"sp" => {
                    if let Some(mut block) = current.take() {
                        let text: Vec<&str> = paragraphs
                            .iter()
                            .map(|p| p.trim())
                            .filter(|p| !p.is_empty())
                            .collect();
                        block.text = text.join("\n");
                        if !block.text.is_empty() {
                            blocks.push(block);
                        }
                    }
                    in_paragraph = false;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("XML parsing error in slide (continuing): {}", e);
                break;
            }
            _ => {}
        }
    }

    blocks.sort_by_key(|b| (b.y, b.x));
    blocks.into_iter().map(|b| b.text).collect()
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;
    Ok(content)
}

fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// `p:sp` -> `sp`.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"sldId"), b"sldId");
    }

    #[test]
    fn test_text_blocks_reading_order() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:sp><p:spPr><a:xfrm><a:off x="500" y="2000"/></a:xfrm></p:spPr>
              <p:txBody><a:p><a:r><a:t>Punkt ett</a:t></a:r></a:p><a:p><a:r><a:t>Punkt &amp; två</a:t></a:r></a:p></p:txBody></p:sp>
            <p:sp><p:spPr><a:xfrm><a:off x="500" y="100"/></a:xfrm></p:spPr>
              <p:txBody><a:p><a:r><a:t>Rubrik</a:t></a:r></a:p></p:txBody></p:sp>
            <p:sp><p:spPr><a:xfrm><a:off x="0" y="6000"/></a:xfrm></p:spPr></p:sp>
        </p:spTree></p:cSld></p:sld>"#;

        assert_eq!(text_blocks(xml), vec!["Rubrik", "Punkt ett\nPunkt & två"]);
    }

    #[test]
    fn test_to_inspiration() {
        let outline = DeckOutline {
            slides: vec![
                OutlineSlide {
                    number: 1,
                    lines: vec!["Q3".to_string(), "Intäkter\nKostnader".to_string()],
                },
                OutlineSlide { number: 2, lines: vec![] },
            ],
        };
        assert_eq!(outline.to_inspiration(), "Slide 1: Q3\n- Intäkter\n- Kostnader");
        assert_eq!(outline.titles(), vec!["Q3"]);
    }

    #[test]
    fn test_rejects_non_zip() {
        let result = DeckReader::new().read(std::io::Cursor::new(b"not a zip".to_vec()));
        assert!(matches!(result, Err(Error::ZipError(_))));
    }

    #[test]
    fn test_rejects_zip_without_presentation() {
        use std::io::Write;

        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        zip.start_file("word/document.xml", zip::write::FileOptions::default()).unwrap();
        zip.write_all(b"<w:document/>").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let result = DeckReader::new().read(std::io::Cursor::new(bytes));
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }
}
