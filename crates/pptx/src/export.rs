//! Presentation export.
//!
//! Export never fails from the caller's point of view: when the PPTX package
//! cannot be built, a minimal XML document with the slide titles is returned
//! instead and the failure is logged.

use crate::layout::xml_text;
use crate::package::{write_package, PackageMeta};
use chrono::{Local, NaiveDate};
use deck_core::{GeneratedSlide, Result};
use std::io::Cursor;

pub const PPTX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const XML_CONTENT_TYPE: &str = "application/xml";

const FILE_STEM: &str = "knowit-slides";
const DEFAULT_AUTHOR: &str = "Knowit Consulting";

/// Which writer produced an [`ExportedFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pptx,
    /// Titles-only XML written after the PPTX writer failed.
    XmlSkeleton,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pptx => "pptx",
            ExportFormat::XmlSkeleton => "xml",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pptx => PPTX_CONTENT_TYPE,
            ExportFormat::XmlSkeleton => XML_CONTENT_TYPE,
        }
    }
}

/// A finished download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    pub fn is_fallback(&self) -> bool {
        self.format == ExportFormat::XmlSkeleton
    }
}

/// Writes generated slides to a downloadable file.
#[derive(Debug, Clone, Default)]
pub struct PresentationExporter {
    date: Option<NaiveDate>,
    author: Option<String>,
}

impl PresentationExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the date used in the file name and document properties.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    fn date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }

    /// `knowit-slides-YYYY-MM-DD.<ext>`
    pub fn filename(&self, format: ExportFormat) -> String {
        format!("{}-{}.{}", FILE_STEM, self.date().format("%Y-%m-%d"), format.extension())
    }

    /// Export `slides` as PPTX, or as the XML skeleton if that fails.
    pub fn export(&self, slides: &[GeneratedSlide]) -> ExportedFile {
        let built = self.build_pptx(slides);
        self.finish(slides, built)
    }

    /// Build the PPTX bytes, surfacing any error.
    pub fn build_pptx(&self, slides: &[GeneratedSlide]) -> Result<Vec<u8>> {
        let meta = PackageMeta {
            title: slides.first().map(|s| s.title.clone()).unwrap_or_default(),
            author: self.author.clone().unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            created: format!("{}T00:00:00Z", self.date().format("%Y-%m-%d")),
        };
        let cursor = write_package(Cursor::new(Vec::new()), slides, &meta)?;
        Ok(cursor.into_inner())
    }

    fn finish(&self, slides: &[GeneratedSlide], built: Result<Vec<u8>>) -> ExportedFile {
        match built {
            Ok(bytes) => {
                log::debug!("Exported {} slides ({} bytes)", slides.len(), bytes.len());
                ExportedFile {
                    filename: self.filename(ExportFormat::Pptx),
                    format: ExportFormat::Pptx,
                    bytes,
                }
            }
            Err(e) => {
                log::warn!("PPTX export failed, falling back to XML skeleton: {}", e);
                ExportedFile {
                    filename: self.filename(ExportFormat::XmlSkeleton),
                    format: ExportFormat::XmlSkeleton,
                    bytes: xml_skeleton(slides).into_bytes(),
                }
            }
        }
    }
}

/// Titles-only XML rendering of a deck.
pub fn xml_skeleton(slides: &[GeneratedSlide]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<presentation>\n");
    for (idx, slide) in slides.iter().enumerate() {
        xml.push_str(&format!(
            "  <slide number=\"{}\"><title>{}</title></slide>\n",
            idx + 1,
            xml_text(&slide.title)
        ));
    }
    xml.push_str("</presentation>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::DeckReader;
    use deck_core::{Audience, Error, RequestedSlideType, SlideAssembler, SlideKind, SlideRequest};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_export_reads_back() {
        let request = SlideRequest::new(
            "Presentera SWOT-analys för styrelsen",
            Audience::Board,
            5,
            RequestedSlideType::Swot,
        )
        .with_details("AI-implementation pågår i tre team\nKundnöjdheten har ökat");
        let slides = SlideAssembler::new().with_date(date()).assemble(&request);

        let file = PresentationExporter::new().with_date(date()).export(&slides);
        assert_eq!(file.filename, "knowit-slides-2024-03-15.pptx");
        assert_eq!(file.content_type(), PPTX_CONTENT_TYPE);
        assert!(!file.is_fallback());

        let outline = DeckReader::new().read(Cursor::new(file.bytes)).unwrap();
        assert_eq!(outline.slides.len(), slides.len());
        let expected: Vec<&str> = slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(outline.titles(), expected);

        // SWOT quadrant labels are laid out under the title
        let swot = &outline.slides[1];
        assert!(swot.lines.iter().any(|l| l.starts_with("Styrkor\n")));
    }

    #[test]
    fn test_export_empty_deck() {
        let file = PresentationExporter::new().with_date(date()).export(&[]);
        assert_eq!(file.format, ExportFormat::Pptx);
        let outline = DeckReader::new().read(Cursor::new(file.bytes)).unwrap();
        assert!(outline.slides.is_empty());
    }

    #[test]
    fn test_failure_falls_back_to_skeleton() {
        let slides = vec![
            GeneratedSlide::content("Analys & resultat", vec!["Punkt".to_string()]).with_kind(SlideKind::Title),
            GeneratedSlide::content("Nästa steg", vec![]),
        ];
        let exporter = PresentationExporter::new().with_date(date());
        let file = exporter.finish(&slides, Err(Error::ZipError("disk full".to_string())));

        assert!(file.is_fallback());
        assert_eq!(file.filename, "knowit-slides-2024-03-15.xml");
        assert_eq!(file.content_type(), XML_CONTENT_TYPE);

        let xml = String::from_utf8(file.bytes).unwrap();
        assert!(xml.contains("<slide number=\"1\"><title>Analys &amp; resultat</title></slide>"));
        assert!(xml.contains("<slide number=\"2\"><title>Nästa steg</title></slide>"));
        assert!(!xml.contains("Punkt"));
    }
}
