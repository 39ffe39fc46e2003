//! Slide geometry, palette and per-kind composition.
//!
//! Every generated slide becomes a list of positioned [`Shape`]s. Layout
//! variations for SWOT, agenda and dashboard slides only partition the
//! slide's `content` differently; nothing is reclassified here beyond the
//! substring filters that put SWOT bullets in their quadrant.

use deck_core::{GeneratedSlide, SlideKind, HOUSE_STYLE};
use std::fmt::{self, Write};

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// Hundredths of an inch to EMU.
pub const fn cin(hundredths: i64) -> i64 {
    hundredths * EMU_PER_INCH / 100
}

/// 16:9 slide, 13.33" x 7.5".
pub const SLIDE_WIDTH: i64 = 12_192_000;
pub const SLIDE_HEIGHT: i64 = 6_858_000;

const MARGIN_X: i64 = cin(60);
const CONTENT_WIDTH: i64 = SLIDE_WIDTH - 2 * MARGIN_X;

const TITLE_Y: i64 = cin(40);
const TITLE_H: i64 = cin(100);
const SUBTITLE_Y: i64 = cin(135);
const SUBTITLE_H: i64 = cin(50);
const BODY_Y: i64 = cin(195);
const BODY_H: i64 = cin(460);

const STRIP_H: i64 = cin(12);
const STRIP_Y: i64 = SLIDE_HEIGHT - STRIP_H;

const GUTTER: i64 = cin(20);

/// Colours, hex without `#`.
pub const COLOR_PRIMARY: &str = HOUSE_STYLE.title_color;
pub const COLOR_ACCENT: &str = HOUSE_STYLE.accent_color;
pub const COLOR_TEXT: &str = HOUSE_STYLE.text_color;
pub const COLOR_SECONDARY: &str = HOUSE_STYLE.secondary_color;
const COLOR_CARD: &str = "F8FAFC";
const BRAND_GRADIENT: [&str; 3] = [COLOR_PRIMARY, COLOR_SECONDARY, COLOR_ACCENT];
const COLOR_WHITE: &str = "FFFFFF";

const FONT: &str = HOUSE_STYLE.font;

/// Font sizes in hundredths of a point.
const SIZE_TITLE: u32 = HOUSE_STYLE.title_size_pt * 100;
const SIZE_DECK_TITLE: u32 = 4400;
const SIZE_SUBTITLE: u32 = 2000;
const SIZE_BODY: u32 = HOUSE_STYLE.body_size_pt * 100;
const SIZE_SMALL: u32 = 1400;

/// SWOT quadrant labels with the substrings that route a bullet to them.
const SWOT_QUADRANTS: [(&str, &[&str]); 4] = [
    ("Styrkor", &["styrk", "strength"]),
    ("Svagheter", &["svaghet", "weakness"]),
    ("Möjligheter", &["möjlighet", "opportunit"]),
    ("Hot", &["hot:", "threat"]),
];

/// Shape fill.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    None,
    Solid(&'static str),
    /// Left-to-right linear gradient, evenly spaced stops.
    Linear(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Rect,
    RoundRect,
    Ellipse,
}

impl Geometry {
    fn preset(&self) -> &'static str {
        match self {
            Geometry::Rect => "rect",
            Geometry::RoundRect => "roundRect",
            Geometry::Ellipse => "ellipse",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Top,
    Middle,
}

/// One run of text forming a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub size: u32,
    pub bold: bool,
    pub color: &'static str,
    pub bullet: bool,
    pub align: Align,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, size: u32, color: &'static str) -> Self {
        Self {
            text: text.into(),
            size,
            bold: false,
            color,
            bullet: false,
            align: Align::Left,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn bulleted(mut self) -> Self {
        self.bullet = true;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }
}

/// A positioned shape, optionally carrying text.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub name: String,
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
    pub geometry: Geometry,
    pub fill: Fill,
    pub anchor: Anchor,
    pub paragraphs: Vec<Paragraph>,
}

impl Shape {
    /// Unfilled text box.
    pub fn text_box(name: impl Into<String>, x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            cx,
            cy,
            geometry: Geometry::Rect,
            fill: Fill::None,
            anchor: Anchor::Top,
            paragraphs: Vec::new(),
        }
    }

    /// Filled shape without text.
    pub fn block(name: impl Into<String>, x: i64, y: i64, cx: i64, cy: i64, fill: Fill) -> Self {
        Self {
            fill,
            ..Self::text_box(name, x, y, cx, cy)
        }
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }

    pub fn anchored(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_paragraph(mut self, paragraph: Paragraph) -> Self {
        self.paragraphs.push(paragraph);
        self
    }

    pub fn with_paragraphs(mut self, paragraphs: impl IntoIterator<Item = Paragraph>) -> Self {
        self.paragraphs.extend(paragraphs);
        self
    }

    pub fn has_text(&self) -> bool {
        !self.paragraphs.is_empty()
    }
}

/// Lay out one slide.
pub fn compose(slide: &GeneratedSlide) -> Vec<Shape> {
    let mut shapes = match slide.slide_type {
        SlideKind::Title => compose_title(slide),
        SlideKind::Swot => compose_swot(slide),
        SlideKind::Agenda => compose_agenda(slide),
        SlideKind::Dashboard => compose_dashboard(slide),
        SlideKind::Content => compose_standard(slide),
    };
    shapes.push(brand_strip());
    shapes
}

/// Footer gradient strip.
pub fn brand_strip() -> Shape {
    Shape::block(
        "Brand strip",
        0,
        STRIP_Y,
        SLIDE_WIDTH,
        STRIP_H,
        Fill::Linear(&BRAND_GRADIENT),
    )
}

fn heading(slide: &GeneratedSlide) -> Vec<Shape> {
    let mut shapes = vec![Shape::text_box("Title", MARGIN_X, TITLE_Y, CONTENT_WIDTH, TITLE_H)
        .anchored(Anchor::Middle)
        .with_paragraph(Paragraph::new(&slide.title, SIZE_TITLE, COLOR_PRIMARY).bold())];

    if let Some(subtitle) = slide.subtitle.as_deref().filter(|s| !s.trim().is_empty()) {
        shapes.push(
            Shape::text_box("Subtitle", MARGIN_X, SUBTITLE_Y, CONTENT_WIDTH, SUBTITLE_H)
                .with_paragraph(Paragraph::new(subtitle, SIZE_SUBTITLE, COLOR_ACCENT)),
        );
    }
    shapes
}

fn bullets<'a>(items: impl IntoIterator<Item = &'a String>, size: u32) -> Vec<Paragraph> {
    items
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .map(|item| Paragraph::new(item.as_str(), size, COLOR_TEXT).bulleted())
        .collect()
}

fn compose_standard(slide: &GeneratedSlide) -> Vec<Shape> {
    let mut shapes = heading(slide);
    let body = bullets(&slide.content, SIZE_BODY);
    if !body.is_empty() {
        shapes.push(
            Shape::text_box("Content", MARGIN_X, BODY_Y, CONTENT_WIDTH, BODY_H).with_paragraphs(body),
        );
    }
    shapes
}

fn compose_title(slide: &GeneratedSlide) -> Vec<Shape> {
    let mut shapes = vec![
        Shape::block("Accent bar", MARGIN_X, cin(150), cin(120), cin(8), Fill::Solid(COLOR_ACCENT)),
        Shape::text_box("Title", MARGIN_X, cin(170), CONTENT_WIDTH, cin(150))
            .anchored(Anchor::Middle)
            .with_paragraph(Paragraph::new(&slide.title, SIZE_DECK_TITLE, COLOR_PRIMARY).bold()),
    ];

    if let Some(subtitle) = slide.subtitle.as_deref().filter(|s| !s.trim().is_empty()) {
        shapes.push(
            Shape::text_box("Subtitle", MARGIN_X, cin(330), CONTENT_WIDTH, cin(60))
                .with_paragraph(Paragraph::new(subtitle, SIZE_SUBTITLE, COLOR_ACCENT)),
        );
    }

    let points = bullets(&slide.content, SIZE_SMALL + 200);
    if !points.is_empty() {
        shapes.push(
            Shape::text_box("Content", MARGIN_X, cin(410), CONTENT_WIDTH, cin(260)).with_paragraphs(points),
        );
    }
    shapes
}

/// Quadrant index for a SWOT bullet, by substring.
///
/// A `Label:` prefix decides first so the text after it cannot pull the
/// bullet into another quadrant.
pub fn swot_quadrant(item: &str) -> Option<usize> {
    let find = |text: &str| {
        SWOT_QUADRANTS
            .iter()
            .position(|(_, markers)| markers.iter().any(|m| text.contains(m)))
    };

    let lower = item.to_lowercase();
    lower
        .split_once(':')
        .and_then(|(label, _)| find(&format!("{}:", label)))
        .or_else(|| find(&lower))
}

/// Text after a leading `Label:` prefix, if any.
fn after_label(item: &str) -> &str {
    match item.split_once(':') {
        Some((label, rest)) if label.chars().count() <= 20 => rest.trim(),
        _ => item.trim(),
    }
}

fn compose_swot(slide: &GeneratedSlide) -> Vec<Shape> {
    let mut quadrants: [Vec<&str>; 4] = Default::default();
    for item in &slide.content {
        if let Some(idx) = swot_quadrant(item) {
            quadrants[idx].push(after_label(item));
        }
    }

    // Nothing recognisable: plain bullets rather than four empty boxes
    if quadrants.iter().all(Vec::is_empty) {
        return compose_standard(slide);
    }

    let mut shapes = heading(slide);
    let cell_w = (CONTENT_WIDTH - GUTTER) / 2;
    let cell_h = (BODY_H - GUTTER) / 2;

    for (idx, ((label, _), items)) in SWOT_QUADRANTS.iter().zip(quadrants.iter()).enumerate() {
        let col = (idx % 2) as i64;
        let row = (idx / 2) as i64;
        let fill = if idx % 3 == 0 { COLOR_PRIMARY } else { COLOR_SECONDARY };

        shapes.push(
            Shape::text_box(
                format!("SWOT {}", label),
                MARGIN_X + col * (cell_w + GUTTER),
                BODY_Y + row * (cell_h + GUTTER),
                cell_w,
                cell_h,
            )
            .with_geometry(Geometry::RoundRect)
            .with_fill(Fill::Solid(fill))
            .with_paragraph(Paragraph::new(*label, SIZE_BODY + 200, COLOR_WHITE).bold())
            .with_paragraphs(items.iter().map(|text| Paragraph::new(*text, SIZE_SMALL, COLOR_WHITE))),
        );
    }
    shapes
}

fn compose_agenda(slide: &GeneratedSlide) -> Vec<Shape> {
    let mut shapes = heading(slide);
    let items: Vec<&String> = slide.content.iter().filter(|i| !i.trim().is_empty()).collect();
    if items.is_empty() {
        return shapes;
    }

    let row_h = (BODY_H / items.len() as i64).min(cin(90));
    let badge = row_h * 2 / 3;

    for (idx, item) in items.iter().enumerate() {
        let y = BODY_Y + idx as i64 * row_h;
        shapes.push(
            Shape::text_box(format!("Agenda number {}", idx + 1), MARGIN_X, y, badge, badge)
                .with_geometry(Geometry::Ellipse)
                .with_fill(Fill::Solid(COLOR_ACCENT))
                .anchored(Anchor::Middle)
                .with_paragraph(
                    Paragraph::new((idx + 1).to_string(), SIZE_BODY, COLOR_WHITE).bold().centered(),
                ),
        );
        shapes.push(
            Shape::text_box(
                format!("Agenda item {}", idx + 1),
                MARGIN_X + badge + GUTTER,
                y,
                CONTENT_WIDTH - badge - GUTTER,
                badge,
            )
            .anchored(Anchor::Middle)
            .with_paragraph(Paragraph::new(item.as_str(), SIZE_BODY, COLOR_TEXT)),
        );
    }
    shapes
}

fn compose_dashboard(slide: &GeneratedSlide) -> Vec<Shape> {
    let mut shapes = heading(slide);
    let items: Vec<&String> = slide.content.iter().filter(|i| !i.trim().is_empty()).collect();
    if items.is_empty() {
        return shapes;
    }

    let rows = items.len().div_ceil(2) as i64;
    let card_w = (CONTENT_WIDTH - GUTTER) / 2;
    let card_h = (BODY_H - GUTTER * (rows - 1)) / rows;

    for (idx, item) in items.iter().enumerate() {
        let col = (idx % 2) as i64;
        let row = (idx / 2) as i64;
        let mut card = Shape::text_box(
            format!("KPI card {}", idx + 1),
            MARGIN_X + col * (card_w + GUTTER),
            BODY_Y + row * (card_h + GUTTER),
            card_w,
            card_h,
        )
        .with_geometry(Geometry::RoundRect)
        .with_fill(Fill::Solid(COLOR_CARD));

        card = match item.split_once(':') {
            Some((metric, insight)) => card
                .with_paragraph(Paragraph::new(metric.trim(), SIZE_BODY, COLOR_PRIMARY).bold())
                .with_paragraph(Paragraph::new(insight.trim(), SIZE_SMALL, COLOR_TEXT)),
            None => card.with_paragraph(Paragraph::new(item.as_str(), SIZE_BODY, COLOR_PRIMARY).bold()),
        };
        shapes.push(card);
    }
    shapes
}

/// Text safe for an XML text node or attribute.
///
/// Drops control characters XML 1.0 cannot carry, then escapes.
pub fn xml_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|&c| c == '\t' || c == '\n' || c == '\r' || c >= ' ')
        .collect();
    quick_xml::escape::escape(cleaned.as_str()).into_owned()
}

/// Write one shape as `<p:sp>`.
pub fn write_shape(xml: &mut String, id: u32, shape: &Shape) -> fmt::Result {
    xml.push_str("<p:sp><p:nvSpPr>");
    write!(xml, r#"<p:cNvPr id="{}" name="{}"/>"#, id, xml_text(&shape.name))?;
    if shape.has_text() && shape.fill == Fill::None {
        xml.push_str(r#"<p:cNvSpPr txBox="1"/>"#);
    } else {
        xml.push_str("<p:cNvSpPr/>");
    }
    xml.push_str("<p:nvPr/></p:nvSpPr><p:spPr>");
    write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        shape.x, shape.y, shape.cx, shape.cy
    )?;
    write!(xml, r#"<a:prstGeom prst="{}"><a:avLst/></a:prstGeom>"#, shape.geometry.preset())?;
    write_fill(xml, &shape.fill)?;
    xml.push_str("<a:ln><a:noFill/></a:ln></p:spPr>");

    if shape.has_text() {
        let anchor = match shape.anchor {
            Anchor::Top => "t",
            Anchor::Middle => "ctr",
        };
        write!(
            xml,
            r#"<p:txBody><a:bodyPr wrap="square" lIns="91440" tIns="45720" rIns="91440" bIns="45720" anchor="{}"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#,
            anchor
        )?;
        for paragraph in &shape.paragraphs {
            write_paragraph(xml, paragraph)?;
        }
        xml.push_str("</p:txBody>");
    }

    xml.push_str("</p:sp>");
    Ok(())
}

fn write_fill(xml: &mut String, fill: &Fill) -> fmt::Result {
    match fill {
        Fill::None => xml.push_str("<a:noFill/>"),
        Fill::Solid(color) => write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color)?,
        Fill::Linear(stops) => {
            xml.push_str(r#"<a:gradFill rotWithShape="1"><a:gsLst>"#);
            let last = stops.len().saturating_sub(1).max(1) as u32;
            for (idx, color) in stops.iter().enumerate() {
                let pos = idx as u32 * 100_000 / last;
                write!(xml, r#"<a:gs pos="{}"><a:srgbClr val="{}"/></a:gs>"#, pos, color)?;
            }
            xml.push_str(r#"</a:gsLst><a:lin ang="0" scaled="1"/></a:gradFill>"#);
        }
    }
    Ok(())
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) -> fmt::Result {
    xml.push_str("<a:p>");
    let algn = match paragraph.align {
        Align::Left => "l",
        Align::Center => "ctr",
    };
    if paragraph.bullet {
        write!(
            xml,
            r#"<a:pPr marL="285750" indent="-285750" algn="{}"><a:spcBef><a:spcPts val="600"/></a:spcBef><a:buClr><a:srgbClr val="{}"/></a:buClr><a:buFont typeface="{}"/><a:buChar char="•"/></a:pPr>"#,
            algn, COLOR_ACCENT, FONT
        )?;
    } else {
        write!(xml, r#"<a:pPr algn="{}"><a:buNone/></a:pPr>"#, algn)?;
    }

    let rpr = format!(
        r#"lang="sv-SE" sz="{}" b="{}" dirty="0""#,
        paragraph.size,
        if paragraph.bold { 1 } else { 0 }
    );
    if paragraph.text.is_empty() {
        write!(xml, "<a:endParaRPr {}/>", rpr)?;
    } else {
        write!(
            xml,
            r#"<a:r><a:rPr {}><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:latin typeface="{}"/></a:rPr><a:t>{}</a:t></a:r>"#,
            rpr,
            paragraph.color,
            FONT,
            xml_text(&paragraph.text)
        )?;
    }
    xml.push_str("</a:p>");
    Ok(())
}
