//! OOXML package parts for a generated deck.
//!
//! The package is deliberately small: one master, one blank layout, one
//! theme, and one slide part per generated slide. All text is positioned
//! explicitly on the slides, so the master carries no placeholders.

use crate::layout::{self, xml_text, SLIDE_HEIGHT, SLIDE_WIDTH};
use deck_core::{Error, GeneratedSlide, Result, HOUSE_STYLE};
use std::fmt::Write as FmtWrite;
use std::io::{Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE_PROPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_EXT_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_CORE_PROPS: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_EXT_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// First id in `p:sldIdLst`; lower values are reserved.
const FIRST_SLIDE_ID: usize = 256;

/// Empty group header every `p:spTree` starts with.
const SP_TREE_HEADER: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

/// Document properties written to `docProps/`.
#[derive(Debug, Clone)]
pub struct PackageMeta {
    pub title: String,
    pub author: String,
    /// W3CDTF timestamp, e.g. `2024-05-01T00:00:00Z`.
    pub created: String,
}

fn xml_err(e: std::fmt::Error) -> Error {
    Error::XmlError(format!("Failed to render package part: {}", e))
}

fn zip_err(e: zip::result::ZipError) -> Error {
    Error::ZipError(format!("Failed to write package: {}", e))
}

/// Write a complete `.pptx` package for `slides` into `writer`.
pub fn write_package<W: Write + Seek>(writer: W, slides: &[GeneratedSlide], meta: &PackageMeta) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let put = |zip: &mut ZipWriter<W>, name: &str, body: &str| -> Result<()> {
        zip.start_file(name, options).map_err(zip_err)?;
        zip.write_all(body.as_bytes())?;
        Ok(())
    };

    put(&mut zip, "[Content_Types].xml", &content_types(slides.len()))?;
    put(&mut zip, "_rels/.rels", &package_rels())?;
    put(&mut zip, "docProps/core.xml", &core_props(meta))?;
    put(&mut zip, "docProps/app.xml", &app_props(slides.len()))?;
    put(&mut zip, "ppt/presentation.xml", &presentation(slides.len()))?;
    put(&mut zip, "ppt/_rels/presentation.xml.rels", &presentation_rels(slides.len()))?;
    put(&mut zip, "ppt/slideMasters/slideMaster1.xml", &slide_master())?;
    put(
        &mut zip,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &relationships(&[
            ("rId1", REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
            ("rId2", REL_THEME, "../theme/theme1.xml"),
        ]),
    )?;
    put(&mut zip, "ppt/slideLayouts/slideLayout1.xml", &slide_layout())?;
    put(
        &mut zip,
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        &relationships(&[("rId1", REL_SLIDE_MASTER, "../slideMasters/slideMaster1.xml")]),
    )?;
    put(&mut zip, "ppt/theme/theme1.xml", &theme())?;

    let slide_rels = relationships(&[("rId1", REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml")]);
    for (idx, slide) in slides.iter().enumerate() {
        let number = idx + 1;
        put(&mut zip, &format!("ppt/slides/slide{}.xml", number), &slide_xml(slide)?)?;
        put(&mut zip, &format!("ppt/slides/_rels/slide{}.xml.rels", number), &slide_rels)?;
    }

    zip.finish().map_err(zip_err)
}

/// Render one slide part.
pub fn slide_xml(slide: &GeneratedSlide) -> Result<String> {
    let shapes = layout::compose(slide);
    let mut xml = String::with_capacity(2048 + shapes.len() * 1024);

    xml.push_str(XML_DECL);
    write!(xml, r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#, NS_A, NS_R, NS_P).map_err(xml_err)?;
    xml.push_str("<p:cSld><p:spTree>");
    xml.push_str(SP_TREE_HEADER);
    for (idx, shape) in shapes.iter().enumerate() {
        // id 1 is the group
        layout::write_shape(&mut xml, idx as u32 + 2, shape).map_err(xml_err)?;
    }
    xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    Ok(xml)
}

fn relationships(rels: &[(&str, &str, &str)]) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    for (id, rel_type, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, rel_type, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn content_types(slide_count: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);

    let mut overrides = vec![
        ("/ppt/presentation.xml".to_string(), CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), CT_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml".to_string(), CT_SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml".to_string(), CT_THEME),
        ("/docProps/core.xml".to_string(), CT_CORE_PROPS),
        ("/docProps/app.xml".to_string(), CT_EXT_PROPS),
    ];
    overrides.extend((1..=slide_count).map(|n| (format!("/ppt/slides/slide{}.xml", n), CT_SLIDE)));

    for (part, content_type) in overrides {
        xml.push_str(&format!(r#"<Override PartName="{}" ContentType="{}"/>"#, part, content_type));
    }
    xml.push_str("</Types>");
    xml
}

fn package_rels() -> String {
    relationships(&[
        ("rId1", REL_OFFICE_DOCUMENT, "ppt/presentation.xml"),
        ("rId2", REL_CORE_PROPS, "docProps/core.xml"),
        ("rId3", REL_EXT_PROPS, "docProps/app.xml"),
    ])
}

fn core_props(meta: &PackageMeta) -> String {
    format!(
        r#"{}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>{}</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created></cp:coreProperties>"#,
        XML_DECL,
        xml_text(&meta.title),
        xml_text(&meta.author),
        xml_text(&meta.created)
    )
}

fn app_props(slide_count: usize) -> String {
    format!(
        r#"{}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>deck</Application><Slides>{}</Slides></Properties>"#,
        XML_DECL, slide_count
    )
}

/// Slides are `rId2..=rId{n+1}` in the presentation rels; the master is `rId1`
/// and the theme follows the last slide.
fn presentation(slide_count: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!(
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        NS_A, NS_R, NS_P
    ));
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for idx in 0..slide_count {
            xml.push_str(&format!(
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                FIRST_SLIDE_ID + idx,
                idx + 2
            ));
        }
        xml.push_str("</p:sldIdLst>");
    }
    xml.push_str(&format!(
        r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/>"#,
        SLIDE_WIDTH, SLIDE_HEIGHT
    ));
    xml.push_str("</p:presentation>");
    xml
}

fn presentation_rels(slide_count: usize) -> String {
    let slide_targets: Vec<(String, String)> = (1..=slide_count)
        .map(|n| (format!("rId{}", n + 1), format!("slides/slide{}.xml", n)))
        .collect();
    let theme_id = format!("rId{}", slide_count + 2);

    let mut rels: Vec<(&str, &str, &str)> = vec![("rId1", REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml")];
    rels.extend(slide_targets.iter().map(|(id, target)| (id.as_str(), REL_SLIDE, target.as_str())));
    rels.push((theme_id.as_str(), REL_THEME, "theme/theme1.xml"));
    relationships(&rels)
}

fn slide_master() -> String {
    format!(
        r#"{}<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:bg><p:bgPr><a:solidFill><a:srgbClr val="FFFFFF"/></a:solidFill><a:effectLst/></p:bgPr></p:bg><p:spTree>{}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#,
        XML_DECL, NS_A, NS_R, NS_P, SP_TREE_HEADER
    )
}

fn slide_layout() -> String {
    format!(
        r#"{}<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        XML_DECL, NS_A, NS_R, NS_P, SP_TREE_HEADER
    )
}

fn theme() -> String {
    let style = &HOUSE_STYLE;
    let fill = |color: &str| format!(r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color);
    let line = |w: u32| format!(r#"<a:ln w="{}"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#, w);
    let phfill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;

    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!(r#"<a:theme xmlns:a="{}" name="Deck">"#, NS_A));
    xml.push_str(r#"<a:themeElements><a:clrScheme name="Deck">"#);
    xml.push_str(&format!(
        r#"<a:dk1><a:srgbClr val="{}"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="{}"/></a:dk2><a:lt2><a:srgbClr val="F8FAFC"/></a:lt2>"#,
        style.text_color, style.title_color
    ));
    for (idx, color) in [
        style.title_color,
        style.accent_color,
        style.secondary_color,
        "0EA5E9",
        "10B981",
        "64748B",
    ]
    .iter()
    .enumerate()
    {
        xml.push_str(&format!(r#"<a:accent{0}><a:srgbClr val="{1}"/></a:accent{0}>"#, idx + 1, color));
    }
    xml.push_str(r#"<a:hlink><a:srgbClr val="1E3A8A"/></a:hlink><a:folHlink><a:srgbClr val="7C3AED"/></a:folHlink></a:clrScheme>"#);

    let font = format!(
        r#"<a:latin typeface="{}"/><a:ea typeface=""/><a:cs typeface=""/>"#,
        style.font
    );
    xml.push_str(&format!(
        r#"<a:fontScheme name="Deck"><a:majorFont>{0}</a:majorFont><a:minorFont>{0}</a:minorFont></a:fontScheme>"#,
        font
    ));

    xml.push_str(r#"<a:fmtScheme name="Deck"><a:fillStyleLst>"#);
    xml.push_str(&[phfill, phfill, phfill].concat());
    xml.push_str("</a:fillStyleLst><a:lnStyleLst>");
    xml.push_str(&[line(6350), line(12700), line(19050)].concat());
    xml.push_str("</a:lnStyleLst><a:effectStyleLst>");
    xml.push_str(&r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#.repeat(3));
    xml.push_str("</a:effectStyleLst><a:bgFillStyleLst>");
    xml.push_str(&[fill("FFFFFF"), phfill.to_string(), phfill.to_string()].concat());
    xml.push_str("</a:bgFillStyleLst></a:fmtScheme></a:themeElements>");
    xml.push_str("<a:objectDefaults/><a:extraClrSchemeLst/></a:theme>");
    xml
}
