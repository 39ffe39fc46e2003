//! Slide assembly: turns a [`SlideRequest`] into an ordered slide sequence.
//!
//! The deck is always title slide, type-specific body slides, detail slides
//! built from the user's own points, then a conclusion. Body and detail
//! slides share the slots left after reserving the title and the conclusion,
//! and the finished sequence is truncated to the requested count.

use crate::classify::{self, DETAIL_POINT_MIN_LEN};
use crate::types::{GeneratedSlide, RequestedSlideType, SlideKind, SlideLayout, SlideRequest};
use chrono::{Local, NaiveDate};

/// Bullets per detail slide.
pub const POINTS_PER_DETAIL_SLIDE: usize = 4;

/// Slots reserved for the title and conclusion slides.
const RESERVED_SLOTS: usize = 2;

/// Title of the closing slide.
pub const CONCLUSION_TITLE: &str = "Nästa steg & ansvar";

/// Estimated presentation length in minutes.
///
/// Opening time, four minutes per slide, and discussion time that grows with
/// the deck but never drops below ten minutes.
pub fn estimate_presentation_time(slide_count: usize) -> usize {
    let base_time = 10;
    let slide_time = slide_count * 4;
    let discussion_time = (slide_count * 2).max(10);
    base_time + slide_time + discussion_time
}

/// Builds slide decks with local heuristics.
#[derive(Debug, Clone, Default)]
pub struct SlideAssembler {
    /// Date shown on the title slide. `None` means today.
    date: Option<NaiveDate>,
}

impl SlideAssembler {
    /// Create an assembler that dates decks with today's date.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the date printed on the title slide.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Produce the slide sequence for a request.
    ///
    /// Never fails. A deck shorter than requested means the request did not
    /// carry enough material to fill the slots.
    pub fn assemble(&self, request: &SlideRequest) -> Vec<GeneratedSlide> {
        let slide_count = request.effective_slide_count();
        let available_slots = slide_count.saturating_sub(RESERVED_SLOTS);

        let mut slides = Vec::with_capacity(slide_count + 1);
        slides.push(self.title_slide(request, slide_count));

        let mut body = body_slides(request, slide_count, available_slots);
        body.truncate(available_slots);

        let details = detail_slides(&request.details, available_slots - body.len());

        let needs_filler = request.slide_type == RequestedSlideType::Custom
            && body.is_empty()
            && details.is_empty()
            && available_slots > 0;

        slides.extend(body);
        slides.extend(details);
        if needs_filler {
            slides.push(key_points_slide());
        }
        slides.push(conclusion_slide(&request.purpose));

        log::debug!(
            "Assembled {} slides for {:?} request (requested {}, {} body slots)",
            slides.len(),
            request.slide_type,
            slide_count,
            available_slots
        );

        slides.truncate(slide_count);
        slides
    }

    fn title_slide(&self, request: &SlideRequest, slide_count: usize) -> GeneratedSlide {
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        let minutes = estimate_presentation_time(slide_count);

        GeneratedSlide {
            title: classify::extract_title(&request.purpose),
            subtitle: Some(format!(
                "{} - {}",
                request.audience.label(),
                date.format("%Y-%m-%d")
            )),
            content: classify::purpose_points(&request.purpose, &request.details),
            slide_type: SlideKind::Title,
            layout: SlideLayout::Title,
            notes: Some(format!(
                "Öppna starkt: etablera värdet av sessionen. Förväntad längd: {} minuter. \
                 Fokus på actionable insights.",
                minutes
            )),
        }
    }
}

/// Type-specific slides. May return more than `slots`; the caller truncates.
fn body_slides(request: &SlideRequest, slide_count: usize, slots: usize) -> Vec<GeneratedSlide> {
    let purpose = request.purpose.as_str();
    let details = request.details.as_str();
    let mut slides = Vec::new();

    match request.slide_type {
        RequestedSlideType::Swot => {
            slides.push(swot_slide(purpose, details));
            if slots > 1 {
                slides.push(
                    GeneratedSlide::content(
                        "Strategiska implikationer",
                        strings(&[
                            "Utnyttja styrkor för att maximera möjligheter",
                            "Adressera kritiska svagheter innan hot materialiseras",
                            "Byggstenskonceptet - stärka det som redan fungerar",
                            "Riskmitigering genom proaktiv planering",
                        ]),
                    )
                    .with_notes(
                        "Koppla SWOT-analysen till konkreta strategiska beslut. \
                         Fokus på genomförande, inte bara analys.",
                    ),
                );
            }
        }
        RequestedSlideType::SituationComplication => {
            slides.push(
                GeneratedSlide::content(
                    "Situation - Var står vi idag?",
                    classify::classify_situation(purpose, details),
                )
                .with_notes("Etablera en gemensam utgångspunkt med hårda fakta."),
            );
            if slots > 1 {
                slides.push(
                    GeneratedSlide::content(
                        "Utmaning - Vad hindrar oss?",
                        classify::classify_complication(purpose, details),
                    )
                    .with_notes(
                        "Definiera den brinnande plattformen: varför måste vi agera nu?",
                    ),
                );
            }
            if slots > 2 {
                slides.push(
                    GeneratedSlide::content(
                        "Lösning - Vad ska vi göra?",
                        strings(&[
                            "Kortsiktiga åtgärder (0-3 månader)",
                            "Medellånga mål och milstolpar (3-12 månader)",
                            "Långsiktig vision och målbild (1-3 år)",
                            "Kritiska framgångsfaktorer och KPI:er",
                        ]),
                    )
                    .with_notes(
                        "Konkret handlingsplan med tydliga ägare och deadlines. \
                         Varje punkt ska vara SMART.",
                    ),
                );
            }
        }
        RequestedSlideType::Agenda => {
            slides.push(agenda_slide(slide_count));
            if slots > 1 {
                slides.push(
                    GeneratedSlide::content(
                        "Förväntat utfall",
                        strings(&[
                            "Tydliga beslutspunkter identifierade",
                            "Konsensus kring prioritering och resurser",
                            "Konkret handlingsplan med ägare och tidslinjer",
                            "Uppföljningsplan och success metrics",
                        ]),
                    )
                    .with_notes("Sätt förväntningarna högt: sessionen ska ge verkliga framsteg."),
                );
            }
        }
        RequestedSlideType::Dashboard => {
            slides.push(
                GeneratedSlide::content("KPI Dashboard", classify::dashboard_kpis(purpose, details))
                    .with_kind(SlideKind::Dashboard)
                    .with_layout(SlideLayout::TwoColumn)
                    .with_notes(
                        "Varje KPI ska ha nuvärde, mål, trendriktning och rekommenderad åtgärd.",
                    ),
            );
            if slots > 1 {
                slides.push(
                    GeneratedSlide::content(
                        "KPI-analys & trender",
                        strings(&[
                            "Performance vs målsättning - gap analysis",
                            "Trendanalys: vart är vi på väg?",
                            "Leading indicators för proaktiv styrning",
                            "Benchmark mot branschstandard",
                        ]),
                    )
                    .with_notes("Fokusera på vad datan betyder, inte bara på siffrorna."),
                );
            }
        }
        RequestedSlideType::Custom => {
            slides.extend(classify::custom_sections(purpose).into_iter().map(|section| {
                GeneratedSlide::content(section.title, strings(section.content))
                    .with_notes(section.notes)
            }));
        }
    }

    slides
}

fn swot_slide(purpose: &str, details: &str) -> GeneratedSlide {
    let swot = classify::classify_swot(purpose, details);
    GeneratedSlide::content(
        "SWOT-analys",
        vec![
            format!("Styrkor: {}", swot.strengths),
            format!("Svagheter: {}", swot.weaknesses),
            format!("Möjligheter: {}", swot.opportunities),
            format!("Hot: {}", swot.threats),
        ],
    )
    .with_kind(SlideKind::Swot)
    .with_notes(
        "Koppla varje SWOT-kategori till konkreta beslutspunkter. \
         Kvantifiera med mätetal och deadlines där det går.",
    )
}

fn agenda_slide(slide_count: usize) -> GeneratedSlide {
    let total = estimate_presentation_time(slide_count);
    let main = total.saturating_sub(15).max(15);

    GeneratedSlide::content(
        "Agenda",
        vec![
            "Introduktion och syfte (5 min)".to_string(),
            format!("Genomgång och analys ({} min)", main),
            "Diskussion och frågor (5 min)".to_string(),
            "Sammanfattning och nästa steg (5 min)".to_string(),
        ],
    )
    .with_kind(SlideKind::Agenda)
    .with_notes(format!(
        "Total tid: {} minuter. Avsätt tid för konkreta beslut i slutet.",
        total
    ))
}

/// Slides built from the user's own detail lines, at most `max_slides`.
fn detail_slides(details: &str, max_slides: usize) -> Vec<GeneratedSlide> {
    if max_slides == 0 || details.trim().is_empty() {
        return Vec::new();
    }

    let points = classify::extract_detail_points(details, usize::MAX, DETAIL_POINT_MIN_LEN);

    points
        .chunks(POINTS_PER_DETAIL_SLIDE)
        .take(max_slides)
        .enumerate()
        .map(|(idx, chunk)| {
            let title = if idx == 0 {
                "Detaljerad genomgång".to_string()
            } else {
                format!("Fortsättning (del {})", idx + 1)
            };
            GeneratedSlide::content(title, chunk.to_vec()).with_notes(
                "Expandera varje punkt med konkreta exempel, mätetal och deadlines.",
            )
        })
        .collect()
}

fn key_points_slide() -> GeneratedSlide {
    GeneratedSlide::content(
        "Viktiga punkter",
        strings(&[
            "Kritisk situation som kräver uppmärksamhet",
            "Analys av alternativa lösningar och konsekvenser",
            "Rekommenderad approach baserad på data",
            "Implementationsplan med tydliga milstolpar",
        ]),
    )
    .with_notes("Problem, analys, lösning, genomförande.")
}

fn conclusion_slide(purpose: &str) -> GeneratedSlide {
    GeneratedSlide::content(CONCLUSION_TITLE, classify::conclusion_points(purpose)).with_notes(
        "Avsluta tydligt: varje deltagare ska veta vad de gör härnäst. \
         Boka uppföljning innan mötet slutar.",
    )
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
