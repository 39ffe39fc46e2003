//! Instruction text for remote slide generation.
//!
//! The remote generator gets the request fields embedded in a fixed house
//! style description, and is asked to answer with the same JSON shape the
//! local assembler produces.

use crate::types::{RequestedSlideType, SlideRequest};
use std::fmt::Write as FmtWrite;

/// Fixed visual and editorial rules the remote generator must follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSpec {
    /// Title colour, hex without `#`.
    pub title_color: &'static str,
    /// Accent colour for bullets.
    pub accent_color: &'static str,
    /// Body text colour.
    pub text_color: &'static str,
    /// Middle colour of the brand strip.
    pub secondary_color: &'static str,
    pub font: &'static str,
    pub title_size_pt: u32,
    pub body_size_pt: u32,
    pub max_bullets: usize,
}

/// The house style.
pub const HOUSE_STYLE: StyleSpec = StyleSpec {
    title_color: "1E3A8A",
    accent_color: "F97316",
    text_color: "1F2937",
    secondary_color: "7C3AED",
    font: "Arial",
    title_size_pt: 32,
    body_size_pt: 18,
    max_bullets: 4,
};

fn structure_hint(slide_type: RequestedSlideType) -> &'static str {
    match slide_type {
        RequestedSlideType::Swot => "SWOT: strategiska implikationer och åtgärder",
        RequestedSlideType::SituationComplication => {
            "Situation-Complication: problem, analys, lösning"
        }
        RequestedSlideType::Agenda => "Agenda: tidseffektiv struktur med tydliga utfall",
        RequestedSlideType::Dashboard => "Dashboard: KPI:er med insikter och rekommendationer",
        RequestedSlideType::Custom => "Egen struktur: välj det ramverk som passar syftet bäst",
    }
}

/// Build the natural-language instruction for a request.
pub fn build_generation_prompt(request: &SlideRequest, style: &StyleSpec) -> String {
    let mut prompt = String::with_capacity(1536);

    prompt.push_str(
        "Du är en senior konsult som skapar presentationer av högsta professionella standard.\n\n",
    );

    prompt.push_str("DESIGNSPECIFIKATION (FÖLJ EXAKT):\n");
    // Writing into a String cannot fail.
    let _ = writeln!(
        prompt,
        "- Färger: #{} (rubriker), #{} (accent), #{} (text)",
        style.title_color, style.accent_color, style.text_color
    );
    let _ = writeln!(
        prompt,
        "- Typsnitt: {} genomgående, {}pt rubriker, {}pt brödtext",
        style.font, style.title_size_pt, style.body_size_pt
    );
    let _ = writeln!(
        prompt,
        "- Layout: ren och strukturerad, max {} punkter per slide",
        style.max_bullets
    );
    let _ = writeln!(
        prompt,
        "- Brand strip: gradient #{} -> #{} -> #{} i sidfoten",
        style.title_color, style.secondary_color, style.accent_color
    );
    prompt.push('\n');

    prompt.push_str("UNDERLAG:\n");
    let _ = writeln!(prompt, "Syfte: \"{}\"", request.purpose.trim());
    let _ = writeln!(prompt, "Målgrupp: {}", request.audience.label());
    let _ = writeln!(prompt, "Struktur: {}", structure_hint(request.slide_type));
    if !request.details.trim().is_empty() {
        let _ = writeln!(prompt, "Kontext:\n{}", request.details.trim());
    }
    if !request.inspiration.trim().is_empty() {
        let _ = writeln!(prompt, "Inspiration:\n{}", request.inspiration.trim());
    }
    prompt.push('\n');

    prompt.push_str(
        "KRAV:\n\
         - Varje slide ska ha konkret affärsvärde\n\
         - Mätetal, tidslinjer och ansvar ska vara tydliga\n\
         - Språk: professionell svenska\n\n",
    );

    prompt.push_str(
        "SVARSFORMAT (ENDAST JSON):\n\
         {\"slides\": [{\"title\": \"...\", \"subtitle\": \"...\", \"content\": [\"...\"], \
         \"slideType\": \"title|content|swot|agenda|dashboard\", \
         \"layout\": \"standard|title|two-column\", \"notes\": \"...\"}]}\n\n",
    );

    let _ = write!(
        prompt,
        "LEVERANS: exakt {} slides. Första sliden är en titelslide och sista sliden sammanfattar nästa steg.",
        request.effective_slide_count()
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Audience;

    #[test]
    fn test_prompt_embeds_request_and_style() {
        let request = SlideRequest::new("Förklara AI-strategi", Audience::Board, 7, RequestedSlideType::Swot)
            .with_details("Budget 2025");
        let prompt = build_generation_prompt(&request, &HOUSE_STYLE);

        assert!(prompt.contains("Syfte: \"Förklara AI-strategi\""));
        assert!(prompt.contains("För styrelse och ledning"));
        assert!(prompt.contains("Budget 2025"));
        assert!(prompt.contains("#1E3A8A"));
        assert!(prompt.contains("max 4 punkter"));
        assert!(prompt.contains("exakt 7 slides"));
        assert!(!prompt.contains("Inspiration:"));
    }
}
