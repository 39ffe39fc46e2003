//! Keyword heuristics over Swedish business vocabulary.
//!
//! Everything here is plain substring matching on lower-cased, NFC-normalized
//! text. Each cascade is an ordered rule table; whether the first or the last
//! matching rule wins differs per cascade and is documented on each function.
//! All functions are total: text without any signal falls through to defaults.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Minimum length (exclusive) of a detail line quoted on the title slide.
pub const TITLE_POINT_MIN_LEN: usize = 10;

/// Minimum length (exclusive) of a detail line turned into a bullet on a
/// detail slide.
pub const DETAIL_POINT_MIN_LEN: usize = 5;

/// Branding line always closing the title slide bullets.
pub const BRAND_LINE: &str = "Knowit Consulting";

/// Maximum number of bullets on the title slide, branding line included.
pub const MAX_TITLE_POINTS: usize = 4;

/// Leading bullet glyph and the whitespace after it.
static LEADING_BULLET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•\-\*]\s*").unwrap());

/// One `(predicate, result)` pair in a keyword cascade.
///
/// The predicate holds when any of the keywords occurs in the text.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule<T> {
    pub keywords: &'static [&'static str],
    pub value: T,
}

impl<T> KeywordRule<T> {
    /// Check the rule against already-folded text.
    pub fn matches(&self, folded: &str) -> bool {
        self.keywords.iter().any(|k| folded.contains(k))
    }
}

/// Value of the first matching rule, if any.
pub fn first_match<'a, T>(rules: &'a [KeywordRule<T>], folded: &str) -> Option<&'a T> {
    rules.iter().find(|r| r.matches(folded)).map(|r| &r.value)
}

/// Values of every matching rule, in table order.
pub fn all_matches<'a, T>(
    rules: &'a [KeywordRule<T>],
    folded: &'a str,
) -> impl Iterator<Item = &'a T> + 'a {
    rules.iter().filter(move |r| r.matches(folded)).map(|r| &r.value)
}

/// Lower-case and NFC-normalize text for matching.
pub fn fold(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

/// Fold purpose and details into one haystack, separated by a space.
pub fn fold_context(purpose: &str, details: &str) -> String {
    format!("{} {}", fold(purpose), fold(details))
}

/// Title cascade. Order is the priority.
pub static TITLE_RULES: &[KeywordRule<&str>] = &[
    KeywordRule { keywords: &["swot"], value: "SWOT-analys" },
    KeywordRule { keywords: &["strategi"], value: "Strategianalys" },
    KeywordRule { keywords: &["projekt"], value: "Projektöversikt" },
    KeywordRule { keywords: &["status"], value: "Statusrapport" },
    KeywordRule { keywords: &["plan"], value: "Handlingsplan" },
    KeywordRule { keywords: &["analys"], value: "Analys och insikter" },
];

/// Title used when no title rule matches.
pub const DEFAULT_TITLE: &str = "Analys och rekommendationer";

/// Derive the deck title from the purpose. First match wins.
pub fn extract_title(purpose: &str) -> String {
    first_match(TITLE_RULES, &fold(purpose))
        .copied()
        .unwrap_or(DEFAULT_TITLE)
        .to_string()
}

/// The four SWOT quadrant texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwotQuadrants {
    pub strengths: String,
    pub weaknesses: String,
    pub opportunities: String,
    pub threats: String,
}

impl Default for SwotQuadrants {
    fn default() -> Self {
        Self {
            strengths: "Etablerad marknadsposition, erfaret team".to_string(),
            weaknesses: "Resursbegränsningar, processineffektivitet".to_string(),
            opportunities: "Teknisk innovation, nya marknadssegment".to_string(),
            threats: "Ökad konkurrens, marknadsvolatilitet".to_string(),
        }
    }
}

impl SwotQuadrants {
    fn apply(&mut self, patch: &SwotPatch) {
        if let Some(s) = patch.strengths {
            self.strengths = s.to_string();
        }
        if let Some(w) = patch.weaknesses {
            self.weaknesses = w.to_string();
        }
        if let Some(o) = patch.opportunities {
            self.opportunities = o.to_string();
        }
        if let Some(t) = patch.threats {
            self.threats = t.to_string();
        }
    }
}

/// Quadrants a matching SWOT group overwrites.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwotPatch {
    pub strengths: Option<&'static str>,
    pub weaknesses: Option<&'static str>,
    pub opportunities: Option<&'static str>,
    pub threats: Option<&'static str>,
}

/// SWOT groups, applied in order.
pub static SWOT_RULES: &[KeywordRule<SwotPatch>] = &[
    KeywordRule {
        keywords: &["ai", "teknologi"],
        value: SwotPatch {
            strengths: Some("Teknisk expertis, innovationskultur, tidiga adopters"),
            weaknesses: None,
            opportunities: Some("AI-implementation, automatisering, new business models"),
            threats: Some("Teknisk disruption, cybersäkerhet, kompetensklyftor"),
        },
    },
    KeywordRule {
        keywords: &["kund", "försäljning"],
        value: SwotPatch {
            strengths: Some("Starka kundrelationer, brand recognition, säljteam"),
            weaknesses: None,
            opportunities: Some("Marknadstillväxt, cross-selling, customer lifetime value"),
            threats: Some("Kundförlust, prispress, nya competitors"),
        },
    },
    KeywordRule {
        keywords: &["projekt", "implementation"],
        value: SwotPatch {
            strengths: Some("Projektmetodik, change management, stakeholder buy-in"),
            weaknesses: Some("Scope creep, resource conflicts, timeline pressure"),
            opportunities: Some("Scalable processes, lessons learned, best practices"),
            threats: None,
        },
    },
];

/// Classify purpose and details into SWOT quadrants.
///
/// Every matching group overwrites the quadrants it names, so the last
/// matching group wins for a quadrant several groups touch. This is the
/// opposite convention from [`extract_title`].
pub fn classify_swot(purpose: &str, details: &str) -> SwotQuadrants {
    let context = fold_context(purpose, details);
    let mut quadrants = SwotQuadrants::default();
    for patch in all_matches(SWOT_RULES, &context) {
        quadrants.apply(patch);
    }
    quadrants
}

/// Situation bullet sets. First match replaces the default wholesale.
pub static SITUATION_RULES: &[KeywordRule<&[&str]>] = &[
    KeywordRule {
        keywords: &["projekt"],
        value: &[
            "Projektmål och scope - ursprungliga målsättningar",
            "Aktuell status - deliverables, timeline, budget",
            "Team och resurser - kapacitet och kompetens",
            "Stakeholders - förväntningar och engagement",
        ],
    },
    KeywordRule {
        keywords: &["försäljning", "marknad"],
        value: &[
            "Marknadsposition - vårt läge vs konkurrenter",
            "Säljresultat - pipeline, conversion, trends",
            "Kundportfölj - retention, satisfaction, growth",
            "Marknadstrender - opportunities och hot",
        ],
    },
];

const DEFAULT_SITUATION: &[&str] = &[
    "Nuvarande prestanda - KPI:er och trender",
    "Organisationens resurser - team, kapacitet, kompetens",
    "Pågående initiativ - status och resultat",
    "Intressentförväntningar - krav och målsättningar",
];

/// Bullets describing the current situation. First match wins.
pub fn classify_situation(purpose: &str, details: &str) -> Vec<String> {
    let context = fold_context(purpose, details);
    to_owned_list(first_match(SITUATION_RULES, &context).copied().unwrap_or(DEFAULT_SITUATION))
}

/// Complication bullet sets. First match replaces the default wholesale.
pub static COMPLICATION_RULES: &[KeywordRule<&[&str]>] = &[KeywordRule {
    keywords: &["problem", "utmaning"],
    value: &[
        "Kritiska flaskhalsar som blockerar framsteg",
        "Riskfaktorer med hög sannolikhet och impact",
        "Tidskritiska beslut - deadline approaching",
        "Resurskonflikter - competing priorities",
    ],
}];

const DEFAULT_COMPLICATION: &[&str] = &[
    "Performance gaps - var missar vi target?",
    "Systemproblem som skapar ineffektivitet",
    "Marknadstryck - competitive threats",
    "Internpolitik - alignment challenges",
];

/// Bullets describing what stands in the way. First match wins.
pub fn classify_complication(purpose: &str, details: &str) -> Vec<String> {
    let context = fold_context(purpose, details);
    to_owned_list(
        first_match(COMPLICATION_RULES, &context)
            .copied()
            .unwrap_or(DEFAULT_COMPLICATION),
    )
}

/// KPI sets for the dashboard slide. First match wins.
pub static DASHBOARD_RULES: &[KeywordRule<&[&str]>] = &[
    KeywordRule {
        keywords: &["försäljning", "kund"],
        value: &[
            "Revenue Growth: Monthly trend vs target (+/-%)",
            "Customer Acquisition: New customers vs churn rate",
            "Pipeline Health: Conversion rate och genomsnittlig deal size",
            "Customer Satisfaction: NPS score och retention %",
        ],
    },
    KeywordRule {
        keywords: &["projekt"],
        value: &[
            "Schedule Performance: On-time delivery vs planned milestones",
            "Budget Performance: Actual spend vs allocated budget (%)",
            "Quality Metrics: Defect rate och stakeholder approval",
            "Resource Utilization: Team capacity vs workload",
        ],
    },
    KeywordRule {
        keywords: &["produkt", "utveckling"],
        value: &[
            "User Engagement: DAU/MAU och session duration",
            "Product Quality: Bug reports och resolution time",
            "Feature Adoption: Usage rate för nya releases",
            "Development Velocity: Story points per sprint",
        ],
    },
];

const DEFAULT_KPIS: &[&str] = &[
    "Operational Efficiency: Throughput vs resource cost",
    "Quality Indicators: Error rate och customer complaints",
    "Financial Performance: ROI och budget variance",
    "Team Performance: Productivity metrics och satisfaction",
];

/// KPI bullets for the dashboard slide.
pub fn dashboard_kpis(purpose: &str, details: &str) -> Vec<String> {
    let context = fold_context(purpose, details);
    to_owned_list(first_match(DASHBOARD_RULES, &context).copied().unwrap_or(DEFAULT_KPIS))
}

/// Conclusion action lists. First match wins.
pub static CONCLUSION_RULES: &[KeywordRule<&[&str]>] = &[
    KeywordRule {
        keywords: &["beslut"],
        value: &[
            "Beslutspunkter som kräver omedelbar action",
            "Ägare och ansvar för varje beslut",
            "Timeline för implementation och uppföljning",
            "Success criteria och mätmetoder",
        ],
    },
    KeywordRule {
        keywords: &["status"],
        value: &[
            "Kritiska actions för att hålla timeline",
            "Risker som måste monitoras och mitigeras",
            "Resource needs och eskaleringspunkter",
            "Nästa rapporteringstillfälle och agenda",
        ],
    },
];

const DEFAULT_CONCLUSION: &[&str] = &[
    "Prioriterade nästa steg (första 30 dagarna)",
    "Ansvariga personer och deadlines",
    "Success metrics och uppföljningsplan",
    "Kommunikation till organisationen",
];

/// Action items for the closing slide, conditioned on the purpose only.
pub fn conclusion_points(purpose: &str) -> Vec<String> {
    to_owned_list(
        first_match(CONCLUSION_RULES, &fold(purpose))
            .copied()
            .unwrap_or(DEFAULT_CONCLUSION),
    )
}

/// Title-slide bullets contributed by the purpose. Every match adds one.
pub static PURPOSE_POINT_RULES: &[KeywordRule<&str>] = &[
    KeywordRule { keywords: &["analys"], value: "Djupanalys för datadrivna beslut" },
    KeywordRule { keywords: &["strategi"], value: "Strategiska vägval och prioritering" },
    KeywordRule { keywords: &["problem"], value: "Problemlösning och handlingsplan" },
    KeywordRule { keywords: &["status"], value: "Lägesuppdatering och prognos" },
];

const DEFAULT_PURPOSE_POINTS: &[&str] = &["Insiktsdrivet beslutsunderlag", "Actionable rekommendationer"];

/// Number of detail lines quoted on the title slide.
const TITLE_DETAIL_LINES: usize = 2;

/// Bullets for the title slide.
///
/// Matching purpose points come first, then up to two qualifying detail
/// lines. The list is capped so that [`BRAND_LINE`] is always the last
/// bullet.
pub fn purpose_points(purpose: &str, details: &str) -> Vec<String> {
    let folded = fold(purpose);
    let mut points: Vec<String> = all_matches(PURPOSE_POINT_RULES, &folded)
        .map(|p| p.to_string())
        .collect();

    points.extend(extract_detail_points(details, TITLE_DETAIL_LINES, TITLE_POINT_MIN_LEN));

    if points.is_empty() {
        points = to_owned_list(DEFAULT_PURPOSE_POINTS);
    }

    points.truncate(MAX_TITLE_POINTS - 1);
    points.push(BRAND_LINE.to_string());
    points
}

/// A body slide the custom structure adds when its keywords appear.
#[derive(Debug, Clone, Copy)]
pub struct SectionTemplate {
    pub title: &'static str,
    pub content: &'static [&'static str],
    pub notes: &'static str,
}

/// Custom-structure sections. Every match adds a slide, in table order.
pub static CUSTOM_SECTION_RULES: &[KeywordRule<SectionTemplate>] = &[
    KeywordRule {
        keywords: &["analys", "undersökning"],
        value: SectionTemplate {
            title: "Analysresultat & insikter",
            content: &[
                "Nyckeldata och trender - vad ser vi?",
                "Mönster och anomalier - vad sticker ut?",
                "Root cause analysis - varför ser det ut så här?",
                "Implikationer för business - vad betyder det?",
            ],
            notes: "Data berättar en historia - hjälp publiken förstå narrativet och implikationerna.",
        },
    },
    KeywordRule {
        keywords: &["rekommendation", "förslag"],
        value: SectionTemplate {
            title: "Rekommendationer",
            content: &[
                "Prioriterade åtgärder - vad ska vi göra först?",
                "Implementation approach - hur genomför vi det?",
                "Resource requirements - vad behöver vi?",
                "Success metrics - hur mäter vi framgång?",
            ],
            notes: "Varje rekommendation ska vara SMART och ha en tydlig ägare med deadline.",
        },
    },
];

/// Sections for a custom deck, matched against the purpose only.
pub fn custom_sections(purpose: &str) -> Vec<SectionTemplate> {
    let folded = fold(purpose);
    all_matches(CUSTOM_SECTION_RULES, &folded).copied().collect()
}

/// Split free-text details into presentable bullet points.
///
/// Lines whose trimmed length is at most `min_len` characters are dropped.
/// Kept lines are trimmed, lose a leading bullet glyph and get an upper-case
/// first letter. At most `max_points` lines are returned, in input order.
pub fn extract_detail_points(details: &str, max_points: usize, min_len: usize) -> Vec<String> {
    details
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > min_len)
        .map(clean_point)
        .filter(|point| !point.is_empty())
        .take(max_points)
        .collect()
}

/// Strip a bullet glyph and capitalize the first letter.
fn clean_point(line: &str) -> String {
    let stripped = LEADING_BULLET_REGEX.replace(line, "");
    capitalize_first(&stripped)
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_priority() {
        assert_eq!(extract_title("Presentera SWOT-analys för styrelsen"), "SWOT-analys");
        assert_eq!(extract_title("swot för vår strategi och projektplan"), "SWOT-analys");
        assert_eq!(extract_title("Strategi för projektet"), "Strategianalys");
        assert_eq!(extract_title("Projektets status"), "Projektöversikt");
        assert_eq!(extract_title("Månadens STATUS"), "Statusrapport");
        assert_eq!(extract_title("Vår plan framåt"), "Handlingsplan");
        assert_eq!(extract_title("En analys av läget"), "Analys och insikter");
        assert_eq!(extract_title(""), DEFAULT_TITLE);
    }

    #[test]
    fn test_extract_title_any_case_swot() {
        for purpose in ["SWOT", "sWoT i strategi", "status och swot", "plan: Swot"] {
            assert_eq!(extract_title(purpose), "SWOT-analys", "purpose: {}", purpose);
        }
    }

    #[test]
    fn test_fold_normalizes_decomposed_text() {
        // "försäljning" with a combining diaeresis
        let decomposed = "FO\u{0308}RSA\u{0308}LJNING";
        assert_eq!(fold(decomposed), "försäljning");
    }

    #[test]
    fn test_classify_swot_defaults() {
        assert_eq!(classify_swot("", ""), SwotQuadrants::default());
    }

    #[test]
    fn test_classify_swot_last_group_wins() {
        let swot = classify_swot("Teknologi för kundnöjdhet", "");
        assert_eq!(swot.strengths, "Starka kundrelationer, brand recognition, säljteam");
        assert_eq!(swot.threats, "Kundförlust, prispress, nya competitors");
        // Neither group touches weaknesses
        assert_eq!(swot.weaknesses, SwotQuadrants::default().weaknesses);
    }

    #[test]
    fn test_classify_swot_disjoint_groups_merge() {
        let swot = classify_swot("Teknologi", "Implementation i tre steg");
        // Technology strengths overwritten by the project group
        assert_eq!(swot.strengths, "Projektmetodik, change management, stakeholder buy-in");
        // Threats only come from the technology group
        assert_eq!(swot.threats, "Teknisk disruption, cybersäkerhet, kompetensklyftor");
        assert_eq!(swot.weaknesses, "Scope creep, resource conflicts, timeline pressure");
    }

    #[test]
    fn test_classify_swot_ignores_text_order() {
        let tech_first = classify_swot("Teknologi i fokus", "Implementation i tre steg");
        let project_first = classify_swot("Implementation i tre steg", "Teknologi i fokus");
        assert_eq!(tech_first, project_first);

        // Same two groups swapped inside the purpose alone
        let swapped = classify_swot("Implementation i tre steg. Teknologi i fokus", "");
        assert_eq!(swapped, classify_swot("Teknologi i fokus. Implementation i tre steg", ""));
        // Table order decides: the project group is applied last
        assert_eq!(swapped.strengths, "Projektmetodik, change management, stakeholder buy-in");
        assert_eq!(swapped, tech_first);
    }

    #[test]
    fn test_classify_swot_reads_details() {
        let swot = classify_swot("Presentera SWOT-analys för styrelsen", "Fokus på AI");
        assert_eq!(swot.strengths, "Teknisk expertis, innovationskultur, tidiga adopters");
    }

    #[test]
    fn test_classify_situation_first_match() {
        let both = classify_situation("Projekt inom försäljning", "");
        assert_eq!(both[0], "Projektmål och scope - ursprungliga målsättningar");

        let market = classify_situation("Nordisk marknad", "");
        assert_eq!(market[0], "Marknadsposition - vårt läge vs konkurrenter");

        let default = classify_situation("Kvartalsgenomgång", "");
        assert_eq!(default.len(), 4);
        assert_eq!(default[0], DEFAULT_SITUATION[0]);
    }

    #[test]
    fn test_classify_complication() {
        let problem = classify_complication("", "En stor utmaning i leveransen");
        assert_eq!(problem[0], "Kritiska flaskhalsar som blockerar framsteg");
        assert_eq!(classify_complication("Kvartal", "")[0], DEFAULT_COMPLICATION[0]);
    }

    #[test]
    fn test_extract_detail_points_thresholds() {
        let details = "a\n\nb short\nthis is long enough";
        assert_eq!(
            extract_detail_points(details, 4, DETAIL_POINT_MIN_LEN),
            vec!["B short", "This is long enough"]
        );
        assert_eq!(
            extract_detail_points(details, 4, TITLE_POINT_MIN_LEN),
            vec!["This is long enough"]
        );
    }

    #[test]
    fn test_extract_detail_points_cleanup_and_cap() {
        let details = "  - första punkten här\n• ändra processen\n* tredje raden\nfjärde raden\nfemte raden";
        let points = extract_detail_points(details, 3, DETAIL_POINT_MIN_LEN);
        assert_eq!(points, vec!["Första punkten här", "Ändra processen", "Tredje raden"]);
    }

    #[test]
    fn test_extract_detail_points_boundary_length() {
        // Exactly at the threshold is dropped
        assert!(extract_detail_points("12345", 4, 5).is_empty());
        assert_eq!(extract_detail_points("123456", 4, 5), vec!["123456"]);
    }

    #[test]
    fn test_purpose_points_branding_last() {
        let points = purpose_points(
            "Strategisk analys av problem och status",
            "En lång detaljrad om marknaden\nEn till lång detaljrad",
        );
        assert_eq!(points.len(), MAX_TITLE_POINTS);
        assert_eq!(points[0], "Djupanalys för datadrivna beslut");
        assert_eq!(points.last().map(String::as_str), Some(BRAND_LINE));
    }

    #[test]
    fn test_purpose_points_defaults() {
        let points = purpose_points("Kvartalsmöte", "kort");
        assert_eq!(
            points,
            vec!["Insiktsdrivet beslutsunderlag", "Actionable rekommendationer", BRAND_LINE]
        );
    }

    #[test]
    fn test_dashboard_and_conclusion() {
        assert!(dashboard_kpis("Försäljning Q3", "")[0].starts_with("Revenue Growth"));
        assert!(dashboard_kpis("Produktutveckling", "")[0].starts_with("User Engagement"));
        assert_eq!(dashboard_kpis("", ""), to_owned_list(DEFAULT_KPIS));

        assert_eq!(conclusion_points("Beslut om status")[0], "Beslutspunkter som kräver omedelbar action");
        assert_eq!(conclusion_points("Statusmöte")[0], "Kritiska actions för att hålla timeline");
        assert_eq!(conclusion_points("Workshop"), to_owned_list(DEFAULT_CONCLUSION));
    }

    #[test]
    fn test_custom_sections_accumulate() {
        let sections = custom_sections("Analys och förslag");
        let titles: Vec<_> = sections.iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Analysresultat & insikter", "Rekommendationer"]);
        assert!(custom_sections("Kickoff").is_empty());
    }
}
