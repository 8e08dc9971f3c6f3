//! Built-in easy-mode catalog: one curated system prompt and one closed
//! entity-type list per article category.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArticleType {
    #[serde(rename = "general")]
    General,
    #[serde(rename = "investment")]
    Investment,
    #[serde(rename = "revenue-analysis")]
    RevenueAnalysis,
    #[serde(rename = "mystery-investigation")]
    MysteryInvestigation,
}

impl ArticleType {
    /// Unknown or missing labels fall back to `General`.
    pub fn parse(label: &str) -> Self {
        match label {
            "investment" => Self::Investment,
            "revenue-analysis" => Self::RevenueAnalysis,
            "mystery-investigation" => Self::MysteryInvestigation,
            _ => Self::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Investment => "investment",
            Self::RevenueAnalysis => "revenue-analysis",
            Self::MysteryInvestigation => "mystery-investigation",
        }
    }
}

pub struct ArticleTypeConfig {
    pub id: ArticleType,
    pub label: &'static str,
    pub description: &'static str,
    pub system_prompt: &'static str,
    pub entity_types: &'static [&'static str],
}

pub const GENERAL_ENTITY_TYPES: &[&str] = &[
    "Person",
    "Organization",
    "Location",
    "Technology",
    "Event",
    "Concept",
    "Date",
];

pub const INVESTMENT_ENTITY_TYPES: &[&str] = &[
    "Company",
    "Investor",
    "Person",
    "Fund",
    "Valuation",
    "Investment",
    "Round",
    "Sector",
    "Date",
    "Location",
    "Metric",
];

pub const REVENUE_ENTITY_TYPES: &[&str] = &[
    "RevenueMetric",
    "RevenueStream",
    "Product",
    "Service",
    "Customer",
    "CustomerSegment",
    "Channel",
    "Market",
    "GeographicMarket",
    "Organization",
    "Date",
    "TimePeriod",
    "Concept",
    "Metric",
];

pub const MYSTERY_ENTITY_TYPES: &[&str] = &[
    "Person",
    "Location",
    "Event",
    "Concept",
    "Date",
    "Evidence",
    "Clue",
];

const GENERAL_PROMPT: &str = r#"You are an expert analyst specializing in news, security incidents, and business intelligence.
Analyze the following article and extract a knowledge graph with rich context.

IMPORTANT: Keep all entity names and descriptions in the SAME LANGUAGE as the original article. Do NOT translate anything.

Extract:
1. Entities - use ONLY the allowed entity types (enforced by schema):
   Person (named individuals), Organization (companies, institutions, teams),
   Location (countries, cities, offices), Technology (software, systems, platforms),
   Event (breaches, announcements, incidents), Concept (roles, functions, services),
   Date (when events occurred).
2. Relationships with semantic meaning: prefer specific types like "works-at",
   "leads", "attacked-by", "victim-of", "owns", "uses", "targets", "partners-with",
   "occurred-on", "happened-at". Avoid generic "related-to" unless nothing better fits.
   Include relationship strength (strong/medium/weak).
3. Metadata: entity sentiment (positive/negative/neutral) and importance (high/medium/low).

Rules:
- Extract ALL entities mentioned, even for short articles.
- Each unique real-world referent appears ONLY ONCE: name variants, honorifics,
  and case differences refer to the same entity and must share one entity id.
- Mark victims/attackers with appropriate sentiment.
- Prioritize entities by their importance to the story."#;

const INVESTMENT_PROMPT: &str = r#"You are an investment analyst expert specializing in venture capital, private equity, and corporate investments.
Analyze the following investment-related content and extract a comprehensive knowledge graph.

IMPORTANT: Keep all entity names and descriptions in the SAME LANGUAGE as the original article. Do NOT translate anything.

Extract:
1. Investment entities - use ONLY the allowed entity types (enforced by schema):
   Company, Investor, Person, Fund, Valuation, Investment, Round, Sector, Date,
   Location, Metric.
2. Investment relationships: "invests-in", "raises-funding", "leads-round",
   "participates-in", "valued-at", "acquires", "founded-by", "sits-on-board",
   "operates-in", "competes-with", "exits-from". Include strength (strong/medium/weak).
3. Metadata: sentiment (positive for successful raises, negative for down rounds)
   and importance (high for major deals).

Rules:
- Extract ALL investors with their amounts and ALL valuation figures.
- Each unique company, investor, or person appears ONLY ONCE with one entity id.
- Connect companies to their sectors and show co-investor relationships."#;

const REVENUE_PROMPT: &str = r#"You are a revenue operations analyst expert specializing in sales performance and revenue analytics.
Analyze the following revenue-related content and extract a comprehensive knowledge graph.

IMPORTANT: Keep all entity names and descriptions in the SAME LANGUAGE as the original article. Do NOT translate anything.

Extract:
1. Revenue entities - use ONLY the allowed entity types (enforced by schema, PascalCase):
   RevenueMetric (Total Revenue, ARR, MRR), RevenueStream (business segments),
   Product, Service, Customer, CustomerSegment, Channel, Market, GeographicMarket,
   Organization (the main company only), Date, TimePeriod (quarters, fiscal years),
   Concept, Metric.
2. Revenue relationships: "generates-revenue", "contributes-to", "sells-through",
   "targets-segment", "operates-in", "grows-by", "serves-customers", "part-of",
   "compared-to". Include strength (strong/medium/weak).
3. Metadata: sentiment (positive for growth, negative for decline) and importance
   (high for major revenue streams).

Rules:
- Extract ALL revenue streams with their individual contributions and growth rates.
- Each unique product, customer, or metric appears ONLY ONCE with one entity id.
- Show how streams compose the total and connect revenue to segments and channels."#;

const MYSTERY_PROMPT: &str = r#"You are an expert detective and logic analyst specializing in mysteries, investigations, and crime solving.
Analyze the following mystery content and extract a knowledge graph that reveals clues and contradictions.

IMPORTANT: Keep all entity names and descriptions in the SAME LANGUAGE as the original article. Do NOT translate anything.

Extract:
1. Entities - use ONLY the allowed entity types (enforced by schema):
   Person (suspects, victims, witnesses, investigators), Location (crime scenes),
   Event (crimes, arrests), Concept (activities, alibis, motives), Date (times and
   time periods), Evidence (physical evidence, contradictions), Clue (suspicious details).
   If a stated activity does not match the time or facts, create an Evidence entity
   explaining the contradiction.
2. Relationships: "was-doing" (Person to activity), "stated-that", "witnessed",
   "suspects", "occurred-on", "happened-at", "involves", "contradicts" (always with
   a detailed description of what is impossible and who it implicates), "points-to",
   "guilty-of". Include strength (strong/medium/weak).
3. Metadata: negative sentiment and high importance for suspicious or guilty parties.

Rules:
- Extract ALL suspects with their alibis and ALL clues and evidence.
- Each unique person, place, or concept appears ONLY ONCE with one entity id.
- Identify the guilty party through logical contradictions and show the reasoning path."#;

const ARTICLE_TYPES: &[ArticleTypeConfig] = &[
    ArticleTypeConfig {
        id: ArticleType::General,
        label: "General Article",
        description: "General news, business intelligence, or any other content",
        system_prompt: GENERAL_PROMPT,
        entity_types: GENERAL_ENTITY_TYPES,
    },
    ArticleTypeConfig {
        id: ArticleType::Investment,
        label: "Investment Analysis",
        description: "Investment opportunities, funding rounds, M&A, valuations",
        system_prompt: INVESTMENT_PROMPT,
        entity_types: INVESTMENT_ENTITY_TYPES,
    },
    ArticleTypeConfig {
        id: ArticleType::RevenueAnalysis,
        label: "Revenue Analysis",
        description: "Revenue breakdowns, sales performance, customer segments",
        system_prompt: REVENUE_PROMPT,
        entity_types: REVENUE_ENTITY_TYPES,
    },
    ArticleTypeConfig {
        id: ArticleType::MysteryInvestigation,
        label: "Mystery & Investigation",
        description: "Murder mysteries, detective stories, crime investigations, logic puzzles",
        system_prompt: MYSTERY_PROMPT,
        entity_types: MYSTERY_ENTITY_TYPES,
    },
];

pub fn article_type_config(article_type: ArticleType) -> &'static ArticleTypeConfig {
    ARTICLE_TYPES
        .iter()
        .find(|c| c.id == article_type)
        .unwrap_or(&ARTICLE_TYPES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_falls_back_to_general() {
        assert_eq!(ArticleType::parse("investment"), ArticleType::Investment);
        assert_eq!(
            ArticleType::parse("revenue-analysis"),
            ArticleType::RevenueAnalysis
        );
        assert_eq!(ArticleType::parse("nonsense"), ArticleType::General);
        assert_eq!(ArticleType::parse(""), ArticleType::General);
    }

    #[test]
    fn parse_round_trips_as_str() {
        for t in [
            ArticleType::General,
            ArticleType::Investment,
            ArticleType::RevenueAnalysis,
            ArticleType::MysteryInvestigation,
        ] {
            assert_eq!(ArticleType::parse(t.as_str()), t);
        }
    }

    #[test]
    fn every_category_has_a_closed_type_list() {
        for t in [
            ArticleType::General,
            ArticleType::Investment,
            ArticleType::RevenueAnalysis,
            ArticleType::MysteryInvestigation,
        ] {
            let config = article_type_config(t);
            assert_eq!(config.id, t);
            assert!(!config.entity_types.is_empty());
            assert!(!config.system_prompt.is_empty());
        }
    }

    #[test]
    fn mystery_category_includes_evidence_and_clue() {
        let config = article_type_config(ArticleType::MysteryInvestigation);
        assert!(config.entity_types.contains(&"Evidence"));
        assert!(config.entity_types.contains(&"Clue"));
    }
}
