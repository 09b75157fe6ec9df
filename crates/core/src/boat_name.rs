//! Parses the upstream's free-text boat display name into structured fields.
//!
//! Canonical shape: `"<type> <class> - <name> [<weight> KG] [(<nickname>)]"`,
//! e.g. `"4X RACER - Endeavour 78 KG (Big Red)"`. Every piece is optional
//! except `name`; a boat with none of the decorations still parses, it just
//! has an empty `boat_type` and no classification/weight/nickname.

use regex::Regex;
use std::sync::OnceLock;

/// The fields the scraper cares about once a raw display name has been split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBoatName {
    pub boat_type: String,
    pub classification: Option<String>,
    pub weight_kg: Option<i32>,
    pub nickname: Option<String>,
    pub name: String,
    pub is_tinnie: bool,
}

fn boat_type_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+[X+-])\b").unwrap())
}

fn weight_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*KG\b").unwrap())
}

fn nickname_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^()]*)\)\s*$").unwrap())
}

fn classification_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(RACER|CLUB)\b").unwrap())
}

/// Phrases the upstream uses to mark a shell as a social/training "tinnie"
/// rather than a race boat. Confirmed against production naming samples
/// rather than guessed; extend this list if new upstream clubs use other
/// wording.
const TINNIE_MARKERS: &[&str] = &["TINNIE", "TINNY", "TIN BOAT"];

/// Parse one upstream boat display name.
pub fn parse_boat_name(raw: &str) -> ParsedBoatName {
    let trimmed = raw.trim();
    let upper = trimmed.to_uppercase();

    let boat_type = boat_type_re()
        .captures(trimmed)
        .map(|c| c[1].to_string())
        .unwrap_or_default();

    let classification = classification_re()
        .captures(&upper)
        .map(|c| c[1].to_string());

    let weight_kg = weight_re()
        .captures(&upper)
        .and_then(|c| c[1].parse::<i32>().ok());

    let nickname = nickname_re().captures(trimmed).map(|c| {
        c[1].split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    });

    let is_tinnie = TINNIE_MARKERS.iter().any(|marker| upper.contains(marker));

    let name = extract_middle_name(trimmed, &boat_type, nickname.is_some());

    ParsedBoatName {
        boat_type,
        classification,
        weight_kg,
        nickname,
        name,
        is_tinnie,
    }
}

fn extract_middle_name(trimmed: &str, boat_type: &str, has_nickname: bool) -> String {
    let mut rest = trimmed;

    if !boat_type.is_empty() {
        rest = rest.strip_prefix(boat_type).unwrap_or(rest).trim_start();
    }

    if has_nickname {
        if let Some(paren_start) = rest.rfind('(') {
            rest = rest[..paren_start].trim_end();
        }
    }

    if let Some(weight_match) = weight_re().find(&rest.to_uppercase()) {
        rest = rest[..weight_match.start()].trim_end();
    }

    for marker in ["RACER", "CLUB"] {
        if let Some(pos) = rest.to_uppercase().find(marker) {
            rest = rest[pos + marker.len()..].trim_start();
        }
    }

    rest.trim_start_matches('-').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_canonical_name() {
        let parsed = parse_boat_name("4X RACER - Endeavour 78 KG (Big Red)");
        assert_eq!(parsed.boat_type, "4X");
        assert_eq!(parsed.classification.as_deref(), Some("RACER"));
        assert_eq!(parsed.weight_kg, Some(78));
        assert_eq!(parsed.nickname.as_deref(), Some("Big Red"));
        assert_eq!(parsed.name, "Endeavour");
        assert!(!parsed.is_tinnie);
    }

    #[test]
    fn parses_without_decorations() {
        let parsed = parse_boat_name("Training Tub");
        assert_eq!(parsed.boat_type, "");
        assert_eq!(parsed.classification, None);
        assert_eq!(parsed.weight_kg, None);
        assert_eq!(parsed.nickname, None);
        assert_eq!(parsed.name, "Training Tub");
    }

    #[test]
    fn detects_tinnie_marker() {
        let parsed = parse_boat_name("Tinnie - Old Faithful");
        assert!(parsed.is_tinnie);
    }

    #[test]
    fn collapses_whitespace_in_nickname() {
        let parsed = parse_boat_name("2- CLUB - Rover (The   Old   Boat )");
        assert_eq!(parsed.nickname.as_deref(), Some("The Old Boat"));
    }

    #[test]
    fn strips_leading_dash_from_name() {
        let parsed = parse_boat_name("2X - Swift");
        assert_eq!(parsed.name, "Swift");
    }

    #[test]
    fn handles_plus_and_minus_boat_types() {
        assert_eq!(parse_boat_name("4+ RACER - A").boat_type, "4+");
        assert_eq!(parse_boat_name("2- CLUB - B").boat_type, "2-");
    }
}
