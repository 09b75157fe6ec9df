//! Pure parsing helpers: HTML card/login-state extraction and calendar JSON
//! normalization. No I/O lives here so these are exercised directly by unit
//! tests against recorded fixtures, without a live upstream.

use chrono::NaiveTime;
use scraper::{Html, Selector};
use serde::Deserialize;

/// One boat card scraped from `/bookings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBoatCard {
    pub source_id: String,
    pub display_name: String,
}

/// Extract the CSRF token from a login page: either a hidden `_token`
/// input or a `<meta name="csrf-token">` tag.
pub fn extract_csrf_token(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    let token_input = Selector::parse(r#"input[name="_token"]"#).ok()?;
    if let Some(el) = doc.select(&token_input).next() {
        if let Some(value) = el.value().attr("value") {
            return Some(value.to_string());
        }
    }

    let meta = Selector::parse(r#"meta[name="csrf-token"]"#).ok()?;
    doc.select(&meta)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string)
}

/// A page is authenticated when a logout affordance is present and no
/// login form is. Either condition failing means the login didn't stick.
pub fn looks_authenticated(html: &str) -> bool {
    let doc = Html::parse_document(html);

    let has_logout = Selector::parse(r#"a[href*="logout"], form[action*="logout"]"#)
        .ok()
        .is_some_and(|sel| doc.select(&sel).next().is_some());

    let has_login_form = Selector::parse(r#"form[action*="login"]"#)
        .ok()
        .is_some_and(|sel| doc.select(&sel).next().is_some());

    has_logout && !has_login_form
}

/// Surface any validation/error banner text for diagnostics, even on an
/// otherwise-ambiguous response.
pub fn extract_alert_text(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse(".alert-danger, .invalid-feedback").ok()?;
    let text: String = doc
        .select(&sel)
        .flat_map(|el| el.text())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();
    if text.is_empty() { None } else { Some(text) }
}

/// Parse the boat cards out of `/bookings`. Each card's display name lives
/// in the first `.mr-3`; its calendar link has shape
/// `/bookings/calendar/{source_id}`.
pub fn parse_boat_cards(html: &str) -> Vec<RawBoatCard> {
    let doc = Html::parse_document(html);
    let Ok(card_sel) = Selector::parse(".card") else {
        return Vec::new();
    };
    let Ok(name_sel) = Selector::parse(".mr-3") else {
        return Vec::new();
    };
    let Ok(link_sel) = Selector::parse(r#"a[href*="/bookings/calendar/"]"#) else {
        return Vec::new();
    };

    doc.select(&card_sel)
        .filter_map(|card| {
            let display_name = card.select(&name_sel).next()?.text().collect::<String>();
            let display_name = display_name.trim().to_string();

            let href = card.select(&link_sel).next()?.value().attr("href")?;
            let source_id = href.rsplit('/').next()?.to_string();

            if display_name.is_empty() || source_id.is_empty() {
                return None;
            }
            Some(RawBoatCard { source_id, display_name })
        })
        .collect()
}

/// One booking as returned by `/bookings/retrieve-calendar/{source_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamBookingEntry {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub member_name: String,
}

/// Normalize an upstream time string (`"6:30 AM"`, `"06:30:00"`, `"06:30"`)
/// into a 24-hour `HH:MM` string. Returns `None` for anything unparseable
/// so callers can drop the booking rather than persist garbage.
pub fn normalize_time(raw: &str) -> Option<String> {
    let raw = raw.trim();
    for fmt in ["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M%p"] {
        if let Ok(t) = NaiveTime::parse_from_str(raw, fmt) {
            return Some(t.format("%H:%M").to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_csrf_from_hidden_input() {
        let html = r#"<html><body><form><input type="hidden" name="_token" value="abc123"></form></body></html>"#;
        assert_eq!(extract_csrf_token(html).as_deref(), Some("abc123"));
    }

    #[test]
    fn extracts_csrf_from_meta_tag() {
        let html = r#"<html><head><meta name="csrf-token" content="xyz789"></head></html>"#;
        assert_eq!(extract_csrf_token(html).as_deref(), Some("xyz789"));
    }

    #[test]
    fn authenticated_page_has_logout_and_no_login_form() {
        let html = r#"<html><body><a href="/logout">Logout</a></body></html>"#;
        assert!(looks_authenticated(html));
    }

    #[test]
    fn page_with_login_form_is_not_authenticated() {
        let html = r#"<html><body><form action="/login"></form></body></html>"#;
        assert!(!looks_authenticated(html));
    }

    #[test]
    fn page_with_neither_is_not_authenticated() {
        assert!(!looks_authenticated("<html><body>hi</body></html>"));
    }

    #[test]
    fn extracts_alert_danger_text() {
        let html = r#"<div class="alert-danger">These credentials do not match our records.</div>"#;
        assert_eq!(
            extract_alert_text(html).as_deref(),
            Some("These credentials do not match our records.")
        );
    }

    #[test]
    fn parses_boat_cards_from_listing() {
        let html = r#"
            <div class="card">
                <span class="mr-3">4X RACER - Endeavour 78 KG (Big Red)</span>
                <a href="/bookings/calendar/42">View</a>
            </div>
            <div class="card">
                <span class="mr-3">Tinnie - Old Faithful</span>
                <a href="/bookings/calendar/43">View</a>
            </div>
        "#;
        let cards = parse_boat_cards(html);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].source_id, "42");
        assert_eq!(cards[0].display_name, "4X RACER - Endeavour 78 KG (Big Red)");
        assert_eq!(cards[1].source_id, "43");
    }

    #[test]
    fn empty_listing_yields_no_cards() {
        assert!(parse_boat_cards("<html><body>No boats today</body></html>").is_empty());
    }

    #[test]
    fn normalizes_various_time_formats() {
        assert_eq!(normalize_time("06:30:00").as_deref(), Some("06:30"));
        assert_eq!(normalize_time("6:30 AM").as_deref(), Some("06:30"));
        assert_eq!(normalize_time("6:30 PM").as_deref(), Some("18:30"));
        assert_eq!(normalize_time("14:00").as_deref(), Some("14:00"));
    }

    #[test]
    fn rejects_unparseable_time() {
        assert_eq!(normalize_time("not a time"), None);
    }
}
