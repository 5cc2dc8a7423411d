//! Token extraction for the chat responder: phone numbers, visit dates,
//! bedroom counts, budget ceilings and localities.

use once_cell::sync::Lazy;
use regex::Regex;

/// Localities the search filter recognises inside a free-text message.
pub const KNOWN_LOCALITIES: &[&str] = &[
    "bandra",
    "worli",
    "andheri",
    "powai",
    "pune",
    "nashik",
    "nagpur",
    "lonavala",
    "alibaug",
    "panchgani",
];

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";
const WEEKDAYS: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{10}").unwrap());

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)\b(?:day after tomorrow|today|tomorrow|tonight|(?:this\s+|next\s+)?(?:{WEEKDAYS})|[0-9]{{1,2}}(?:st|nd|rd|th)(?:\s+(?:of\s+)?(?:{MONTHS}))?|(?:{MONTHS})\s+[0-9]{{1,2}}(?:st|nd|rd|th)?)\b"
    );
    Regex::new(&pattern).unwrap()
});

static BOOKING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:schedule|visit|book|appointment|viewing|see|date)").unwrap()
});

static COMPARE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:compare|comparison|difference|differences|vs|versus)\b").unwrap()
});

static SUPPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:help|support|contact|call|office)\b").unwrap());

static GREETING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:hi|hello)").unwrap());

static BHK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)([0-9]+)\s*bhk").unwrap());

static CRORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)([0-9]+(?:\.[0-9]+)?)\s*cr").unwrap());

static UNDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bunder").unwrap());

static PRICE_VALUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9.]+").unwrap());

static LOCALITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(?:{})\b", KNOWN_LOCALITIES.join("|"))).unwrap()
});

pub fn extract_phone(text: &str) -> Option<&str> {
    PHONE_RE.find(text).map(|m| m.as_str())
}

pub fn extract_date(text: &str) -> Option<&str> {
    DATE_RE.find(text).map(|m| m.as_str())
}

pub fn mentions_booking(text: &str) -> bool {
    BOOKING_RE.is_match(text)
}

pub fn mentions_comparison(text: &str) -> bool {
    COMPARE_RE.is_match(text)
}

pub fn mentions_support(text: &str) -> bool {
    SUPPORT_RE.is_match(text)
}

/// Short openers like "hi" or "hello there". Longer messages that happen to
/// start with a greeting are treated as searches.
pub fn is_greeting(text: &str) -> bool {
    let trimmed = text.trim();
    GREETING_RE.is_match(trimmed) && trimmed.chars().count() < 20
}

pub fn extract_bedrooms(text: &str) -> Option<i32> {
    BHK_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// A budget ceiling in crores, only when the message says "under".
pub fn extract_budget_ceiling(text: &str) -> Option<f64> {
    if !UNDER_RE.is_match(text) {
        return None;
    }
    CRORE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn extract_locality(text: &str) -> Option<String> {
    LOCALITY_RE.find(text).map(|m| m.as_str().to_lowercase())
}

/// Leading numeric value of a display price such as `₹ 3.5 Cr`.
pub fn price_value(price: &str) -> Option<f64> {
    PRICE_VALUE_RE
        .find_iter(price)
        .find_map(|m| m.as_str().parse::<f64>().ok())
}
