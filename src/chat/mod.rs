//! Rule-based chat responder.
//!
//! A chat turn is classified by keyword and pattern matching against the
//! latest message. The first matching branch produces the reply:
//! booking with details, booking without details, comparison, support,
//! greeting, and finally property search.
//!
//! [`respond`] is pure. When a visitor leaves a phone number the returned
//! [`ChatReply`] carries a [`BookingRequest`] that the caller persists.

pub mod extract;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AppointmentStatus, NewAppointment, Property};

use extract::{
    extract_bedrooms, extract_budget_ceiling, extract_date, extract_locality, extract_phone,
    is_greeting, mentions_booking, mentions_comparison, mentions_support, price_value,
};

pub const GENERAL_INQUIRY: &str = "General Inquiry";
pub const CHAT_CUSTOMER_PLACEHOLDER: &str = "Chat Visitor";

const MAX_SUGGESTIONS: usize = 3;
const MAX_LISTED: usize = 3;
const CONTEXT_WINDOW: usize = 3;

const SUPPORT_REPLY: &str = "You can reach the Purva Real Estate team on +91 98200 12345 or at support@purvarealestate.in. Our office in Bandra West, Mumbai is open Monday to Saturday, 10 AM to 7 PM.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(alias = "text")]
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Booking,
    BookingDetailsNeeded,
    Comparison,
    Support,
    Greeting,
    Search,
}

/// A visit the visitor asked for, ready to be stored as an appointment.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub phone: String,
    pub date: Option<String>,
    pub property_title: Option<String>,
    pub property_location: Option<String>,
}

impl BookingRequest {
    pub fn property_label(&self) -> &str {
        self.property_title.as_deref().unwrap_or(GENERAL_INQUIRY)
    }

    pub fn to_new_appointment(&self) -> NewAppointment {
        NewAppointment {
            id: Uuid::new_v4(),
            customer_name: CHAT_CUSTOMER_PLACEHOLDER.to_string(),
            customer_phone: self.phone.clone(),
            appointment_date: self.date.clone(),
            appointment_time: None,
            property_location: Some(
                self.property_location
                    .clone()
                    .unwrap_or_else(|| GENERAL_INQUIRY.to_string()),
            ),
            status: AppointmentStatus::Pending.as_str().to_string(),
            notes: Some(format!("Visit requested via chat for {}", self.property_label())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatReply {
    pub intent: Intent,
    pub message: String,
    pub suggestions: Vec<String>,
    pub booking: Option<BookingRequest>,
}

impl ChatReply {
    fn new(intent: Intent, body: String, mut suggestions: Vec<String>) -> Self {
        suggestions.truncate(MAX_SUGGESTIONS);
        let mut message = body;
        message.push_str("\n\nSuggested:");
        for suggestion in &suggestions {
            message.push_str("\n• ");
            message.push_str(suggestion);
        }
        Self {
            intent,
            message,
            suggestions,
            booking: None,
        }
    }

    fn with_booking(mut self, booking: BookingRequest) -> Self {
        self.booking = Some(booking);
        self
    }
}

pub fn respond(history: &[ChatMessage], properties: &[Property]) -> ChatReply {
    let latest = history
        .last()
        .map(|message| message.content.as_str())
        .unwrap_or_default();

    let phone = extract_phone(latest);
    let date = extract_date(latest);
    let wants_booking = mentions_booking(latest);

    if phone.is_some() || (wants_booking && date.is_some()) {
        let property = find_mentioned_property(latest, history, properties);
        return booking_with_details(phone, date, property);
    }

    if wants_booking {
        let property = find_mentioned_property(latest, history, properties);
        return booking_details_needed(property);
    }

    if mentions_comparison(latest) {
        return compare(latest, properties);
    }

    if mentions_support(latest) {
        return ChatReply::new(
            Intent::Support,
            SUPPORT_REPLY.to_string(),
            vec!["Schedule a visit".to_string(), "Show all properties".to_string()],
        );
    }

    if is_greeting(latest) {
        return greet(properties);
    }

    search(latest, properties)
}

fn find_mentioned_property<'a>(
    latest: &str,
    history: &[ChatMessage],
    properties: &'a [Property],
) -> Option<&'a Property> {
    std::iter::once(latest)
        .chain(
            history
                .iter()
                .rev()
                .take(CONTEXT_WINDOW)
                .map(|message| message.content.as_str()),
        )
        .find_map(|text| titles_in(text, properties).into_iter().next())
}

fn titles_in<'a>(text: &str, properties: &'a [Property]) -> Vec<&'a Property> {
    let haystack = text.to_lowercase();
    let mut found: Vec<&Property> = Vec::new();
    for property in properties {
        let title = property.title.trim().to_lowercase();
        if !title.is_empty()
            && haystack.contains(&title)
            && !found.iter().any(|seen| seen.id == property.id)
        {
            found.push(property);
        }
    }
    found
}

fn booking_with_details(
    phone: Option<&str>,
    date: Option<&str>,
    property: Option<&Property>,
) -> ChatReply {
    let label = property
        .map(|p| p.title.as_str())
        .unwrap_or(GENERAL_INQUIRY);

    let Some(phone) = phone else {
        let target = property
            .map(|p| format!("**{}**", p.title))
            .unwrap_or_else(|| "one of our properties".to_string());
        let when = date.unwrap_or("your preferred date");
        return ChatReply::new(
            Intent::BookingDetailsNeeded,
            format!(
                "I'd love to set up a visit to {target} on {when}. Please share your 10-digit phone number and preferred date so our team can confirm."
            ),
            vec![
                "Share my phone number".to_string(),
                "Show all properties".to_string(),
            ],
        );
    };

    let booking = BookingRequest {
        phone: phone.to_string(),
        date: date.map(str::to_string),
        property_title: property.map(|p| p.title.clone()),
        property_location: property.map(|p| p.location.clone()),
    };

    let body = match date {
        Some(date) => format!(
            "Your visit request for **{label}** on {date} is booked. Our team will call you on {phone} to confirm the time."
        ),
        None => format!(
            "Thanks! Your visit request for **{label}** is noted. Our team will call you on {phone} to fix a convenient date."
        ),
    };

    ChatReply::new(
        Intent::Booking,
        body,
        vec![
            "Show similar properties".to_string(),
            "Contact support".to_string(),
        ],
    )
    .with_booking(booking)
}

fn booking_details_needed(property: Option<&Property>) -> ChatReply {
    let target = property
        .map(|p| format!("**{}**", p.title))
        .unwrap_or_else(|| "one of our properties".to_string());
    ChatReply::new(
        Intent::BookingDetailsNeeded,
        format!(
            "Happy to arrange a visit to {target}! Please share your 10-digit phone number and a preferred date, for example \"tomorrow\" or \"Saturday\"."
        ),
        vec!["Book for tomorrow".to_string(), "Book for Saturday".to_string()],
    )
}

fn compare(latest: &str, properties: &[Property]) -> ChatReply {
    let mentioned = titles_in(latest, properties);
    if let [first, second, ..] = mentioned.as_slice() {
        let body = format!(
            "Here's how they compare:\n\n{}\n\n{}",
            comparison_card(first),
            comparison_card(second)
        );
        return ChatReply::new(
            Intent::Comparison,
            body,
            vec![
                format!("Schedule a visit to {}", first.title),
                format!("Schedule a visit to {}", second.title),
            ],
        );
    }

    let suggestions = match properties {
        [a, b, ..] => vec![format!("Compare {} vs {}", a.title, b.title)],
        _ => Vec::new(),
    };
    ChatReply::new(
        Intent::Comparison,
        "Please mention two property names to compare, for example \"compare Sea Breeze Apartments vs Green Valley Villa\".".to_string(),
        suggestions,
    )
}

fn comparison_card(property: &Property) -> String {
    let beds = property
        .beds
        .map(|beds| beds.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "**{}**\n• Price: {}\n• Beds: {}\n• Location: {}",
        property.title, property.price, beds, property.location
    )
}

fn greet(properties: &[Property]) -> ChatReply {
    ChatReply::new(
        Intent::Greeting,
        format!(
            "Hello! I'm Purva, your real estate assistant. We have {} listings available today. You can try asking:",
            properties.len()
        ),
        vec![
            "Show me 3 BHK in Bandra".to_string(),
            "Properties under 5 Cr".to_string(),
            "Schedule a visit".to_string(),
        ],
    )
}

/// Filters that narrow the property set. Each one is optional; the ones
/// present are combined with AND.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SearchFilters {
    pub locality: Option<String>,
    pub bedrooms: Option<i32>,
    pub max_price_crore: Option<f64>,
}

impl SearchFilters {
    pub fn from_message(text: &str) -> Self {
        Self {
            locality: extract_locality(text),
            bedrooms: extract_bedrooms(text),
            max_price_crore: extract_budget_ceiling(text),
        }
    }

    pub fn matches(&self, property: &Property) -> bool {
        if let Some(locality) = &self.locality {
            if !property.location.to_lowercase().contains(locality) {
                return false;
            }
        }
        if let Some(bedrooms) = self.bedrooms {
            if property.beds != Some(bedrooms) {
                return false;
            }
        }
        if let Some(ceiling) = self.max_price_crore {
            match price_value(&property.price) {
                Some(value) if value <= ceiling => {}
                _ => return false,
            }
        }
        true
    }
}

fn search(latest: &str, properties: &[Property]) -> ChatReply {
    let filters = SearchFilters::from_message(latest);
    let matches: Vec<&Property> = properties.iter().filter(|p| filters.matches(p)).collect();

    if matches.is_empty() {
        return ChatReply::new(
            Intent::Search,
            format!(
                "I couldn't find any exact matches for that. We have {} other premium listings; try a different area, size or budget.",
                properties.len()
            ),
            vec!["Show all properties".to_string()],
        );
    }

    let mut body = format!(
        "I found {} properties that might interest you:\n",
        matches.len()
    );
    for (index, property) in matches.iter().take(MAX_LISTED).enumerate() {
        body.push_str(&format!(
            "\n{}. **{}** - {}",
            index + 1,
            property.title,
            property.price
        ));
    }
    if matches.len() > MAX_LISTED {
        body.push_str(&format!("\n...and {} more.", matches.len() - MAX_LISTED));
    }

    let suggestions = matches
        .iter()
        .take(MAX_SUGGESTIONS)
        .map(|p| format!("Schedule a visit to {}", p.title))
        .collect();

    ChatReply::new(Intent::Search, body, suggestions)
}
