//! Text handed to the voice agents: the property shortlist, the opening line
//! and the consultant persona.

use crate::models::Property;

pub const NO_PROPERTIES_CONTEXT: &str = "No specific properties found.";
pub const COMPANY_NAME: &str = "Purva Real Estate";

const SHORTLIST_LEN: usize = 3;

/// Builds the shortlist a voice agent pitches from.
///
/// Properties located in `preferred_area` come first. When nothing matches
/// (or no area was given) up to three listings are offered instead, featured
/// ones first, and labelled as such so the agent does not present them as
/// exact matches.
pub fn property_context(properties: &[Property], preferred_area: Option<&str>) -> String {
    if properties.is_empty() {
        return NO_PROPERTIES_CONTEXT.to_string();
    }

    let area = preferred_area.map(str::trim).filter(|area| !area.is_empty());

    if let Some(area) = area {
        let needle = area.to_lowercase();
        let matching: Vec<&Property> = properties
            .iter()
            .filter(|p| p.location.to_lowercase().contains(&needle))
            .take(SHORTLIST_LEN)
            .collect();
        if !matching.is_empty() {
            return format!("Properties matching {area}:\n{}", shortlist(&matching));
        }
    }

    let mut fallback: Vec<&Property> = properties.iter().collect();
    fallback.sort_by_key(|p| !p.featured);
    fallback.truncate(SHORTLIST_LEN);

    let heading = match area {
        Some(area) => format!(
            "No exact matches in {area}. Suggest these featured ones instead:"
        ),
        None => "Featured ones to suggest:".to_string(),
    };
    format!("{heading}\n{}", shortlist(&fallback))
}

fn shortlist(properties: &[&Property]) -> String {
    properties
        .iter()
        .map(|p| {
            let beds = p
                .beds
                .map(|beds| format!("{beds} BHK"))
                .unwrap_or_else(|| "size on request".to_string());
            format!("- {} ({}): {}, {}", p.title, p.location, beds, p.price)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn verification_line(name: &str) -> String {
    format!("Hello, am I speaking with {name}?")
}

/// Opening line for platforms that speak first without a scripted verification step.
pub fn opening_line(name: &str, preferred_area: Option<&str>, budget: Option<&str>) -> String {
    let mut line = format!("Hello {name}! This is a call from {COMPANY_NAME}. ");
    if let Some(area) = preferred_area.filter(|a| !a.trim().is_empty()) {
        line.push_str(&format!(
            "I understand you're interested in properties in {area}. "
        ));
    }
    if let Some(budget) = budget.filter(|b| !b.trim().is_empty()) {
        line.push_str(&format!("With a budget around {budget}. "));
    }
    line.push_str(
        "I'd love to help you find your perfect property. Do you have a few minutes to discuss your requirements?",
    );
    line
}

pub fn consultant_prompt(
    name: &str,
    preferred_area: Option<&str>,
    budget: Option<&str>,
    property_context: &str,
) -> String {
    let area = preferred_area.unwrap_or("To be discussed");
    let budget = budget.unwrap_or("Flexible");
    format!(
        "You are Purva, a senior property consultant at {COMPANY_NAME}, making an outbound phone call.

Speak slowly and politely in Indian English. Keep every answer to one or two sentences, ask one question at a time and wait for the reply. Address the client as \"{name} Ji\".

CLIENT
- Name: {name}
- Preferred location: {area}
- Budget: {budget}

PROPERTIES TO DISCUSS
{property_context}

FLOW
1. Confirm you are speaking with {name}. If not, apologise and end the call.
2. Introduce yourself and mention their recent enquiry on our website.
3. Understand their requirements: location, size and budget.
4. Recommend a site visit and agree a date and time.
5. Once the visit is agreed, call the schedule_appointment function, then thank them and close.

If they are busy, ask when to call back. If they are not interested, thank them and end politely."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn property(title: &str, location: &str, featured: bool) -> Property {
        let now = Utc::now().naive_utc();
        Property {
            id: Uuid::new_v4(),
            title: title.to_string(),
            location: location.to_string(),
            price: "₹ 2 Cr".to_string(),
            sqft: None,
            beds: Some(2),
            baths: Some(2),
            description: None,
            primary_image_url: None,
            virtual_tour_url: None,
            featured,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_store_yields_static_context() {
        assert_eq!(property_context(&[], Some("Bandra")), NO_PROPERTIES_CONTEXT);
        assert_eq!(property_context(&[], None), NO_PROPERTIES_CONTEXT);
    }

    #[test]
    fn area_matches_are_case_insensitive_and_capped() {
        let properties = vec![
            property("A", "Bandra West, Mumbai", false),
            property("B", "Worli, Mumbai", false),
            property("C", "bandra east", false),
            property("D", "BANDRA", false),
            property("E", "Bandra Kurla Complex", false),
        ];
        let context = property_context(&properties, Some("bandra"));
        assert!(context.starts_with("Properties matching bandra:"));
        assert!(context.contains("- A (Bandra West, Mumbai): 2 BHK, ₹ 2 Cr"));
        assert!(context.contains("- C "));
        assert!(context.contains("- D "));
        assert!(!context.contains("- B "));
        assert!(!context.contains("- E "));
    }

    #[test]
    fn unmatched_area_falls_back_to_featured_first() {
        let properties = vec![
            property("Plain", "Pune", false),
            property("Star", "Nashik", true),
        ];
        let context = property_context(&properties, Some("Goa"));
        assert!(context.starts_with("No exact matches in Goa."));
        let star = context.find("Star").unwrap();
        let plain = context.find("Plain").unwrap();
        assert!(star < plain);
    }

    #[test]
    fn opening_line_mentions_known_preferences() {
        let line = opening_line("Asha", Some("Lonavala"), None);
        assert!(line.starts_with("Hello Asha! This is a call from Purva Real Estate."));
        assert!(line.contains("properties in Lonavala"));
        assert!(!line.contains("budget"));
    }

    #[test]
    fn consultant_prompt_embeds_context() {
        let prompt = consultant_prompt("Asha", None, Some("3 Cr"), NO_PROPERTIES_CONTEXT);
        assert!(prompt.contains("Asha Ji"));
        assert!(prompt.contains("Preferred location: To be discussed"));
        assert!(prompt.contains("Budget: 3 Cr"));
        assert!(prompt.contains(NO_PROPERTIES_CONTEXT));
    }
}
