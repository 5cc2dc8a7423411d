use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Phone number is required")]
    Empty,
    #[error("Phone number is malformed: {0}")]
    Malformed(String),
}

/// Converts a lead's phone number into international dialling form.
///
/// Whitespace and dashes are removed. Numbers that already start with `+`
/// are kept as they are; anything else loses one leading zero and gains
/// `country_code`.
pub fn normalize_phone(raw: &str, country_code: &str) -> Result<String, PhoneError> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    let (prefix, digits) = match compact.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => (
            country_code,
            compact.strip_prefix('0').unwrap_or(compact.as_str()),
        ),
    };

    if digits.is_empty() {
        return Err(PhoneError::Empty);
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(PhoneError::Malformed(raw.trim().to_string()));
    }

    Ok(format!("{prefix}{digits}"))
}
