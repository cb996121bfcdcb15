//! Validation utilities for user input

use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(message.into()),
        }
    }
}

pub const INVALID_IBAN: &str = "Invalid IBAN";
pub const MAX_NOTE_PRICE: Decimal = Decimal::ONE_THOUSAND;

/// Validate email format
pub fn validate_email(email: &str) -> ValidationResult {
    let email = email.trim();
    if email.is_empty() {
        return ValidationResult::err("Email is required");
    }

    let Some((user, domain)) = email.split_once('@') else {
        return ValidationResult::err("Invalid email format");
    };

    if domain.contains('@') {
        return ValidationResult::err("Invalid email format");
    }

    if user.is_empty() {
        return ValidationResult::err("Email username cannot be empty");
    }

    if domain.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return ValidationResult::err("Invalid email domain");
    }

    ValidationResult::ok()
}

/// Validate a first or last name
pub fn validate_name(name: &str, field: &str) -> ValidationResult {
    let name = name.trim();
    if name.is_empty() {
        return ValidationResult::err(format!("{field} is required"));
    }

    if name.chars().count() < 2 {
        return ValidationResult::err(format!("{field} must be at least 2 characters"));
    }

    if name.chars().count() > 50 {
        return ValidationResult::err(format!("{field} must be less than 50 characters"));
    }

    if !name
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'')
    {
        return ValidationResult::err(format!("{field} can only contain letters, spaces, - and '"));
    }

    ValidationResult::ok()
}

/// Validate password strength
pub fn validate_password(password: &str) -> ValidationResult {
    if password.is_empty() {
        return ValidationResult::err("Password is required");
    }

    if password.len() < 8 {
        return ValidationResult::err("Password must be at least 8 characters");
    }

    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_numeric());

    if !has_uppercase {
        return ValidationResult::err("Password must contain at least one uppercase letter");
    }

    if !has_lowercase {
        return ValidationResult::err("Password must contain at least one lowercase letter");
    }

    if !has_digit {
        return ValidationResult::err("Password must contain at least one number");
    }

    ValidationResult::ok()
}

/// IBAN with spaces removed and letters uppercased
pub fn normalize_iban(iban: &str) -> String {
    iban.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Validate an IBAN (ISO 13616): country code, check digits, mod-97 == 1
pub fn validate_iban(iban: &str) -> ValidationResult {
    let iban = normalize_iban(iban);
    if iban.is_empty() {
        return ValidationResult::err("IBAN is required");
    }

    if !(15..=34).contains(&iban.len()) || !iban.chars().all(|c| c.is_ascii_alphanumeric()) {
        return ValidationResult::err(INVALID_IBAN);
    }

    let (country, rest) = iban.split_at(2);
    if !country.chars().all(|c| c.is_ascii_uppercase()) || !rest[..2].chars().all(|c| c.is_ascii_digit()) {
        return ValidationResult::err(INVALID_IBAN);
    }

    // Move the first four characters to the end, letters become 10..=35.
    let rearranged = iban[4..].chars().chain(iban[..4].chars());
    let mut remainder: u32 = 0;
    for c in rearranged {
        let value = match c.to_digit(36) {
            Some(v) => v,
            None => return ValidationResult::err(INVALID_IBAN),
        };
        remainder = if value < 10 {
            (remainder * 10 + value) % 97
        } else {
            (remainder * 100 + value) % 97
        };
    }

    if remainder != 1 {
        return ValidationResult::err(INVALID_IBAN);
    }

    ValidationResult::ok()
}

/// Validate a note price (positive, at most two decimals, capped)
pub fn validate_price(price: Decimal) -> ValidationResult {
    if price <= Decimal::ZERO {
        return ValidationResult::err("Price must be greater than zero");
    }

    if price.normalize().scale() > 2 {
        return ValidationResult::err("Price can have at most two decimals");
    }

    if price > MAX_NOTE_PRICE {
        return ValidationResult::err(format!("Price cannot exceed {}", shared::format_price(MAX_NOTE_PRICE)));
    }

    ValidationResult::ok()
}

/// Validate a withdrawal amount against the available balance
pub fn validate_withdrawal_amount(amount: Decimal, available: Decimal) -> ValidationResult {
    if amount <= Decimal::ZERO {
        return ValidationResult::err("Amount must be greater than zero");
    }

    if amount.normalize().scale() > 2 {
        return ValidationResult::err("Amount can have at most two decimals");
    }

    if amount > available {
        return ValidationResult::err(format!(
            "Amount exceeds available balance ({})",
            shared::format_price(available)
        ));
    }

    ValidationResult::ok()
}

/// Validate a star rating
pub fn validate_rating(rating: u8) -> ValidationResult {
    if !(1..=5).contains(&rating) {
        return ValidationResult::err("Rating must be between 1 and 5");
    }

    ValidationResult::ok()
}
