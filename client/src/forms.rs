//! # Forms
//!
//! Submission gates: each form checks its raw input with
//! [`utils::validation`](crate::utils::validation) and either yields the
//! request DTO or the per-field errors to show. Forms never clear what the
//! user typed.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use shared::{
    CreateNoteRequest, CreateRatingRequest, CreateWithdrawalRequest, LoginRequest, RegisterRequest,
    UpdateNoteRequest, UpdateWithdrawalRequest,
};

use crate::core::error::{ApiError, ErrorKind};
use crate::utils::validation::{
    normalize_iban, validate_email, validate_iban, validate_name, validate_password, validate_price,
    validate_rating, validate_withdrawal_amount, ValidationResult,
};

/// Field reported when an error does not belong to one input.
pub const FORM_FIELD: &str = "form";

pub const MAX_COMMENT_LEN: usize = 500;

/// Error messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Record `result` under `field` when it failed.
    pub fn check(&mut self, field: &'static str, result: ValidationResult) {
        if let Some(error) = result.error {
            self.0.insert(field, error);
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        let details: Vec<String> = errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        ApiError::Validation {
            message: details.first().cloned().unwrap_or_default(),
            details,
        }
    }
}

fn parse_amount(field: &'static str, raw: &str, errors: &mut FieldErrors) -> Option<Decimal> {
    let raw = raw.trim().replace(',', ".");
    if raw.is_empty() {
        errors.insert(field, "Amount is required");
        return None;
    }
    match Decimal::from_str(&raw) {
        Ok(value) => Some(value),
        Err(_) => {
            errors.insert(field, "Enter a valid amount");
            None
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
    pub errors: FieldErrors,
}

impl LoginForm {
    pub const INVALID_CREDENTIALS: &'static str = "Invalid email or password";

    pub fn validate(&mut self) -> Result<LoginRequest, FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check("email", validate_email(&self.email));
        if self.password.is_empty() {
            errors.insert("password", "Password is required");
        }
        self.errors = errors.clone();
        errors.into_result(|| LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }

    /// Reflect a failed login. Rejected credentials mark both email and
    /// password invalid; nothing the user typed is cleared.
    pub fn apply_failure(&mut self, error: &ApiError) {
        match error.kind() {
            ErrorKind::Unauthorized | ErrorKind::Validation => {
                self.errors.insert("email", Self::INVALID_CREDENTIALS);
                self.errors.insert("password", Self::INVALID_CREDENTIALS);
            }
            _ => self.errors.insert(FORM_FIELD, error.user_message()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub university: String,
    pub accept_terms: bool,
    pub errors: FieldErrors,
}

impl RegisterForm {
    pub fn validate(&mut self) -> Result<RegisterRequest, FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check("first_name", validate_name(&self.first_name, "First name"));
        errors.check("last_name", validate_name(&self.last_name, "Last name"));
        errors.check("email", validate_email(&self.email));
        errors.check("password", validate_password(&self.password));
        if self.confirm_password != self.password {
            errors.insert("confirm_password", "Passwords do not match");
        }
        if !self.accept_terms {
            errors.insert("accept_terms", "You must accept the terms");
        }
        self.errors = errors.clone();
        errors.into_result(|| RegisterRequest {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            university: non_empty(&self.university),
        })
    }

    pub fn apply_failure(&mut self, error: &ApiError) {
        match error {
            ApiError::Conflict(_) => self.errors.insert("email", "An account with this email already exists"),
            other => self.errors.insert(FORM_FIELD, other.user_message()),
        }
    }
}

/// Create or edit a note. `price` is the raw text input.
#[derive(Debug, Clone, Default)]
pub struct NoteForm {
    pub title: String,
    pub description: String,
    pub price: String,
    pub university: String,
    pub course: String,
    pub year: Option<u16>,
    pub file_url: String,
    pub errors: FieldErrors,
}

impl NoteForm {
    fn check(&self) -> (FieldErrors, Option<Decimal>) {
        let mut errors = FieldErrors::default();
        let title_len = self.title.trim().chars().count();
        if title_len < 3 {
            errors.insert("title", "Title must be at least 3 characters");
        } else if title_len > 120 {
            errors.insert("title", "Title must be less than 120 characters");
        }
        if self.description.trim().chars().count() < 10 {
            errors.insert("description", "Description must be at least 10 characters");
        }
        if self.university.trim().is_empty() {
            errors.insert("university", "University is required");
        }
        if self.course.trim().is_empty() {
            errors.insert("course", "Course is required");
        }
        if let Some(year) = self.year {
            if !(1..=6).contains(&year) {
                errors.insert("year", "Year must be between 1 and 6");
            }
        }
        let price = parse_amount("price", &self.price, &mut errors);
        if let Some(price) = price {
            errors.check("price", validate_price(price));
        }
        (errors, price)
    }

    pub fn validate(&mut self) -> Result<CreateNoteRequest, FieldErrors> {
        let (errors, price) = self.check();
        self.errors = errors.clone();
        errors.into_result(|| CreateNoteRequest {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price: price.unwrap_or_default(),
            university: self.university.trim().to_string(),
            course: self.course.trim().to_string(),
            year: self.year,
            file_url: non_empty(&self.file_url),
        })
    }

    /// Same rules, producing a full update of the note's fields.
    pub fn validate_update(&mut self) -> Result<UpdateNoteRequest, FieldErrors> {
        let (errors, price) = self.check();
        self.errors = errors.clone();
        errors.into_result(|| UpdateNoteRequest {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            price,
            university: Some(self.university.trim().to_string()),
            course: Some(self.course.trim().to_string()),
            year: self.year,
        })
    }
}

/// New payout request against `available` balance.
#[derive(Debug, Clone, Default)]
pub struct WithdrawalForm {
    pub amount: String,
    pub iban: String,
    pub available: Decimal,
    pub errors: FieldErrors,
}

impl WithdrawalForm {
    pub fn new(available: Decimal) -> Self {
        Self {
            available,
            ..Self::default()
        }
    }

    pub fn validate(&mut self) -> Result<CreateWithdrawalRequest, FieldErrors> {
        let mut errors = FieldErrors::default();
        let amount = parse_amount("amount", &self.amount, &mut errors);
        if let Some(amount) = amount {
            errors.check("amount", validate_withdrawal_amount(amount, self.available));
        }
        errors.check("iban", validate_iban(&self.iban));
        self.errors = errors.clone();
        errors.into_result(|| CreateWithdrawalRequest {
            amount: amount.unwrap_or_default(),
            iban: normalize_iban(&self.iban),
        })
    }
}

/// Edit the IBAN of a pending withdrawal.
#[derive(Debug, Clone, Default)]
pub struct WithdrawalUpdateForm {
    pub iban: String,
    pub errors: FieldErrors,
}

impl WithdrawalUpdateForm {
    pub fn new(iban: impl Into<String>) -> Self {
        Self {
            iban: iban.into(),
            errors: FieldErrors::default(),
        }
    }

    /// An invalid IBAN blocks submission with "Invalid IBAN".
    pub fn validate(&mut self) -> Result<UpdateWithdrawalRequest, FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check("iban", validate_iban(&self.iban));
        self.errors = errors.clone();
        errors.into_result(|| UpdateWithdrawalRequest {
            iban: normalize_iban(&self.iban),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RatingForm {
    pub note_id: String,
    pub rating: u8,
    pub comment: String,
    pub errors: FieldErrors,
}

impl RatingForm {
    pub fn new(note_id: impl Into<String>) -> Self {
        Self {
            note_id: note_id.into(),
            ..Self::default()
        }
    }

    pub fn validate(&mut self) -> Result<CreateRatingRequest, FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check("rating", validate_rating(self.rating));
        if self.comment.trim().chars().count() > MAX_COMMENT_LEN {
            errors.insert(
                "comment",
                format!("Comment must be at most {MAX_COMMENT_LEN} characters"),
            );
        }
        self.errors = errors.clone();
        errors.into_result(|| CreateRatingRequest {
            note_id: self.note_id.clone(),
            rating: self.rating,
            comment: non_empty(&self.comment),
        })
    }
}
