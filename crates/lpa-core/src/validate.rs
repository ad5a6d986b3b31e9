//! Parent form and email validation

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[allow(clippy::expect_used)]
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static pattern compiles"));

#[allow(clippy::expect_used)]
static ATTACHMENT_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[^\s@]+@[^\s@]+\.[a-z]{2,}$").expect("static pattern compiles"));

/// Youngest age the quiz is written for
pub const MIN_AGE: u8 = 3;
/// Oldest age the quiz is written for
pub const MAX_AGE: u8 = 18;

/// Result of checking an email address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailCheck {
    /// Address is usable
    pub is_valid: bool,
    /// Message to show the parent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmailCheck {
    fn ok() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    fn invalid(message: &str) -> Self {
        Self {
            is_valid: false,
            error: Some(message.to_string()),
        }
    }
}

/// Check an address the way the parent form does
///
/// Flags common domain typos (`gmial`, `yahooo`) so the parent can fix
/// them before results are sent.
#[must_use]
pub fn validate_email(email: &str) -> EmailCheck {
    if email.trim().is_empty() {
        return EmailCheck::invalid("Email is required");
    }
    if !EMAIL.is_match(email) {
        return EmailCheck::invalid("Please enter a valid email address");
    }

    let domain = email
        .split('@')
        .nth(1)
        .map(str::to_lowercase)
        .unwrap_or_default();
    if domain.contains("gmial") && !domain.contains("gmail") {
        return EmailCheck::invalid("Did you mean gmail.com?");
    }
    if domain.contains("yahooo") && !domain.contains("yahoo.") {
        return EmailCheck::invalid("Did you mean yahoo.com?");
    }
    EmailCheck::ok()
}

/// Stricter check applied before sending an attachment
///
/// The top-level domain must be at least two letters.
#[must_use]
pub fn is_attachment_address(email: &str) -> bool {
    ATTACHMENT_EMAIL.is_match(email)
}

/// Details the parent enters before the quiz
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    /// Child's first name
    pub child_name: String,
    /// Kept as entered; validated to a whole number
    pub child_age: String,
    /// Where the report is sent
    pub parent_email: String,
}

impl FormData {
    /// Create form data
    #[must_use]
    pub fn new(
        child_name: impl Into<String>,
        child_age: impl Into<String>,
        parent_email: impl Into<String>,
    ) -> Self {
        Self {
            child_name: child_name.into(),
            child_age: child_age.into(),
            parent_email: parent_email.into(),
        }
    }

    /// Age as a number, when it parses
    #[must_use]
    pub fn age(&self) -> Option<u8> {
        self.child_age.trim().parse().ok()
    }
}

/// Field-level form errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormErrors {
    /// Name error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,
    /// Age error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_age: Option<String>,
    /// Email error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_email: Option<String>,
}

impl FormErrors {
    /// Check if every field passed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.child_name.is_none() && self.child_age.is_none() && self.parent_email.is_none()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = [&self.child_name, &self.child_age, &self.parent_email]
            .into_iter()
            .filter_map(Option::as_deref)
            .collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for FormErrors {}

/// Validate the parent form
///
/// # Errors
/// Returns every failing field at once
pub fn validate_form(form: &FormData) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();

    if form.child_name.trim().is_empty() {
        errors.child_name = Some("Child's name is required".to_string());
    }

    if form.child_age.trim().is_empty() {
        errors.child_age = Some("Child's age is required".to_string());
    } else if !form.age().is_some_and(|age| (MIN_AGE..=MAX_AGE).contains(&age)) {
        errors.child_age = Some(format!(
            "Age must be a whole number between {MIN_AGE} and {MAX_AGE}"
        ));
    }

    errors.parent_email = validate_email(&form.parent_email).error;

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn email_rules() {
        assert!(validate_email("parent@example.com").is_valid);
        assert_eq!(validate_email("  ").error.as_deref(), Some("Email is required"));
        assert_eq!(
            validate_email("parent@example").error.as_deref(),
            Some("Please enter a valid email address")
        );
        assert_eq!(
            validate_email("parent@gmial.com").error.as_deref(),
            Some("Did you mean gmail.com?")
        );
        assert_eq!(
            validate_email("parent@yahooo.com").error.as_deref(),
            Some("Did you mean yahoo.com?")
        );
    }

    #[test]
    fn attachment_check_is_stricter() {
        assert!(validate_email("a@b.c").is_valid);
        assert!(!is_attachment_address("a@b.c"));
        assert!(!is_attachment_address("a@b.c0m"));
        assert!(is_attachment_address("Parent@School.ORG"));
    }

    #[test]
    fn form_collects_every_error() {
        let errors = validate_form(&FormData::new("", "two", "nope")).unwrap_err();
        assert_eq!(errors.child_name.as_deref(), Some("Child's name is required"));
        assert_eq!(
            errors.child_age.as_deref(),
            Some("Age must be a whole number between 3 and 18")
        );
        assert!(errors.parent_email.is_some());
        assert_eq!(errors.to_string().matches("; ").count(), 2);
    }

    #[test]
    fn age_bounds() {
        for (age, ok) in [("2", false), ("3", true), (" 18 ", true), ("19", false), ("7.5", false)] {
            let form = FormData::new("Ada", age, "ada@example.com");
            assert_eq!(validate_form(&form).is_ok(), ok, "{age}");
        }
    }

    proptest! {
        #[test]
        fn whole_ages_pass_only_inside_bounds(age in 0u32..200) {
            let form = FormData::new("Ada", age.to_string(), "ada@example.com");
            let in_range = (u32::from(MIN_AGE)..=u32::from(MAX_AGE)).contains(&age);
            prop_assert_eq!(validate_form(&form).is_ok(), in_range);
        }

        #[test]
        fn accepted_age_always_parses_in_bounds(age in "\\PC{0,6}") {
            let form = FormData::new("Ada", age, "ada@example.com");
            if validate_form(&form).is_ok() {
                let parsed = form.age();
                prop_assert!(parsed.is_some_and(|a| (MIN_AGE..=MAX_AGE).contains(&a)));
            }
        }
    }
}
