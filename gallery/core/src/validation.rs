//! Form Validation
//!
//! Field-level constraints for the built-in forms. A field is valid when all
//! of its constraints pass; the submit control is enabled when every field is
//! valid. Resetting a form forces the control off until the next edit.

use crate::dialogue::FormBinding;
use crate::error::ValidationError;
use crate::model::fields;

/// A single declarative field constraint
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldConstraint {
    /// Non-blank value
    Required,
    /// At least this many characters
    MinLength(usize),
    /// At most this many characters
    MaxLength(usize),
    /// An absolute http(s) URL
    Url,
}

impl FieldConstraint {
    /// Check a value, returning the user-facing message on failure
    ///
    /// Length constraints are skipped for empty values; `Required` covers
    /// those.
    #[must_use]
    pub fn check(&self, value: &str) -> Option<String> {
        let len = value.chars().count();
        match self {
            Self::Required if value.trim().is_empty() => {
                Some("Please fill out this field.".to_string())
            }
            Self::MinLength(min) if len > 0 && len < *min => Some(format!(
                "Please lengthen this text to {min} characters or more (you are currently using {len} character{}).",
                if len == 1 { "" } else { "s" }
            )),
            Self::MaxLength(max) if len > *max => Some(format!(
                "Please shorten this text to {max} characters or less (you are currently using {len} characters)."
            )),
            Self::Url if len > 0 && !is_http_url(value) => Some("Please enter a URL.".to_string()),
            _ => None,
        }
    }
}

fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or("");
            !host.is_empty() && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Constraints for one named field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRule {
    /// Field name
    pub name: String,
    /// Constraints, checked in order
    pub constraints: Vec<FieldConstraint>,
}

/// Ordered set of field rules for one form
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormSchema {
    rules: Vec<FieldRule>,
}

impl FormSchema {
    /// Create an empty schema
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field
    #[must_use]
    pub fn field<I>(mut self, name: impl Into<String>, constraints: I) -> Self
    where
        I: IntoIterator<Item = FieldConstraint>,
    {
        self.rules.push(FieldRule {
            name: name.into(),
            constraints: constraints.into_iter().collect(),
        });
        self
    }

    /// Add-card form: caption and image link
    #[must_use]
    pub fn add_card() -> Self {
        use FieldConstraint::{MaxLength, MinLength, Required, Url};
        Self::new()
            .field(fields::TITLE, [Required, MinLength(2), MaxLength(30)])
            .field(fields::LINK, [Required, Url])
    }

    /// Edit-profile form: name and bio
    #[must_use]
    pub fn edit_profile() -> Self {
        use FieldConstraint::{MaxLength, MinLength, Required};
        Self::new()
            .field(fields::NAME, [Required, MinLength(2), MaxLength(40)])
            .field(fields::ABOUT, [Required, MinLength(2), MaxLength(200)])
    }

    /// Change-avatar form: picture link
    #[must_use]
    pub fn change_avatar() -> Self {
        use FieldConstraint::{Required, Url};
        Self::new().field(fields::AVATAR, [Required, Url])
    }

    /// Field rules in declaration order
    #[must_use]
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.name == field)
    }
}

/// Live validity tracking for one form
#[derive(Clone, Debug)]
pub struct FormValidator {
    schema: FormSchema,
    /// Current message per field, `None` when valid
    errors: Vec<Option<String>>,
    /// Set by `reset`, cleared by the next edit
    pristine: bool,
}

impl FormValidator {
    /// Create a validator for an empty form
    #[must_use]
    pub fn new(schema: FormSchema) -> Self {
        let errors = schema
            .rules()
            .iter()
            .map(|rule| first_failure(rule, ""))
            .collect();
        Self {
            schema,
            errors,
            pristine: true,
        }
    }

    /// The schema this validator checks
    #[must_use]
    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Re-check one field after an edit
    ///
    /// Returns the field's message (`None` when valid). Unknown fields are
    /// accepted and do not affect the submit control.
    pub fn check_field(&mut self, field: &str, value: &str) -> Option<String> {
        self.pristine = false;
        let idx = self.schema.position(field)?;
        let error = first_failure(&self.schema.rules()[idx], value);
        self.errors[idx].clone_from(&error);
        error
    }

    /// Re-check every field against a binding (used after pre-filling)
    pub fn check_all(&mut self, form: &FormBinding) {
        self.pristine = false;
        for (idx, rule) in self.schema.rules().iter().enumerate() {
            let value = form.get(&rule.name).unwrap_or("");
            self.errors[idx] = first_failure(rule, value);
        }
    }

    /// Whether the submit control is enabled
    #[must_use]
    pub fn submit_enabled(&self) -> bool {
        !self.pristine && self.errors.iter().all(Option::is_none)
    }

    /// First failing field, for reporting a rejected submit
    #[must_use]
    pub fn first_error(&self) -> Option<ValidationError> {
        self.schema
            .rules()
            .iter()
            .zip(&self.errors)
            .find_map(|(rule, error)| {
                error
                    .as_ref()
                    .map(|msg| ValidationError::new(rule.name.clone(), msg.clone()))
            })
    }

    /// Forget all edits; the submit control is disabled until the next one
    pub fn reset(&mut self) {
        for (idx, rule) in self.schema.rules().iter().enumerate() {
            self.errors[idx] = first_failure(rule, "");
        }
        self.pristine = true;
    }
}

fn first_failure(rule: &FieldRule, value: &str) -> Option<String> {
    rule.constraints.iter().find_map(|c| c.check(value))
}
