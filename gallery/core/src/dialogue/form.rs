//! Form content of a dialogue: field values plus live validity.

use crate::error::ValidationError;
use crate::validation::{FormSchema, FormValidator};

/// Field values of a form, in declaration order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormBinding {
    values: Vec<(String, String)>,
}

impl FormBinding {
    /// Create an empty binding
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a binding from name/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut binding = Self::new();
        for (name, value) in pairs {
            binding.set(name, value);
        }
        binding
    }

    /// One empty value per schema field
    #[must_use]
    pub fn for_schema(schema: &FormSchema) -> Self {
        Self::from_pairs(schema.field_names().map(|name| (name, "")))
    }

    /// Set a value, appending the field if it is new
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name, value)),
        }
    }

    /// Look up a value
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a value that must be present and non-blank
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::missing`] when the field is absent or blank.
    pub fn require(&self, name: &str) -> Result<&str, ValidationError> {
        match self.get(name) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ValidationError::missing(name)),
        }
    }

    /// Name/value pairs in order
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.values
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the binding has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Values and validity of an open form
#[derive(Clone, Debug)]
pub struct FormState {
    binding: FormBinding,
    validator: FormValidator,
}

impl FormState {
    /// Blank form; the submit control starts disabled
    #[must_use]
    pub fn blank(schema: FormSchema) -> Self {
        Self {
            binding: FormBinding::for_schema(&schema),
            validator: FormValidator::new(schema),
        }
    }

    /// Form pre-filled from existing data and checked immediately
    pub fn prefilled<I, K, V>(schema: FormSchema, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut state = Self::blank(schema);
        for (name, value) in values {
            state.binding.set(name, value);
        }
        state.validator.check_all(&state.binding);
        state
    }

    /// Record an edit, returning the field's message (`None` when valid)
    pub fn input(&mut self, field: &str, value: &str) -> Option<String> {
        self.binding.set(field, value);
        self.validator.check_field(field, value)
    }

    /// Current values
    #[must_use]
    pub fn binding(&self) -> &FormBinding {
        &self.binding
    }

    /// Whether the submit control is enabled
    #[must_use]
    pub fn submit_enabled(&self) -> bool {
        self.validator.submit_enabled()
    }

    /// First failing field, if any
    #[must_use]
    pub fn first_error(&self) -> Option<ValidationError> {
        self.validator.first_error()
    }

    /// Clear every value and disable the submit control
    pub fn reset(&mut self) {
        self.binding = FormBinding::for_schema(self.validator.schema());
        self.validator.reset();
    }
}
