use crate::error::{ShelfwatchError, ShelfwatchResult};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

pub fn validate_model<T: Validate>(model: &T) -> ShelfwatchResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(ShelfwatchError::validation("options", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, kind) in errors.errors() {
        let field_errors = match kind {
            ValidationErrorsKind::Field(field_errors) => field_errors,
            _ => continue,
        };
        for error in field_errors {
            if let Some(message) = &error.message {
                messages.push(message.to_string());
                continue;
            }
            let message = match &error.code {
                std::borrow::Cow::Borrowed("email") => {
                    format!("Invalid email format for field '{}'", field)
                }
                std::borrow::Cow::Borrowed("range") => {
                    format!("Value out of range for field '{}'", field)
                }
                std::borrow::Cow::Borrowed("required") => {
                    format!("Field '{}' is required", field)
                }
                _ => format!("Validation failed for field '{}': {}", field, error.code),
            };
            messages.push(message);
        }
    }

    messages.join(", ")
}

/// Parse a single optional form field, mapping failures to a validation error.
pub fn parse_field<T>(field: &str, raw: Option<&str>) -> ShelfwatchResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| ShelfwatchError::validation(field, format!("'{}': {}", value, e))),
    }
}
