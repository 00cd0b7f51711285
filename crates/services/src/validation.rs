//! Field checks shared by the write paths.

use domains::{DomainError, Result};

pub(crate) fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub(crate) fn max_chars(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

pub(crate) fn min_chars(field: &str, value: &str, min: usize) -> Result<()> {
    if value.chars().count() < min {
        return Err(DomainError::validation(format!(
            "{field} must be at least {min} characters"
        )));
    }
    Ok(())
}

pub(crate) fn distinct(field: &str, value: &str, other_field: &str, other: &str) -> Result<()> {
    if value == other {
        return Err(DomainError::validation(format!(
            "{other_field} must not be identical to the {field}"
        )));
    }
    Ok(())
}

/// Rejects values that would break out of a single mail header line.
pub(crate) fn single_line(field: &str, value: &str) -> Result<()> {
    if value.contains(['\r', '\n']) {
        return Err(DomainError::validation(format!(
            "{field} must not contain line breaks"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_count_characters_not_bytes() {
        assert!(max_chars("name", "ёёё", 3).is_ok());
        assert!(min_chars("description", "ёёё", 4).is_err());
    }

    #[test]
    fn line_breaks_are_rejected() {
        assert!(single_line("name", "Tech\r\nBcc: x@evil.test").is_err());
        assert!(single_line("name", "Tech\nNews").is_err());
        assert!(single_line("name", "Tech & Science").is_ok());
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert!(required("name", "   ").is_err());
    }
}
