//! Field validation shared by services and request handlers.

use crate::error::DomainError;

pub const MAX_LENGTH_TITLE: usize = 256;
pub const MAX_LENGTH_USERNAME: usize = 150;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Non-blank text.
pub fn required(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Non-blank text of at most [`MAX_LENGTH_TITLE`] characters.
pub fn title(field: &str, value: &str) -> Result<(), DomainError> {
    required(field, value)?;
    if value.chars().count() > MAX_LENGTH_TITLE {
        return Err(DomainError::Validation(format!(
            "{field} must be at most {MAX_LENGTH_TITLE} characters"
        )));
    }
    Ok(())
}

/// Latin letters, digits, hyphens and underscores, at most
/// [`MAX_LENGTH_TITLE`] characters.
pub fn slug(value: &str) -> Result<(), DomainError> {
    if value.chars().count() > MAX_LENGTH_TITLE {
        return Err(DomainError::Validation(format!(
            "slug must be at most {MAX_LENGTH_TITLE} characters"
        )));
    }
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(DomainError::Validation(
            "slug may contain only latin letters, digits, hyphens and underscores".to_string(),
        ));
    }
    Ok(())
}

/// Letters, digits and `@ . + - _`, at most [`MAX_LENGTH_USERNAME`] characters.
pub fn username(value: &str) -> Result<(), DomainError> {
    required("username", value)?;
    if value.chars().count() > MAX_LENGTH_USERNAME {
        return Err(DomainError::Validation(format!(
            "username must be at most {MAX_LENGTH_USERNAME} characters"
        )));
    }
    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(DomainError::Validation(
            "username may contain only letters, digits and @/./+/-/_".to_string(),
        ));
    }
    Ok(())
}

/// Empty, or a `local@domain` address.
pub fn email(value: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Ok(());
    }
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DomainError::Validation("Invalid email address".to_string())),
    }
}

pub fn password(value: &str) -> Result<(), DomainError> {
    if value.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_limits() {
        assert!(title("title", "Hello").is_ok());
        assert!(title("title", "   ").is_err());
        assert!(title("title", &"x".repeat(MAX_LENGTH_TITLE)).is_ok());
        assert!(title("title", &"x".repeat(MAX_LENGTH_TITLE + 1)).is_err());
    }

    #[test]
    fn test_slug() {
        assert!(slug("travel_2024-spring").is_ok());
        assert!(slug("").is_err());
        assert!(slug("with space").is_err());
        assert!(slug("путешествия").is_err());
    }

    #[test]
    fn test_slug_length_limit() {
        assert!(slug(&"a".repeat(MAX_LENGTH_TITLE)).is_ok());
        assert!(matches!(
            slug(&"a".repeat(MAX_LENGTH_TITLE + 1)),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_username() {
        assert!(username("alice.b+blog@home").is_ok());
        assert!(username("bad name").is_err());
        assert!(username(&"a".repeat(MAX_LENGTH_USERNAME + 1)).is_err());
    }

    #[test]
    fn test_email() {
        assert!(email("").is_ok());
        assert!(email("a@b.c").is_ok());
        assert!(email("nope").is_err());
        assert!(email("@b.c").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(password("short").is_err());
        assert!(password("long-enough").is_ok());
    }
}
