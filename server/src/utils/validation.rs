//! Field rules shared by the request payloads (`#[garde(custom(...))]`).

use rust_decimal::Decimal;

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn not_blank(value: &str, _context: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("must not be blank"));
    }
    Ok(())
}

pub fn non_negative(value: &Decimal, _context: &()) -> garde::Result {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(garde::Error::new("must not be negative"));
    }
    Ok(())
}

/// At least six characters, with at least one letter and one digit.
pub fn password_rules(value: &str, _context: &()) -> garde::Result {
    if value.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(garde::Error::new(format!(
            "must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if !value.chars().any(char::is_alphabetic) {
        return Err(garde::Error::new("must contain a letter"));
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(garde::Error::new("must contain a digit"));
    }
    Ok(())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_composition() {
        assert!(password_rules("abc12", &()).is_err());
        assert!(password_rules("123456", &()).is_err());
        assert!(password_rules("abcdef", &()).is_err());
        assert!(password_rules("abc123", &()).is_ok());
        assert!(password_rules("Pässwort9", &()).is_ok());
    }

    #[test]
    fn blank_and_negative_values() {
        assert!(not_blank("   ", &()).is_err());
        assert!(not_blank("Rock Show", &()).is_ok());
        assert!(non_negative(&Decimal::new(-1, 2), &()).is_err());
        assert!(non_negative(&Decimal::ZERO, &()).is_ok());
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Alice@GatePass.com "), "alice@gatepass.com");
    }
}
