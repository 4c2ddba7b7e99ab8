//! Field validators shared by the entity models.
//!
//! These plug into `#[validate(custom = "...")]` on the model structs.

use chrono::NaiveDate;
use validator::ValidationError;

/// Date stored on blanked rows. Never accepted from a client.
pub fn zero_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Two uppercase ASCII letters, e.g. `US` or `TX`.
pub fn validate_region_code(code: &str) -> Result<(), ValidationError> {
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("region_code");
        err.message = Some("Must be exactly two uppercase letters".into());
        Err(err)
    }
}

/// Rejects text that is empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("Must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Names are letters, digits, spaces and a little punctuation.
pub fn validate_name(value: &str) -> Result<(), ValidationError> {
    validate_not_blank(value)?;
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, ' ' | '\'' | '-' | '.' | '&' | ',');
    if value.chars().all(allowed) {
        Ok(())
    } else {
        let mut err = ValidationError::new("name");
        err.message = Some("Contains unsupported characters".into());
        Err(err)
    }
}

/// Dates are required: the zero date means "not supplied".
pub fn validate_required_date(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date > zero_date() {
        Ok(())
    } else {
        let mut err = ValidationError::new("required_date");
        err.message = Some("A date is required".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("US", true)]
    #[case("tx", false)]
    #[case("USA", false)]
    #[case("U1", false)]
    #[case("", false)]
    fn region_codes(#[case] code: &str, #[case] ok: bool) {
        assert_eq!(validate_region_code(code).is_ok(), ok);
    }

    #[rstest]
    #[case("Pad Thai", true)]
    #[case("Mac & Cheese", true)]
    #[case("O'Brien-Smith", true)]
    #[case("   ", false)]
    #[case("<script>", false)]
    fn names(#[case] name: &str, #[case] ok: bool) {
        assert_eq!(validate_name(name).is_ok(), ok);
    }

    #[test]
    fn zero_date_is_not_a_valid_date() {
        assert!(validate_required_date(&zero_date()).is_err());
        let date = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        assert!(validate_required_date(&date).is_ok());
    }

    #[test]
    fn zero_date_is_year_one() {
        assert_eq!(zero_date(), NaiveDate::from_ymd_opt(1, 1, 1).unwrap());
    }
}
