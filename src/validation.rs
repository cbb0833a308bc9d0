use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use validator::{ValidationError, validate_url};

/// Lowercase letters, digits and hyphens.
pub static SLUG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("slug pattern compiles"));

/// Money columns are `NUMERIC(12, 2)`.
const MONEY_SCALE: u32 = 2;
/// Largest value `NUMERIC(12, 2)` holds: ten integer digits.
const MONEY_MAX: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

fn money_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Positive amount the store keeps exactly: at most two decimal places and
/// at most ten integer digits. Trailing zeros are ignored, so `10.50` and
/// `10.500` are both accepted.
pub fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(money_error("range", "Value must be positive"));
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err(money_error(
            "precision",
            "Value must have at most 2 decimal places",
        ));
    }
    if *value > MONEY_MAX {
        return Err(money_error("range", "Value is too large"));
    }
    Ok(())
}

pub fn validate_image_urls(urls: &[String]) -> Result<(), ValidationError> {
    if urls.iter().all(|u| validate_url(u.as_str())) {
        Ok(())
    } else {
        let mut err = ValidationError::new("url");
        err.message = Some("Image URL must be valid".into());
        Err(err)
    }
}
