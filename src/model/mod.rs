mod aircraft;
mod person;

pub use aircraft::{Aircraft, AircraftId};
pub use person::{parse_salary, InvalidSalaryErr, Person, PersonKind};

// Fields of a serialized record are joined with this separator
pub const FIELD_SEPARATOR: char = ';';

/// Renders a float the way existing clients expect it:
/// always with a fractional part ("5000.0"), and in scientific notation
/// ("1.0E7", "1.5E-4") outside of the [1e-3, 1e7) range.
pub fn format_decimal(value: f64) -> String {
    if value.is_nan() {
        return "NaN".into();
    }

    if value.is_infinite() {
        return if value > 0f64 { "Infinity" } else { "-Infinity" }.into();
    }

    let magnitude = value.abs();
    if value == 0f64 || (1e-3..1e7).contains(&magnitude) {
        let mut text = value.to_string();
        if !text.contains('.') {
            text.push_str(".0");
        }

        return text;
    }

    // rust renders "1.5e-4", we need "1.5E-4"
    let text = format!("{:e}", value);
    let (mantissa, exponent) = text.split_once('e').unwrap_or((&text, "0"));
    if mantissa.contains('.') {
        format!("{}E{}", mantissa, exponent)
    } else {
        format!("{}.0E{}", mantissa, exponent)
    }
}
