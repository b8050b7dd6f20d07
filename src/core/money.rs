//! Shared currency-amount utilities.
//!
//! Form fields reach the engine as floats or free text. Every conversion to
//! [`Decimal`] goes through this module so that malformed input is handled
//! the same way everywhere: it becomes `None` (or zero where a value is
//! mandatory) instead of an error.

use std::fmt;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

/// Decimal places used when amounts are shown to a user.
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// Convert a float form value. NaN and infinities yield `None`.
pub fn amount_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
}

/// Parse a typed amount such as `" 12.50 "` or `"1e3"`.
///
/// Empty and non-numeric text yields `None`.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(text).ok())
}

/// Round to [`DISPLAY_DECIMAL_PLACES`] using commercial (half away from zero) rounding.
///
/// Only for presentation; stored totals keep full precision.
pub fn round_for_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DISPLAY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount for display, e.g. `"351.00 GEL"`.
pub fn format_amount(value: Decimal, currency: &str) -> String {
    format!(
        "{:.prec$} {currency}",
        round_for_display(value),
        prec = DISPLAY_DECIMAL_PLACES as usize
    )
}

/// Serde adapter for optional amounts coming from a form or a loosely typed
/// backend: numbers, numeric strings and `null` are accepted, anything
/// malformed deserializes to `None`.
///
/// ```
/// use billdesk::money;
/// use rust_decimal::Decimal;
///
/// #[derive(serde::Deserialize)]
/// struct Row {
///     #[serde(with = "money::lenient", default)]
///     qty: Option<Decimal>,
/// }
///
/// let row: Row = serde_json::from_str(r#"{"qty": "abc"}"#).unwrap();
/// assert_eq!(row.qty, None);
/// ```
pub mod lenient {
    use super::*;
    use serde::{Serialize, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LenientAmount)
    }

    pub fn serialize<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.serialize(serializer)
    }
}

/// Like [`lenient`] but for mandatory amounts: malformed input becomes zero.
pub mod lenient_or_zero {
    use super::*;
    use serde::{Serialize, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(deserializer
            .deserialize_any(LenientAmount)?
            .unwrap_or(Decimal::ZERO))
    }

    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // `Decimal` has an inherent `serialize` returning raw bytes
        Serialize::serialize(value, serializer)
    }
}

struct LenientAmount;

impl<'de> Visitor<'de> for LenientAmount {
    type Value = Option<Decimal>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, a numeric string or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(amount_from_f64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(parse_amount(v))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn non_finite_floats_are_rejected() {
        assert_eq!(amount_from_f64(f64::NAN), None);
        assert_eq!(amount_from_f64(f64::INFINITY), None);
        assert_eq!(amount_from_f64(f64::NEG_INFINITY), None);
        assert_eq!(amount_from_f64(2.5), Some(dec!(2.5)));
    }

    #[test]
    fn parse_trims_and_accepts_scientific() {
        assert_eq!(parse_amount(" 12.50 "), Some(dec!(12.50)));
        assert_eq!(parse_amount("1e3"), Some(dec!(1000)));
        assert_eq!(parse_amount("-3"), Some(dec!(-3)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("twelve"), None);
        assert_eq!(parse_amount("12,50,1"), None);
    }

    #[test]
    fn display_rounding_is_half_away_from_zero() {
        assert_eq!(round_for_display(dec!(1.005)), dec!(1.01));
        assert_eq!(round_for_display(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_for_display(dec!(1.004)), dec!(1.00));
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Discount {
        #[serde(with = "lenient_or_zero", default)]
        value: Decimal,
    }

    #[test]
    fn lenient_or_zero_serializes_through_serde() {
        let json = serde_json::to_string(&Discount { value: dec!(12.5) }).unwrap();
        assert_eq!(json, r#"{"value":"12.5"}"#);
        let back: Discount = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value, dec!(12.5));

        let garbage: Discount = serde_json::from_str(r#"{"value": "n/a"}"#).unwrap();
        assert_eq!(garbage.value, Decimal::ZERO);
    }

    #[test]
    fn format_pads_to_two_places() {
        assert_eq!(format_amount(dec!(351), "GEL"), "351.00 GEL");
        assert_eq!(format_amount(dec!(-70), "USD"), "-70.00 USD");
        assert_eq!(format_amount(dec!(0.125), "EUR"), "0.13 EUR");
    }
}
