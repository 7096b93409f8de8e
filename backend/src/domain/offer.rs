//! Offer records as read from delimited files and as persisted.
//!
//! [`OfferCsv`] is the positional, unvalidated shape of one input line.
//! [`Offer`] is the validated form handed to sinks. Conversion trims every
//! field and rejects malformed identifiers and prices.

use std::fmt;

use serde::{Serialize, Serializer};

/// Column names of an offer line, in file order.
pub const OFFER_FIELD_NAMES: [&str; 7] = [
    "name",
    "description",
    "state",
    "meal_id",
    "sidedish_id",
    "drink_id",
    "price",
];

/// Validation failure for a single offer field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field {field} is invalid ({value:?}): {reason}")]
pub struct OfferValidationError {
    /// Column name from [`OFFER_FIELD_NAMES`].
    pub field: &'static str,
    /// Raw value as read.
    pub value: String,
    /// Why the value was rejected.
    pub reason: &'static str,
}

impl OfferValidationError {
    fn new(field: &'static str, value: &str, reason: &'static str) -> Self {
        Self {
            field,
            value: value.to_owned(),
            reason,
        }
    }
}

/// Raw offer line mapped positionally onto named string fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OfferCsv {
    /// Offer name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Offer state token.
    pub state: String,
    /// Meal product id, empty when the offer has no meal.
    pub meal_id: String,
    /// Side dish product id, empty when the offer has no side dish.
    pub sidedish_id: String,
    /// Drink product id, empty when the offer has no drink.
    pub drink_id: String,
    /// Price as a decimal string.
    pub price: String,
}

impl OfferCsv {
    /// Map exactly [`OFFER_FIELD_NAMES`]`.len()` tokens onto the fields.
    ///
    /// Returns `None` when the token count differs.
    pub fn from_tokens(tokens: Vec<String>) -> Option<Self> {
        let [name, description, state, meal_id, sidedish_id, drink_id, price]: [String; 7] =
            tokens.try_into().ok()?;
        Some(Self {
            name,
            description,
            state,
            meal_id,
            sidedish_id,
            drink_id,
            price,
        })
    }
}

/// Positive product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    /// Wrap a raw id, rejecting zero.
    pub fn new(raw: u64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    /// Raw numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Non-negative amount in minor currency units (cents).
///
/// # Examples
/// ```
/// use restaurant_backend::domain::Money;
///
/// let price: Money = "9.5".parse().unwrap();
/// assert_eq!(price.minor_units(), 950);
/// assert_eq!(price.to_string(), "9.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    /// Build from minor units.
    pub fn from_minor_units(minor_units: u64) -> Self {
        Self(minor_units)
    }

    /// Amount in minor units.
    pub fn minor_units(self) -> u64 {
        self.0
    }
}

impl std::str::FromStr for Money {
    type Err = &'static str;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err("price must be a non-negative decimal number");
        }
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err("price must have at most two fraction digits");
        }
        let whole: u64 = whole.parse().map_err(|_| "price is out of range")?;
        let cents = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| "price is out of range")? * 10,
            _ => fraction.parse::<u64>().map_err(|_| "price is out of range")?,
        };
        whole
            .checked_mul(100)
            .and_then(|minor| minor.checked_add(cents))
            .map(Self)
            .ok_or("price is out of range")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Validated offer ready for persistence.
///
/// ## Invariants
/// - `name` and `state` are trimmed and non-empty.
/// - Product ids are positive when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// Offer name.
    pub name: String,
    /// Free-text description, possibly empty.
    pub description: String,
    /// Offer state token.
    pub state: String,
    /// Meal product, if any.
    pub meal_id: Option<ProductId>,
    /// Side dish product, if any.
    pub side_dish_id: Option<ProductId>,
    /// Drink product, if any.
    pub drink_id: Option<ProductId>,
    /// Offer price.
    pub price: Money,
}

impl TryFrom<&OfferCsv> for Offer {
    type Error = OfferValidationError;

    fn try_from(raw: &OfferCsv) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required("name", &raw.name)?,
            description: raw.description.trim().to_owned(),
            state: required("state", &raw.state)?,
            meal_id: optional_product("meal_id", &raw.meal_id)?,
            side_dish_id: optional_product("sidedish_id", &raw.sidedish_id)?,
            drink_id: optional_product("drink_id", &raw.drink_id)?,
            price: raw
                .price
                .trim()
                .parse()
                .map_err(|reason| OfferValidationError::new("price", &raw.price, reason))?,
        })
    }
}

fn required(field: &'static str, raw: &str) -> Result<String, OfferValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(OfferValidationError::new(field, raw, "value must not be blank"));
    }
    Ok(value.to_owned())
}

fn optional_product(
    field: &'static str,
    raw: &str,
) -> Result<Option<ProductId>, OfferValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let id = value
        .parse::<u64>()
        .map_err(|_| OfferValidationError::new(field, raw, "product id must be an integer"))?;
    ProductId::new(id)
        .map(Some)
        .ok_or_else(|| OfferValidationError::new(field, raw, "product id must be positive"))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for offer conversion.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn raw() -> OfferCsv {
        OfferCsv {
            name: " Schnitzel-Menü ".to_owned(),
            description: "Description of Schnitzel-Menü".to_owned(),
            state: "NORMAL".to_owned(),
            meal_id: "1".to_owned(),
            sidedish_id: "".to_owned(),
            drink_id: "3".to_owned(),
            price: "6.99".to_owned(),
        }
    }

    #[rstest]
    fn converts_and_trims(raw: OfferCsv) {
        let offer = Offer::try_from(&raw).expect("valid offer");
        assert_eq!(offer.name, "Schnitzel-Menü");
        assert_eq!(offer.meal_id, ProductId::new(1));
        assert_eq!(offer.side_dish_id, None);
        assert_eq!(offer.price, Money::from_minor_units(699));
    }

    #[rstest]
    #[case("meal_id", "x")]
    #[case("meal_id", "0")]
    #[case("drink_id", "-4")]
    #[case("price", "abc")]
    #[case("price", "1.234")]
    #[case("price", "-1")]
    #[case("name", "   ")]
    fn rejects_invalid_fields(mut raw: OfferCsv, #[case] field: &str, #[case] value: &str) {
        match field {
            "meal_id" => raw.meal_id = value.to_owned(),
            "drink_id" => raw.drink_id = value.to_owned(),
            "price" => raw.price = value.to_owned(),
            _ => raw.name = value.to_owned(),
        }
        let err = Offer::try_from(&raw).expect_err("invalid field must fail");
        assert_eq!(err.field, field);
        assert_eq!(err.value, value);
    }

    #[rstest]
    #[case("9.5", 950)]
    #[case("7.0", 700)]
    #[case("12", 1_200)]
    #[case("0.05", 5)]
    fn parses_prices(#[case] raw: &str, #[case] minor: u64) {
        let money: Money = raw.parse().expect("valid price");
        assert_eq!(money.minor_units(), minor);
    }

    #[rstest]
    fn tokens_must_match_field_count() {
        let short = vec!["a".to_owned(); 6];
        assert!(OfferCsv::from_tokens(short).is_none());
        let exact = vec!["a".to_owned(); OFFER_FIELD_NAMES.len()];
        assert!(OfferCsv::from_tokens(exact).is_some());
    }

    #[rstest]
    fn serialises_price_as_decimal_string(raw: OfferCsv) {
        let offer = Offer::try_from(&raw).expect("valid offer");
        let value = serde_json::to_value(&offer).expect("serialise offer");
        assert_eq!(value["price"], "6.99");
        assert_eq!(value["sideDishId"], serde_json::Value::Null);
        assert_eq!(value["mealId"], 1);
    }
}
