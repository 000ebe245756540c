//! Structured values stored in JSON columns.

use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidationError;

use crate::errors::ServiceError;

/// Postal address attached to locations, customers and orders
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub locality: Option<String>,
    pub administrative_district_level_1: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

/// Opening period of a location, local wall-clock times as `HH:MM`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BusinessHoursPeriod {
    pub day_of_week: DayOfWeek,
    pub start_local_time: String,
    pub end_local_time: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ItemOptionValue {
    pub item_option_id: Option<String>,
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    pub uid: Option<String>,
    pub name: String,
    pub quantity: u32,
    pub catalog_object_id: Option<Uuid>,
    pub variation_name: Option<String>,
    pub base_price_money: Decimal,
    pub note: Option<String>,
}

impl LineItem {
    pub fn gross_sales(&self) -> Result<Decimal, ServiceError> {
        self.base_price_money
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "line item '{}' total is out of range",
                    self.name
                ))
            })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppliedTax {
    pub name: String,
    pub percentage: Decimal,
    pub applied_money: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppliedDiscount {
    pub discount_id: Option<Uuid>,
    pub name: String,
    pub applied_money: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ServiceCharge {
    pub name: String,
    pub amount_money: Decimal,
    #[serde(default)]
    pub taxable: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentType {
    Pickup,
    Shipment,
    Delivery,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentState {
    #[default]
    Proposed,
    Reserved,
    Prepared,
    Completed,
    Canceled,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Fulfillment {
    pub fulfillment_type: FulfillmentType,
    #[serde(default)]
    pub state: FulfillmentState,
    pub recipient_name: Option<String>,
    pub address: Option<Address>,
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Refund {
    pub reason: String,
    pub amount_money: Decimal,
    pub transaction_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenderType {
    Card,
    Cash,
    GiftCard,
    Wallet,
    Other,
}

/// Means of payment recorded on a transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Tender {
    pub tender_type: TenderType,
    pub card_brand: Option<String>,
    pub last_4: Option<String>,
    pub note: Option<String>,
}

/// Encode a typed value for a JSON column.
pub fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, ServiceError> {
    serde_json::to_value(value).map_err(ServiceError::from)
}

/// Decode a JSON column, treating `null` as the type's empty value.
pub fn from_json<T>(value: &serde_json::Value) -> Result<T, ServiceError>
where
    T: DeserializeOwned + Default,
{
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value.clone()).map_err(ServiceError::from)
}

/// Decode an optional JSON column.
pub fn from_optional_json<T: DeserializeOwned>(
    value: &Option<serde_json::Value>,
) -> Result<Option<T>, ServiceError> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(ServiceError::from),
    }
}

/// Largest amount a `NUMERIC(12, 2)` money column holds.
pub const MAX_MONEY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Currency amounts are non-negative, fit a money column and carry at most
/// two fractional digits.
pub fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("money_negative");
        err.message = Some("Amount cannot be negative".into());
        return Err(err);
    }
    if *value > MAX_MONEY {
        let mut err = ValidationError::new("money_range");
        err.message = Some(format!("Amount cannot exceed {MAX_MONEY}").into());
        return Err(err);
    }
    if value.normalize().scale() > 2 {
        let mut err = ValidationError::new("money_precision");
        err.message = Some("Amount cannot have more than 2 decimal places".into());
        return Err(err);
    }
    Ok(())
}

/// Percentages lie in `0..=100` with at most two fractional digits.
pub fn validate_percentage(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("percentage_range");
        err.message = Some("Percentage must be between 0 and 100".into());
        return Err(err);
    }
    if value.normalize().scale() > 2 {
        let mut err = ValidationError::new("percentage_precision");
        err.message = Some("Percentage cannot have more than 2 decimal places".into());
        return Err(err);
    }
    Ok(())
}

/// Sum amounts, failing instead of overflowing.
pub fn checked_total<I>(what: &str, amounts: I) -> Result<Decimal, ServiceError>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or_else(|| ServiceError::ValidationError(format!("{what} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(dec!(0) ; "zero")]
    #[test_case(dec!(100.00) ; "two places")]
    #[test_case(dec!(9.5) ; "one place")]
    #[test_case(dec!(12.500) ; "trailing zeros")]
    fn accepts_currency_amounts(value: Decimal) {
        assert!(validate_money(&value).is_ok());
    }

    #[test_case(dec!(-0.01) ; "negative")]
    #[test_case(dec!(1.005) ; "three places")]
    #[test_case(dec!(10000000000.00) ; "wider than the column")]
    #[test_case(Decimal::MAX ; "decimal max")]
    fn rejects_bad_currency_amounts(value: Decimal) {
        assert!(validate_money(&value).is_err());
    }

    #[test]
    fn money_ceiling_matches_column() {
        assert_eq!(MAX_MONEY, dec!(9999999999.99));
        assert!(validate_money(&MAX_MONEY).is_ok());
    }

    #[test_case(dec!(0) ; "zero")]
    #[test_case(dec!(12.5) ; "one place")]
    #[test_case(dec!(100) ; "hundred")]
    fn accepts_percentages(value: Decimal) {
        assert!(validate_percentage(&value).is_ok());
    }

    #[test_case(dec!(-1) ; "negative")]
    #[test_case(dec!(100.01) ; "above hundred")]
    #[test_case(dec!(12.345) ; "three places")]
    fn rejects_bad_percentages(value: Decimal) {
        assert!(validate_percentage(&value).is_err());
    }

    #[test]
    fn overflowing_totals_are_errors() {
        let err = checked_total("subtotal", [Decimal::MAX, dec!(1)]).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
        assert_eq!(checked_total("subtotal", [dec!(1.25), dec!(2)]).unwrap(), dec!(3.25));
    }

    #[test]
    fn null_columns_decode_to_empty_values() {
        let items: Vec<LineItem> = from_json(&serde_json::Value::Null).unwrap();
        assert!(items.is_empty());
        let address: Option<Address> = from_optional_json(&None).unwrap();
        assert!(address.is_none());
    }

    #[test]
    fn tender_uses_uppercase_wire_names() {
        let tender = Tender {
            tender_type: TenderType::GiftCard,
            card_brand: None,
            last_4: None,
            note: None,
        };
        assert_eq!(to_json(&tender).unwrap()["tender_type"], "GIFT_CARD");
    }

    #[test]
    fn fulfillment_state_defaults_to_proposed() {
        let fulfillment: Fulfillment =
            serde_json::from_value(json!({"fulfillment_type": "PICKUP"})).unwrap();
        assert_eq!(fulfillment.state, FulfillmentState::Proposed);
    }

    #[test]
    fn line_item_gross_sales() {
        let item = LineItem {
            uid: None,
            name: "Coffee".into(),
            quantity: 3,
            catalog_object_id: None,
            variation_name: Some("Large".into()),
            base_price_money: dec!(2.50),
            note: None,
        };
        assert_eq!(item.gross_sales().unwrap(), dec!(7.50));
    }

    #[test]
    fn line_item_gross_sales_overflow_is_an_error() {
        let item = LineItem {
            uid: None,
            name: "Gold bar".into(),
            quantity: 2,
            catalog_object_id: None,
            variation_name: None,
            base_price_money: Decimal::MAX,
            note: None,
        };
        assert!(matches!(
            item.gross_sales(),
            Err(ServiceError::ValidationError(_))
        ));
    }
}
