use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::types::{from_json, ItemOptionValue};
use crate::errors::ServiceError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum PricingType {
    #[sea_orm(string_value = "FIXED_PRICING")]
    #[serde(rename = "FIXED_PRICING")]
    FixedPricing,
    #[sea_orm(string_value = "VARIABLE_PRICING")]
    #[serde(rename = "VARIABLE_PRICING")]
    VariablePricing,
}

/// Sellable option of a product with its own price and stock settings
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "variations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub sku: Option<String>,
    pub upc: Option<String>,
    pub ordinal: i32,
    pub pricing_type: PricingType,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub price_money: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub cost_money: Option<Decimal>,
    pub track_inventory: bool,
    pub inventory_alert_type: Option<String>,
    pub inventory_alert_threshold: Option<i32>,
    pub sellable: bool,
    pub stockable: bool,
    #[sea_orm(column_type = "Json")]
    pub item_option_values: Json,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn option_values(&self) -> Result<Vec<ItemOptionValue>, ServiceError> {
        from_json(&self.item_option_values)
    }

    /// Fixed-price variations must carry a price; variable ones are priced at sale.
    pub fn check_pricing(&self) -> Result<(), ServiceError> {
        if self.pricing_type == PricingType::FixedPricing && self.price_money.is_none() {
            return Err(ServiceError::ValidationError(
                "price_money is required for FIXED_PRICING variations".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Product,
    #[sea_orm(has_many = "super::item_sold::Entity")]
    ItemsSold,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::item_sold::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemsSold.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.id {
                active_model.id = Set(Uuid::new_v4());
            }
            if let ActiveValue::NotSet = active_model.ordinal {
                active_model.ordinal = Set(0);
            }
            if let ActiveValue::NotSet = active_model.pricing_type {
                active_model.pricing_type = Set(PricingType::VariablePricing);
            }
            if let ActiveValue::NotSet = active_model.track_inventory {
                active_model.track_inventory = Set(false);
            }
            if let ActiveValue::NotSet = active_model.sellable {
                active_model.sellable = Set(true);
            }
            if let ActiveValue::NotSet = active_model.stockable {
                active_model.stockable = Set(true);
            }
            if let ActiveValue::NotSet = active_model.item_option_values {
                active_model.item_option_values = Set(Json::Array(vec![]));
            }
            active_model.created_at = Set(now);
        }

        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn variation(pricing_type: PricingType, price_money: Option<Decimal>) -> Model {
        Model {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            name: "16GB RAM".into(),
            sku: None,
            upc: None,
            ordinal: 0,
            pricing_type,
            price_money,
            cost_money: None,
            track_inventory: false,
            inventory_alert_type: None,
            inventory_alert_threshold: None,
            sellable: true,
            stockable: true,
            item_option_values: serde_json::json!([{"item_option_id": null, "name": "Memory", "value": "16GB"}]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn fixed_pricing_requires_a_price() {
        assert_matches!(
            variation(PricingType::FixedPricing, None).check_pricing(),
            Err(ServiceError::ValidationError(_))
        );
        assert!(variation(PricingType::FixedPricing, Some(dec!(10.00)))
            .check_pricing()
            .is_ok());
        assert!(variation(PricingType::VariablePricing, None)
            .check_pricing()
            .is_ok());
    }

    #[test]
    fn option_values_decode() {
        let values = variation(PricingType::VariablePricing, None)
            .option_values()
            .unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, "16GB");
    }
}
