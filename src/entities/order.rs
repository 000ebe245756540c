use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::types::{
    checked_total, from_json, from_optional_json, Address, AppliedDiscount, AppliedTax, Fulfillment, LineItem,
    Refund, ServiceCharge,
};
use crate::errors::ServiceError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderState {
    #[sea_orm(string_value = "OPEN")]
    Open,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELED")]
    Canceled,
    #[sea_orm(string_value = "DRAFT")]
    Draft,
}

impl OrderState {
    /// Completed and canceled orders are closed.
    pub fn is_closed(self) -> bool {
        matches!(self, OrderState::Completed | OrderState::Canceled)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Client-facing order reference (receipt number, external id)
    pub reference_id: Option<String>,
    pub buyer_email: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_email: Option<String>,
    pub recipient_phone: Option<String>,
    pub state: OrderState,
    #[sea_orm(column_type = "Json", nullable)]
    pub shipping_address: Option<Json>,
    #[sea_orm(column_type = "Json", nullable)]
    pub billing_address: Option<Json>,
    #[sea_orm(column_type = "Json")]
    pub line_items: Json,
    #[sea_orm(column_type = "Json")]
    pub taxes: Json,
    #[sea_orm(column_type = "Json")]
    pub discounts: Json,
    #[sea_orm(column_type = "Json")]
    pub service_charges: Json,
    #[sea_orm(column_type = "Json")]
    pub fulfillments: Json,
    #[sea_orm(column_type = "Json")]
    pub refunds: Json,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn shipping_address(&self) -> Result<Option<Address>, ServiceError> {
        from_optional_json(&self.shipping_address)
    }

    pub fn billing_address(&self) -> Result<Option<Address>, ServiceError> {
        from_optional_json(&self.billing_address)
    }

    pub fn line_items(&self) -> Result<Vec<LineItem>, ServiceError> {
        from_json(&self.line_items)
    }

    pub fn taxes(&self) -> Result<Vec<AppliedTax>, ServiceError> {
        from_json(&self.taxes)
    }

    pub fn discounts(&self) -> Result<Vec<AppliedDiscount>, ServiceError> {
        from_json(&self.discounts)
    }

    pub fn service_charges(&self) -> Result<Vec<ServiceCharge>, ServiceError> {
        from_json(&self.service_charges)
    }

    pub fn fulfillments(&self) -> Result<Vec<Fulfillment>, ServiceError> {
        from_json(&self.fulfillments)
    }

    pub fn refunds(&self) -> Result<Vec<Refund>, ServiceError> {
        from_json(&self.refunds)
    }

    /// Money totals derived from the structured line data.
    pub fn totals(&self) -> Result<OrderTotals, ServiceError> {
        let gross = self
            .line_items()?
            .iter()
            .map(LineItem::gross_sales)
            .collect::<Result<Vec<_>, _>>()?;
        let subtotal = checked_total("subtotal", gross)?;
        let tax = checked_total("tax", self.taxes()?.iter().map(|t| t.applied_money))?;
        let discount =
            checked_total("discount", self.discounts()?.iter().map(|d| d.applied_money))?;
        let service_charge = checked_total(
            "service_charge",
            self.service_charges()?.iter().map(|c| c.amount_money),
        )?;
        let refunded = checked_total("refunded", self.refunds()?.iter().map(|r| r.amount_money))?;
        let total = checked_total("total", [subtotal, tax, service_charge])? - discount;

        Ok(OrderTotals {
            subtotal,
            tax,
            discount,
            service_charge,
            refunded,
            total: total.max(Decimal::ZERO),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub service_charge: Decimal,
    pub refunded: Decimal,
    pub total: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::item_sold::Entity")]
    ItemsSold,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
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
            if let ActiveValue::NotSet = active_model.state {
                active_model.state = Set(OrderState::Open);
            }
            for column in [
                &mut active_model.line_items,
                &mut active_model.taxes,
                &mut active_model.discounts,
                &mut active_model.service_charges,
                &mut active_model.fulfillments,
                &mut active_model.refunds,
            ] {
                if let ActiveValue::NotSet = column {
                    *column = Set(Json::Array(vec![]));
                }
            }
            active_model.created_at = Set(now);
        }

        let state = match &active_model.state {
            ActiveValue::Set(s) | ActiveValue::Unchanged(s) => Some(*s),
            ActiveValue::NotSet => None,
        };
        let already_closed = matches!(
            &active_model.closed_at,
            ActiveValue::Set(Some(_)) | ActiveValue::Unchanged(Some(_))
        );
        match state {
            Some(s) if s.is_closed() && !already_closed => active_model.closed_at = Set(Some(now)),
            Some(s) if !s.is_closed() && already_closed => active_model.closed_at = Set(None),
            Some(_) if insert && !already_closed => active_model.closed_at = Set(None),
            _ => {}
        }

        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}
