use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};

use super::types::Tender;
use crate::errors::ServiceError;

/// Payment event recorded against an order at a location
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub location_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    #[sea_orm(column_type = "Json")]
    pub tender: Json,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount_money: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub tip_money: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub processing_fee_money: Decimal,
    pub client_id: Option<String>,
    pub reference_id: Option<String>,
    /// Snapshot of the product as it was sold
    #[sea_orm(column_type = "Json", nullable)]
    pub product: Option<Json>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn tender(&self) -> Result<Tender, ServiceError> {
        serde_json::from_value(self.tender.clone()).map_err(ServiceError::from)
    }

    /// Amount collected from the buyer, tip included.
    pub fn total_collected(&self) -> Decimal {
        self.amount_money + self.tip_money
    }

    /// Amount the merchant keeps after processing fees.
    pub fn net_amount(&self) -> Decimal {
        self.total_collected() - self.processing_fee_money
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id",
        on_delete = "Cascade"
    )]
    Location,
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id",
        on_delete = "Cascade"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id",
        on_delete = "Cascade"
    )]
    Employee,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            if let ActiveValue::NotSet = active_model.id {
                active_model.id = Set(Uuid::new_v4());
            }
            if let ActiveValue::NotSet = active_model.tip_money {
                active_model.tip_money = Set(Decimal::ZERO);
            }
            if let ActiveValue::NotSet = active_model.processing_fee_money {
                active_model.processing_fee_money = Set(Decimal::ZERO);
            }
            active_model.created_at = Set(Utc::now());
        }

        Ok(active_model)
    }
}
