use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};

/// Catalog item sold at the counter or online
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    /// Default variation; cleared when that variation is deleted
    pub variation_id: Option<Uuid>,
    pub name: String,
    pub upc: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub price: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub cost: Option<Decimal>,
    pub available_online: bool,
    pub available_for_pickup: bool,
    pub is_archived: bool,
    pub track_inventory: bool,
    pub inventory_alert_type: Option<String>,
    pub inventory_alert_threshold: Option<i32>,
    /// Free-form attributes supplied by the merchant
    #[sea_orm(column_type = "Json")]
    pub product_data: Json,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Gross margin per unit when both price and cost are known.
    pub fn margin(&self) -> Option<Decimal> {
        match (self.price, self.cost) {
            (Some(price), Some(cost)) => Some(price - cost),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::variation::Entity",
        from = "Column::VariationId",
        to = "super::variation::Column::Id",
        on_delete = "SetNull"
    )]
    DefaultVariation,
    #[sea_orm(has_many = "super::variation::Entity")]
    Variations,
    #[sea_orm(has_many = "super::item_sold::Entity")]
    ItemsSold,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::variation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variations.def()
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
            if let ActiveValue::NotSet = active_model.available_online {
                active_model.available_online = Set(false);
            }
            if let ActiveValue::NotSet = active_model.available_for_pickup {
                active_model.available_for_pickup = Set(false);
            }
            if let ActiveValue::NotSet = active_model.is_archived {
                active_model.is_archived = Set(false);
            }
            if let ActiveValue::NotSet = active_model.track_inventory {
                active_model.track_inventory = Set(false);
            }
            if let ActiveValue::NotSet = active_model.product_data {
                active_model.product_data = Set(Json::Object(Default::default()));
            }
            active_model.created_at = Set(now);
        }

        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}
