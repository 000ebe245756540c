use crate::{
    db::{DatabaseAccess, DbPool},
    entities::{
        category, product,
        types::{to_json, validate_money, ItemOptionValue},
        variation::{self, PricingType},
    },
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{ensure_exists, fetch_page, not_found, Page};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    pub name: String,
    #[serde(default)]
    pub sub_categories: Vec<Uuid>,
    #[serde(default)]
    pub items: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    pub name: Option<String>,
    pub sub_categories: Option<Vec<Uuid>>,
    pub items: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateProduct {
    pub category_id: Option<Uuid>,
    pub variation_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    pub name: String,
    #[validate(length(max = 64))]
    pub upc: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "validate_money")]
    pub price: Option<Decimal>,
    #[validate(custom = "validate_money")]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub available_online: bool,
    #[serde(default)]
    pub available_for_pickup: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub track_inventory: bool,
    pub inventory_alert_type: Option<String>,
    #[validate(range(min = 0))]
    pub inventory_alert_threshold: Option<i32>,
    pub product_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProduct {
    pub category_id: Option<Uuid>,
    pub variation_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    pub name: Option<String>,
    #[validate(length(max = 64))]
    pub upc: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "validate_money")]
    pub price: Option<Decimal>,
    #[validate(custom = "validate_money")]
    pub cost: Option<Decimal>,
    pub available_online: Option<bool>,
    pub available_for_pickup: Option<bool>,
    pub is_archived: Option<bool>,
    pub track_inventory: Option<bool>,
    pub inventory_alert_type: Option<String>,
    #[validate(range(min = 0))]
    pub inventory_alert_threshold: Option<i32>,
    pub product_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVariation {
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    pub name: String,
    #[validate(length(max = 64))]
    pub sku: Option<String>,
    #[validate(length(max = 64))]
    pub upc: Option<String>,
    pub ordinal: Option<i32>,
    /// Defaults to fixed pricing when a price is supplied
    pub pricing_type: Option<PricingType>,
    #[validate(custom = "validate_money")]
    pub price_money: Option<Decimal>,
    #[validate(custom = "validate_money")]
    pub cost_money: Option<Decimal>,
    #[serde(default)]
    pub track_inventory: bool,
    pub inventory_alert_type: Option<String>,
    #[validate(range(min = 0))]
    pub inventory_alert_threshold: Option<i32>,
    pub sellable: Option<bool>,
    pub stockable: Option<bool>,
    #[serde(default)]
    pub item_option_values: Vec<ItemOptionValue>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateVariation {
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    pub name: Option<String>,
    #[validate(length(max = 64))]
    pub sku: Option<String>,
    #[validate(length(max = 64))]
    pub upc: Option<String>,
    pub ordinal: Option<i32>,
    pub pricing_type: Option<PricingType>,
    #[validate(custom = "validate_money")]
    pub price_money: Option<Decimal>,
    #[validate(custom = "validate_money")]
    pub cost_money: Option<Decimal>,
    pub track_inventory: Option<bool>,
    pub inventory_alert_type: Option<String>,
    #[validate(range(min = 0))]
    pub inventory_alert_threshold: Option<i32>,
    pub sellable: Option<bool>,
    pub stockable: Option<bool>,
    pub item_option_values: Option<Vec<ItemOptionValue>>,
}

/// Categories, products and their variations
#[derive(Clone, Debug)]
pub struct CatalogService {
    db: DatabaseAccess,
}

impl CatalogService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            db: DatabaseAccess::new(db),
        }
    }

    // ---- categories ----

    #[instrument(skip(self, input))]
    pub async fn create_category(
        &self,
        input: CreateCategory,
    ) -> Result<category::Model, ServiceError> {
        input.validate()?;
        let model = category::ActiveModel {
            name: Set(input.name),
            sub_categories: Set(to_json(&input.sub_categories)?),
            items: Set(to_json(&input.items)?),
            ..Default::default()
        };
        let created = self
            .db
            .execute("create_category", |db| model.insert(db))
            .await?;
        info!(category_id = %created.id, "category created");
        Ok(created)
    }

    pub async fn get_category(&self, id: Uuid) -> Result<category::Model, ServiceError> {
        self.db
            .execute("get_category", |db| category::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| not_found("Category", id))
    }

    pub async fn list_categories(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<Page<category::Model>, ServiceError> {
        let query = category::Entity::find().order_by_asc(category::Column::Name);
        fetch_page(&self.db, "list_categories", query, page, per_page).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategory,
    ) -> Result<category::Model, ServiceError> {
        input.validate()?;
        let mut active = self.get_category(id).await?.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(sub_categories) = input.sub_categories {
            active.sub_categories = Set(to_json(&sub_categories)?);
        }
        if let Some(items) = input.items {
            active.items = Set(to_json(&items)?);
        }
        self.db
            .execute("update_category", |db| active.update(db))
            .await
    }

    /// Deleting a category removes its products and, through them, their variations.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = self
            .db
            .execute("delete_category", |db| {
                category::Entity::delete_by_id(id).exec(db)
            })
            .await?;
        if result.rows_affected == 0 {
            return Err(not_found("Category", id));
        }
        info!(category_id = %id, "category deleted");
        Ok(())
    }

    pub async fn list_category_products(
        &self,
        category_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<Page<product::Model>, ServiceError> {
        self.get_category(category_id).await?;
        let query = product::Entity::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .order_by_asc(product::Column::Name);
        fetch_page(&self.db, "list_category_products", query, page, per_page).await
    }

    // ---- products ----

    #[instrument(skip(self, input))]
    pub async fn create_product(
        &self,
        input: CreateProduct,
    ) -> Result<product::Model, ServiceError> {
        input.validate()?;
        let pool = self.db.get_pool();
        if let Some(category_id) = input.category_id {
            ensure_exists::<category::Entity>(pool, category_id, "Category").await?;
        }
        // A new product has no variations of its own yet.
        if input.variation_id.is_some() {
            return Err(ServiceError::ValidationError(
                "variation_id can only be set once the product has variations".to_string(),
            ));
        }

        let model = product::ActiveModel {
            category_id: Set(input.category_id),
            variation_id: Set(None),
            name: Set(input.name),
            upc: Set(input.upc),
            description: Set(input.description),
            price: Set(input.price),
            cost: Set(input.cost),
            available_online: Set(input.available_online),
            available_for_pickup: Set(input.available_for_pickup),
            is_archived: Set(input.is_archived),
            track_inventory: Set(input.track_inventory),
            inventory_alert_type: Set(input.inventory_alert_type),
            inventory_alert_threshold: Set(input.inventory_alert_threshold),
            product_data: Set(input
                .product_data
                .unwrap_or_else(|| serde_json::json!({}))),
            ..Default::default()
        };

        let created = self
            .db
            .execute("create_product", |db| model.insert(db))
            .await?;
        info!(product_id = %created.id, "product created");
        Ok(created)
    }

    pub async fn get_product(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        self.db
            .execute("get_product", |db| product::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| not_found("Product", id))
    }

    pub async fn list_products(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<Page<product::Model>, ServiceError> {
        let query = product::Entity::find().order_by_asc(product::Column::Name);
        fetch_page(&self.db, "list_products", query, page, per_page).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProduct,
    ) -> Result<product::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_product(id).await?;

        if let Some(category_id) = input.category_id {
            ensure_exists::<category::Entity>(self.db.get_pool(), category_id, "Category")
                .await?;
        }
        if let Some(variation_id) = input.variation_id {
            let default_variation = self.get_variation(variation_id).await.map_err(|_| {
                ServiceError::ValidationError(format!("Variation {variation_id} does not exist"))
            })?;
            if default_variation.product_id != existing.id {
                return Err(ServiceError::ValidationError(
                    "variation_id must reference one of this product's variations".to_string(),
                ));
            }
        }

        let mut active = existing.into_active_model();
        if input.category_id.is_some() {
            active.category_id = Set(input.category_id);
        }
        if input.variation_id.is_some() {
            active.variation_id = Set(input.variation_id);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if input.upc.is_some() {
            active.upc = Set(input.upc);
        }
        if input.description.is_some() {
            active.description = Set(input.description);
        }
        if input.price.is_some() {
            active.price = Set(input.price);
        }
        if input.cost.is_some() {
            active.cost = Set(input.cost);
        }
        if let Some(flag) = input.available_online {
            active.available_online = Set(flag);
        }
        if let Some(flag) = input.available_for_pickup {
            active.available_for_pickup = Set(flag);
        }
        if let Some(flag) = input.is_archived {
            active.is_archived = Set(flag);
        }
        if let Some(flag) = input.track_inventory {
            active.track_inventory = Set(flag);
        }
        if input.inventory_alert_type.is_some() {
            active.inventory_alert_type = Set(input.inventory_alert_type);
        }
        if input.inventory_alert_threshold.is_some() {
            active.inventory_alert_threshold = Set(input.inventory_alert_threshold);
        }
        if let Some(data) = input.product_data {
            active.product_data = Set(data);
        }

        self.db
            .execute("update_product", |db| active.update(db))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = self
            .db
            .execute("delete_product", |db| product::Entity::delete_by_id(id).exec(db))
            .await?;
        if result.rows_affected == 0 {
            return Err(not_found("Product", id));
        }
        info!(product_id = %id, "product deleted");
        Ok(())
    }

    pub async fn list_product_variations(
        &self,
        product_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<Page<variation::Model>, ServiceError> {
        self.get_product(product_id).await?;
        let query = variation::Entity::find()
            .filter(variation::Column::ProductId.eq(product_id))
            .order_by_asc(variation::Column::Ordinal)
            .order_by_asc(variation::Column::Name);
        fetch_page(&self.db, "list_product_variations", query, page, per_page).await
    }

    // ---- variations ----

    #[instrument(skip(self, input))]
    pub async fn create_variation(
        &self,
        input: CreateVariation,
    ) -> Result<variation::Model, ServiceError> {
        input.validate()?;
        ensure_exists::<product::Entity>(self.db.get_pool(), input.product_id, "Product").await?;

        let pricing_type = input.pricing_type.unwrap_or(if input.price_money.is_some() {
            PricingType::FixedPricing
        } else {
            PricingType::VariablePricing
        });
        let now = Utc::now();
        let candidate = variation::Model {
            id: Uuid::new_v4(),
            product_id: input.product_id,
            name: input.name,
            sku: input.sku,
            upc: input.upc,
            ordinal: input.ordinal.unwrap_or(0),
            pricing_type,
            price_money: input.price_money,
            cost_money: input.cost_money,
            track_inventory: input.track_inventory,
            inventory_alert_type: input.inventory_alert_type,
            inventory_alert_threshold: input.inventory_alert_threshold,
            sellable: input.sellable.unwrap_or(true),
            stockable: input.stockable.unwrap_or(true),
            item_option_values: to_json(&input.item_option_values)?,
            created_at: now,
            updated_at: now,
        };
        candidate.check_pricing()?;

        let model = candidate.into_active_model().reset_all();
        let created = self
            .db
            .execute("create_variation", |db| model.insert(db))
            .await?;
        info!(variation_id = %created.id, product_id = %created.product_id, "variation created");
        Ok(created)
    }

    pub async fn get_variation(&self, id: Uuid) -> Result<variation::Model, ServiceError> {
        self.db
            .execute("get_variation", |db| variation::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| not_found("Variation", id))
    }

    #[instrument(skip(self, input))]
    pub async fn update_variation(
        &self,
        id: Uuid,
        input: UpdateVariation,
    ) -> Result<variation::Model, ServiceError> {
        input.validate()?;
        let mut candidate = self.get_variation(id).await?;

        if let Some(name) = input.name {
            candidate.name = name;
        }
        if input.sku.is_some() {
            candidate.sku = input.sku;
        }
        if input.upc.is_some() {
            candidate.upc = input.upc;
        }
        if let Some(ordinal) = input.ordinal {
            candidate.ordinal = ordinal;
        }
        if let Some(pricing_type) = input.pricing_type {
            candidate.pricing_type = pricing_type;
        }
        if input.price_money.is_some() {
            candidate.price_money = input.price_money;
        }
        if input.cost_money.is_some() {
            candidate.cost_money = input.cost_money;
        }
        if let Some(flag) = input.track_inventory {
            candidate.track_inventory = flag;
        }
        if input.inventory_alert_type.is_some() {
            candidate.inventory_alert_type = input.inventory_alert_type;
        }
        if input.inventory_alert_threshold.is_some() {
            candidate.inventory_alert_threshold = input.inventory_alert_threshold;
        }
        if let Some(flag) = input.sellable {
            candidate.sellable = flag;
        }
        if let Some(flag) = input.stockable {
            candidate.stockable = flag;
        }
        if let Some(values) = input.item_option_values {
            candidate.item_option_values = to_json(&values)?;
        }
        candidate.check_pricing()?;

        let model = candidate.into_active_model().reset_all();
        self.db
            .execute("update_variation", |db| model.update(db))
            .await
    }

    /// Delete a variation, clearing any product that used it as its default.
    /// Items sold against the variation go with it.
    #[instrument(skip(self))]
    pub async fn delete_variation(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.get_pool().begin().await?;

        if variation::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(not_found("Variation", id));
        }

        let cleared = product::Entity::update_many()
            .col_expr(product::Column::VariationId, Expr::value(Option::<Uuid>::None))
            .filter(product::Column::VariationId.eq(id))
            .exec(&txn)
            .await?;
        debug!(products = cleared.rows_affected, "cleared default variation");

        variation::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(variation_id = %id, "variation deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::migrated_memory_db;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    async fn service() -> CatalogService {
        CatalogService::new(Arc::new(migrated_memory_db().await))
    }

    fn product_named(name: &str, category_id: Option<Uuid>) -> CreateProduct {
        CreateProduct {
            category_id,
            name: name.to_string(),
            price: Some(dec!(4.50)),
            ..Default::default()
        }
    }

    fn variation_for(product_id: Uuid, name: &str) -> CreateVariation {
        CreateVariation {
            product_id,
            name: name.to_string(),
            sku: None,
            upc: None,
            ordinal: None,
            pricing_type: None,
            price_money: Some(dec!(3.00)),
            cost_money: None,
            track_inventory: false,
            inventory_alert_type: None,
            inventory_alert_threshold: None,
            sellable: None,
            stockable: None,
            item_option_values: vec![],
        }
    }

    #[tokio::test]
    async fn category_create_and_fetch() {
        let catalog = service().await;
        let created = catalog
            .create_category(CreateCategory {
                name: "Drinks".into(),
                sub_categories: vec![],
                items: vec![],
            })
            .await
            .unwrap();

        let fetched = catalog.get_category(created.id).await.unwrap();
        assert_eq!(fetched.name, "Drinks");
        assert!(fetched.sub_category_ids().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_category_name_is_rejected() {
        let catalog = service().await;
        assert_matches!(
            catalog
                .create_category(CreateCategory {
                    name: String::new(),
                    sub_categories: vec![],
                    items: vec![],
                })
                .await,
            Err(ServiceError::InvalidFields(_))
        );
    }

    #[tokio::test]
    async fn product_money_is_validated() {
        let catalog = service().await;
        let mut input = product_named("Latte", None);
        input.price = Some(dec!(4.505));
        assert_matches!(
            catalog.create_product(input).await,
            Err(ServiceError::InvalidFields(_))
        );
    }

    #[tokio::test]
    async fn product_with_unknown_category_is_rejected() {
        let catalog = service().await;
        assert_matches!(
            catalog
                .create_product(product_named("Latte", Some(Uuid::new_v4())))
                .await,
            Err(ServiceError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn variation_pricing_defaults_follow_price() {
        let catalog = service().await;
        let product = catalog
            .create_product(product_named("Latte", None))
            .await
            .unwrap();

        let fixed = catalog
            .create_variation(variation_for(product.id, "Small"))
            .await
            .unwrap();
        assert_eq!(fixed.pricing_type, PricingType::FixedPricing);

        let mut open = variation_for(product.id, "Custom");
        open.price_money = None;
        let variable = catalog.create_variation(open).await.unwrap();
        assert_eq!(variable.pricing_type, PricingType::VariablePricing);

        let mut broken = variation_for(product.id, "Broken");
        broken.price_money = None;
        broken.pricing_type = Some(PricingType::FixedPricing);
        assert_matches!(
            catalog.create_variation(broken).await,
            Err(ServiceError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn default_variation_must_belong_to_product() {
        let catalog = service().await;
        let latte = catalog
            .create_product(product_named("Latte", None))
            .await
            .unwrap();
        let mocha = catalog
            .create_product(product_named("Mocha", None))
            .await
            .unwrap();
        let small_mocha = catalog
            .create_variation(variation_for(mocha.id, "Small"))
            .await
            .unwrap();

        assert_matches!(
            catalog
                .update_product(
                    latte.id,
                    UpdateProduct {
                        variation_id: Some(small_mocha.id),
                        ..Default::default()
                    },
                )
                .await,
            Err(ServiceError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn new_product_cannot_borrow_another_products_variation() {
        let catalog = service().await;
        let latte = catalog
            .create_product(product_named("Latte", None))
            .await
            .unwrap();
        let large = catalog
            .create_variation(variation_for(latte.id, "Large"))
            .await
            .unwrap();

        let mut bagel = product_named("Bagel", None);
        bagel.variation_id = Some(large.id);
        assert_matches!(
            catalog.create_product(bagel).await,
            Err(ServiceError::ValidationError(_))
        );
        assert_eq!(catalog.list_products(1, 20).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn deleting_variation_clears_product_default() {
        let catalog = service().await;
        let product = catalog
            .create_product(product_named("Latte", None))
            .await
            .unwrap();
        let small = catalog
            .create_variation(variation_for(product.id, "Small"))
            .await
            .unwrap();
        catalog
            .update_product(
                product.id,
                UpdateProduct {
                    variation_id: Some(small.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        catalog.delete_variation(small.id).await.unwrap();

        let product = catalog.get_product(product.id).await.unwrap();
        assert_eq!(product.variation_id, None);
        assert_matches!(
            catalog.get_variation(small.id).await,
            Err(ServiceError::NotFound(_))
        );
        assert_matches!(
            catalog.delete_variation(small.id).await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn deleting_category_cascades_to_products_and_variations() {
        let catalog = service().await;
        let drinks = catalog
            .create_category(CreateCategory {
                name: "Drinks".into(),
                sub_categories: vec![],
                items: vec![],
            })
            .await
            .unwrap();
        let latte = catalog
            .create_product(product_named("Latte", Some(drinks.id)))
            .await
            .unwrap();
        let small = catalog
            .create_variation(variation_for(latte.id, "Small"))
            .await
            .unwrap();

        let listed = catalog
            .list_category_products(drinks.id, 1, 20)
            .await
            .unwrap();
        assert_eq!(listed.total, 1);

        catalog.delete_category(drinks.id).await.unwrap();

        assert_matches!(
            catalog.get_product(latte.id).await,
            Err(ServiceError::NotFound(_))
        );
        assert_matches!(
            catalog.get_variation(small.id).await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn listing_pages_products() {
        let catalog = service().await;
        for name in ["A", "B", "C"] {
            catalog
                .create_product(product_named(name, None))
                .await
                .unwrap();
        }

        let page = catalog.list_products(2, 2).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "C");
    }
}
