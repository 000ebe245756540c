use crate::{
    db::{DatabaseAccess, DbPool},
    entities::{
        customer, employee, item_sold, location,
        order::{self, OrderState, OrderTotals},
        product, transaction,
        types::{
            to_json, validate_money, Address, AppliedDiscount, AppliedTax, Fulfillment, LineItem,
            Refund, ServiceCharge, Tender,
        },
        variation,
    },
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use super::{check_money, ensure_exists, fetch_page, not_found, Page};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateOrder {
    #[validate(length(max = 64))]
    pub reference_id: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub buyer_email: Option<String>,
    #[validate(length(max = 255))]
    pub recipient_name: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub recipient_email: Option<String>,
    #[validate(length(max = 32))]
    pub recipient_phone: Option<String>,
    pub state: Option<OrderState>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub taxes: Vec<AppliedTax>,
    #[serde(default)]
    pub discounts: Vec<AppliedDiscount>,
    #[serde(default)]
    pub service_charges: Vec<ServiceCharge>,
    #[serde(default)]
    pub fulfillments: Vec<Fulfillment>,
    #[serde(default)]
    pub refunds: Vec<Refund>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateOrder {
    #[validate(length(max = 64))]
    pub reference_id: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub buyer_email: Option<String>,
    #[validate(length(max = 255))]
    pub recipient_name: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub recipient_email: Option<String>,
    #[validate(length(max = 32))]
    pub recipient_phone: Option<String>,
    pub state: Option<OrderState>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub line_items: Option<Vec<LineItem>>,
    pub taxes: Option<Vec<AppliedTax>>,
    pub discounts: Option<Vec<AppliedDiscount>>,
    pub service_charges: Option<Vec<ServiceCharge>>,
    pub fulfillments: Option<Vec<Fulfillment>>,
    pub refunds: Option<Vec<Refund>>,
}

impl UpdateOrder {
    fn touches_pricing(&self) -> bool {
        self.line_items.is_some()
            || self.taxes.is_some()
            || self.discounts.is_some()
            || self.service_charges.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTransaction {
    pub order_id: Uuid,
    pub location_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub tender: Tender,
    #[validate(custom = "validate_money")]
    pub amount_money: Decimal,
    #[validate(custom = "validate_money")]
    pub tip_money: Option<Decimal>,
    #[validate(custom = "validate_money")]
    pub processing_fee_money: Option<Decimal>,
    #[validate(length(max = 64))]
    pub client_id: Option<String>,
    #[validate(length(max = 64))]
    pub reference_id: Option<String>,
    pub product: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateItemSold {
    pub product_id: Uuid,
    pub order_id: Uuid,
    pub variation_id: Uuid,
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub quantity: i32,
    pub note: Option<String>,
}

/// An order together with its computed money totals
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: order::Model,
    pub totals: OrderTotals,
}

impl OrderDetail {
    pub fn from_model(order: order::Model) -> Result<Self, ServiceError> {
        let totals = order.totals()?;
        Ok(Self { order, totals })
    }
}

fn check_pricing_lines(
    line_items: &[LineItem],
    taxes: &[AppliedTax],
    discounts: &[AppliedDiscount],
    service_charges: &[ServiceCharge],
) -> Result<(), ServiceError> {
    for (i, item) in line_items.iter().enumerate() {
        if item.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "line_items[{i}].name: This field may not be blank."
            )));
        }
        if item.quantity == 0 {
            return Err(ServiceError::ValidationError(format!(
                "line_items[{i}].quantity: Ensure this value is greater than 0."
            )));
        }
        check_money(&format!("line_items[{i}].base_price_money"), &item.base_price_money)?;
    }
    for (i, tax) in taxes.iter().enumerate() {
        if tax.percentage < Decimal::ZERO || tax.percentage > Decimal::ONE_HUNDRED {
            return Err(ServiceError::ValidationError(format!(
                "taxes[{i}].percentage: must be between 0 and 100"
            )));
        }
        check_money(&format!("taxes[{i}].applied_money"), &tax.applied_money)?;
    }
    for (i, discount) in discounts.iter().enumerate() {
        check_money(&format!("discounts[{i}].applied_money"), &discount.applied_money)?;
    }
    for (i, charge) in service_charges.iter().enumerate() {
        check_money(&format!("service_charges[{i}].amount_money"), &charge.amount_money)?;
    }
    Ok(())
}

fn check_refunds(refunds: &[Refund]) -> Result<(), ServiceError> {
    for (i, refund) in refunds.iter().enumerate() {
        check_money(&format!("refunds[{i}].amount_money"), &refund.amount_money)?;
    }
    Ok(())
}

fn check_tender(tender: &Tender) -> Result<(), ServiceError> {
    if let Some(last_4) = &tender.last_4 {
        if last_4.len() != 4 || !last_4.chars().all(|c| c.is_ascii_digit()) {
            return Err(ServiceError::ValidationError(
                "tender.last_4: must be exactly four digits".to_string(),
            ));
        }
    }
    Ok(())
}

/// Orders and the payments and items recorded against them
#[derive(Clone, Debug)]
pub struct OrderService {
    db: DatabaseAccess,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            db: DatabaseAccess::new(db),
        }
    }

    // ---- orders ----

    #[instrument(skip(self, input))]
    pub async fn create_order(&self, input: CreateOrder) -> Result<order::Model, ServiceError> {
        input.validate()?;
        check_pricing_lines(
            &input.line_items,
            &input.taxes,
            &input.discounts,
            &input.service_charges,
        )?;
        check_refunds(&input.refunds)?;

        let model = order::ActiveModel {
            reference_id: Set(input.reference_id),
            buyer_email: Set(input.buyer_email),
            recipient_name: Set(input.recipient_name),
            recipient_email: Set(input.recipient_email),
            recipient_phone: Set(input.recipient_phone),
            state: Set(input.state.unwrap_or(OrderState::Open)),
            shipping_address: Set(input.shipping_address.as_ref().map(to_json).transpose()?),
            billing_address: Set(input.billing_address.as_ref().map(to_json).transpose()?),
            line_items: Set(to_json(&input.line_items)?),
            taxes: Set(to_json(&input.taxes)?),
            discounts: Set(to_json(&input.discounts)?),
            service_charges: Set(to_json(&input.service_charges)?),
            fulfillments: Set(to_json(&input.fulfillments)?),
            refunds: Set(to_json(&input.refunds)?),
            ..Default::default()
        };

        let created = self
            .db
            .execute("create_order", |db| model.insert(db))
            .await?;
        info!(order_id = %created.id, state = ?created.state, "order created");
        Ok(created)
    }

    pub async fn get_order(&self, id: Uuid) -> Result<order::Model, ServiceError> {
        self.db
            .execute("get_order", |db| order::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| not_found("Order", id))
    }

    pub async fn list_orders(
        &self,
        state: Option<OrderState>,
        page: u64,
        per_page: u64,
    ) -> Result<Page<order::Model>, ServiceError> {
        let mut query = order::Entity::find().order_by_desc(order::Column::CreatedAt);
        if let Some(state) = state {
            query = query.filter(order::Column::State.eq(state));
        }
        fetch_page(&self.db, "list_orders", query, page, per_page).await
    }

    /// Pricing lines are frozen once an order is completed or canceled.
    #[instrument(skip(self, input))]
    pub async fn update_order(
        &self,
        id: Uuid,
        input: UpdateOrder,
    ) -> Result<order::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_order(id).await?;

        if existing.state.is_closed() && input.touches_pricing() {
            warn!(order_id = %id, state = ?existing.state, "rejecting repricing of closed order");
            return Err(ServiceError::ValidationError(
                "line items, taxes, discounts and service charges cannot change on a closed order"
                    .to_string(),
            ));
        }
        check_pricing_lines(
            input.line_items.as_deref().unwrap_or_default(),
            input.taxes.as_deref().unwrap_or_default(),
            input.discounts.as_deref().unwrap_or_default(),
            input.service_charges.as_deref().unwrap_or_default(),
        )?;
        check_refunds(input.refunds.as_deref().unwrap_or_default())?;

        let mut active = existing.into_active_model();
        if input.reference_id.is_some() {
            active.reference_id = Set(input.reference_id);
        }
        if input.buyer_email.is_some() {
            active.buyer_email = Set(input.buyer_email);
        }
        if input.recipient_name.is_some() {
            active.recipient_name = Set(input.recipient_name);
        }
        if input.recipient_email.is_some() {
            active.recipient_email = Set(input.recipient_email);
        }
        if input.recipient_phone.is_some() {
            active.recipient_phone = Set(input.recipient_phone);
        }
        if let Some(state) = input.state {
            active.state = Set(state);
        }
        if let Some(address) = input.shipping_address {
            active.shipping_address = Set(Some(to_json(&address)?));
        }
        if let Some(address) = input.billing_address {
            active.billing_address = Set(Some(to_json(&address)?));
        }
        if let Some(lines) = input.line_items {
            active.line_items = Set(to_json(&lines)?);
        }
        if let Some(taxes) = input.taxes {
            active.taxes = Set(to_json(&taxes)?);
        }
        if let Some(discounts) = input.discounts {
            active.discounts = Set(to_json(&discounts)?);
        }
        if let Some(charges) = input.service_charges {
            active.service_charges = Set(to_json(&charges)?);
        }
        if let Some(fulfillments) = input.fulfillments {
            active.fulfillments = Set(to_json(&fulfillments)?);
        }
        if let Some(refunds) = input.refunds {
            active.refunds = Set(to_json(&refunds)?);
        }

        let updated = self
            .db
            .execute("update_order", |db| active.update(db))
            .await?;
        info!(order_id = %updated.id, state = ?updated.state, "order updated");
        Ok(updated)
    }

    /// Removes the order with its transactions and items sold.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = self
            .db
            .execute("delete_order", |db| order::Entity::delete_by_id(id).exec(db))
            .await?;
        if result.rows_affected == 0 {
            return Err(not_found("Order", id));
        }
        info!(order_id = %id, "order deleted");
        Ok(())
    }

    pub async fn list_order_transactions(
        &self,
        order_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<Page<transaction::Model>, ServiceError> {
        self.get_order(order_id).await?;
        let query = transaction::Entity::find()
            .filter(transaction::Column::OrderId.eq(order_id))
            .order_by_asc(transaction::Column::CreatedAt);
        fetch_page(&self.db, "list_order_transactions", query, page, per_page).await
    }

    pub async fn list_order_items(
        &self,
        order_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<Page<item_sold::Model>, ServiceError> {
        self.get_order(order_id).await?;
        let query = item_sold::Entity::find()
            .filter(item_sold::Column::OrderId.eq(order_id))
            .order_by_asc(item_sold::Column::CreatedAt);
        fetch_page(&self.db, "list_order_items", query, page, per_page).await
    }

    // ---- transactions ----

    #[instrument(skip(self, input), fields(order_id = %input.order_id))]
    pub async fn create_transaction(
        &self,
        input: CreateTransaction,
    ) -> Result<transaction::Model, ServiceError> {
        input.validate()?;
        check_tender(&input.tender)?;

        let pool = self.db.get_pool();
        ensure_exists::<order::Entity>(pool, input.order_id, "Order").await?;
        ensure_exists::<location::Entity>(pool, input.location_id, "Location").await?;
        if let Some(customer_id) = input.customer_id {
            ensure_exists::<customer::Entity>(pool, customer_id, "Customer").await?;
        }
        if let Some(employee_id) = input.employee_id {
            ensure_exists::<employee::Entity>(pool, employee_id, "Employee").await?;
        }

        let model = transaction::ActiveModel {
            order_id: Set(input.order_id),
            location_id: Set(input.location_id),
            customer_id: Set(input.customer_id),
            employee_id: Set(input.employee_id),
            tender: Set(to_json(&input.tender)?),
            amount_money: Set(input.amount_money),
            tip_money: Set(input.tip_money.unwrap_or(Decimal::ZERO)),
            processing_fee_money: Set(input.processing_fee_money.unwrap_or(Decimal::ZERO)),
            client_id: Set(input.client_id),
            reference_id: Set(input.reference_id),
            product: Set(input.product),
            ..Default::default()
        };

        let created = self
            .db
            .execute("create_transaction", |db| model.insert(db))
            .await?;
        info!(
            transaction_id = %created.id,
            amount = %created.amount_money,
            "transaction recorded"
        );
        Ok(created)
    }

    pub async fn get_transaction(&self, id: Uuid) -> Result<transaction::Model, ServiceError> {
        self.db
            .execute("get_transaction", |db| {
                transaction::Entity::find_by_id(id).one(db)
            })
            .await?
            .ok_or_else(|| not_found("Transaction", id))
    }

    // ---- items sold ----

    #[instrument(skip(self, input), fields(order_id = %input.order_id))]
    pub async fn create_item_sold(
        &self,
        input: CreateItemSold,
    ) -> Result<item_sold::Model, ServiceError> {
        input.validate()?;

        let pool = self.db.get_pool();
        ensure_exists::<order::Entity>(pool, input.order_id, "Order").await?;
        ensure_exists::<product::Entity>(pool, input.product_id, "Product").await?;
        let sold_variation = variation::Entity::find_by_id(input.variation_id)
            .one(pool)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Variation {} does not exist",
                    input.variation_id
                ))
            })?;
        if sold_variation.product_id != input.product_id {
            return Err(ServiceError::ValidationError(
                "variation_id must reference a variation of product_id".to_string(),
            ));
        }

        let model = item_sold::ActiveModel {
            product_id: Set(input.product_id),
            order_id: Set(input.order_id),
            variation_id: Set(input.variation_id),
            quantity: Set(input.quantity),
            note: Set(input.note),
            ..Default::default()
        };
        let created = self
            .db
            .execute("create_item_sold", |db| model.insert(db))
            .await?;
        info!(item_sold_id = %created.id, quantity = created.quantity, "item sold recorded");
        Ok(created)
    }

    pub async fn get_item_sold(&self, id: Uuid) -> Result<item_sold::Model, ServiceError> {
        self.db
            .execute("get_item_sold", |db| item_sold::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| not_found("Item sold", id))
    }

    #[instrument(skip(self))]
    pub async fn delete_item_sold(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = self
            .db
            .execute("delete_item_sold", |db| {
                item_sold::Entity::delete_by_id(id).exec(db)
            })
            .await?;
        if result.rows_affected == 0 {
            return Err(not_found("Item sold", id));
        }
        Ok(())
    }
}
