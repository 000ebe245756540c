//! Business logic behind the HTTP handlers.
//!
//! Every service wraps a [`DatabaseAccess`] handle so queries are timed and
//! logged in one place.

pub mod catalog;
pub mod customers;
pub mod directory;
pub mod orders;
pub mod promotions;
pub mod users;

use crate::db::{DatabaseAccess, DbPool};
use crate::errors::ServiceError;
use rust_decimal::Decimal;
use sea_orm::{
    DbErr, EntityTrait, PaginatorTrait, PrimaryKeyTrait, Select, SqlErr,
};
use uuid::Uuid;

/// One page of rows plus the total row count
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Fetch a 1-based page of `query`.
pub(crate) async fn fetch_page<E>(
    db: &DatabaseAccess,
    operation: &str,
    query: Select<E>,
    page: u64,
    per_page: u64,
) -> Result<Page<E::Model>, ServiceError>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
{
    let per_page = per_page.max(1);
    db.execute(operation, |conn| async move {
        let paginator = query.paginate(conn, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok(Page { items, total })
    })
    .await
}

/// Reject a request that references a row which does not exist.
pub(crate) async fn ensure_exists<E>(
    db: &DbPool,
    id: Uuid,
    label: &str,
) -> Result<(), ServiceError>
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    if E::find_by_id(id).one(db).await?.is_none() {
        return Err(ServiceError::ValidationError(format!(
            "{label} {id} does not exist"
        )));
    }
    Ok(())
}

pub(crate) fn not_found(label: &str, id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("{label} {id} not found"))
}

/// Map a unique-index violation to a client error, anything else to a database error.
pub(crate) fn unique_violation(err: DbErr, message: &str) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::ValidationError(message.to_string())
        }
        _ => ServiceError::DatabaseError(err),
    }
}

/// Currency check for amounts nested inside JSON payloads.
pub(crate) fn check_money(field: &str, value: &Decimal) -> Result<(), ServiceError> {
    crate::entities::types::validate_money(value).map_err(|e| {
        ServiceError::ValidationError(format!(
            "{field}: {}",
            e.message.map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string())
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[test]
    fn nested_money_errors_name_the_field() {
        assert!(check_money("tip_money", &dec!(1.25)).is_ok());
        let err = check_money("line_items[0].base_price_money", &dec!(-1)).unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(ref msg) if msg.starts_with("line_items[0]"));
    }

    #[test]
    fn page_map_keeps_total() {
        let page = Page {
            items: vec![1, 2, 3],
            total: 10,
        }
        .map(|n| n * 2);
        assert_eq!(page.items, vec![2, 4, 6]);
        assert_eq!(page.total, 10);
    }
}
