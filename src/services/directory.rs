use crate::{
    db::{DatabaseAccess, DbPool},
    entities::{
        employee::{self, EmployeeStatus},
        location::{self, LocationType},
        types::{to_json, Address, BusinessHoursPeriod},
    },
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{fetch_page, not_found, unique_violation, Page};

const DUPLICATE_EMPLOYEE_EMAIL: &str = "employee with this email already exists";

fn validate_local_time(value: &str) -> bool {
    chrono::NaiveTime::parse_from_str(value, "%H:%M").is_ok()
}

fn validate_business_hours(periods: &Vec<BusinessHoursPeriod>) -> Result<(), ValidationError> {
    for period in periods {
        if !validate_local_time(&period.start_local_time)
            || !validate_local_time(&period.end_local_time)
        {
            let mut err = ValidationError::new("local_time");
            err.message = Some("Times must be formatted as HH:MM".into());
            return Err(err);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateLocation {
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    pub name: String,
    pub address: Option<Address>,
    #[validate(length(max = 32))]
    pub phone_number: Option<String>,
    pub time_zone: Option<String>,
    pub business_name: Option<String>,
    pub location_type: Option<LocationType>,
    #[validate(url)]
    pub website_url: Option<String>,
    #[serde(default)]
    #[validate(custom = "validate_business_hours")]
    pub business_hours: Vec<BusinessHoursPeriod>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLocation {
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    pub name: Option<String>,
    pub address: Option<Address>,
    #[validate(length(max = 32))]
    pub phone_number: Option<String>,
    pub time_zone: Option<String>,
    pub business_name: Option<String>,
    pub location_type: Option<LocationType>,
    #[validate(url)]
    pub website_url: Option<String>,
    #[validate(custom = "validate_business_hours")]
    pub business_hours: Option<Vec<BusinessHoursPeriod>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateEmployee {
    #[validate(length(min = 1, max = 100, message = "This field may not be blank."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "This field may not be blank."))]
    pub last_name: String,
    pub nickname: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone_number: Option<String>,
    pub role_id: Option<String>,
    pub status: Option<EmployeeStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEmployee {
    #[validate(length(min = 1, max = 100, message = "This field may not be blank."))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "This field may not be blank."))]
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone_number: Option<String>,
    pub role_id: Option<String>,
    pub status: Option<EmployeeStatus>,
}

/// Store locations and staff records
#[derive(Clone, Debug)]
pub struct DirectoryService {
    db: DatabaseAccess,
}

impl DirectoryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            db: DatabaseAccess::new(db),
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_location(
        &self,
        input: CreateLocation,
    ) -> Result<location::Model, ServiceError> {
        input.validate()?;
        let address = input.address.as_ref().map(to_json).transpose()?;
        let model = location::ActiveModel {
            name: Set(input.name),
            address: Set(address),
            phone_number: Set(input.phone_number),
            time_zone: Set(input.time_zone),
            business_name: Set(input.business_name),
            location_type: Set(input.location_type.unwrap_or(LocationType::Physical)),
            website_url: Set(input.website_url),
            business_hours: Set(to_json(&input.business_hours)?),
            ..Default::default()
        };
        let created = self
            .db
            .execute("create_location", |db| model.insert(db))
            .await?;
        info!(location_id = %created.id, "location created");
        Ok(created)
    }

    pub async fn get_location(&self, id: Uuid) -> Result<location::Model, ServiceError> {
        self.db
            .execute("get_location", |db| location::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| not_found("Location", id))
    }

    pub async fn list_locations(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<Page<location::Model>, ServiceError> {
        let query = location::Entity::find().order_by_asc(location::Column::Name);
        fetch_page(&self.db, "list_locations", query, page, per_page).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_location(
        &self,
        id: Uuid,
        input: UpdateLocation,
    ) -> Result<location::Model, ServiceError> {
        input.validate()?;
        let mut active = self.get_location(id).await?.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(address) = input.address {
            active.address = Set(Some(to_json(&address)?));
        }
        if input.phone_number.is_some() {
            active.phone_number = Set(input.phone_number);
        }
        if input.time_zone.is_some() {
            active.time_zone = Set(input.time_zone);
        }
        if input.business_name.is_some() {
            active.business_name = Set(input.business_name);
        }
        if let Some(location_type) = input.location_type {
            active.location_type = Set(location_type);
        }
        if input.website_url.is_some() {
            active.website_url = Set(input.website_url);
        }
        if let Some(hours) = input.business_hours {
            active.business_hours = Set(to_json(&hours)?);
        }
        self.db
            .execute("update_location", |db| active.update(db))
            .await
    }

    /// Removes the location and every transaction recorded there.
    #[instrument(skip(self))]
    pub async fn delete_location(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = self
            .db
            .execute("delete_location", |db| {
                location::Entity::delete_by_id(id).exec(db)
            })
            .await?;
        if result.rows_affected == 0 {
            return Err(not_found("Location", id));
        }
        info!(location_id = %id, "location deleted");
        Ok(())
    }

    #[instrument(skip(self, input))]
    pub async fn create_employee(
        &self,
        input: CreateEmployee,
    ) -> Result<employee::Model, ServiceError> {
        input.validate()?;
        let model = employee::ActiveModel {
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            nickname: Set(input.nickname),
            email: Set(input.email),
            phone_number: Set(input.phone_number),
            role_id: Set(input.role_id),
            status: Set(input.status.unwrap_or(EmployeeStatus::Active)),
            ..Default::default()
        };
        let created = model
            .insert(self.db.get_pool())
            .await
            .map_err(|e| unique_violation(e, DUPLICATE_EMPLOYEE_EMAIL))?;
        info!(employee_id = %created.id, "employee created");
        Ok(created)
    }

    pub async fn get_employee(&self, id: Uuid) -> Result<employee::Model, ServiceError> {
        self.db
            .execute("get_employee", |db| employee::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| not_found("Employee", id))
    }

    pub async fn list_employees(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<Page<employee::Model>, ServiceError> {
        let query = employee::Entity::find()
            .order_by_asc(employee::Column::LastName)
            .order_by_asc(employee::Column::FirstName);
        fetch_page(&self.db, "list_employees", query, page, per_page).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_employee(
        &self,
        id: Uuid,
        input: UpdateEmployee,
    ) -> Result<employee::Model, ServiceError> {
        input.validate()?;
        let mut active = self.get_employee(id).await?.into_active_model();
        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name);
        }
        if input.nickname.is_some() {
            active.nickname = Set(input.nickname);
        }
        if input.email.is_some() {
            active.email = Set(input.email);
        }
        if input.phone_number.is_some() {
            active.phone_number = Set(input.phone_number);
        }
        if input.role_id.is_some() {
            active.role_id = Set(input.role_id);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active
            .update(self.db.get_pool())
            .await
            .map_err(|e| unique_violation(e, DUPLICATE_EMPLOYEE_EMAIL))
    }

    #[instrument(skip(self))]
    pub async fn delete_employee(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = self
            .db
            .execute("delete_employee", |db| {
                employee::Entity::delete_by_id(id).exec(db)
            })
            .await?;
        if result.rows_affected == 0 {
            return Err(not_found("Employee", id));
        }
        info!(employee_id = %id, "employee deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::migrated_memory_db;
    use crate::entities::types::DayOfWeek;
    use assert_matches::assert_matches;

    async fn service() -> DirectoryService {
        DirectoryService::new(Arc::new(migrated_memory_db().await))
    }

    #[tokio::test]
    async fn location_round_trips_structured_fields() {
        let directory = service().await;
        let created = directory
            .create_location(CreateLocation {
                name: "Main Street".into(),
                address: Some(Address {
                    locality: Some("Springfield".into()),
                    ..Default::default()
                }),
                business_hours: vec![BusinessHoursPeriod {
                    day_of_week: DayOfWeek::Mon,
                    start_local_time: "08:00".into(),
                    end_local_time: "17:30".into(),
                }],
                ..Default::default()
            })
            .await
            .unwrap();

        let fetched = directory.get_location(created.id).await.unwrap();
        assert_eq!(fetched.location_type, LocationType::Physical);
        assert_eq!(
            fetched.address().unwrap().and_then(|a| a.locality).as_deref(),
            Some("Springfield")
        );
        assert_eq!(fetched.business_hours().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_business_hours_are_rejected() {
        let directory = service().await;
        assert_matches!(
            directory
                .create_location(CreateLocation {
                    name: "Kiosk".into(),
                    business_hours: vec![BusinessHoursPeriod {
                        day_of_week: DayOfWeek::Sat,
                        start_local_time: "8am".into(),
                        end_local_time: "17:00".into(),
                    }],
                    ..Default::default()
                })
                .await,
            Err(ServiceError::InvalidFields(_))
        );
    }

    #[tokio::test]
    async fn employee_emails_are_unique() {
        let directory = service().await;
        let input = CreateEmployee {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: Some("ada@example.com".into()),
            ..Default::default()
        };
        let ada = directory.create_employee(input.clone()).await.unwrap();
        assert_eq!(ada.status, EmployeeStatus::Active);

        assert_matches!(
            directory.create_employee(input).await,
            Err(ServiceError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn employees_without_email_can_coexist() {
        let directory = service().await;
        for first_name in ["Sam", "Alex"] {
            directory
                .create_employee(CreateEmployee {
                    first_name: first_name.into(),
                    last_name: "Doe".into(),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        assert_eq!(directory.list_employees(1, 20).await.unwrap().total, 2);
    }

    #[tokio::test]
    async fn deactivating_an_employee() {
        let directory = service().await;
        let sam = directory
            .create_employee(CreateEmployee {
                first_name: "Sam".into(),
                last_name: "Doe".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = directory
            .update_employee(
                sam.id,
                UpdateEmployee {
                    status: Some(EmployeeStatus::Inactive),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, EmployeeStatus::Inactive);
    }
}
