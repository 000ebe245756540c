use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_catalog_tables::Migration),
            Box::new(m20240101_000003_create_directory_tables::Migration),
            Box::new(m20240101_000004_create_customers_table::Migration),
            Box::new(m20240101_000005_create_order_tables::Migration),
            Box::new(m20240101_000006_create_discounts_table::Migration),
        ]
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Name,
    PasswordHash,
    IsActive,
    IsStaff,
    IsSuperuser,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    SubCategories,
    Items,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    CategoryId,
    VariationId,
    Name,
    Upc,
    Description,
    Price,
    Cost,
    AvailableOnline,
    AvailableForPickup,
    IsArchived,
    TrackInventory,
    InventoryAlertType,
    InventoryAlertThreshold,
    ProductData,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Variations {
    Table,
    Id,
    ProductId,
    Name,
    Sku,
    Upc,
    Ordinal,
    PricingType,
    PriceMoney,
    CostMoney,
    TrackInventory,
    InventoryAlertType,
    InventoryAlertThreshold,
    Sellable,
    Stockable,
    ItemOptionValues,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    Id,
    Name,
    Address,
    PhoneNumber,
    TimeZone,
    BusinessName,
    LocationType,
    WebsiteUrl,
    BusinessHours,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    FirstName,
    LastName,
    Nickname,
    Email,
    PhoneNumber,
    RoleId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    GivenName,
    FamilyName,
    CompanyName,
    Nickname,
    EmailAddress,
    Address,
    PhoneNumber,
    ReferenceId,
    GroupId,
    Note,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    ReferenceId,
    BuyerEmail,
    RecipientName,
    RecipientEmail,
    RecipientPhone,
    State,
    ShippingAddress,
    BillingAddress,
    LineItems,
    Taxes,
    Discounts,
    ServiceCharges,
    Fulfillments,
    Refunds,
    CreatedAt,
    UpdatedAt,
    ClosedAt,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    OrderId,
    LocationId,
    CustomerId,
    EmployeeId,
    Tender,
    AmountMoney,
    TipMoney,
    ProcessingFeeMoney,
    ClientId,
    ReferenceId,
    Product,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ItemsSold {
    Table,
    Id,
    ProductId,
    OrderId,
    VariationId,
    Quantity,
    Note,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Discounts {
    Table,
    Id,
    Name,
    DiscountType,
    AmountMoney,
    Percentage,
    Scope,
    CustomerGroupIds,
    StartDate,
    EndDate,
    CreatedAt,
    UpdatedAt,
}

fn timestamps(table: &mut TableCreateStatement, created: impl IntoIden, updated: impl IntoIden) {
    table
        .col(
            ColumnDef::new(created)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(updated)
                .timestamp_with_time_zone()
                .not_null(),
        );
}

mod m20240101_000001_create_users_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut table = Table::create()
                .table(Users::Table)
                .if_not_exists()
                .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                .col(
                    ColumnDef::new(Users::Email)
                        .string_len(255)
                        .not_null()
                        .unique_key(),
                )
                .col(
                    ColumnDef::new(Users::Name)
                        .string_len(255)
                        .not_null()
                        .default(""),
                )
                .col(ColumnDef::new(Users::PasswordHash).text().not_null())
                .col(
                    ColumnDef::new(Users::IsActive)
                        .boolean()
                        .not_null()
                        .default(true),
                )
                .col(
                    ColumnDef::new(Users::IsStaff)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(
                    ColumnDef::new(Users::IsSuperuser)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(
                    ColumnDef::new(Users::LastLogin)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .to_owned();
            timestamps(&mut table, Users::CreatedAt, Users::UpdatedAt);
            manager.create_table(table).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000002_create_catalog_tables {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut categories = Table::create()
                .table(Categories::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Categories::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(Categories::Name).string_len(255).not_null())
                .col(ColumnDef::new(Categories::SubCategories).json().not_null())
                .col(ColumnDef::new(Categories::Items).json().not_null())
                .to_owned();
            timestamps(&mut categories, Categories::CreatedAt, Categories::UpdatedAt);
            manager.create_table(categories).await?;

            // products.variation_id has no foreign key: variations reference
            // products, and the catalog service clears the column on delete.
            let mut products = Table::create()
                .table(Products::Table)
                .if_not_exists()
                .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                .col(ColumnDef::new(Products::CategoryId).uuid().null())
                .col(ColumnDef::new(Products::VariationId).uuid().null())
                .col(ColumnDef::new(Products::Name).string_len(255).not_null())
                .col(ColumnDef::new(Products::Upc).string_len(64).null())
                .col(ColumnDef::new(Products::Description).text().null())
                .col(ColumnDef::new(Products::Price).decimal_len(12, 2).null())
                .col(ColumnDef::new(Products::Cost).decimal_len(12, 2).null())
                .col(
                    ColumnDef::new(Products::AvailableOnline)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(
                    ColumnDef::new(Products::AvailableForPickup)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(
                    ColumnDef::new(Products::IsArchived)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(
                    ColumnDef::new(Products::TrackInventory)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(
                    ColumnDef::new(Products::InventoryAlertType)
                        .string_len(32)
                        .null(),
                )
                .col(
                    ColumnDef::new(Products::InventoryAlertThreshold)
                        .integer()
                        .null(),
                )
                .col(ColumnDef::new(Products::ProductData).json().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_products_category_id")
                        .from(Products::Table, Products::CategoryId)
                        .to(Categories::Table, Categories::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .to_owned();
            timestamps(&mut products, Products::CreatedAt, Products::UpdatedAt);
            manager.create_table(products).await?;

            let mut variations = Table::create()
                .table(Variations::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Variations::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(Variations::ProductId).uuid().not_null())
                .col(ColumnDef::new(Variations::Name).string_len(255).not_null())
                .col(ColumnDef::new(Variations::Sku).string_len(64).null())
                .col(ColumnDef::new(Variations::Upc).string_len(64).null())
                .col(
                    ColumnDef::new(Variations::Ordinal)
                        .integer()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Variations::PricingType)
                        .string_len(20)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Variations::PriceMoney)
                        .decimal_len(12, 2)
                        .null(),
                )
                .col(
                    ColumnDef::new(Variations::CostMoney)
                        .decimal_len(12, 2)
                        .null(),
                )
                .col(
                    ColumnDef::new(Variations::TrackInventory)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(
                    ColumnDef::new(Variations::InventoryAlertType)
                        .string_len(32)
                        .null(),
                )
                .col(
                    ColumnDef::new(Variations::InventoryAlertThreshold)
                        .integer()
                        .null(),
                )
                .col(
                    ColumnDef::new(Variations::Sellable)
                        .boolean()
                        .not_null()
                        .default(true),
                )
                .col(
                    ColumnDef::new(Variations::Stockable)
                        .boolean()
                        .not_null()
                        .default(true),
                )
                .col(ColumnDef::new(Variations::ItemOptionValues).json().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_variations_product_id")
                        .from(Variations::Table, Variations::ProductId)
                        .to(Products::Table, Products::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .to_owned();
            timestamps(&mut variations, Variations::CreatedAt, Variations::UpdatedAt);
            manager.create_table(variations).await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_category_id")
                        .table(Products::Table)
                        .col(Products::CategoryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_variation_id")
                        .table(Products::Table)
                        .col(Products::VariationId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_variations_product_id")
                        .table(Variations::Table)
                        .col(Variations::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Variations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000003_create_directory_tables {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_directory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut locations = Table::create()
                .table(Locations::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Locations::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(Locations::Name).string_len(255).not_null())
                .col(ColumnDef::new(Locations::Address).json().null())
                .col(ColumnDef::new(Locations::PhoneNumber).string_len(32).null())
                .col(ColumnDef::new(Locations::TimeZone).string_len(64).null())
                .col(
                    ColumnDef::new(Locations::BusinessName)
                        .string_len(255)
                        .null(),
                )
                .col(
                    ColumnDef::new(Locations::LocationType)
                        .string_len(20)
                        .not_null(),
                )
                .col(ColumnDef::new(Locations::WebsiteUrl).string_len(255).null())
                .col(ColumnDef::new(Locations::BusinessHours).json().not_null())
                .to_owned();
            timestamps(&mut locations, Locations::CreatedAt, Locations::UpdatedAt);
            manager.create_table(locations).await?;

            let mut employees = Table::create()
                .table(Employees::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Employees::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Employees::FirstName)
                        .string_len(255)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Employees::LastName)
                        .string_len(255)
                        .not_null(),
                )
                .col(ColumnDef::new(Employees::Nickname).string_len(255).null())
                .col(
                    ColumnDef::new(Employees::Email)
                        .string_len(255)
                        .null()
                        .unique_key(),
                )
                .col(ColumnDef::new(Employees::PhoneNumber).string_len(32).null())
                .col(ColumnDef::new(Employees::RoleId).string_len(64).null())
                .col(ColumnDef::new(Employees::Status).string_len(20).not_null())
                .to_owned();
            timestamps(&mut employees, Employees::CreatedAt, Employees::UpdatedAt);
            manager.create_table(employees).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Locations::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000004_create_customers_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut customers = Table::create()
                .table(Customers::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Customers::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(Customers::GivenName).string_len(255).null())
                .col(ColumnDef::new(Customers::FamilyName).string_len(255).null())
                .col(
                    ColumnDef::new(Customers::CompanyName)
                        .string_len(255)
                        .null(),
                )
                .col(ColumnDef::new(Customers::Nickname).string_len(255).null())
                .col(
                    ColumnDef::new(Customers::EmailAddress)
                        .string_len(255)
                        .null(),
                )
                .col(ColumnDef::new(Customers::Address).json().null())
                .col(ColumnDef::new(Customers::PhoneNumber).string_len(32).null())
                .col(
                    ColumnDef::new(Customers::ReferenceId)
                        .string_len(255)
                        .null(),
                )
                .col(ColumnDef::new(Customers::GroupId).string_len(64).null())
                .col(ColumnDef::new(Customers::Note).text().null())
                .to_owned();
            timestamps(&mut customers, Customers::CreatedAt, Customers::UpdatedAt);
            manager.create_table(customers).await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_email_address")
                        .table(Customers::Table)
                        .col(Customers::EmailAddress)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000005_create_order_tables {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut orders = Table::create()
                .table(Orders::Table)
                .if_not_exists()
                .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                .col(ColumnDef::new(Orders::ReferenceId).string_len(255).null())
                .col(ColumnDef::new(Orders::BuyerEmail).string_len(255).null())
                .col(ColumnDef::new(Orders::RecipientName).string_len(255).null())
                .col(ColumnDef::new(Orders::RecipientEmail).string_len(255).null())
                .col(ColumnDef::new(Orders::RecipientPhone).string_len(32).null())
                .col(ColumnDef::new(Orders::State).string_len(20).not_null())
                .col(ColumnDef::new(Orders::ShippingAddress).json().null())
                .col(ColumnDef::new(Orders::BillingAddress).json().null())
                .col(ColumnDef::new(Orders::LineItems).json().not_null())
                .col(ColumnDef::new(Orders::Taxes).json().not_null())
                .col(ColumnDef::new(Orders::Discounts).json().not_null())
                .col(ColumnDef::new(Orders::ServiceCharges).json().not_null())
                .col(ColumnDef::new(Orders::Fulfillments).json().not_null())
                .col(ColumnDef::new(Orders::Refunds).json().not_null())
                .col(
                    ColumnDef::new(Orders::ClosedAt)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .to_owned();
            timestamps(&mut orders, Orders::CreatedAt, Orders::UpdatedAt);
            manager.create_table(orders).await?;

            manager
                .create_table(
                    Table::create()
                        .table(Transactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Transactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transactions::OrderId).uuid().not_null())
                        .col(ColumnDef::new(Transactions::LocationId).uuid().not_null())
                        .col(ColumnDef::new(Transactions::CustomerId).uuid().null())
                        .col(ColumnDef::new(Transactions::EmployeeId).uuid().null())
                        .col(ColumnDef::new(Transactions::Tender).json().not_null())
                        .col(
                            ColumnDef::new(Transactions::AmountMoney)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transactions::TipMoney)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Transactions::ProcessingFeeMoney)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Transactions::ClientId).string_len(255).null())
                        .col(
                            ColumnDef::new(Transactions::ReferenceId)
                                .string_len(255)
                                .null(),
                        )
                        .col(ColumnDef::new(Transactions::Product).json().null())
                        .col(
                            ColumnDef::new(Transactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transactions_order_id")
                                .from(Transactions::Table, Transactions::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transactions_location_id")
                                .from(Transactions::Table, Transactions::LocationId)
                                .to(Locations::Table, Locations::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transactions_customer_id")
                                .from(Transactions::Table, Transactions::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transactions_employee_id")
                                .from(Transactions::Table, Transactions::EmployeeId)
                                .to(Employees::Table, Employees::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ItemsSold::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ItemsSold::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ItemsSold::ProductId).uuid().not_null())
                        .col(ColumnDef::new(ItemsSold::OrderId).uuid().not_null())
                        .col(ColumnDef::new(ItemsSold::VariationId).uuid().not_null())
                        .col(
                            ColumnDef::new(ItemsSold::Quantity)
                                .integer()
                                .not_null()
                                .default(0)
                                .check(Expr::col(ItemsSold::Quantity).gte(0)),
                        )
                        .col(ColumnDef::new(ItemsSold::Note).string_len(255).null())
                        .col(
                            ColumnDef::new(ItemsSold::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_items_sold_product_id")
                                .from(ItemsSold::Table, ItemsSold::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_items_sold_order_id")
                                .from(ItemsSold::Table, ItemsSold::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_items_sold_variation_id")
                                .from(ItemsSold::Table, ItemsSold::VariationId)
                                .to(Variations::Table, Variations::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_state")
                        .table(Orders::Table)
                        .col(Orders::State)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transactions_order_id")
                        .table(Transactions::Table)
                        .col(Transactions::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_sold_order_id")
                        .table(ItemsSold::Table)
                        .col(ItemsSold::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ItemsSold::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Transactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000006_create_discounts_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_discounts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut discounts = Table::create()
                .table(Discounts::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Discounts::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(Discounts::Name).string_len(255).not_null())
                .col(
                    ColumnDef::new(Discounts::DiscountType)
                        .string_len(30)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Discounts::AmountMoney)
                        .decimal_len(12, 2)
                        .null(),
                )
                .col(ColumnDef::new(Discounts::Percentage).decimal_len(5, 2).null())
                .col(ColumnDef::new(Discounts::Scope).string_len(20).not_null())
                .col(ColumnDef::new(Discounts::CustomerGroupIds).json().not_null())
                .col(
                    ColumnDef::new(Discounts::StartDate)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .col(
                    ColumnDef::new(Discounts::EndDate)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .to_owned();
            timestamps(&mut discounts, Discounts::CreatedAt, Discounts::UpdatedAt);
            manager.create_table(discounts).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Discounts::Table).to_owned())
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered_and_unique() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(names, sorted);
    }
}
