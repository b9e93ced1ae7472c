//! Embedded schema migrations, applied at startup when `auto_migrate` is set
//! and unconditionally by the test harness.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_catalog_tables::Migration),
            Box::new(m20250301_000002_create_cart_tables::Migration),
            Box::new(m20250301_000003_create_order_tables::Migration),
        ]
    }
}

mod m20250301_000001_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_catalog_tables"
        }
    }

    #[derive(Iden)]
    enum Customers {
        Table,
        Id,
        FirstName,
        LastName,
        Email,
        PasswordHash,
        Phone,
        Address,
        City,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum Categories {
        Table,
        Id,
        Name,
        Slug,
    }

    #[derive(Iden)]
    enum Products {
        Table,
        Id,
        Kind,
        CategoryId,
        Title,
        Slug,
        Description,
        Sizes,
        Colors,
        Brand,
        Collections,
        Price,
        ImageUrl,
        HoverImageUrl,
        Available,
        CreatedAt,
        UpdatedAt,
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Customers::FirstName).string().not_null())
                        .col(ColumnDef::new(Customers::LastName).string().not_null())
                        .col(
                            ColumnDef::new(Customers::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Customers::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Address).text().null())
                        .col(ColumnDef::new(Customers::City).string().null())
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Customers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categories::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Categories::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Categories::Slug)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::Kind).string_len(20).not_null())
                        .col(ColumnDef::new(Products::CategoryId).big_integer().null())
                        .col(ColumnDef::new(Products::Title).string().not_null())
                        .col(
                            ColumnDef::new(Products::Slug)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(ColumnDef::new(Products::Sizes).json().not_null())
                        .col(ColumnDef::new(Products::Colors).json().not_null())
                        .col(ColumnDef::new(Products::Brand).string().null())
                        .col(ColumnDef::new(Products::Collections).json().not_null())
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::ImageUrl).string().null())
                        .col(ColumnDef::new(Products::HoverImageUrl).string().null())
                        .col(
                            ColumnDef::new(Products::Available)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_category")
                                .from(Products::Table, Products::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_products_kind")
                        .table(Products::Table)
                        .col(Products::Kind)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_products_category")
                        .table(Products::Table)
                        .col(Products::CategoryId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000002_create_cart_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_cart_tables"
        }
    }

    #[derive(Iden)]
    enum Carts {
        Table,
        Id,
        CustomerId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum CartItems {
        Table,
        Id,
        CartId,
        Kind,
        ProductId,
        ProductTitle,
        ImageUrl,
        Size,
        Quantity,
        UnitPrice,
        CreatedAt,
        UpdatedAt,
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Carts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Carts::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Carts::CustomerId)
                                .big_integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Carts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Carts::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CartItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CartItems::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(CartItems::CartId).big_integer().not_null())
                        .col(ColumnDef::new(CartItems::Kind).string_len(20).not_null())
                        .col(
                            ColumnDef::new(CartItems::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CartItems::ProductTitle)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(CartItems::ImageUrl)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        // '' when the line has no size; part of the uniqueness
                        // key, so it cannot be NULL
                        .col(
                            ColumnDef::new(CartItems::Size)
                                .string_len(10)
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(CartItems::Quantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(CartItems::UnitPrice)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CartItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CartItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cart_items_cart")
                                .from(CartItems::Table, CartItems::CartId)
                                .to(Carts::Table, Carts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("uq_cart_items_line")
                        .table(CartItems::Table)
                        .col(CartItems::CartId)
                        .col(CartItems::Kind)
                        .col(CartItems::ProductId)
                        .col(CartItems::Size)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CartItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Carts::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000003_create_order_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_order_tables"
        }
    }

    #[derive(Iden)]
    enum Orders {
        Table,
        Id,
        CustomerId,
        FirstName,
        LastName,
        Email,
        Telephone,
        Company,
        Address,
        Apartment,
        City,
        Postcode,
        Country,
        RegionState,
        OrderNotes,
        PaymentMethod,
        LineItems,
        Total,
        CreatedAt,
    }

    #[derive(Iden)]
    enum ContactMessages {
        Table,
        Id,
        Name,
        Email,
        Phone,
        Subject,
        Message,
        IsRead,
        CreatedAt,
    }

    #[derive(Iden)]
    enum WishlistItems {
        Table,
        Id,
        CustomerId,
        Kind,
        ProductId,
        Title,
        Price,
        ImageUrl,
        HoverImageUrl,
        CreatedAt,
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Orders::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Orders::CustomerId).big_integer().not_null())
                        .col(ColumnDef::new(Orders::FirstName).string().not_null())
                        .col(ColumnDef::new(Orders::LastName).string().not_null())
                        .col(ColumnDef::new(Orders::Email).string().not_null())
                        .col(ColumnDef::new(Orders::Telephone).string().not_null().default(""))
                        .col(ColumnDef::new(Orders::Company).string().not_null().default(""))
                        .col(ColumnDef::new(Orders::Address).string().not_null())
                        .col(ColumnDef::new(Orders::Apartment).string().not_null().default(""))
                        .col(ColumnDef::new(Orders::City).string().not_null())
                        .col(ColumnDef::new(Orders::Postcode).string().not_null().default(""))
                        .col(ColumnDef::new(Orders::Country).string().not_null().default(""))
                        .col(ColumnDef::new(Orders::RegionState).string().not_null().default(""))
                        .col(ColumnDef::new(Orders::OrderNotes).text().not_null().default(""))
                        .col(
                            ColumnDef::new(Orders::PaymentMethod)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Orders::LineItems).json().not_null())
                        .col(ColumnDef::new(Orders::Total).decimal_len(10, 2).not_null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_customer")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ContactMessages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ContactMessages::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ContactMessages::Name).string().not_null())
                        .col(ColumnDef::new(ContactMessages::Email).string().not_null())
                        .col(ColumnDef::new(ContactMessages::Phone).string().null())
                        .col(
                            ColumnDef::new(ContactMessages::Subject)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(ContactMessages::Message).text().not_null())
                        .col(
                            ColumnDef::new(ContactMessages::IsRead)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ContactMessages::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WishlistItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WishlistItems::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(WishlistItems::CustomerId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WishlistItems::Kind)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WishlistItems::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WishlistItems::Title)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(WishlistItems::Price)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(WishlistItems::ImageUrl).string().null())
                        .col(ColumnDef::new(WishlistItems::HoverImageUrl).string().null())
                        .col(
                            ColumnDef::new(WishlistItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("uq_wishlist_items_entry")
                        .table(WishlistItems::Table)
                        .col(WishlistItems::CustomerId)
                        .col(WishlistItems::Kind)
                        .col(WishlistItems::ProductId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WishlistItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ContactMessages::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }
}
