//! Initial schema: every collection, its foreign keys and the unique user email.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::DisplayName).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("employee"),
                    )
                    .col(
                        ColumnDef::new(Users::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Users::LastActiveAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Clients::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Clients::LegalName).string().not_null())
                    .col(ColumnDef::new(Clients::AddressLine1).string())
                    .col(ColumnDef::new(Clients::AddressLine2).string())
                    .col(ColumnDef::new(Clients::City).string())
                    .col(ColumnDef::new(Clients::State).string())
                    .col(ColumnDef::new(Clients::PostalCode).string())
                    .col(ColumnDef::new(Clients::Country).string())
                    .col(ColumnDef::new(Clients::ContactName).string())
                    .col(ColumnDef::new(Clients::ContactEmail).string())
                    .col(ColumnDef::new(Clients::ContactPhone).string())
                    .col(
                        ColumnDef::new(Clients::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Clients::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Brands::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Brands::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Brands::Name).string().not_null())
                    .col(ColumnDef::new(Brands::Description).text())
                    .col(ColumnDef::new(Brands::LogoUrl).string())
                    .col(
                        ColumnDef::new(Brands::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Jobs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Jobs::Title).string().not_null())
                    .col(ColumnDef::new(Jobs::JobNumber).string())
                    .col(ColumnDef::new(Jobs::SiteAddress).string())
                    .col(ColumnDef::new(Jobs::SiteCity).string())
                    .col(ColumnDef::new(Jobs::SiteState).string())
                    .col(ColumnDef::new(Jobs::SitePostalCode).string())
                    .col(ColumnDef::new(Jobs::BrandId).uuid())
                    .col(ColumnDef::new(Jobs::ClientId).uuid().not_null())
                    .col(ColumnDef::new(Jobs::ProjectManagerId).uuid())
                    .col(ColumnDef::new(Jobs::CreatorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Jobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Jobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Jobs::Table, Jobs::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Jobs::Table, Jobs::BrandId)
                            .to(Brands::Table, Brands::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Jobs::Table, Jobs::ProjectManagerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Jobs::Table, Jobs::CreatorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Signs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Signs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Signs::BrandId).uuid().not_null())
                    .col(ColumnDef::new(Signs::Name).string().not_null())
                    .col(ColumnDef::new(Signs::ImageName).string())
                    .col(ColumnDef::new(Signs::ImageUrl).string())
                    .col(ColumnDef::new(Signs::Multipliers).json().not_null())
                    .col(
                        ColumnDef::new(Signs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Signs::Table, Signs::BrandId)
                            .to(Brands::Table, Brands::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SignOptions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SignOptions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SignOptions::SignId).uuid().not_null())
                    .col(ColumnDef::new(SignOptions::Name).string().not_null())
                    .col(
                        ColumnDef::new(SignOptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(SignOptions::Table, SignOptions::SignId)
                            .to(Signs::Table, Signs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OptionValues::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OptionValues::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(OptionValues::OptionId).uuid().not_null())
                    .col(ColumnDef::new(OptionValues::Value).string().not_null())
                    .col(
                        ColumnDef::new(OptionValues::PriceDelta)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(OptionValues::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OptionValues::Table, OptionValues::OptionId)
                            .to(SignOptions::Table, SignOptions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PricingLines::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PricingLines::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PricingLines::JobId).uuid().not_null())
                    .col(ColumnDef::new(PricingLines::SignId).uuid().not_null())
                    .col(
                        ColumnDef::new(PricingLines::Quantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(PricingLines::UnitPrice).double().not_null())
                    .col(ColumnDef::new(PricingLines::UnitCost).double().not_null())
                    .col(ColumnDef::new(PricingLines::Budget).double().not_null())
                    .col(ColumnDef::new(PricingLines::Description).text())
                    .col(
                        ColumnDef::new(PricingLines::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PricingLines::Table, PricingLines::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PricingLines::Table, PricingLines::SignId)
                            .to(Signs::Table, Signs::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_client_id")
                    .table(Jobs::Table)
                    .col(Jobs::ClientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_signs_brand_id")
                    .table(Signs::Table)
                    .col(Signs::BrandId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sign_options_sign_id")
                    .table(SignOptions::Table)
                    .col(SignOptions::SignId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_option_values_option_id")
                    .table(OptionValues::Table)
                    .col(OptionValues::OptionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pricing_lines_job_id")
                    .table(PricingLines::Table)
                    .col(PricingLines::JobId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PricingLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OptionValues::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SignOptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Signs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Brands::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    DisplayName,
    Email,
    Role,
    Status,
    LastActiveAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
    LegalName,
    AddressLine1,
    AddressLine2,
    City,
    State,
    PostalCode,
    Country,
    ContactName,
    ContactEmail,
    ContactPhone,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Brands {
    Table,
    Id,
    Name,
    Description,
    LogoUrl,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
    Title,
    JobNumber,
    SiteAddress,
    SiteCity,
    SiteState,
    SitePostalCode,
    BrandId,
    ClientId,
    ProjectManagerId,
    CreatorId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Signs {
    Table,
    Id,
    BrandId,
    Name,
    ImageName,
    ImageUrl,
    Multipliers,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SignOptions {
    Table,
    Id,
    SignId,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OptionValues {
    Table,
    Id,
    OptionId,
    Value,
    PriceDelta,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PricingLines {
    Table,
    Id,
    JobId,
    SignId,
    Quantity,
    UnitPrice,
    UnitCost,
    Budget,
    Description,
    CreatedAt,
}
