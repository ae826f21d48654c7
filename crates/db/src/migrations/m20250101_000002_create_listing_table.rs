//! Create listing table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Listing::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Listing::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Listing::CompanyId).string_len(32).not_null())
                    .col(ColumnDef::new(Listing::Title).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Listing::OjtType)
                            .string_len(20)
                            .not_null()
                            .default("required"),
                    )
                    .col(
                        ColumnDef::new(Listing::RequiredHours)
                            .integer()
                            .not_null()
                            .default(500),
                    )
                    .col(
                        ColumnDef::new(Listing::DurationWeeks)
                            .integer()
                            .not_null()
                            .default(10),
                    )
                    .col(
                        ColumnDef::new(Listing::WorkSetup)
                            .string_len(20)
                            .not_null()
                            .default("onsite"),
                    )
                    .col(ColumnDef::new(Listing::Location).string_len(200).not_null())
                    .col(ColumnDef::new(Listing::Description).text().not_null())
                    .col(ColumnDef::new(Listing::Responsibilities).text().not_null())
                    .col(ColumnDef::new(Listing::LearningOutcomes).text().not_null())
                    .col(
                        ColumnDef::new(Listing::CourseRequirement)
                            .string_len(10)
                            .not_null()
                            .default("all"),
                    )
                    .col(
                        ColumnDef::new(Listing::YearLevelRequirement)
                            .integer()
                            .not_null()
                            .default(4),
                    )
                    .col(
                        ColumnDef::new(Listing::SkillsRequired)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Listing::SlotsAvailable)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Listing::Allowance).decimal_len(10, 2))
                    .col(
                        ColumnDef::new(Listing::HasAllowance)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Listing::StartDate).date().not_null())
                    .col(ColumnDef::new(Listing::EndDate).date().not_null())
                    .col(ColumnDef::new(Listing::ApplicationDeadline).date().not_null())
                    .col(
                        ColumnDef::new(Listing::Status)
                            .string_len(20)
                            .not_null()
                            .default("open"),
                    )
                    .col(
                        ColumnDef::new(Listing::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Listing::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listing_company")
                            .from(Listing::Table, Listing::CompanyId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (company_id, status) (company dashboards and listing management)
        manager
            .create_index(
                Index::create()
                    .name("idx_listing_company_status")
                    .table(Listing::Table)
                    .col(Listing::CompanyId)
                    .col(Listing::Status)
                    .to_owned(),
            )
            .await?;

        // Index: (status, created_at) (public browsing of open listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_listing_status_created_at")
                    .table(Listing::Table)
                    .col(Listing::Status)
                    .col(Listing::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Listing::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Listing {
    Table,
    Id,
    CompanyId,
    Title,
    OjtType,
    RequiredHours,
    DurationWeeks,
    WorkSetup,
    Location,
    Description,
    Responsibilities,
    LearningOutcomes,
    CourseRequirement,
    YearLevelRequirement,
    SkillsRequired,
    SlotsAvailable,
    Allowance,
    HasAllowance,
    StartDate,
    EndDate,
    ApplicationDeadline,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
