//! Create application table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Application::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Application::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Application::StudentId).string_len(32).not_null())
                    .col(ColumnDef::new(Application::ListingId).string_len(32).not_null())
                    .col(ColumnDef::new(Application::CoverLetter).text().not_null())
                    .col(ColumnDef::new(Application::Resume).string_len(1024))
                    .col(ColumnDef::new(Application::Transcript).string_len(1024))
                    .col(ColumnDef::new(Application::EndorsementLetter).string_len(1024))
                    .col(
                        ColumnDef::new(Application::Status)
                            .string_len(20)
                            .not_null()
                            .default("applied"),
                    )
                    .col(
                        ColumnDef::new(Application::AppliedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Application::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Application::InterviewDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Application::InterviewNotes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Application::FinalFeedback)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_application_student")
                            .from(Application::Table, Application::StudentId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_application_listing")
                            .from(Application::Table, Application::ListingId)
                            .to(Listing::Table, Listing::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (student_id, listing_id), non-unique; withdrawn and
        // rejected rows are reactivated in place
        manager
            .create_index(
                Index::create()
                    .name("idx_application_student_listing")
                    .table(Application::Table)
                    .col(Application::StudentId)
                    .col(Application::ListingId)
                    .to_owned(),
            )
            .await?;

        // Index: (listing_id, status) (closed-listing fan-out, company counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_application_listing_status")
                    .table(Application::Table)
                    .col(Application::ListingId)
                    .col(Application::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Application::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Application {
    Table,
    Id,
    StudentId,
    ListingId,
    CoverLetter,
    Resume,
    Transcript,
    EndorsementLetter,
    Status,
    AppliedAt,
    UpdatedAt,
    InterviewDate,
    InterviewNotes,
    FinalFeedback,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Listing {
    Table,
    Id,
}
