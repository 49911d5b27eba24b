use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum AttendanceSessions {
    Table,
    Id,
    CourseId,
    TeacherId,
    Title,
    SessionDate,
    StartTime,
    DurationMinutes,
    Status,
    IsActive,
    ClosedAt,
    CreatedAt,
    UpdatedAt,
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010001_create_attendance_sessions"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AttendanceSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceSessions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::TeacherId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::Title)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    // Local wall-clock date/time; the offset is applied by the engine.
                    .col(
                        ColumnDef::new(AttendanceSessions::SessionDate)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::StartTime)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::DurationMinutes)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::Status)
                            .string_len(16)
                            .not_null()
                            .default("future"),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::ClosedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .to_owned(),
            )
            .await?;

        // The maintenance pass only ever reads open, not-yet-expired rows.
        manager
            .create_index(
                Index::create()
                    .name("idx_att_sess_status_closed")
                    .table(AttendanceSessions::Table)
                    .col(AttendanceSessions::Status)
                    .col(AttendanceSessions::ClosedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AttendanceSessions::Table).to_owned())
            .await
    }
}
