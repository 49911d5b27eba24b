use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum SecondPhaseKeys {
    Table,
    Id,
    SessionId,
    KeyValue,
    ValidUntil,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AttendanceSessions {
    Table,
    Id,
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010002_create_second_phase_keys"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SecondPhaseKeys::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SecondPhaseKeys::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SecondPhaseKeys::SessionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SecondPhaseKeys::KeyValue)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SecondPhaseKeys::ValidUntil)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SecondPhaseKeys::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_second_phase_key_session")
                            .from(SecondPhaseKeys::Table, SecondPhaseKeys::SessionId)
                            .to(AttendanceSessions::Table, AttendanceSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_second_phase_keys_valid_until")
                    .table(SecondPhaseKeys::Table)
                    .col(SecondPhaseKeys::ValidUntil)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SecondPhaseKeys::Table).to_owned())
            .await
    }
}
