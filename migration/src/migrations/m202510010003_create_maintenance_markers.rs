use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum MaintenanceMarkers {
    Table,
    Name,
    LastRunAt,
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010003_create_maintenance_markers"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceMarkers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MaintenanceMarkers::Name)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceMarkers::LastRunAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MaintenanceMarkers::Table).to_owned())
            .await
    }
}
