use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Collections::Table)
                    .col(pk_id_col(manager, Collections::Id))
                    .col(ColumnDef::new(Collections::Name).string().not_null())
                    .col(ColumnDef::new(Collections::Version).string().not_null())
                    .col(ColumnDef::new(Collections::Process).string())
                    .col(ColumnDef::new(Collections::UrlPath).string())
                    .col(
                        ColumnDef::new(Collections::DuplicateHandling)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("error")),
                    )
                    .col(
                        ColumnDef::new(Collections::GranuleIdValidationRegex)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Collections::GranuleIdExtractionRegex)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Collections::Files).json().not_null())
                    .col(
                        ColumnDef::new(Collections::ReportToEms)
                            .boolean()
                            .not_null()
                            .default(Expr::val(true)),
                    )
                    .col(
                        ColumnDef::new(Collections::SampleFileName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Collections::IgnoreFilesConfigForDiscovery).boolean())
                    .col(ColumnDef::new(Collections::Meta).json())
                    .col(ColumnDef::new(Collections::Tags).json())
                    .col(timestamp_col(Collections::CreatedAt))
                    .col(timestamp_col(Collections::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_collections_name_version")
                    .table(Collections::Table)
                    .col(Collections::Name)
                    .col(Collections::Version)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Providers::Table)
                    .col(pk_id_col(manager, Providers::Id))
                    .col(ColumnDef::new(Providers::Name).string().not_null())
                    .col(
                        ColumnDef::new(Providers::Protocol)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("http")),
                    )
                    .col(ColumnDef::new(Providers::Host).string().not_null())
                    .col(ColumnDef::new(Providers::Port).integer())
                    .col(ColumnDef::new(Providers::Username).string())
                    .col(ColumnDef::new(Providers::Password).string())
                    .col(ColumnDef::new(Providers::Encrypted).boolean())
                    .col(ColumnDef::new(Providers::GlobalConnectionLimit).integer())
                    .col(ColumnDef::new(Providers::PrivateKey).string())
                    .col(ColumnDef::new(Providers::CmKeyId).string())
                    .col(ColumnDef::new(Providers::CertificateUri).string())
                    .col(timestamp_col(Providers::CreatedAt))
                    .col(timestamp_col(Providers::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_providers_name")
                    .table(Providers::Table)
                    .col(Providers::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(AsyncOperations::Table)
                    .col(pk_id_col(manager, AsyncOperations::Id))
                    .col(
                        ColumnDef::new(AsyncOperations::ExternalId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AsyncOperations::Description)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AsyncOperations::OperationType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AsyncOperations::Status)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AsyncOperations::Output).json())
                    .col(ColumnDef::new(AsyncOperations::TaskArn).string())
                    .col(timestamp_col(AsyncOperations::CreatedAt))
                    .col(timestamp_col(AsyncOperations::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_async_operations_external_id")
                    .table(AsyncOperations::Table)
                    .col(AsyncOperations::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Rules::Table)
                    .col(pk_id_col(manager, Rules::Id))
                    .col(ColumnDef::new(Rules::Name).string().not_null())
                    .col(ColumnDef::new(Rules::Workflow).string().not_null())
                    .col(
                        ColumnDef::new(Rules::Enabled)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(ColumnDef::new(Rules::RuleType).string_len(32).not_null())
                    .col(ColumnDef::new(Rules::Value).string())
                    .col(ColumnDef::new(Rules::Arn).string())
                    .col(ColumnDef::new(Rules::LogEventArn).string())
                    .col(ColumnDef::new(Rules::ExecutionNamePrefix).string())
                    .col(ColumnDef::new(Rules::Payload).json())
                    .col(ColumnDef::new(Rules::Meta).json())
                    .col(ColumnDef::new(Rules::Tags).json())
                    .col(ColumnDef::new(Rules::QueueUrl).string())
                    .col(fk_id_nullable_col(manager, Rules::CollectionId))
                    .col(fk_id_nullable_col(manager, Rules::ProviderId))
                    .col(timestamp_col(Rules::CreatedAt))
                    .col(timestamp_col(Rules::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rules_collection_id")
                            .from(Rules::Table, Rules::CollectionId)
                            .to(Collections::Table, Collections::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rules_provider_id")
                            .from(Rules::Table, Rules::ProviderId)
                            .to(Providers::Table, Providers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_rules_name")
                    .table(Rules::Table)
                    .col(Rules::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Executions::Table)
                    .col(pk_id_col(manager, Executions::Id))
                    .col(ColumnDef::new(Executions::Arn).string().not_null())
                    .col(ColumnDef::new(Executions::WorkflowName).string())
                    .col(ColumnDef::new(Executions::Url).string())
                    .col(
                        ColumnDef::new(Executions::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("unknown")),
                    )
                    .col(ColumnDef::new(Executions::OriginalPayload).json())
                    .col(ColumnDef::new(Executions::FinalPayload).json())
                    .col(ColumnDef::new(Executions::Error).json())
                    .col(ColumnDef::new(Executions::Tasks).json())
                    .col(ColumnDef::new(Executions::Duration).double())
                    .col(ColumnDef::new(Executions::PlatformVersion).string())
                    .col(ColumnDef::new(Executions::Timestamp).timestamp())
                    .col(fk_id_nullable_col(manager, Executions::ParentId))
                    .col(fk_id_nullable_col(manager, Executions::CollectionId))
                    .col(fk_id_nullable_col(manager, Executions::AsyncOperationId))
                    .col(timestamp_col(Executions::CreatedAt))
                    .col(timestamp_col(Executions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_executions_parent_id")
                            .from(Executions::Table, Executions::ParentId)
                            .to(Executions::Table, Executions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_executions_collection_id")
                            .from(Executions::Table, Executions::CollectionId)
                            .to(Collections::Table, Collections::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_executions_async_operation_id")
                            .from(Executions::Table, Executions::AsyncOperationId)
                            .to(AsyncOperations::Table, AsyncOperations::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_executions_arn")
                    .table(Executions::Table)
                    .col(Executions::Arn)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_executions_parent_id")
                    .table(Executions::Table)
                    .col(Executions::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Granules::Table)
                    .col(pk_id_col(manager, Granules::Id))
                    .col(ColumnDef::new(Granules::GranuleId).string().not_null())
                    .col(ColumnDef::new(Granules::Status).string_len(32))
                    .col(fk_id_nullable_col(manager, Granules::CollectionId))
                    .col(timestamp_col(Granules::CreatedAt))
                    .col(timestamp_col(Granules::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_granules_collection_id")
                            .from(Granules::Table, Granules::CollectionId)
                            .to(Collections::Table, Collections::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_granules_granule_id")
                    .table(Granules::Table)
                    .col(Granules::GranuleId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(GranuleExecutions::Table)
                    .col(pk_id_col(manager, GranuleExecutions::Id))
                    .col(fk_id_col(manager, GranuleExecutions::GranuleId))
                    .col(fk_id_col(manager, GranuleExecutions::ExecutionId))
                    .col(timestamp_col(GranuleExecutions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_granule_executions_granule_id")
                            .from(GranuleExecutions::Table, GranuleExecutions::GranuleId)
                            .to(Granules::Table, Granules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_granule_executions_execution_id")
                            .from(GranuleExecutions::Table, GranuleExecutions::ExecutionId)
                            .to(Executions::Table, Executions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_granule_executions_granule_execution")
                    .table(GranuleExecutions::Table)
                    .col(GranuleExecutions::GranuleId)
                    .col(GranuleExecutions::ExecutionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GranuleExecutions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Granules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Executions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AsyncOperations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Providers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Collections::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn fk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().to_owned()
}

fn fk_id_nullable_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Collections {
    Table,
    Id,
    Name,
    Version,
    Process,
    UrlPath,
    DuplicateHandling,
    GranuleIdValidationRegex,
    GranuleIdExtractionRegex,
    Files,
    ReportToEms,
    SampleFileName,
    IgnoreFilesConfigForDiscovery,
    Meta,
    Tags,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Providers {
    Table,
    Id,
    Name,
    Protocol,
    Host,
    Port,
    Username,
    Password,
    Encrypted,
    GlobalConnectionLimit,
    PrivateKey,
    CmKeyId,
    CertificateUri,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AsyncOperations {
    Table,
    Id,
    ExternalId,
    Description,
    OperationType,
    Status,
    Output,
    TaskArn,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Rules {
    Table,
    Id,
    Name,
    Workflow,
    Enabled,
    RuleType,
    Value,
    Arn,
    LogEventArn,
    ExecutionNamePrefix,
    Payload,
    Meta,
    Tags,
    QueueUrl,
    CollectionId,
    ProviderId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Executions {
    Table,
    Id,
    Arn,
    WorkflowName,
    Url,
    Status,
    OriginalPayload,
    FinalPayload,
    Error,
    Tasks,
    Duration,
    PlatformVersion,
    Timestamp,
    ParentId,
    CollectionId,
    AsyncOperationId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Granules {
    Table,
    Id,
    GranuleId,
    Status,
    CollectionId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum GranuleExecutions {
    Table,
    Id,
    GranuleId,
    ExecutionId,
    CreatedAt,
}
