//! Foreign-key resolution with a schema guard.
//!
//! Every resolver first probes the live schema for the surrogate-id column
//! it is about to populate; a missing column means the target store has not
//! been migrated far enough for this step and the record fails with an
//! operational `ColumnDoesNotExist` rather than a data error.

use db::models::ids;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DbErr,
    sea_query::{Alias, Expr, ExprTrait, Func, Query},
};

use crate::error::Error;

/// Probes the live schema for a column: `pragma_table_info` on SQLite,
/// `information_schema.columns` everywhere else.
pub async fn column_exists<C: ConnectionTrait>(
    db: &C,
    table: &str,
    column: &str,
) -> Result<bool, DbErr> {
    let probe = match db.get_database_backend() {
        DatabaseBackend::Sqlite => Query::select()
            .column(Alias::new("name"))
            .from_function(
                Func::cust(Alias::new("pragma_table_info")).arg(table),
                Alias::new("table_info"),
            )
            .and_where(Expr::col(Alias::new("name")).eq(column))
            .to_owned(),
        _ => Query::select()
            .column(Alias::new("column_name"))
            .from((Alias::new("information_schema"), Alias::new("columns")))
            .and_where(Expr::col(Alias::new("table_name")).eq(table))
            .and_where(Expr::col(Alias::new("column_name")).eq(column))
            .to_owned(),
    };
    Ok(db.query_one(&probe).await?.is_some())
}

/// Resolves natural-key references for records destined for one target
/// table. Absent references skip resolution entirely.
pub struct FkResolver<'a, C> {
    db: &'a C,
    table: &'static str,
}

impl<'a, C: ConnectionTrait> FkResolver<'a, C> {
    pub fn new(db: &'a C, table: &'static str) -> Self {
        Self { db, table }
    }

    async fn guard(&self, column: &'static str) -> Result<(), Error> {
        if column_exists(self.db, self.table, column).await? {
            Ok(())
        } else {
            Err(Error::ColumnDoesNotExist {
                table: self.table,
                column,
            })
        }
    }

    pub async fn collection(
        &self,
        reference: Option<&(String, String)>,
    ) -> Result<Option<i64>, Error> {
        let Some((name, version)) = reference else {
            return Ok(None);
        };
        self.guard("collection_id").await?;
        ids::collection_id_by_name_version(self.db, name, version)
            .await?
            .map(Some)
            .ok_or_else(|| {
                Error::RecordDoesNotExist(format!(
                    "Collection '{name}' version '{version}' has not been migrated"
                ))
            })
    }

    pub async fn provider(&self, reference: Option<&str>) -> Result<Option<i64>, Error> {
        let Some(name) = reference else {
            return Ok(None);
        };
        self.guard("provider_id").await?;
        ids::provider_id_by_name(self.db, name)
            .await?
            .map(Some)
            .ok_or_else(|| {
                Error::RecordDoesNotExist(format!("Provider '{name}' has not been migrated"))
            })
    }

    pub async fn async_operation(&self, reference: Option<&str>) -> Result<Option<i64>, Error> {
        let Some(external_id) = reference else {
            return Ok(None);
        };
        self.guard("async_operation_id").await?;
        ids::async_operation_id_by_external_id(self.db, external_id)
            .await?
            .map(Some)
            .ok_or_else(|| {
                Error::RecordDoesNotExist(format!(
                    "Async operation '{external_id}' has not been migrated"
                ))
            })
    }
}
