use std::time::Duration;

use sea_orm::{ConnectOptions, Database};
pub use sea_orm::{DatabaseConnection, DbErr};

pub mod entities;
pub mod models;
pub mod types;

#[derive(Clone)]
pub struct DbService {
    pub conn: DatabaseConnection,
}

impl DbService {
    pub async fn connect(database_url: &str) -> Result<DbService, DbErr> {
        let mut options = ConnectOptions::new(database_url);
        options
            .max_connections(5)
            .connect_timeout(Duration::from_secs(30))
            .sqlx_logging(false);
        let conn = Database::connect(options).await?;
        Ok(DbService { conn })
    }

    /// Closes the underlying pool. Consumes the service so no handle can
    /// outlive the connection.
    pub async fn close(self) -> Result<(), DbErr> {
        self.conn.close().await
    }
}
