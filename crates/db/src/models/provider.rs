use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};

use crate::{entities::provider, types::ProviderProtocol};

/// Insert record for a provider. Credential fields must already be
/// ciphertext under the target scheme by the time they reach this layer;
/// re-encryption happens in the migration pipeline.
#[derive(Debug, Clone)]
pub struct NewProvider {
    pub name: String,
    pub protocol: ProviderProtocol,
    pub host: String,
    pub port: Option<i32>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub encrypted: Option<bool>,
    pub global_connection_limit: Option<i32>,
    pub private_key: Option<String>,
    pub cm_key_id: Option<String>,
    pub certificate_uri: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct Provider;

impl Provider {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &NewProvider,
    ) -> Result<provider::Model, DbErr> {
        let active = provider::ActiveModel {
            name: Set(data.name.clone()),
            protocol: Set(data.protocol),
            host: Set(data.host.clone()),
            port: Set(data.port),
            username: Set(data.username.clone()),
            password: Set(data.password.clone()),
            encrypted: Set(data.encrypted),
            global_connection_limit: Set(data.global_connection_limit),
            private_key: Set(data.private_key.clone()),
            cm_key_id: Set(data.cm_key_id.clone()),
            certificate_uri: Set(data.certificate_uri.clone()),
            created_at: Set(data.created_at.into()),
            updated_at: Set(data.updated_at.into()),
            ..Default::default()
        };
        active.insert(db).await
    }

    pub async fn find_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<provider::Model>, DbErr> {
        provider::Entity::find()
            .filter(provider::Column::Name.eq(name))
            .one(db)
            .await
    }
}
