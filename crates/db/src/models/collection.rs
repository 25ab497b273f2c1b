use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JsonValue, QueryFilter,
    Set,
};

use crate::{entities::collection, types::DuplicateHandling};

/// Insert record for a collection. Collections are never deleted or
/// updated by the migration engine; a natural-key collision is a skip.
#[derive(Debug, Clone)]
pub struct NewCollection {
    pub name: String,
    pub version: String,
    pub process: Option<String>,
    pub url_path: Option<String>,
    pub duplicate_handling: DuplicateHandling,
    pub granule_id_validation_regex: String,
    pub granule_id_extraction_regex: String,
    pub files: JsonValue,
    pub report_to_ems: bool,
    pub sample_file_name: String,
    pub ignore_files_config_for_discovery: Option<bool>,
    pub meta: Option<JsonValue>,
    pub tags: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct Collection;

impl Collection {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &NewCollection,
    ) -> Result<collection::Model, DbErr> {
        let active = collection::ActiveModel {
            name: Set(data.name.clone()),
            version: Set(data.version.clone()),
            process: Set(data.process.clone()),
            url_path: Set(data.url_path.clone()),
            duplicate_handling: Set(data.duplicate_handling),
            granule_id_validation_regex: Set(data.granule_id_validation_regex.clone()),
            granule_id_extraction_regex: Set(data.granule_id_extraction_regex.clone()),
            files: Set(data.files.clone()),
            report_to_ems: Set(data.report_to_ems),
            sample_file_name: Set(data.sample_file_name.clone()),
            ignore_files_config_for_discovery: Set(data.ignore_files_config_for_discovery),
            meta: Set(data.meta.clone()),
            tags: Set(data.tags.clone()),
            created_at: Set(data.created_at.into()),
            updated_at: Set(data.updated_at.into()),
            ..Default::default()
        };
        active.insert(db).await
    }

    pub async fn find_by_name_version<C: ConnectionTrait>(
        db: &C,
        name: &str,
        version: &str,
    ) -> Result<Option<collection::Model>, DbErr> {
        collection::Entity::find()
            .filter(collection::Column::Name.eq(name))
            .filter(collection::Column::Version.eq(version))
            .one(db)
            .await
    }
}
