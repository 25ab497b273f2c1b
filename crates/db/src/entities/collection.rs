use sea_orm::{JsonValue, entity::prelude::*};

use crate::types::DuplicateHandling;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "collections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
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
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
