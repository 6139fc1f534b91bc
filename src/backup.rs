//! Export and import of an overview
//!
//! An overview travels as a tree: the overview, its categories, and for each
//! category its mappings. Ids in the tree are the ones of the source site;
//! importing translates them through an [IdTranslation] filled by the host.

use std::{collections::HashMap, fmt};
use serde::{Deserialize, Serialize};
use sea_orm::{entity::*, query::*, DatabaseConnection, TransactionTrait};
use crate::db::{
    model::{self, category, mapping, overview},
    controller::{self, category as category_controller},
    IDType,
};
use crate::{log_info, log_warn};

#[derive(Debug)]
pub enum BackupError {
    Controller(controller::Error),
    Serde(serde_json::Error),
}

impl fmt::Display for BackupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupError::Controller(e) => e.fmt(f),
            BackupError::Serde(e) => write!(f, "Malformed backup: {}", e),
        }
    }
}

impl std::error::Error for BackupError {}

impl From<controller::Error> for BackupError {
    fn from(e: controller::Error) -> Self {
        BackupError::Controller(e)
    }
}

impl From<sea_orm::DbErr> for BackupError {
    fn from(e: sea_orm::DbErr) -> Self {
        BackupError::Controller(controller::Error::StoreFailure(e))
    }
}

pub type BackupResult<T> = std::result::Result<T, BackupError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupSettings {
    /// Carry the group mappings
    pub groups: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OverviewBackup {
    pub id: IDType,
    pub name: String,
    pub intro: String,
    pub introformat: i32,
    pub timecreated: i64,
    pub timemodified: i64,
    pub shownameview: bool,
    pub showdescriptionview: bool,
    #[serde(default)]
    pub categories: Vec<CategoryBackup>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CategoryBackup {
    pub id: IDType,
    pub name: String,
    pub description: Option<String>,
    pub timecreated: i64,
    pub timemodified: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<MappingBackup>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MappingBackup {
    pub id: IDType,
    pub groupid: IDType,
    pub timecreated: i64,
    pub timemodified: i64,
}

impl OverviewBackup {
    pub fn to_json(&self) -> BackupResult<String> {
        serde_json::to_string_pretty(self).map_err(BackupError::Serde)
    }
    pub fn from_json(content: &str) -> BackupResult<Self> {
        serde_json::from_str(content).map_err(BackupError::Serde)
    }
}

/// Kinds of ids the translation table knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Overview,
    Category,
    Group,
}

/// Old id → new id, per kind of record
///
/// The host fills in the groups it restored; the import adds the overview and
/// the categories it creates.
#[derive(Debug, Clone, Default)]
pub struct IdTranslation {
    ids: HashMap<(IdKind, IDType), IDType>,
}

impl IdTranslation {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_mapping(&mut self, kind: IdKind, old_id: IDType, new_id: IDType) {
        self.ids.insert((kind, old_id), new_id);
    }
    pub fn get_mapping(&self, kind: IdKind, old_id: IDType) -> Option<IDType> {
        self.ids.get(&(kind, old_id)).copied()
    }
}

/// Builds the export tree of an overview
pub async fn export_overview(db: &DatabaseConnection, overview_id: IDType, settings: BackupSettings) -> BackupResult<OverviewBackup> {
    let overview = controller::overview::get_overview(db, overview_id).await?
        .ok_or(controller::Error::OverviewNotFound(overview_id))?;
    let mut categories = Vec::new();
    for category in category_controller::get_categories(db, overview_id).await? {
        let mappings = if settings.groups {
            model::Mapping::find()
                .filter(mapping::Column::CategoryId.eq(category.id))
                .order_by_asc(mapping::Column::Id)
                .all(db).await?
                .into_iter()
                .map(|mapping| MappingBackup {
                    id: mapping.id,
                    groupid: mapping.group_id,
                    timecreated: mapping.time_created,
                    timemodified: mapping.time_modified,
                })
                .collect()
        } else {
            Vec::new()
        };
        categories.push(CategoryBackup {
            id: category.id,
            name: category.name,
            description: category.description,
            timecreated: category.time_created,
            timemodified: category.time_modified,
            mappings,
        });
    }
    log_info!("Group overview {} exported with {} categories", overview_id, categories.len());
    Ok(OverviewBackup {
        id: overview.id,
        name: overview.name,
        intro: overview.intro,
        introformat: overview.intro_format,
        timecreated: overview.time_created,
        timemodified: overview.time_modified,
        shownameview: overview.show_name_view,
        showdescriptionview: overview.show_description_view,
        categories,
    })
}

/// Recreates an exported overview in a course
///
/// Mappings are restored only with `settings.groups`, and only for groups the
/// translation table knows. Returns the id of the new overview.
pub async fn restore_overview(db: &DatabaseConnection, backup: &OverviewBackup, course_id: IDType, settings: BackupSettings, ids: &mut IdTranslation) -> BackupResult<IDType> {
    let time = crate::db::now();
    let txn = db.begin().await?;
    let overview_id = model::Overview::insert(overview::ActiveModel {
        course: ActiveValue::Set(course_id),
        name: ActiveValue::Set(backup.name.clone()),
        intro: ActiveValue::Set(backup.intro.clone()),
        intro_format: ActiveValue::Set(backup.introformat),
        time_created: ActiveValue::Set(backup.timecreated),
        time_modified: ActiveValue::Set(time),
        show_name_view: ActiveValue::Set(backup.shownameview),
        show_description_view: ActiveValue::Set(backup.showdescriptionview),
        ..Default::default()
    }).exec(&txn).await?.last_insert_id;
    ids.set_mapping(IdKind::Overview, backup.id, overview_id);

    for category in &backup.categories {
        let category_id = model::Category::insert(category::ActiveModel {
            overview_id: ActiveValue::Set(overview_id),
            name: ActiveValue::Set(category.name.clone()),
            description: ActiveValue::Set(category.description.clone()),
            time_created: ActiveValue::Set(category.timecreated),
            time_modified: ActiveValue::Set(time),
            ..Default::default()
        }).exec(&txn).await?.last_insert_id;
        ids.set_mapping(IdKind::Category, category.id, category_id);

        if !settings.groups {
            continue;
        }
        for mapping in &category.mappings {
            let Some(group_id) = ids.get_mapping(IdKind::Group, mapping.groupid) else {
                log_warn!("Group {} was not restored, its mapping to category {} is skipped", mapping.groupid, category.id);
                continue;
            };
            model::Mapping::insert(mapping::ActiveModel {
                category_id: ActiveValue::Set(category_id),
                group_id: ActiveValue::Set(group_id),
                time_created: ActiveValue::Set(mapping.timecreated),
                time_modified: ActiveValue::Set(time),
                ..Default::default()
            }).exec(&txn).await?;
        }
    }
    txn.commit().await?;
    log_info!("Group overview {} restored as {} in course {}", backup.id, overview_id, course_id);
    Ok(overview_id)
}
