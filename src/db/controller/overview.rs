use std::collections::BTreeSet;
use crate::db::{
    model::{self, overview},
    controller::{category::{self, CategoryChange, CategorySlot}, Error, Result, SettingsError},
    IDType,
};
use crate::log_info;
use sea_orm::{entity::*, query::*, ConnectionTrait, DatabaseConnection, TransactionTrait};

/// Longest accepted overview name, in characters
pub const NAME_MAX_LENGTH: usize = 255;

/// Settings of an overview, as edited in the settings form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewSettings {
    pub name: String,
    pub intro: String,
    pub intro_format: i32,
    pub show_name_view: bool,
    pub show_description_view: bool,
}

impl OverviewSettings {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            intro: String::new(),
            intro_format: 1,
            show_name_view: true,
            show_description_view: true,
        }
    }
    pub fn validate(&self) -> std::result::Result<(), SettingsError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SettingsError::MissingName);
        }
        let len = name.chars().count();
        if len > NAME_MAX_LENGTH {
            return Err(SettingsError::NameTooLong(len));
        }
        Ok(())
    }
}

fn check_submission(settings: &OverviewSettings, slots: &[CategorySlot]) -> Result<()> {
    settings.validate().map_err(Error::InvalidSettings)?;
    category::require_named_slot(slots)
}

pub async fn get_overview<C: ConnectionTrait>(db: &C, overview_id: IDType) -> Result<Option<overview::Model>> {
    model::Overview::find_by_id(overview_id)
        .one(db).await
        .map_err(Error::StoreFailure)
}

/// Instances of a course, ordered by id
pub async fn list_instances<C: ConnectionTrait>(db: &C, course_id: IDType) -> Result<Vec<overview::Model>> {
    model::Overview::find()
        .filter(overview::Column::Course.eq(course_id))
        .order_by_asc(overview::Column::Id)
        .all(db).await
        .map_err(Error::StoreFailure)
}

/// Creates an overview and the categories of its named slots
pub async fn add_instance(db: &DatabaseConnection, course_id: IDType, settings: &OverviewSettings, slots: &[CategorySlot]) -> Result<IDType> {
    check_submission(settings, slots)?;
    log_info!("Adding group overview to course {}", course_id);
    let time = crate::db::now();
    let txn = db.begin().await.map_err(Error::StoreFailure)?;
    let active_model = overview::ActiveModel {
        course: ActiveValue::Set(course_id),
        name: ActiveValue::Set(settings.name.trim().to_string()),
        intro: ActiveValue::Set(settings.intro.clone()),
        intro_format: ActiveValue::Set(settings.intro_format),
        time_created: ActiveValue::Set(time),
        time_modified: ActiveValue::Set(time),
        show_name_view: ActiveValue::Set(settings.show_name_view),
        show_description_view: ActiveValue::Set(settings.show_description_view),
        ..Default::default()
    };
    let overview_id = model::Overview::insert(active_model).exec(&txn).await.map_err(Error::StoreFailure)?.last_insert_id;
    // A new instance has no category yet, prefilled ids are meaningless
    let slots: Vec<CategorySlot> = slots.iter()
        .map(|slot| CategorySlot { id: None, ..slot.clone() })
        .collect();
    category::apply_slots(&txn, overview_id, &slots, time).await?;
    txn.commit().await.map_err(Error::StoreFailure)?;
    log_info!("Group overview {} saved", overview_id);
    Ok(overview_id)
}

/// Saves the settings form of an existing overview
///
/// Every slot id must be a category of this overview and appear in one slot
/// only, otherwise nothing is written.
pub async fn update_instance(db: &DatabaseConnection, overview_id: IDType, settings: &OverviewSettings, slots: &[CategorySlot]) -> Result<Vec<CategoryChange>> {
    check_submission(settings, slots)?;
    if get_overview(db, overview_id).await?.is_none() {
        return Err(Error::OverviewNotFound(overview_id));
    }
    let known: Vec<IDType> = category::get_categories(db, overview_id).await?
        .into_iter()
        .map(|category| category.id)
        .collect();
    let mut seen = BTreeSet::new();
    for id in slots.iter().filter_map(|slot| slot.id) {
        if !known.contains(&id) {
            return Err(Error::InvalidCategoryReference(id));
        }
        if !seen.insert(id) {
            return Err(Error::DuplicateCategoryReference(id));
        }
    }

    let time = crate::db::now();
    let txn = db.begin().await.map_err(Error::StoreFailure)?;
    let changes = category::apply_slots(&txn, overview_id, slots, time).await?;
    let active_model = overview::ActiveModel {
        id: ActiveValue::Unchanged(overview_id),
        name: ActiveValue::Set(settings.name.trim().to_string()),
        intro: ActiveValue::Set(settings.intro.clone()),
        intro_format: ActiveValue::Set(settings.intro_format),
        time_modified: ActiveValue::Set(time),
        show_name_view: ActiveValue::Set(settings.show_name_view),
        show_description_view: ActiveValue::Set(settings.show_description_view),
        ..Default::default()
    };
    active_model.update(&txn).await.map_err(Error::StoreFailure)?;
    txn.commit().await.map_err(Error::StoreFailure)?;
    log_info!("Group overview {} updated, {} category change(s)", overview_id, changes.len());
    Ok(changes)
}

/// Deletes an overview with its categories and their mappings
///
/// Returns `false` when there is no such overview.
pub async fn delete_instance(db: &DatabaseConnection, overview_id: IDType) -> Result<bool> {
    log_info!("Removing group overview {}", overview_id);
    let txn = db.begin().await.map_err(Error::StoreFailure)?;
    if get_overview(&txn, overview_id).await?.is_none() {
        return Ok(false);
    }
    let categories: Vec<IDType> = category::get_categories(&txn, overview_id).await?
        .into_iter()
        .map(|category| category.id)
        .collect();
    category::delete_categories_and_their_mappings(&txn, &categories).await?;
    model::Overview::delete_by_id(overview_id).exec(&txn).await.map_err(Error::StoreFailure)?;
    txn.commit().await.map_err(Error::StoreFailure)?;
    log_info!("Group overview {} removed", overview_id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_validation() {
        assert_eq!(OverviewSettings::new("Projects").validate(), Ok(()));
        assert_eq!(OverviewSettings::new("   ").validate(), Err(SettingsError::MissingName));
        assert_eq!(OverviewSettings::new("é".repeat(255)).validate(), Ok(()));
        assert_eq!(OverviewSettings::new("a".repeat(256)).validate(), Err(SettingsError::NameTooLong(256)));
    }
    #[test]
    fn name_checked_before_categories() {
        let res = check_submission(&OverviewSettings::new(""), &[]);
        assert!(matches!(res, Err(Error::InvalidSettings(SettingsError::MissingName))));
        let res = check_submission(&OverviewSettings::new("Projects"), &[CategorySlot::new(" ")]);
        assert!(matches!(res, Err(Error::MissingCategory)));
    }
}
