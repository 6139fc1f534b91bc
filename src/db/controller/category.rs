use crate::db::{
    model::{self, category, mapping, overview},
    controller::{Error, Result},
    IDType,
};
use crate::directory::{Group, GroupDirectory};
use crate::{log_info, log_warn};
use sea_orm::{entity::*, query::*, ConnectionTrait};

/// One category line of the settings form
///
/// `id` is set when the slot was prefilled from an existing category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySlot {
    pub id: Option<IDType>,
    pub name: String,
    pub description: Option<String>,
}

impl CategorySlot {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    pub fn existing<S: Into<String>>(id: IDType, name: S) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            ..Default::default()
        }
    }
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }
    /// Name as stored, surrounding blanks removed
    pub fn name(&self) -> &str {
        self.name.trim()
    }
    pub fn is_blank(&self) -> bool {
        self.name().is_empty()
    }
    fn description(&self) -> Option<String> {
        self.description.as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryChange {
    Created(IDType),
    Updated(IDType),
    Deleted(IDType),
}

/// A category and the groups mapped to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryWithGroups {
    pub category: category::Model,
    pub groups: Vec<Group>,
}

/// Fails with [Error::MissingCategory] unless a slot carries a name
pub fn require_named_slot(slots: &[CategorySlot]) -> Result<()> {
    if slots.iter().all(CategorySlot::is_blank) {
        return Err(Error::MissingCategory);
    }
    Ok(())
}

pub async fn get_categories<C: ConnectionTrait>(db: &C, overview_id: IDType) -> Result<Vec<category::Model>> {
    model::Category::find()
        .filter(category::Column::OverviewId.eq(overview_id))
        .order_by_asc(category::Column::Id)
        .all(db).await
        .map_err(Error::StoreFailure)
}

pub async fn find_category<C: ConnectionTrait>(db: &C, category_id: IDType) -> Result<Option<category::Model>> {
    model::Category::find_by_id(category_id)
        .one(db).await
        .map_err(Error::StoreFailure)
}

async fn add_category<C: ConnectionTrait>(db: &C, overview_id: IDType, slot: &CategorySlot, time: i64) -> Result<IDType> {
    let active_model = category::ActiveModel {
        overview_id: ActiveValue::Set(overview_id),
        name: ActiveValue::Set(slot.name().to_string()),
        description: ActiveValue::Set(slot.description()),
        time_created: ActiveValue::Set(time),
        time_modified: ActiveValue::Set(time),
        ..Default::default()
    };
    let res = model::Category::insert(active_model).exec(db).await.map_err(Error::StoreFailure)?;
    log_info!("Category {} created in group overview {}", res.last_insert_id, overview_id);
    Ok(res.last_insert_id)
}

async fn update_category<C: ConnectionTrait>(db: &C, category_id: IDType, slot: &CategorySlot, time: i64) -> Result<()> {
    let active_model = category::ActiveModel {
        id: ActiveValue::Unchanged(category_id),
        name: ActiveValue::Set(slot.name().to_string()),
        description: ActiveValue::Set(slot.description()),
        time_modified: ActiveValue::Set(time),
        ..Default::default()
    };
    active_model.update(db).await.map_err(Error::StoreFailure)?;
    log_info!("Category {} updated", category_id);
    Ok(())
}

/// Deletes the categories and every mapping pointing to them
pub async fn delete_categories_and_their_mappings<C: ConnectionTrait>(db: &C, category_ids: &[IDType]) -> Result<()> {
    if category_ids.is_empty() {
        return Ok(());
    }
    let res = model::Mapping::delete_many()
        .filter(mapping::Column::CategoryId.is_in(category_ids.iter().copied()))
        .exec(db).await
        .map_err(Error::StoreFailure)?;
    log_info!("{} mapping(s) removed with their categories", res.rows_affected);
    model::Category::delete_many()
        .filter(category::Column::Id.is_in(category_ids.iter().copied()))
        .exec(db).await
        .map_err(Error::StoreFailure)?;
    log_info!("Categories {:?} removed", category_ids);
    Ok(())
}

/// Creates, renames or removes categories from the settings form slots
///
/// Slot ids must already be known to belong to the overview.
pub(crate) async fn apply_slots<C: ConnectionTrait>(db: &C, overview_id: IDType, slots: &[CategorySlot], time: i64) -> Result<Vec<CategoryChange>> {
    let mut changes = Vec::new();
    for slot in slots {
        match (slot.id, slot.is_blank()) {
            (None, false) => {
                let id = add_category(db, overview_id, slot, time).await?;
                changes.push(CategoryChange::Created(id));
            }
            (Some(id), false) => {
                update_category(db, id, slot, time).await?;
                changes.push(CategoryChange::Updated(id));
            }
            (Some(id), true) => {
                delete_categories_and_their_mappings(db, &[id]).await?;
                changes.push(CategoryChange::Deleted(id));
            }
            (None, true) => (),
        }
    }
    Ok(changes)
}

/// Groups mapped to a category, ordered by group id
///
/// Mappings whose group is no longer in the course are dropped from the
/// result and removed from the store. The removal is best effort: a failure
/// is only logged.
pub async fn get_groups_in_category<C, G>(db: &C, groups: &G, course_id: IDType, category_id: IDType) -> Result<Vec<Group>>
    where C: ConnectionTrait, G: GroupDirectory,
{
    let mappings = model::Mapping::find()
        .filter(mapping::Column::CategoryId.eq(category_id))
        .order_by_asc(mapping::Column::GroupId)
        .all(db).await
        .map_err(Error::StoreFailure)?;
    let mut found = Vec::with_capacity(mappings.len());
    for mapping in mappings {
        match groups.find_group(course_id, mapping.group_id).await? {
            Some(group) => found.push(group),
            None => remove_orphan(db, course_id, mapping.group_id).await,
        }
    }
    Ok(found)
}

/// Removes the mappings of a group from every overview of the course
async fn remove_orphan<C: ConnectionTrait>(db: &C, course_id: IDType, group_id: IDType) {
    match delete_group_mappings(db, course_id, group_id).await {
        Ok(count) => log_info!("Group {} no longer exists in course {}, {} mapping(s) removed", group_id, course_id, count),
        Err(e) => log_warn!("Unable to remove the mappings of deleted group {}: {}", group_id, e),
    }
}

async fn delete_group_mappings<C: ConnectionTrait>(db: &C, course_id: IDType, group_id: IDType) -> std::result::Result<u64, sea_orm::DbErr> {
    let categories: Vec<IDType> = model::Category::find()
        .inner_join(model::Overview)
        .filter(overview::Column::Course.eq(course_id))
        .all(db).await?
        .into_iter()
        .map(|category| category.id)
        .collect();
    let res = model::Mapping::delete_many()
        .filter(mapping::Column::GroupId.eq(group_id))
        .filter(mapping::Column::CategoryId.is_in(categories))
        .exec(db).await?;
    Ok(res.rows_affected)
}

/// Categories of an overview, each with the groups mapped to it
pub async fn get_categories_with_groups<C, G>(db: &C, groups: &G, overview_id: IDType) -> Result<Vec<CategoryWithGroups>>
    where C: ConnectionTrait, G: GroupDirectory,
{
    let Some(overview) = model::Overview::find_by_id(overview_id).one(db).await.map_err(Error::StoreFailure)? else {
        return Ok(Vec::new());
    };
    let categories = get_categories(db, overview_id).await?;
    let mut result = Vec::with_capacity(categories.len());
    for category in categories {
        let mapped = get_groups_in_category(db, groups, overview.course, category.id).await?;
        result.push(CategoryWithGroups { category, groups: mapped });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_slots_are_missing_category() {
        let slots = vec![CategorySlot::new("  "), CategorySlot::existing(3, "")];
        assert!(matches!(require_named_slot(&slots), Err(Error::MissingCategory)));
        assert!(matches!(require_named_slot(&[]), Err(Error::MissingCategory)));
        let slots = vec![CategorySlot::new(""), CategorySlot::new(" Lab ")];
        assert!(require_named_slot(&slots).is_ok());
    }
    #[test]
    fn slot_trimming() {
        let slot = CategorySlot::new(" Lab ").with_description("  ");
        assert_eq!(slot.name(), "Lab");
        assert_eq!(slot.description(), None);
        let slot = slot.with_description(" Room 2 ");
        assert_eq!(slot.description().as_deref(), Some("Room 2"));
    }
}
