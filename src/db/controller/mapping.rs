//! Group → category mappings of an overview
//!
//! A submission is validated as a whole, diffed against what is stored, and
//! only the differences are written, in one transaction.

use std::collections::{BTreeMap, BTreeSet};
use crate::db::{
    model::{self, mapping},
    controller::{category, Error, MappingViolation, Result, Violations},
    IDType,
};
use crate::directory::GroupDirectory;
use crate::util::MultiResult;
use crate::{log_info, log_warn};
use sea_orm::{entity::*, query::*, ConnectionTrait, DatabaseConnection, TransactionTrait};

/// Stored assignment: group id → category id
pub type Assignment = BTreeMap<IDType, IDType>;
/// Submitted assignment: group id → category id, `None` for "no category"
pub type DesiredAssignment = BTreeMap<IDType, Option<IDType>>;

/// A write the reconciliation decided on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingOp {
    Create { group: IDType, category: IDType },
    Update { group: IDType, from: IDType, to: IDType },
    Delete { group: IDType, category: IDType },
}

/// A write that went through the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingWrite {
    Created { id: IDType, group: IDType, category: IDType, time_created: i64, time_modified: i64 },
    Updated { id: IDType, group: IDType, from: IDType, to: IDType, time_modified: i64 },
    Deleted { id: IDType, group: IDType, category: IDType },
}

impl MappingWrite {
    pub fn group(&self) -> IDType {
        match *self {
            MappingWrite::Created { group, .. }
            | MappingWrite::Updated { group, .. }
            | MappingWrite::Deleted { group, .. } => group,
        }
    }
}

/// An entry of a valid submission that could not be written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFailure {
    /// The group would move from a category of one overview to another overview
    CrossOverviewMove {
        group: IDType,
        from: IDType,
        from_overview: Option<IDType>,
        to: IDType,
        to_overview: Option<IDType>,
    },
    /// The stored mapping to update or delete is not there anymore
    MissingMapping { group: IDType, category: IDType },
    /// The group to map already sits in a category of the overview
    AlreadyMapped { group: IDType, category: IDType },
}

impl EntryFailure {
    pub fn group(&self) -> IDType {
        match *self {
            EntryFailure::CrossOverviewMove { group, .. }
            | EntryFailure::MissingMapping { group, .. }
            | EntryFailure::AlreadyMapped { group, .. } => group,
        }
    }
}

pub type Plan = MultiResult<MappingOp, EntryFailure>;
pub type Reconciliation = MultiResult<MappingWrite, EntryFailure>;

/// Checks every submitted entry against the course groups and the overview categories
///
/// All the violations are collected, an empty map means the submission is valid.
pub fn validate(course_groups: &BTreeSet<IDType>, categories: &BTreeSet<IDType>, desired: &DesiredAssignment) -> Violations {
    let mut violations = Violations::new();
    for (&group, &category) in desired {
        let mut errors = Vec::new();
        if !course_groups.contains(&group) {
            errors.push(MappingViolation::InvalidGroupReference(group));
        }
        if let Some(category) = category {
            if !categories.contains(&category) {
                errors.push(MappingViolation::InvalidCategoryReference(category));
            }
        }
        if !errors.is_empty() {
            violations.insert(group, errors);
        }
    }
    violations
}

/// Minimal set of writes turning `existing` into `desired`
///
/// `overview_of` resolves the overview owning a category. Groups absent from
/// `desired` are left as they are.
pub fn diff<F>(desired: &DesiredAssignment, existing: &Assignment, overview_of: F) -> Plan
    where F: Fn(IDType) -> Option<IDType>,
{
    let mut plan = Plan::new();
    for (&group, &wanted) in desired {
        match (existing.get(&group).copied(), wanted) {
            (None, Some(category)) => plan.push_ok(MappingOp::Create { group, category }),
            (None, None) => (),
            (Some(category), None) => plan.push_ok(MappingOp::Delete { group, category }),
            (Some(from), Some(to)) if from == to => (),
            (Some(from), Some(to)) => {
                let from_overview = overview_of(from);
                let to_overview = overview_of(to);
                if from_overview.is_some() && from_overview == to_overview {
                    plan.push_ok(MappingOp::Update { group, from, to });
                } else {
                    plan.push_err(EntryFailure::CrossOverviewMove { group, from, from_overview, to, to_overview });
                }
            }
        }
    }
    plan
}

/// Stored assignment of an overview
///
/// Reads through [category::get_groups_in_category], so mappings of deleted
/// groups are cleaned up on the way.
pub async fn get_mappings<C, G>(db: &C, groups: &G, overview_id: IDType) -> Result<Assignment>
    where C: ConnectionTrait, G: GroupDirectory,
{
    let mut assignment = Assignment::new();
    for entry in category::get_categories_with_groups(db, groups, overview_id).await? {
        for group in entry.groups {
            assignment.insert(group.id, entry.category.id);
        }
    }
    Ok(assignment)
}

/// Validates a submission and plans its writes, without writing anything
pub async fn plan_mappings<C, G>(db: &C, groups: &G, course_id: IDType, overview_id: IDType, desired: &DesiredAssignment, existing: &Assignment) -> Result<Plan>
    where C: ConnectionTrait, G: GroupDirectory,
{
    let course_groups: BTreeSet<IDType> = groups.course_groups(course_id).await?
        .into_iter()
        .map(|group| group.id)
        .collect();
    let mut owners: BTreeMap<IDType, IDType> = category::get_categories(db, overview_id).await?
        .into_iter()
        .map(|category| (category.id, category.overview_id))
        .collect();
    let categories: BTreeSet<IDType> = owners.keys().copied().collect();

    let violations = validate(&course_groups, &categories, desired);
    if !violations.is_empty() {
        log_warn!("Mapping submission for group overview {} rejected, {} invalid entries", overview_id, violations.len());
        return Err(Error::InvalidMappings(violations));
    }

    // Previous categories may belong to another overview
    let foreign: Vec<IDType> = desired.keys()
        .filter_map(|group| existing.get(group))
        .filter(|category| !owners.contains_key(category))
        .copied()
        .collect();
    if !foreign.is_empty() {
        let found = model::Category::find()
            .filter(model::category::Column::Id.is_in(foreign))
            .all(db).await
            .map_err(Error::StoreFailure)?;
        owners.extend(found.into_iter().map(|category| (category.id, category.overview_id)));
    }

    Ok(diff(desired, existing, |category| owners.get(&category).copied()))
}

/// Brings the stored mappings of an overview in line with a submission
///
/// The submission is rejected with [Error::InvalidMappings] when any entry is
/// invalid, nothing is written then. Entries that cannot be applied are
/// reported as [EntryFailure]s next to the applied writes. Writes share one
/// timestamp and one transaction.
///
/// `existing` may be stale: every write checks the stored rows first.
pub async fn save_mappings<G: GroupDirectory>(db: &DatabaseConnection, groups: &G, course_id: IDType, overview_id: IDType, desired: &DesiredAssignment, existing: &Assignment) -> Result<Reconciliation> {
    let (ops, failures) = plan_mappings(db, groups, course_id, overview_id, desired, existing).await?.extract();
    let mut result = Reconciliation::new();
    for failure in failures {
        log_warn!("Mapping of group {} not saved: {:?}", failure.group(), failure);
        result.push_err(failure);
    }
    if ops.is_empty() {
        return Ok(result);
    }

    let categories: Vec<IDType> = category::get_categories(db, overview_id).await?
        .into_iter()
        .map(|category| category.id)
        .collect();
    let time = crate::db::now();
    let txn = db.begin().await.map_err(Error::StoreFailure)?;
    for op in ops {
        let applied = apply(&txn, &categories, op, time).await?;
        if let Err(failure) = &applied {
            log_warn!("Mapping of group {} not saved: {:?}", failure.group(), failure);
        }
        result.push(applied);
    }
    txn.commit().await.map_err(Error::StoreFailure)?;
    Ok(result)
}

/// [save_mappings] against the currently stored assignment
pub async fn submit_mappings<G: GroupDirectory>(db: &DatabaseConnection, groups: &G, course_id: IDType, overview_id: IDType, desired: &DesiredAssignment) -> Result<Reconciliation> {
    let existing = get_mappings(db, groups, overview_id).await?;
    save_mappings(db, groups, course_id, overview_id, desired, &existing).await
}

/// Stored mapping of a group in one of `categories`
async fn find_mapping<C: ConnectionTrait>(db: &C, group: IDType, categories: &[IDType]) -> Result<Option<mapping::Model>> {
    model::Mapping::find()
        .filter(mapping::Column::GroupId.eq(group))
        .filter(mapping::Column::CategoryId.is_in(categories.iter().copied()))
        .one(db).await
        .map_err(Error::StoreFailure)
}

/// Writes one operation, `categories` being those of the edited overview
async fn apply<C: ConnectionTrait>(db: &C, categories: &[IDType], op: MappingOp, time: i64) -> Result<std::result::Result<MappingWrite, EntryFailure>> {
    match op {
        MappingOp::Create { group, category } => {
            if let Some(stored) = find_mapping(db, group, categories).await? {
                return Ok(Err(EntryFailure::AlreadyMapped { group, category: stored.category_id }));
            }
            let active_model = mapping::ActiveModel {
                category_id: ActiveValue::Set(category),
                group_id: ActiveValue::Set(group),
                time_created: ActiveValue::Set(time),
                time_modified: ActiveValue::Set(time),
                ..Default::default()
            };
            let res = model::Mapping::insert(active_model).exec(db).await.map_err(Error::StoreFailure)?;
            log_info!("Mapping {} created: group {} in category {}", res.last_insert_id, group, category);
            Ok(Ok(MappingWrite::Created { id: res.last_insert_id, group, category, time_created: time, time_modified: time }))
        }
        MappingOp::Update { group, from, to } => {
            let Some(stored) = find_mapping(db, group, &[from]).await? else {
                return Ok(Err(EntryFailure::MissingMapping { group, category: from }));
            };
            let id = stored.id;
            let mut active_model: mapping::ActiveModel = stored.into();
            active_model.category_id = ActiveValue::Set(to);
            active_model.time_modified = ActiveValue::Set(time);
            active_model.update(db).await.map_err(Error::StoreFailure)?;
            log_info!("Mapping {} updated: group {} moved from category {} to {}", id, group, from, to);
            Ok(Ok(MappingWrite::Updated { id, group, from, to, time_modified: time }))
        }
        MappingOp::Delete { group, category } => {
            let Some(stored) = find_mapping(db, group, &[category]).await? else {
                return Ok(Err(EntryFailure::MissingMapping { group, category }));
            };
            model::Mapping::delete_by_id(stored.id).exec(db).await.map_err(Error::StoreFailure)?;
            log_info!("Mapping {} removed: group {} left category {}", stored.id, group, category);
            Ok(Ok(MappingWrite::Deleted { id: stored.id, group, category }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desired(entries: &[(IDType, Option<IDType>)]) -> DesiredAssignment {
        entries.iter().copied().collect()
    }
    fn existing(entries: &[(IDType, IDType)]) -> Assignment {
        entries.iter().copied().collect()
    }
    /// Categories 10 and 11 in overview 1, 20 in overview 2
    fn owner(category: IDType) -> Option<IDType> {
        match category {
            10 | 11 => Some(1),
            20 => Some(2),
            _ => None,
        }
    }

    #[test]
    fn empty_existing_creates_everything() {
        let plan = diff(&desired(&[(7, Some(10)), (8, Some(11)), (9, None)]), &Assignment::new(), owner);
        assert!(!plan.has_err());
        assert_eq!(plan.oks(), &[
            MappingOp::Create { group: 7, category: 10 },
            MappingOp::Create { group: 8, category: 11 },
        ]);
    }
    #[test]
    fn unchanged_is_no_write() {
        let plan = diff(&desired(&[(7, Some(10)), (8, Some(11))]), &existing(&[(7, 10), (8, 11)]), owner);
        assert_eq!(plan, Plan::new());
    }
    #[test]
    fn update_and_create() {
        let plan = diff(&desired(&[(7, Some(11)), (8, Some(10))]), &existing(&[(7, 10)]), owner);
        assert_eq!(plan.oks(), &[
            MappingOp::Update { group: 7, from: 10, to: 11 },
            MappingOp::Create { group: 8, category: 10 },
        ]);
    }
    #[test]
    fn no_category_deletes() {
        let plan = diff(&desired(&[(7, None), (8, None)]), &existing(&[(7, 10)]), owner);
        assert_eq!(plan.oks(), &[MappingOp::Delete { group: 7, category: 10 }]);
    }
    #[test]
    fn absent_groups_untouched() {
        let plan = diff(&desired(&[(8, Some(10))]), &existing(&[(7, 10), (8, 10)]), owner);
        assert_eq!(plan, Plan::new());
    }
    #[test]
    fn cross_overview_move_rejected() {
        let plan = diff(&desired(&[(7, Some(10)), (8, Some(11))]), &existing(&[(7, 20), (8, 10)]), owner);
        assert_eq!(plan.oks(), &[MappingOp::Update { group: 8, from: 10, to: 11 }]);
        assert_eq!(plan.errs(), &[EntryFailure::CrossOverviewMove {
            group: 7, from: 20, from_overview: Some(2), to: 10, to_overview: Some(1),
        }]);
    }
    #[test]
    fn unknown_previous_category_rejected() {
        let plan = diff(&desired(&[(7, Some(10))]), &existing(&[(7, 99)]), owner);
        assert!(plan.oks().is_empty());
        assert_eq!(plan.errs()[0].group(), 7);
    }
    #[test]
    fn validation_collects_everything() {
        let groups: BTreeSet<IDType> = [7, 8].into_iter().collect();
        let categories: BTreeSet<IDType> = [10, 11].into_iter().collect();
        let violations = validate(&groups, &categories, &desired(&[(7, Some(10)), (8, Some(20)), (9, Some(30)), (12, None)]));
        assert_eq!(violations.len(), 3);
        assert!(!violations.contains_key(&7));
        assert_eq!(violations[&8], vec![MappingViolation::InvalidCategoryReference(20)]);
        assert_eq!(violations[&9], vec![
            MappingViolation::InvalidGroupReference(9),
            MappingViolation::InvalidCategoryReference(30),
        ]);
        assert_eq!(violations[&12], vec![MappingViolation::InvalidGroupReference(12)]);
    }
}
