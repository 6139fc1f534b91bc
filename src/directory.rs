//! Lookups of the course groups
//!
//! Groups belong to the host course subsystem. The overview only keeps their
//! ids, so every read of a group goes through a [GroupDirectory].

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use crate::db::{
    controller::{Error, Result},
    model::course::group,
    IDType,
};

pub use group::Model as Group;

#[allow(async_fn_in_trait)]
pub trait GroupDirectory {
    /// Every group of the course, ordered by id
    async fn course_groups(&self, course_id: IDType) -> Result<Vec<Group>>;
    /// A group of the course by id, `None` once it has been deleted or moved
    /// out of the course
    async fn find_group(&self, course_id: IDType, group_id: IDType) -> Result<Option<Group>>;
}

/// [GroupDirectory] reading the host `groups` table
pub struct CourseGroups<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CourseGroups<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }
}

impl<'a, C: ConnectionTrait> GroupDirectory for CourseGroups<'a, C> {
    async fn course_groups(&self, course_id: IDType) -> Result<Vec<Group>> {
        group::Entity::find()
            .filter(group::Column::CourseId.eq(course_id))
            .order_by_asc(group::Column::Id)
            .all(self.db).await
            .map_err(Error::StoreFailure)
    }
    async fn find_group(&self, course_id: IDType, group_id: IDType) -> Result<Option<Group>> {
        group::Entity::find_by_id(group_id)
            .filter(group::Column::CourseId.eq(course_id))
            .one(self.db).await
            .map_err(Error::StoreFailure)
    }
}
