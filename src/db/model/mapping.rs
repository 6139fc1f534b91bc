use sea_orm::entity::prelude::*;

use crate::db::IDType;

/// Assignment of a course group to a category
///
/// The group is owned by the host course and is only referenced by id: no
/// foreign key is declared on it, it can disappear under our feet.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "groupoverview_mappings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: IDType,
    #[sea_orm(column_name = "categoryid")]
    pub category_id: IDType,
    #[sea_orm(column_name = "groupid")]
    pub group_id: IDType,
    #[sea_orm(column_name = "timecreated")]
    pub time_created: i64,
    #[sea_orm(column_name = "timemodified")]
    pub time_modified: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel 
{}
