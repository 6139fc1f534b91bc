use sea_orm::entity::prelude::*;

use crate::db::IDType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "groupoverview_categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: IDType,
    /// Overview the category belongs to
    #[sea_orm(column_name = "groupoverviewid")]
    pub overview_id: IDType,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_name = "timecreated")]
    pub time_created: i64,
    #[sea_orm(column_name = "timemodified")]
    pub time_modified: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation 
{
    #[sea_orm(
        belongs_to = "super::overview::Entity",
        from = "Column::OverviewId",
        to = "super::overview::Column::Id"
    )]
    Overview,
    #[sea_orm(has_many = "super::mapping::Entity")]
    Mappings,
}

impl Related<super::overview::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Overview.def()
    }
}
impl Related<super::mapping::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mappings.def()
    }
}

impl ActiveModelBehavior for ActiveModel 
{}
