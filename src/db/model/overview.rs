use sea_orm::entity::prelude::*;

use crate::db::IDType;

/// One group overview activity instance
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "groupoverview")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: IDType,
    /// Course owning the instance
    pub course: IDType,
    pub name: String,
    /// Description, rich text
    #[sea_orm(column_type = "Text")]
    pub intro: String,
    #[sea_orm(column_name = "introformat")]
    pub intro_format: i32,
    #[sea_orm(column_name = "timecreated")]
    pub time_created: i64,
    #[sea_orm(column_name = "timemodified")]
    pub time_modified: i64,
    /// Display the name as heading of the view page
    #[sea_orm(column_name = "shownameview")]
    pub show_name_view: bool,
    /// Display the description on the view page
    #[sea_orm(column_name = "showdescriptionview")]
    pub show_description_view: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::category::Entity")]
    Categories,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel 
{}
