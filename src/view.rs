//! Template data of the overview pages
use serde::Serialize;
use sea_orm::ConnectionTrait;
use crate::db::{
    controller::{self, category::{self, CategoryWithGroups}, Result},
    model::overview,
    IDType,
};
use crate::directory::GroupDirectory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupEntry {
    pub id: IDType,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryEntry {
    pub id: IDType,
    pub name: String,
    pub description: Option<String>,
    /// Tab opened when the page loads
    pub active: bool,
    pub groups: Vec<GroupEntry>,
}

/// The view page of an overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewPage {
    pub course: IDType,
    /// Heading, when the overview shows its name
    pub heading: Option<String>,
    /// Description, when the overview shows it
    pub intro: Option<String>,
    pub categories: Vec<CategoryEntry>,
}

impl OverviewPage {
    pub fn new(overview: &overview::Model, categories: Vec<CategoryWithGroups>) -> Self {
        let categories = categories.into_iter()
            .enumerate()
            .map(|(index, entry)| CategoryEntry {
                id: entry.category.id,
                name: entry.category.name,
                description: entry.category.description,
                active: index == 0,
                groups: entry.groups.into_iter()
                    .map(|group| GroupEntry { id: group.id, name: group.name })
                    .collect(),
            })
            .collect();
        Self {
            course: overview.course,
            heading: Some(overview.name.clone()).filter(|_| overview.show_name_view),
            intro: Some(overview.intro.clone()).filter(|_| overview.show_description_view),
            categories,
        }
    }
    pub async fn build<C, G>(db: &C, groups: &G, overview_id: IDType) -> Result<Self>
        where C: ConnectionTrait, G: GroupDirectory,
    {
        let overview = controller::overview::get_overview(db, overview_id).await?
            .ok_or(controller::Error::OverviewNotFound(overview_id))?;
        let categories = category::get_categories_with_groups(db, groups, overview_id).await?;
        Ok(Self::new(&overview, categories))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub id: IDType,
    pub name: String,
    pub intro: String,
    pub time_modified: i64,
}

/// Instances of a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseIndex {
    pub course: IDType,
    pub instances: Vec<IndexEntry>,
}

impl CourseIndex {
    pub async fn build<C: ConnectionTrait>(db: &C, course_id: IDType) -> Result<Self> {
        let instances = controller::overview::list_instances(db, course_id).await?
            .into_iter()
            .map(|overview| IndexEntry {
                id: overview.id,
                name: overview.name,
                intro: overview.intro,
                time_modified: overview.time_modified,
            })
            .collect();
        Ok(Self { course: course_id, instances })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::model::category as category_model;
    use crate::directory::Group;

    fn overview(show_name: bool, show_description: bool) -> overview::Model {
        overview::Model {
            id: 1,
            course: 3,
            name: "Projects".to_string(),
            intro: "<p>Pick one</p>".to_string(),
            intro_format: 1,
            time_created: 0,
            time_modified: 0,
            show_name_view: show_name,
            show_description_view: show_description,
        }
    }
    fn entry(id: IDType, name: &str, groups: Vec<Group>) -> CategoryWithGroups {
        CategoryWithGroups {
            category: category_model::Model {
                id,
                overview_id: 1,
                name: name.to_string(),
                description: None,
                time_created: 0,
                time_modified: 0,
            },
            groups,
        }
    }

    #[test]
    fn first_category_active() {
        let team = Group { id: 7, course_id: 3, name: "Team A".to_string(), description: None };
        let page = OverviewPage::new(&overview(true, false), vec![entry(10, "Lab", vec![team]), entry(11, "Theory", vec![])]);
        assert_eq!(page.heading.as_deref(), Some("Projects"));
        assert_eq!(page.intro, None);
        assert!(page.categories[0].active);
        assert!(!page.categories[1].active);
        assert_eq!(page.categories[0].groups, vec![GroupEntry { id: 7, name: "Team A".to_string() }]);
    }
    #[test]
    fn hidden_name_shown_description() {
        let page = OverviewPage::new(&overview(false, true), vec![]);
        assert_eq!(page.heading, None);
        assert_eq!(page.intro.as_deref(), Some("<p>Pick one</p>"));
        assert!(page.categories.is_empty());
    }
}
