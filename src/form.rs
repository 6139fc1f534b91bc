//! Form boundary
//!
//! The host hands submissions over as flat `name=value` pairs, with indexed
//! names such as `mappings[7]` or `categoryname[0]`. They are turned into typed
//! values here, before reaching the controllers.

use std::{collections::BTreeMap, fmt};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use crate::config::Config;
use crate::db::{
    controller::{category::CategorySlot, mapping::{Assignment, DesiredAssignment}, overview::OverviewSettings},
    model::category,
    IDType,
};
use crate::directory::Group;

lazy_static! {
    static ref INDEXED_FIELD: Regex = Regex::new(r"^([a-z]+)\[(\d+)\]$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Field name not understood by the form
    UnknownField(String),
    /// Field value of the wrong type
    BadValue { field: String, value: String },
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::UnknownField(field) => write!(f, "Unknown field {}", field),
            FormError::BadValue { field, value } => write!(f, "Bad value for {}: {:?}", field, value),
        }
    }
}

impl std::error::Error for FormError {}

/// `categoryname[2]` → `("categoryname", "2")`
fn split_indexed(field: &str) -> Option<(&str, &str)> {
    let captures = INDEXED_FIELD.captures(field)?;
    Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
}

fn slot_index(field: &str, index: &str) -> Result<usize, FormError> {
    index.parse().map_err(|_| FormError::UnknownField(field.to_string()))
}

fn parse_id(field: &str, value: &str) -> Result<IDType, FormError> {
    value.trim().parse().map_err(|_| FormError::BadValue { field: field.to_string(), value: value.to_string() })
}

/// `""` and `"0"` both mean "nothing selected"
fn parse_optional_id(field: &str, value: &str) -> Result<Option<IDType>, FormError> {
    match value.trim() {
        "" => Ok(None),
        _ => parse_id(field, value).map(|id| Some(id).filter(|id| *id != 0)),
    }
}

fn parse_checkbox(field: &str, value: &str) -> Result<bool, FormError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" | "" => Ok(false),
        _ => Err(FormError::BadValue { field: field.to_string(), value: value.to_string() }),
    }
}

/// Parses the mapping form: one `mappings[<group id>]=<category id>` per group
///
/// Fields outside `mappings[...]` (buttons, session keys) are ignored.
pub fn parse_mappings<'a, I>(fields: I) -> Result<DesiredAssignment, FormError>
    where I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut desired = DesiredAssignment::new();
    for (field, value) in fields {
        if let Some(("mappings", group)) = split_indexed(field) {
            let group = parse_id(field, group)?;
            desired.insert(group, parse_optional_id(field, value)?);
        }
    }
    Ok(desired)
}

/// Parses the settings form into the overview settings and its category slots
///
/// Slots come out ordered by their index. Missing checkboxes keep the form
/// defaults (checked).
pub fn parse_settings<'a, I>(fields: I) -> Result<(OverviewSettings, Vec<CategorySlot>), FormError>
    where I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut settings = OverviewSettings::new("");
    let mut slots: BTreeMap<usize, CategorySlot> = BTreeMap::new();
    for (field, value) in fields {
        match field {
            "name" => settings.name = value.to_string(),
            "intro" => settings.intro = value.to_string(),
            "introformat" => settings.intro_format = value.trim().parse()
                .map_err(|_| FormError::BadValue { field: field.to_string(), value: value.to_string() })?,
            "shownameview" => settings.show_name_view = parse_checkbox(field, value)?,
            "showdescriptionview" => settings.show_description_view = parse_checkbox(field, value)?,
            _ => match split_indexed(field) {
                Some(("categoryname", index)) => {
                    slots.entry(slot_index(field, index)?).or_default().name = value.to_string();
                }
                Some(("categorydescription", index)) => {
                    slots.entry(slot_index(field, index)?).or_default().description = Some(value.to_string());
                }
                Some(("categoryid", index)) => {
                    let id = parse_optional_id(field, value)?;
                    slots.entry(slot_index(field, index)?).or_default().id = id;
                }
                Some(("mappings", _)) => return Err(FormError::UnknownField(field.to_string())),
                // Host fields (course module settings, buttons)
                _ => (),
            },
        }
    }
    Ok((settings, slots.into_values().collect()))
}

/// Slots shown by the settings form
///
/// One per existing category followed by blank ones; a new overview only gets
/// blank slots.
pub fn settings_slots(categories: &[category::Model], config: &Config) -> Vec<CategorySlot> {
    let blanks = if categories.is_empty() {
        config.new_category_slots
    } else {
        config.extra_category_slots
    };
    let mut ordered: Vec<&category::Model> = categories.iter().collect();
    ordered.sort_by_key(|category| category.id);
    ordered.into_iter()
        .map(|category| CategorySlot {
            id: Some(category.id),
            name: category.name.clone(),
            description: category.description.clone(),
        })
        .chain(std::iter::repeat_with(CategorySlot::default).take(blanks))
        .collect()
}

/// Select field of the mapping form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingChoice {
    /// `mappings[<group id>]`
    pub field: String,
    pub group_id: IDType,
    pub label: String,
    pub selected: Option<IDType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOption {
    pub id: IDType,
    pub name: String,
}

/// What the mapping form displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingForm {
    /// Set when the course has no group yet
    pub no_groups_warning: bool,
    pub options: Vec<CategoryOption>,
    pub choices: Vec<MappingChoice>,
}

/// Mapping form prefilled with the stored assignment
pub fn mapping_form(groups: &[Group], categories: &[category::Model], existing: &Assignment) -> MappingForm {
    MappingForm {
        no_groups_warning: groups.is_empty(),
        options: categories.iter()
            .map(|category| CategoryOption { id: category.id, name: category.name.clone() })
            .collect(),
        choices: groups.iter()
            .map(|group| MappingChoice {
                field: format!("mappings[{}]", group.id),
                group_id: group.id,
                label: group.name.clone(),
                selected: existing.get(&group.id).copied(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: IDType, name: &str) -> category::Model {
        category::Model {
            id,
            overview_id: 1,
            name: name.to_string(),
            description: None,
            time_created: 0,
            time_modified: 0,
        }
    }

    #[test]
    fn mappings_form() {
        let desired = parse_mappings(vec![
            ("mappings[7]", "11"),
            ("mappings[8]", "10"),
            ("mappings[9]", "0"),
            ("mappings[12]", ""),
            ("submitbutton", "Save changes"),
            ("sesskey", "abc"),
        ]).unwrap();
        assert_eq!(desired, vec![(7, Some(11)), (8, Some(10)), (9, None), (12, None)].into_iter().collect());
    }
    #[test]
    fn mappings_bad_value() {
        let res = parse_mappings(vec![("mappings[7]", "lab")]);
        assert_eq!(res, Err(FormError::BadValue { field: "mappings[7]".to_string(), value: "lab".to_string() }));
    }
    #[test]
    fn settings_form() {
        let (settings, slots) = parse_settings(vec![
            ("name", "Projects"),
            ("intro", "<p>Pick one</p>"),
            ("introformat", "1"),
            ("shownameview", "0"),
            ("categoryname[1]", "Theory"),
            ("categoryid[1]", "0"),
            ("categoryname[0]", "Lab"),
            ("categorydescription[0]", "Room 2"),
            ("categoryid[0]", "5"),
            ("categoryname[2]", ""),
            ("visible", "1"),
        ]).unwrap();
        assert_eq!(settings.name, "Projects");
        assert!(!settings.show_name_view);
        assert!(settings.show_description_view);
        assert_eq!(slots, vec![
            CategorySlot::existing(5, "Lab").with_description("Room 2"),
            CategorySlot::new("Theory"),
            CategorySlot::new(""),
        ]);
    }
    #[test]
    fn settings_bad_checkbox() {
        assert!(parse_settings(vec![("shownameview", "maybe")]).is_err());
        assert!(parse_settings(vec![("mappings[1]", "2")]).is_err());
    }
    #[test]
    fn slots_for_new_and_existing() {
        let config = Config::new("sqlite::memory:");
        assert_eq!(settings_slots(&[], &config), vec![CategorySlot::default(); 4]);
        let slots = settings_slots(&[category(6, "Theory"), category(5, "Lab")], &config);
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0], CategorySlot::existing(5, "Lab"));
        assert_eq!(slots[1], CategorySlot::existing(6, "Theory"));
        assert!(slots[2].is_blank() && slots[2].id.is_none());
    }
    #[test]
    fn mapping_form_prefill() {
        let groups = vec![
            Group { id: 7, course_id: 3, name: "Team A".to_string(), description: None },
            Group { id: 8, course_id: 3, name: "Team B".to_string(), description: None },
        ];
        let existing: Assignment = vec![(7, 10)].into_iter().collect();
        let form = mapping_form(&groups, &[category(10, "Lab")], &existing);
        assert!(!form.no_groups_warning);
        assert_eq!(form.choices[0].field, "mappings[7]");
        assert_eq!(form.choices[0].selected, Some(10));
        assert_eq!(form.choices[1].selected, None);
        assert!(mapping_form(&[], &[], &Assignment::new()).no_groups_warning);
    }
}
