pub mod overview;
pub mod category;
pub mod mapping;

use std::{collections::BTreeMap, fmt};
use crate::db::IDType;

/// Why a submitted group → category entry was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingViolation {
    /// The group is not part of the course
    InvalidGroupReference(IDType),
    /// The category is not part of the overview being edited
    InvalidCategoryReference(IDType),
}

impl fmt::Display for MappingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingViolation::InvalidGroupReference(group) => write!(f, "Group ID {} is not part of this course.", group),
            MappingViolation::InvalidCategoryReference(_) => write!(f, "Selected category is not valid."),
        }
    }
}

/// Violations per group id, all of them, for the presentation layer
pub type Violations = BTreeMap<IDType, Vec<MappingViolation>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    MissingName,
    NameTooLong(usize),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::MissingName => write!(f, "The name is required."),
            SettingsError::NameTooLong(len) => write!(f, "The name is {} characters long, the maximum is 255.", len),
        }
    }
}

#[derive(Debug)]
pub enum Error {
    /// The mapping submission was rejected, nothing was written
    InvalidMappings(Violations),
    /// A category slot refers to a category of another overview
    InvalidCategoryReference(IDType),
    /// Two category slots refer to the same category
    DuplicateCategoryReference(IDType),
    /// No category slot carries a name
    MissingCategory,
    InvalidSettings(SettingsError),
    OverviewNotFound(IDType),
    StoreFailure(sea_orm::DbErr),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidMappings(violations) => {
                write!(f, "Invalid mappings:")?;
                for (group, errors) in violations {
                    write!(f, " [group {}]", group)?;
                    for error in errors {
                        write!(f, " {}", error)?;
                    }
                }
                Ok(())
            }
            Error::InvalidCategoryReference(id) => write!(f, "Category {} is not part of this group overview.", id),
            Error::DuplicateCategoryReference(id) => write!(f, "Category {} appears in more than one slot.", id),
            Error::MissingCategory => write!(f, "You need to provide at least one category."),
            Error::InvalidSettings(e) => e.fmt(f),
            Error::OverviewNotFound(id) => write!(f, "Group overview {} not found.", id),
            Error::StoreFailure(e) => write!(f, "Store failure: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::StoreFailure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sea_orm::DbErr> for Error {
    fn from(e: sea_orm::DbErr) -> Self {
        Error::StoreFailure(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
