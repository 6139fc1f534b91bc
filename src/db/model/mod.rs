pub mod overview;
pub mod category;
pub mod mapping;
pub mod course;

pub use overview::Entity as Overview;
pub use category::Entity as Category;
pub use mapping::Entity as Mapping;
