//! Tables owned by the host course subsystem

pub mod group;

pub use group::Entity as Group;
