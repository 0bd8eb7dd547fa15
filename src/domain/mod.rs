//! Domain layer: aggregates, value objects and events of the account area.
pub mod aggregates;
pub mod events;
pub mod value_objects;
