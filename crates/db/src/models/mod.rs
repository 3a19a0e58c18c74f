//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) where the entity is editable

pub mod candidate;
pub mod class;
pub mod confirmation;
pub mod event;
pub mod group;
pub mod job;
pub mod note;
pub mod offer;
pub mod rating;
pub mod role;
pub mod refresh_session;
pub mod shortlist;
pub mod user;
pub mod vote;
