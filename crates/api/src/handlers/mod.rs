pub mod admin;
pub mod auth;
pub mod catalog;
pub mod classes;
pub mod events;
pub mod groups;
pub mod me;
pub mod notes;
pub mod offers;
pub mod popups;
