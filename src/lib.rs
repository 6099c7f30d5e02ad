// Library entry point for artfolio
// Exposes modules for testing

pub mod api;
pub mod auth;
pub mod chat;
pub mod feed;
pub mod media;
pub mod models;
pub mod notify;
pub mod prefs;
pub mod social;
pub mod store;
