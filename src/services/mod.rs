pub mod event_manager;
pub mod localization;
pub mod platform;
pub mod store;
