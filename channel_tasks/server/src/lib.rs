//! HTTP service for channel and private task lists with a daily digest over Mattermost.
pub mod clock;
pub mod commands;
pub mod config;
pub mod context;
pub mod host;
pub mod notifier;
pub mod prefs;
pub mod repository;
pub mod store;
pub mod web;
