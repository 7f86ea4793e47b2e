//! HTTP handlers

pub mod health;
pub mod auth;
pub mod config;
pub mod domains;
pub mod scan;
pub mod monitoring;
pub mod history;
pub mod predict;
pub mod alerts;
