//! HTTP handlers for the VideoTube API

pub mod auth;
pub mod health;
