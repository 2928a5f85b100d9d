//! Library entrypoint for Sokoni.
//!
//! This file exists mainly to make controller tests easy (integration tests
//! under `tests/` can import the app state, routers, controllers, services).

pub mod config;
pub mod models;

// Kept at crate root because the codebase references it as `crate::auth`.
#[path = "middleware/auth.rs"]
pub mod auth;

pub mod services;

#[path = "views/render.rs"]
pub mod render;
pub mod templates;

pub mod controllers;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub db: mongodb::Database,
    pub settings: config::Settings,
    pub payments: services::payments::PaymentsClient,
}
