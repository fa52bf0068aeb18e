// src/web/mod.rs
pub mod admin_handlers;
pub mod auth_handlers;
pub mod mw_admin;
pub mod mw_auth;
pub mod mw_role;
pub mod officer_handlers;
pub mod police_handlers;
pub mod register_handlers;
pub mod routes;
pub mod trends_handlers;
pub mod user_handlers;
