//! user-service: lists users from PostgreSQL or MongoDB behind one repository
//! contract, chosen once at startup.

pub mod config;
pub mod context;
pub mod db;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod repository;
pub mod services;
pub mod startup;
