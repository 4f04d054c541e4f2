pub mod common;
pub mod config;
pub mod errors;
pub mod models;
pub mod viewer;

pub mod backend;
pub mod database;
pub mod server;
pub mod services;
