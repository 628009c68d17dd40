pub mod audit;
pub mod auth;
pub mod config;
pub mod errors;
pub mod locater;
pub mod lock;
pub mod models;
pub mod repository;
pub mod seed;
pub mod store;
pub mod view;
