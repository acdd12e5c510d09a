pub mod api;
pub mod command;
pub mod config;
pub mod db;
pub mod hipchat;
pub mod models;
pub mod reminder;
