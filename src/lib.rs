pub mod api;
pub mod database;
pub mod delivery;
pub mod models;
pub mod services;
pub mod utils;
pub mod websocket;
