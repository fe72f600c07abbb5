pub mod config;
pub mod db;
pub mod error;
pub mod intake;
pub mod routes;
pub mod state;
