pub mod app;
pub mod config;
pub mod cpu;
pub mod error;
pub mod instruction;
pub mod state;
pub mod timing;
