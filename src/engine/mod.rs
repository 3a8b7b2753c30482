pub mod models;
pub mod simulator;
pub mod arena;
