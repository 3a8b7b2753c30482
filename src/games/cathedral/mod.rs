//! Cathedral: two players wall off territory on a square grid around a
//! neutral cathedral, over a match of two rounds.

pub mod board;
pub mod command;
pub mod config;
pub mod inventory;
pub mod pieces;
pub mod scoring;
pub mod session;
pub mod territory;
pub mod types;
