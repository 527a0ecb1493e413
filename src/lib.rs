//! Shell history statistics: locate a zsh or bash history file, parse it
//! into [`record::CommandRecord`]s and count what was run and when.

pub mod analysis;
pub mod config;
pub mod error;
pub mod filter;
pub mod history;
pub mod record;
pub mod report;
