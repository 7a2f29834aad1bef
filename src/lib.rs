//! Terminal mission log. A single user picks a difficulty preset with daily and weekly goals for
//! a set of activities and logs quantities against them. Everything lives in one json record that
//! is replaced atomically on every change.

pub mod catalog;
pub mod cli;
pub mod report;
pub mod session;
pub mod storage;
pub mod utils;
