//! Image content CLI - query analyzed image content from the local catalog.

pub mod commands;
pub mod output;
