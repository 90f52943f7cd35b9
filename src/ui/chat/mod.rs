//! Terminal front end for the assistant widget

pub mod commands;
pub mod composer;
pub mod history;
pub mod manager;

pub use manager::ChatPanel;
