pub mod setup;
pub mod show;
pub mod ui;
pub mod update;
