pub mod show_controller;
pub mod stage;
