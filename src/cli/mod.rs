pub mod commands;
pub mod play;
