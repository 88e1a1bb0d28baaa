//! Energy Quest: progression engine for an electricity-saving puzzle game.
//!
//! The crate owns the rules and the state machine. Rendering, audio and input
//! capture belong to whatever front end drives [`game::Game`], either in
//! process or over the WebSocket server.

pub mod cli;
pub mod config;
pub mod game;
pub mod persistence;
pub mod progress;
pub mod quiz;
pub mod rules;
pub mod server;
