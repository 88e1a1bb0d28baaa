pub mod game;

pub use game::{GameConfig, TimingConfig};
