pub mod schedule;
pub mod second_chance;
pub mod settings;
pub mod snapshot;
pub mod state;
pub mod vote;
