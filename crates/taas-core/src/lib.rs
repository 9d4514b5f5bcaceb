#![deny(warnings)]
pub mod game;
pub mod model;
pub mod names;
pub mod policy;
pub mod rng;
pub mod scoring;

pub use game::schedule::{Pacing, Scheduler, Timer, TimerQueue};
pub use game::settings::{GameSettings, Ruleset, SettingsError, WinCondition};
pub use game::snapshot::{GameMessage, GameSnapshot, PendingPrompt};
pub use game::state::{Ack, Game, GameError, GameServices, Phase, TurnState};
pub use game::vote::{VoteChoice, VoteInfo, VoteOutcome};
pub use model::die::Die;
pub use model::player::{Player, Seat};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "taas"
    }

    pub const fn codename() -> &'static str {
        "Second Chance"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
