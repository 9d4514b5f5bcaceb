pub mod die;
pub mod player;
