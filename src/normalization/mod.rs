pub mod game_key;

pub use game_key::GameKey;
