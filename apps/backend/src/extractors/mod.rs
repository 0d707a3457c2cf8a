pub mod expected_version;
pub mod game_id;
pub mod player;
pub mod validated_json;

pub use expected_version::ExpectedVersion;
pub use game_id::GameIdParam;
pub use player::PlayerIdentity;
pub use validated_json::ValidatedJson;
