use lge_assets::AssetError;
use lge_scene::SceneError;

/// Errors surfaced to the scripting host.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("{function}: argument {index} must be {expected}")]
    BadArgument {
        function: String,
        index: usize,
        expected: &'static str,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),
}
