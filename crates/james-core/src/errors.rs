/// Core error type for the bot.
///
/// Adapter crates map their provider-specific failures into this type so the
/// handlers can treat them uniformly (log-and-drop vs user-visible notice).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model error: {0}")]
    Model(String),

    #[error("messaging error: {0}")]
    Messaging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
