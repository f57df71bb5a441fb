use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("farm error: {0}")]
    Farm(#[from] farm_engine::FarmError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] farm_store_lmdb::LmdbError),

    #[error("config error: {0}")]
    Config(String),

    #[error("farm service is not running")]
    ChannelClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
