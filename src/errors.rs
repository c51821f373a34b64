use std::io;

use thiserror::Error;

/// Ошибки, которые пул возвращает вызывающему `run` / конструктору
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),

    #[error("pool is shut down")]
    Closed,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
}

impl PoolError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PoolError::InvalidConfig(msg.into())
    }
}

/// Исход задачи, завершившейся неуспешно. Наружу из воркера не уходит,
/// только логируется и учитывается в метриках.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TaskError {
    #[error("task panicked: {0}")]
    Panic(String),

    #[error("task failed: {0}")]
    Failed(String),
}
