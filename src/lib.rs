//! Пул переиспользуемых потоков с ограничением конкуренции
//!
//! # Features
//! - Ограничение числа одновременно работающих воркеров (backpressure)
//! - LIFO-кэш простаивающих воркеров
//! - FIFO-очередь вызывающих, ожидающих свободный воркер
//! - Изоляция паник: упавший воркер выводится из пула
//! - Снимок статуса и мониторинг
//! - Глобальный пул по умолчанию

pub mod errors;
pub mod model;
pub mod pool;
pub mod task;
mod ticket;
mod worker;

pub use errors::{PoolError, TaskError};
pub use model::PoolStatus;
pub use pool::{Config, Pool};
pub use task::TaskOutcome;

use std::sync::OnceLock;


static DEFAULT_POOL: OnceLock<Pool> = OnceLock::new();

/// Глобальный пул: 1000 простаивающих воркеров, без ограничения
/// работающих. Создаётся при первом обращении и живёт до конца процесса.
pub fn default_pool() -> &'static Pool {
    DEFAULT_POOL.get_or_init(|| Pool::from_valid_config(Config::default()))
}

/// `run` на глобальном пуле
pub fn run<F, R>(f: F) -> Result<(), PoolError>
where
    F: FnOnce() -> R + Send + 'static,
    R: TaskOutcome,
{
    default_pool().run(f)
}

/// `status` глобального пула
pub fn status() -> PoolStatus {
    default_pool().status()
}
