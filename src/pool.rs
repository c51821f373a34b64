use super::{
    errors::PoolError,
    model::PoolStatus,
    task::{self, TaskOutcome},
    ticket::{TicketWait, WaitTicket},
    worker::Worker,
};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
};
use parking_lot::Mutex;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};


/// Конфигурация пула
#[derive(Debug, Clone)]
pub struct Config {
    pub max_idle: usize,
    /// None - без ограничения
    pub max_running: Option<usize>,
    pub thread_name_prefix: String,
    pub stack_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_idle: 1000,
            max_running: None,
            thread_name_prefix: "gpool-worker".to_string(),
            stack_size: None,
        }
    }
}

impl Config {
    pub fn new(max_idle: usize, max_running: usize) -> Self {
        Self {
            max_idle,
            max_running: Some(max_running),
            ..Default::default()
        }
    }

    pub fn cpu_bound() -> Self {
        let num_cpus = num_cpus::get();
        Self {
            max_idle: num_cpus,
            max_running: Some(num_cpus),
            ..Default::default()
        }
    }

    pub fn io_bound() -> Self {
        let num_cpus = num_cpus::get();
        Self {
            max_idle: num_cpus * 2,
            max_running: Some(num_cpus * 20),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_running == Some(0) {
            return Err(PoolError::config("max_running must be at least 1"));
        }
        if self.thread_name_prefix.is_empty() {
            return Err(PoolError::config("thread_name_prefix must not be empty"));
        }
        Ok(())
    }

    #[inline(always)]
    fn allows_spawn(&self, running: usize) -> bool {
        self.max_running.map_or(true, |max| running < max)
    }
}


/// Кэш простаивающих воркеров (LIFO) и очередь ожидающих (FIFO),
/// под одним замком
struct IdleState {
    workers: Vec<Arc<Worker>>,
    waiters: VecDeque<WaitTicket>,
    closed: bool,
}

enum Acquired {
    /// reused - воркер взят из кэша
    Ready { worker: Arc<Worker>, reused: bool },
    Queued(TicketWait),
}

/// Общее состояние пула. Воркеры держат на него Weak.
///
/// Порядок замков всегда idle -> running.
pub(crate) struct PoolShared {
    config: Config,
    idle: Mutex<IdleState>,
    running: Mutex<usize>,
    next_worker_id: AtomicUsize,
    hits: AtomicU64,
    total: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl PoolShared {
    fn acquire(self: &Arc<Self>) -> Result<Acquired, PoolError> {
        let mut idle = self.idle.lock();
        if idle.closed {
            return Err(PoolError::Closed);
        }

        while let Some(worker) = idle.workers.pop() {
            if worker.is_running() {
                return Ok(Acquired::Ready { worker, reused: true });
            }
        }

        let mut running = self.running.lock();
        if self.config.allows_spawn(*running) {
            let worker = self.spawn_worker()?;
            *running += 1;
            return Ok(Acquired::Ready { worker, reused: false });
        }
        drop(running);

        let (ticket, wait) = WaitTicket::new();
        idle.waiters.push_back(ticket);
        Ok(Acquired::Queued(wait))
    }

    fn spawn_worker(self: &Arc<Self>) -> Result<Arc<Worker>, PoolError> {
        let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
        Ok(Worker::spawn(id, &self.config, Arc::downgrade(self))?)
    }

    /// Старейший ожидающий, иначе кэш, иначе вернуть лишний воркер
    fn hand_off(&self, idle: &mut IdleState, mut worker: Arc<Worker>) -> Option<Arc<Worker>> {
        while let Some(ticket) = idle.waiters.pop_front() {
            match ticket.fulfill(worker) {
                Ok(()) => return None,
                Err(back) => worker = back,
            }
        }

        if !idle.closed && idle.workers.len() < self.config.max_idle {
            idle.workers.push(worker);
            return None;
        }
        Some(worker)
    }

    /// Вызывается под замком idle
    fn retire(&self, worker: &Worker) {
        if worker.close() {
            let mut running = self.running.lock();
            *running = running.saturating_sub(1);
            debug!(worker = worker.id(), "worker retired");
        }
    }

    /// Воркер закончил задачу и предлагает себя пулу
    pub(crate) fn release(&self, worker: Arc<Worker>) {
        let mut idle = self.idle.lock();
        if let Some(excess) = self.hand_off(&mut idle, worker) {
            self.retire(&excess);
        }
    }

    /// Воркер, на котором упала задача, выводится из пула. Освободившееся
    /// место сразу отдаётся новому воркеру для старейшего ожидающего.
    pub(crate) fn retire_failed(self: &Arc<Self>, worker: &Worker) {
        let mut idle = self.idle.lock();
        self.retire(worker);

        if idle.closed || idle.waiters.is_empty() {
            return;
        }

        let replacement = {
            let mut running = self.running.lock();
            if !self.config.allows_spawn(*running) {
                return;
            }
            match self.spawn_worker() {
                Ok(w) => {
                    *running += 1;
                    w
                }
                Err(err) => {
                    error!(error = %err, waiting = idle.waiters.len(), "failed to spawn replacement worker");
                    return;
                }
            }
        };

        if let Some(excess) = self.hand_off(&mut idle, replacement) {
            self.retire(&excess);
        }
    }

    #[inline]
    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    fn shutdown(&self) {
        let mut idle = self.idle.lock();
        if idle.closed {
            return;
        }
        idle.closed = true;

        let workers = std::mem::take(&mut idle.workers);
        let waiters = std::mem::take(&mut idle.waiters);
        for worker in &workers {
            self.retire(worker);
        }
        drop(idle);

        info!(idle = workers.len(), waiting = waiters.len(), "pool shut down");
        // брошенные талоны будят ожидающих с PoolError::Closed
        drop(waiters);
    }

    fn status(&self) -> PoolStatus {
        let running = *self.running.lock();
        let (idle, waiting) = {
            let idle = self.idle.lock();
            (idle.workers.len(), idle.waiters.len())
        };
        let hits = self.hits.load(Ordering::Relaxed);
        let total = self.total.load(Ordering::Relaxed);

        PoolStatus {
            running,
            idle,
            waiting,
            reuse_rate: hits as f32 / (total + 1) as f32,
            submitted: total,
            reused: hits,
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}


/// Пул переиспользуемых потоков с ограничением числа одновременно
/// работающих воркеров
pub struct Pool {
    shared: Arc<PoolShared>,
}

impl Pool {
    pub fn new(max_idle: usize, max_running: usize) -> Result<Pool, PoolError> {
        Self::with_config(Config::new(max_idle, max_running))
    }

    pub fn with_config(config: Config) -> Result<Pool, PoolError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    pub(crate) fn from_valid_config(config: Config) -> Pool {
        debug_assert!(config.validate().is_ok());
        let shared = Arc::new(PoolShared {
            config,
            idle: Mutex::new(IdleState {
                workers: Vec::new(),
                waiters: VecDeque::new(),
                closed: false,
            }),
            running: Mutex::new(0),
            next_worker_id: AtomicUsize::new(0),
            hits: AtomicU64::new(0),
            total: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        });

        Pool { shared }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Отдаёт задачу воркеру. Блокирует вызывающий поток, если пул
    /// насыщен; завершения задачи не ждёт.
    ///
    /// Замыкание, которое никогда не возвращается (всегда паникует),
    /// имеет тип `!` и не реализует `TaskOutcome`: укажите исход явно,
    /// например `pool.run::<_, ()>(|| panic!("..."))`.
    pub fn run<F, R>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: TaskOutcome,
    {
        self.shared.total.fetch_add(1, Ordering::Relaxed);
        let mut task = task::boxed(f);

        loop {
            let (worker, reused) = match self.shared.acquire()? {
                Acquired::Ready { worker, reused } => (worker, reused),
                Acquired::Queued(wait) => (wait.wait()?, false),
            };

            match worker.deliver(task) {
                Ok(()) => {
                    // hit засчитывается один раз на задачу, после передачи
                    if reused {
                        self.shared.hits.fetch_add(1, Ordering::Relaxed);
                    }
                    return Ok(());
                }
                Err(back) => {
                    warn!(worker = worker.id(), "worker retired before hand-off, retrying");
                    task = back;
                }
            }
        }
    }

    #[inline]
    pub fn status(&self) -> PoolStatus {
        self.shared.status()
    }

    /// Закрывает пул: простаивающие воркеры завершаются, ожидающие
    /// получают `PoolError::Closed`, занятые завершатся после своей задачи
    pub fn shutdown(&self) {
        self.shared.shutdown();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.idle.lock().closed
    }

    /// Мониторинг статуса с callback
    /// ВАЖНО: Вызовите token.cancel() для остановки мониторинга и освобождения Arc
    pub fn start_monitoring<F>(self: &Arc<Self>, interval: Duration, callback: F) -> CancellationToken
    where
        F: Fn(PoolStatus) + Send + 'static,
    {
        let pool = Arc::clone(self);
        let token = CancellationToken::new();
        let token_clone = token.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        callback(pool.status());
                    }
                    _ = token_clone.cancelled() => {
                        drop(pool);
                        break;
                    }
                }
            }
        });

        token
    }

    pub fn stop_monitoring(token: CancellationToken) {
        token.cancel();
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.shared.shutdown();
    }
}
