use super::{
    pool::{Config, PoolShared},
    task::{self, Task},
};
use std::{
    io,
    sync::{Arc, Weak},
    thread,
};
use crossbeam::{
    channel::{self, Receiver, Sender, TryRecvError},
    select,
};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};


pub type WorkerId = usize;

/// Сигнал завершения: закрывается один раз, читается сколько угодно
struct DoneSignal {
    sender: Mutex<Option<Sender<()>>>,
    receiver: Receiver<()>,
}

impl DoneSignal {
    fn new() -> Self {
        let (sender, receiver) = channel::bounded(0);
        Self {
            sender: Mutex::new(Some(sender)),
            receiver,
        }
    }

    /// true только для первого вызова
    fn fire(&self) -> bool {
        self.sender.lock().take().is_some()
    }

    fn is_fired(&self) -> bool {
        matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }
}

/// Воркер: отдельный поток с приватным слотом задачи (rendezvous)
/// и собственным сигналом завершения
pub(crate) struct Worker {
    id: WorkerId,
    task_tx: Sender<Task>,
    done: DoneSignal,
}

impl Worker {
    fn new(id: WorkerId) -> (Arc<Worker>, Receiver<Task>) {
        let (task_tx, task_rx) = channel::bounded(0);
        let worker = Arc::new(Worker {
            id,
            task_tx,
            done: DoneSignal::new(),
        });
        (worker, task_rx)
    }

    /// Запускает поток воркера. Счётчик running ведёт пул.
    pub(crate) fn spawn(
        id: WorkerId,
        config: &Config,
        pool: Weak<PoolShared>,
    ) -> io::Result<Arc<Worker>> {
        let (worker, task_rx) = Worker::new(id);

        let mut builder = thread::Builder::new()
            .name(format!("{}-{}", config.thread_name_prefix, id));
        if let Some(size) = config.stack_size {
            builder = builder.stack_size(size);
        }

        let this = Arc::clone(&worker);
        builder.spawn(move || this.worker_loop(task_rx, pool))?;

        debug!(worker = id, "worker started");
        Ok(worker)
    }

    #[inline]
    pub(crate) fn id(&self) -> WorkerId {
        self.id
    }

    #[inline]
    pub(crate) fn is_running(&self) -> bool {
        !self.done.is_fired()
    }

    /// Закрывает воркер. Возвращает true, если закрыл именно этот вызов:
    /// только он вправе уменьшать счётчик running.
    #[inline]
    pub(crate) fn close(&self) -> bool {
        self.done.fire()
    }

    /// Передаёт задачу воркеру. Закрытый воркер возвращает задачу назад.
    pub(crate) fn deliver(&self, task: Task) -> Result<(), Task> {
        if !self.is_running() {
            return Err(task);
        }
        self.task_tx.send(task).map_err(|e| e.into_inner())
    }

    fn worker_loop(self: Arc<Self>, tasks: Receiver<Task>, pool: Weak<PoolShared>) {
        let done = self.done.receiver.clone();

        loop {
            select! {
                recv(tasks) -> msg => {
                    let Ok(task) = msg else { break };
                    let outcome = task::execute(task);

                    let Some(pool) = pool.upgrade() else {
                        self.close();
                        break;
                    };

                    match outcome {
                        Ok(()) => {
                            pool.record_completed();
                            pool.release(Arc::clone(&self));
                        }
                        Err(err) => {
                            warn!(worker = self.id, error = %err, "task failed, retiring worker");
                            pool.record_failed();
                            pool.retire_failed(&self);
                            break;
                        }
                    }
                }
                recv(done) -> _ => break,
            }
        }

        trace!(worker = self.id, "worker exited");
    }
}
