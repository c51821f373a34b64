use super::{
    errors::PoolError,
    worker::Worker,
};
use std::sync::Arc;
use futures::channel::oneshot;


/// Талон ожидания: пул хранит его в FIFO-очереди и отдаёт по нему
/// освободившийся воркер ровно один раз.
pub(crate) struct WaitTicket {
    sender: oneshot::Sender<Arc<Worker>>,
}

/// Сторона вызывающего: блокируется, пока талон не будет исполнен
pub(crate) struct TicketWait {
    receiver: oneshot::Receiver<Arc<Worker>>,
}

impl WaitTicket {
    pub(crate) fn new() -> (WaitTicket, TicketWait) {
        let (sender, receiver) = oneshot::channel();
        (WaitTicket { sender }, TicketWait { receiver })
    }

    /// Отдаёт воркер ожидающему. Если ожидающего уже нет,
    /// воркер возвращается обратно пулу.
    #[inline]
    pub(crate) fn fulfill(self, worker: Arc<Worker>) -> Result<(), Arc<Worker>> {
        self.sender.send(worker)
    }
}

impl TicketWait {
    /// Талон, брошенный без исполнения (shutdown пула), даёт `Closed`
    pub(crate) fn wait(self) -> Result<Arc<Worker>, PoolError> {
        futures::executor::block_on(self.receiver).map_err(|_| PoolError::Closed)
    }
}
