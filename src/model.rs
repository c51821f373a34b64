/// Снимок состояния пула. Только для диагностики: поля читаются
/// не атомарно относительно друг друга.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolStatus {
    pub running: usize,
    pub idle: usize,
    pub waiting: usize,
    /// hits / (total + 1)
    pub reuse_rate: f32,
    pub submitted: u64,
    pub reused: u64,
    pub completed: u64,
    pub failed: u64,
}

impl PoolStatus {
    /// Доля живых воркеров, занятых задачей
    pub fn utilization(&self) -> f64 {
        if self.running == 0 {
            return 0.0;
        }
        let busy = self.running.saturating_sub(self.idle);
        busy as f64 / self.running as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.completed + self.failed;
        if total == 0 {
            return 1.0;
        }
        self.completed as f64 / total as f64
    }

    #[inline]
    pub fn is_saturated(&self) -> bool {
        self.waiting > 0
    }
}
