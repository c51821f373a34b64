use super::errors::TaskError;
use std::{
    any::Any,
    fmt::Display,
    panic::{self, AssertUnwindSafe},
};


pub type TaskResult = Result<(), TaskError>;

/// Задача без аргументов, исполняется ровно один раз
pub type Task = Box<dyn FnOnce() -> TaskResult + Send + 'static>;

/// То, что задача может вернуть: `()` или `Result<(), E>`
pub trait TaskOutcome {
    fn into_result(self) -> TaskResult;
}

impl TaskOutcome for () {
    #[inline(always)]
    fn into_result(self) -> TaskResult {
        Ok(())
    }
}

impl<E: Display> TaskOutcome for Result<(), E> {
    #[inline]
    fn into_result(self) -> TaskResult {
        self.map_err(|e| TaskError::Failed(e.to_string()))
    }
}

#[inline]
pub(crate) fn boxed<F, R>(f: F) -> Task
where
    F: FnOnce() -> R + Send + 'static,
    R: TaskOutcome,
{
    Box::new(move || f().into_result())
}

/// Выполняет задачу, перехватывая панику
pub(crate) fn execute(task: Task) -> TaskResult {
    match panic::catch_unwind(AssertUnwindSafe(task)) {
        Ok(result) => result,
        Err(payload) => Err(TaskError::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
