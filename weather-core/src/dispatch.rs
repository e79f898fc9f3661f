//! Marshaling of view notifications onto the UI-affinity context.

use tokio::sync::mpsc;

pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks on the context that is allowed to touch the view.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, task: UiTask);
}

/// Runs every task immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, task: UiTask) {
        task();
    }
}

/// Sending half of a UI queue. Cheap to clone; tasks are run in FIFO order by [`UiQueue`].
#[derive(Debug, Clone)]
pub struct QueueDispatcher {
    tx: mpsc::UnboundedSender<UiTask>,
}

impl Dispatcher for QueueDispatcher {
    fn dispatch(&self, task: UiTask) {
        if self.tx.send(task).is_err() {
            tracing::debug!("UI queue closed, dropping notification");
        }
    }
}

/// Receiving half of a UI queue. Whoever owns it is the UI context.
#[derive(Debug)]
pub struct UiQueue {
    rx: mpsc::UnboundedReceiver<UiTask>,
}

impl UiQueue {
    /// Wait for the next task and run it. Returns false once every dispatcher is dropped.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run every task queued so far without waiting. Returns how many ran.
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }
}

pub fn ui_queue() -> (QueueDispatcher, UiQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueDispatcher { tx }, UiQueue { rx })
}
