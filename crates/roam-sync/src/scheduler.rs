//! # Execution Context Capture
//!
//! Owners remember where they first touched a roamed property so that change
//! notifications caused by a remote sync arrive there, not on whatever thread
//! the store's change signal fired on.
//!
//! ## Context Kinds
//!
//! | Captured when                     | `post` does                          |
//! |-----------------------------------|--------------------------------------|
//! | a [`Dispatcher`] is entered       | queues the task on that dispatcher   |
//! | inside a tokio runtime            | queues the task on a forwarder task  |
//! |                                   | running on that runtime              |
//! | neither                           | runs the task inline on the poster   |
//!
//! A dispatcher is a FIFO queue drained by its owner (a UI loop, a test), so
//! tasks posted to it run in post order. Runtime contexts are FIFO too: one
//! forwarder per captured context runs its tasks one after another.
//!
//! Dropping the dispatcher, or shutting down the runtime, closes every handle
//! to it; later posts fail with [`SyncError::ContextGone`].

use crate::error::SyncError;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// A unit of work delivered to a captured context.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

thread_local! {
    static CURRENT_CONTEXT: RefCell<Option<ContextHandle>> = const { RefCell::new(None) };
}

/// Opaque "where to run callbacks" handle.
#[derive(Clone)]
pub struct ContextHandle {
    kind: ContextKind,
}

#[derive(Clone)]
enum ContextKind {
    Dispatcher {
        name: Arc<str>,
        sender: mpsc::UnboundedSender<Task>,
    },
    Runtime {
        sender: mpsc::UnboundedSender<Task>,
    },
    Inline,
}

impl ContextHandle {
    /// Context that runs posted work immediately on the posting thread.
    pub fn inline() -> Self {
        Self {
            kind: ContextKind::Inline,
        }
    }

    /// Context that runs posted work on a tokio runtime.
    ///
    /// Spawns a forwarding task on `handle` that runs posted work in order.
    /// The forwarder dies with the runtime, which closes the context.
    pub fn runtime(handle: Handle) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Task>();
        handle.spawn(async move {
            while let Some(task) = receiver.recv().await {
                task();
            }
        });
        Self {
            kind: ContextKind::Runtime { sender },
        }
    }

    /// Hand `task` to this context. Does not wait for it to run.
    pub fn post(&self, task: Task) -> Result<(), SyncError> {
        match &self.kind {
            ContextKind::Dispatcher { sender, .. } | ContextKind::Runtime { sender } => {
                sender.send(task).map_err(|_| SyncError::ContextGone {
                    context: self.to_string(),
                })
            }
            ContextKind::Inline => {
                task();
                Ok(())
            }
        }
    }

    /// Whether posts are already known to fail.
    pub fn is_closed(&self) -> bool {
        match &self.kind {
            ContextKind::Dispatcher { sender, .. } | ContextKind::Runtime { sender } => {
                sender.is_closed()
            }
            ContextKind::Inline => false,
        }
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ContextKind::Dispatcher { name, .. } => write!(f, "dispatcher:{name}"),
            ContextKind::Runtime { .. } => f.write_str("runtime"),
            ContextKind::Inline => f.write_str("inline"),
        }
    }
}

impl fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextHandle").field(&self.to_string()).finish()
    }
}

/// The dispatcher context entered on this thread, if any.
pub fn current_context() -> Option<ContextHandle> {
    CURRENT_CONTEXT.with(|current| current.borrow().clone())
}

/// Capture-and-post capability used by the registry and the propagator.
pub trait Scheduler: Send + Sync {
    /// Snapshot the context active on the calling thread.
    fn capture_current(&self) -> ContextHandle;

    /// Deliver `task` to `context`, fire-and-forget.
    fn post(&self, context: &ContextHandle, task: Task) -> Result<(), SyncError> {
        context.post(task)
    }
}

/// Captures the entered dispatcher, else the current tokio runtime, else
/// falls back to inline delivery.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrentContextScheduler;

impl Scheduler for CurrentContextScheduler {
    fn capture_current(&self) -> ContextHandle {
        if let Some(context) = current_context() {
            return context;
        }
        match Handle::try_current() {
            Ok(handle) => ContextHandle::runtime(handle),
            Err(_) => ContextHandle::inline(),
        }
    }
}

/// Single-consumer FIFO execution context.
pub struct Dispatcher {
    name: Arc<str>,
    sender: mpsc::UnboundedSender<Task>,
    receiver: mpsc::UnboundedReceiver<Task>,
}

impl Dispatcher {
    pub fn new(name: impl Into<String>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            name: Arc::from(name.into()),
            sender,
            receiver,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> ContextHandle {
        ContextHandle {
            kind: ContextKind::Dispatcher {
                name: self.name.clone(),
                sender: self.sender.clone(),
            },
        }
    }

    /// Make this dispatcher the current context of the calling thread until
    /// the guard drops.
    pub fn enter(&self) -> ContextGuard {
        let previous = CURRENT_CONTEXT.with(|current| current.replace(Some(self.handle())));
        ContextGuard {
            previous,
            _not_send: PhantomData,
        }
    }

    /// Run every task queued so far, in order. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let _entered = self.enter();
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Wait for the next task and run it.
    pub async fn run_next(&mut self) {
        if let Some(task) = self.receiver.recv().await {
            let _entered = self.enter();
            task();
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").field("name", &self.name).finish()
    }
}

/// Restores the previously entered context on drop.
#[must_use = "the context is only current while the guard is alive"]
pub struct ContextGuard {
    previous: Option<ContextHandle>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT_CONTEXT.with(|current| {
            *current.borrow_mut() = previous;
        });
    }
}
