use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    panic::{self, AssertUnwindSafe},
    rc::Rc,
    sync::Arc,
    time::Duration,
};

use serde_json::Value;
use tokio::{
    runtime::{Builder, Handle, Runtime},
    sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender},
};

use crate::host::{HostError, HostValue, NamedArgs};

/// Outcome delivered to the host for one bridged call.
pub type Outcome = Result<HostValue, HostError>;

/// An otherwise-blocking operation exposed to the host.
///
/// `adapt` and `marshal` run on the host thread; `run` runs on a worker
/// and may block for as long as it needs.
pub trait BridgedOperation: Send + Sync + 'static {
    type Request: Send + 'static;
    type Response: Send + 'static;

    /// Name under which the host calls this operation.
    fn name(&self) -> &'static str;

    /// Converts host arguments into an owned request.
    fn adapt(&self, args: &NamedArgs) -> Result<Self::Request, HostError>;

    fn run(&self, request: Self::Request) -> eyre::Result<Self::Response>;

    /// Converts a response into a host value.
    fn marshal(&self, response: Self::Response) -> Result<HostValue, HostError>;
}

/// Settings of the worker pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub worker_threads: usize,
    pub max_blocking_threads: usize,
    pub thread_name: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            worker_threads: 2,
            max_blocking_threads: 8,
            thread_name: String::from("wallet-sdk-worker"),
        }
    }
}

// === Promise ===

type Callback = Box<dyn FnOnce(&Outcome)>;

#[derive(Default)]
struct PromiseState {
    outcome: Option<Outcome>,
    callbacks: Vec<Callback>,
}

/// Handle on one in-flight bridged call, settled exactly once.
#[derive(Clone)]
pub struct Promise {
    id: u64,
    state: Rc<RefCell<PromiseState>>,
}

impl Promise {
    fn new(id: u64) -> Self {
        Self {
            id,
            state: Rc::default(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_settled(&self) -> bool {
        self.state.borrow().outcome.is_some()
    }

    /// The outcome, once settled.
    pub fn outcome(&self) -> Option<Outcome> {
        self.state.borrow().outcome.clone()
    }

    /// Registers a callback run on settlement, or right away if already settled.
    pub fn then(&self, callback: impl FnOnce(&Outcome) + 'static) {
        let settled = self.state.borrow().outcome.clone();

        match settled {
            Some(outcome) => callback(&outcome),
            None => self.state.borrow_mut().callbacks.push(Box::new(callback)),
        }
    }

    fn settle(&self, outcome: Outcome) {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            if state.outcome.is_some() {
                tracing::warn!(promise = self.id, "promise already settled");
                return;
            }
            state.outcome = Some(outcome.clone());
            std::mem::take(&mut state.callbacks)
        };

        for callback in callbacks {
            callback(&outcome);
        }
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("id", &self.id)
            .field("settled", &self.is_settled())
            .finish()
    }
}

// === Runner ===

/// Work finished on a worker, waiting to be settled on the host thread.
struct Completion {
    id: u64,
    operation: &'static str,
    settle: Box<dyn FnOnce() -> Outcome + Send>,
}

struct Inner {
    runtime: Cell<Option<Runtime>>,
    handle: Handle,
    sender: UnboundedSender<Completion>,
    receiver: RefCell<UnboundedReceiver<Completion>>,
    pending: RefCell<HashMap<u64, Promise>>,
    next_id: Cell<u64>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Bridges blocking operations to a single-threaded host.
///
/// Calls are dispatched to a worker pool and return a [`Promise`] at once.
/// Outcomes queue up until the host calls [`Runner::poll`] (or
/// [`Runner::wait`]), which settles the promises on the host thread, in the
/// order the work completed. A runner cannot leave the thread it was created on.
#[derive(Clone)]
pub struct Runner {
    inner: Rc<Inner>,
}

impl Runner {
    pub fn new(config: &RunnerConfig) -> eyre::Result<Self> {
        if config.worker_threads == 0 || config.max_blocking_threads == 0 {
            eyre::bail!("worker pool needs at least one thread of each kind");
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .max_blocking_threads(config.max_blocking_threads)
            .thread_name(config.thread_name.clone())
            .enable_time()
            .build()?;
        let handle = runtime.handle().clone();
        let (sender, receiver) = mpsc::unbounded_channel();

        tracing::debug!(
            worker_threads = config.worker_threads,
            max_blocking_threads = config.max_blocking_threads,
            "runner started"
        );

        Ok(Self {
            inner: Rc::new(Inner {
                runtime: Cell::new(Some(runtime)),
                handle,
                sender,
                receiver: RefCell::new(receiver),
                pending: RefCell::default(),
                next_id: Cell::new(0),
            }),
        })
    }

    /// Adapts `args` and dispatches `operation` to a worker.
    ///
    /// Arguments that cannot be adapted are reported right away and
    /// nothing is dispatched.
    pub fn dispatch<Op: BridgedOperation>(&self, operation: &Arc<Op>, args: &NamedArgs) -> Result<Promise, HostError> {
        let request = operation.adapt(args)?;

        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let promise = Promise::new(id);
        self.inner.pending.borrow_mut().insert(id, promise.clone());

        let name = operation.name();
        let operation = Arc::clone(operation);
        let sender = self.inner.sender.clone();

        tracing::debug!(operation = name, promise = id, "dispatching");

        self.inner.handle.spawn_blocking(move || {
            let settle: Box<dyn FnOnce() -> Outcome + Send> =
                match panic::catch_unwind(AssertUnwindSafe(|| operation.run(request))) {
                    Ok(Ok(response)) => Box::new(move || operation.marshal(response)),
                    Ok(Err(report)) => {
                        tracing::debug!(operation = name, promise = id, error = %format!("{report:#}"), "operation failed");
                        Box::new(move || Err(HostError::from_report(&report)))
                    }
                    Err(_) => {
                        tracing::warn!(operation = name, promise = id, "worker panicked");
                        Box::new(move || Err(HostError::internal(format!("{name} panicked"))))
                    }
                };

            let completion = Completion {
                id,
                operation: name,
                settle,
            };
            if sender.send(completion).is_err() {
                tracing::debug!(operation = name, promise = id, "runner dropped before completion");
            }
        });

        Ok(promise)
    }

    /// Wraps `operation` into a function the host can call by name.
    pub fn function<Op: BridgedOperation>(&self, operation: Op) -> AsyncFunction {
        let operation = Arc::new(operation);
        let runner = self.clone();

        AsyncFunction {
            name: operation.name(),
            invoke: Box::new(move |args| runner.dispatch(&operation, args)),
        }
    }

    /// Settles every completed call; returns how many were settled.
    pub fn poll(&self) -> usize {
        let mut settled = 0;

        loop {
            let next = self.inner.receiver.borrow_mut().try_recv();
            match next {
                Ok(completion) => {
                    self.complete(completion);
                    settled += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        settled
    }

    /// Parks the host until at least one call completes or `timeout`
    /// elapses, then settles everything completed so far.
    pub fn wait(&self, timeout: Duration) -> usize {
        if self.pending() == 0 {
            return self.poll();
        }

        let next = {
            let mut receiver = self.inner.receiver.borrow_mut();
            self.inner
                .handle
                .block_on(async { tokio::time::timeout(timeout, receiver.recv()).await })
        };

        match next {
            Ok(Some(completion)) => {
                self.complete(completion);
                1 + self.poll()
            }
            Ok(None) | Err(_) => self.poll(),
        }
    }

    /// Number of calls not settled yet.
    pub fn pending(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    fn complete(&self, completion: Completion) {
        let promise = self.inner.pending.borrow_mut().remove(&completion.id);

        match promise {
            Some(promise) => {
                let outcome = (completion.settle)();
                tracing::debug!(
                    operation = completion.operation,
                    promise = completion.id,
                    ok = outcome.is_ok(),
                    "settling"
                );
                promise.settle(outcome);
            }
            None => tracing::warn!(promise = completion.id, "completion for unknown promise"),
        }
    }
}

/// A bridged operation bound to a runner.
pub struct AsyncFunction {
    name: &'static str,
    invoke: Box<dyn Fn(&NamedArgs) -> Result<Promise, HostError>>,
}

impl AsyncFunction {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self, args: &NamedArgs) -> Result<Promise, HostError> {
        (self.invoke)(args)
    }

    /// Calls the function with the raw arguments object the host passed.
    pub fn call_value(&self, args: Value) -> Result<Promise, HostError> {
        self.call(&NamedArgs::from_value(args)?)
    }
}

impl fmt::Debug for AsyncFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncFunction").field("name", &self.name).finish()
    }
}
