//! `Promise<T>` / `RecursionPromise<T>` — the public typed handles
//! (spec §3 "Promise\<T>", §4.9, §6).

use std::sync::Arc;

use crate::core::{Forward, MultiForward, ReceiveMany};
use crate::error::{PromiseError, PromiseResult, UserError};
use crate::node::recursion::RecursionNode;
use crate::node::{deferred, nested, plain, ErrorHandler, Node};
use crate::scheduler::Scheduler;
use crate::unit::Unit;

/// Type-erases over a node's `Arg`, exposing only what a `Promise<T>`
/// needs: a forward to chain onto and the two observable predicates.
/// Implemented both by `Node<Arg, T>` and by a bare `Forward<T>` (used by
/// `RecursionPromise::finally`, which has no ordinary node of its own).
pub(crate) trait NodeHandle<T>: Send + Sync {
    fn forward_arc(&self) -> Arc<Forward<T>>;
    fn is_fulfilled(&self) -> bool;
    fn is_rejected(&self) -> bool;
}

impl<Arg, Ret> NodeHandle<Ret> for Node<Arg, Ret>
where
    Arg: Send + 'static,
    Ret: Send + 'static,
{
    fn forward_arc(&self) -> Arc<Forward<Ret>> {
        self.forward().clone()
    }

    fn is_fulfilled(&self) -> bool {
        Node::is_fulfilled(self)
    }

    fn is_rejected(&self) -> bool {
        Node::is_rejected(self)
    }
}

struct ForwardHandle<T>(Arc<Forward<T>>);

impl<T: Send + 'static> NodeHandle<T> for ForwardHandle<T> {
    fn forward_arc(&self) -> Arc<Forward<T>> {
        self.0.clone()
    }

    fn is_fulfilled(&self) -> bool {
        self.0.is_fulfilled()
    }

    fn is_rejected(&self) -> bool {
        self.0.is_rejected()
    }
}

/// A shared reference to a node plus its result type. Copyable; an
/// invalid handle (no node — produced by `Promise::invalid` or by a
/// second attempt to chain the same upstream) is distinguished from a
/// valid one via `is_valid`.
pub struct Promise<T> {
    node: Option<Arc<dyn NodeHandle<T>>>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
        }
    }
}

impl<T: Send + 'static> Promise<T> {
    pub(crate) fn from_node(node: Arc<dyn NodeHandle<T>>) -> Self {
        Self { node: Some(node) }
    }

    /// An invalid handle — observable only via `is_valid`.
    pub fn invalid() -> Self {
        Self { node: None }
    }

    pub fn is_valid(&self) -> bool {
        self.node.is_some()
    }

    pub fn is_fulfilled(&self) -> PromiseResult<bool> {
        self.node
            .as_ref()
            .map(|n| n.is_fulfilled())
            .ok_or(PromiseError::InvalidPromise)
    }

    pub fn is_rejected(&self) -> PromiseResult<bool> {
        self.node
            .as_ref()
            .map(|n| n.is_rejected())
            .ok_or(PromiseError::InvalidPromise)
    }

    /// A node whose forward is already fulfilled with `value`; chaining
    /// onto it is immediate (spec §4.9).
    pub fn resolved(value: T, scheduler: Arc<dyn Scheduler>) -> Self {
        Self::from_node(crate::node::terminal::resolved(value, scheduler))
    }

    /// A node whose forward is already rejected with `error`.
    pub fn rejected(error: UserError, scheduler: Arc<dyn Scheduler>) -> Self {
        Self::from_node(crate::node::terminal::rejected(error, scheduler))
    }

    /// Directs this promise's eventual outcome straight into `target`
    /// (spec §4.6's "splice"), bypassing the scheduler: used by
    /// `NestedNode` and by the `onError` replacement path (spec §4.8).
    pub(crate) fn splice_into(self, target: Arc<Forward<T>>) {
        let Some(node) = self.node else { return };
        let receive = Box::new(move |cell: crate::core::ValueCell<T>| match cell.into_result() {
            Ok(v) => {
                let _ = target.fulfill(v);
            }
            Err(e) => {
                let _ = target.reject(e);
            }
        });
        let _ = node.forward_arc().do_chaining(receive);
    }

    /// Registers `downstream` on this promise's forward: the callback
    /// submits `downstream.run_with(cell)` to `scheduler` (spec §4.9).
    /// Returns an invalid `Promise<U>` if this promise is itself invalid
    /// or if its forward has already been chained once before.
    fn attach<U>(&self, downstream: Arc<Node<T, U>>, scheduler: Arc<dyn Scheduler>) -> Promise<U>
    where
        U: Send + 'static,
    {
        let Some(upstream) = &self.node else {
            return Promise::invalid();
        };
        let handle: Arc<dyn NodeHandle<U>> = downstream.clone();
        let receive = Box::new(move |cell: crate::core::ValueCell<T>| {
            let node = downstream.clone();
            scheduler.submit(Box::new(move || node.run_with(cell)));
        });
        match upstream.forward_arc().do_chaining(receive) {
            Ok(()) => Promise::from_node(handle),
            Err(_) => Promise::invalid(),
        }
    }

    /// Maps the fulfilled value through a pure function (spec §4.4).
    /// `on_error`, when present, may recover a rejection into a value of
    /// the same result type (spec §4.8); pass `None` for the
    /// no-error-handler overload.
    pub fn then<U, F>(
        &self,
        on_fulfill: F,
        on_error: Option<ErrorHandler<U>>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Promise<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U, UserError> + Send + 'static,
    {
        let downstream = plain::new(on_fulfill, on_error, scheduler.clone());
        self.attach(downstream, scheduler)
    }

    /// Hands a `Defer<U>` handle to `f`, which arranges for the stage to
    /// resolve asynchronously, possibly from another thread (spec §4.5).
    #[cfg(feature = "deferred")]
    pub fn then_deferred<U, F>(
        &self,
        f: F,
        on_error: Option<ErrorHandler<U>>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Promise<U>
    where
        U: Send + 'static,
        F: FnOnce(crate::defer::Defer<U>, T) -> Result<(), UserError> + Send + 'static,
    {
        let downstream = deferred::new(f, on_error, scheduler.clone());
        self.attach(downstream, scheduler)
    }

    /// Splices the outcome of the promise returned by `f` into this
    /// stage's own outcome (spec §4.6).
    #[cfg(feature = "nested")]
    pub fn then_nested<U, F>(
        &self,
        f: F,
        on_error: Option<ErrorHandler<U>>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Promise<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<Promise<U>, UserError> + Send + 'static,
    {
        let downstream = nested::new(f, on_error, scheduler.clone());
        self.attach(downstream, scheduler)
    }

    /// Observes only rejection: the fulfilled value (if any) is discarded
    /// and boxed to `Unit`, matching the "no fulfill handler" overload of
    /// `then` (spec §6).
    pub fn catch<F>(&self, on_error: F, scheduler: Arc<dyn Scheduler>) -> Promise<Unit>
    where
        F: Fn(UserError) -> Promise<Unit> + Send + Sync + 'static,
    {
        let handler: ErrorHandler<Unit> = Box::new(on_error);
        self.then(|_| Ok(Unit), Some(handler), scheduler)
    }
}

/// Adapts a void-returning rejection handler into one that implicitly
/// resolves to `Ret::default()` (spec §4.8's configuration switch).
#[cfg(feature = "implicit-resolve")]
pub fn implicit_resolve<Ret, F>(f: F, scheduler: Arc<dyn Scheduler>) -> ErrorHandler<Ret>
where
    Ret: Default + Send + 'static,
    F: Fn(UserError) + Send + Sync + 'static,
{
    Box::new(move |e| {
        f(e);
        Promise::resolved(Ret::default(), scheduler.clone())
    })
}

/// Like `Promise`, but references a `RecursionNode`: its forward is
/// multi-value, and it additionally owns a terminal `Forward<Unit>`
/// (spec §3, §4.7).
pub struct RecursionPromise<T> {
    node: Option<Arc<RecursionNode<T>>>,
}

impl<T> Clone for RecursionPromise<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
        }
    }
}

impl<T: Send + 'static> RecursionPromise<T> {
    pub(crate) fn from_node(node: Arc<RecursionNode<T>>) -> Self {
        Self { node: Some(node) }
    }

    pub fn invalid() -> Self {
        Self { node: None }
    }

    pub fn is_valid(&self) -> bool {
        self.node.is_some()
    }

    /// Chains a per-value receiver (invoked once per emission, any number
    /// of times) and, optionally, an error receiver fed by a failure on
    /// the per-value channel (this cannot occur by construction today —
    /// `MultiForward` never rejects — but the parameter is kept so the
    /// signature matches spec §6's recursion surface and stays forward
    /// compatible). Returns `InvalidPromise` if already chained or invalid.
    pub fn then<F, E>(
        &self,
        on_fulfill: F,
        on_error: Option<E>,
        scheduler: Arc<dyn Scheduler>,
    ) -> PromiseResult<()>
    where
        F: Fn(T) + Send + Sync + 'static,
        E: Fn(UserError) + Send + Sync + 'static,
    {
        let node = self.node.as_ref().ok_or(PromiseError::InvalidPromise)?;
        let on_fulfill = Arc::new(on_fulfill);
        let on_error = on_error.map(Arc::new);
        let scheduler_ref = scheduler;
        let receive: ReceiveMany<T> = Box::new(move |cell| {
            let scheduler = scheduler_ref.clone();
            match cell.into_result() {
                Ok(value) => {
                    let on_fulfill = on_fulfill.clone();
                    scheduler.submit(Box::new(move || on_fulfill(value)));
                }
                Err(e) => {
                    if let Some(handler) = &on_error {
                        let handler = handler.clone();
                        scheduler.submit(Box::new(move || handler(e)));
                    }
                }
            }
        });
        node.values().do_chaining(receive)
    }

    /// Chains only the terminal signal, yielding an ordinary
    /// `Promise<Unit>` (spec §4.7, §6).
    pub fn finally(
        &self,
        on_fulfill: impl FnOnce(Unit) -> Result<Unit, UserError> + Send + 'static,
        on_error: Option<ErrorHandler<Unit>>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Promise<Unit> {
        let Some(node) = &self.node else {
            return Promise::invalid();
        };
        let upstream = ForwardHandle(node.terminal().clone());
        let downstream = plain::new(on_fulfill, on_error, scheduler.clone());
        let handle: Arc<dyn NodeHandle<Unit>> = downstream.clone();
        let receive = Box::new(move |cell: crate::core::ValueCell<Unit>| {
            let node = downstream.clone();
            scheduler.submit(Box::new(move || node.run_with(cell)));
        });
        match upstream.forward_arc().do_chaining(receive) {
            Ok(()) => Promise::from_node(handle),
            Err(_) => Promise::invalid(),
        }
    }
}

/// Constructs a `RecursionNode` driving `iter` and submits its `start` to
/// `scheduler` (spec §4.7, §6 "Iterate").
pub fn iterate<T, I>(iter: I, scheduler: Arc<dyn Scheduler>) -> RecursionPromise<T>
where
    T: Send + 'static,
    I: Iterator<Item = Result<T, UserError>> + Send + 'static,
{
    let node = RecursionNode::new(iter);
    let runner = node.clone();
    scheduler.submit(Box::new(move || runner.start()));
    RecursionPromise::from_node(node)
}
