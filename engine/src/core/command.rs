/// A unit of work handed to the [`Engine`](super::Engine).
///
/// The engine calls [`execute`](Command::execute) exactly once per successful `add`, on one of its
/// worker threads. Commands report nothing back: a panic inside `execute` is caught and logged by
/// the worker and never reaches the engine.
///
/// Any `FnOnce() + Send + 'static` closure is a command.
pub trait Command: Send + 'static {
    /// Run the command, consuming it.
    fn execute(self: Box<Self>);
}

impl<F> Command for F
where
    F: FnOnce() + Send + 'static,
{
    fn execute(self: Box<Self>) {
        (*self)()
    }
}
