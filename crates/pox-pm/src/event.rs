use crate::solver::Transaction;

/// A lifecycle moment a caller may want to observe. No script execution and
/// no plugin loading happen here - those are Installer-shell concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PreInstall,
    PostInstall,
    PreUpdate,
    PostUpdate,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PreInstall => "pre-install-cmd",
            EventKind::PostInstall => "post-install-cmd",
            EventKind::PreUpdate => "pre-update-cmd",
            EventKind::PostUpdate => "post-update-cmd",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fired event, carrying the transaction it fired around (empty before a
/// solve has run, populated for the `Post*` pair).
#[derive(Debug, Clone)]
pub struct Event<'a> {
    pub kind: EventKind,
    pub transaction: Option<&'a Transaction>,
}

impl<'a> Event<'a> {
    pub fn new(kind: EventKind) -> Self {
        Self { kind, transaction: None }
    }

    pub fn with_transaction(kind: EventKind, transaction: &'a Transaction) -> Self {
        Self { kind, transaction: Some(transaction) }
    }
}

/// Observes lifecycle events. The default no-op implementation is what a
/// caller gets unless it wires up logging, a script runner, or a plugin host.
pub trait EventDispatcher {
    fn dispatch(&self, _event: &Event<'_>) {}
}

/// The dispatcher used when no caller-supplied one is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventDispatcher;

impl EventDispatcher for NullEventDispatcher {}

/// Dispatches to every listener in order - the shape a caller building a
/// script runner or logger on top of this would reach for.
#[derive(Default)]
pub struct EventDispatcherChain {
    listeners: Vec<Box<dyn Fn(&Event<'_>)>>,
}

impl EventDispatcherChain {
    pub fn new() -> Self {
        Self { listeners: Vec::new() }
    }

    pub fn add_listener(&mut self, listener: impl Fn(&Event<'_>) + 'static) {
        self.listeners.push(Box::new(listener));
    }
}

impl EventDispatcher for EventDispatcherChain {
    fn dispatch(&self, event: &Event<'_>) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn null_dispatcher_does_nothing() {
        let dispatcher = NullEventDispatcher;
        dispatcher.dispatch(&Event::new(EventKind::PreInstall));
    }

    #[test]
    fn chain_invokes_every_listener_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut chain = EventDispatcherChain::new();

        let seen_a = seen.clone();
        chain.add_listener(move |e| seen_a.borrow_mut().push(e.kind));
        let seen_b = seen.clone();
        chain.add_listener(move |e| seen_b.borrow_mut().push(e.kind));

        chain.dispatch(&Event::new(EventKind::PostUpdate));

        assert_eq!(*seen.borrow(), vec![EventKind::PostUpdate, EventKind::PostUpdate]);
    }

    #[test]
    fn event_kind_names_match_composer_script_hooks() {
        assert_eq!(EventKind::PreInstall.as_str(), "pre-install-cmd");
        assert_eq!(EventKind::PostUpdate.as_str(), "post-update-cmd");
    }
}
