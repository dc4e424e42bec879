//! Integration tests for entity composition and lifecycle cascades

mod lifecycle;

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::config::EngineConfig;
use crate::ecs::{Component, ComponentCore};
use crate::events::{EventCapable, Listener, ON_DESTROY, ON_INIT, ON_LOAD, ON_UNLOAD};
use crate::Engine;

/// Shared record of `label.event` strings
pub(super) type Journal = Rc<RefCell<Vec<String>>>;

/// Test component; each `N` is a distinct component kind
pub(super) struct Part<const N: u8> {
    core: ComponentCore,
}

impl<const N: u8> Part<N> {
    pub(super) fn new(engine: &Rc<Engine>) -> Rc<Self> {
        Rc::new(Self {
            core: ComponentCore::new(engine, "Part").unwrap(),
        })
    }

    pub(super) fn recorded(engine: &Rc<Engine>, label: &'static str, journal: &Journal) -> Rc<Self> {
        let subject = Self::new(engine);
        record(&*subject, label, journal);
        subject
    }
}

impl<const N: u8> Component for Part<N> {
    fn core(&self) -> &ComponentCore {
        &self.core
    }
}

pub(super) fn engine() -> Rc<Engine> {
    Engine::new(EngineConfig::default())
}

pub(super) fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Append `label.event` to `journal` for every lifecycle event `target` fires
pub(super) fn record(target: &(impl EventCapable + ?Sized), label: &'static str, journal: &Journal) {
    for event in [ON_INIT, ON_LOAD, ON_UNLOAD, ON_DESTROY] {
        if !target.has_event(event) {
            continue;
        }
        let journal = Rc::clone(journal);
        let listener = Listener::new(move |fired| {
            journal.borrow_mut().push(format!("{}.{}", label, fired.name()));
            Ok(())
        });
        target.add_event_listener(event, target.id(), &listener).unwrap();
    }
}

/// Entries of `journal` ending in `.event`
pub(super) fn only(journal: &Journal, event: &str) -> Vec<String> {
    let suffix = format!(".{}", event);
    journal
        .borrow()
        .iter()
        .filter(|entry| entry.ends_with(&suffix))
        .cloned()
        .collect()
}
