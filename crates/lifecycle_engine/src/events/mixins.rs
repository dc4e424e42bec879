//! Lifecycle capabilities shared by every object kind
//!
//! [`Loadable`] and [`Destructible`] carry the whole state machine in provided
//! methods. A type opts in by embedding a [`LifecycleState`], declaring the
//! matching events on its emitter ([`LOADABLE_EVENTS`], [`DESTRUCTIBLE_EVENTS`])
//! and implementing the trait with a single accessor.
//!
//! ```text
//! uninitialized ──first load──► initialized        (one way)
//!        unloaded ◄──────────► loaded              (reversible)
//!           alive ──destroy───► destroyed          (one way)
//! ```

use std::cell::Cell;

use bitflags::bitflags;

use crate::engine::EngineError;
use crate::events::{EventCapable, ON_DESTROY, ON_INIT, ON_LOAD, ON_UNLOAD};

/// Events every [`Loadable`] must declare
pub const LOADABLE_EVENTS: [&str; 3] = [ON_INIT, ON_LOAD, ON_UNLOAD];

/// Events every [`Destructible`] must declare
pub const DESTRUCTIBLE_EVENTS: [&str; 1] = [ON_DESTROY];

bitflags! {
    /// Lifecycle state bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LifecycleFlags: u8 {
        /// Loaded at least once
        const INITIALIZED = 1 << 0;
        /// Currently loaded
        const LOADED = 1 << 1;
        /// Destroyed; never cleared
        const DESTROYED = 1 << 2;
    }
}

/// Embedded lifecycle state
#[derive(Debug)]
pub struct LifecycleState {
    flags: Cell<LifecycleFlags>,
}

impl LifecycleState {
    /// Fresh state: uninitialized, unloaded, alive
    pub fn new() -> Self {
        Self {
            flags: Cell::new(LifecycleFlags::empty()),
        }
    }

    /// Current flags
    pub fn flags(&self) -> LifecycleFlags {
        self.flags.get()
    }

    /// Whether all of `flags` are set
    pub fn contains(&self, flags: LifecycleFlags) -> bool {
        self.flags.get().contains(flags)
    }

    fn set(&self, flags: LifecycleFlags, value: bool) {
        let mut current = self.flags.get();
        current.set(flags, value);
        self.flags.set(current);
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::new()
    }
}

/// Load/unload capability
///
/// Cascading to owned objects is not part of the capability; concrete types
/// subscribe to their own `onload`/`onunload` to do it.
pub trait Loadable: EventCapable {
    /// Embedded lifecycle state
    fn lifecycle(&self) -> &LifecycleState;

    /// Whether the object is loaded
    fn is_loaded(&self) -> bool {
        self.lifecycle().contains(LifecycleFlags::LOADED)
    }

    /// Whether the object has ever been loaded
    fn is_initialized(&self) -> bool {
        self.lifecycle().contains(LifecycleFlags::INITIALIZED)
    }

    /// Load the object; fires `oninit` on the first load, then `onload`.
    ///
    /// No-op if already loaded or destroyed.
    fn load(&self) -> Result<(), EngineError> {
        let lifecycle = self.lifecycle();
        if lifecycle.flags().intersects(LifecycleFlags::LOADED | LifecycleFlags::DESTROYED) {
            return Ok(());
        }
        lifecycle.set(LifecycleFlags::LOADED, true);

        let emitter = self.emitter();
        if !lifecycle.contains(LifecycleFlags::INITIALIZED) {
            lifecycle.set(LifecycleFlags::INITIALIZED, true);
            log::debug!("{} {:?} initialized", emitter.kind(), emitter.id());
            emitter.fire(ON_INIT, &())?;
        }
        log::debug!("{} {:?} loaded", emitter.kind(), emitter.id());
        emitter.fire(ON_LOAD, &())
    }

    /// Unload the object; fires `onunload`. No-op if not loaded.
    fn unload(&self) -> Result<(), EngineError> {
        let lifecycle = self.lifecycle();
        if !lifecycle.contains(LifecycleFlags::LOADED) {
            return Ok(());
        }
        lifecycle.set(LifecycleFlags::LOADED, false);

        let emitter = self.emitter();
        log::debug!("{} {:?} unloaded", emitter.kind(), emitter.id());
        emitter.fire(ON_UNLOAD, &())
    }

    /// Unload then load, unconditionally
    fn reload(&self) -> Result<(), EngineError> {
        self.unload()?;
        self.load()
    }
}

/// One-way destruction capability
pub trait Destructible: Loadable {
    /// Whether the object has been destroyed
    fn is_destroyed(&self) -> bool {
        self.lifecycle().contains(LifecycleFlags::DESTROYED)
    }

    /// Destroy the object. No-op if already destroyed.
    ///
    /// Fires `ondestroy` first, so observers see the object before it is torn
    /// down, then unloads it if loaded, releases its emitter from the engine and
    /// purges every subscription it holds.
    ///
    /// Teardown completes even when a listener fails; the first error is
    /// returned afterwards.
    fn destroy(&self) -> Result<(), EngineError> {
        let lifecycle = self.lifecycle();
        if lifecycle.contains(LifecycleFlags::DESTROYED) {
            return Ok(());
        }
        lifecycle.set(LifecycleFlags::DESTROYED, true);

        let emitter = self.emitter();
        log::debug!("{} {:?} destroyed", emitter.kind(), emitter.id());
        let notified = emitter.fire(ON_DESTROY, &());
        let unloaded = if self.is_loaded() { self.unload() } else { Ok(()) };
        let released = match emitter.engine() {
            Some(engine) => engine.release_emitter(emitter),
            None => Ok(()),
        };
        if let Err(e) = &notified {
            log::warn!("{} {:?} ondestroy listener failed: {}", emitter.kind(), emitter.id(), e);
        }
        notified.and(unloaded).and(released)
    }
}
