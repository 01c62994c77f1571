// =============================================================================
// ENGINE - THE CONTROL CONTEXT
// =============================================================================
//
// Owns every piece of mutable control state (mode flags, player registry,
// shared playback rate, progress cache, feedback timeline, timers) and exposes
// one entry point per host event. Entry points never fail: problems are
// logged and the engine keeps answering keys.
//
// =============================================================================

use std::rc::Rc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::core::{EngineConfig, EngineError, EngineResult, PersistenceStore, ProgressCache, RateStore};
use crate::hotkeys::{Command, CommandDispatcher, KeyEvent, ModeGate, ModeToggle};
use crate::video::{
    Container, Detection, Discovery, ElementId, Feedback, MediaElement, PageContext, PlayerRegistry,
    TaskKey, Timers, ToastSurface, WallClock,
};

/// Services the host provides.
pub struct Host {
    pub document: Rc<dyn Container>,
    pub page: Rc<dyn PageContext>,
    pub store: Rc<dyn PersistenceStore>,
    pub toast: Rc<dyn ToastSurface>,
    pub clock: Rc<dyn WallClock>,
}

/// What the host should do with a key event after the engine saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not ours; let the page handle it.
    Ignored,
    /// A mode flag flipped. The event continues to the page.
    Toggled,
    /// A command ran. Stop propagation and prevent the default action.
    Dispatched,
}

impl KeyOutcome {
    pub fn stops_propagation(self) -> bool {
        self == KeyOutcome::Dispatched
    }
}

pub struct Engine {
    config: EngineConfig,
    page: Rc<dyn PageContext>,
    clock: Rc<dyn WallClock>,
    registry: PlayerRegistry,
    rates: RateStore,
    progress: ProgressCache,
    dispatcher: CommandDispatcher,
    gate: ModeGate,
    feedback: Feedback,
    timers: Timers,
    discovery: Option<broadcast::Receiver<Discovery>>,
    tracked: Option<ElementId>,
    warned_no_player: bool,
}

impl Engine {
    pub fn new(config: EngineConfig, host: Host) -> Self {
        let mut rates = RateStore::new(host.store.clone(), &config.storage.playback_rate);
        rates.sync();
        let progress = ProgressCache::new(
            host.store.clone(),
            &config.storage.play_progress,
            config.progress_capacity,
            config.resume_notice_secs,
        );

        Self {
            page: host.page,
            clock: host.clock,
            registry: PlayerRegistry::new(host.document),
            rates,
            progress,
            dispatcher: CommandDispatcher::from_config(&config),
            gate: ModeGate::default(),
            feedback: Feedback::new(host.toast, config.toast.clone()),
            timers: Timers::new(),
            discovery: None,
            tracked: None,
            warned_no_player: false,
            config,
        }
    }

    pub fn attach_discovery(&mut self, receiver: broadcast::Receiver<Discovery>) {
        self.discovery = Some(receiver);
    }

    pub fn gate(&self) -> &ModeGate {
        &self.gate
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn playback_rate(&self) -> f64 {
        self.rates.get()
    }

    /// The player that currently receives commands.
    pub fn current_player(&self) -> Option<ElementId> {
        self.registry.current()
    }

    /// The player whose progress is being recorded.
    pub fn tracked_player(&self) -> Option<ElementId> {
        self.tracked
    }

    // =========================================================================
    // DISCOVERY
    // =========================================================================

    /// Handles every queued discovery notification.
    pub fn pump_discovery(&mut self) {
        let mut events = Vec::new();
        if let Some(receiver) = self.discovery.as_mut() {
            loop {
                match receiver.try_recv() {
                    Ok(event) => events.push(event),
                    Err(TryRecvError::Lagged(missed)) => {
                        log::warn!("Missed {} discovery events, rescanning", missed);
                        events.push(Discovery::ElementsChanged);
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }
        }

        for event in events {
            self.handle_discovery(event);
        }
    }

    pub fn handle_discovery(&mut self, event: Discovery) {
        log::debug!("Discovery: {:?}", event);
        match event {
            Discovery::ContainerAppeared(container) => self.on_container_appeared(container),
            Discovery::ElementsChanged => self.detect(),
            Discovery::ElementRemoved(id) => self.on_element_removed(id),
        }
    }

    pub fn on_container_appeared(&mut self, container: Rc<dyn Container>) {
        self.registry.add_container(container);
        self.detect();
    }

    /// Rescans all containers. A lone player is selected and set up at once;
    /// with several, selection waits for pointer or playback.
    pub fn detect(&mut self) {
        match self.registry.detect() {
            Detection::Empty => {}
            Detection::Single(id) => {
                log::info!("Detected a single media element");
                self.registry.select_active(id);
                self.initialize(id, true);
            }
            Detection::Multiple(ids) => {
                log::info!("Detected {} media elements", ids.len());
            }
        }
    }

    pub fn on_element_removed(&mut self, id: ElementId) {
        self.registry.detach(id);
        self.timers.cancel_where(|key| {
            matches!(key, TaskKey::RestoreProgress(owner) | TaskKey::RecordProgress(owner) if *owner == id)
        });
        if self.tracked == Some(id) {
            self.tracked = None;
        }
    }

    fn initialize(&mut self, id: ElementId, single: bool) {
        if self.registry.initialize(id, single) {
            self.rates.sync();
        }
    }

    // =========================================================================
    // PLAYER EVENTS
    // =========================================================================

    pub fn on_pointer_enter(&mut self, id: ElementId) {
        self.registry.set_pointer_inside(id, true);
        if self.registry.player_count() > 1 {
            self.registry.select_active(id);
            self.initialize(id, false);
        }
    }

    pub fn on_pointer_leave(&mut self, id: ElementId) {
        self.registry.set_pointer_inside(id, false);
    }

    /// The player entered the playing state. The shared rate is re-applied
    /// silently; a lone player also gets its progress restored and recorded.
    pub fn on_playing(&mut self, id: ElementId) {
        if self.registry.player_count() > 1 {
            self.registry.select_active(id);
            self.initialize(id, false);
        }

        let Some(previous) = self.registry.note_playing(id) else {
            log::warn!("Playing event for unknown player {}", id);
            return;
        };
        let Some(slot) = self.registry.slot(id) else {
            return;
        };

        if let Err(e) = self.rates.set(None, true, Some(slot.handle.element())) {
            log::error!("Failed to resync playback rate: {}", e);
        }

        if previous == 0 && slot.single {
            if let Some(old) = self.tracked.take() {
                self.timers.cancel(TaskKey::RecordProgress(old));
            }
            self.timers.schedule(TaskKey::RestoreProgress(id), self.config.restore_delay());
        }
    }

    // =========================================================================
    // KEYBOARD
    // =========================================================================

    pub fn on_key_down(&mut self, event: &KeyEvent) -> KeyOutcome {
        if !event.is_watched() {
            return KeyOutcome::Ignored;
        }

        let id = match self.registry.current().ok_or(EngineError::NoActivePlayer) {
            Ok(id) => id,
            Err(e) => {
                if !self.warned_no_player {
                    log::debug!("{}, ignoring keys", e);
                    self.warned_no_player = true;
                }
                return KeyOutcome::Ignored;
            }
        };

        let toggle = ModeToggle::resolve(event);
        if toggle == Some(ModeToggle::Enabled) {
            let enabled = self.gate.toggle(ModeToggle::Enabled);
            self.notify(if enabled { "Shortcuts enabled" } else { "Shortcuts disabled" });
            return KeyOutcome::Toggled;
        }

        if !self.gate.enabled {
            log::debug!("Shortcuts are disabled");
            return KeyOutcome::Ignored;
        }

        if toggle == Some(ModeToggle::GlobalMode) {
            let global = self.gate.toggle(ModeToggle::GlobalMode);
            self.notify(if global { "Global mode" } else { "Focus mode" });
            return KeyOutcome::Toggled;
        }

        if !self.gate.permits(event, self.registry.current_has_focus()) {
            return KeyOutcome::Ignored;
        }

        let Some(command) = Command::resolve(event) else {
            return KeyOutcome::Ignored;
        };
        let Some(slot) = self.registry.slot_mut(id) else {
            return KeyOutcome::Ignored;
        };

        match self.dispatcher.dispatch(command, slot, &mut self.rates, self.page.as_ref()) {
            Some(applied) => {
                log::debug!("Dispatched {:?} to {}", command, id);
                if let Some(notice) = applied.notice {
                    self.notify(&notice);
                }
                KeyOutcome::Dispatched
            }
            None => KeyOutcome::Ignored,
        }
    }

    /// Sets the shared rate from free-form input, e.g. a host-side prompt.
    pub fn request_playback_rate(&mut self, input: &str) -> EngineResult<f64> {
        let element = self.registry.current().and_then(|id| self.registry.slot(id));
        let outcome = self
            .rates
            .set_from_str(input, false, element.map(|slot| slot.handle.element()))?;
        if outcome.notify {
            self.notify(&format!("Speed: {}x", outcome.rate));
        }
        Ok(outcome.rate)
    }

    // =========================================================================
    // TIME
    // =========================================================================

    /// Advances engine time by `elapsed`, running every task that falls due.
    pub fn tick(&mut self, elapsed: Duration) {
        let until = self.timers.now() + elapsed;
        while let Some(task) = self.timers.next_due(until) {
            self.run_task(task);
        }
        self.timers.settle(until);
    }

    fn run_task(&mut self, task: TaskKey) {
        match task {
            TaskKey::Toast(phase) => self.feedback.on_phase(&mut self.timers, phase),
            TaskKey::RestoreProgress(id) => self.restore_progress(id),
            TaskKey::RecordProgress(id) => self.record_progress(id),
        }
    }

    fn restore_progress(&mut self, id: ElementId) {
        let Some(slot) = self.registry.slot(id).filter(|slot| slot.attached) else {
            return;
        };
        let element = slot.handle.element();
        let identity = self.identity_for(element);

        let restored = self.progress.restore(&identity, element);
        if restored.map(|outcome| outcome.notify).unwrap_or(false) {
            self.notify("Resumed from last position");
        }

        self.tracked = Some(id);
        self.timers.schedule(TaskKey::RecordProgress(id), self.config.record_interval());
    }

    fn record_progress(&mut self, id: ElementId) {
        let Some(slot) = self.registry.slot(id).filter(|slot| slot.attached) else {
            log::debug!("Stopped recording progress for {}", id);
            return;
        };
        let element = slot.handle.element();
        let identity = self.identity_for(element);

        if let Err(e) = self.progress.record(&identity, element.current_time(), self.clock.now()) {
            log::warn!("Failed to record progress for {}: {}", identity, e);
        }
        self.timers.schedule(TaskKey::RecordProgress(id), self.config.record_interval());
    }

    fn identity_for(&self, element: &dyn MediaElement) -> String {
        self.page
            .location()
            .filter(|location| !location.is_empty())
            .or_else(|| element.source())
            .unwrap_or_default()
    }

    fn notify(&mut self, text: &str) {
        let anchor = self.registry.current();
        self.feedback.show(&mut self.timers, anchor, text);
    }
}
