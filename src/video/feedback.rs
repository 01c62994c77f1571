use std::rc::Rc;
use std::time::Duration;

use crate::core::ToastTimings;
use crate::video::{ElementId, TaskKey, Timers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastPhase {
    FadeIn,
    FadeOut,
    Hide,
    Reshow,
}

const DISPLAY_PHASES: [ToastPhase; 3] = [ToastPhase::FadeIn, ToastPhase::FadeOut, ToastPhase::Hide];

/// The on-screen message widget. Rendering belongs to the host.
pub trait ToastSurface {
    fn set_text(&self, anchor: ElementId, text: &str);
    fn set_visible(&self, visible: bool);
    fn set_opacity(&self, opacity: f32);
}

/// Drives the show/fade/hide sequence of transient messages.
pub struct Feedback {
    surface: Rc<dyn ToastSurface>,
    timings: ToastTimings,
    visible: bool,
}

impl Feedback {
    pub fn new(surface: Rc<dyn ToastSurface>, timings: ToastTimings) -> Self {
        Self {
            surface,
            timings,
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows `text` over `anchor`. Without a player the message only reaches the log.
    pub fn show(&mut self, timers: &mut Timers, anchor: Option<ElementId>, text: &str) {
        let Some(anchor) = anchor else {
            log::info!("Feedback: {}", text);
            return;
        };

        self.surface.set_text(anchor, text);
        for phase in DISPLAY_PHASES {
            timers.cancel(TaskKey::Toast(phase));
        }

        if self.visible {
            // Blink so a replaced message is noticeable
            self.surface.set_visible(false);
            self.visible = false;
            timers.schedule(
                TaskKey::Toast(ToastPhase::Reshow),
                Duration::from_millis(self.timings.reshow_ms),
            );
        } else {
            self.display(timers);
        }
    }

    pub fn on_phase(&mut self, timers: &mut Timers, phase: ToastPhase) {
        match phase {
            ToastPhase::FadeIn => self.surface.set_opacity(1.0),
            ToastPhase::FadeOut => self.surface.set_opacity(0.0),
            ToastPhase::Hide => {
                self.surface.set_visible(false);
                self.visible = false;
            }
            ToastPhase::Reshow => self.display(timers),
        }
    }

    fn display(&mut self, timers: &mut Timers) {
        self.surface.set_visible(true);
        self.visible = true;
        timers.schedule(TaskKey::Toast(ToastPhase::FadeIn), Duration::from_millis(self.timings.fade_in_ms));
        timers.schedule(TaskKey::Toast(ToastPhase::FadeOut), Duration::from_millis(self.timings.fade_out_ms));
        timers.schedule(TaskKey::Toast(ToastPhase::Hide), Duration::from_millis(self.timings.hide_ms));
    }
}
