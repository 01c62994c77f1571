use crate::core::{EngineConfig, FilterParam, RateStore, SitePolicy};
use crate::core::filter::round_to;
use crate::hotkeys::Command;
use crate::video::{PageContext, PlayerSlot};

/// Result of a command that was handled.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub notice: Option<String>,
}

impl Applied {
    fn quiet() -> Self {
        Self { notice: None }
    }

    fn notice(text: impl Into<String>) -> Self {
        Self {
            notice: Some(text.into()),
        }
    }
}

fn percent(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

/// Applies resolved commands to a player.
pub struct CommandDispatcher {
    seek_step: f64,
    frame_step: f64,
    volume_step: f64,
    max_rate: f64,
    sites: SitePolicy,
}

impl CommandDispatcher {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            seek_step: config.seek_step_secs,
            frame_step: config.frame_step_secs(),
            volume_step: config.volume_step,
            max_rate: config.max_playback_rate,
            sites: config.sites.clone(),
        }
    }

    /// Runs `command` against `slot`. `None` means the command does not apply
    /// on this page and the key should reach the page untouched.
    pub fn dispatch(
        &self,
        command: Command,
        slot: &mut PlayerSlot,
        rates: &mut RateStore,
        page: &dyn PageContext,
    ) -> Option<Applied> {
        let host = page.hostname();
        if self.sites.is_suppressed(&host, command.kind()) {
            log::debug!("{:?} is suppressed on {}", command, host);
            return None;
        }

        let element = slot.handle.element();
        let applied = match command {
            Command::ScaleDown | Command::ScaleUp | Command::ScaleReset => {
                let scale = match command {
                    Command::ScaleDown => slot.transform.scale_by(-0.1),
                    Command::ScaleUp => slot.transform.scale_by(0.1),
                    _ => slot.transform.reset_scale(),
                };
                slot.transform.apply(element);
                Applied::notice(format!("Scale: {}", scale))
            }
            Command::SeekForward => {
                element.set_current_time(element.current_time() + self.seek_step);
                Applied::notice(format!("Forward: {}s", self.seek_step))
            }
            Command::SeekBackward => {
                element.set_current_time(element.current_time() - self.seek_step);
                Applied::notice(format!("Back: {}s", self.seek_step))
            }
            Command::VolumeUp | Command::VolumeDown => {
                let step = if command == Command::VolumeUp { self.volume_step } else { -self.volume_step };
                let volume = round_to(element.volume() + step, 2).clamp(0.0, 1.0);
                element.set_volume(volume);
                Applied::notice(format!("Volume: {}%", percent(volume)))
            }
            Command::TogglePlay => {
                if element.is_paused() {
                    element.play();
                    Applied::notice("Play")
                } else {
                    element.pause();
                    Applied::notice("Pause")
                }
            }
            Command::RateDown => {
                let rate = element.playback_rate();
                if rate > 0.0 {
                    self.change_rate(rates, rate - 0.1, slot)
                } else {
                    Applied::quiet()
                }
            }
            Command::RateUp => {
                let rate = element.playback_rate();
                if rate < self.max_rate {
                    self.change_rate(rates, (rate + 0.1).min(self.max_rate), slot)
                } else {
                    Applied::quiet()
                }
            }
            Command::RateReset => self.change_rate(rates, 1.0, slot),
            Command::RateSet(digit) => self.change_rate(rates, f64::from(digit), slot),
            Command::FrameForward | Command::FrameBackward => {
                if !element.is_paused() {
                    element.pause();
                }
                if command == Command::FrameForward {
                    element.set_current_time(element.current_time() + self.frame_step);
                    Applied::notice("Next frame")
                } else {
                    element.set_current_time(element.current_time() - self.frame_step);
                    Applied::notice("Previous frame")
                }
            }
            Command::Filter(param, direction) => {
                let value = slot.filter.adjust(param, direction);
                slot.filter.apply(element);
                Applied::notice(match param {
                    FilterParam::Brightness => format!("Brightness: {}%", percent(value)),
                    FilterParam::Contrast => format!("Contrast: {}%", percent(value)),
                    FilterParam::Saturation => format!("Saturation: {}%", percent(value)),
                    FilterParam::HueRotate => format!("Hue: {}deg", value),
                    FilterParam::Blur => format!("Blur: {}px", value),
                })
            }
            Command::ResetFilters => {
                slot.filter.reset(element);
                Applied::notice("Filters reset")
            }
            Command::Rotate => {
                let rotation = slot.transform.rotate();
                slot.transform.apply(element);
                Applied::notice(format!("Rotation: {}deg", rotation))
            }
            Command::Fullscreen => {
                let selector = self.sites.fullscreen_selector(&host)?;
                if !page.click(selector) {
                    log::debug!("No fullscreen control matching {} on {}", selector, host);
                }
                Applied::quiet()
            }
        };
        Some(applied)
    }

    fn change_rate(&self, rates: &mut RateStore, rate: f64, slot: &PlayerSlot) -> Applied {
        match rates.set(Some(rate), false, Some(slot.handle.element())) {
            Ok(outcome) if outcome.notify => Applied::notice(format!("Speed: {}x", outcome.rate)),
            Ok(_) => Applied::quiet(),
            Err(e) => {
                log::error!("Playback rate change failed: {}", e);
                Applied::quiet()
            }
        }
    }
}
