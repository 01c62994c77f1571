use std::rc::Rc;

use crate::core::filter::round_to;
use crate::core::{EngineError, EngineResult, PersistenceStore};
use crate::video::MediaElement;

const DEFAULT_RATE: f64 = 1.0;
const MIN_RATE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateOutcome {
    pub rate: f64,
    /// Whether the change deserves a visible notice.
    pub notify: bool,
}

/// Playback rate shared by every player on the origin.
pub struct RateStore {
    store: Rc<dyn PersistenceStore>,
    key: String,
    current: f64,
}

impl RateStore {
    pub fn new(store: Rc<dyn PersistenceStore>, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
            current: DEFAULT_RATE,
        }
    }

    /// Persisted rate, or the last in-memory value when nothing usable is stored.
    pub fn get(&self) -> f64 {
        let stored = match self.store.get(&self.key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Playback rate read failed, using {}: {}", self.current, e);
                None
            }
        };

        let rate = stored
            .and_then(|raw| match raw.trim().parse::<f64>() {
                Ok(rate) if rate.is_finite() && rate > 0.0 => Some(rate),
                _ => {
                    log::warn!("Ignoring stored playback rate {:?}", raw);
                    None
                }
            })
            .unwrap_or(self.current);
        round_to(rate, 1)
    }

    /// Re-reads the persisted value into memory.
    pub fn sync(&mut self) -> f64 {
        self.current = self.get();
        self.current
    }

    /// Sets the shared rate. `None` re-applies the stored rate.
    pub fn set(
        &mut self,
        rate: Option<f64>,
        silent: bool,
        element: Option<&dyn MediaElement>,
    ) -> EngineResult<RateOutcome> {
        let resolved = match rate {
            Some(value) if !value.is_finite() => {
                log::error!("Rejected playback rate {}", value);
                return Err(EngineError::InvalidNumericInput(value.to_string()));
            }
            Some(value) if value <= 0.0 => MIN_RATE,
            Some(value) => round_to(value, 1).max(MIN_RATE),
            None => self.get(),
        };

        if let Err(e) = self.store.set(&self.key, &resolved.to_string()) {
            log::warn!("Playback rate write failed: {}", e);
        }
        self.current = resolved;
        if let Some(element) = element {
            element.set_playback_rate(resolved);
        }

        let implicit_neutral = rate.is_none() && resolved == DEFAULT_RATE;
        Ok(RateOutcome {
            rate: resolved,
            notify: !silent && !implicit_neutral,
        })
    }

    pub fn set_from_str(
        &mut self,
        input: &str,
        silent: bool,
        element: Option<&dyn MediaElement>,
    ) -> EngineResult<RateOutcome> {
        match input.trim().parse::<f64>() {
            Ok(value) => self.set(Some(value), silent, element),
            Err(_) => {
                log::error!("Rejected non-numeric playback rate {:?}", input);
                Err(EngineError::InvalidNumericInput(input.to_string()))
            }
        }
    }
}
