use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use crate::core::{EngineConfig, JsonFileStore, MemoryStore, PersistenceStore};
use crate::engine::{Engine, Host, KeyOutcome};
use crate::hotkeys::KeyEvent;
use crate::sim::{ManualClock, RecordingToast, SimContainer, SimPage, SimVideo};
use crate::video::{Container, DiscoveryFeed, ElementId, MediaElement, PageContext};

const STEP_MS: u64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Inserts a video into the document (container 0) or a known subtree.
    Video {
        id: u64,
        #[serde(default)]
        container: u64,
    },
    /// Unlocks a new encapsulated subtree.
    Subtree { id: u64 },
    Playing(u64),
    PointerEnter(u64),
    PointerLeave(u64),
    Key(KeyEvent),
    Rate(String),
    Advance { ms: u64 },
    Remove(u64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub location: String,
    /// Keep state in the per-origin file store instead of memory.
    #[serde(default)]
    pub persist: bool,
    #[serde(default)]
    pub store: BTreeMap<String, String>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerReport {
    pub id: u64,
    pub position: f64,
    pub playback_rate: f64,
    pub volume: f64,
    pub paused: bool,
    pub filter: String,
    pub transform: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub messages: Vec<String>,
    pub dispatched_keys: usize,
    pub active_player: Option<u64>,
    pub players: Vec<PlayerReport>,
    pub store: BTreeMap<String, String>,
}

impl Script {
    pub fn demo() -> Self {
        let key = |code| Step::Key(KeyEvent::new(code));
        Self {
            location: "https://video.example.com/watch/42".to_string(),
            persist: false,
            store: BTreeMap::from([(
                EngineConfig::default().storage.playback_rate,
                "1.5".to_string(),
            )]),
            steps: vec![
                Step::Video { id: 1, container: 0 },
                Step::Playing(1),
                Step::Advance { ms: 6000 },
                key(crate::hotkeys::keys::C),
                key(crate::hotkeys::keys::E),
                key(crate::hotkeys::keys::S),
                key(crate::hotkeys::keys::RIGHT),
                Step::Advance { ms: 3000 },
            ],
        }
    }

    pub fn run(&self, config: EngineConfig) -> anyhow::Result<Report> {
        let storage_keys = config.storage.clone();
        let page = Rc::new(SimPage::new(&self.location));
        let store: Rc<dyn PersistenceStore> = if self.persist {
            Rc::new(JsonFileStore::for_origin(&page.hostname())?)
        } else {
            Rc::new(MemoryStore::new())
        };
        for (key, value) in &self.store {
            store.set(key, value)?;
        }

        let toast = Rc::new(RecordingToast::new());
        let clock = Rc::new(ManualClock::new(chrono::Utc::now().timestamp_millis()));
        let mut containers = vec![Rc::new(SimContainer::new(0))];
        let mut videos: Vec<Rc<SimVideo>> = Vec::new();

        let (feed, receiver) = DiscoveryFeed::new();
        let mut engine = Engine::new(
            config,
            Host {
                document: containers[0].clone(),
                page,
                store: store.clone(),
                toast: toast.clone(),
                clock: clock.clone(),
            },
        );
        engine.attach_discovery(receiver);

        let mut dispatched_keys = 0;
        for step in &self.steps {
            match step {
                Step::Video { id, container } => {
                    let target = containers
                        .iter()
                        .find(|c| c.container_id().0 == *container)
                        .ok_or_else(|| anyhow::anyhow!("Unknown container {}", container))?;
                    let video = Rc::new(SimVideo::new(*id));
                    target.insert(video.clone());
                    videos.push(video);
                    feed.elements_changed();
                }
                Step::Subtree { id } => {
                    let subtree = Rc::new(SimContainer::new(*id));
                    containers.push(subtree.clone());
                    feed.container_appeared(subtree);
                }
                Step::Playing(id) => {
                    if let Some(video) = videos.iter().find(|v| v.element_id() == ElementId(*id)) {
                        video.play();
                    }
                    engine.on_playing(ElementId(*id));
                }
                Step::PointerEnter(id) => engine.on_pointer_enter(ElementId(*id)),
                Step::PointerLeave(id) => engine.on_pointer_leave(ElementId(*id)),
                Step::Key(event) => {
                    if engine.on_key_down(event) == KeyOutcome::Dispatched {
                        dispatched_keys += 1;
                    }
                }
                Step::Rate(input) => {
                    if let Err(e) = engine.request_playback_rate(input) {
                        log::warn!("Script rate step rejected: {}", e);
                    }
                }
                Step::Advance { ms } => {
                    let mut remaining = *ms;
                    while remaining > 0 {
                        let chunk = remaining.min(STEP_MS);
                        for video in &videos {
                            video.play_for(chunk as f64 / 1000.0);
                        }
                        clock.advance_millis(chunk as i64);
                        engine.tick(Duration::from_millis(chunk));
                        remaining -= chunk;
                    }
                }
                Step::Remove(id) => {
                    for container in &containers {
                        container.remove(*id);
                    }
                    feed.element_removed(ElementId(*id));
                }
            }
            engine.pump_discovery();
        }

        let mut stored = BTreeMap::new();
        let watched = [storage_keys.playback_rate, storage_keys.play_progress];
        for key in self.store.keys().chain(watched.iter()) {
            if let Some(value) = store.get(key)? {
                stored.insert(key.clone(), value);
            }
        }

        Ok(Report {
            messages: toast.messages(),
            dispatched_keys,
            active_player: engine.current_player().map(|id| id.0),
            players: videos
                .iter()
                .map(|video| PlayerReport {
                    id: video.element_id().0,
                    position: video.current_time(),
                    playback_rate: video.playback_rate(),
                    volume: video.volume(),
                    paused: video.is_paused(),
                    filter: video.filter_style(),
                    transform: video.transform_style(),
                })
                .collect(),
            store: stored,
        })
    }
}
