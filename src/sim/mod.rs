//! In-memory host: stand-ins for page, media elements and the toast widget.
//! Drives the scripted binary and the test suite.

pub mod script;

use chrono::{DateTime, TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::video::{Container, ContainerId, ElementId, MediaElement, PageContext, ToastSurface, WallClock};

#[derive(Debug)]
pub struct SimVideo {
    id: ElementId,
    current_time: Cell<f64>,
    duration: Cell<f64>,
    volume: Cell<f64>,
    playback_rate: Cell<f64>,
    paused: Cell<bool>,
    source: RefCell<Option<String>>,
    filter: RefCell<String>,
    transform: RefCell<String>,
}

impl SimVideo {
    pub fn new(id: u64) -> Self {
        Self {
            id: ElementId(id),
            current_time: Cell::new(0.0),
            duration: Cell::new(600.0),
            volume: Cell::new(1.0),
            playback_rate: Cell::new(1.0),
            paused: Cell::new(true),
            source: RefCell::new(Some(format!("blob:video-{}", id))),
            filter: RefCell::new(String::new()),
            transform: RefCell::new(String::new()),
        }
    }

    pub fn with_volume(self, volume: f64) -> Self {
        self.volume.set(volume);
        self
    }

    pub fn with_duration(self, duration: f64) -> Self {
        self.duration.set(duration);
        self
    }

    pub fn filter_style(&self) -> String {
        self.filter.borrow().clone()
    }

    pub fn transform_style(&self) -> String {
        self.transform.borrow().clone()
    }

    /// Moves the playhead as if the media had been playing for `secs`.
    pub fn play_for(&self, secs: f64) {
        if !self.paused.get() {
            self.set_current_time(self.current_time.get() + secs * self.playback_rate.get());
        }
    }
}

impl MediaElement for SimVideo {
    fn element_id(&self) -> ElementId {
        self.id
    }

    fn current_time(&self) -> f64 {
        self.current_time.get()
    }

    fn set_current_time(&self, secs: f64) {
        self.current_time.set(secs.clamp(0.0, self.duration.get()));
    }

    fn volume(&self) -> f64 {
        self.volume.get()
    }

    fn set_volume(&self, volume: f64) {
        self.volume.set(volume.clamp(0.0, 1.0));
    }

    fn playback_rate(&self) -> f64 {
        self.playback_rate.get()
    }

    fn set_playback_rate(&self, rate: f64) {
        self.playback_rate.set(rate);
    }

    fn is_paused(&self) -> bool {
        self.paused.get()
    }

    fn play(&self) {
        self.paused.set(false);
    }

    fn pause(&self) {
        self.paused.set(true);
    }

    fn source(&self) -> Option<String> {
        self.source.borrow().clone()
    }

    fn set_filter_style(&self, filter: &str) {
        *self.filter.borrow_mut() = filter.to_string();
    }

    fn set_transform_style(&self, transform: &str) {
        *self.transform.borrow_mut() = transform.to_string();
    }
}

#[derive(Debug)]
pub struct SimContainer {
    id: ContainerId,
    videos: RefCell<Vec<Rc<SimVideo>>>,
}

impl SimContainer {
    pub fn new(id: u64) -> Self {
        Self {
            id: ContainerId(id),
            videos: RefCell::new(Vec::new()),
        }
    }

    pub fn insert(&self, video: Rc<SimVideo>) {
        self.videos.borrow_mut().push(video);
    }

    pub fn remove(&self, id: u64) -> Option<Rc<SimVideo>> {
        let mut videos = self.videos.borrow_mut();
        let index = videos.iter().position(|video| video.id == ElementId(id))?;
        Some(videos.remove(index))
    }

    pub fn video(&self, id: u64) -> Option<Rc<SimVideo>> {
        self.videos.borrow().iter().find(|video| video.id == ElementId(id)).cloned()
    }
}

impl Container for SimContainer {
    fn container_id(&self) -> ContainerId {
        self.id
    }

    fn media_elements(&self) -> Vec<Rc<dyn MediaElement>> {
        self.videos
            .borrow()
            .iter()
            .map(|video| video.clone() as Rc<dyn MediaElement>)
            .collect()
    }
}

#[derive(Debug)]
pub struct SimPage {
    location: Option<String>,
    hostname: String,
    controls: RefCell<Vec<String>>,
    clicks: RefCell<Vec<String>>,
}

impl SimPage {
    pub fn new(location: &str) -> Self {
        let hostname = location
            .split("://")
            .nth(1)
            .unwrap_or(location)
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            location: Some(location.to_string()),
            hostname,
            controls: RefCell::new(Vec::new()),
            clicks: RefCell::new(Vec::new()),
        }
    }

    /// A page whose location cannot be read.
    pub fn without_location(hostname: &str) -> Self {
        Self {
            location: None,
            hostname: hostname.to_string(),
            controls: RefCell::new(Vec::new()),
            clicks: RefCell::new(Vec::new()),
        }
    }

    pub fn add_control(&self, selector: &str) {
        self.controls.borrow_mut().push(selector.to_string());
    }

    pub fn clicks(&self) -> Vec<String> {
        self.clicks.borrow().clone()
    }
}

impl PageContext for SimPage {
    fn location(&self) -> Option<String> {
        self.location.clone()
    }

    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn click(&self, selector: &str) -> bool {
        if self.controls.borrow().iter().any(|control| control == selector) {
            self.clicks.borrow_mut().push(selector.to_string());
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingToast {
    messages: RefCell<Vec<String>>,
    anchors: RefCell<Vec<ElementId>>,
    visible: Cell<bool>,
    opacity: Cell<f32>,
}

impl RecordingToast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn last_message(&self) -> Option<String> {
        self.messages.borrow().last().cloned()
    }

    pub fn last_anchor(&self) -> Option<ElementId> {
        self.anchors.borrow().last().copied()
    }

    pub fn clear(&self) {
        self.messages.borrow_mut().clear();
        self.anchors.borrow_mut().clear();
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity.get()
    }
}

impl ToastSurface for RecordingToast {
    fn set_text(&self, anchor: ElementId, text: &str) {
        self.messages.borrow_mut().push(text.to_string());
        self.anchors.borrow_mut().push(anchor);
    }

    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
        if !visible {
            self.opacity.set(0.0);
        }
    }

    fn set_opacity(&self, opacity: f32) {
        self.opacity.set(opacity);
    }
}

#[derive(Debug)]
pub struct ManualClock {
    millis: Cell<i64>,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            millis: Cell::new(start_millis),
        }
    }

    pub fn advance_millis(&self, millis: i64) {
        self.millis.set(self.millis.get() + millis);
    }
}

impl WallClock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.millis.get())
            .single()
            .unwrap_or_else(Utc::now)
    }
}
