use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(pub u64);

/// A playable media element owned by the host page.
///
/// All methods take `&self`: the element lives in the host and the engine
/// only ever holds a reference to it.
pub trait MediaElement {
    fn element_id(&self) -> ElementId;

    fn current_time(&self) -> f64;
    /// Hosts clamp the position to the media's seekable range.
    fn set_current_time(&self, secs: f64);

    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);

    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&self, rate: f64);

    fn is_paused(&self) -> bool;
    fn play(&self);
    fn pause(&self);

    /// Media source locator, used when the page location is unavailable.
    fn source(&self) -> Option<String>;

    fn set_filter_style(&self, filter: &str);
    fn set_transform_style(&self, transform: &str);
}

/// The main document or an encapsulated subtree that can be scanned for media.
pub trait Container {
    fn container_id(&self) -> ContainerId;
    /// Media elements in document order.
    fn media_elements(&self) -> Vec<Rc<dyn MediaElement>>;
}

pub trait PageContext {
    fn location(&self) -> Option<String>;
    fn hostname(&self) -> String;
    /// Clicks the first element matching `selector`; false when none matched.
    fn click(&self, selector: &str) -> bool;
}

#[derive(Clone)]
pub struct PlayerHandle {
    element: Rc<dyn MediaElement>,
}

impl PlayerHandle {
    pub fn new(element: Rc<dyn MediaElement>) -> Self {
        Self { element }
    }

    pub fn id(&self) -> ElementId {
        self.element.element_id()
    }

    pub fn element(&self) -> &dyn MediaElement {
        self.element.as_ref()
    }
}

impl fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerHandle").field("id", &self.id()).finish()
    }
}
