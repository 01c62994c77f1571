use std::fmt;
use std::rc::Rc;
use tokio::sync::broadcast;

use crate::video::{Container, ElementId};

/// Notifications from whatever watches the host for new media.
#[derive(Clone)]
pub enum Discovery {
    /// A container (the document or an unlocked subtree) became scannable.
    ContainerAppeared(Rc<dyn Container>),
    /// Media elements were inserted somewhere in a known container.
    ElementsChanged,
    ElementRemoved(ElementId),
}

impl fmt::Debug for Discovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discovery::ContainerAppeared(container) => {
                write!(f, "ContainerAppeared({:?})", container.container_id())
            }
            Discovery::ElementsChanged => write!(f, "ElementsChanged"),
            Discovery::ElementRemoved(id) => write!(f, "ElementRemoved({})", id),
        }
    }
}

/// Publishing side handed to the host's discovery mechanism.
pub struct DiscoveryFeed {
    event_sender: broadcast::Sender<Discovery>,
}

impl DiscoveryFeed {
    pub fn new() -> (Self, broadcast::Receiver<Discovery>) {
        let (event_sender, event_receiver) = broadcast::channel(64);
        (DiscoveryFeed { event_sender }, event_receiver)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Discovery> {
        self.event_sender.subscribe()
    }

    pub fn container_appeared(&self, container: Rc<dyn Container>) {
        let id = container.container_id();
        self.publish(Discovery::ContainerAppeared(container));
        log::debug!("Container {:?} announced", id);
    }

    pub fn elements_changed(&self) {
        self.publish(Discovery::ElementsChanged);
    }

    pub fn element_removed(&self, id: ElementId) {
        self.publish(Discovery::ElementRemoved(id));
    }

    fn publish(&self, event: Discovery) {
        if let Err(e) = self.event_sender.send(event) {
            log::error!("Failed to send discovery event {:?}: no receivers", e.0);
        }
    }
}
