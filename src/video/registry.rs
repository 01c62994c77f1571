use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::core::{FilterState, TransformState};
use crate::video::{Container, ElementId, PlayerHandle};

/// Per-player state kept alongside the host element.
#[derive(Debug)]
pub struct PlayerSlot {
    pub handle: PlayerHandle,
    pub filter: FilterState,
    pub transform: TransformState,
    /// Initialized while it was the only player on the page.
    pub single: bool,
    pub pointer_inside: bool,
    /// Present in the most recent scan.
    pub attached: bool,
    playing_transitions: u32,
}

impl PlayerSlot {
    fn new(handle: PlayerHandle) -> Self {
        Self {
            handle,
            filter: FilterState::default(),
            transform: TransformState::default(),
            single: false,
            pointer_inside: false,
            attached: true,
            playing_transitions: 0,
        }
    }

    pub fn id(&self) -> ElementId {
        self.handle.id()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    Empty,
    Single(ElementId),
    Multiple(Vec<ElementId>),
}

/// Knows every media element across the document and its unlocked subtrees,
/// and which one receives commands.
pub struct PlayerRegistry {
    containers: Vec<Rc<dyn Container>>,
    slots: HashMap<ElementId, PlayerSlot>,
    order: Vec<ElementId>,
    seen: HashSet<ElementId>,
    active: Option<ElementId>,
}

impl PlayerRegistry {
    pub fn new(document: Rc<dyn Container>) -> Self {
        Self {
            containers: vec![document],
            slots: HashMap::new(),
            order: Vec::new(),
            seen: HashSet::new(),
            active: None,
        }
    }

    /// Returns false when the container was already known.
    pub fn add_container(&mut self, container: Rc<dyn Container>) -> bool {
        let id = container.container_id();
        if self.containers.iter().any(|known| known.container_id() == id) {
            return false;
        }
        log::debug!("Tracking container {:?}", id);
        self.containers.push(container);
        true
    }

    /// Every media element, document order per container, containers in discovery order.
    pub fn scan(&self) -> Vec<PlayerHandle> {
        self.containers
            .iter()
            .flat_map(|container| container.media_elements())
            .map(PlayerHandle::new)
            .collect()
    }

    /// Rescans and refreshes which players are present.
    pub fn detect(&mut self) -> Detection {
        let handles = self.scan();
        let present: HashSet<ElementId> = handles.iter().map(PlayerHandle::id).collect();

        for slot in self.slots.values_mut() {
            slot.attached = present.contains(&slot.id());
        }

        self.order.clear();
        for handle in handles {
            let id = handle.id();
            if self.order.contains(&id) {
                continue;
            }
            self.order.push(id);
            self.slots
                .entry(id)
                .or_insert_with(|| {
                    log::info!("Found media element {}", id);
                    PlayerSlot::new(handle)
                })
                .attached = true;
        }

        match self.order.as_slice() {
            [] => Detection::Empty,
            [only] => Detection::Single(*only),
            many => Detection::Multiple(many.to_vec()),
        }
    }

    pub fn player_count(&self) -> usize {
        self.order.len()
    }

    pub fn select_active(&mut self, id: ElementId) -> bool {
        if !self.slots.contains_key(&id) {
            log::warn!("Cannot select unknown player {}", id);
            return false;
        }
        if self.active != Some(id) {
            log::debug!("Active player is now {}", id);
        }
        self.active = Some(id);
        true
    }

    /// The player commands go to: the selected one while it is attached,
    /// otherwise the first attached player.
    pub fn current(&self) -> Option<ElementId> {
        self.active
            .filter(|id| self.slots.get(id).map(|slot| slot.attached).unwrap_or(false))
            .or_else(|| self.order.first().copied())
    }

    pub fn slot(&self, id: ElementId) -> Option<&PlayerSlot> {
        self.slots.get(&id)
    }

    pub fn slot_mut(&mut self, id: ElementId) -> Option<&mut PlayerSlot> {
        self.slots.get_mut(&id)
    }

    /// First-time setup of a player: neutral filters and transform. Returns
    /// false when the player was already initialized.
    pub fn initialize(&mut self, id: ElementId, single: bool) -> bool {
        let Some(slot) = self.slots.get_mut(&id) else {
            return false;
        };
        if !self.seen.insert(id) {
            return false;
        }

        slot.single = single;
        slot.filter.reset(slot.handle.element());
        slot.transform = TransformState::default();
        log::info!("Initialized player {} ({})", id, if single { "single" } else { "shared" });
        true
    }

    pub fn is_initialized(&self, id: ElementId) -> bool {
        self.seen.contains(&id)
    }

    /// Counts a transition into playing; returns how many came before it.
    pub fn note_playing(&mut self, id: ElementId) -> Option<u32> {
        let slot = self.slots.get_mut(&id)?;
        let previous = slot.playing_transitions;
        slot.playing_transitions += 1;
        Some(previous)
    }

    pub fn set_pointer_inside(&mut self, id: ElementId, inside: bool) {
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.pointer_inside = inside;
        }
    }

    /// Whether the player receiving commands has the pointer over it.
    pub fn current_has_focus(&self) -> bool {
        self.current()
            .and_then(|id| self.slots.get(&id))
            .map(|slot| slot.pointer_inside)
            .unwrap_or(false)
    }

    pub fn detach(&mut self, id: ElementId) {
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.attached = false;
            slot.pointer_inside = false;
        }
        self.order.retain(|known| *known != id);
        log::info!("Player {} left the document", id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimContainer, SimVideo};

    fn registry_with(videos: &[u64]) -> (PlayerRegistry, Rc<SimContainer>) {
        let document = Rc::new(SimContainer::new(0));
        for id in videos {
            document.insert(Rc::new(SimVideo::new(*id)));
        }
        (PlayerRegistry::new(document.clone()), document)
    }

    #[test]
    fn test_scan_orders_document_then_subtrees() {
        let (mut registry, _document) = registry_with(&[1, 2]);
        let subtree = Rc::new(SimContainer::new(1));
        subtree.insert(Rc::new(SimVideo::new(10)));
        assert!(registry.add_container(subtree.clone()));
        assert!(!registry.add_container(subtree));

        let ids: Vec<u64> = registry.scan().iter().map(|h| h.id().0).collect();
        assert_eq!(ids, vec![1, 2, 10]);
    }

    #[test]
    fn test_detect_single_and_multiple() {
        let (mut registry, document) = registry_with(&[]);
        assert_eq!(registry.detect(), Detection::Empty);

        document.insert(Rc::new(SimVideo::new(1)));
        assert_eq!(registry.detect(), Detection::Single(ElementId(1)));

        document.insert(Rc::new(SimVideo::new(2)));
        assert_eq!(registry.detect(), Detection::Multiple(vec![ElementId(1), ElementId(2)]));
    }

    #[test]
    fn test_initialize_only_once() {
        let (mut registry, document) = registry_with(&[1]);
        registry.detect();

        assert!(registry.initialize(ElementId(1), true));
        assert!(!registry.initialize(ElementId(1), false));
        assert!(registry.slot(ElementId(1)).unwrap().single);

        // Rediscovery does not reset the seen marker
        registry.detect();
        assert!(!registry.initialize(ElementId(1), true));
        assert_eq!(
            document.video(1).unwrap().filter_style(),
            "brightness(1) contrast(1) saturate(1) hue-rotate(0deg) blur(0px)"
        );
    }

    #[test]
    fn test_current_falls_back_to_first_attached() {
        let (mut registry, document) = registry_with(&[1, 2]);
        registry.detect();
        assert_eq!(registry.current(), Some(ElementId(1)));

        registry.select_active(ElementId(2));
        assert_eq!(registry.current(), Some(ElementId(2)));

        document.remove(2);
        registry.detach(ElementId(2));
        assert_eq!(registry.current(), Some(ElementId(1)));
        assert!(!registry.slot(ElementId(2)).unwrap().attached);
    }

    #[test]
    fn test_note_playing_counts_transitions() {
        let (mut registry, _document) = registry_with(&[1]);
        registry.detect();
        assert_eq!(registry.note_playing(ElementId(1)), Some(0));
        assert_eq!(registry.note_playing(ElementId(1)), Some(1));
        assert_eq!(registry.note_playing(ElementId(9)), None);
    }

    #[test]
    fn test_focus_follows_current_player() {
        let (mut registry, _document) = registry_with(&[1, 2]);
        registry.detect();
        registry.set_pointer_inside(ElementId(2), true);
        assert!(!registry.current_has_focus());

        registry.select_active(ElementId(2));
        assert!(registry.current_has_focus());
    }
}
