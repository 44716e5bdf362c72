//! Fixed-capacity arena of pursuer slots.
//! Slots are reused on release so the worst-case agent count stays bounded.

use crate::sim::pursuit::Pursuer;
use crate::types::AgentId;

#[derive(Clone, Debug)]
struct Slot {
    active: bool,
    pursuer: Pursuer,
}

#[derive(Clone, Debug)]
pub struct PursuerPool {
    slots: Vec<Slot>,
}

impl PursuerPool {
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|index| Slot { active: false, pursuer: Pursuer::new(AgentId(index as u16)) })
            .collect();
        Self { slots }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }

    /// Activate the lowest free slot. The returned pursuer is in its reset
    /// state; the caller places it.
    pub fn acquire(&mut self) -> Option<AgentId> {
        let slot = self.slots.iter_mut().find(|slot| !slot.active)?;
        slot.active = true;
        slot.pursuer.reset();
        Some(slot.pursuer.id)
    }

    /// Deactivate a slot. Returns false if it was not active.
    pub fn release(&mut self, id: AgentId) -> bool {
        let Some(slot) = self.slots.get_mut(usize::from(id.0)) else {
            return false;
        };
        if !slot.active {
            return false;
        }
        slot.active = false;
        slot.pursuer.reset();
        true
    }

    pub fn get(&self, id: AgentId) -> Option<&Pursuer> {
        self.slots.get(usize::from(id.0)).filter(|slot| slot.active).map(|slot| &slot.pursuer)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Pursuer> {
        self.slots
            .get_mut(usize::from(id.0))
            .filter(|slot| slot.active)
            .map(|slot| &mut slot.pursuer)
    }

    /// Active pursuers in slot order.
    pub fn iter_active(&self) -> impl Iterator<Item = &Pursuer> {
        self.slots.iter().filter(|slot| slot.active).map(|slot| &slot.pursuer)
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut Pursuer> {
        self.slots.iter_mut().filter(|slot| slot.active).map(|slot| &mut slot.pursuer)
    }
}
