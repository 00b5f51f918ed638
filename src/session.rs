use std::collections::HashSet;
use tracing::info;

use crate::wheel::{parse_questions, Item, WheelConfig};

/// Outcome shown after a spin lands, waiting for done/keep
#[derive(Debug, Clone, PartialEq)]
pub struct PendingResult {
    pub item: Item,
}

/// Wheel contents plus progress through them
#[derive(Debug, Clone, Default)]
pub struct Session {
    wheel: WheelConfig,
    removed: HashSet<String>,
    last_completed: Option<String>,
    pending: Option<PendingResult>,
}

impl Session {
    pub fn new(wheel: WheelConfig) -> Self {
        Self {
            wheel,
            ..Self::default()
        }
    }

    pub fn wheel(&self) -> &WheelConfig {
        &self.wheel
    }

    pub fn name(&self) -> &str {
        &self.wheel.name
    }

    /// Items still on the wheel, in wheel order
    pub fn active_items(&self) -> Vec<Item> {
        self.wheel
            .items
            .iter()
            .filter(|item| !self.removed.contains(&item.id))
            .cloned()
            .collect()
    }

    pub fn is_removed(&self, id: &str) -> bool {
        self.removed.contains(id)
    }

    pub fn total_count(&self) -> usize {
        self.wheel.items.len()
    }

    /// Removed ids that still belong to an item on the wheel
    pub fn completed_count(&self) -> usize {
        self.wheel
            .items
            .iter()
            .filter(|item| self.removed.contains(&item.id))
            .count()
    }

    pub fn progress_percent(&self) -> u8 {
        let total = self.total_count();
        if total == 0 {
            return 0;
        }
        ((self.completed_count() as f64 / total as f64) * 100.0).round() as u8
    }

    pub fn last_completed(&self) -> Option<&str> {
        self.last_completed.as_deref()
    }

    pub fn pending(&self) -> Option<&PendingResult> {
        self.pending.as_ref()
    }

    /// A spin may start only when nothing awaits a decision
    pub fn can_spin(&self) -> bool {
        self.pending.is_none() && !self.active_items().is_empty()
    }

    pub fn set_pending(&mut self, item: Item) {
        info!("Wheel landed on: {}", item.question);
        self.pending = Some(PendingResult { item });
    }

    /// "Done": take the pending item off the wheel
    pub fn accept_pending(&mut self) -> Option<Item> {
        let pending = self.pending.take()?;
        self.remove(&pending.item.id);
        Some(pending.item)
    }

    /// "Keep": leave the pending item on the wheel
    pub fn keep_pending(&mut self) -> Option<Item> {
        self.pending.take().map(|p| p.item)
    }

    pub fn remove(&mut self, id: &str) {
        if let Some(item) = self.wheel.items.iter().find(|item| item.id == id) {
            self.last_completed = Some(item.question.clone());
        }
        self.removed.insert(id.to_string());
    }

    pub fn restore_all(&mut self) {
        self.removed.clear();
        self.last_completed = None;
    }

    /// Replace the whole wheel; progress starts over
    pub fn import(&mut self, wheel: WheelConfig) {
        info!("Imported wheel '{}' with {} items", wheel.name, wheel.items.len());
        self.wheel = wheel;
        self.removed.clear();
        self.last_completed = None;
        self.pending = None;
    }

    pub fn replace_items(&mut self, items: Vec<Item>) {
        self.wheel.items = items;
    }

    /// Re-read the item list from text, keeping ids of unchanged questions
    pub fn set_questions(&mut self, text: &str) {
        let items = parse_questions(text, &self.wheel.items);
        self.replace_items(items);
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.wheel.name = name.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(text: &str) -> Session {
        let mut s = Session::new(WheelConfig::default());
        s.set_questions(text);
        s
    }

    #[test]
    fn test_active_items_exclude_removed() {
        let mut s = session("a\nb\nc");
        let b = s.wheel().items[1].id.clone();
        s.remove(&b);
        let active: Vec<String> = s.active_items().into_iter().map(|i| i.question).collect();
        assert_eq!(active, vec!["a", "c"]);
        assert_eq!(s.last_completed(), Some("b"));
    }

    #[test]
    fn test_progress() {
        let mut s = session("a\nb\nc");
        assert_eq!(s.progress_percent(), 0);
        let a = s.wheel().items[0].id.clone();
        s.remove(&a);
        assert_eq!(s.completed_count(), 1);
        assert_eq!(s.progress_percent(), 33);
        let c = s.wheel().items[2].id.clone();
        s.remove(&c);
        assert_eq!(s.progress_percent(), 67);
        assert_eq!(Session::default().progress_percent(), 0);
    }

    #[test]
    fn test_stale_removed_ids_not_counted() {
        let mut s = session("a\nb");
        s.remove("no-such-id");
        assert_eq!(s.completed_count(), 0);
        assert_eq!(s.active_items().len(), 2);
    }

    #[test]
    fn test_pending_blocks_spin_until_resolved() {
        let mut s = session("a\nb");
        assert!(s.can_spin());
        let item = s.active_items()[0].clone();
        s.set_pending(item.clone());
        assert!(!s.can_spin());

        assert_eq!(s.keep_pending(), Some(item.clone()));
        assert!(s.can_spin());
        assert_eq!(s.active_items().len(), 2);

        s.set_pending(item.clone());
        assert_eq!(s.accept_pending(), Some(item));
        assert_eq!(s.active_items().len(), 1);
        assert_eq!(s.accept_pending(), None);
    }

    #[test]
    fn test_restore_all() {
        let mut s = session("a\nb");
        let ids: Vec<String> = s.wheel().items.iter().map(|i| i.id.clone()).collect();
        for id in &ids {
            s.remove(id);
        }
        assert!(!s.can_spin());
        s.restore_all();
        assert_eq!(s.active_items().len(), 2);
        assert_eq!(s.last_completed(), None);
    }

    #[test]
    fn test_import_resets_progress() {
        let mut s = session("a\nb");
        let a = s.wheel().items[0].id.clone();
        s.remove(&a);
        s.import(WheelConfig {
            id: "new".to_string(),
            name: "Imported".to_string(),
            items: parse_questions("x\ny\nz", &[]),
        });
        assert_eq!(s.name(), "Imported");
        assert_eq!(s.completed_count(), 0);
        assert_eq!(s.active_items().len(), 3);
    }

    #[test]
    fn test_set_questions_keeps_ids() {
        let mut s = session("a\nb");
        let b = s.wheel().items[1].id.clone();
        s.set_questions("b\nc");
        assert_eq!(s.wheel().items[0].id, b);
        s.rename("Renamed");
        assert_eq!(s.name(), "Renamed");
    }
}
