//! Ordered container of rendered cards.

use std::collections::VecDeque;

use crate::card::CardView;
use crate::model::{CardId, CardSnapshot};

/// The card list, in display order
#[derive(Clone, Debug, Default)]
pub struct Section {
    items: VecDeque<CardView>,
}

impl Section {
    /// Create an empty section
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents, keeping input order
    pub fn render_all<I>(&mut self, views: I) -> Vec<CardSnapshot>
    where
        I: IntoIterator<Item = CardView>,
    {
        self.items = views.into_iter().collect();
        self.snapshots()
    }

    /// Insert at the beginning
    pub fn prepend(&mut self, view: CardView) -> CardSnapshot {
        let snapshot = view.snapshot();
        self.items.push_front(view);
        snapshot
    }

    /// Insert at the end
    pub fn append(&mut self, view: CardView) -> CardSnapshot {
        let snapshot = view.snapshot();
        self.items.push_back(view);
        snapshot
    }

    /// Detach a card
    pub fn remove(&mut self, id: &CardId) -> Option<CardView> {
        let idx = self.items.iter().position(|v| v.id() == id)?;
        self.items.remove(idx)
    }

    /// Look up a card
    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&CardView> {
        self.items.iter().find(|v| v.id() == id)
    }

    /// Look up a card for mutation
    pub fn get_mut(&mut self, id: &CardId) -> Option<&mut CardView> {
        self.items.iter_mut().find(|v| v.id() == id)
    }

    /// Cards in display order
    pub fn iter(&self) -> impl Iterator<Item = &CardView> {
        self.items.iter()
    }

    /// Snapshots in display order
    #[must_use]
    pub fn snapshots(&self) -> Vec<CardSnapshot> {
        self.items.iter().map(CardView::snapshot).collect()
    }

    /// Number of cards
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
