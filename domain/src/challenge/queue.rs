//! FIFO of generated challenge items awaiting delivery.

use super::item::ChallengeItem;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Challenge items waiting to be handed to the narrator.
///
/// Items enter through [`ChallengeQueue::enqueue`] when the challenge-setter
/// produces them and leave exactly once through [`ChallengeQueue::dequeue`].
/// There is no way to put a dequeued item back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeQueue {
    items: VecDeque<ChallengeItem>,
}

impl ChallengeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, item: ChallengeItem) {
        self.items.push_back(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = ChallengeItem>) {
        self.items.extend(items);
    }

    pub fn dequeue(&mut self) -> Option<ChallengeItem> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&ChallengeItem> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChallengeItem> {
        self.items.iter()
    }
}
