#![allow(missing_docs)]

use std::collections::VecDeque;

use crate::error::{KitchenError, KitchenResult};

/// Labelled, unbounded FIFO queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FifoQueue<T> {
    label: String,
    items: VecDeque<T>,
}

impl<T> FifoQueue<T> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            items: VecDeque::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Append an item at the rear.
    pub fn enqueue(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Remove and return the oldest item.
    pub fn dequeue(&mut self) -> KitchenResult<T> {
        self.items.pop_front().ok_or_else(|| self.empty("dequeue"))
    }

    /// Borrow the oldest item without removing it.
    pub fn peek(&self) -> KitchenResult<&T> {
        self.items.front().ok_or_else(|| self.empty("peek"))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    fn empty(&self, operation: &'static str) -> KitchenError {
        KitchenError::Empty {
            container: self.label.clone(),
            operation,
        }
    }
}

impl<T: Clone> FifoQueue<T> {
    /// Copy of the contents, oldest first.
    pub fn items(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T> Extend<T> for FifoQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}
