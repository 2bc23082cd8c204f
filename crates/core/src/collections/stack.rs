#![allow(missing_docs)]

use crate::error::{KitchenError, KitchenResult};

/// Labelled LIFO stack with an optional fixed capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedStack<T> {
    label: String,
    capacity: Option<usize>,
    items: Vec<T>,
}

impl<T> BoundedStack<T> {
    /// Create an empty stack that holds at most `capacity` items.
    pub fn new(label: impl Into<String>, capacity: usize) -> Self {
        Self {
            label: label.into(),
            capacity: Some(capacity),
            items: Vec::with_capacity(capacity),
        }
    }

    /// Create an empty stack that never reports itself full.
    pub fn unbounded(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            capacity: None,
            items: Vec::new(),
        }
    }

    /// Label used in error messages.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Fixed capacity, or `None` for an unbounded stack.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn push(&mut self, item: T) -> KitchenResult<()> {
        if self.is_full() {
            return Err(KitchenError::CapacityExceeded {
                container: self.label.clone(),
                capacity: self.capacity.unwrap_or(usize::MAX),
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Remove and return the most recently pushed item.
    pub fn pop(&mut self) -> KitchenResult<T> {
        self.items.pop().ok_or_else(|| self.empty("pop"))
    }

    /// Borrow the most recently pushed item without removing it.
    pub fn peek(&self) -> KitchenResult<&T> {
        self.items.last().ok_or_else(|| self.empty("peek"))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capacity
            .map(|capacity| self.items.len() >= capacity)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Contents ordered bottom to top (insertion order).
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn empty(&self, operation: &'static str) -> KitchenError {
        KitchenError::Empty {
            container: self.label.clone(),
            operation,
        }
    }
}

impl<T: PartialEq> BoundedStack<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_is_last_in_first_out() -> KitchenResult<()> {
        let mut stack = BoundedStack::new("Station A", 3);
        stack.push("bun")?;
        stack.push("patty")?;
        assert_eq!(stack.peek()?, &"patty");
        assert_eq!(stack.pop()?, "patty");
        assert_eq!(stack.pop()?, "bun");
        assert!(stack.is_empty());
        Ok(())
    }

    #[test]
    fn push_beyond_capacity_fails_without_mutating() -> KitchenResult<()> {
        let mut stack = BoundedStack::new("Station B", 2);
        stack.push(1)?;
        stack.push(2)?;
        assert!(stack.is_full());

        let err = stack.push(3).unwrap_err();
        assert_eq!(
            err,
            KitchenError::CapacityExceeded {
                container: "Station B".to_string(),
                capacity: 2,
            }
        );
        assert_eq!(stack.items(), &[1, 2]);
        Ok(())
    }

    #[test]
    fn empty_stack_reports_operation() {
        let mut stack: BoundedStack<u8> = BoundedStack::unbounded("Reserve");
        assert_eq!(
            stack.pop().unwrap_err(),
            KitchenError::Empty {
                container: "Reserve".to_string(),
                operation: "pop",
            }
        );
        assert!(matches!(
            stack.peek(),
            Err(KitchenError::Empty { operation: "peek", .. })
        ));
    }

    #[test]
    fn unbounded_stack_is_never_full() -> KitchenResult<()> {
        let mut stack = BoundedStack::unbounded("Reserve");
        for value in 0..64 {
            stack.push(value)?;
        }
        assert!(!stack.is_full());
        assert_eq!(stack.capacity(), None);
        assert_eq!(stack.len(), 64);
        Ok(())
    }

    #[test]
    fn items_are_bottom_to_top_and_clear_discards_them() -> KitchenResult<()> {
        let mut stack = BoundedStack::new("Station C", 3);
        stack.push('a')?;
        stack.push('b')?;
        stack.push('c')?;
        assert_eq!(stack.items(), &['a', 'b', 'c']);
        assert!(stack.contains(&'b'));

        stack.clear();
        assert!(stack.is_empty());
        assert!(!stack.contains(&'b'));
        stack.push('d')?;
        assert_eq!(stack.items(), &['d']);
        Ok(())
    }
}
