//! Advice Book
//!
//! Ordered advice list that remembers where each symbol's first item
//! lives, so later rules can annotate it instead of adding a new one.

use std::collections::HashMap;

use crate::model::{AdviceAction, AdviceItem};

#[derive(Debug, Default)]
pub(crate) struct AdviceBook {
    items: Vec<AdviceItem>,
    first_by_symbol: HashMap<String, usize>,
}

impl AdviceBook {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, symbol: &str, action: AdviceAction, message: &str) {
        self.first_by_symbol
            .entry(symbol.to_owned())
            .or_insert(self.items.len());
        self.items.push(AdviceItem::new(symbol, action, message));
    }

    /// Append `message` to the first item already recorded for `symbol`,
    /// or record a fresh item with `fallback` if the symbol has none.
    pub(crate) fn annotate_or_push(&mut self, symbol: &str, fallback: AdviceAction, message: &str) {
        match self.first_by_symbol.get(symbol) {
            Some(&index) => {
                let item = &mut self.items[index];
                item.message.push(' ');
                item.message.push_str(message);
            }
            None => self.push(symbol, fallback, message),
        }
    }

    pub(crate) fn into_items(self) -> Vec<AdviceItem> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_targets_first_item_for_symbol() {
        let mut book = AdviceBook::new();
        book.push("A", AdviceAction::Reduce, "first.");
        book.push("B", AdviceAction::Buy, "other.");
        book.push("A", AdviceAction::HoldOrBuy, "second.");

        book.annotate_or_push("A", AdviceAction::Caution, "risky.");

        let items = book.into_items();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].message, "first. risky.");
        assert_eq!(items[2].message, "second.");
    }

    #[test]
    fn test_annotate_without_existing_item_pushes_fallback() {
        let mut book = AdviceBook::new();
        book.push("B", AdviceAction::Buy, "other.");

        book.annotate_or_push("A", AdviceAction::Caution, "risky.");

        let items = book.into_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].symbol, "A");
        assert_eq!(items[1].action, AdviceAction::Caution);
        assert_eq!(items[1].message, "risky.");
    }
}
