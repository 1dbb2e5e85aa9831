//! Items store: the ordered collection of cards and separators.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

/// Stable identifier of a grid item.
///
/// The id doubles as the DOM key of the item's content element; the
/// wrapper element is keyed `"<id>-wrapper"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh random id for hosts that do not carry their own.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// DOM key of the wrapper element around this item.
    pub fn wrapper_key(&self) -> String {
        format!("{}-wrapper", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Host-side description of one child of the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSource {
    pub id: ItemId,
    /// Explicit rank. Defaults to the child's position.
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub is_separator: bool,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl ItemSource {
    /// A card with no explicit order or fixed size.
    pub fn card(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            order: None,
            is_separator: false,
            width: None,
            height: None,
        }
    }

    /// A full-width separator.
    pub fn separator(id: impl Into<ItemId>) -> Self {
        Self {
            is_separator: true,
            ..Self::card(id)
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// One grid entry as seen by layout and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Placement rank, ascending.
    pub order: i64,
    /// Position after sorting by `order`.
    pub index: usize,
    pub is_separator: bool,
    /// Fixed width; measured from the DOM when absent.
    pub width: Option<f64>,
    /// Fixed height; measured from the DOM when absent.
    pub height: Option<f64>,
}

/// Owns the items and their order. Single source of truth for order.
///
/// Items are kept sorted by `order` (stable, so ties keep insertion order)
/// and `index` always equals the position in that sequence.
#[derive(Debug, Clone, Default)]
pub struct ItemsStore {
    items: Vec<Item>,
    /// Order each id had in the last children list it was synced from.
    source_orders: HashMap<ItemId, i64>,
}

impl ItemsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a children list.
    pub fn from_sources(children: impl IntoIterator<Item = ItemSource>) -> Self {
        let mut store = Self::new();
        store.sync(children);
        store
    }

    /// Re-derive the items from the host's children.
    ///
    /// Known ids whose source order is unchanged keep their local order, so
    /// a reorder that has not been committed by the host yet survives
    /// unrelated updates such as appended pages.
    pub fn sync(&mut self, children: impl IntoIterator<Item = ItemSource>) {
        let local_orders: HashMap<&ItemId, i64> =
            self.items.iter().map(|item| (&item.id, item.order)).collect();
        let mut seen = HashSet::new();
        let mut source_orders = HashMap::new();
        let mut items = Vec::new();

        for (position, source) in children.into_iter().enumerate() {
            if !seen.insert(source.id.clone()) {
                log::warn!("Duplicate item id {}, keeping the first occurrence", source.id);
                continue;
            }
            let source_order = source.order.unwrap_or(position as i64);
            let order = match (self.source_orders.get(&source.id), local_orders.get(&source.id)) {
                (Some(&previous), Some(&local)) if previous == source_order => local,
                _ => source_order,
            };
            source_orders.insert(source.id.clone(), source_order);
            items.push(Item {
                id: source.id,
                order,
                index: 0,
                is_separator: source.is_separator,
                width: source.width,
                height: source.height,
            });
        }

        drop(local_orders);
        self.items = items;
        self.source_orders = source_orders;
        self.normalize();
    }

    /// Move the item at `drag_item_index` into the slot of `over_item_index`.
    ///
    /// The dragged item takes the hovered item's order and every item in
    /// between shifts one slot towards the vacated position. The set of order
    /// values is preserved. Returns false when nothing changed.
    pub fn reorder(&mut self, drag_item_index: usize, over_item_index: usize) -> bool {
        if drag_item_index == over_item_index
            || drag_item_index >= self.items.len()
            || over_item_index >= self.items.len()
        {
            return false;
        }

        let orders: Vec<i64> = self.items.iter().map(|item| item.order).collect();
        let dragged = self.items.remove(drag_item_index);
        log::debug!(
            "Reorder {} from slot {} to slot {} (order {} -> {})",
            dragged.id,
            drag_item_index,
            over_item_index,
            dragged.order,
            orders[over_item_index]
        );
        self.items.insert(over_item_index, dragged);
        for (item, order) in self.items.iter_mut().zip(orders) {
            item.order = order;
        }
        self.reindex();
        true
    }

    /// Items sorted by order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn find(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// The first non-separator item, used to infer the column width.
    pub fn first_card(&self) -> Option<&Item> {
        self.items.iter().find(|item| !item.is_separator)
    }

    /// Ids in placement order.
    pub fn order_sequence(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    pub fn ids(&self) -> HashSet<ItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn normalize(&mut self) {
        self.items.sort_by_key(|item| item.order);
        self.reindex();
    }

    fn reindex(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.index = index;
        }
    }
}
