//! Supported orderings for the item list.
//!
//! # Invariants
//! - Indices `0..=5` are stable; they are persisted as the sort preference.
//! - Every ordering breaks ties by `item_id` ascending, in memory and in SQL.
//! - Name orderings compare stored text byte-wise (case-sensitive).

use crate::model::food_item::FoodItem;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    RemainingDaysAsc,
    RemainingDaysDesc,
    QuantityAsc,
    QuantityDesc,
    NameAsc,
    NameDesc,
}

const ALL_SORT_ORDERS: [SortOrder; 6] = [
    SortOrder::RemainingDaysAsc,
    SortOrder::RemainingDaysDesc,
    SortOrder::QuantityAsc,
    SortOrder::QuantityDesc,
    SortOrder::NameAsc,
    SortOrder::NameDesc,
];

impl SortOrder {
    pub fn all() -> &'static [SortOrder] {
        &ALL_SORT_ORDERS
    }

    /// Stable persisted index.
    pub fn index(self) -> u8 {
        match self {
            Self::RemainingDaysAsc => 0,
            Self::RemainingDaysDesc => 1,
            Self::QuantityAsc => 2,
            Self::QuantityDesc => 3,
            Self::NameAsc => 4,
            Self::NameDesc => 5,
        }
    }

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|index| ALL_SORT_ORDERS.get(index).copied())
    }

    /// Resolves an index, falling back to `RemainingDaysAsc` for unknown values.
    pub fn from_index_or_default(index: i64) -> Self {
        Self::from_index(index).unwrap_or_default()
    }

    /// Short label used by logs and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RemainingDaysAsc => "remaining_days_asc",
            Self::RemainingDaysDesc => "remaining_days_desc",
            Self::QuantityAsc => "quantity_asc",
            Self::QuantityDesc => "quantity_desc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
        }
    }

    /// `ORDER BY` clause body for the `food_items` table.
    ///
    /// `expiry_date` is stored as ISO `YYYY-MM-DD`, so text order equals date order.
    pub fn order_by_sql(self) -> &'static str {
        match self {
            Self::RemainingDaysAsc => "expiry_date ASC, item_id ASC",
            Self::RemainingDaysDesc => "expiry_date DESC, item_id ASC",
            Self::QuantityAsc => "quantity ASC, item_id ASC",
            Self::QuantityDesc => "quantity DESC, item_id ASC",
            Self::NameAsc => "name COLLATE BINARY ASC, item_id ASC",
            Self::NameDesc => "name COLLATE BINARY DESC, item_id ASC",
        }
    }

    /// In-memory comparator equivalent to `order_by_sql`.
    ///
    /// Remaining days derive monotonically from the expiry date, so comparing
    /// dates yields the same order as comparing remaining days.
    pub fn compare(self, left: &FoodItem, right: &FoodItem) -> Ordering {
        let primary = match self {
            Self::RemainingDaysAsc => left.expiry_date.cmp(&right.expiry_date),
            Self::RemainingDaysDesc => right.expiry_date.cmp(&left.expiry_date),
            Self::QuantityAsc => left.quantity.cmp(&right.quantity),
            Self::QuantityDesc => right.quantity.cmp(&left.quantity),
            Self::NameAsc => left.name.as_bytes().cmp(right.name.as_bytes()),
            Self::NameDesc => right.name.as_bytes().cmp(left.name.as_bytes()),
        };
        primary.then_with(|| left.item_id.cmp(&right.item_id))
    }

    /// Sorts `items` in place.
    pub fn sort(self, items: &mut [FoodItem]) {
        items.sort_by(|left, right| self.compare(left, right));
    }
}

#[cfg(test)]
mod tests {
    use super::SortOrder;
    use crate::model::food_item::FoodItem;
    use chrono::NaiveDate;

    fn item(item_id: i64, name: &str, day: u32, quantity: u32) -> FoodItem {
        let mut item = FoodItem::new(
            name,
            NaiveDate::from_ymd_opt(2026, 11, day).expect("valid date"),
        );
        item.item_id = item_id;
        item.quantity = quantity;
        item
    }

    #[test]
    fn index_roundtrip_covers_all_orders() {
        for order in SortOrder::all() {
            assert_eq!(SortOrder::from_index(i64::from(order.index())), Some(*order));
        }
    }

    #[test]
    fn unknown_index_falls_back_to_default() {
        assert_eq!(SortOrder::from_index(6), None);
        assert_eq!(SortOrder::from_index(-1), None);
        assert_eq!(
            SortOrder::from_index_or_default(42),
            SortOrder::RemainingDaysAsc
        );
    }

    #[test]
    fn name_order_is_case_sensitive() {
        let mut items = vec![item(1, "apple", 1, 1), item(2, "Banana", 1, 1)];
        SortOrder::NameAsc.sort(&mut items);
        assert_eq!(items[0].name, "Banana");
        assert_eq!(items[1].name, "apple");
    }

    #[test]
    fn ties_break_by_item_id_ascending_in_both_directions() {
        let mut items = vec![item(3, "c", 5, 2), item(1, "a", 5, 2), item(2, "b", 5, 2)];
        SortOrder::QuantityDesc.sort(&mut items);
        let ids: Vec<i64> = items.iter().map(|item| item.item_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        SortOrder::RemainingDaysDesc.sort(&mut items);
        let ids: Vec<i64> = items.iter().map(|item| item.item_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn expiry_orders_follow_dates() {
        let mut items = vec![item(1, "x", 20, 1), item(2, "y", 3, 1), item(3, "z", 11, 1)];
        SortOrder::RemainingDaysAsc.sort(&mut items);
        let ids: Vec<i64> = items.iter().map(|item| item.item_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
