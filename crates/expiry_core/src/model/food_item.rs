//! Food item domain model.
//!
//! # Responsibility
//! - Define the canonical tracked-item record and its edit-form input.
//! - Provide validation used before any persistence call.
//!
//! # Invariants
//! - `item_id == UNSAVED_ITEM_ID` means the item was never persisted.
//! - `name` must not be blank when an item is saved.
//! - `expiry_date` is day granular; time of day never participates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned identifier for a food item.
pub type FoodItemId = i64;

/// Sentinel identifier for items that have not been inserted yet.
pub const UNSAVED_ITEM_ID: FoodItemId = 0;
/// Quantity used by a fresh item form.
pub const DEFAULT_QUANTITY: u32 = 1;
/// Upper bound applied by the quantity stepper helpers.
pub const MAX_QUANTITY: u32 = 100;
/// Notification preference used by a fresh item form.
pub const DEFAULT_NOTIFICATION_ON: bool = true;

/// Canonical tracked-item record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItem {
    /// `UNSAVED_ITEM_ID` until the store assigns one.
    pub item_id: FoodItemId,
    pub name: String,
    pub expiry_date: NaiveDate,
    pub quantity: u32,
    pub is_notification_on: bool,
    pub note: Option<String>,
}

impl FoodItem {
    /// Creates an unsaved item with default quantity and notifications on.
    pub fn new(name: impl Into<String>, expiry_date: NaiveDate) -> Self {
        Self {
            item_id: UNSAVED_ITEM_ID,
            name: name.into(),
            expiry_date,
            quantity: DEFAULT_QUANTITY,
            is_notification_on: DEFAULT_NOTIFICATION_ON,
            note: None,
        }
    }
}

/// Validation failures raised before an item reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoodItemValidationError {
    EmptyName,
}

impl Display for FoodItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "item name is required"),
        }
    }
}

impl Error for FoodItemValidationError {}

/// Edit-form values submitted by a caller for create or edit-save.
///
/// The form never carries an identifier; create assigns one and edit-save
/// takes it from the loaded record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItemInput {
    pub name: String,
    pub expiry_date: NaiveDate,
    pub quantity: u32,
    pub is_notification_on: bool,
    pub note: Option<String>,
}

impl FoodItemInput {
    /// Fresh form: empty name, expiry today, default quantity and notification.
    pub fn new_for(today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            expiry_date: today,
            quantity: DEFAULT_QUANTITY,
            is_notification_on: DEFAULT_NOTIFICATION_ON,
            note: None,
        }
    }

    /// Form pre-filled from a persisted item.
    pub fn from_item(item: &FoodItem) -> Self {
        Self {
            name: item.name.clone(),
            expiry_date: item.expiry_date,
            quantity: item.quantity,
            is_notification_on: item.is_notification_on,
            note: item.note.clone(),
        }
    }

    /// Steps quantity up by one, stopping at `MAX_QUANTITY`.
    pub fn increase_quantity(&mut self) {
        if self.quantity < MAX_QUANTITY {
            self.quantity += 1;
        }
    }

    /// Steps quantity down by one, stopping at zero.
    pub fn decrease_quantity(&mut self) {
        self.quantity = self.quantity.saturating_sub(1);
    }

    /// Validates save-time invariants.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank after trimming.
    pub fn validate(&self) -> Result<(), FoodItemValidationError> {
        validate_name(&self.name)
    }

    /// Builds the record to persist under `item_id`.
    ///
    /// Blank notes are stored as `None`.
    pub fn into_item(self, item_id: FoodItemId) -> FoodItem {
        FoodItem {
            item_id,
            name: self.name,
            expiry_date: self.expiry_date,
            quantity: self.quantity,
            is_notification_on: self.is_notification_on,
            note: self.note.filter(|note| !note.trim().is_empty()),
        }
    }
}

fn validate_name(name: &str) -> Result<(), FoodItemValidationError> {
    if name.trim().is_empty() {
        return Err(FoodItemValidationError::EmptyName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        FoodItem, FoodItemInput, FoodItemValidationError, DEFAULT_QUANTITY, MAX_QUANTITY,
        UNSAVED_ITEM_ID,
    };
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
    }

    #[test]
    fn new_item_uses_defaults() {
        let item = FoodItem::new("Milk", today());
        assert_eq!(item.item_id, UNSAVED_ITEM_ID);
        assert_eq!(item.quantity, DEFAULT_QUANTITY);
        assert!(item.is_notification_on);
        assert!(item.note.is_none());
    }

    #[test]
    fn blank_name_fails_validation() {
        let mut input = FoodItemInput::new_for(today());
        assert_eq!(input.validate(), Err(FoodItemValidationError::EmptyName));

        input.name = " \t ".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn quantity_stepper_is_clamped() {
        let mut input = FoodItemInput::new_for(today());
        input.decrease_quantity();
        input.decrease_quantity();
        assert_eq!(input.quantity, 0);

        input.quantity = MAX_QUANTITY - 1;
        input.increase_quantity();
        input.increase_quantity();
        assert_eq!(input.quantity, MAX_QUANTITY);
    }

    #[test]
    fn into_item_drops_blank_note() {
        let mut input = FoodItemInput::new_for(today());
        input.name = "Eggs".to_string();
        input.note = Some("  ".to_string());
        let item = input.into_item(7);
        assert_eq!(item.item_id, 7);
        assert!(item.note.is_none());
    }

    #[test]
    fn serializes_expiry_as_iso_date() {
        let item = FoodItem::new("Cheese", today());
        let json = serde_json::to_value(&item).expect("serialize item");
        assert_eq!(json["expiry_date"], "2026-10-19");
    }
}
