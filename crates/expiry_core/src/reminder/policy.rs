//! Reminder scheduling policy.
//!
//! # Responsibility
//! - Compute the first fire time of an item's daily reminder.
//! - Decide which alarm action a create, edit or delete requires.
//!
//! # Invariants
//! - Decisions are pure; they never touch the platform scheduler.
//! - At most one alarm exists per item id; scheduling replaces the prior one.
//! - Expired items (remaining days < 0 at save time) never get a new schedule.

use crate::calendar::remaining_days;
use crate::model::food_item::{FoodItem, FoodItemId};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Days before expiry at which daily reminders start.
pub const REMINDER_LOOKAHEAD_DAYS: i64 = 7;
/// Local wall-clock hour at which reminders fire.
pub const REMINDER_HOUR_OFFSET: i64 = 10;

/// Recurrence of a scheduled reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    Daily,
}

/// One schedule request handed to the platform alarm dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRequest {
    pub item_id: FoodItemId,
    pub item_name: String,
    /// Expiry as of schedule time; delivered back unchanged when the alarm fires.
    pub expiry_date: NaiveDate,
    /// Local wall-clock time of the first delivery.
    pub first_fire_at: NaiveDateTime,
    pub repeat: Repeat,
}

/// Notification-relevant fields of an item as loaded before an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderBaseline {
    pub is_notification_on: bool,
    pub expiry_date: NaiveDate,
}

impl ReminderBaseline {
    pub fn of(item: &FoodItem) -> Self {
        Self {
            is_notification_on: item.is_notification_on,
            expiry_date: item.expiry_date,
        }
    }
}

/// Alarm side effect required by a save or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReminderAction {
    Unchanged,
    Schedule(ReminderRequest),
    Cancel { item_id: FoodItemId },
}

/// Edit-save reached the reminder step without a loaded baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingInconsistency {
    pub item_id: FoodItemId,
}

impl Display for SchedulingInconsistency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "reminder baseline missing for item {}; reminder was not updated",
            self.item_id
        )
    }
}

impl Error for SchedulingInconsistency {}

/// First fire time for an item expiring on `expiry`, evaluated on `today`.
///
/// - More than 7 days left: 7 days before expiry at 10:00.
/// - 0..=7 days left: `expiry - (days - 1)` at 10:00, i.e. the next day.
/// - Already expired: `None`.
pub fn first_fire_at(expiry: NaiveDate, today: NaiveDate) -> Option<NaiveDateTime> {
    let days = i64::from(remaining_days(expiry, today));
    let lead_days = match days {
        d if d > REMINDER_LOOKAHEAD_DAYS => REMINDER_LOOKAHEAD_DAYS,
        d if d >= 0 => d - 1,
        _ => return None,
    };

    let start_day = expiry.checked_sub_signed(Duration::days(lead_days))?;
    start_day
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::hours(REMINDER_HOUR_OFFSET))
}

/// Builds the schedule action for `item`, or `Unchanged` when it is expired.
fn schedule_for(item: &FoodItem, today: NaiveDate) -> Option<ReminderAction> {
    let first_fire_at = first_fire_at(item.expiry_date, today)?;
    Some(ReminderAction::Schedule(ReminderRequest {
        item_id: item.item_id,
        item_name: item.name.clone(),
        expiry_date: item.expiry_date,
        first_fire_at,
        repeat: Repeat::Daily,
    }))
}

/// Action for a freshly inserted item (already carrying its store id).
pub fn decide_on_create(item: &FoodItem, today: NaiveDate) -> ReminderAction {
    if !item.is_notification_on {
        return ReminderAction::Unchanged;
    }
    schedule_for(item, today).unwrap_or(ReminderAction::Unchanged)
}

/// Action for an edit-save of `item` against its loaded `baseline`.
///
/// A reschedule whose new date is already expired cancels the stale alarm
/// instead, since no new schedule can replace it.
///
/// # Errors
/// - `SchedulingInconsistency` when `baseline` is missing.
pub fn decide_on_edit(
    baseline: Option<ReminderBaseline>,
    item: &FoodItem,
    today: NaiveDate,
) -> Result<ReminderAction, SchedulingInconsistency> {
    let baseline = baseline.ok_or(SchedulingInconsistency {
        item_id: item.item_id,
    })?;

    let action = match (baseline.is_notification_on, item.is_notification_on) {
        (false, true) => reschedule(item, today),
        (true, true) if baseline.expiry_date != item.expiry_date => reschedule(item, today),
        (true, false) => ReminderAction::Cancel {
            item_id: item.item_id,
        },
        (true, true) | (false, false) => ReminderAction::Unchanged,
    };
    Ok(action)
}

fn reschedule(item: &FoodItem, today: NaiveDate) -> ReminderAction {
    schedule_for(item, today).unwrap_or(ReminderAction::Cancel {
        item_id: item.item_id,
    })
}

/// Action for a delete; always cancels regardless of the enabled flag.
pub fn decide_on_delete(item_id: FoodItemId) -> ReminderAction {
    ReminderAction::Cancel { item_id }
}

#[cfg(test)]
mod tests {
    use super::{
        decide_on_create, decide_on_delete, decide_on_edit, first_fire_at, ReminderAction,
        ReminderBaseline, SchedulingInconsistency,
    };
    use crate::model::food_item::FoodItem;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
    }

    fn at_ten(date: NaiveDate) -> NaiveDateTime {
        date.and_hms_opt(10, 0, 0).expect("valid time")
    }

    fn saved_item(days_left: i64, notify: bool) -> FoodItem {
        let mut item = FoodItem::new("Yogurt", today() + Duration::days(days_left));
        item.item_id = 11;
        item.is_notification_on = notify;
        item
    }

    #[test]
    fn far_expiry_starts_one_week_before() {
        let expiry = today() + Duration::days(10);
        assert_eq!(
            first_fire_at(expiry, today()),
            Some(at_ten(expiry - Duration::days(7)))
        );
    }

    #[test]
    fn near_expiry_starts_next_day() {
        let expiry = today() + Duration::days(3);
        let expected = at_ten(expiry - Duration::days(2));
        assert_eq!(first_fire_at(expiry, today()), Some(expected));
        assert_eq!(expected.date(), today() + Duration::days(1));
    }

    #[test]
    fn boundary_days_follow_formula() {
        let seven = today() + Duration::days(7);
        assert_eq!(
            first_fire_at(seven, today()),
            Some(at_ten(seven - Duration::days(6)))
        );

        // Zero days left: `expiry - (-1) days`, the day after expiry.
        assert_eq!(
            first_fire_at(today(), today()),
            Some(at_ten(today() + Duration::days(1)))
        );
    }

    #[test]
    fn expired_item_gets_no_fire_time() {
        assert_eq!(first_fire_at(today() - Duration::days(1), today()), None);
    }

    #[test]
    fn create_schedules_only_when_enabled() {
        assert!(matches!(
            decide_on_create(&saved_item(10, true), today()),
            ReminderAction::Schedule(_)
        ));
        assert_eq!(
            decide_on_create(&saved_item(10, false), today()),
            ReminderAction::Unchanged
        );
        assert_eq!(
            decide_on_create(&saved_item(-2, true), today()),
            ReminderAction::Unchanged
        );
    }

    #[test]
    fn edit_transitions_match_policy_table() {
        let item_on = saved_item(10, true);
        let item_off = saved_item(10, false);
        let same_date_on = ReminderBaseline {
            is_notification_on: true,
            expiry_date: item_on.expiry_date,
        };
        let same_date_off = ReminderBaseline {
            is_notification_on: false,
            expiry_date: item_on.expiry_date,
        };
        let other_date_on = ReminderBaseline {
            is_notification_on: true,
            expiry_date: item_on.expiry_date - Duration::days(1),
        };

        assert!(matches!(
            decide_on_edit(Some(same_date_off), &item_on, today()),
            Ok(ReminderAction::Schedule(_))
        ));
        assert!(matches!(
            decide_on_edit(Some(other_date_on), &item_on, today()),
            Ok(ReminderAction::Schedule(_))
        ));
        assert_eq!(
            decide_on_edit(Some(same_date_on), &item_off, today()),
            Ok(ReminderAction::Cancel { item_id: 11 })
        );
        assert_eq!(
            decide_on_edit(Some(same_date_on), &item_on, today()),
            Ok(ReminderAction::Unchanged)
        );
        assert_eq!(
            decide_on_edit(Some(same_date_off), &item_off, today()),
            Ok(ReminderAction::Unchanged)
        );
    }

    #[test]
    fn edit_moving_date_into_past_cancels_stale_alarm() {
        let item = saved_item(-1, true);
        let baseline = ReminderBaseline {
            is_notification_on: true,
            expiry_date: today() + Duration::days(4),
        };
        assert_eq!(
            decide_on_edit(Some(baseline), &item, today()),
            Ok(ReminderAction::Cancel { item_id: 11 })
        );
    }

    #[test]
    fn edit_without_baseline_is_inconsistent() {
        assert_eq!(
            decide_on_edit(None, &saved_item(3, true), today()),
            Err(SchedulingInconsistency { item_id: 11 })
        );
    }

    #[test]
    fn delete_always_cancels() {
        assert_eq!(decide_on_delete(5), ReminderAction::Cancel { item_id: 5 });
    }
}
