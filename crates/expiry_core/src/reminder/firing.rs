//! Receiving side of a delivered reminder.
//!
//! The platform dispatcher hands back the payload captured at schedule time;
//! remaining days are recomputed here against the delivery date.

use crate::calendar::remaining_days;
use crate::model::food_item::FoodItemId;
use crate::reminder::scheduler::AlarmScheduler;
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

/// Payload delivered by the dispatcher when an alarm fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiredReminder {
    pub item_id: FoodItemId,
    pub item_name: String,
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum NotificationKind {
    Expired,
    ExpiresToday,
    ExpiresIn(i32),
}

/// Notification to post for a fired reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderNotification {
    /// Notification id; equals the item id so reposts replace each other.
    pub notification_id: FoodItemId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// When true the dispatcher must cancel the recurring alarm for this id.
    pub stop_recurrence: bool,
}

/// Evaluates a fired reminder against `today`.
pub fn evaluate_fired_reminder(fired: &FiredReminder, today: NaiveDate) -> ReminderNotification {
    let days = remaining_days(fired.expiry_date, today);
    let name = fired.item_name.as_str();

    let (kind, title, body) = match days {
        d if d < 0 => (
            NotificationKind::Expired,
            format!("{name} has expired"),
            format!("{name} is past its expiry date. Check it before use."),
        ),
        0 => (
            NotificationKind::ExpiresToday,
            format!("{name} expires today"),
            format!("Use {name} today before it expires."),
        ),
        d => (
            NotificationKind::ExpiresIn(d),
            format!("{name} expires in {d} {}", day_word(d)),
            format!("{name} will expire in {d} {}.", day_word(d)),
        ),
    };

    ReminderNotification {
        notification_id: fired.item_id,
        kind,
        title,
        body,
        stop_recurrence: kind == NotificationKind::Expired,
    }
}

/// Evaluates a fired reminder and cancels the recurring alarm once the item
/// has expired.
///
/// A failed cancel is logged; the notification is still returned.
pub fn dispatch_fired_reminder(
    scheduler: &impl AlarmScheduler,
    fired: &FiredReminder,
    today: NaiveDate,
) -> ReminderNotification {
    let notification = evaluate_fired_reminder(fired, today);
    if notification.stop_recurrence {
        if let Err(err) = scheduler.cancel(fired.item_id) {
            warn!(
                "event=reminder_fired module=reminder status=warn item_id={} error={err}",
                fired.item_id
            );
        }
    }
    notification
}

fn day_word(days: i32) -> &'static str {
    if days == 1 {
        "day"
    } else {
        "days"
    }
}
