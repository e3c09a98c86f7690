//! Food item use-case service.
//!
//! # Responsibility
//! - Validate edit-form input before any store interaction.
//! - Persist creates, edits and deletes through the repository.
//! - Keep the item's platform reminder in sync with the saved record.
//!
//! # Invariants
//! - A blank name never reaches `insert_item`/`update_item`.
//! - Reminder failures never fail a save or delete; they become warnings.
//! - Delete always requests a cancel, whatever the item's notification flag.
//!
//! # See also
//! - `reminder::policy` for the schedule/cancel decision table.

use crate::calendar::{remaining_days, Clock, SystemClock};
use crate::model::food_item::{
    FoodItem, FoodItemId, FoodItemInput, FoodItemValidationError, UNSAVED_ITEM_ID,
};
use crate::model::sort_order::SortOrder;
use crate::reminder::firing::{dispatch_fired_reminder, FiredReminder, ReminderNotification};
use crate::reminder::policy::{
    decide_on_create, decide_on_delete, decide_on_edit, ReminderAction, ReminderBaseline,
    SchedulingInconsistency, REMINDER_LOOKAHEAD_DAYS,
};
use crate::reminder::scheduler::{apply_action, AlarmError, AlarmScheduler};
use crate::repo::food_item_repo::{FoodItemRepository, RepoError};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for item use-cases.
#[derive(Debug)]
pub enum FoodItemServiceError {
    /// Input rejected before any store call.
    Validation(FoodItemValidationError),
    /// Target item does not exist.
    NotFound(FoodItemId),
    /// Persistence-layer failure.
    Storage(RepoError),
}

impl Display for FoodItemServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "food item not found: {id}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for FoodItemServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<FoodItemValidationError> for FoodItemServiceError {
    fn from(value: FoodItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for FoodItemServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, FoodItemServiceError>;

/// Non-fatal problem surfaced to the user after a completed save/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderWarning {
    /// Edit-save had no loaded baseline; the reminder was left untouched.
    SchedulingInconsistency(SchedulingInconsistency),
    /// Platform scheduler rejected the schedule/cancel call.
    SchedulerFailed(AlarmError),
}

impl Display for ReminderWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SchedulingInconsistency(details) => write!(f, "{details}"),
            Self::SchedulerFailed(err) => write!(f, "reminder could not be updated: {err}"),
        }
    }
}

/// Result of a completed create or edit-save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Record as persisted, with its store-assigned id.
    pub item: FoodItem,
    /// Reminder action that was requested from the scheduler.
    pub reminder: ReminderAction,
    pub warning: Option<ReminderWarning>,
}

/// Result of a completed delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub item_id: FoodItemId,
    pub warning: Option<ReminderWarning>,
}

/// Loaded record handle for edit flows.
///
/// Carries the reminder baseline captured at load time, so an edit-save can
/// always compare against what the user started editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFoodItem {
    item: FoodItem,
    baseline: ReminderBaseline,
}

impl LoadedFoodItem {
    fn new(item: FoodItem) -> Self {
        let baseline = ReminderBaseline::of(&item);
        Self { item, baseline }
    }

    pub fn item(&self) -> &FoodItem {
        &self.item
    }

    pub fn baseline(&self) -> ReminderBaseline {
        self.baseline
    }

    /// Edit form pre-filled with the loaded values.
    pub fn to_input(&self) -> FoodItemInput {
        FoodItemInput::from_item(&self.item)
    }
}

/// Counts shown above the item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpirySummary {
    /// Items with 0..=7 remaining days.
    pub expiring_soon: usize,
    /// Items with negative remaining days.
    pub expired: usize,
}

/// Summarizes `items` relative to `today`.
pub fn summarize_expiry(items: &[FoodItem], today: chrono::NaiveDate) -> ExpirySummary {
    items
        .iter()
        .fold(ExpirySummary::default(), |mut summary, item| {
            let days = i64::from(remaining_days(item.expiry_date, today));
            if days < 0 {
                summary.expired += 1;
            } else if days <= REMINDER_LOOKAHEAD_DAYS {
                summary.expiring_soon += 1;
            }
            summary
        })
}

/// Item service facade over a repository, an alarm scheduler and a clock.
pub struct FoodItemService<R, A, C = SystemClock> {
    repo: R,
    scheduler: A,
    clock: C,
}

impl<R: FoodItemRepository, A: AlarmScheduler> FoodItemService<R, A, SystemClock> {
    /// Creates a service using the system local clock.
    pub fn new(repo: R, scheduler: A) -> Self {
        Self::with_clock(repo, scheduler, SystemClock)
    }
}

impl<R: FoodItemRepository, A: AlarmScheduler, C: Clock> FoodItemService<R, A, C> {
    pub fn with_clock(repo: R, scheduler: A, clock: C) -> Self {
        Self {
            repo,
            scheduler,
            clock,
        }
    }

    pub fn scheduler(&self) -> &A {
        &self.scheduler
    }

    /// Validates and inserts a new item, then schedules its reminder.
    ///
    /// # Errors
    /// - `Validation` when the name is blank; the store is not touched.
    /// - `Storage` when the insert fails.
    pub fn create_item(&self, input: FoodItemInput) -> ServiceResult<SaveOutcome> {
        input.validate()?;

        let mut item = input.into_item(UNSAVED_ITEM_ID);
        item.item_id = match self.repo.insert_item(&item) {
            Ok(id) => id,
            Err(err) => {
                error!("event=item_create module=service status=error error={err}");
                return Err(err.into());
            }
        };

        let action = decide_on_create(&item, self.clock.today());
        let warning = self.apply_reminder(&action);
        info!(
            "event=item_create module=service status=ok item_id={} reminder={}",
            item.item_id,
            action_label(&action)
        );

        Ok(SaveOutcome {
            item,
            reminder: action,
            warning,
        })
    }

    /// Loads an item for editing together with its reminder baseline.
    pub fn load_for_edit(&self, id: FoodItemId) -> ServiceResult<LoadedFoodItem> {
        let item = self.repo.get_item(id)?;
        Ok(LoadedFoodItem::new(item))
    }

    /// Saves edits to a previously loaded item.
    pub fn save_edit(
        &self,
        loaded: &LoadedFoodItem,
        input: FoodItemInput,
    ) -> ServiceResult<SaveOutcome> {
        self.update_item(loaded.item.item_id, input, Some(loaded.baseline))
    }

    /// Saves edits for `id` with a caller-supplied baseline.
    ///
    /// A missing baseline does not block the save; the reminder step is
    /// skipped and reported as `ReminderWarning::SchedulingInconsistency`.
    ///
    /// # Errors
    /// - `Validation` when the name is blank; the store is not touched.
    /// - `NotFound` when `id` has no stored record; no reminder call is made.
    /// - `Storage` when the update fails.
    pub fn update_item(
        &self,
        id: FoodItemId,
        input: FoodItemInput,
        baseline: Option<ReminderBaseline>,
    ) -> ServiceResult<SaveOutcome> {
        input.validate()?;
        if let Err(err) = self.repo.get_item(id) {
            warn!("event=item_update module=service status=error item_id={id} error={err}");
            return Err(err.into());
        }

        let item = input.into_item(id);
        if let Err(err) = self.repo.update_item(&item) {
            error!("event=item_update module=service status=error item_id={id} error={err}");
            return Err(err.into());
        }

        let (action, warning) = match decide_on_edit(baseline, &item, self.clock.today()) {
            Ok(action) => {
                let warning = self.apply_reminder(&action);
                (action, warning)
            }
            Err(inconsistency) => {
                error!(
                    "event=item_update module=service status=warn item_id={id} error_code=baseline_missing"
                );
                (
                    ReminderAction::Unchanged,
                    Some(ReminderWarning::SchedulingInconsistency(inconsistency)),
                )
            }
        };
        info!(
            "event=item_update module=service status=ok item_id={id} reminder={}",
            action_label(&action)
        );

        Ok(SaveOutcome {
            item,
            reminder: action,
            warning,
        })
    }

    /// Deletes an item and cancels its reminder.
    ///
    /// Deleting an unknown id succeeds; the cancel is still requested.
    pub fn delete_item(&self, id: FoodItemId) -> ServiceResult<DeleteOutcome> {
        if let Err(err) = self.repo.delete_item(id) {
            error!("event=item_delete module=service status=error item_id={id} error={err}");
            return Err(err.into());
        }

        let warning = self.apply_reminder(&decide_on_delete(id));
        info!("event=item_delete module=service status=ok item_id={id}");
        Ok(DeleteOutcome {
            item_id: id,
            warning,
        })
    }

    pub fn get_item(&self, id: FoodItemId) -> ServiceResult<FoodItem> {
        Ok(self.repo.get_item(id)?)
    }

    pub fn list_items(&self, order: SortOrder) -> ServiceResult<Vec<FoodItem>> {
        Ok(self.repo.list_items(order)?)
    }

    /// Expiring-soon and expired counts over all stored items.
    pub fn expiry_summary(&self) -> ServiceResult<ExpirySummary> {
        let items = self.repo.list_items(SortOrder::default())?;
        Ok(summarize_expiry(&items, self.clock.today()))
    }

    /// Handles a delivered reminder and stops recurrence for expired items.
    pub fn handle_fired_reminder(&self, fired: &FiredReminder) -> ReminderNotification {
        dispatch_fired_reminder(&self.scheduler, fired, self.clock.today())
    }

    fn apply_reminder(&self, action: &ReminderAction) -> Option<ReminderWarning> {
        match apply_action(&self.scheduler, action) {
            Ok(()) => None,
            Err(err) => {
                warn!(
                    "event=reminder_apply module=service status=warn action={} error={err}",
                    action_label(action)
                );
                Some(ReminderWarning::SchedulerFailed(err))
            }
        }
    }
}

fn action_label(action: &ReminderAction) -> &'static str {
    match action {
        ReminderAction::Unchanged => "unchanged",
        ReminderAction::Schedule(_) => "schedule",
        ReminderAction::Cancel { .. } => "cancel",
    }
}

#[cfg(test)]
mod tests {
    use super::{summarize_expiry, ExpirySummary};
    use crate::model::food_item::FoodItem;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn summary_splits_soon_and_expired() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");
        let items: Vec<FoodItem> = [-2, -1, 0, 7, 8, 30]
            .iter()
            .map(|days| FoodItem::new("x", today + Duration::days(*days)))
            .collect();

        assert_eq!(
            summarize_expiry(&items, today),
            ExpirySummary {
                expiring_soon: 2,
                expired: 2,
            }
        );
    }
}
