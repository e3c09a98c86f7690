//! Platform alarm capability and bundled implementations.
//!
//! # Responsibility
//! - Define the `schedule`/`cancel` surface the core needs from the platform.
//! - Apply a `ReminderAction` through that surface.
//!
//! # Invariants
//! - Scheduling an id replaces any alarm already registered for that id.
//! - Cancelling an id without an alarm is a no-op, not an error.

use crate::model::food_item::FoodItemId;
use crate::reminder::policy::{ReminderAction, ReminderRequest};
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

/// Failure reported by a platform alarm dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmError {
    PermissionDenied,
    Unavailable(String),
}

impl Display for AlarmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "alarm permission denied"),
            Self::Unavailable(details) => write!(f, "alarm scheduler unavailable: {details}"),
        }
    }
}

impl Error for AlarmError {}

/// Injected platform alarm registry.
pub trait AlarmScheduler {
    fn schedule(&self, request: &ReminderRequest) -> Result<(), AlarmError>;
    fn cancel(&self, item_id: FoodItemId) -> Result<(), AlarmError>;
}

impl<A: AlarmScheduler + ?Sized> AlarmScheduler for &A {
    fn schedule(&self, request: &ReminderRequest) -> Result<(), AlarmError> {
        (**self).schedule(request)
    }

    fn cancel(&self, item_id: FoodItemId) -> Result<(), AlarmError> {
        (**self).cancel(item_id)
    }
}

/// Performs `action` against `scheduler`.
pub fn apply_action(
    scheduler: &impl AlarmScheduler,
    action: &ReminderAction,
) -> Result<(), AlarmError> {
    match action {
        ReminderAction::Unchanged => Ok(()),
        ReminderAction::Schedule(request) => scheduler.schedule(request),
        ReminderAction::Cancel { item_id } => scheduler.cancel(*item_id),
    }
}

/// Scheduler that only records decisions in the log.
///
/// Used by shells without a platform alarm service (CLI, headless hosts).
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingAlarmScheduler;

impl AlarmScheduler for LoggingAlarmScheduler {
    fn schedule(&self, request: &ReminderRequest) -> Result<(), AlarmError> {
        info!(
            "event=alarm_schedule module=reminder status=ok item_id={} first_fire_at={} repeat=daily",
            request.item_id, request.first_fire_at
        );
        Ok(())
    }

    fn cancel(&self, item_id: FoodItemId) -> Result<(), AlarmError> {
        info!("event=alarm_cancel module=reminder status=ok item_id={item_id}");
        Ok(())
    }
}

/// One queued alarm call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AlarmCommand {
    Schedule(ReminderRequest),
    Cancel { item_id: FoodItemId },
}

/// Scheduler that queues calls for a host to replay on its platform.
///
/// The FFI layer hands drained commands to the mobile shell; tests use it to
/// assert exactly which calls a use-case made.
#[derive(Debug, Default)]
pub struct QueuedAlarmScheduler {
    commands: Mutex<Vec<AlarmCommand>>,
}

impl QueuedAlarmScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every queued command in call order.
    pub fn drain(&self) -> Vec<AlarmCommand> {
        match self.commands.lock() {
            Ok(mut commands) => std::mem::take(&mut *commands),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// Returns queued commands without removing them.
    pub fn snapshot(&self) -> Vec<AlarmCommand> {
        match self.commands.lock() {
            Ok(commands) => commands.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn schedule_count(&self) -> usize {
        self.snapshot()
            .iter()
            .filter(|command| matches!(command, AlarmCommand::Schedule(_)))
            .count()
    }

    pub fn cancel_count(&self) -> usize {
        self.snapshot()
            .iter()
            .filter(|command| matches!(command, AlarmCommand::Cancel { .. }))
            .count()
    }

    fn push(&self, command: AlarmCommand) -> Result<(), AlarmError> {
        let mut commands = self
            .commands
            .lock()
            .map_err(|_| AlarmError::Unavailable("alarm queue poisoned".to_string()))?;
        commands.push(command);
        Ok(())
    }
}

impl AlarmScheduler for QueuedAlarmScheduler {
    fn schedule(&self, request: &ReminderRequest) -> Result<(), AlarmError> {
        self.push(AlarmCommand::Schedule(request.clone()))
    }

    fn cancel(&self, item_id: FoodItemId) -> Result<(), AlarmError> {
        self.push(AlarmCommand::Cancel { item_id })
    }
}
