//! Core domain logic for the expiry tracker.
//! This crate is the single source of truth for item and reminder invariants.

pub mod calendar;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod reminder;
pub mod repo;
pub mod service;
pub mod store;

pub use calendar::{
    normalize_to_day, remaining_days, remaining_days_between, Clock, FixedClock, SystemClock,
};
pub use config::CoreConfig;
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::food_item::{
    FoodItem, FoodItemId, FoodItemInput, FoodItemValidationError, DEFAULT_QUANTITY, MAX_QUANTITY,
    UNSAVED_ITEM_ID,
};
pub use model::sort_order::SortOrder;
pub use reminder::firing::{
    dispatch_fired_reminder, evaluate_fired_reminder, FiredReminder, NotificationKind,
    ReminderNotification,
};
pub use reminder::policy::{
    first_fire_at, ReminderAction, ReminderBaseline, ReminderRequest, Repeat,
    SchedulingInconsistency,
};
pub use reminder::scheduler::{
    AlarmCommand, AlarmError, AlarmScheduler, LoggingAlarmScheduler, QueuedAlarmScheduler,
};
pub use repo::food_item_repo::{
    FoodItemRepository, RepoError, RepoResult, SqliteFoodItemRepository,
};
pub use repo::preference_repo::{PreferenceRepository, SqlitePreferenceRepository};
pub use service::food_item_service::{
    summarize_expiry, DeleteOutcome, ExpirySummary, FoodItemService, FoodItemServiceError,
    LoadedFoodItem, ReminderWarning, SaveOutcome,
};
pub use service::sort_preference_service::SortPreferenceService;
pub use store::food_item_store::{FoodItemStore, ItemsSubscription, SubscriptionId};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
