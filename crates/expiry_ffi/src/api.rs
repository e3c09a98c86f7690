//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Hand reminder schedule/cancel commands back to the mobile shell, which
//!   owns the platform alarm service.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Dates cross the boundary as ISO `YYYY-MM-DD` strings.
//! - Alarm fire times cross the boundary as epoch milliseconds.

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
use expiry_core::db::open_db;
use expiry_core::{
    core_version as core_version_inner, dispatch_fired_reminder,
    init_logging as init_logging_inner, ping as ping_inner, remaining_days, AlarmCommand,
    CoreConfig, FiredReminder, FoodItem, FoodItemInput, FoodItemService, FoodItemStore,
    NotificationKind, QueuedAlarmScheduler, ReminderBaseline, SortOrder, SortPreferenceService,
    SystemClock,
};
use expiry_core::{Clock, FoodItemServiceError, ReminderWarning};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;

const DAY_INTERVAL_MS: i64 = 24 * 60 * 60 * 1000;
const DATE_FORMAT: &str = "%Y-%m-%d";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Item view model returned to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub item_id: i64,
    pub name: String,
    pub expiry_date: String,
    pub quantity: u32,
    pub is_notification_on: bool,
    pub note: Option<String>,
    /// Remaining days relative to the device's current local date.
    pub remaining_days: i32,
}

/// Alarm call the shell must replay on the platform alarm service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmCommandView {
    /// `schedule` or `cancel`.
    pub command: String,
    pub item_id: i64,
    pub item_name: Option<String>,
    pub expiry_date: Option<String>,
    pub first_fire_epoch_ms: Option<i64>,
    pub repeat_interval_ms: Option<i64>,
}

/// Envelope for create/update/delete calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemActionResponse {
    pub ok: bool,
    pub item_id: Option<i64>,
    /// Human-readable result or error message.
    pub message: String,
    /// User-visible reminder warning after a completed save/delete.
    pub warning: Option<String>,
    pub alarm_commands: Vec<AlarmCommandView>,
}

impl ItemActionResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            item_id: None,
            message: message.into(),
            warning: None,
            alarm_commands: Vec::new(),
        }
    }
}

/// Envelope for single-item reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemGetResponse {
    pub ok: bool,
    pub item: Option<ItemView>,
    pub message: String,
}

/// Envelope for the sorted item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemListResponse {
    pub ok: bool,
    pub items: Vec<ItemView>,
    pub applied_sort: u8,
    pub expiring_soon: u32,
    pub expired: u32,
    pub message: String,
}

/// Notification content for a delivered reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderFiredResponse {
    pub notification_id: i64,
    /// `expired`, `expires_today` or `expires_in`.
    pub kind: String,
    pub title: String,
    pub body: String,
    pub alarm_commands: Vec<AlarmCommandView>,
}

/// Creates one item and returns the reminder commands to apply.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - `expiry_date` must be `YYYY-MM-DD`.
/// - Blank names fail with `ok=false` and never touch the database.
#[flutter_rust_bridge::frb(sync)]
pub fn item_create(
    name: String,
    expiry_date: String,
    quantity: u32,
    is_notification_on: bool,
    note: Option<String>,
) -> ItemActionResponse {
    let input = match build_input(name, &expiry_date, quantity, is_notification_on, note) {
        Ok(input) => input,
        Err(message) => return ItemActionResponse::failure(message),
    };

    let result = with_item_service(|service| service.create_item(input));
    match result {
        Ok((outcome, commands)) => action_success(
            "Item saved.",
            outcome.item.item_id,
            outcome.warning,
            commands,
        ),
        Err(message) => ItemActionResponse::failure(format!("item_create failed: {message}")),
    }
}

/// Saves edits for one item.
///
/// `prev_notification_on` / `prev_expiry_date` are the values the UI loaded
/// before editing. When either is missing the save still completes and the
/// response carries a reminder warning.
#[allow(clippy::too_many_arguments)]
#[flutter_rust_bridge::frb(sync)]
pub fn item_update(
    item_id: i64,
    name: String,
    expiry_date: String,
    quantity: u32,
    is_notification_on: bool,
    note: Option<String>,
    prev_notification_on: Option<bool>,
    prev_expiry_date: Option<String>,
) -> ItemActionResponse {
    let input = match build_input(name, &expiry_date, quantity, is_notification_on, note) {
        Ok(input) => input,
        Err(message) => return ItemActionResponse::failure(message),
    };
    let baseline = match (prev_notification_on, prev_expiry_date) {
        (Some(is_notification_on), Some(raw)) => match parse_date(&raw) {
            Ok(expiry_date) => Some(ReminderBaseline {
                is_notification_on,
                expiry_date,
            }),
            Err(message) => return ItemActionResponse::failure(message),
        },
        _ => None,
    };

    let result = with_item_service(|service| service.update_item(item_id, input, baseline));
    match result {
        Ok((outcome, commands)) => {
            action_success("Item saved.", outcome.item.item_id, outcome.warning, commands)
        }
        Err(message) => ItemActionResponse::failure(format!("item_update failed: {message}")),
    }
}

/// Deletes one item and cancels its reminder.
#[flutter_rust_bridge::frb(sync)]
pub fn item_delete(item_id: i64) -> ItemActionResponse {
    match with_item_service(|service| service.delete_item(item_id)) {
        Ok((outcome, commands)) => {
            action_success("Item deleted.", outcome.item_id, outcome.warning, commands)
        }
        Err(message) => ItemActionResponse::failure(format!("item_delete failed: {message}")),
    }
}

/// Loads one item by id.
#[flutter_rust_bridge::frb(sync)]
pub fn item_get(item_id: i64) -> ItemGetResponse {
    let today = SystemClock.today();
    match with_item_service(|service| service.get_item(item_id)) {
        Ok((item, _)) => ItemGetResponse {
            ok: true,
            item: Some(to_item_view(&item, today)),
            message: String::new(),
        },
        Err(message) => ItemGetResponse {
            ok: false,
            item: None,
            message: format!("item_get failed: {message}"),
        },
    }
}

/// Lists items in the requested order together with expiry counts.
///
/// `sort_index=None` uses the persisted preference; unknown indices fall back
/// to remaining-days ascending.
#[flutter_rust_bridge::frb(sync)]
pub fn items_list(sort_index: Option<i64>) -> ItemListResponse {
    let db_path = resolve_db_path();
    let store = match open_db(&db_path) {
        Ok(conn) => FoodItemStore::new(conn),
        Err(err) => return list_failure(format!("items_list failed: {err}")),
    };
    let order = match sort_index {
        Some(index) => SortOrder::from_index_or_default(index),
        None => SortPreferenceService::new(&store).load(),
    };

    let service = FoodItemService::new(&store, QueuedAlarmScheduler::new());
    let today = SystemClock.today();
    let listed = service
        .list_items(order)
        .and_then(|items| Ok((service.expiry_summary()?, items)));
    match listed {
        Ok((summary, items)) => ItemListResponse {
            ok: true,
            message: format!("{} item(s).", items.len()),
            items: items.iter().map(|item| to_item_view(item, today)).collect(),
            applied_sort: order.index(),
            expiring_soon: saturating_u32(summary.expiring_soon),
            expired: saturating_u32(summary.expired),
        },
        Err(err) => list_failure(format!("items_list failed: {err}")),
    }
}

/// Returns the persisted sort order index (default `0`).
#[flutter_rust_bridge::frb(sync)]
pub fn sort_preference_get() -> u8 {
    match open_db(resolve_db_path()) {
        Ok(conn) => SortPreferenceService::new(&FoodItemStore::new(conn))
            .load()
            .index(),
        Err(err) => {
            warn!("event=sort_pref_load module=ffi status=error error={err}");
            SortOrder::default().index()
        }
    }
}

/// Persists the chosen sort order; returns empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn sort_preference_set(sort_index: i64) -> String {
    let Some(order) = SortOrder::from_index(sort_index) else {
        return format!("unknown sort index {sort_index}");
    };
    let conn = match open_db(resolve_db_path()) {
        Ok(conn) => conn,
        Err(err) => return format!("sort_preference_set failed: {err}"),
    };
    match SortPreferenceService::new(&FoodItemStore::new(conn)).set(order) {
        Ok(()) => String::new(),
        Err(err) => format!("sort_preference_set failed: {err}"),
    }
}

/// Evaluates a delivered reminder and returns the notification to post.
///
/// Payload values are the ones captured at schedule time. Expired items come
/// back with a `cancel` command that stops the recurrence.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_fired(
    item_id: i64,
    item_name: String,
    expiry_date: String,
) -> Result<ReminderFiredResponse, String> {
    let fired = FiredReminder {
        item_id,
        item_name,
        expiry_date: parse_date(&expiry_date)?,
    };
    let scheduler = QueuedAlarmScheduler::new();
    let notification = dispatch_fired_reminder(&scheduler, &fired, SystemClock.today());

    Ok(ReminderFiredResponse {
        notification_id: notification.notification_id,
        kind: notification_kind_label(notification.kind).to_string(),
        title: notification.title,
        body: notification.body,
        alarm_commands: scheduler.drain().iter().map(to_alarm_command_view).collect(),
    })
}

fn build_input(
    name: String,
    expiry_date: &str,
    quantity: u32,
    is_notification_on: bool,
    note: Option<String>,
) -> Result<FoodItemInput, String> {
    Ok(FoodItemInput {
        name: name.trim().to_string(),
        expiry_date: parse_date(expiry_date)?,
        quantity,
        is_notification_on,
        note,
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| format!("invalid date `{}`; expected YYYY-MM-DD", raw.trim()))
}

fn action_success(
    message: &str,
    item_id: i64,
    warning: Option<ReminderWarning>,
    commands: Vec<AlarmCommand>,
) -> ItemActionResponse {
    ItemActionResponse {
        ok: true,
        item_id: Some(item_id),
        message: message.to_string(),
        warning: warning.map(|warning| warning.to_string()),
        alarm_commands: commands.iter().map(to_alarm_command_view).collect(),
    }
}

fn list_failure(message: String) -> ItemListResponse {
    ItemListResponse {
        ok: false,
        items: Vec::new(),
        applied_sort: SortOrder::default().index(),
        expiring_soon: 0,
        expired: 0,
        message,
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| CoreConfig::from_env().db_path)
        .clone()
}

/// Opens the configured store, runs `f` and drains queued alarm commands.
fn with_item_service<T>(
    f: impl FnOnce(
        &FoodItemService<&FoodItemStore, &QueuedAlarmScheduler>,
    ) -> Result<T, FoodItemServiceError>,
) -> Result<(T, Vec<AlarmCommand>), String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("DB open failed: {err}"))?;
    let store = FoodItemStore::new(conn);
    let scheduler = QueuedAlarmScheduler::new();
    let service = FoodItemService::new(&store, &scheduler);
    let value = f(&service).map_err(|err| err.to_string())?;
    Ok((value, scheduler.drain()))
}

fn to_item_view(item: &FoodItem, today: NaiveDate) -> ItemView {
    ItemView {
        item_id: item.item_id,
        name: item.name.clone(),
        expiry_date: item.expiry_date.format(DATE_FORMAT).to_string(),
        quantity: item.quantity,
        is_notification_on: item.is_notification_on,
        note: item.note.clone(),
        remaining_days: remaining_days(item.expiry_date, today),
    }
}

fn to_alarm_command_view(command: &AlarmCommand) -> AlarmCommandView {
    match command {
        AlarmCommand::Schedule(request) => AlarmCommandView {
            command: "schedule".to_string(),
            item_id: request.item_id,
            item_name: Some(request.item_name.clone()),
            expiry_date: Some(request.expiry_date.format(DATE_FORMAT).to_string()),
            first_fire_epoch_ms: local_epoch_ms(request.first_fire_at),
            repeat_interval_ms: Some(DAY_INTERVAL_MS),
        },
        AlarmCommand::Cancel { item_id } => AlarmCommandView {
            command: "cancel".to_string(),
            item_id: *item_id,
            item_name: None,
            expiry_date: None,
            first_fire_epoch_ms: None,
            repeat_interval_ms: None,
        },
    }
}

fn local_epoch_ms(value: NaiveDateTime) -> Option<i64> {
    Local
        .from_local_datetime(&value)
        .earliest()
        .map(|resolved| resolved.timestamp_millis())
}

fn notification_kind_label(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Expired => "expired",
        NotificationKind::ExpiresToday => "expires_today",
        NotificationKind::ExpiresIn(_) => "expires_in",
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, item_create, item_delete, item_get, item_update, items_list,
        ping, reminder_fired, sort_preference_get, sort_preference_set,
    };
    use chrono::{Duration, Local};

    fn date_in(days: i64) -> String {
        (Local::now().date_naive() + Duration::days(days))
            .format("%Y-%m-%d")
            .to_string()
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn item_create_returns_schedule_command_for_future_expiry() {
        let response = item_create("Milk".to_string(), date_in(10), 2, true, None);
        assert!(response.ok, "{}", response.message);
        let item_id = response.item_id.expect("created item id");

        assert_eq!(response.alarm_commands.len(), 1);
        let command = &response.alarm_commands[0];
        assert_eq!(command.command, "schedule");
        assert_eq!(command.item_id, item_id);
        assert!(command.first_fire_epoch_ms.is_some());

        let loaded = item_get(item_id);
        assert!(loaded.ok, "{}", loaded.message);
        assert_eq!(loaded.item.expect("item view").remaining_days, 10);
    }

    #[test]
    fn item_create_rejects_blank_name_and_bad_date() {
        let blank = item_create("   ".to_string(), date_in(3), 1, true, None);
        assert!(!blank.ok);
        assert!(blank.message.contains("name"));

        let bad_date = item_create("Eggs".to_string(), "19/10/2026".to_string(), 1, true, None);
        assert!(!bad_date.ok);
        assert!(bad_date.message.contains("YYYY-MM-DD"));
    }

    #[test]
    fn item_update_without_baseline_reports_warning() {
        let created = item_create("Bread".to_string(), date_in(5), 1, true, None);
        let item_id = created.item_id.expect("created item id");

        let updated = item_update(
            item_id,
            "Rye bread".to_string(),
            date_in(6),
            1,
            true,
            None,
            None,
            None,
        );
        assert!(updated.ok, "{}", updated.message);
        assert!(updated.warning.is_some());
        assert!(updated.alarm_commands.is_empty());
    }

    #[test]
    fn item_update_with_baseline_cancels_when_disabled() {
        let expiry = date_in(12);
        let created = item_create("Cheese".to_string(), expiry.clone(), 1, true, None);
        let item_id = created.item_id.expect("created item id");

        let updated = item_update(
            item_id,
            "Cheese".to_string(),
            expiry.clone(),
            1,
            false,
            None,
            Some(true),
            Some(expiry),
        );
        assert!(updated.ok, "{}", updated.message);
        assert!(updated.warning.is_none());
        assert_eq!(updated.alarm_commands.len(), 1);
        assert_eq!(updated.alarm_commands[0].command, "cancel");
    }

    #[test]
    fn item_update_of_deleted_item_returns_no_alarm_commands() {
        let expiry = date_in(9);
        let created = item_create("Basil".to_string(), expiry.clone(), 1, false, None);
        let item_id = created.item_id.expect("created item id");
        assert!(item_delete(item_id).ok);

        let updated = item_update(
            item_id,
            "Basil".to_string(),
            expiry.clone(),
            1,
            true,
            None,
            Some(false),
            Some(expiry),
        );
        assert!(!updated.ok);
        assert!(updated.message.contains("not found"));
        assert!(updated.alarm_commands.is_empty());
    }

    #[test]
    fn item_delete_always_returns_cancel() {
        let created = item_create("Ham".to_string(), date_in(2), 1, false, None);
        let item_id = created.item_id.expect("created item id");

        let deleted = item_delete(item_id);
        assert!(deleted.ok, "{}", deleted.message);
        assert_eq!(deleted.alarm_commands.len(), 1);
        assert_eq!(deleted.alarm_commands[0].command, "cancel");
        assert!(!item_get(item_id).ok);
    }

    #[test]
    fn items_list_normalizes_unknown_sort_index() {
        let response = items_list(Some(42));
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.applied_sort, 0);
    }

    #[test]
    fn sort_preference_rejects_unknown_index_and_accepts_known() {
        assert!(!sort_preference_set(9).is_empty());
        assert!(sort_preference_set(3).is_empty());
        assert_eq!(sort_preference_get(), 3);
    }

    #[test]
    fn reminder_fired_for_expired_item_cancels_recurrence() {
        let response =
            reminder_fired(5, "Yogurt".to_string(), date_in(-1)).expect("valid payload");
        assert_eq!(response.kind, "expired");
        assert_eq!(response.alarm_commands.len(), 1);
        assert_eq!(response.alarm_commands[0].command, "cancel");

        let today = reminder_fired(5, "Yogurt".to_string(), date_in(0)).expect("valid payload");
        assert_eq!(today.kind, "expires_today");
        assert!(today.alarm_commands.is_empty());
    }
}
