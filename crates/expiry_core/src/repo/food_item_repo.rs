//! Food item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD and sorted-list APIs over `food_items` storage.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Repositories do not validate names; the service does that before saving.
//! - `update_item` and `delete_item` are silent no-ops for unknown ids.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::food_item::{FoodItem, FoodItemId, UNSAVED_ITEM_ID};
use crate::model::sort_order::SortOrder;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_SELECT_SQL: &str = "SELECT
    item_id,
    name,
    expiry_date,
    quantity,
    is_notification_on,
    note
FROM food_items";

const EXPIRY_DATE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(FoodItemId),
    InvalidData(String),
    /// A thread panicked while holding the store connection.
    LockPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "food item not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
            Self::LockPoisoned => write!(f, "item store lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::LockPoisoned => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for food item persistence.
pub trait FoodItemRepository {
    /// Inserts `item` and returns its identifier.
    ///
    /// `UNSAVED_ITEM_ID` lets the store generate one; any other id is kept.
    fn insert_item(&self, item: &FoodItem) -> RepoResult<FoodItemId>;
    /// Replaces every mutable field of the row matching `item.item_id`.
    fn update_item(&self, item: &FoodItem) -> RepoResult<()>;
    fn delete_item(&self, id: FoodItemId) -> RepoResult<()>;
    fn get_item(&self, id: FoodItemId) -> RepoResult<FoodItem>;
    fn list_items(&self, order: SortOrder) -> RepoResult<Vec<FoodItem>>;
}

/// SQLite-backed item repository over a borrowed connection.
pub struct SqliteFoodItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFoodItemRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl FoodItemRepository for SqliteFoodItemRepository<'_> {
    fn insert_item(&self, item: &FoodItem) -> RepoResult<FoodItemId> {
        let explicit_id = (item.item_id != UNSAVED_ITEM_ID).then_some(item.item_id);

        self.conn.execute(
            "INSERT INTO food_items (
                item_id,
                name,
                expiry_date,
                quantity,
                is_notification_on,
                note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                explicit_id,
                item.name.as_str(),
                format_expiry_date(item.expiry_date),
                i64::from(item.quantity),
                bool_to_int(item.is_notification_on),
                item.note.as_deref(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_item(&self, item: &FoodItem) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE food_items
             SET
                name = ?1,
                expiry_date = ?2,
                quantity = ?3,
                is_notification_on = ?4,
                note = ?5
             WHERE item_id = ?6;",
            params![
                item.name.as_str(),
                format_expiry_date(item.expiry_date),
                i64::from(item.quantity),
                bool_to_int(item.is_notification_on),
                item.note.as_deref(),
                item.item_id,
            ],
        )?;

        Ok(())
    }

    fn delete_item(&self, id: FoodItemId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM food_items WHERE item_id = ?1;", [id])?;
        Ok(())
    }

    fn get_item(&self, id: FoodItemId) -> RepoResult<FoodItem> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE item_id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => parse_item_row(row),
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn list_items(&self, order: SortOrder) -> RepoResult<Vec<FoodItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL} ORDER BY {};",
            order.order_by_sql()
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<FoodItem> {
    let item_id: FoodItemId = row.get("item_id")?;

    let expiry_text: String = row.get("expiry_date")?;
    let expiry_date = NaiveDate::parse_from_str(&expiry_text, EXPIRY_DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid expiry date `{expiry_text}` in food_items.expiry_date (item_id={item_id})"
        ))
    })?;

    let quantity_raw: i64 = row.get("quantity")?;
    let quantity = u32::try_from(quantity_raw).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid quantity `{quantity_raw}` in food_items.quantity (item_id={item_id})"
        ))
    })?;

    let is_notification_on = match row.get::<_, i64>("is_notification_on")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_notification_on value `{other}` in food_items.is_notification_on"
            )));
        }
    };

    Ok(FoodItem {
        item_id,
        name: row.get("name")?,
        expiry_date,
        quantity,
        is_notification_on,
        note: row.get("note")?,
    })
}

fn format_expiry_date(date: NaiveDate) -> String {
    date.format(EXPIRY_DATE_FORMAT).to_string()
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

impl<R: FoodItemRepository + ?Sized> FoodItemRepository for &R {
    fn insert_item(&self, item: &FoodItem) -> RepoResult<FoodItemId> {
        (**self).insert_item(item)
    }

    fn update_item(&self, item: &FoodItem) -> RepoResult<()> {
        (**self).update_item(item)
    }

    fn delete_item(&self, id: FoodItemId) -> RepoResult<()> {
        (**self).delete_item(id)
    }

    fn get_item(&self, id: FoodItemId) -> RepoResult<FoodItem> {
        (**self).get_item(id)
    }

    fn list_items(&self, order: SortOrder) -> RepoResult<Vec<FoodItem>> {
        (**self).list_items(order)
    }
}

impl<R: FoodItemRepository + ?Sized> FoodItemRepository for std::sync::Arc<R> {
    fn insert_item(&self, item: &FoodItem) -> RepoResult<FoodItemId> {
        (**self).insert_item(item)
    }

    fn update_item(&self, item: &FoodItem) -> RepoResult<()> {
        (**self).update_item(item)
    }

    fn delete_item(&self, id: FoodItemId) -> RepoResult<()> {
        (**self).delete_item(id)
    }

    fn get_item(&self, id: FoodItemId) -> RepoResult<FoodItem> {
        (**self).get_item(id)
    }

    fn list_items(&self, order: SortOrder) -> RepoResult<Vec<FoodItem>> {
        (**self).list_items(order)
    }
}
