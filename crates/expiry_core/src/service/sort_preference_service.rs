//! Sort order preference use-case.
//!
//! # Invariants
//! - `load` never fails: missing, unreadable or unknown values resolve to
//!   `SortOrder::RemainingDaysAsc`.
//! - `set` persists the stable index of the chosen order.

use crate::model::sort_order::SortOrder;
use crate::repo::food_item_repo::RepoResult;
use crate::repo::preference_repo::{PreferenceRepository, SORT_ORDER_PREFERENCE_KEY};
use log::{info, warn};

pub struct SortPreferenceService<P: PreferenceRepository> {
    repo: P,
}

impl<P: PreferenceRepository> SortPreferenceService<P> {
    pub fn new(repo: P) -> Self {
        Self { repo }
    }

    /// Returns the persisted sort order, or the default one.
    pub fn load(&self) -> SortOrder {
        let stored = match self.repo.get_preference(SORT_ORDER_PREFERENCE_KEY) {
            Ok(value) => value,
            Err(err) => {
                warn!("event=sort_pref_load module=service status=error error={err}");
                return SortOrder::default();
            }
        };

        let Some(raw) = stored else {
            return SortOrder::default();
        };
        match raw.trim().parse::<i64>().ok().and_then(SortOrder::from_index) {
            Some(order) => order,
            None => {
                warn!("event=sort_pref_load module=service status=warn error_code=unknown_value");
                SortOrder::default()
            }
        }
    }

    /// Persists `order` as the startup default.
    pub fn set(&self, order: SortOrder) -> RepoResult<()> {
        self.repo
            .set_preference(SORT_ORDER_PREFERENCE_KEY, &order.index().to_string())?;
        info!(
            "event=sort_pref_set module=service status=ok order={}",
            order.as_str()
        );
        Ok(())
    }
}
