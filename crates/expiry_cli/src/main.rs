//! Command-line shell over the expiry tracker core.
//!
//! # Responsibility
//! - Verify `expiry_core` linkage without the Flutter/FFI runtime.
//! - Offer add/list/delete/summary flows against the configured database.
//!
//! Reminder commands are logged rather than delivered; there is no platform
//! alarm service on the command line.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use expiry_core::db::DbTarget;
use expiry_core::{
    init_logging_from_config, remaining_days, Clock, CoreConfig, FoodItem, FoodItemInput,
    FoodItemService, FoodItemStore, LoggingAlarmScheduler, SortOrder, SortPreferenceService,
    SystemClock, DEFAULT_QUANTITY, MAX_QUANTITY,
};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "expiry")]
#[command(about = "Track food expiry dates from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core ping and version
    Ping,

    /// Add a food item
    Add {
        /// Item name
        name: String,

        /// Expiry date (YYYY-MM-DD)
        expiry: NaiveDate,

        /// Quantity (0..=100)
        #[arg(short, long, default_value_t = DEFAULT_QUANTITY)]
        quantity: u32,

        /// Disable the expiry reminder
        #[arg(long)]
        no_reminder: bool,

        /// Free-text note
        #[arg(long)]
        note: Option<String>,
    },

    /// List items; uses the saved sort order when no index is given
    List {
        /// Sort order index (0..=5)
        sort_index: Option<i64>,

        /// Persist the given sort order as the new default
        #[arg(long)]
        save: bool,
    },

    /// Delete an item by id
    Delete {
        /// Item id
        id: i64,
    },

    /// Count items expiring soon and already expired
    Summary,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CoreConfig::from_env();
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: &CoreConfig) -> Result<(), String> {
    if let Commands::Ping = command {
        println!("expiry_core ping={}", expiry_core::ping());
        println!("expiry_core version={}", expiry_core::core_version());
        return Ok(());
    }

    let store = FoodItemStore::open(&DbTarget::File(config.db_path.clone()))
        .map_err(|err| format!("failed to open `{}`: {err}", config.db_path.display()))?;
    let service = FoodItemService::new(&store, LoggingAlarmScheduler);
    let today = SystemClock.today();

    match command {
        Commands::Ping => Ok(()),
        Commands::Add {
            name,
            expiry,
            quantity,
            no_reminder,
            note,
        } => {
            let input = add_input(name, expiry, quantity, !no_reminder, note);
            let outcome = service.create_item(input).map_err(|err| err.to_string())?;
            println!("added #{}", outcome.item.item_id);
            print_item(&outcome.item, today);
            if let Some(warning) = outcome.warning {
                eprintln!("warning: {warning}");
            }
            Ok(())
        }
        Commands::List { sort_index, save } => {
            let preferences = SortPreferenceService::new(&store);
            let order = match sort_index {
                Some(index) => SortOrder::from_index_or_default(index),
                None => preferences.load(),
            };
            if save {
                preferences.set(order).map_err(|err| err.to_string())?;
            }
            let items = service.list_items(order).map_err(|err| err.to_string())?;
            println!("# {} ({} items)", order.as_str(), items.len());
            for item in &items {
                print_item(item, today);
            }
            Ok(())
        }
        Commands::Delete { id } => {
            let outcome = service.delete_item(id).map_err(|err| err.to_string())?;
            println!("deleted #{}", outcome.item_id);
            if let Some(warning) = outcome.warning {
                eprintln!("warning: {warning}");
            }
            Ok(())
        }
        Commands::Summary => {
            let summary = service.expiry_summary().map_err(|err| err.to_string())?;
            println!("expiring_soon={}", summary.expiring_soon);
            println!("expired={}", summary.expired);
            Ok(())
        }
    }
}

/// Builds the create form; quantities above the stepper range are capped.
fn add_input(
    name: String,
    expiry: NaiveDate,
    quantity: u32,
    is_notification_on: bool,
    note: Option<String>,
) -> FoodItemInput {
    FoodItemInput {
        name,
        expiry_date: expiry,
        quantity: quantity.min(MAX_QUANTITY),
        is_notification_on,
        note,
    }
}

fn print_item(item: &FoodItem, today: NaiveDate) {
    let days = remaining_days(item.expiry_date, today);
    let reminder = if item.is_notification_on { "on" } else { "off" };
    println!(
        "{:>5}  {:<24} {}  {:>4}d  x{:<3} reminder={}",
        item.item_id, item.name, item.expiry_date, days, item.quantity, reminder
    );
}

#[cfg(test)]
mod tests {
    use super::{add_input, Cli, Commands};
    use chrono::NaiveDate;
    use clap::Parser;
    use expiry_core::MAX_QUANTITY;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 30).expect("valid date")
    }

    #[test]
    fn add_input_keeps_zero_quantity_and_caps_large_values() {
        assert_eq!(add_input("Milk".to_string(), expiry(), 0, true, None).quantity, 0);
        assert_eq!(
            add_input("Milk".to_string(), expiry(), 250, true, None).quantity,
            MAX_QUANTITY
        );
    }

    #[test]
    fn add_command_parses_zero_quantity_and_iso_date() {
        let cli = Cli::try_parse_from(["expiry", "add", "Milk", "2026-10-30", "--quantity", "0"])
            .expect("valid arguments");
        let Commands::Add {
            expiry: parsed,
            quantity,
            no_reminder,
            ..
        } = cli.command
        else {
            panic!("expected add command");
        };
        assert_eq!(parsed, expiry());
        assert_eq!(quantity, 0);
        assert!(!no_reminder);
    }
}
