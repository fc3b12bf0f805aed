//! Data models shared between the server and display clients

mod capacity;
mod dining_table;
mod menu_item;

pub use capacity::{CapacitySettings, CapacitySettingsUpdate};
pub use dining_table::{DiningTable, DiningTableCreate, DiningTableUpdate};
pub use menu_item::{MenuItem, MenuVariant};
