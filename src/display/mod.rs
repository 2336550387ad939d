//! Read-only presentation of a month: headline figures, metrics and the
//! chronological entry table.

pub mod amount;
pub mod table;
pub mod view;

pub use amount::AmountFormat;
pub use table::{Alignment, Table, TableColumn};
pub use view::{DayRow, MonthView};
