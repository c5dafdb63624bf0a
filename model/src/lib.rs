pub use self::ban_table::{BanTableModel, Column, MODEL_UPDATE_INTERVAL};
pub use self::view::{
    CellAlignment, CellValue, DisplayIntent, ItemFlags, ModelEvent, Orientation, SortOrder,
};

mod ban_table;
mod view;
