use std::borrow::Cow;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use banwatch_model::{BanTableModel, Column, DisplayIntent};
use banwatch_registry::{BanEntry, MemBanRegistry};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

pub fn init_logger_simple(filter: &str) {
    let mut filter = Cow::Borrowed(filter);
    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV) {
        filter = Cow::Owned(env);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).expect("tracing directives"))
        .try_init()
        .ok();
}

pub fn print_json<T: Serialize>(output: T) -> Result<()> {
    let output = if std::io::stdin().is_terminal() {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }?;

    println!("{output}");
    Ok(())
}

/// Loads a JSON array of ban entries into a fresh registry.
pub fn load_bans<P: AsRef<Path>>(path: P) -> Result<Arc<MemBanRegistry>> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ban file {}", path.display()))?;
    let entries: Vec<BanEntry> =
        serde_json::from_str(&data).with_context(|| format!("invalid ban file {}", path.display()))?;

    let registry = MemBanRegistry::new();
    for entry in entries {
        registry.ban(entry.subnet, entry.banned_until);
    }
    Ok(Arc::new(registry))
}

pub fn render_table(model: &BanTableModel) -> tabled::Table {
    struct TableRow([String; Column::COUNT]);
    impl tabled::Tabled for TableRow {
        const LENGTH: usize = Column::COUNT;
        fn fields(&self) -> Vec<Cow<'_, str>> {
            self.0.iter().map(|cell| Cow::from(cell.as_str())).collect()
        }
        fn headers() -> Vec<Cow<'static, str>> {
            vec![
                Cow::from(Column::Address.title()),
                Cow::from(Column::BannedUntil.title()),
            ]
        }
    }

    let rows = (0..model.row_count()).map(|row| {
        TableRow(std::array::from_fn(|column| {
            model
                .cell_value(row, column, DisplayIntent::Text)
                .as_text()
                .unwrap_or_default()
                .to_owned()
        }))
    });

    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::psql());
    table
}
