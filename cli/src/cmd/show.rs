use std::path::PathBuf;

use anyhow::Result;
use banwatch_model::BanTableModel;
use banwatch_registry::BanRegistry;
use clap::Parser;

use crate::util::{load_bans, print_json, render_table};

/// Render the ban table once.
#[derive(Parser)]
pub struct CmdShow {
    /// Path to a JSON array of ban entries.
    #[clap(long)]
    bans: PathBuf,

    /// Print a table instead of JSON.
    #[clap(short, long)]
    human_readable: bool,
}

impl CmdShow {
    pub fn run(self) -> Result<()> {
        let registry = load_bans(&self.bans)?;

        if self.human_readable {
            let model = BanTableModel::new(registry);
            if !model.should_show() {
                println!("no banned peers");
                return Ok(());
            }
            println!("{}", render_table(&model));
            Ok(())
        } else {
            print_json(registry.banned())
        }
    }
}
