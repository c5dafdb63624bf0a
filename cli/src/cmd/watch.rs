use std::path::PathBuf;

use anyhow::Result;
use banwatch_model::{BanTableModel, ModelEvent};
use banwatch_util::time::UnixTime;
use clap::Parser;

use crate::util::{init_logger_simple, load_bans, render_table};

/// Watch the ban table, reprinting it whenever it changes.
#[derive(Parser)]
pub struct CmdWatch {
    /// Path to a JSON array of ban entries.
    #[clap(long)]
    bans: PathBuf,

    /// Drop bans that expire while watching.
    #[clap(long)]
    sweep: bool,
}

impl CmdWatch {
    pub fn run(self) -> Result<()> {
        init_logger_simple("info");
        let registry = load_bans(&self.bans)?;

        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(async move {
                let model = BanTableModel::new(registry.clone());
                let mut events = model.subscribe();
                model.start_auto_refresh();

                let mut last_rendered = render_table(&model).to_string();
                println!("{last_rendered}");

                loop {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {
                            tracing::info!("received ctrl-c");
                            break;
                        }
                        event = events.recv() => match event {
                            Some(ModelEvent::LayoutChanged) => {
                                if self.sweep {
                                    registry.sweep_expired(UnixTime::now());
                                }
                                let rendered = render_table(&model).to_string();
                                if rendered != last_rendered {
                                    println!("{rendered}");
                                    last_rendered = rendered;
                                }
                            }
                            Some(ModelEvent::LayoutAboutToChange) => {}
                            None => break,
                        }
                    }
                }

                model.stop_auto_refresh();
                Ok(())
            })
    }
}
