//! stylefold CLI entry point
//!
//! Parses arguments, installs the stderr log subscriber, runs the selected
//! command and turns failures into a readable message with exit status 1.
//!
//! Commands:
//! - `report` - write the cross-file duplicate report
//! - `plan` - build the consolidation plan from the report
//! - `apply` - execute the plan with backups
//! - `dedupe` - remove duplicates within files
//! - `prune` - remove redundant contextual rules

use anyhow::Result;
use clap::Parser;
use stylefold_cli::cli;
use stylefold_cli::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.log_level());

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
