//! Full-screen terminal views for the Shelf book catalogue.

pub mod common;
pub mod effects;
pub mod events;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod screens;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stdout};

use anyhow::Result;
pub use runtime::TuiRuntime;
use shelf_core::AppContext;

/// Runs the interactive views until the user quits.
///
/// Must be called from inside a tokio runtime.
///
/// # Errors
/// Returns an error when stdout is not a terminal or the terminal fails.
pub fn run_interactive(ctx: AppContext) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!(
            "The interactive view requires a terminal.\n\
             Use `shelf books list` and the other subcommands for non-interactive use."
        );
    }
    tracing::info!(api = ctx.api.url(), "starting interactive view");

    let mut runtime = TuiRuntime::new(ctx)?;
    runtime.run()
}
