//! Runtime execution modes.
//!
//! - `tui`: Full-screen interactive terminal UI (optional feature)
//! - everything else runs as one-shot subcommands in `cli::commands`

#[cfg(feature = "tui")]
pub use shelf_tui::run_interactive;

#[cfg(not(feature = "tui"))]
pub fn run_interactive(_ctx: shelf_core::AppContext) -> anyhow::Result<()> {
    anyhow::bail!("TUI support is disabled in this build (feature \"tui\").");
}
