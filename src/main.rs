//! Interactive picker that turns a hand-selected set of files into one LLM
//! context document.

mod cli;
mod core;
mod domain;
mod infra;

fn main() -> anyhow::Result<()> {
    cli::commands::run()
}
