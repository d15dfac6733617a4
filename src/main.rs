use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = accdev::Cli::parse();
    accdev::run(cli)
}
