use chrono::NaiveDate;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Validate settings, query every API once, and write a diagnostic report")]
    Check(CheckArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    #[arg(long, default_value = "1", help = "Number of days to query, ending now")]
    pub days: u32,

    #[arg(long, help = "First day to query (YYYY-MM-DD); overrides --days")]
    pub start: Option<NaiveDate>,

    #[arg(long, help = "Last day to query (YYYY-MM-DD); defaults to today")]
    pub end: Option<NaiveDate>,

    #[arg(short, long, help = "Echo API payloads to the console as well as the report")]
    pub verbose: bool,

    #[arg(long, default_value = ".", help = "Directory the report file is written to")]
    pub output_dir: PathBuf,
}
