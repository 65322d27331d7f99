use super::args::{Cli, Commands};
use super::handlers;
use anyhow::Result;

pub fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        show_guidance();
        return Ok(());
    };

    match command {
        Commands::Check(args) => handlers::check::handle(cli.config.as_deref(), &args),
    }
}

fn show_guidance() {
    println!("tcsync - tconnectsync connectivity checks\n");
    println!("Run all checks:");
    println!("  tcsync check                      # Query the last day of data");
    println!("  tcsync check --days 7 --verbose   # Wider range, echo API payloads\n");
    println!("Settings are read from the config file, then from the environment:");
    println!("  TCONNECT_EMAIL, TCONNECT_PASSWORD, PUMP_SERIAL_NUMBER, NS_URL, NS_SECRET, TIMEZONE_NAME\n");
    println!("For more commands:");
    println!("  tcsync --help");
}
