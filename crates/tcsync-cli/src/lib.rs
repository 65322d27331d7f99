// NOTE: tcsync Architecture Rationale
//
// Why a library crate behind the binary?
// - Integration tests drive `run` and the clients without spawning processes
// - The check logic itself lives in tcsync-runtime; this crate only wires
//   arguments, configuration, HTTP clients and the console together
//
// Why blocking HTTP?
// - Probes run strictly one after another; an async runtime buys nothing here

mod args;
mod clients;
mod commands;
mod handlers;
mod ui;

pub use args::{CheckArgs, Cli, Commands, LogLevel};
pub use clients::{HttpSources, NightscoutClient, TconnectClient};
pub use commands::run;
pub use ui::ConsoleEcho;
