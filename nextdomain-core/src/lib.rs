pub mod command;
pub mod config;
pub mod dispatch;
pub mod logs;
pub mod session;
pub mod state;
pub mod tasks;
pub mod theme;

use colored::Colorize;

pub use command::Command;
pub use config::Settings;
pub use dispatch::{Effect, Prompt};
pub use session::{Screen, Session};
pub use state::AppState;
pub use tasks::{ActionTask, Job, TaskReport};
pub use theme::Theme;

pub const VERSION: &str = "3.1211";
pub const BANNER: &str = "Nextdomain v3.1211 - Matrix Style Scanner";

pub fn print_banner() {
    println!("{}", BANNER.bright_green().bold());
    println!("{}", ">".repeat(25).green());
    println!();
}
