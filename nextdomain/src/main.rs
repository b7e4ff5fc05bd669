use colored::Colorize;
use nextdomain::handlers::{
    handle_back, handle_front, handle_headers, handle_logs, handle_post, handle_run, handle_scan,
    handle_sweep, handle_text, handle_ui,
};
use nextdomain::{
    LogTarget, command_argument_builder, init_tracing, install_panic_hook, settings_from_matches,
};
use nextdomain_core::print_banner;

#[tokio::main]
async fn main() {
    let chosen_command = command_argument_builder().get_matches();
    let quiet = chosen_command.get_flag("quiet");

    let settings = match settings_from_matches(&chosen_command) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    let interactive = matches!(chosen_command.subcommand(), None | Some(("ui", _)));
    let logging = if interactive {
        init_tracing(LogTarget::File(settings.trace_path()), "nextdomain=info")
    } else {
        init_tracing(LogTarget::Stderr, "nextdomain=warn")
    };
    if let Err(e) = logging {
        eprintln!("{} {:#}", "Warning:".yellow().bold(), e);
    }
    install_panic_hook(settings.crash_log_path(), !interactive);

    if !quiet && !interactive {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        None | Some(("ui", _)) => handle_ui(settings),
        Some(("scan", args)) => handle_scan(args, &settings, quiet).await,
        Some(("headers", args)) => handle_headers(args, &settings, quiet).await,
        Some(("front", args)) => handle_front(args, &settings, quiet).await,
        Some(("back", args)) => handle_back(args, &settings, quiet).await,
        Some(("text", args)) => handle_text(args, &settings, quiet).await,
        Some(("sweep", args)) => handle_sweep(args, &settings, quiet).await,
        Some(("post", args)) => handle_post(args, &settings, quiet).await,
        Some(("run", args)) => handle_run(args, &settings, quiet).await,
        Some(("logs", args)) => handle_logs(args, &settings),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
