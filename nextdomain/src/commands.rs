use crate::CLAP_STYLING;
use clap::{arg, command};
use std::path::PathBuf;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("nextdomain")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("nextdomain")
        .about("Matrix style website scanner. Runs the interactive terminal UI when no subcommand is given.")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and spinners")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-d --"data-dir" <DIR>)
                .required(false)
                .global(true)
                .help("Directory holding the crash log, theme and update files")
                .default_value("."),
        )
        .arg(
            arg!(--"activity-log" <PATH>)
                .required(false)
                .global(true)
                .help("File that records every scanned domain")
                .default_value("~/activity.log"),
        )
        .arg(
            arg!(-t --"timeout" <SECONDS>)
                .required(false)
                .global(true)
                .help("Timeout for HTTP requests and the header tool")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("5"),
        )
        .arg(
            arg!(--"no-typewriter" "Show output instantly instead of typing it")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(--"secret" <PASSWORD>)
                .required(false)
                .global(true)
                .help("Password for the hidden request sweep")
                .default_value("1211"),
        )
        .subcommand_required(false)
        .subcommand(command!("ui").about("Launch the interactive terminal UI"))
        .subcommand(
            command!("scan")
                .about("List same-site pages and hidden (root-relative) links of a page")
                .arg(url_arg())
                .arg(arg!(--"json" "Print the result as JSON").required(false)),
        )
        .subcommand(
            command!("headers")
                .about("Show response headers (curl -I, or a HEAD request when curl is missing)")
                .arg(url_arg()),
        )
        .subcommand(
            command!("front")
                .about("Print the page source as served")
                .arg(url_arg()),
        )
        .subcommand(
            command!("back")
                .about("Print the page source fetched through curl, truncated by default")
                .arg(url_arg())
                .arg(arg!(--"full" "Do not truncate the output").required(false)),
        )
        .subcommand(
            command!("text")
                .about("Print the visible text of a page")
                .arg(url_arg()),
        )
        .subcommand(
            command!("sweep")
                .about("Send GET, POST, PUT, DELETE, OPTIONS and HEAD to a URL")
                .arg(url_arg()),
        )
        .subcommand(
            command!("post")
                .about("POST a form message and print the reply")
                .arg(url_arg())
                .arg(
                    arg!(<MESSAGE>)
                        .required(true)
                        .help("Value sent in the 'message' form field"),
                ),
        )
        .subcommand(
            command!("run").about("Run a Python script").arg(
                arg!(<PATH>)
                    .required(true)
                    .help("Script to run")
                    .value_parser(clap::value_parser!(PathBuf)),
            ),
        )
        .subcommand(
            command!("logs")
                .about("Inspect or clear the logs")
                .subcommand_required(true)
                .subcommand(command!("crash").about("Show the crash log"))
                .subcommand(command!("activity").about("Show every scanned domain"))
                .subcommand(command!("clear").about("Delete the crash and activity logs")),
        )
}

fn url_arg() -> clap::Arg {
    arg!(<URL>)
        .required(true)
        .help("Target URL; https:// is assumed when no scheme is given")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_definition_is_valid() {
        command_argument_builder().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let matches = command_argument_builder()
            .try_get_matches_from([
                "nextdomain",
                "scan",
                "example.com",
                "--timeout",
                "9",
                "--json",
            ])
            .unwrap();

        assert_eq!(matches.get_one::<u64>("timeout"), Some(&9));
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "scan");
        assert!(sub.get_flag("json"));
        assert_eq!(
            sub.get_one::<String>("URL").map(String::as_str),
            Some("example.com")
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result =
            command_argument_builder().try_get_matches_from(["nextdomain", "--timeout", "0", "ui"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_logs_requires_subcommand() {
        let result = command_argument_builder().try_get_matches_from(["nextdomain", "logs"]);
        assert!(result.is_err());
    }
}
