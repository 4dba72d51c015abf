//! Main CLI application

use crate::config::{parse_config_file, CONFIG_FILE_NAME};
use crate::error::RunError;
use crate::runner::{Environ, TaskTree};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

/// CLI application
pub struct App {
    /// The clap command
    command: Command,
}

impl App {
    /// Create a new app
    pub fn new() -> Self {
        App {
            command: build_command(),
        }
    }

    /// Run the application with command line arguments
    pub fn run(self) -> Result<(), RunError> {
        let matches = self.command.get_matches();
        dispatch(&matches)
    }
}

impl Default for App {
    fn default() -> Self {
        App::new()
    }
}

/// Build the clap command
///
/// Everything after the flags is forwarded verbatim to task resolution, so
/// the positional argument accepts hyphen-prefixed filter tokens.
fn build_command() -> Command {
    Command::new("rrun")
        .version(crate::VERSION)
        .about("A declarative YAML task tree runner")
        .arg(
            Arg::new("run-path")
                .long("run-path")
                .value_name("FILE")
                .help("Path to the run.yml config file")
                .default_value(CONFIG_FILE_NAME),
        )
        .arg(
            Arg::new("run-complete")
                .long("run-complete")
                .help("Print completion candidates for the given task path")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("args")
                .value_name("ARGS")
                .help("Task path, filters, and forwarded arguments")
                .num_args(0..)
                .allow_hyphen_values(true)
                .trailing_var_arg(true),
        )
}

/// Parse the configuration and hand the argument vector to the task tree
fn dispatch(matches: &ArgMatches) -> Result<(), RunError> {
    let path = matches
        .get_one::<String>("run-path")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let argv: Vec<String> = matches
        .get_many::<String>("args")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let config = parse_config_file(&path)?;
    let tree = TaskTree::build(&config.root, config.options)?;

    if matches.get_flag("run-complete") {
        tree.complete(&argv);
        return Ok(());
    }

    tree.run(&argv, &mut Environ::new())
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<(), RunError> {
    App::new().run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_path_defaults() {
        let matches = build_command().get_matches_from(vec!["rrun"]);
        assert_eq!(
            matches.get_one::<String>("run-path").map(String::as_str),
            Some("run.yml")
        );
        assert!(!matches.get_flag("run-complete"));
    }

    #[test]
    fn test_hyphen_tokens_reach_the_argument_vector() {
        let matches = build_command().get_matches_from(vec!["rrun", "check", "-build", "+lint"]);
        let argv: Vec<&String> = matches.get_many::<String>("args").unwrap().collect();
        assert_eq!(argv, ["check", "-build", "+lint"]);
    }

    #[test]
    fn test_run_complete_flag() {
        let matches = build_command().get_matches_from(vec!["rrun", "--run-complete", "deploy"]);
        assert!(matches.get_flag("run-complete"));
    }
}
