//! Execution plan
//!
//! The ordered list of resolved commands tagged with an execution mode. The
//! plan renders a human-readable preview for help output and drives the
//! executors: variable captures always run first and synchronously, then the
//! remaining commands are dispatched according to the mode.

use crate::error::ExecutionResult;
use crate::runner::environ::{Environ, RUNARGS};
use crate::runner::executor::{execute_async, execute_sync};
use crate::runner::task::TaskKind;
use crate::runner::Command;
use std::env;
use std::time::Instant;

/// Environment variable naming an external env file to load before execution
pub const RUNVARS: &str = "RUNVARS";

/// Ordered, mode-tagged list of resolved commands
#[derive(Debug, Clone)]
pub struct Plan {
    /// Commands in execution order, captures interleaved where declared
    pub commands: Vec<Command>,

    /// Execution mode of the target task
    pub mode: TaskKind,
}

impl Plan {
    /// Create a plan from resolved commands and the target's mode
    pub fn new(commands: Vec<Command>, mode: TaskKind) -> Self {
        Plan { commands, mode }
    }

    /// Render a preview of the plan
    ///
    /// Grouped modes get a mode-name banner line before the first streamed
    /// command; captured commands render as `NAME='code'`.
    pub fn explain(&self) -> String {
        let mut lines = Vec::new();
        let mut plain = true;

        for command in &self.commands {
            if self.mode.is_grouped() && !command.is_capture() {
                if plain {
                    lines.push(format!("[{}]", self.mode.to_string().to_uppercase()));
                }
                plain = false;
            }

            let code = match &command.variable {
                Some(variable) => format!("{}='{}'", variable, command.code),
                None => command.code.clone(),
            };
            let indent = if plain { "" } else { "    " };
            lines.push(format!("{}$ {}", indent, code));
        }

        lines.join("\n")
    }

    /// Execute the plan
    ///
    /// Captures run first so their values are visible to every later command;
    /// a plan with only captures prints the last captured value and stops.
    pub fn execute(
        &self,
        argv: &[String],
        environ: &mut Environ,
        quiet: bool,
        faketty: bool,
    ) -> ExecutionResult<()> {
        // Partition captures from streamed commands, preserving order
        let (variables, commands): (Vec<Command>, Vec<Command>) =
            self.commands.iter().cloned().partition(|c| c.is_capture());
        let varnames: Vec<String> = variables.iter().filter_map(|c| c.variable.clone()).collect();

        execute_sync(&variables, environ, quiet)?;

        // Pure "print a computed value" mode
        if commands.is_empty() {
            if let Some(name) = varnames.last() {
                println!("{}", environ.get(name).unwrap_or(""));
            }
            return Ok(());
        }

        // Provide arguments and the optional external env file
        environ.set(RUNARGS, argv.join(" "));
        load_runvars(environ);

        if !quiet {
            let items: Vec<String> = varnames
                .iter()
                .map(String::as_str)
                .chain([RUNARGS])
                .map(|name| format!("{}={}", name, environ.get(name).unwrap_or("")))
                .collect();
            println!("[run] Prepared '{}'", items.join("; "));
        }

        let start = Instant::now();
        match self.mode {
            TaskKind::Parallel => execute_async(&commands, environ, false, quiet, faketty)?,
            TaskKind::Multiplex => execute_async(&commands, environ, true, quiet, faketty)?,
            _ => execute_sync(&commands, environ, quiet)?,
        }

        if !quiet {
            println!(
                "[run] Finished in {:.3} seconds",
                start.elapsed().as_secs_f64()
            );
        }

        Ok(())
    }
}

/// Merge the env file named by `$RUNVARS` into the store, if one is set
fn load_runvars(environ: &mut Environ) {
    if let Ok(path) = env::var(RUNVARS) {
        if let Ok(entries) = dotenvy::from_filename_iter(&path) {
            for (name, value) in entries.flatten() {
                environ.set(name, value);
            }
        }
    }
}
