//! Process executors
//!
//! Two execution strategies over OS subprocesses: a synchronous executor that
//! runs commands strictly in order, and an asynchronous executor that launches
//! every command at once and cooperatively multiplexes their merged output
//! pipes from a single thread. Both fail fast: the first non-zero exit aborts
//! the whole run.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{Command, Environ};
use crate::ui::color_for;
use colored::{Color, Colorize};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use os_pipe::PipeReader;
use std::io::{self, Read, Write};
use std::os::fd::AsFd;
use std::process::{Child, ExitStatus, Stdio};

/// Bounded wait per pipe poll, in milliseconds
const POLL_TIMEOUT_MS: u8 = 100;

/// Bytes read from a ready pipe per loop iteration
const READ_CHUNK: usize = 64;

/// Run commands strictly in order, aborting on the first failure.
///
/// Non-capturing commands stream their output straight to the console;
/// capturing commands run with merged stdout/stderr collected into a buffer
/// whose trimmed contents are stored under the variable name in `environ`.
pub fn execute_sync(commands: &[Command], environ: &mut Environ, quiet: bool) -> ExecutionResult<()> {
    for command in commands {
        if !command.is_capture() && !quiet {
            println!("[run] Launched '{}'", command.code);
        }

        let code = environ.substitute_runargs(&command.code);
        match &command.variable {
            None => {
                let status = shell_command(&code, environ).status().map_err(|error| {
                    ExecutionError::Launch {
                        code: code.clone(),
                        error,
                    }
                })?;
                if !status.success() {
                    return Err(ExecutionError::CommandFailed(command.code.clone()));
                }
            }
            Some(variable) => {
                let (output, status) = capture_merged(&code, environ)?;
                if !status.success() {
                    return Err(ExecutionError::CommandFailed(command.code.clone()));
                }
                environ.set(variable.clone(), output.trim().to_string());
            }
        }
    }

    Ok(())
}

/// One launched concurrent command
struct Running {
    command: Command,
    child: Child,
    reader: PipeReader,
    color: Color,
    eof: bool,
}

/// Launch every command concurrently and multiplex their output pipes.
///
/// Each process gets its own merged stdout/stderr pipe and a stable color
/// assigned in launch order. A single polling loop waits on the head
/// process's pipe (every pipe when `multiplex` is set) with a bounded
/// timeout, printing chunks as they become ready. A finished head process is
/// removed and the scan restarts; finished non-head processes stay tracked
/// until they advance to head position.
pub fn execute_async(
    commands: &[Command],
    environ: &Environ,
    multiplex: bool,
    quiet: bool,
    faketty: bool,
) -> ExecutionResult<()> {
    // Launch processes
    let mut running = Vec::with_capacity(commands.len());
    for (index, command) in commands.iter().enumerate() {
        if !quiet {
            println!("[run] Launched '{}'", command.code);
        }

        let code = apply_faketty(&environ.substitute_runargs(&command.code), faketty);
        let (child, reader) = spawn_piped(&code, environ)?;
        running.push(Running {
            command: command.clone(),
            child,
            reader,
            color: color_for(index),
            eof: false,
        });
    }

    // Wait processes
    while !running.is_empty() {
        for index in 0..running.len() {
            // Only the head process drives output unless multiplex is enabled
            if !multiplex && index != 0 {
                continue;
            }

            let process = &mut running[index];

            // Process output
            if !process.eof && poll_readable(&process.reader)? {
                let mut chunk = [0u8; READ_CHUNK];
                let count = process.reader.read(&mut chunk)?;
                if count == 0 {
                    process.eof = true;
                } else {
                    print_chunk(&chunk[..count], &process.command.name, process.color, multiplex, quiet);
                }
            }

            // Process finish
            if process.eof {
                let mut rest = Vec::new();
                process.reader.read_to_end(&mut rest)?;
                if !rest.is_empty() {
                    print_chunk(&rest, &process.command.name, process.color, multiplex, quiet);
                }

                let status = process.child.wait()?;
                if !status.success() {
                    return Err(ExecutionError::CommandFailed(process.command.code.clone()));
                }
                if index == 0 {
                    running.remove(0);
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Wrap a command so it runs under an emulated pseudo-terminal
pub fn apply_faketty(code: &str, faketty: bool) -> String {
    if !faketty {
        return code.to_string();
    }
    let quoted = shlex::try_quote(code)
        .map(|q| q.into_owned())
        .unwrap_or_else(|_| code.to_string());
    format!("script -qefc {} /dev/null", quoted)
}

/// Build a shell invocation carrying the environment store
fn shell_command(code: &str, environ: &Environ) -> std::process::Command {
    let mut command = std::process::Command::new("sh");
    command.arg("-c").arg(code);
    command.envs(environ.iter());
    command
}

/// Spawn a command with stdout and stderr merged into one pipe
fn spawn_piped(code: &str, environ: &Environ) -> ExecutionResult<(Child, PipeReader)> {
    let (reader, writer) = os_pipe::pipe()?;
    let writer_clone = writer.try_clone()?;

    let mut command = shell_command(code, environ);
    command.stdin(Stdio::null()).stdout(writer_clone).stderr(writer);
    let child = command.spawn().map_err(|error| ExecutionError::Launch {
        code: code.to_string(),
        error,
    })?;

    // The command object still holds pipe writer copies; it is dropped here
    // so the reader sees EOF once the child exits.
    drop(command);

    Ok((child, reader))
}

/// Run a command to completion with merged output captured
fn capture_merged(code: &str, environ: &Environ) -> ExecutionResult<(String, ExitStatus)> {
    let (mut child, mut reader) = spawn_piped(code, environ)?;

    let mut output = Vec::new();
    reader.read_to_end(&mut output)?;
    let status = child.wait()?;

    Ok((String::from_utf8_lossy(&output).into_owned(), status))
}

/// Wait up to the poll timeout for the pipe to become readable
fn poll_readable(reader: &PipeReader) -> ExecutionResult<bool> {
    let mut fds = [PollFd::new(reader.as_fd(), PollFlags::POLLIN)];
    let ready = poll(&mut fds, PollTimeout::from(POLL_TIMEOUT_MS)).map_err(io::Error::from)?;
    Ok(ready > 0)
}

/// Print one chunk of process output, tagged with the command's colored name
/// when multiplexing
fn print_chunk(chunk: &[u8], name: &str, color: Color, multiplex: bool, quiet: bool) {
    let text = String::from_utf8_lossy(chunk).replace("\r\n", "\n");
    if multiplex && !quiet {
        print!("{} | ", name.color(color));
    }
    if text.ends_with('\n') {
        print!("{}", text);
    } else {
        println!("{}", text);
    }
    let _ = io::stdout().flush();
}
