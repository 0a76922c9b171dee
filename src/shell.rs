//! Interactive operator shell.
//!
//! Reads one command per line, runs it against a [`Kernel`], and writes the
//! operator-facing report. Commands:
//!
//! ```text
//! submit <job-type> <input-data>   queue a task and run one step
//! continue                         run one step
//! status                           print nodes and queue
//! offline <node> / online <node>   take a node out of / back into rotation
//! shutdown                         discard all work and release nodes
//! help                             list commands
//! exit                             leave the shell
//! ```

use crossterm::style::Stylize;
use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;

use crate::core::NodeId;
use crate::kernel::Kernel;
use crate::orchestration::{SchedulerEvent, StepReport};
use crate::{dlog, Error, Result};

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Submit { task_type: String, input: String },
    Continue,
    Status,
    Offline(NodeId),
    Online(NodeId),
    Shutdown,
    Help,
    Exit,
    Empty,
    Unknown(String),
}

impl ShellCommand {
    /// Parse one input line.
    ///
    /// # Errors
    ///
    /// Returns a validation error when a known command is missing arguments.
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(ShellCommand::Empty);
        };

        let cmd = match command {
            "submit" => match (words.next(), words.next()) {
                (Some(task_type), Some(input)) => ShellCommand::Submit {
                    task_type: task_type.to_string(),
                    input: input.to_string(),
                },
                _ => {
                    return Err(Error::Validation(
                        "Invalid submit command format. Usage: submit <TaskType> <InputData>"
                            .to_string(),
                    ))
                }
            },
            "continue" => ShellCommand::Continue,
            "status" => ShellCommand::Status,
            "offline" => ShellCommand::Offline(parse_node(words.next(), "offline")?),
            "online" => ShellCommand::Online(parse_node(words.next(), "online")?),
            "shutdown" => ShellCommand::Shutdown,
            "help" => ShellCommand::Help,
            "exit" => ShellCommand::Exit,
            other => ShellCommand::Unknown(other.to_string()),
        };
        Ok(cmd)
    }
}

fn parse_node(arg: Option<&str>, command: &str) -> Result<NodeId> {
    arg.and_then(|s| s.parse::<usize>().ok())
        .map(NodeId)
        .ok_or_else(|| Error::Validation(format!("Usage: {command} <node-id>")))
}

/// Whether the shell keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Output options for the shell.
#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// Print the prompt in colour.
    pub color: bool,
    /// Print `status` as JSON instead of the text report.
    pub json: bool,
    /// Delay after each dispatch, for a human watching the output.
    pub pacing: Duration,
    /// Name shown in the prompt.
    pub user: String,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            color: false,
            json: false,
            pacing: Duration::ZERO,
            user: std::env::var("USER").unwrap_or_else(|_| "user".to_string()),
        }
    }
}

pub struct Shell<W: Write> {
    kernel: Kernel,
    out: W,
    options: ShellOptions,
}

impl<W: Write> Shell<W> {
    pub fn new(kernel: Kernel, out: W, options: ShellOptions) -> Self {
        Self {
            kernel,
            out,
            options,
        }
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn into_parts(self) -> (Kernel, W) {
        (self.kernel, self.out)
    }

    /// Read commands until `exit` or end of input, then shut down if the
    /// operator has not already done so.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        let mut lines = input.lines();
        loop {
            self.prompt()?;
            let Some(line) = lines.next() else {
                writeln!(self.out)?;
                break;
            };
            let line = line?;
            let flow = match ShellCommand::parse(&line) {
                Ok(cmd) => self.execute(cmd)?,
                Err(e) => {
                    writeln!(self.out, "[ERROR]: {}", e)?;
                    Flow::Continue
                }
            };
            if flow == Flow::Exit {
                break;
            }
        }

        if self.kernel.is_shut_down() {
            writeln!(
                self.out,
                "[INFO]: All tasks have been deleted and nodes are released, shutting down..."
            )?;
        } else {
            self.shutdown()?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        let prompt = format!("DTK-{} $ ", self.options.user);
        if self.options.color {
            write!(self.out, "{}", prompt.green().bold())?;
        } else {
            write!(self.out, "{}", prompt)?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Run a single command.
    pub fn execute(&mut self, cmd: ShellCommand) -> Result<Flow> {
        dlog!("Shell command: {:?}", cmd);
        match cmd {
            ShellCommand::Submit { task_type, input } => {
                match self.kernel.submit(&task_type, &input) {
                    Ok(submission) => {
                        writeln!(
                            self.out,
                            "[INFO]: Task ID {} ({}) submitted and queued.",
                            submission.task_id, task_type
                        )?;
                        self.report_step(&submission.step)?;
                    }
                    Err(e) => writeln!(self.out, "[ERROR]: {}", e)?,
                }
            }
            ShellCommand::Continue => {
                let step = self.kernel.advance();
                self.report_step(&step)?;
            }
            ShellCommand::Status => {
                let snapshot = self.kernel.status();
                if self.options.json {
                    writeln!(self.out, "{}", serde_json::to_string_pretty(&snapshot)?)?;
                } else {
                    write!(self.out, "{}", snapshot)?;
                }
            }
            ShellCommand::Offline(id) => match self.kernel.set_offline(id) {
                Ok(()) => writeln!(self.out, "[INFO]: Node ID: {} is now OFFLINE", id)?,
                Err(e) => writeln!(self.out, "[ERROR]: {}", e)?,
            },
            ShellCommand::Online(id) => match self.kernel.set_online(id) {
                Ok(()) => writeln!(self.out, "[INFO]: Node ID: {} is back online", id)?,
                Err(e) => writeln!(self.out, "[ERROR]: {}", e)?,
            },
            ShellCommand::Shutdown => self.shutdown()?,
            ShellCommand::Help => self.help()?,
            ShellCommand::Exit => {
                writeln!(self.out, "[INFO]: DTK program exit in progress..")?;
                return Ok(Flow::Exit);
            }
            ShellCommand::Empty => {}
            ShellCommand::Unknown(command) => writeln!(
                self.out,
                "[ERROR]: Unknown command: {}. enter $ help for more info!",
                command
            )?,
        }
        Ok(Flow::Continue)
    }

    fn report_step(&mut self, step: &StepReport) -> Result<()> {
        for event in &step.events {
            match event {
                SchedulerEvent::TaskDispatched {
                    task_id,
                    node_id,
                    address,
                } => {
                    writeln!(
                        self.out,
                        "[INFO]: Dispatched Task ID: {} to Node ID: {} @ address: {}",
                        task_id, node_id, address
                    )?;
                    self.out.flush()?;
                    if !self.options.pacing.is_zero() {
                        thread::sleep(self.options.pacing);
                    }
                }
                SchedulerEvent::TaskProgressed {
                    task_id,
                    node_id,
                    progress,
                    work_required,
                } => writeln!(
                    self.out,
                    "[INFO]: Node ID: {} is busy with Task ID: {} ({}/{} units).",
                    node_id, task_id, progress, work_required
                )?,
                SchedulerEvent::TaskCompleted {
                    task_id, node_id, ..
                } => writeln!(
                    self.out,
                    "[INFO]: Task ID: {} completed over Node ID: {}",
                    task_id, node_id
                )?,
                SchedulerEvent::NodeIdle { node_id } => writeln!(
                    self.out,
                    "[INFO]: Node ID: {} is IDLE, there are no new tasks",
                    node_id
                )?,
                SchedulerEvent::NodeOffline { node_id } => writeln!(
                    self.out,
                    "[WARNING]: Node ID: {} is offline, checking next node",
                    node_id
                )?,
            }
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        writeln!(self.out, "[INFO]: Initiating DTK shutdown command ...")?;
        let report = self.kernel.shutdown_with_report();
        for id in &report.discarded_queued {
            writeln!(self.out, "[INFO]: Task ID: {} is deleted..", id)?;
        }
        writeln!(self.out, "[INFO]: All tasks have been cleared from the system.")?;
        for id in &report.discarded_in_flight {
            writeln!(self.out, "[INFO]: Task ID: {} in progress, but deleting...", id)?;
        }
        writeln!(
            self.out,
            "[INFO]: {} nodes released. All resources deallocated.",
            report.nodes_released
        )?;
        Ok(())
    }

    fn help(&mut self) -> Result<()> {
        writeln!(self.out, "[INFO]: submit <job-type> <input-data>, submit a job with valid input data")?;
        writeln!(self.out, "[INFO]: continue <no-params>, moves progress of a task by x units")?;
        writeln!(self.out, "[INFO]: status <no-params>, status of current nodes their tasks")?;
        writeln!(self.out, "[INFO]: offline <node-id>, take an idle node out of rotation")?;
        writeln!(self.out, "[INFO]: online <node-id>, return an offline node to rotation")?;
        writeln!(self.out, "[INFO]: shutdown <no-params>, delete all nodes and tasks assigned")?;
        writeln!(self.out, "[INFO]: exit <no-params>, exit DTK program")?;
        Ok(())
    }
}
