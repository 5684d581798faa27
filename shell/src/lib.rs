// Copyright 2023 System76 <info@system76.com>
// SPDX-License-Identifier: MPL-2.0

use std::fmt::Display;
use std::io::ErrorKind;
use std::process::{ExitStatus, Stdio};

use indexmap::IndexMap;
use tokio::process::Command;

mod parse;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    Connected,
    Disconnected,
}

impl Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            State::Connected => "connected",
            State::Disconnected => "disconnected",
        })
    }
}

impl TryFrom<&str> for State {
    type Error = &'static str;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(match value {
            "connected" => State::Connected,
            "disconnected" => State::Disconnected,
            _ => return Err("unknown connection state"),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mode {
    pub size: (u32, u32),
    pub refresh_rates: Vec<f32>,
    pub current: bool,
    pub preferred: bool,
}

impl Mode {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            refresh_rates: Vec::new(),
            current: false,
            preferred: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Output {
    pub name: String,
    pub state: State,
    pub primary: bool,
    pub modes: Vec<Mode>,
}

impl Output {
    #[must_use]
    pub fn new(name: impl Into<String>, state: State) -> Self {
        Self {
            name: name.into(),
            state,
            primary: false,
            modes: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == State::Connected
    }

    /// The mode an enabled output is switched to. xrandr lists the preferred
    /// mode of a connected output first.
    #[must_use]
    pub fn first_mode(&self) -> Option<&Mode> {
        self.modes.first()
    }
}

/// Outputs reported by xrandr, keyed by port name in listing order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct List {
    pub outputs: IndexMap<String, Output>,
}

impl List {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Output> {
        self.outputs.get(name)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Output> {
        self.outputs.values()
    }

    /// Adds an output, replacing any earlier output with the same name.
    pub fn insert(&mut self, output: Output) {
        self.outputs.insert(output.name.clone(), output);
    }
}

/// An output together with the state it should be put into.
#[derive(Clone, Copy, Debug)]
pub struct Screen<'a> {
    pub output: &'a Output,
    pub enabled: bool,
}

impl<'a> Screen<'a> {
    #[must_use]
    pub const fn on(output: &'a Output) -> Self {
        Self {
            output,
            enabled: true,
        }
    }

    #[must_use]
    pub const fn off(output: &'a Output) -> Self {
        Self {
            output,
            enabled: false,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(
        "`{program}` was not found in `{path}`, please install it \
         (Ubuntu ships it in the x11-xserver-utils package)"
    )]
    NotFound { program: String, path: String },
    #[error("could not exec `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` failed with {status}: {stderr}")]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("`xrandr` output not UTF-8")]
    Utf(#[from] std::string::FromUtf8Error),
    #[error("line {line}: expected at least 2 segments, got {text:?}")]
    ShortLine { line: usize, text: String },
    #[error("line {line}: mode listed before any output")]
    ModeWithoutOutput { line: usize },
    #[error("output `{0}` has no modes to enable")]
    NoModes(String),
    #[error("output `{0}` would be placed beyond the largest x position")]
    PositionOverflow(String),
}

/// Builds the xrandr arguments which arrange `screens` left to right.
///
/// Enabled screens use their first listed mode and are placed on the top
/// edge, each one directly right of the previously enabled screen.
///
/// # Errors
///
/// Returns [`Error::NoModes`] if an enabled screen has no modes, or
/// [`Error::PositionOverflow`] if the widths add up past `u32::MAX`.
pub fn arguments(screens: &[Screen<'_>]) -> Result<Vec<String>, Error> {
    let mut x_pos = 0u32;
    let mut args = Vec::with_capacity(screens.len() * 6);

    for screen in screens {
        args.push("--output".to_owned());
        args.push(screen.output.name.clone());

        if !screen.enabled {
            args.push("--off".to_owned());
            continue;
        }

        let Some(mode) = screen.output.first_mode() else {
            return Err(Error::NoModes(screen.output.name.clone()));
        };

        let (width, height) = mode.size;
        args.push("--mode".to_owned());
        args.push(format!("{width}x{height}"));
        args.push("--pos".to_owned());
        args.push(format!("{x_pos}x0"));
        x_pos = x_pos
            .checked_add(width)
            .ok_or_else(|| Error::PositionOverflow(screen.output.name.clone()))?;
    }

    Ok(args)
}

/// How the `xrandr` program is located and run.
#[derive(Clone, Debug)]
pub struct Randr {
    pub program: String,
    /// X display the children connect to.
    pub display: String,
    /// `PATH` used to locate the program.
    pub search_path: String,
}

impl Default for Randr {
    fn default() -> Self {
        Self {
            program: String::from("xrandr"),
            display: String::from(":0"),
            search_path: String::from("/usr/bin"),
        }
    }
}

impl Randr {
    /// Queries the connected outputs and their modes.
    ///
    /// # Errors
    ///
    /// Returns error if xrandr could not be run or its listing is malformed.
    pub async fn list(&self) -> Result<List, Error> {
        let stdout = self.run(&[]).await?;
        String::from_utf8(stdout)?.parse()
    }

    /// Arranges `screens`, or only logs the command when `dry_run` is set.
    /// Returns the arguments xrandr was, or would have been, run with.
    ///
    /// # Errors
    ///
    /// Returns error if the arguments could not be built or xrandr failed.
    pub async fn apply(&self, screens: &[Screen<'_>], dry_run: bool) -> Result<Vec<String>, Error> {
        let args = arguments(screens)?;

        if dry_run {
            tracing::info!(?args, "would have executed");
            return Ok(args);
        }

        tracing::info!(?args, "executing");
        self.run(&args).await?;
        Ok(args)
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .env_clear()
            .env("DISPLAY", &self.display)
            .env("PATH", &self.search_path)
            .stdin(Stdio::null());
        command
    }

    async fn run(&self, args: &[String]) -> Result<Vec<u8>, Error> {
        let output = self
            .command()
            .args(args)
            .output()
            .await
            .map_err(|why| match why.kind() {
                ErrorKind::NotFound => Error::NotFound {
                    program: self.program.clone(),
                    path: self.search_path.clone(),
                },
                _ => Error::Spawn {
                    program: self.program.clone(),
                    source: why,
                },
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            tracing::error!("output of `{}`: {stderr}", self.program);
            return Err(Error::Exit {
                program: self.program.clone(),
                status: output.status,
                stderr,
            });
        }

        Ok(output.stdout)
    }
}
