// Copyright 2023 System76 <info@system76.com>
// SPDX-License-Identifier: MPL-2.0

use std::str::FromStr;

use crate::{Error, List, Mode, Output, State};

impl FromStr for List {
    type Err = Error;

    /// Parses the plain listing printed by `xrandr` without arguments.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut list = List::default();
        // Name of the output whose modes are being listed.
        let mut current: Option<String> = None;

        for (number, line) in text.lines().enumerate() {
            let number = number + 1;

            if line.trim().is_empty() {
                continue;
            }

            tracing::debug!("line: {:?}", line.trim());

            let segments = line.split(' ').collect::<Vec<_>>();

            let [first, second, ..] = segments.as_slice() else {
                return Err(Error::ShortLine {
                    line: number,
                    text: line.to_owned(),
                });
            };

            if let Ok(state) = State::try_from(*second) {
                let mut output = Output::new(*first, state);
                output.primary = segments.get(2) == Some(&"primary");
                current = Some(output.name.clone());
                list.insert(output);
                continue;
            }

            if let ["", "", "", resolution, rates @ ..] = segments.as_slice() {
                let Some(output) = current.as_ref().and_then(|name| list.outputs.get_mut(name))
                else {
                    return Err(Error::ModeWithoutOutput { line: number });
                };

                match parse_mode(resolution, rates) {
                    Some(mode) => output.modes.push(mode),
                    None => tracing::debug!("ignoring resolution with malformed size: {line:?}"),
                }

                continue;
            }

            tracing::debug!("line ignored: {:?}", line.trim());
        }

        Ok(list)
    }
}

fn parse_mode(resolution: &str, rates: &[&str]) -> Option<Mode> {
    let (width, height) = resolution.split_once('x')?;
    let mut mode = Mode::new(width.parse().ok()?, height.parse().ok()?);

    for rate in rates.iter().filter(|rate| !rate.is_empty()) {
        mode.current |= rate.contains('*');
        mode.preferred |= rate.contains('+');

        if let Ok(hz) = rate.trim_end_matches(['*', '+']).parse::<f32>() {
            mode.refresh_rates.push(hz);
        }
    }

    Some(mode)
}
