// Copyright 2023 System76 <info@system76.com>
// SPDX-License-Identifier: MPL-2.0

use std::fmt::Write;

use nu_ansi_term::{Color, Style};
use randr_dock_shell::{List, Mode};

fn rates(mode: &Mode) -> String {
    let mut rates = String::new();

    for rate in &mode.refresh_rates {
        let _res = write!(&mut rates, " {rate:>6.2}");
    }

    rates
}

/// Renders the outputs as colored, human-readable text.
#[must_use]
pub fn human(list: &List) -> String {
    let mut output = String::new();
    let mut resolution = String::new();

    for head in list.outputs() {
        #[allow(clippy::ignored_unit_patterns)]
        let _res = fomat_macros::witeln!(
            &mut output,
            (Style::new().bold().paint(&head.name)) " "
            if head.is_connected() {
                (Color::Green.bold().paint("(connected)"))
            } else {
                (Color::Red.bold().paint("(disconnected)"))
            }
            if head.primary {
                " " (Color::Blue.bold().paint("(primary)"))
            }
        );

        if head.modes.is_empty() {
            continue;
        }

        let _res = writeln!(&mut output, "{}", Color::Yellow.bold().paint("  Modes:"));

        for mode in &head.modes {
            resolution.clear();
            let _res = write!(&mut resolution, "{}x{}", mode.size.0, mode.size.1);

            let _res = writeln!(
                &mut output,
                "    {} @{}{}{}",
                Color::Magenta.paint(format!("{resolution:>9}")),
                Color::Cyan.paint(rates(mode)),
                if mode.current {
                    Color::Purple.bold().paint(" (current)")
                } else {
                    Color::default().paint("")
                },
                if mode.preferred {
                    Color::Green.bold().paint(" (preferred)")
                } else {
                    Color::default().paint("")
                }
            );
        }
    }

    output
}

/// Renders the outputs as a KDL document.
#[must_use]
pub fn kdl(list: &List) -> String {
    let mut output = String::new();

    for head in list.outputs() {
        #[allow(clippy::ignored_unit_patterns)]
        let _res = fomat_macros::witeln!(
            &mut output,
            "output \"" (head.name) "\" connected="
            if head.is_connected() { "#true" } else { "#false" }
            if head.primary { " primary=#true" }
            " {\n"
            "  modes {"
        );

        for mode in &head.modes {
            let _res = writeln!(
                &mut output,
                "    mode {} {}{}{}{}",
                mode.size.0,
                mode.size.1,
                mode.refresh_rates
                    .iter()
                    .fold(String::new(), |mut rates, rate| {
                        let _res = write!(&mut rates, " {rate}");
                        rates
                    }),
                if mode.current { " current=#true" } else { "" },
                if mode.preferred { " preferred=#true" } else { "" },
            );
        }

        let _res = writeln!(&mut output, "  }}\n}}");
    }

    output
}
