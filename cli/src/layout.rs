// Copyright 2023 System76 <info@system76.com>
// SPDX-License-Identifier: MPL-2.0

use std::fmt::Display;

use randr_dock_shell::{List, Output, Screen};

/// Built-in panel of the laptop.
pub const LAPTOP: &str = "eDP-1-1";
/// VGA or DisplayPort connector on the laptop.
pub const VGA_OR_DP: &str = "DP-1-1";
/// HDMI connector on the laptop.
pub const HDMI_DIRECT: &str = "HDMI-1-1";
/// HDMI connector on the docking station.
pub const HDMI_DOCK: &str = "DP-1-2-1";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scenario {
    DualHdmi,
    SingleHdmi,
    SingleVgaOrDp,
    LaptopOnly,
}

impl Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Scenario::DualHdmi => "work situation with 2 HDMI screens and laptop turned off",
            Scenario::SingleHdmi => "single HDMI detected",
            Scenario::SingleVgaOrDp => "single VGA or DisplayPort detected",
            Scenario::LaptopOnly => "undefined state, proceeding with the laptop only",
        })
    }
}

#[derive(Debug)]
pub struct Plan<'a> {
    pub scenario: Scenario,
    /// Screens to arrange, left to right.
    pub screens: Vec<Screen<'a>>,
    /// Applied when arranging `screens` fails. Empty when there is nothing to retry.
    pub fallback: Vec<Screen<'a>>,
}

fn connected<'a>(list: &'a List, name: &str) -> Option<&'a Output> {
    list.get(name).filter(|output| output.is_connected())
}

/// Picks the arrangement for the outputs in `list`.
///
/// Ports missing from the listing are left out of every screen list.
#[must_use]
pub fn plan(list: &List) -> Plan<'_> {
    let laptop = list.get(LAPTOP);
    let laptop_only = || laptop.map(Screen::on).into_iter().collect::<Vec<_>>();

    let hdmi_direct = connected(list, HDMI_DIRECT);

    if let (Some(direct), Some(dock)) = (hdmi_direct, connected(list, HDMI_DOCK)) {
        let mut screens = vec![Screen::on(direct), Screen::on(dock)];
        screens.extend(laptop.map(Screen::off));

        return Plan {
            scenario: Scenario::DualHdmi,
            screens,
            fallback: laptop_only(),
        };
    }

    if let Some(direct) = hdmi_direct {
        let mut screens = vec![Screen::on(direct)];
        screens.extend(laptop.map(Screen::on));

        return Plan {
            scenario: Scenario::SingleHdmi,
            screens,
            fallback: laptop_only(),
        };
    }

    if let Some(vga_or_dp) = connected(list, VGA_OR_DP) {
        let mut screens = vec![Screen::on(vga_or_dp)];
        screens.extend(laptop.map(Screen::on));

        return Plan {
            scenario: Scenario::SingleVgaOrDp,
            screens,
            fallback: laptop_only(),
        };
    }

    let mut screens = laptop_only();
    screens.extend(
        [VGA_OR_DP, HDMI_DIRECT, HDMI_DOCK]
            .into_iter()
            .filter_map(|name| list.get(name))
            .map(Screen::off),
    );

    Plan {
        scenario: Scenario::LaptopOnly,
        screens,
        fallback: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(plan: &[Screen<'_>]) -> Vec<(String, bool)> {
        plan.iter()
            .map(|screen| (screen.output.name.clone(), screen.enabled))
            .collect()
    }

    fn names(entries: &[(&str, bool)]) -> Vec<(String, bool)> {
        entries
            .iter()
            .map(|&(name, enabled)| (name.to_owned(), enabled))
            .collect()
    }

    fn listing(connected_ports: &[&str], disconnected_ports: &[&str]) -> List {
        let mut text =
            String::from("Screen 0: minimum 8 x 8, current 1920 x 1080, maximum 32767 x 32767\n");

        for port in connected_ports {
            text.push_str(port);
            text.push_str(" connected 1920x1080+0+0 (normal left inverted right x axis y axis) 527mm x 296mm\n");
            text.push_str("   1920x1080     60.00*+  59.94\n");
            text.push_str("   1280x720      60.00\n");
        }

        for port in disconnected_ports {
            text.push_str(port);
            text.push_str(" disconnected (normal left inverted right x axis y axis)\n");
        }

        text.parse().unwrap()
    }

    #[test]
    fn both_hdmi_connected_turns_laptop_off() {
        let list = listing(&[LAPTOP, HDMI_DIRECT, HDMI_DOCK], &[VGA_OR_DP]);
        let plan = plan(&list);

        assert_eq!(plan.scenario, Scenario::DualHdmi);
        assert_eq!(
            layout(&plan.screens),
            names(&[(HDMI_DIRECT, true), (HDMI_DOCK, true), (LAPTOP, false)])
        );
        assert_eq!(layout(&plan.fallback), names(&[(LAPTOP, true)]));
    }

    #[test]
    fn single_hdmi_extends_laptop() {
        let list = listing(&[LAPTOP, HDMI_DIRECT, VGA_OR_DP], &[HDMI_DOCK]);
        let plan = plan(&list);

        assert_eq!(plan.scenario, Scenario::SingleHdmi);
        assert_eq!(
            layout(&plan.screens),
            names(&[(HDMI_DIRECT, true), (LAPTOP, true)])
        );
        assert_eq!(layout(&plan.fallback), names(&[(LAPTOP, true)]));
    }

    #[test]
    fn dock_hdmi_alone_is_not_a_docking_setup() {
        let list = listing(&[LAPTOP, HDMI_DOCK], &[HDMI_DIRECT, VGA_OR_DP]);
        let plan = plan(&list);

        assert_eq!(plan.scenario, Scenario::LaptopOnly);
        assert_eq!(
            layout(&plan.screens),
            names(&[
                (LAPTOP, true),
                (VGA_OR_DP, false),
                (HDMI_DIRECT, false),
                (HDMI_DOCK, false),
            ])
        );
        assert!(plan.fallback.is_empty());
    }

    #[test]
    fn vga_or_dp_extends_laptop() {
        let list = listing(&[LAPTOP, VGA_OR_DP], &[HDMI_DIRECT]);
        let plan = plan(&list);

        assert_eq!(plan.scenario, Scenario::SingleVgaOrDp);
        assert_eq!(
            layout(&plan.screens),
            names(&[(VGA_OR_DP, true), (LAPTOP, true)])
        );
    }

    #[test]
    fn laptop_only_skips_absent_ports() {
        let list = listing(&[LAPTOP], &[HDMI_DIRECT]);
        let plan = plan(&list);

        assert_eq!(plan.scenario, Scenario::LaptopOnly);
        assert_eq!(
            layout(&plan.screens),
            names(&[(LAPTOP, true), (HDMI_DIRECT, false)])
        );
    }

    #[test]
    fn missing_laptop_port_leaves_no_fallback() {
        let list = listing(&[HDMI_DIRECT, HDMI_DOCK], &[]);
        let plan = plan(&list);

        assert_eq!(plan.scenario, Scenario::DualHdmi);
        assert_eq!(
            layout(&plan.screens),
            names(&[(HDMI_DIRECT, true), (HDMI_DOCK, true)])
        );
        assert!(plan.fallback.is_empty());
    }

    #[test]
    fn dual_hdmi_arguments() {
        let list = listing(&[LAPTOP, HDMI_DIRECT, HDMI_DOCK], &[]);
        let args = randr_dock_shell::arguments(&plan(&list).screens).unwrap();

        assert_eq!(
            args.join(" "),
            "--output HDMI-1-1 --mode 1920x1080 --pos 0x0 \
             --output DP-1-2-1 --mode 1920x1080 --pos 1920x0 \
             --output eDP-1-1 --off"
        );
    }
}
