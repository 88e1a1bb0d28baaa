//! Line-based terminal driver for playing the game without a renderer.

use glam::Vec3;

use crate::game::{Input, Meter, Notification, Severity};
use crate::rules::billing::format_rupiah;
use crate::rules::Aabb;

pub const HELP: &str = "\
commands:
  skip                 skip the opening scene
  new | continue       start or resume from the main menu
  cable [miss]         drop the cable on the connector (or next to it)
  tv                   click the television
  toggle <device>      switch a device in the kitchen or lab
  answer <n>           pick option n (1-based) in the quiz
  menu | reset         return to the menu / erase all progress
  status | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum PlayCommand {
    Input(Input),
    Status,
    Help,
    Quit,
}

fn connector_zone() -> Aabb {
    Aabb::from_center_size(Vec3::new(0.0, 1.0, 0.0), Vec3::splat(0.5))
}

pub fn parse_command(line: &str) -> Result<PlayCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("empty command".to_string());
    };
    let arg = words.next();

    let input = match (verb.to_lowercase().as_str(), arg) {
        ("skip", None) => Input::SkipOpening,
        ("new", None) => Input::NewGame,
        ("continue", None) => Input::Continue,
        ("cable", None) => Input::ConnectCable {
            dragged: connector_zone(),
            target: connector_zone(),
        },
        ("cable", Some("miss")) => Input::ConnectCable {
            dragged: Aabb::from_center_size(Vec3::new(3.0, 1.0, 0.0), Vec3::splat(0.5)),
            target: connector_zone(),
        },
        ("tv", None) => Input::ClickTelevision,
        ("toggle", Some(name)) => Input::ToggleDevice {
            name: name.to_string(),
        },
        ("answer", Some(n)) => {
            let n: usize = n
                .parse()
                .map_err(|_| format!("'{}' is not an option number", n))?;
            if n == 0 {
                return Err("options are numbered from 1".to_string());
            }
            Input::Answer { option: n - 1 }
        }
        ("menu", None) => Input::ReturnToMenu,
        ("reset", None) => Input::ResetProgress,
        ("status", None) => return Ok(PlayCommand::Status),
        ("help", None) => return Ok(PlayCommand::Help),
        ("quit" | "exit", None) => return Ok(PlayCommand::Quit),
        _ => return Err(format!("unknown command '{}', try 'help'", line.trim())),
    };
    Ok(PlayCommand::Input(input))
}

/// One printable line per notification.
pub fn describe(note: &Notification) -> String {
    match note {
        Notification::Message { text, severity } => {
            let tag = match severity {
                Severity::Info => "info",
                Severity::Success => " ok ",
                Severity::Error => "fail",
            };
            format!("[{}] {}", tag, text)
        }
        Notification::Blocking { text } => format!("[LOCK] {}", text),
        Notification::Audio { cue } => format!("  ~ sound: {:?}", cue),
        Notification::Meter { meter, value } => match meter {
            Meter::Efficiency => format!("  efficiency {:.1}%", value),
            Meter::PowerUsage => format!("  power usage {:.1}%", value),
            Meter::Bill => format!("  bill Rp {}", format_rupiah(*value)),
            Meter::EnergyKwh => format!("  energy {:.2} kWh/day", value),
        },
        Notification::DeviceToggled { name, on } => {
            format!("  {} {}", name, if *on { "on" } else { "off" })
        }
        Notification::KeyCollected { total } => format!("*** Energy key! ({}/3)", total),
        Notification::StateChanged { from, to } => format!("== {} -> {} ==", from, to),
        Notification::QuizQuestion {
            index,
            total,
            question,
            options,
        } => {
            let mut out = format!("Q{}/{}: {}", index + 1, total, question);
            for (i, option) in options.iter().enumerate() {
                out.push_str(&format!("\n   {}. {}", i + 1, option));
            }
            out
        }
        Notification::QuizFeedback {
            correct,
            explanation,
            ..
        } => match (correct, explanation) {
            (true, Some(text)) => format!("[ ok ] Benar! {}", text),
            (true, None) => "[ ok ] Benar!".to_string(),
            (false, _) => "[fail] Salah, coba lagi.".to_string(),
        },
        Notification::DoorUnlocked => "*** The basement door swings open".to_string(),
    }
}
