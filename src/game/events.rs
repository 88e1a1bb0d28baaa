use serde::{Deserialize, Serialize};

use crate::progress::GameState;
use crate::rules::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    Success,
    Hit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Meter {
    Efficiency,
    PowerUsage,
    Bill,
    EnergyKwh,
}

/// Everything the core tells the presentation layer. Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    Message {
        text: String,
        severity: Severity,
    },
    /// Modal message the player has to acknowledge; gameplay is blocked.
    Blocking {
        text: String,
    },
    Audio {
        cue: AudioCue,
    },
    Meter {
        meter: Meter,
        value: f64,
    },
    /// A kitchen or lab appliance was switched; drives its on/off visuals.
    DeviceToggled {
        name: String,
        on: bool,
    },
    KeyCollected {
        total: u8,
    },
    StateChanged {
        from: GameState,
        to: GameState,
    },
    QuizQuestion {
        index: usize,
        total: usize,
        question: String,
        options: Vec<String>,
    },
    QuizFeedback {
        index: usize,
        correct: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        explanation: Option<String>,
    },
    DoorUnlocked,
}

impl Notification {
    pub fn message(text: impl Into<String>, severity: Severity) -> Self {
        Notification::Message {
            text: text.into(),
            severity,
        }
    }
}

/// Discrete player actions reported by the renderer or a text front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Input {
    SkipOpening,
    NewGame,
    Continue,
    /// The cable end was dropped; boxes are the dragged end and the connection point.
    ConnectCable {
        dragged: Aabb,
        target: Aabb,
    },
    ClickTelevision,
    ToggleDevice {
        name: String,
    },
    Answer {
        option: usize,
    },
    ReturnToMenu,
    ResetProgress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_json_is_tagged() {
        let json = serde_json::to_value(Notification::KeyCollected { total: 2 }).unwrap();
        assert_eq!(json["type"], "key_collected");
        assert_eq!(json["total"], 2);

        let json = serde_json::to_value(Notification::message("hi", Severity::Success)).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["severity"], "success");

        let json = serde_json::to_value(Notification::DoorUnlocked).unwrap();
        assert_eq!(json["type"], "door_unlocked");

        let json = serde_json::to_value(Notification::DeviceToggled {
            name: "ac".into(),
            on: true,
        })
        .unwrap();
        assert_eq!(json["type"], "device_toggled");
        assert_eq!(json["name"], "ac");
        assert_eq!(json["on"], true);
    }

    #[test]
    fn state_change_uses_stored_state_names() {
        let json = serde_json::to_value(Notification::StateChanged {
            from: GameState::MainMenu,
            to: GameState::Level1,
        })
        .unwrap();
        assert_eq!(json["from"], "menu");
        assert_eq!(json["to"], "level1");
    }

    #[test]
    fn feedback_omits_missing_explanation() {
        let json = serde_json::to_value(Notification::QuizFeedback {
            index: 0,
            correct: false,
            explanation: None,
        })
        .unwrap();
        assert!(json.get("explanation").is_none());
    }

    #[test]
    fn input_parses_from_client_json() {
        let input: Input =
            serde_json::from_str(r#"{"type":"toggle_device","name":"iron"}"#).unwrap();
        assert_eq!(input, Input::ToggleDevice { name: "iron".into() });

        let input: Input = serde_json::from_str(r#"{"type":"answer","option":2}"#).unwrap();
        assert_eq!(input, Input::Answer { option: 2 });

        let input: Input = serde_json::from_str(r#"{"type":"new_game"}"#).unwrap();
        assert_eq!(input, Input::NewGame);
    }

    #[test]
    fn connect_cable_parses_boxes() {
        let input: Input = serde_json::from_str(
            r#"{"type":"connect_cable",
                "dragged":{"min":[0,0,0],"max":[1,1,1]},
                "target":{"min":[0.5,0,0],"max":[2,1,1]}}"#,
        )
        .unwrap();
        let Input::ConnectCable { dragged, target } = input else {
            panic!("expected connect_cable");
        };
        assert_eq!(dragged.max.x, 1.0);
        assert_eq!(target.min.x, 0.5);
    }

    #[test]
    fn unknown_input_is_rejected() {
        assert!(serde_json::from_str::<Input>(r#"{"type":"fly"}"#).is_err());
    }
}
