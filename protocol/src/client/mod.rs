//! Decisions we send back for a request.
//!
//! Indices are zero-based: move indices refer to the request's move list and
//! switch indices to positions in the request's side roster. The wire format
//! from [`Decision::to_protocol_string`] is one-based, as the host expects.

use serde::{Deserialize, Serialize};

/// Optional power-up attached to a move choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gimmick {
    Mega,
    UltraBurst,
    ZMove,
    Dynamax,
    Terastallize,
}

impl Gimmick {
    pub const ALL: [Gimmick; 5] = [
        Gimmick::Mega,
        Gimmick::UltraBurst,
        Gimmick::ZMove,
        Gimmick::Dynamax,
        Gimmick::Terastallize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gimmick::Mega => "mega",
            Gimmick::UltraBurst => "ultra",
            Gimmick::ZMove => "zmove",
            Gimmick::Dynamax => "dynamax",
            Gimmick::Terastallize => "terastallize",
        }
    }
}

/// What one active slot does this turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveChoice {
    Move {
        index: usize,
        target: Option<i8>,
        gimmick: Option<Gimmick>,
    },
    Switch(usize),
    Shift,
    Pass,
}

impl ActiveChoice {
    pub fn gimmick(&self) -> Option<Gimmick> {
        match self {
            ActiveChoice::Move { gimmick, .. } => *gimmick,
            _ => None,
        }
    }

    pub fn to_protocol_string(&self) -> String {
        match self {
            Self::Move {
                index,
                target,
                gimmick,
            } => {
                let mut choice = format!("move {}", index + 1);
                if let Some(target) = target {
                    choice.push_str(&format!(" {}", target));
                }
                if let Some(gimmick) = gimmick {
                    choice.push(' ');
                    choice.push_str(gimmick.as_str());
                }
                choice
            }
            Self::Switch(position) => format!("switch {}", position + 1),
            Self::Shift => "shift".to_string(),
            Self::Pass => "pass".to_string(),
        }
    }
}

/// What one slot does when a switch is forced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchChoice {
    Switch(usize),
    /// Bring a fainted pokemon back (Revival Blessing)
    Revive(usize),
    Pass,
}

impl SwitchChoice {
    pub fn to_protocol_string(&self) -> String {
        match self {
            // The host encodes revival as a switch to the fainted position
            Self::Switch(position) | Self::Revive(position) => format!("switch {}", position + 1),
            Self::Pass => "pass".to_string(),
        }
    }
}

/// The answer to a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Team order for team preview (request positions, lead first)
    Team(Vec<usize>),
    Active(Vec<ActiveChoice>),
    ForceSwitch(Vec<SwitchChoice>),
    /// Nothing to decide
    Wait,
}

impl Decision {
    /// Serialize to the host's choice syntax; `None` for [`Decision::Wait`]
    pub fn to_protocol_string(&self) -> Option<String> {
        match self {
            Self::Team(order) => Some(format!(
                "team {}",
                order
                    .iter()
                    .map(|i| (i + 1).to_string())
                    .collect::<Vec<_>>()
                    .join("")
            )),
            Self::Active(choices) => Some(
                choices
                    .iter()
                    .map(ActiveChoice::to_protocol_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Self::ForceSwitch(choices) => Some(
                choices
                    .iter()
                    .map(SwitchChoice::to_protocol_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Self::Wait => None,
        }
    }

    /// Power-ups used across all active sub-decisions
    pub fn gimmicks(&self) -> Vec<Gimmick> {
        match self {
            Self::Active(choices) => choices.iter().filter_map(ActiveChoice::gimmick).collect(),
            _ => Vec::new(),
        }
    }
}
