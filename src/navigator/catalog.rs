//! Screen catalogs: the screens, their transitions and the detection rules,
//! as one serde document.
//!
//! ```json
//! {
//!   "screens": [
//!     {"name": "Menu", "transitions": [
//!       {"trigger": "enter_game", "target": "In Game",
//!        "action": {"kind": "press_key", "key": "escape", "hold_ms": 1000}}
//!     ]}
//!   ],
//!   "detection": [
//!     {"screen": "Menu", "region": {"fraction": [0.0, 0.0, 0.3, 0.25]}, "text": "MENU"}
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::action::Action;
use super::error::ConfigError;
use super::graph::ScreenGraph;
use crate::input::Key;
use crate::perception::{DetectionRule, DetectionRules, Region};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub trigger: String,
    pub target: String,
    pub action: Action,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenEntry {
    pub name: String,
    #[serde(default)]
    pub transitions: Vec<TransitionEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionEntry {
    pub screen: String,
    pub region: Region,
    pub text: String,
}

/// Screens in catalog order, each with ordered transitions, plus detection
/// rules in the order they are tried.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub screens: Vec<ScreenEntry>,
    #[serde(default)]
    pub detection: Vec<DetectionEntry>,
}

impl Catalog {
    /// Reads a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let load_error = |reason: String| ConfigError::CatalogLoad {
            path: path.display().to_string(),
            reason,
        };
        let content = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| load_error(e.to_string()))
    }

    /// Validates the catalog and splits it into the graph and detection rules.
    pub fn build(&self) -> Result<(ScreenGraph, DetectionRules), ConfigError> {
        if self.screens.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let mut builder = ScreenGraph::builder();
        for screen in &self.screens {
            builder = builder.screen(screen.name.as_str());
        }
        for screen in &self.screens {
            for t in &screen.transitions {
                validate_action(&t.action, &format!("transition '{}'", t.trigger))?;
                builder = builder.transition(
                    screen.name.as_str(),
                    t.trigger.as_str(),
                    t.target.as_str(),
                    t.action.clone(),
                );
            }
        }
        let graph = builder.build()?;

        let mut rules = DetectionRules::new();
        for entry in &self.detection {
            let owner = format!("detection rule for '{}'", entry.screen);
            if graph.lookup(&entry.screen).is_none() {
                return Err(ConfigError::UnknownScreen {
                    referenced_by: owner,
                    name: entry.screen.clone(),
                });
            }
            entry
                .region
                .validate()
                .map_err(|reason| ConfigError::InvalidRegion { owner, reason })?;
            rules.insert(
                entry.screen.as_str(),
                DetectionRule::new(entry.region, entry.text.as_str()),
            );
        }

        Ok((graph, rules))
    }
}

fn validate_action(action: &Action, owner: &str) -> Result<(), ConfigError> {
    match action {
        Action::ClickText { region, .. } => {
            region.validate().map_err(|reason| ConfigError::InvalidRegion {
                owner: owner.to_string(),
                reason,
            })
        }
        Action::Sequence { steps } => steps.iter().try_for_each(|s| validate_action(s, owner)),
        _ => Ok(()),
    }
}

/// Loads the catalog at `path`, or the built-in one when no path is given.
pub fn load_or_default(path: Option<&Path>, bot_name: &str) -> Result<Catalog, ConfigError> {
    match path {
        Some(path) => {
            crate::log(&format!("Loading screen catalog from {}", path.display()));
            Catalog::load(path)
        }
        None => Ok(default_catalog(bot_name)),
    }
}

fn frac(x0: f32, y0: f32, x1: f32, y1: f32) -> Region {
    Region::Fraction([x0, y0, x1, y1])
}

fn escape() -> Action {
    Action::press(Key::Escape, 1000)
}

fn screen(name: &str, transitions: Vec<(&str, &str, Action)>) -> ScreenEntry {
    ScreenEntry {
        name: name.to_string(),
        transitions: transitions
            .into_iter()
            .map(|(trigger, target, action)| TransitionEntry {
                trigger: trigger.to_string(),
                target: target.to_string(),
                action,
            })
            .collect(),
    }
}

fn detect(screen: &str, region: Region, text: &str) -> DetectionEntry {
    DetectionEntry {
        screen: screen.to_string(),
        region,
        text: text.to_string(),
    }
}

/// The Battlefield V menu flow: main menu through server browser into a
/// game, plus the in-game menu and scoreboard.
///
/// `bot_name` is the player name shown in the in-game HUD.
pub fn default_catalog(bot_name: &str) -> Catalog {
    let main_menu_play = frac(0.052, 0.55, 0.1041, 0.8537);
    let top_left = frac(0.0, 0.0, 0.3, 0.25);
    let bottom_right = frac(0.8, 0.8, 2.0, 2.0);

    let screens = vec![
        screen("Main Menu", vec![(
            "enter_play",
            "Play",
            Action::click_text("PLAY", main_menu_play, 0),
        )]),
        screen("Play", vec![(
            "enter_multiplayer",
            "Multiplayer",
            Action::click_text("MULTIPLAYER", frac(0.39114, 0.175, 0.692, 0.873), 2000),
        )]),
        screen("Scoreboard", vec![
            ("exit_to_main_menu", "Main Menu", escape()),
            ("exit_to_menu", "Menu", escape()),
        ]),
        screen("In Game", vec![
            ("enter_main_menu", "Main Menu", escape()),
            ("enter_menu", "Menu", escape()),
        ]),
        screen("Menu", vec![
            (
                "enter_scoreboard",
                "Scoreboard",
                Action::click_text("SCOREBOARD", frac(0.0, 0.0, 0.15625, 0.786), 2000),
            ),
            ("enter_game", "In Game", escape()),
        ]),
        screen("Multiplayer", vec![(
            "advanced_search",
            "Advanced Search",
            Action::click_text("ADVANCED", frac(0.7625, 0.1796, 0.97, 0.622), 2000),
        )]),
        screen("Advanced Search", vec![(
            "enter_created",
            "Created",
            Action::click_text("CREATED", top_left, 0),
        )]),
        screen("Created", vec![(
            "game_info",
            "Game Info",
            Action::click_text("Borderless", frac(0.0364, 0.062, 0.365, 0.266), 2000),
        )]),
        screen("Game Info", vec![(
            "enter_game",
            "In Game",
            Action::click_text("JOIN", frac(0.0, 0.0, 0.25, 0.5), 30_000),
        )]),
        screen("Deploy", vec![(
            "enter_game",
            "In Game",
            Action::click_text("DEPLOY", bottom_right, 6000),
        )]),
        screen("Round Starting", vec![(
            "enter_deploy",
            "Deploy",
            Action::Wait { ms: 60_000 },
        )]),
    ];

    // Tried in this order; "Main Menu" and "Play" both look for PLAY, so the
    // narrower main-menu region goes first.
    let detection = vec![
        detect("Main Menu", main_menu_play, "PLAY"),
        detect("Play", frac(0.0, 0.0, 0.2, 0.2), "PLAY"),
        detect("Menu", top_left, "MENU"),
        detect("Scoreboard", top_left, "SCOREBOARD"),
        detect("Multiplayer", frac(0.0, 0.0, 0.2, 0.2), "MULTIPLAYER"),
        detect("Advanced Search", top_left, "ADVANCED"),
        detect("Created", top_left, "CREATED"),
        detect("In Game", frac(0.0, 0.7, 0.271, 1.0), bot_name),
        detect("Game Info", top_left, "GAME"),
        detect("Deploy", bottom_right, "DEPLOY"),
        detect("Round Starting", bottom_right, "ROUND"),
    ];

    Catalog { screens, detection }
}
