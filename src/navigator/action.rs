//! Transition actions.
//!
//! Actions are data, not closures: each variant names one kind of input
//! sequence, so catalogs can be loaded from JSON and tests can substitute
//! providers without touching the graph.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::ActionError;
use crate::input::{InputDriver, Key};
use crate::perception::{Perception, Region};

/// Something to do to move the client from one screen to another.
///
/// Serialized with a `kind` tag, e.g.
/// `{"kind": "press_key", "key": "escape", "hold_ms": 1000}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// OCR `region`, click the first token containing `text`, then wait.
    ClickText {
        text: String,
        region: Region,
        #[serde(default)]
        settle_ms: u64,
    },
    /// Hold a key for `hold_ms`.
    PressKey { key: Key, hold_ms: u64 },
    /// Tap a key `presses` times with `delay_ms` between taps.
    MultiPress { key: Key, presses: u32, delay_ms: u64 },
    /// Wait for the client to move on by itself.
    Wait { ms: u64 },
    /// Run steps in order, stopping at the first failure.
    Sequence { steps: Vec<Action> },
}

/// Providers an action may use.
pub struct ActionContext<'a> {
    pub perception: &'a mut Perception,
    pub input: &'a mut dyn InputDriver,
}

impl Action {
    pub fn press(key: Key, hold_ms: u64) -> Self {
        Action::PressKey { key, hold_ms }
    }

    pub fn click_text(text: impl Into<String>, region: Region, settle_ms: u64) -> Self {
        Action::ClickText {
            text: text.into(),
            region,
            settle_ms,
        }
    }

    /// Performs the action. Blocks for any settle time it carries.
    pub fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        match self {
            Action::ClickText {
                text,
                region,
                settle_ms,
            } => {
                let Some((x, y)) = ctx.perception.locate_on_screen(text, region)? else {
                    return Err(ActionError::TextNotFound { text: text.clone() });
                };
                ctx.input.move_and_click(x, y).map_err(input_error)?;
                settle(ctx, *settle_ms);
                Ok(())
            }
            Action::PressKey { key, hold_ms } => ctx
                .input
                .press_key(*key, Duration::from_millis(*hold_ms))
                .map_err(input_error),
            Action::MultiPress {
                key,
                presses,
                delay_ms,
            } => ctx
                .input
                .press_key_n_times(*key, *presses, Duration::from_millis(*delay_ms))
                .map_err(input_error),
            Action::Wait { ms } => {
                settle(ctx, *ms);
                Ok(())
            }
            Action::Sequence { steps } => steps.iter().try_for_each(|step| step.execute(ctx)),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::ClickText { text, .. } => write!(f, "click '{}'", text),
            Action::PressKey { key, hold_ms } => write!(f, "press {} for {}ms", key, hold_ms),
            Action::MultiPress { key, presses, .. } => write!(f, "press {} x{}", key, presses),
            Action::Wait { ms } => write!(f, "wait {}ms", ms),
            Action::Sequence { steps } => {
                let parts: Vec<String> = steps.iter().map(|s| s.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

fn settle(ctx: &mut ActionContext<'_>, ms: u64) {
    if ms > 0 {
        ctx.input.pause(Duration::from_millis(ms));
    }
}

fn input_error(e: anyhow::Error) -> ActionError {
    ActionError::Input(format!("{:#}", e))
}
