//! Scripted stand-ins for the capture, OCR, input and focus providers.
//!
//! A `FakeWorld` holds the screen the "client" is showing. The recognizer
//! reports that screen's name as a single token, and key presses/clicks move
//! the world along routes registered per screen.

use anyhow::{anyhow, Result};
use image::RgbaImage;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crate::input::{InputDriver, Key, WindowFocus};
use crate::ocr::{BoundingBox, OcrWord};
use crate::perception::{
    DetectionRule, DetectionRules, Frame, FrameSource, Perception, PerceptionError, Region,
    TextRecognizer,
};

const FRAME_ORIGIN: (i32, i32) = (100, 50);
const TOKEN_BOX: BoundingBox = BoundingBox {
    left: 10,
    top: 20,
    width: 40,
    height: 10,
};

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Click(i32, i32),
    Key(Key, Duration),
    Pause(Duration),
}

#[derive(Default)]
struct WorldState {
    showing: Option<String>,
    /// Screens shown on successive captures, ahead of `showing`.
    script: VecDeque<Option<String>>,
    key_routes: HashMap<(String, Key), String>,
    click_routes: HashMap<String, String>,
    events: Vec<InputEvent>,
    captures: usize,
    failing_captures: u32,
    inputs_before_failure: Option<usize>,
    inputs: usize,
    active: bool,
    focus_pulls: usize,
}

#[derive(Clone, Default)]
pub struct FakeWorld(Rc<RefCell<WorldState>>);

impl FakeWorld {
    pub fn showing(screen: &str) -> Self {
        let world = Self::default();
        world.0.borrow_mut().showing = Some(screen.to_string());
        world.0.borrow_mut().active = true;
        world
    }

    /// A client showing nothing recognizable.
    pub fn blank() -> Self {
        let world = Self::default();
        world.0.borrow_mut().active = true;
        world
    }

    pub fn show(&self, screen: &str) {
        self.0.borrow_mut().showing = Some(screen.to_string());
    }

    /// Queues what the next captures see, one entry per capture.
    pub fn script(&self, screens: &[Option<&str>]) {
        self.0
            .borrow_mut()
            .script
            .extend(screens.iter().map(|s| s.map(str::to_string)));
    }

    pub fn route(&self, from: &str, key: Key, to: &str) {
        self.0
            .borrow_mut()
            .key_routes
            .insert((from.to_string(), key), to.to_string());
    }

    pub fn click_route(&self, from: &str, to: &str) {
        self.0
            .borrow_mut()
            .click_routes
            .insert(from.to_string(), to.to_string());
    }

    pub fn fail_captures(&self, count: u32) {
        self.0.borrow_mut().failing_captures = count;
    }

    /// Lets `count` input calls succeed, then fails every later one.
    pub fn fail_input_after(&self, count: usize) {
        self.0.borrow_mut().inputs_before_failure = Some(count);
    }

    pub fn set_active(&self, active: bool) {
        self.0.borrow_mut().active = active;
    }

    /// Recorded input, pauses included.
    pub fn events(&self) -> Vec<InputEvent> {
        self.0.borrow().events.clone()
    }

    pub fn key_presses(&self) -> Vec<Key> {
        self.0
            .borrow()
            .events
            .iter()
            .filter_map(|e| match e {
                InputEvent::Key(key, _) => Some(*key),
                _ => None,
            })
            .collect()
    }

    pub fn captures(&self) -> usize {
        self.0.borrow().captures
    }

    pub fn focus_pulls(&self) -> usize {
        self.0.borrow().focus_pulls
    }

    /// Screen coordinates a full-frame click on the shown token lands on.
    pub fn token_centre(&self) -> (i32, i32) {
        let (cx, cy) = TOKEN_BOX.center();
        (FRAME_ORIGIN.0 + cx, FRAME_ORIGIN.1 + cy)
    }

    pub fn perception(&self) -> Perception {
        Perception::new(
            Box::new(FakeSource(self.clone())),
            Box::new(FakeRecognizer(self.clone())),
        )
    }

    pub fn input(&self) -> FakeInput {
        FakeInput(self.clone())
    }

    pub fn focus(&self) -> FakeFocus {
        FakeFocus(self.clone())
    }
}

/// One full-frame rule per screen, expecting the screen's own name.
pub fn rules_for(screens: &[&str]) -> DetectionRules {
    let mut rules = DetectionRules::new();
    for screen in screens {
        rules.insert(*screen, DetectionRule::new(Region::FULL, *screen));
    }
    rules
}

pub struct FakeSource(FakeWorld);

impl FrameSource for FakeSource {
    fn capture_frame(&mut self) -> Result<Frame, PerceptionError> {
        let mut state = self.0 .0.borrow_mut();
        if state.failing_captures > 0 {
            state.failing_captures -= 1;
            return Err(PerceptionError::WindowNotFound("fake".to_string()));
        }
        if let Some(next) = state.script.pop_front() {
            state.showing = next;
        }
        state.captures += 1;
        Ok(Frame::with_origin(RgbaImage::new(200, 100), FRAME_ORIGIN))
    }
}

pub struct FakeRecognizer(FakeWorld);

impl TextRecognizer for FakeRecognizer {
    fn recognize(&self, _region: &RgbaImage) -> Result<Vec<OcrWord>, PerceptionError> {
        let state = self.0 .0.borrow();
        Ok(state
            .showing
            .iter()
            .map(|text| OcrWord {
                text: text.clone(),
                confidence: 95.0,
                bbox: TOKEN_BOX,
            })
            .collect())
    }
}

pub struct FakeInput(FakeWorld);

impl FakeInput {
    fn check_failure(&self) -> Result<()> {
        let mut state = self.0 .0.borrow_mut();
        if let Some(limit) = state.inputs_before_failure {
            if state.inputs >= limit {
                return Err(anyhow!("input blocked"));
            }
        }
        state.inputs += 1;
        Ok(())
    }
}

impl InputDriver for FakeInput {
    fn move_and_click(&mut self, x: i32, y: i32) -> Result<()> {
        self.check_failure()?;
        let mut state = self.0 .0.borrow_mut();
        state.events.push(InputEvent::Click(x, y));
        let next = state
            .showing
            .as_ref()
            .and_then(|s| state.click_routes.get(s).cloned());
        if let Some(next) = next {
            state.showing = Some(next);
        }
        Ok(())
    }

    fn press_key(&mut self, key: Key, hold: Duration) -> Result<()> {
        self.check_failure()?;
        let mut state = self.0 .0.borrow_mut();
        state.events.push(InputEvent::Key(key, hold));
        let next = state
            .showing
            .as_ref()
            .and_then(|s| state.key_routes.get(&(s.clone(), key)).cloned());
        if let Some(next) = next {
            state.showing = Some(next);
        }
        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        self.0 .0.borrow_mut().events.push(InputEvent::Pause(duration));
    }
}

pub struct FakeFocus(FakeWorld);

impl WindowFocus for FakeFocus {
    fn is_active(&self) -> bool {
        self.0 .0.borrow().active
    }

    fn bring_to_foreground(&mut self) -> Result<()> {
        let mut state = self.0 .0.borrow_mut();
        state.focus_pulls += 1;
        state.active = true;
        Ok(())
    }
}
