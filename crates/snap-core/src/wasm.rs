//! WebAssembly bindings for the Snap engine.
//!
//! The browser table owns the timers: after every call it takes the pending
//! scheduled calls, arms `setTimeout` for each, and hands them back through
//! `fire` when they expire.

use wasm_bindgen::prelude::*;

use crate::actions::GameEvent;
use crate::config::{Difficulty, EngineConfig};
use crate::engine::GameEngine;
use crate::scheduler::{ManualScheduler, ScheduledCall};

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn events_json(events: &[GameEvent]) -> String {
    serde_json::to_string(events).unwrap_or_else(|_| "[]".to_string())
}

fn parse_call(call: &str) -> Result<ScheduledCall, serde_json::Error> {
    serde_json::from_str(call)
        .or_else(|_| serde_json::from_value(serde_json::Value::String(call.to_string())))
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    engine: GameEngine<ManualScheduler>,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game and deal the first round.
    /// difficulty: "easy", "medium" or "hard"
    #[wasm_bindgen(constructor)]
    pub fn new(difficulty: &str) -> WasmGame {
        let difficulty = match difficulty {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        };
        WasmGame {
            engine: GameEngine::new(EngineConfig::for_difficulty(difficulty), ManualScheduler::new()),
        }
    }

    /// Create a game from a JSON `EngineConfig`
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config_json: &str) -> Result<WasmGame, JsValue> {
        let config: EngineConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        config
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(WasmGame {
            engine: GameEngine::new(config, ManualScheduler::new()),
        })
    }

    /// Shuffle and deal again, returns events JSON
    pub fn reset(&mut self) -> String {
        events_json(&self.engine.reset())
    }

    /// Human lays a card, returns events JSON
    pub fn play(&mut self) -> String {
        events_json(&self.engine.play(false))
    }

    /// Human calls snap, returns events JSON
    pub fn snap(&mut self) -> String {
        events_json(&self.engine.call_snap())
    }

    /// Computer lays a card, returns events JSON
    #[wasm_bindgen(js_name = computerPlay)]
    pub fn computer_play(&mut self) -> String {
        events_json(&self.engine.play(true))
    }

    /// Collect spoils and start the next round, returns events JSON
    pub fn next(&mut self) -> String {
        events_json(&self.engine.next())
    }

    /// Fire a scheduled call, given either as the bare name `computer_play`
    /// or as the JSON string `"computer_play"` taken from `takeScheduled`
    pub fn fire(&mut self, call: &str) -> Result<String, JsValue> {
        let call = parse_call(call).map_err(|e| JsValue::from_str(&format!("Invalid call: {}", e)))?;
        Ok(events_json(&self.engine.fire(call)))
    }

    /// Take all pending scheduled calls as JSON `[{delay_ms, call}]`
    #[wasm_bindgen(js_name = takeScheduled)]
    pub fn take_scheduled(&mut self) -> String {
        let pending = self.engine.scheduler_mut().drain();
        serde_json::to_string(&pending).unwrap_or_else(|_| "[]".to_string())
    }

    /// Get the table as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.engine.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    #[wasm_bindgen(js_name = isSnap)]
    pub fn is_snap(&self) -> bool {
        self.engine.is_snap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_call_accepts_bare_and_quoted_names() {
        assert_eq!(parse_call("computer_play").unwrap(), ScheduledCall::ComputerPlay);
        assert_eq!(parse_call("\"next_round\"").unwrap(), ScheduledCall::NextRound);
        assert!(parse_call("fold").is_err());
    }
}
