//! Scripted input.
//!
//! A script is a list of segments, each holding one input state for a number
//! of frames. Used for headless runs and regression baselines.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::input::InputState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub frames: u32,
    #[serde(default)]
    pub input: InputState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputScript {
    pub segments: Vec<Segment>,
}

impl InputScript {
    /// Launch, turn right, coast, then brake to a stop.
    pub fn demo() -> Self {
        let seg = |frames, input| Segment { frames, input };
        Self {
            segments: vec![
                seg(120, InputState::throttle()),
                seg(
                    60,
                    InputState {
                        up: true,
                        right: true,
                        ..InputState::default()
                    },
                ),
                seg(60, InputState::default()),
                seg(
                    180,
                    InputState {
                        down: true,
                        ..InputState::default()
                    },
                ),
            ],
        }
    }

    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read script {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parse script {}", path.display()))
    }

    pub fn total_frames(&self) -> u64 {
        self.segments.iter().map(|s| u64::from(s.frames)).sum()
    }

    /// Input for `frame`; idle once the script has run out.
    pub fn input_at(&self, frame: u64) -> InputState {
        let mut start = 0u64;
        for seg in &self.segments {
            let end = start + u64::from(seg.frames);
            if frame < end {
                return seg.input;
            }
            start = end;
        }
        InputState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_follows_segments() {
        let script = InputScript::from_json_str(
            r#"{"segments": [
                {"frames": 2, "input": {"up": true}},
                {"frames": 1, "input": {"down": true}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(script.total_frames(), 3);
        assert!(script.input_at(0).up);
        assert!(script.input_at(1).up);
        assert!(script.input_at(2).down);
        assert!(script.input_at(3).is_idle());
    }

    #[test]
    fn demo_ends_braking() {
        let script = InputScript::demo();
        assert!(script.input_at(script.total_frames() - 1).down);
    }
}
