use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::replies::{ReplyResponse, UserConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppStep {
    Upload,
    EditText,
    Configure,
    Results,
}

impl AppStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppStep::Upload => "UPLOAD",
            AppStep::EditText => "EDIT_TEXT",
            AppStep::Configure => "CONFIGURE",
            AppStep::Results => "RESULTS",
        }
    }
}

/// Countdown shown to free users before results unlock.
///
/// Only the start instant is stored; the remaining time is derived on read.
#[derive(Debug, Clone, PartialEq)]
pub struct Interstitial {
    pub started_at: DateTime<Utc>,
    pub duration_secs: i64,
}

impl Interstitial {
    pub fn start(duration_secs: i64) -> Self {
        Self {
            started_at: Utc::now(),
            duration_secs,
        }
    }

    /// Whole seconds left at `now`, rounded up, never negative
    pub fn seconds_left_at(&self, now: DateTime<Utc>) -> i64 {
        let elapsed_ms = (now - self.started_at).num_milliseconds().max(0);
        let remaining_ms = self.duration_secs * 1000 - elapsed_ms;
        if remaining_ms <= 0 {
            0
        } else {
            (remaining_ms + 999) / 1000
        }
    }

    pub fn seconds_left(&self) -> i64 {
        self.seconds_left_at(Utc::now())
    }
}

/// One user's pass through upload, edit, configure and results
#[derive(Debug, Clone)]
pub struct Flow {
    pub id: Uuid,
    pub step: AppStep,
    /// Data URL of the screenshot being worked on
    pub image: Option<String>,
    pub transcript: String,
    pub config: UserConfig,
    pub results: Option<ReplyResponse>,
    pub gate: Option<Interstitial>,
    pub error: Option<String>,
    /// Bumped on every committed change
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
}

impl Flow {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            step: AppStep::Upload,
            image: None,
            transcript: String::new(),
            config: UserConfig::default(),
            results: None,
            gate: None,
            error: None,
            revision: 0,
            updated_at: Utc::now(),
        }
    }

    /// Back to a blank upload; the reply settings survive
    pub fn reset(&mut self) {
        self.step = AppStep::Upload;
        self.image = None;
        self.transcript.clear();
        self.results = None;
        self.gate = None;
        self.error = None;
    }

    /// A gate exists until it is completed, even after the countdown ran out
    pub fn gate_pending(&self) -> bool {
        self.gate.is_some()
    }

    pub fn view_at(&self, now: DateTime<Utc>) -> FlowView {
        let gate_active = self.gate_pending();

        FlowView {
            id: self.id,
            step: self.step,
            image: self.image.clone(),
            transcript: self.transcript.clone(),
            config: self.config.clone(),
            results: if gate_active {
                None
            } else {
                self.results.clone()
            },
            interstitial: self.gate.as_ref().map(|gate| {
                let seconds_left = gate.seconds_left_at(now);
                InterstitialView {
                    duration_secs: gate.duration_secs,
                    seconds_left,
                    can_complete: seconds_left == 0,
                }
            }),
            error: self.error.clone(),
            updated_at: self.updated_at,
        }
    }

    pub fn view(&self) -> FlowView {
        self.view_at(Utc::now())
    }
}

impl Default for Flow {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterstitialView {
    pub duration_secs: i64,
    pub seconds_left: i64,
    pub can_complete: bool,
}

/// What clients see of a flow; results stay hidden behind an active gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowView {
    pub id: Uuid,
    pub step: AppStep,
    pub image: Option<String>,
    pub transcript: String,
    pub config: UserConfig,
    pub results: Option<ReplyResponse>,
    pub interstitial: Option<InterstitialView>,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}
