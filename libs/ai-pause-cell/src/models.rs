// libs/ai-pause-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::pause;

pub const DEFAULT_PAUSE_DURATION: i64 = 30;
pub const DEFAULT_PAUSE_UNIT: &str = "minutes";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    Patient,
    Professional,
    Ai,
    System,
    #[serde(other)]
    Unknown,
}

/// Where an outbound message was typed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    /// Typed directly by a person.
    Manual,
    /// Sent through the web app.
    System,
    /// Sent by the messaging automation.
    Webhook,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    /// AI switched off explicitly by staff.
    Manual,
    /// AI paused because a professional answered by hand.
    ManualMessage,
    #[serde(other)]
    Other,
}

/// Per-clinic pause settings as stored on the clinic row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClinicPauseConfig {
    pub ai_pause_duration: Option<i64>,
    pub ai_pause_unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageContext {
    pub sender_id: Option<Uuid>,
    pub sender_type: SenderType,
    pub device_type: DeviceType,
    pub conversation_id: Option<Uuid>,
}

/// Outcome of evaluating one inbound message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PauseDecision {
    pub should_pause: bool,
    pub paused_until: Option<DateTime<Utc>>,
    pub pause_reason: Option<PauseReason>,
    pub paused_by: Option<Uuid>,
}

impl PauseDecision {
    pub fn no_pause() -> Self {
        Self::default()
    }
}

/// Pause fields carried by a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiPauseState {
    pub ai_active: bool,
    pub ai_paused_until: Option<DateTime<Utc>>,
    pub ai_pause_reason: Option<PauseReason>,
    pub ai_paused_by: Option<Uuid>,
}

impl Default for AiPauseState {
    fn default() -> Self {
        Self {
            ai_active: true,
            ai_paused_until: None,
            ai_pause_reason: None,
            ai_paused_by: None,
        }
    }
}

impl AiPauseState {
    /// Records a pause decision; a decision not to pause changes nothing.
    pub fn apply(&mut self, decision: &PauseDecision) {
        if !decision.should_pause {
            return;
        }
        self.ai_paused_until = decision.paused_until;
        self.ai_pause_reason = decision.pause_reason;
        self.ai_paused_by = decision.paused_by;
    }

    pub fn deactivate_manually(&mut self, actor: Option<Uuid>) {
        self.ai_active = false;
        self.ai_paused_until = None;
        self.ai_pause_reason = Some(PauseReason::Manual);
        self.ai_paused_by = actor;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_currently_paused(&self, now: DateTime<Utc>) -> bool {
        pause::is_currently_paused(self.ai_paused_until, now)
    }

    pub fn should_respond(&self, now: DateTime<Utc>) -> bool {
        pause::should_respond(self.ai_active, self.ai_paused_until, now)
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatePauseRequest {
    pub message: MessageContext,
    #[serde(default = "default_ai_active")]
    pub current_ai_active: bool,
    pub current_pause_reason: Option<PauseReason>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShouldRespondRequest {
    pub ai_active: bool,
    pub ai_paused_until: Option<DateTime<Utc>>,
}

fn default_ai_active() -> bool {
    true
}
