// libs/ai-pause-cell/src/services/pause.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use shared_utils::Clock;

use crate::models::{
    ClinicPauseConfig, DeviceType, MessageContext, PauseDecision, PauseReason, SenderType,
    DEFAULT_PAUSE_DURATION, DEFAULT_PAUSE_UNIT,
};
use crate::store::PauseConfigStore;

/// `paused_until` is set and still ahead of `now`. Expiry is never swept;
/// every reader recomputes it.
pub fn is_currently_paused(paused_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    paused_until.is_some_and(|until| until > now)
}

/// Single gate the automation consults before replying.
pub fn should_respond(ai_active: bool, paused_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    ai_active && !is_currently_paused(paused_until, now)
}

/// Decides when a professional's own message should silence the assistant.
#[derive(Clone)]
pub struct AiPausePolicy {
    clock: Arc<dyn Clock>,
}

impl AiPausePolicy {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn should_pause(
        &self,
        context: &MessageContext,
        current_ai_active: bool,
        current_pause_reason: Option<PauseReason>,
    ) -> bool {
        // An explicit switch-off is never overridden by an automatic pause.
        if !current_ai_active && current_pause_reason == Some(PauseReason::Manual) {
            debug!("AI manually deactivated, not pausing");
            return false;
        }

        if !current_ai_active {
            debug!("AI already inactive, not pausing");
            return false;
        }

        context.sender_type == SenderType::Professional
            && matches!(context.device_type, DeviceType::Manual | DeviceType::System)
    }

    /// `None` when the configured length does not fit the calendar.
    pub fn calculate_pause_until(&self, config: &ClinicPauseConfig, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let amount = match config.ai_pause_duration {
            Some(amount) if amount > 0 => amount,
            Some(amount) => {
                warn!("Non-positive AI pause duration {}, using {}", amount, DEFAULT_PAUSE_DURATION);
                DEFAULT_PAUSE_DURATION
            }
            None => DEFAULT_PAUSE_DURATION,
        };
        let unit = config.ai_pause_unit.as_deref().unwrap_or(DEFAULT_PAUSE_UNIT);

        let duration = match unit {
            "minutes" => Duration::try_minutes(amount),
            "hours" => Duration::try_hours(amount),
            "days" => Duration::try_days(amount),
            other => {
                warn!("Unknown AI pause unit '{}', treating {} as minutes", other, amount);
                Duration::try_minutes(amount)
            }
        };

        let until = duration.and_then(|duration| now.checked_add_signed(duration));
        if until.is_none() {
            warn!("AI pause of {} {} is out of range", amount, unit);
        }
        until
    }

    pub fn is_currently_paused(&self, paused_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        is_currently_paused(paused_until, now)
    }

    pub fn should_respond(&self, ai_active: bool, paused_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        should_respond(ai_active, paused_until, now)
    }

    pub fn evaluate(
        &self,
        context: &MessageContext,
        config: &ClinicPauseConfig,
        current_ai_active: bool,
        current_pause_reason: Option<PauseReason>,
    ) -> PauseDecision {
        if !self.should_pause(context, current_ai_active, current_pause_reason) {
            return PauseDecision::no_pause();
        }

        let Some(paused_until) = self.calculate_pause_until(config, self.clock.now()) else {
            return PauseDecision::no_pause();
        };
        PauseDecision {
            should_pause: true,
            paused_until: Some(paused_until),
            pause_reason: Some(PauseReason::ManualMessage),
            paused_by: context.sender_id,
        }
    }
}

/// Pause policy bound to the clinic configuration source.
pub struct AiPauseService {
    policy: AiPausePolicy,
    config_store: Arc<dyn PauseConfigStore>,
}

impl AiPauseService {
    pub fn new(config_store: Arc<dyn PauseConfigStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy: AiPausePolicy::new(clock),
            config_store,
        }
    }

    pub fn policy(&self) -> &AiPausePolicy {
        &self.policy
    }

    #[instrument(skip(self, context))]
    pub async fn evaluate_for_clinic(
        &self,
        clinic_id: Uuid,
        context: &MessageContext,
        current_ai_active: bool,
        current_pause_reason: Option<PauseReason>,
    ) -> PauseDecision {
        if !self.policy.should_pause(context, current_ai_active, current_pause_reason) {
            return PauseDecision::no_pause();
        }

        let config = match self.config_store.get_pause_config(clinic_id).await {
            Ok(Some(config)) => config,
            Ok(None) => {
                debug!("No pause settings for clinic {}, using defaults", clinic_id);
                ClinicPauseConfig::default()
            }
            Err(e) => {
                warn!("Pause settings lookup failed for clinic {}: {} - not pausing", clinic_id, e);
                return PauseDecision::no_pause();
            }
        };

        let decision = self.policy.evaluate(context, &config, current_ai_active, current_pause_reason);
        if let Some(until) = decision.paused_until {
            info!("AI paused for conversation {:?} until {}", context.conversation_id, until);
        }
        decision
    }

    pub fn should_respond(&self, ai_active: bool, paused_until: Option<DateTime<Utc>>) -> bool {
        self.policy.should_respond(ai_active, paused_until, self.policy.now())
    }
}
