use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub slot_increment_minutes: u32,
    pub max_suggested_slots: usize,
    pub default_work_start: String,
    pub default_work_end: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_service_role_key: String::new(),
            slot_increment_minutes: 30,
            max_suggested_slots: 5,
            default_work_start: "08:00".to_string(),
            default_work_end: "18:00".to_string(),
            port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            slot_increment_minutes: parse_or_default(
                "SLOT_INCREMENT_MINUTES",
                defaults.slot_increment_minutes,
            ),
            max_suggested_slots: parse_or_default(
                "MAX_SUGGESTED_SLOTS",
                defaults.max_suggested_slots,
            ),
            default_work_start: env::var("DEFAULT_WORK_START")
                .unwrap_or(defaults.default_work_start),
            default_work_end: env::var("DEFAULT_WORK_END")
                .unwrap_or(defaults.default_work_end),
            port: parse_or_default("PORT", defaults.port),
        };

        if !config.is_configured() {
            warn!("Supabase not fully configured - scheduling will use the in-memory store");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
    }

    /// Token sent as the bearer for server-side PostgREST calls.
    pub fn service_token(&self) -> Option<&str> {
        if self.supabase_service_role_key.is_empty() {
            None
        } else {
            Some(&self.supabase_service_role_key)
        }
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
