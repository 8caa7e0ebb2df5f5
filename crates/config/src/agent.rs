//! Dialogue behavior configuration

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Knobs for the dialogue state machine and its driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Failed OTP entries allowed before the flow is cancelled.
    /// 0 disables the bound (retry forever).
    #[serde(default = "default_otp_max_attempts")]
    pub otp_max_attempts: u32,

    /// Delay before the deferred choice-of-fund offer fires once the
    /// machine is back at idle, in milliseconds.
    #[serde(default = "default_fund_offer_delay_ms")]
    pub fund_offer_delay_ms: u64,

    /// Log generated OTP codes at debug level so a demo operator can
    /// complete the flow (no real delivery channel exists).
    #[serde(default = "default_true")]
    pub reveal_otp_in_logs: bool,

    /// Name of the adviser shown in appointment summaries
    #[serde(default = "default_adviser_name")]
    pub adviser_name: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            otp_max_attempts: default_otp_max_attempts(),
            fund_offer_delay_ms: default_fund_offer_delay_ms(),
            reveal_otp_in_logs: default_true(),
            adviser_name: default_adviser_name(),
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fund_offer_delay_ms > 60_000 {
            return Err(ConfigError::InvalidValue {
                field: "agent.fund_offer_delay_ms".to_string(),
                message: "Delay above 60s would outlive the session".to_string(),
            });
        }
        Ok(())
    }
}

fn default_otp_max_attempts() -> u32 {
    3
}

fn default_fund_offer_delay_ms() -> u64 {
    2_000
}

fn default_true() -> bool {
    true
}

fn default_adviser_name() -> String {
    "Sarah Mitchell".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.otp_max_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_excessive_delay_rejected() {
        let config = AgentConfig {
            fund_offer_delay_ms: 120_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
