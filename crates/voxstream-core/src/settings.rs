use std::env;

pub const ENV_SUBSCRIPTION_KEY: &str = "SPEECH_SUBSCRIPTION_KEY";
pub const ENV_REGION: &str = "SPEECH_REGION";
pub const ENV_LANGUAGE: &str = "SPEECH_LANGUAGE";

/// Connection settings for the speech service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechSettings {
    pub subscription_key: String,
    pub region: String,
    pub language: String,
}

impl SpeechSettings {
    /// Read settings from the process environment.
    ///
    /// Missing variables resolve to empty strings rather than errors: an
    /// incomplete configuration is rejected by the service at request time,
    /// surfacing as a cancellation event instead of a local failure.
    pub fn from_env() -> Self {
        Self {
            subscription_key: env::var(ENV_SUBSCRIPTION_KEY).unwrap_or_default(),
            region: env::var(ENV_REGION).unwrap_or_default(),
            language: env::var(ENV_LANGUAGE).unwrap_or_default(),
        }
    }

    /// True when all three values are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.subscription_key.is_empty() && !self.region.is_empty() && !self.language.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test mutating the environment so parallel test threads never
    // race on the same variables.
    #[test]
    fn test_from_env_reads_values_and_defaults_to_empty() {
        env::remove_var(ENV_SUBSCRIPTION_KEY);
        env::remove_var(ENV_REGION);
        env::remove_var(ENV_LANGUAGE);

        let settings = SpeechSettings::from_env();
        assert_eq!(settings.subscription_key, "");
        assert_eq!(settings.region, "");
        assert_eq!(settings.language, "");
        assert!(!settings.is_complete());

        env::set_var(ENV_SUBSCRIPTION_KEY, "key123");
        env::set_var(ENV_REGION, "westus");
        env::set_var(ENV_LANGUAGE, "en-US");

        let settings = SpeechSettings::from_env();
        assert_eq!(settings.subscription_key, "key123");
        assert_eq!(settings.region, "westus");
        assert_eq!(settings.language, "en-US");
        assert!(settings.is_complete());

        env::remove_var(ENV_SUBSCRIPTION_KEY);
        env::remove_var(ENV_REGION);
        env::remove_var(ENV_LANGUAGE);
    }

    #[test]
    fn test_is_complete_requires_every_field() {
        let mut settings = SpeechSettings {
            subscription_key: "key123".to_string(),
            region: "westus".to_string(),
            language: "en-US".to_string(),
        };
        assert!(settings.is_complete());

        settings.region.clear();
        assert!(!settings.is_complete());
    }
}
