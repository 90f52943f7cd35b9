use crate::config::AssistantConfig;

/// Decide which quick-reply prompts to offer. The set is shown only while
/// the transcript is still short and no reply is in flight; otherwise the
/// selection is empty.
pub fn visible_prompts(config: &AssistantConfig, history_len: usize, busy: bool) -> &[String] {
    if history_len < config.suggestion_threshold && !busy {
        &config.suggested_prompts
    } else {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_while_short_and_idle() {
        let config = AssistantConfig::default();
        assert_eq!(visible_prompts(&config, 1, false).len(), 4);
        assert_eq!(visible_prompts(&config, 2, false).len(), 4);
    }

    #[test]
    fn hidden_at_threshold() {
        let config = AssistantConfig::default();
        assert!(visible_prompts(&config, 3, false).is_empty());
        assert!(visible_prompts(&config, 10, false).is_empty());
    }

    #[test]
    fn hidden_while_busy() {
        let config = AssistantConfig::default();
        assert!(visible_prompts(&config, 1, true).is_empty());
    }

    #[test]
    fn threshold_is_configurable() {
        let config = AssistantConfig {
            suggestion_threshold: 5,
            ..AssistantConfig::default()
        };
        assert_eq!(visible_prompts(&config, 4, false).len(), 4);
        assert!(visible_prompts(&config, 5, false).is_empty());
    }
}
