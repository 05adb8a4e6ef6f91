use syl_config::SylConfig;

pub fn warn_unconfigured(config: &SylConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &SylConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if !config.generation.is_configured() && has_env_prefix(&env_keys, "SYLLABUS_GENERATION") {
        warnings.push(
            "Generation config appears default while SYLLABUS_GENERATION* env vars exist. Use double underscores (example: SYLLABUS_GENERATION__MODEL)."
                .to_string(),
        );
    }

    if !config.knowledge.is_configured() && has_env_prefix(&env_keys, "SYLLABUS_KNOWLEDGE") {
        warnings.push(
            "Knowledge config appears default while SYLLABUS_KNOWLEDGE* env vars exist. Use double underscores (example: SYLLABUS_KNOWLEDGE__PATH)."
                .to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}
