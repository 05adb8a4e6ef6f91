//! Integration tests for TOML configuration loading.
//!
//! Uses `figment::Jail` for sandboxed file and env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use syl_config::SylConfig;
use syl_core::enums::EntityType;

fn from_file(path: &str) -> Figment {
    Figment::from(Serialized::defaults(SylConfig::default())).merge(Toml::file(path))
}

#[test]
fn loads_retrieval_section_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r"
[retrieval]
default_top_k = 12
min_score = 0.6
relaxed_min_score = 0.4
max_expansions = 4
",
        )?;

        let config: SylConfig = from_file("config.toml").extract()?;

        assert_eq!(config.retrieval.default_top_k, 12);
        assert_eq!(config.retrieval.max_expansions, 4);
        assert!((config.retrieval.min_score - 0.6).abs() < f64::EPSILON);
        // untouched keys keep their defaults
        assert_eq!(config.retrieval.assessment_top_k, 20);
        assert!(config.validate().is_ok());
        Ok(())
    });
}

#[test]
fn loads_generation_and_knowledge_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[knowledge]
path = "data/catalogue.jsonl"

[generation]
endpoint = "http://localhost:11434/v1"
model = "llama3.1"
temperature = 0.0
"#,
        )?;

        let config: SylConfig = from_file("config.toml").extract()?;

        assert_eq!(config.knowledge.path, "data/catalogue.jsonl");
        assert_eq!(config.generation.endpoint, "http://localhost:11434/v1");
        assert_eq!(config.generation.model, "llama3.1");
        assert!(config.generation.is_configured());
        assert!(config.generation.api_key.is_empty());
        Ok(())
    });
}

#[test]
fn ambiguity_tolerances_override_per_type() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r"
[ambiguity]
assessment_tolerance = 0.3
",
        )?;

        let config: SylConfig = from_file("config.toml").extract()?;

        assert!((config.ambiguity.tolerance_for(EntityType::Assessment) - 0.3).abs() < 1e-9);
        assert!((config.ambiguity.tolerance_for(EntityType::Module) - 0.15).abs() < 1e-9);
        Ok(())
    });
}

#[test]
fn env_beats_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r"
[cache]
ttl_ms = 1000
max_entries = 8
",
        )?;
        jail.set_env("SYLLABUS_CACHE__TTL_MS", "2500");

        let config: SylConfig = from_file("config.toml")
            .merge(Env::prefixed("SYLLABUS_").split("__"))
            .extract()?;

        assert_eq!(config.cache.ttl_ms, 2500);
        assert_eq!(config.cache.max_entries, 8);
        Ok(())
    });
}

#[test]
fn local_project_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".syllabus")?;
        jail.create_file(
            ".syllabus/config.toml",
            r#"
[general]
namespace = "autumn-intake"
"#,
        )?;

        let config: SylConfig = SylConfig::figment().extract()?;
        assert_eq!(config.general.namespace, "autumn-intake");
        Ok(())
    });
}

#[test]
fn wrong_type_is_a_figment_error() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[retrieval]
default_top_k = "many"
"#,
        )?;

        let result: Result<SylConfig, _> = from_file("config.toml").extract();
        assert!(result.is_err());
        Ok(())
    });
}
