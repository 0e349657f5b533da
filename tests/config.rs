// ABOUTME: Integration tests for configuration resolution and validation.
// ABOUTME: Covers precedence of flags, env file, name heuristics and fallbacks.

use redeploy::config::*;
use redeploy::diagnostics::WarningKind;
use redeploy::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

fn flags_for(env: &str) -> DeployFlags {
    DeployFlags {
        environment: Some(env.to_string()),
        ..Default::default()
    }
}

fn resolve_with(flags: &DeployFlags, vars: &[(&str, &str)]) -> Resolution {
    let env_file = flags.env_file_path().unwrap();
    let env: EnvFile = vars.iter().copied().collect();
    resolve(flags, &env_file, &env).unwrap()
}

mod branch {
    use super::*;

    #[test]
    fn env_file_override_beats_heuristics() {
        let resolution = resolve_with(&flags_for("production"), &[("BRANCH", "hotfix/login")]);
        assert_eq!(resolution.config.branch, "hotfix/login");
    }

    #[test]
    fn git_branch_alias_is_read() {
        let resolution = resolve_with(&flags_for("production"), &[("GIT_BRANCH", "release")]);
        assert_eq!(resolution.config.branch, "release");
    }

    #[test]
    fn flag_beats_env_file() {
        let flags = DeployFlags {
            branch: Some("feature/x".to_string()),
            ..flags_for("staging")
        };
        let resolution = resolve_with(&flags, &[("BRANCH", "staging")]);
        assert_eq!(resolution.config.branch, "feature/x");
    }

    #[test]
    fn heuristic_used_when_nothing_configured() {
        let branch_for = |env: &str| resolve_with(&flags_for(env), &[]).config.branch;
        assert_eq!(branch_for("staging"), "staging");
        assert_eq!(branch_for("prod"), "main");
        assert_eq!(branch_for("dev"), "develop");
    }

    #[test]
    fn blank_branch_uses_heuristic() {
        let resolution = resolve_with(&flags_for("staging"), &[("BRANCH", "  ")]);
        assert_eq!(resolution.config.branch, "staging");
    }

    #[test]
    fn unknown_name_falls_back_to_main_with_warning() {
        let resolution = resolve_with(&flags_for("demo"), &[]);
        assert_eq!(resolution.config.branch, "main");
        assert!(
            resolution
                .warnings
                .iter()
                .any(|w| w.kind == WarningKind::Fallback && w.message.contains("branch"))
        );
    }
}

mod health_url {
    use super::*;

    #[test]
    fn explicit_override_wins() {
        let flags = DeployFlags {
            health_url: Some("http://10.0.0.5:8080/ready".to_string()),
            ..flags_for("staging")
        };
        let resolution = resolve_with(
            &flags,
            &[
                ("HEALTH_CHECK_URL", "http://other/health"),
                ("BASE_URL", "http://base"),
            ],
        );
        assert_eq!(resolution.config.health_url, "http://10.0.0.5:8080/ready");
    }

    #[test]
    fn health_check_url_beats_base_url() {
        let resolution = resolve_with(
            &flags_for("staging"),
            &[
                ("HEALTH_CHECK_URL", "https://staging.example.com/status"),
                ("BASE_URL", "https://staging.example.com"),
            ],
        );
        assert_eq!(
            resolution.config.health_url,
            "https://staging.example.com/status"
        );
    }

    #[test]
    fn base_url_gets_health_suffix() {
        let resolution = resolve_with(
            &flags_for("staging"),
            &[("BASE_URL", "https://staging.example.com/")],
        );
        assert_eq!(
            resolution.config.health_url,
            "https://staging.example.com/health"
        );
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn blank_health_check_url_falls_through() {
        let env = EnvFile::parse(
            "HEALTH_CHECK_URL=\"   \"\nBASE_URL=\" https://staging.example.com \"\n",
        )
        .unwrap();
        let flags = flags_for("staging");
        let resolution = resolve(&flags, Path::new(".env.staging"), &env).unwrap();
        assert_eq!(
            resolution.config.health_url,
            "https://staging.example.com/health"
        );
    }

    #[test]
    fn localhost_default_last() {
        let resolution = resolve_with(&flags_for("staging"), &[]);
        assert_eq!(resolution.config.health_url, DEFAULT_HEALTH_URL);
        assert_eq!(resolution.warnings.len(), 1);
    }
}

mod fields {
    use super::*;

    #[test]
    fn display_name_precedence() {
        let flags = DeployFlags {
            name: Some("Blue".to_string()),
            ..flags_for("staging")
        };
        assert_eq!(
            resolve_with(&flags, &[("ENVIRONMENT_NAME", "Green")]).config.display_name,
            "Blue"
        );
        assert_eq!(
            resolve_with(&flags_for("staging"), &[("ENVIRONMENT_NAME", "Staging EU")])
                .config
                .display_name,
            "Staging EU"
        );
        assert_eq!(
            resolve_with(&flags_for("staging"), &[]).config.display_name,
            "Staging"
        );
        assert_eq!(
            resolve_with(&flags_for("demo"), &[]).config.display_name,
            "demo"
        );
    }

    #[test]
    fn identifier_derived_from_env_file() {
        let flags = DeployFlags {
            env_file: Some(PathBuf::from("deploy/.env.production")),
            ..Default::default()
        };
        let resolution = resolve_with(&flags, &[]);
        assert_eq!(resolution.config.environment, "production");
        assert_eq!(resolution.config.display_name, "Production");
        let expected = PathBuf::from("deploy/.env.production");
        assert_eq!(resolution.config.env_file, expected);
    }

    #[test]
    fn container_and_port_lists() {
        let resolution = resolve_with(
            &flags_for("staging"),
            &[
                ("CONTAINERS", "web, worker nginx"),
                ("PORTS", "80,8080"),
                ("PROXY_CONTAINER", "nginx"),
            ],
        );
        let config = resolution.config;
        assert_eq!(config.containers, vec!["web", "worker", "nginx"]);
        assert_eq!(config.ports, vec![80, 8080]);
        assert_eq!(config.proxy_container, "nginx");
    }

    #[test]
    fn defaults_for_lists() {
        let config = resolve_with(&flags_for("staging"), &[]).config;
        assert_eq!(config.containers, vec![DEFAULT_PROXY_CONTAINER]);
        assert_eq!(config.ports, DEFAULT_PORTS.to_vec());
        assert_eq!(config.compose_file, PathBuf::from(DEFAULT_COMPOSE_FILE));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let flags = flags_for("staging");
        let env: EnvFile = [("PORTS", "80,https")].into_iter().collect();
        let err = resolve(&flags, Path::new(".env.staging"), &env).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { ref key, .. } if key == "PORTS"));
    }

    #[test]
    fn compose_file_from_env_file() {
        let config = resolve_with(
            &flags_for("staging"),
            &[("COMPOSE_FILE", "docker-compose.staging.yml")],
        )
        .config;
        let expected = PathBuf::from("docker-compose.staging.yml");
        assert_eq!(config.compose_file, expected);
    }

    #[test]
    fn database_url_is_only_previewed() {
        let secret = format!("postgres://deploy:{}@db.internal/app", "s".repeat(40));
        let vars = [("DATABASE_URL", secret.as_str())];
        let config = resolve_with(&flags_for("staging"), &vars).config;
        let preview = config.database_preview().unwrap();
        assert!(preview.len() < secret.len());
        assert!(!preview.contains("db.internal"));
    }

    #[test]
    fn mode_is_carried_through() {
        let flags = DeployFlags {
            mode: RebuildMode::ClearCache,
            ..flags_for("staging")
        };
        let config = resolve_with(&flags, &[]).config;
        assert_eq!(config.mode, RebuildMode::ClearCache);
    }
}

mod loading {
    use super::*;

    fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn loads_env_file_by_name() {
        let dir = project(&[
            (
                ".env.staging",
                "BRANCH=release\nBASE_URL=http://staging.local\n",
            ),
            ("docker-compose.yml", "services: {}\n"),
        ]);
        let resolution = DeployConfig::load(dir.path(), &flags_for("staging")).unwrap();
        assert_eq!(resolution.config.branch, "release");
        assert_eq!(resolution.config.health_url, "http://staging.local/health");
    }

    #[test]
    fn missing_selector_is_error() {
        let dir = project(&[("docker-compose.yml", "services: {}\n")]);
        let err = DeployConfig::load(dir.path(), &DeployFlags::default()).unwrap_err();
        assert!(matches!(err, Error::MissingEnvironment));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn missing_env_file_is_error() {
        let dir = project(&[("docker-compose.yml", "services: {}\n")]);
        let err = DeployConfig::load(dir.path(), &flags_for("staging")).unwrap_err();
        assert!(matches!(err, Error::EnvFileNotFound(_)));
    }

    #[test]
    fn missing_compose_file_is_error() {
        let dir = project(&[(".env.staging", "BRANCH=main\n")]);
        let err = DeployConfig::load(dir.path(), &flags_for("staging")).unwrap_err();
        assert!(matches!(err, Error::ComposeFileNotFound(_)));
    }

    #[test]
    fn compose_file_named_in_env_file_must_exist() {
        let dir = project(&[
            (".env.staging", "COMPOSE_FILE=compose/staging.yml\n"),
            ("compose/staging.yml", "services: {}\n"),
        ]);
        let resolution = DeployConfig::load(dir.path(), &flags_for("staging")).unwrap();
        assert_eq!(
            resolution.config.compose_file,
            PathBuf::from("compose/staging.yml")
        );
    }

    #[test]
    fn malformed_env_file_is_error() {
        let dir = project(&[
            (".env.staging", "BRANCH=main\nthis is not valid\n"),
            ("docker-compose.yml", "services: {}\n"),
        ]);
        let err = DeployConfig::load(dir.path(), &flags_for("staging")).unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert_eq!(err.exit_code(), 1);
    }
}
