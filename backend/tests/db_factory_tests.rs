//! Tests for db::factory and db::repo_config - repository selection and configuration.

mod support;

use std::io::Write;
use std::str::FromStr;
use staff_directory::db::factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
use staff_directory::db::repository::RepositoryError;
use staff_directory::db::RepositoryConfig;

#[test]
fn test_repository_type_from_str_case_insensitive() {
    assert_eq!(
        RepositoryType::from_str("POSTGRES").unwrap(),
        RepositoryType::Postgres
    );
    assert_eq!(RepositoryType::from_str("pg").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("Local").unwrap(), RepositoryType::Local);
}

#[test]
fn test_repository_type_from_str_invalid() {
    let result = RepositoryType::from_str("sqlite");
    assert!(result.unwrap_err().contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
        },
    );
}

#[test]
fn test_repository_type_from_env_with_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", Some("postgres://localhost/staff")),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres);
        },
    );
}

#[test]
fn test_explicit_repository_type_beats_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATABASE_URL", Some("postgres://localhost/staff")),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
        },
    );
}

#[test]
fn test_unknown_repository_type_falls_back_to_local() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", Some("mongo"))], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_seed_defaults_follow_backend() {
    support::with_scoped_env(&[("SEED_SAMPLE_DATA", None)], || {
        let local = RepositoryBuilder::new().repository_type(RepositoryType::Local);
        assert!(local.should_seed());

        let pg = RepositoryBuilder::new().repository_type(RepositoryType::Postgres);
        assert!(!pg.should_seed());
    });
}

#[test]
fn test_seed_env_overrides_builder() {
    support::with_scoped_env(&[("SEED_SAMPLE_DATA", Some("false"))], || {
        let builder = RepositoryBuilder::new()
            .repository_type(RepositoryType::Local)
            .seed_sample_data(true);
        assert!(!builder.should_seed());
    });
}

#[test]
fn test_builder_from_config_file() {
    let dir = std::env::temp_dir().join(format!("staff-directory-cfg-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("repository.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[repository]\ntype = \"local\"\nseed_sample_data = false").unwrap();

    support::with_scoped_env(&[("SEED_SAMPLE_DATA", None)], || {
        let builder = RepositoryBuilder::new().from_config_file(&path).unwrap();
        assert_eq!(builder.selected_type(), RepositoryType::Local);
        assert!(!builder.should_seed());
    });

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_missing_config_file_is_configuration_error() {
    let err = RepositoryConfig::from_file("/definitely/not/here/repository.toml").unwrap_err();
    assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
}

#[test]
fn test_explicit_config_path_env() {
    support::with_scoped_env(&[("REPOSITORY_CONFIG", Some("/etc/staff/repository.toml"))], || {
        assert_eq!(
            RepositoryConfig::default_path().unwrap(),
            std::path::PathBuf::from("/etc/staff/repository.toml")
        );
    });
}

#[cfg(not(feature = "postgres-repo"))]
#[tokio::test]
async fn test_postgres_without_feature_is_rejected() {
    let result = RepositoryFactory::create(RepositoryType::Postgres, None).await;
    assert!(matches!(
        result,
        Err(RepositoryError::ConfigurationError { .. })
    ));
}

#[cfg(feature = "postgres-repo")]
#[tokio::test]
async fn test_postgres_requires_config() {
    let result = RepositoryFactory::create(RepositoryType::Postgres, None).await;
    assert!(matches!(
        result,
        Err(RepositoryError::ConfigurationError { .. })
    ));
}

#[tokio::test]
async fn test_factory_local_repository_is_healthy_and_empty() {
    let repo = RepositoryFactory::create(RepositoryType::Local, None)
        .await
        .unwrap();
    assert!(repo.health_check().await.unwrap());
    assert_eq!(repo.stats().await.unwrap().total_teachers, 0);
}
