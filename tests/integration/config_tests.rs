use dupescan::config::{Config, ConfigError};
use figment::providers::{Format, Serialized, Toml};
use figment::{Figment, Jail};
use std::path::Path;

#[test]
fn test_default_config_serializes_all_keys() {
    let rendered = Config::default().to_toml().unwrap();

    for key in ["recursive", "min_size", "skip_hidden", "io_threads", "trash"] {
        assert!(rendered.contains(key), "missing {key} in:\n{rendered}");
    }
}

#[test]
fn test_partial_file_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file("partial.toml", "skip_hidden = false")?;

        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("partial.toml"))
            .extract()?;

        assert!(!config.skip_hidden);
        assert_eq!(config.min_size, Config::default().min_size);
        assert!(config.recursive);
        Ok(())
    });
}

#[test]
fn test_env_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file("layered.toml", "io_threads = 2\nmin_size = 512")?;
        jail.set_env("DUPESCAN_IO_THREADS", "7");

        let config: Config = Config::figment(Some(Path::new("layered.toml"))).extract()?;

        assert_eq!(config.io_threads, 7);
        assert_eq!(config.min_size, 512);
        Ok(())
    });
}

#[test]
fn test_walker_and_delete_config_follow_settings() {
    let config = Config {
        recursive: false,
        min_size: 0,
        skip_hidden: false,
        io_threads: 1,
        trash: true,
    };

    let walker = config.walker_config();
    assert!(!walker.recursive);
    assert_eq!(walker.min_size, 0);
    assert!(!walker.skip_hidden);
    assert_eq!(config.delete_config(), dupescan::actions::DeleteConfig::trash());
}

#[test]
fn test_invalid_file_is_reported() {
    Jail::expect_with(|jail| {
        jail.create_file("broken.toml", "min_size = [1, 2")?;

        let err = Config::load(Some(Path::new("broken.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)));
        assert!(err.to_string().starts_with("Invalid configuration"));
        Ok(())
    });
}
