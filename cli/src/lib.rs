use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::{Result, eyre::eyre};
use engine::{Credential, ModelSet, PollPolicy};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

pub mod cli;
pub mod download;
pub mod host;
pub mod run;
pub mod upload;

const APP_NAME: &str = "Mockup Studio";

/// Environment variables consulted, in order, when the config has no key.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    /// Paid key for pro images and videos. Prompted for when missing.
    pub paid_api_key: Option<String>,
    pub models: ModelSet,
    pub poll: PollPolicy,
    pub output_dir: Option<PathBuf>,
}

impl Config {
    pub fn basic_credential(&self) -> Option<Credential> {
        self.basic_credential_with(|name| std::env::var(name).ok())
    }

    fn basic_credential_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<Credential> {
        Credential::non_empty(self.api_key.as_str())
            .or_else(|| API_KEY_VARS.iter().find_map(|v| env(v).and_then(Credential::non_empty)))
    }

    pub fn paid_credential(&self) -> Option<Credential> {
        self.paid_api_key.clone().and_then(Credential::non_empty)
    }

    /// Human readable view of the config. Keys are only reported as set.
    pub fn summary(&self) -> String {
        let set = |present: bool| if present { "set" } else { "not set" };
        indoc::formatdoc! {"
            api key:      {}
            paid api key: {}
            models:       {} / {} / {}
            api:          {}
            polling:      every {}s, {}
            output dir:   {}",
            set(!self.api_key.trim().is_empty()),
            set(self.paid_credential().is_some()),
            self.models.mockup,
            self.models.pro,
            self.models.video,
            self.models.base_url,
            self.poll.interval_secs,
            match self.poll.max_attempts {
                Some(max) => format!("at most {max} times"),
                None => "until done".to_string(),
            },
            self.output_dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "default".into()),
        }
    }

    pub fn output_dir(&self) -> Result<PathBuf> {
        match &self.output_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(data_dir()?.join("outputs")),
        }
    }
}

pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let src = fs::read_to_string(path)?;
    Ok(ron::from_str(&src)?)
}

pub fn save_ron_file<T: Serialize>(path: &Path, x: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(fs::write(
        path,
        ron::ser::to_string_pretty(x, ron::ser::PrettyConfig::default())?,
    )?)
}

pub fn data_dir() -> Result<PathBuf> {
    Ok(dirs::data_dir()
        .ok_or(eyre!("Couldn't find data dir"))?
        .join(APP_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(dirs::config_local_dir()
        .ok_or(eyre!("Couldn't get config dir"))?
        .join("mockup_studio.ron"))
}

pub fn load_config() -> Result<Option<Config>> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        Ok(None)
    } else {
        load_ron_file(path).map(Some)
    }
}

pub fn save_config(cfg: &Config) -> Result<()> {
    save_ron_file(&config_path()?, cfg)
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_is_none() -> Result<()> {
        let dir = TempDir::new()?;
        assert_eq!(load_config_from(&dir.path().join("nope.ron"))?, None);
        Ok(())
    }

    #[test]
    fn config_round_trip() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("mockup_studio.ron");
        let cfg = Config {
            api_key: "basic".into(),
            paid_api_key: Some("paid".into()),
            poll: PollPolicy {
                interval_secs: 2,
                max_attempts: None,
            },
            ..Default::default()
        };

        save_ron_file(&path, &cfg)?;
        assert_eq!(load_config_from(&path)?, Some(cfg));
        Ok(())
    }

    #[test]
    fn partial_config_uses_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("cfg.ron");
        fs::write(&path, r#"(api_key: "k", models: (video: "veo-custom"))"#)?;

        let cfg = load_config_from(&path)?.ok_or(eyre!("config missing"))?;
        assert_eq!(cfg.api_key, "k");
        assert_eq!(cfg.models.video, "veo-custom");
        assert_eq!(cfg.models.mockup, ModelSet::default().mockup);
        assert_eq!(cfg.poll, PollPolicy::default());
        Ok(())
    }

    #[test]
    fn env_fallback_for_basic_key() {
        let cfg = Config::default();
        let env = |name: &str| (name == "API_KEY").then(|| "from-env".to_string());
        assert_eq!(
            cfg.basic_credential_with(env).map(|c| c.expose().to_string()),
            Some("from-env".to_string())
        );

        let cfg = Config {
            api_key: "from-file".into(),
            ..Default::default()
        };
        assert_eq!(
            cfg.basic_credential_with(env).map(|c| c.expose().to_string()),
            Some("from-file".to_string())
        );
        assert_eq!(Config::default().basic_credential_with(|_| None), None);
    }

    #[test]
    fn summary_hides_keys() {
        let cfg = Config {
            api_key: "secret-basic".into(),
            ..Default::default()
        };
        let summary = cfg.summary();
        assert!(!summary.contains("secret-basic"), "{summary}");
        assert!(summary.contains("api key:      set"), "{summary}");
        assert!(summary.contains("paid api key: not set"), "{summary}");
        assert!(summary.contains("at most 120 times"), "{summary}");
    }

    #[test]
    fn blank_paid_key_is_unset() {
        let cfg = Config {
            paid_api_key: Some(" ".into()),
            ..Default::default()
        };
        assert_eq!(cfg.paid_credential(), None);
    }
}
