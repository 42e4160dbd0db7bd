use serde::{Deserialize, Serialize};

/// rbacgen configuration file (YAML).
///
/// Example `config.yaml`:
/// ```yaml
/// server: http://localhost:8001
/// timeout-secs: 10
/// insecure: false
/// verbs: [get, list, watch]
/// output: rbac.yaml
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RbacgenConfigFile {
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default, alias = "timeout-secs")]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub insecure: Option<bool>,
    #[serde(default)]
    pub verbs: Option<Vec<String>>,
    #[serde(default)]
    pub output: Option<String>,
}

/// Load a YAML config file, returning the default if the file doesn't exist.
pub fn load_config_file<T: serde::de::DeserializeOwned + Default>(path: &str) -> anyhow::Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config: T = serde_yaml::from_str(&content)?;
    Ok(config)
}
