//! Filesystem path constants.

/// Directory under the user's config dir that holds the rbacgen config file.
pub const CONFIG_DIR_NAME: &str = "rbacgen";

/// Filename of the YAML config file inside `CONFIG_DIR_NAME`.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Suggested filename when the generated manifests are saved to disk.
pub const DEFAULT_OUTPUT_FILENAME: &str = "rbac.yaml";
