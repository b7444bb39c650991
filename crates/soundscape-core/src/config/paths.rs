//! Standard locations for soundscape files

use std::path::PathBuf;

/// Directory holding soundscape settings
///
/// Returns: `{config_dir}/soundscape`, or `./soundscape` when the platform has none
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("soundscape")
}

/// Path of a settings file inside [`default_config_dir`]
pub fn default_config_path(filename: &str) -> PathBuf {
    default_config_dir().join(filename)
}

/// Where the editor options live: `{config_dir}/soundscape/options.yaml`
pub fn default_options_path() -> PathBuf {
    default_config_path("options.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_path_layout() {
        let path = default_options_path();
        assert!(path.ends_with("soundscape/options.yaml"));
    }
}
