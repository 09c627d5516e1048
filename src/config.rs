use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{error::ConfigError, pipeline::settings::HolisticOptions, types::Viewport};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub options: HolisticOptions,
    pub viewport: Viewport,
    pub topology: TopologyConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct TopologyConfig {
    /// JSON array of `[from, to]` face mesh index pairs.
    pub face_tesselation: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Write every n-th rendered frame.
    pub every_nth: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("overlay-out"),
            every_nth: 1,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::settings::ModelComplexity;

    #[test]
    fn empty_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.toml");
        fs::write(&path, "").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.viewport, Viewport::new(1280, 720));
        assert_eq!(config.options, HolisticOptions::default());
        assert_eq!(config.output.every_nth, 1);
        assert!(config.topology.face_tesselation.is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.toml");
        fs::write(
            &path,
            r#"
[options]
model_complexity = "heavy"
min_detection_confidence = 0.7

[viewport]
width = 800
height = 1000

[topology]
face_tesselation = "assets/tess.json"

[output]
dir = "frames"
every_nth = 5
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.options.model_complexity, ModelComplexity::Heavy);
        assert_eq!(config.options.min_detection_confidence, 0.7);
        assert!(config.options.selfie_mode);
        assert_eq!(config.viewport, Viewport::new(800, 1000));
        assert_eq!(
            config.topology.face_tesselation.as_deref(),
            Some(Path::new("assets/tess.json"))
        );
        assert_eq!(config.output.dir, PathBuf::from("frames"));
        assert_eq!(config.output.every_nth, 5);
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.toml");
        fs::write(&path, "[viewport\nwidth = 3").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(matches!(
            Config::load("/definitely/not/here.toml"),
            Err(ConfigError::Read { .. })
        ));
    }
}
