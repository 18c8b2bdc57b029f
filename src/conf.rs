use anyhow::{Context, Result};
use log::{LogLevel, debug, warning};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::Args;

pub const APP_NAME: &str = "facedist";
pub const DEFAULT_FPS: u32 = 10;

/// Parameters handed to the Haar cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConf {
	pub scale_factor: f64,
	pub min_neighbors: i32,
	pub min_face_size: i32,
	pub canny_pruning: bool,
}

impl ::std::default::Default for DetectorConf {
	fn default() -> Self {
		Self { scale_factor: 1.1, min_neighbors: 2, min_face_size: 55, canny_pruning: true }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conf {
	pub version: u8,
	/// -1 lets OpenCV pick any available device
	pub camera_index: i32,
	pub default_fps: u32,
	pub window_name: String,
	pub max_faces: usize,
	pub log_level: String,
	pub detector: DetectorConf,
}

impl ::std::default::Default for Conf {
	fn default() -> Self {
		Self {
			version: 0,
			camera_index: -1,
			default_fps: DEFAULT_FPS,
			window_name: "Face distance estimator".into(),
			max_faces: 10,
			log_level: "info".into(),
			detector: DetectorConf::default(),
		}
	}
}

pub fn load_config(path: Option<&Path>) -> Result<Conf> {
	let cfg: Conf = match path {
		Some(path) => confy::load_path(path)
			.with_context(|| format!("Can't load configuration from {}", path.display()))?,
		None => confy::load(APP_NAME, None).context("Can't load configuration")?,
	};
	debug!("Loaded configuration: {:?}", cfg);
	Ok(cfg)
}

/// Command line merged over the configuration file.
#[derive(Debug, Clone)]
pub struct Settings {
	pub haar: PathBuf,
	pub out_file: PathBuf,
	pub calibration_file: Option<PathBuf>,
	pub video: Option<PathBuf>,
	pub gui: bool,
	pub target_fps: u32,
	pub camera_index: i32,
	pub window_name: String,
	pub max_faces: usize,
	pub log_level: LogLevel,
	pub detector: DetectorConf,
}

impl Settings {
	pub fn resolve(args: &Args, cfg: Conf) -> Self {
		let default_fps = if cfg.default_fps == 0 { DEFAULT_FPS } else { cfg.default_fps };
		let target_fps = match args.fps {
			Some(0) => {
				warning!("Bad fps value. Setting to default ({}).", default_fps);
				default_fps
			}
			Some(fps) => fps,
			None => default_fps,
		};

		let log_level = if args.debug {
			LogLevel::Debug
		} else {
			cfg.log_level.parse::<LogLevel>().unwrap_or_else(|e| {
				warning!("{}; using info", e);
				LogLevel::Info
			})
		};

		Self {
			haar: args.haar.clone(),
			out_file: args.out_file.clone(),
			calibration_file: args.in_file.clone(),
			video: args.video.clone(),
			gui: !args.no_gui,
			target_fps,
			camera_index: cfg.camera_index,
			window_name: cfg.window_name,
			max_faces: cfg.max_faces,
			log_level,
			detector: cfg.detector,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::Parser;

	fn args(extra: &[&str]) -> Args {
		let mut argv = vec!["facedist", "--haar", "cascade.xml", "--out-file", "faces.txt"];
		argv.extend_from_slice(extra);
		Args::try_parse_from(argv).unwrap()
	}

	#[test]
	fn test_defaults_apply_without_flags() {
		let settings = Settings::resolve(&args(&[]), Conf::default());
		assert_eq!(settings.target_fps, DEFAULT_FPS);
		assert!(settings.gui);
		assert_eq!(settings.camera_index, -1);
		assert_eq!(settings.max_faces, 10);
		assert_eq!(settings.log_level, LogLevel::Info);
		assert_eq!(settings.detector, DetectorConf::default());
	}

	#[test]
	fn test_cli_overrides_config() {
		let cfg = Conf { default_fps: 5, log_level: "error".into(), ..Conf::default() };
		let settings = Settings::resolve(&args(&["--fps", "30", "--no-gui", "--debug"]), cfg);
		assert_eq!(settings.target_fps, 30);
		assert!(!settings.gui);
		assert_eq!(settings.log_level, LogLevel::Debug);
	}

	#[test]
	fn test_zero_fps_falls_back() {
		let settings = Settings::resolve(&args(&["--fps", "0"]), Conf::default());
		assert_eq!(settings.target_fps, DEFAULT_FPS);

		let cfg = Conf { default_fps: 0, ..Conf::default() };
		assert_eq!(Settings::resolve(&args(&[]), cfg).target_fps, DEFAULT_FPS);
	}

	#[test]
	fn test_bad_log_level_falls_back() {
		let cfg = Conf { log_level: "chatty".into(), ..Conf::default() };
		assert_eq!(Settings::resolve(&args(&[]), cfg).log_level, LogLevel::Info);
	}

	#[test]
	fn test_load_config_from_path() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("facedist.yml");
		std::fs::write(&path, "camera_index: 2\ndetector:\n  min_face_size: 80\n").unwrap();

		let cfg = load_config(Some(path.as_path())).unwrap();
		assert_eq!(cfg.camera_index, 2);
		assert_eq!(cfg.detector.min_face_size, 80);
		assert_eq!(cfg.detector.min_neighbors, 2);
		assert_eq!(cfg.default_fps, DEFAULT_FPS);
	}

	#[test]
	fn test_missing_config_is_created_with_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("fresh.yml");

		let cfg = load_config(Some(path.as_path())).unwrap();
		assert_eq!(cfg, Conf::default());
		assert!(path.exists());
	}
}
