pub mod detector;
pub mod frame_metrics;
pub mod overlay;

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warning};
use opencv::highgui;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};
use std::path::Path;

/// Key code that closes the preview window.
pub const CLOSE_KEY: i32 = 27;

pub fn get_stream_camera(index: i32) -> Result<VideoCapture> {
    info!("Registering camera input (device {})", index);
    let camera =
        VideoCapture::new(index, videoio::CAP_ANY).context("Can't connect to the camera")?;
    if !camera.is_opened()? {
        return Err(anyhow!("Can't connect to the camera (device {index})"));
    }
    debug!("Camera opened successfully");
    Ok(camera)
}

pub fn get_stream_file(file: &Path) -> Result<VideoCapture> {
    info!("Opening input video file stream {}", file.display());
    let path = file.to_str().context("Invalid video path")?;
    let stream =
        VideoCapture::from_file(path, videoio::CAP_ANY).context("Can't open video file")?;
    if !stream.is_opened()? {
        return Err(anyhow!("Can't open video file {}", file.display()));
    }
    Ok(stream)
}

pub struct Window {
    name: String,
}

impl Window {
    pub fn open(name: &str) -> Result<Self> {
        debug!("Initializing display window '{}'", name);
        highgui::named_window(name, highgui::WINDOW_AUTOSIZE)
            .with_context(|| format!("Could not create window '{name}'"))?;
        Ok(Self { name: name.to_string() })
    }

    pub fn show(&self, frame: &opencv::core::Mat) -> Result<()> {
        highgui::imshow(&self.name, frame)?;
        Ok(())
    }

    /// Waits up to `delay_ms` for a key press; true when the close key was hit.
    pub fn close_requested(&self, delay_ms: i32) -> Result<bool> {
        let key = highgui::wait_key(delay_ms.max(1))?;
        Ok(key & 0xFF == CLOSE_KEY)
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.name) {
            warning!("Failed to destroy window '{}': {}", self.name, e);
        }
    }
}
