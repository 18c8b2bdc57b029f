use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Face distance estimation with a single camera", long_about = None)]
pub struct Args {
	/// Haar cascade classifier data file
	#[arg(long)]
	pub haar: PathBuf,

	/// File receiving the detected faces and their distances
	#[arg(long = "out-file")]
	pub out_file: PathBuf,

	/// Camera calibration data (distance-width pairs)
	#[arg(long = "in-file")]
	pub in_file: Option<PathBuf>,

	/// Run without the preview window
	#[arg(long = "no-gui")]
	pub no_gui: bool,

	/// Frames per second to aim for
	#[arg(long)]
	pub fps: Option<u32>,

	/// Read a video file instead of using the camera
	#[arg(long)]
	pub video: Option<PathBuf>,

	/// Configuration file to use instead of the per-user one
	#[arg(long)]
	pub config: Option<PathBuf>,

	/// Output debug information
	#[arg(short, long)]
	pub debug: bool,
}

pub fn parse_args() -> Args {
	Args::parse()
}
