use anyhow::{Context, Result};
use cli::parse_args;
use conf::{APP_NAME, Settings, load_config};
use log::logger::AdvancedLogger;
use log::{LogLevel, critical, info};

mod calibration;
mod cli;
mod conf;
mod cv;
mod pipeline;
mod report;

use calibration::CalibrationTable;
use cv::detector::FaceDetector;
use pipeline::RunContext;
use report::ReportWriter;

fn main() {
	let args = parse_args();

	let level = if args.debug { LogLevel::Debug } else { LogLevel::Info };
	if let Err(e) = AdvancedLogger::init(APP_NAME, level) {
		eprintln!("{e}");
	}

	if let Err(e) = run(args) {
		critical!("{:#}", e);
		std::process::exit(1);
	}
}

fn run(args: cli::Args) -> Result<()> {
	let cfg = load_config(args.config.as_deref())?;
	let settings = Settings::resolve(&args, cfg);
	if let Some(logger) = log::logger() {
		logger.set_level(settings.log_level);
	}

	info!("Used HAAR classifier: {}", settings.haar.display());
	info!("Setting output file to: {}", settings.out_file.display());

	let calibration = match &settings.calibration_file {
		Some(path) => CalibrationTable::from_file(path)
			.with_context(|| format!("Error loading camera data from {}", path.display()))?,
		None => CalibrationTable::default(),
	};
	info!("Calibration table with {} measurements", calibration.len());

	let mut capture = pipeline::open_source(&settings)?;
	let detector = FaceDetector::new(&settings.haar, settings.detector.clone())?;
	let report = ReportWriter::create(&settings.out_file)?;

	let mut ctx = RunContext::new(settings, calibration, detector, report)?;
	pipeline::run(&mut ctx, &mut capture)
}
