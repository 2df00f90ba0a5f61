//! `shelf` runs one app list view over a device fixture, applies pin
//! commands, and prints the settled snapshot.

mod cli;
mod fixture;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cli::Args;
use fixture::Fixture;
use shelf_reconciler::{Reconciler, Snapshot, SnapshotStream};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = args.view_config()?;
	let device = Fixture::load(&args.fixture)?.into_device();
	let reconciler = Reconciler::new(config, device.sources())?;
	let view = reconciler.config().name.clone();
	info!(%view, fixture = %args.fixture.display(), "shelf.start");

	let mut stream = reconciler.observe();
	reconciler.attach();
	let timeout = args.timeout();
	let mut snapshot = wait(&mut stream, timeout, |snapshot| snapshot.version() > 0).await?;

	let mut last = None;
	for identity in &args.pin {
		last = Some(reconciler.pin(identity.clone()));
	}
	for identity in &args.unpin {
		last = Some(reconciler.unpin(identity.clone()));
	}
	if let Some(ticket) = last {
		snapshot = tokio::time::timeout(timeout, stream.wait_for_command(ticket))
			.await
			.context("timed out waiting for pin commands")?
			.context("reconciler stopped")?;
	}

	// Healing and pin-store echoes trigger follow-up rebuilds.
	tokio::time::sleep(args.settle()).await;
	let settled = stream.current();
	if settled.version() > snapshot.version() {
		snapshot = settled;
	}
	reconciler.detach().await;

	let pins = device.pins().await?;
	if args.json {
		println!("{}", render::json(&view, &snapshot, &pins)?);
	} else {
		print!("{}", render::text(&view, &snapshot, &pins));
	}
	Ok(())
}

async fn wait(
	stream: &mut SnapshotStream,
	timeout: std::time::Duration,
	pred: impl FnMut(&Snapshot) -> bool,
) -> anyhow::Result<Snapshot> {
	tokio::time::timeout(timeout, stream.wait_for(pred))
		.await
		.context("timed out waiting for a snapshot")?
		.context("reconciler stopped")
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::fmt::format::FmtSpan;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_env("SHELF_LOG")
			.or_else(|_| EnvFilter::try_from_default_env())
			.unwrap_or_else(|_| {
				if verbose {
					EnvFilter::new("shelf=debug,shelf_reconciler=debug,shelf_sources=debug,warn")
				} else {
					EnvFilter::new("warn")
				}
			})
	};

	// SHELF_LOG_DIR captures a full trace per run
	if let Some(log_dir) = std::env::var("SHELF_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("shelf.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_span_events(FmtSpan::CLOSE)
				.with_target(true);

			tracing_subscriber::registry().with(filter()).with(file_layer).init();

			tracing::info!(path = ?log_path, "shelf tracing initialized");
			return;
		}
	}

	tracing_subscriber::fmt()
		.with_env_filter(filter())
		.with_writer(std::io::stderr)
		.init();
}
