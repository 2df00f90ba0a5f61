use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use shelf_primitives::AppIdentity;
use shelf_reconciler::{ViewConfig, ViewPreset};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "shelf")]
#[command(about = "Reconcile an app list view over a device fixture")]
pub struct Args {
	/// Device fixture (TOML) describing profiles, apps, pins and suggestions
	#[arg(value_name = "FIXTURE")]
	pub fixture: PathBuf,

	/// View preset to reconcile
	#[arg(long, value_enum, default_value_t = View::QuickAccess)]
	pub view: View,

	/// View configuration file; overrides --view
	#[arg(short, long, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Pin an app (package/entry@profile) after the first snapshot
	#[arg(long, value_name = "IDENTITY")]
	pub pin: Vec<AppIdentity>,

	/// Unpin an app (package/entry@profile) after the pins are applied
	#[arg(long, value_name = "IDENTITY")]
	pub unpin: Vec<AppIdentity>,

	/// Print the snapshot and pin store as JSON
	#[arg(long)]
	pub json: bool,

	/// Milliseconds to wait for follow-up rebuilds before printing
	#[arg(long, value_name = "MS", default_value_t = 50)]
	pub settle: u64,

	/// Milliseconds to wait for any single snapshot
	#[arg(long, value_name = "MS", default_value_t = 5000)]
	pub timeout: u64,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum View {
	QuickAccess,
	FullCatalog,
	PinnableCatalog,
}

impl From<View> for ViewPreset {
	fn from(view: View) -> Self {
		match view {
			View::QuickAccess => Self::QuickAccess,
			View::FullCatalog => Self::FullCatalog,
			View::PinnableCatalog => Self::PinnableCatalog,
		}
	}
}

impl Args {
	/// View configuration selected by the flags.
	pub fn view_config(&self) -> anyhow::Result<ViewConfig> {
		match &self.config {
			Some(path) => Ok(ViewConfig::load(path)?),
			None => Ok(ViewConfig::preset(self.view.into())),
		}
	}

	/// Quiet period after the last snapshot before printing.
	pub fn settle(&self) -> Duration {
		Duration::from_millis(self.settle)
	}

	/// Upper bound on the whole run.
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout)
	}
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn args_are_well_formed() {
		Args::command().debug_assert();
	}

	#[test]
	fn pins_parse_as_identities() {
		let args = Args::try_parse_from([
			"shelf",
			"device.toml",
			"--view",
			"pinnable-catalog",
			"--pin",
			"org.mail/Main@0",
			"--unpin",
			"org.vpn/Main@10",
		])
		.unwrap();
		assert_eq!(args.view, View::PinnableCatalog);
		assert_eq!(args.pin, vec![AppIdentity::new("org.mail", "Main", 0)]);
		assert_eq!(args.unpin, vec![AppIdentity::new("org.vpn", "Main", 10)]);
		assert_eq!(args.view_config().unwrap(), ViewConfig::pinnable_catalog());

		assert!(Args::try_parse_from(["shelf", "device.toml", "--pin", "org.mail"]).is_err());
	}
}
