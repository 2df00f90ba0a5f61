//! End-to-end behavior of the three preset views against memory sources.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use shelf_reconciler::ViewConfig;

#[tokio::test]
async fn full_catalog_suffixes_secondary_profiles() {
	let device = Device::with_work_profile();
	device.install("org.mail", PRIMARY, "Mail");
	device.install("org.mail", WORK, "Mail");

	let reconciler = device.reconciler(ViewConfig::full_catalog());
	let mut stream = reconciler.observe();
	reconciler.attach();

	let snapshot = first(&mut stream).await;
	assert_eq!(labels(&snapshot), vec!["Mail", "Mail (Work)"]);
	assert_eq!(snapshot.entries()[1].identity, app("org.mail", WORK));
	reconciler.detach().await;
}

#[tokio::test]
async fn quick_access_lists_pins_then_unpinned_suggestions() {
	let device = Device::single().with_pins([app("a", PRIMARY), app("b", PRIMARY)]);
	for (package, label) in [("a", "A"), ("b", "B"), ("c", "C"), ("d", "D")] {
		device.install(package, PRIMARY, label);
	}
	device
		.suggestions
		.push([(app("b", PRIMARY), 0), (app("c", PRIMARY), 1), (app("d", PRIMARY), 2)]);

	let reconciler = device.reconciler(ViewConfig::quick_access());
	let mut stream = reconciler.observe();
	reconciler.attach();

	let snapshot = until(&mut stream, |snapshot| snapshot.len() == 4).await;
	assert_eq!(labels(&snapshot), vec!["A", "B", "C", "D"]);
	assert_eq!(pinned_labels(&snapshot), vec!["A", "B"]);
	let b = snapshot.find(&app("b", PRIMARY)).unwrap();
	assert!(b.pinned);
	assert_eq!(b.suggestion_rank, None);
	assert_eq!(snapshot.find(&app("c", PRIMARY)).unwrap().suggestion_rank, Some(1));
	reconciler.detach().await;
}

#[tokio::test]
async fn removed_package_drops_only_its_entry() {
	let device = Device::single();
	device.install("org.alpha", PRIMARY, "Alpha");
	device.install("org.beta", PRIMARY, "Beta");
	device.install("org.gamma", PRIMARY, "Gamma");

	let reconciler = device.reconciler(ViewConfig::full_catalog());
	let mut stream = reconciler.observe();
	reconciler.attach();
	let before = first(&mut stream).await;
	assert_eq!(labels(&before), vec!["Alpha", "Beta", "Gamma"]);

	device.catalog.uninstall("org.alpha", PRIMARY.into());
	let after = next(&mut stream, &before).await;
	assert_eq!(labels(&after), vec!["Beta", "Gamma"]);
	assert_eq!(after.entries(), &before.entries()[1..]);
	reconciler.detach().await;
}

#[tokio::test]
async fn pin_of_disabled_package_is_dropped_and_deleted() {
	let device = Device::single().with_pins([app("org.mail", PRIMARY), app("org.notes", PRIMARY)]);
	device.install("org.mail", PRIMARY, "Mail");
	device.install("org.notes", PRIMARY, "Notes");
	device.catalog.set_package_enabled("org.notes", PRIMARY.into(), false);

	let reconciler = device.reconciler(ViewConfig::quick_access());
	let mut stream = reconciler.observe();
	reconciler.attach();

	let snapshot = first(&mut stream).await;
	assert_eq!(labels(&snapshot), vec!["Mail"]);
	eventually("stale pin deletion", || !device.pins.snapshot().contains(&app("org.notes", PRIMARY))).await;
	assert_eq!(device.pins.deleted(), vec![app("org.notes", PRIMARY)]);
	reconciler.detach().await;
}

#[tokio::test]
async fn pin_moves_entry_into_pinned_partition() {
	let device = Device::single();
	device.install("org.alpha", PRIMARY, "Alpha");
	device.install("org.beta", PRIMARY, "Beta");
	let zulu = device.install("org.zulu", PRIMARY, "Zulu");

	let reconciler = device.reconciler(ViewConfig::pinnable_catalog());
	let mut stream = reconciler.observe();
	reconciler.attach();
	let before = first(&mut stream).await;
	assert_eq!(labels(&before), vec!["Alpha", "Beta", "Zulu"]);
	assert!(pinned_labels(&before).is_empty());

	let ticket = reconciler.pin(zulu.clone());
	let after = tokio::time::timeout(TIMEOUT, stream.wait_for_command(ticket))
		.await
		.expect("timed out")
		.expect("publisher dropped");
	assert_eq!(labels(&after), vec!["Zulu", "Alpha", "Beta"]);
	assert!(after.find(&zulu).unwrap().pinned);
	assert!(device.pins.snapshot().contains(&zulu));
	reconciler.detach().await;
}

#[tokio::test]
async fn quick_access_pin_then_unpin() {
	let device = Device::single();
	let mail = device.install("org.mail", PRIMARY, "Mail");

	let reconciler = device.reconciler(ViewConfig::quick_access());
	let mut stream = reconciler.observe();
	reconciler.attach();
	assert!(first(&mut stream).await.is_empty());

	let pinned = tokio::time::timeout(TIMEOUT, stream.wait_for_command(reconciler.pin(mail.clone())))
		.await
		.unwrap()
		.unwrap();
	assert_eq!(pinned_labels(&pinned), vec!["Mail"]);

	let unpinned = tokio::time::timeout(TIMEOUT, stream.wait_for_command(reconciler.unpin(mail)))
		.await
		.unwrap()
		.unwrap();
	assert!(unpinned.is_empty());
	assert!(device.pins.snapshot().is_empty());
	reconciler.detach().await;
}

#[tokio::test]
async fn pinning_a_live_suggestion_lists_it_once() {
	let device = Device::single();
	let b = device.install("b", PRIMARY, "B");
	let c = device.install("c", PRIMARY, "C");
	device.suggestions.push([(b.clone(), 0), (c.clone(), 1)]);

	let reconciler = device.reconciler(ViewConfig::quick_access());
	let mut stream = reconciler.observe();
	reconciler.attach();
	let before = until(&mut stream, |snapshot| snapshot.len() == 2).await;
	assert_eq!(labels(&before), vec!["B", "C"]);
	assert!(pinned_labels(&before).is_empty());

	let ticket = reconciler.pin(b.clone());
	let after = tokio::time::timeout(TIMEOUT, stream.wait_for_command(ticket))
		.await
		.expect("timed out")
		.expect("publisher dropped");
	assert_eq!(labels(&after), vec!["B", "C"]);
	assert_eq!(pinned_labels(&after), vec!["B"]);
	assert_eq!(after.entries().iter().filter(|entry| entry.identity == b).count(), 1);
	assert_eq!(after.find(&b).unwrap().suggestion_rank, None);
	assert_eq!(after.find(&c).unwrap().suggestion_rank, Some(1));
	reconciler.detach().await;
}

#[tokio::test]
async fn reenabled_package_reappears() {
	let device = Device::single();
	device.install("org.alpha", PRIMARY, "Alpha");
	let beta = device.install("org.beta", PRIMARY, "Beta");

	let reconciler = device.reconciler(ViewConfig::full_catalog());
	let mut stream = reconciler.observe();
	reconciler.attach();
	let before = first(&mut stream).await;
	assert_eq!(labels(&before), vec!["Alpha", "Beta"]);

	device.catalog.set_package_enabled("org.beta", PRIMARY.into(), false);
	let hidden = until(&mut stream, |snapshot| snapshot.find(&beta).is_none()).await;
	assert_eq!(labels(&hidden), vec!["Alpha"]);

	device.catalog.set_package_enabled("org.beta", PRIMARY.into(), true);
	let shown = until(&mut stream, |snapshot| snapshot.find(&beta).is_some()).await;
	assert_eq!(shown.entries(), before.entries());
	reconciler.detach().await;
}

#[tokio::test]
async fn suggestions_are_capped() {
	let device = Device::single();
	let mut ranked = Vec::new();
	for rank in 0..5u32 {
		let package = format!("org.app{rank}");
		ranked.push((device.install(&package, PRIMARY, &format!("App {rank}")), rank));
	}
	device.suggestions.push(ranked);

	let mut config = ViewConfig::quick_access();
	config.max_suggestions = 3;
	let reconciler = device.reconciler(config);
	let mut stream = reconciler.observe();
	reconciler.attach();

	let snapshot = until(&mut stream, |snapshot| !snapshot.is_empty()).await;
	assert_eq!(labels(&snapshot), vec!["App 0", "App 1", "App 2"]);
	reconciler.detach().await;
}

#[tokio::test]
async fn views_over_one_pin_store_stay_consistent() {
	let device = Device::single();
	let mail = device.install("org.mail", PRIMARY, "Mail");
	device.install("org.maps", PRIMARY, "Maps");

	let quick = device.reconciler(ViewConfig::quick_access());
	let pinnable = device.reconciler(ViewConfig::pinnable_catalog());
	let mut quick_stream = quick.observe();
	let mut pinnable_stream = pinnable.observe();
	quick.attach();
	pinnable.attach();
	first(&mut quick_stream).await;
	first(&mut pinnable_stream).await;

	pinnable.pin(mail.clone());
	let quick_snapshot = until(&mut quick_stream, |snapshot| snapshot.find(&mail).is_some()).await;
	assert_eq!(pinned_labels(&quick_snapshot), vec!["Mail"]);
	let pinnable_snapshot = until(&mut pinnable_stream, |snapshot| snapshot.find(&mail).is_some_and(|e| e.pinned)).await;
	assert_eq!(labels(&pinnable_snapshot), vec!["Mail", "Maps"]);

	quick.detach().await;
	pinnable.detach().await;
}
