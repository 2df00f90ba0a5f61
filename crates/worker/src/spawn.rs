use std::future::Future;
use std::sync::OnceLock;

use tokio::task::JoinHandle;

use crate::TaskClass;

fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}

	static GLOBAL_RT: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	let runtime = GLOBAL_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(2)
			.thread_name("shelf-worker-global")
			.build()
			.expect("failed to build shelf-worker global tokio runtime")
	});
	runtime.handle().clone()
}

/// Spawns `fut` on the current runtime, or on the global fallback runtime
/// when called outside of one.
pub fn spawn<F>(class: TaskClass, name: &'static str, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), task = name, "worker.spawn");
	runtime_handle().spawn(fut)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn spawns_on_ambient_runtime() {
		let out = spawn(TaskClass::Recompute, "test", async { 7 }).await;
		assert_eq!(out.ok(), Some(7));
	}

	#[test]
	fn falls_back_to_global_runtime() {
		let handle = spawn(TaskClass::SourcePump, "test", async { "ok" });
		let (tx, rx) = std::sync::mpsc::channel();
		spawn(TaskClass::SourcePump, "join", async move {
			let _ = tx.send(handle.await.ok());
		});
		assert_eq!(rx.recv_timeout(std::time::Duration::from_secs(2)).ok().flatten(), Some("ok"));
	}
}
