/// Execution classes used to tag spawned tasks in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// The single-writer recomputation loop of one reconciler.
	Recompute,
	/// Forwarders that turn collaborator streams into triggers.
	SourcePump,
}

impl TaskClass {
	/// Stable name used in logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Recompute => "recompute",
			Self::SourcePump => "source_pump",
		}
	}
}
