use crate::core::ClearOutcome;
use crate::model::TaskId;

/// Completion notices sent back from operations running on the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Message {
    Loaded { ok: bool },
    Added { ok: bool },
    RowSettled { id: TaskId },
    TitleSaved { id: TaskId, failed: bool },
    Cleared(ClearOutcome),
    ToggledAll { ok: bool },
}
