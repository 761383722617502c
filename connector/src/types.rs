use anyhow::Result;
use fleetsync::UpsertInstruction;
use futures::stream::BoxStream;

/// Lazy, finite, single-pass sequence of upsert instructions for one sync.
///
/// Items are computed as the host polls; the stream cannot be restarted.
pub type OperationStream = BoxStream<'static, Result<UpsertInstruction>>;
