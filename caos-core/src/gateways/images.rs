use anyhow::Result as Fallible;

use crate::entities::jid::JId;

/// Per-world image file storage: `<root>/<world.id>/<filename>`.
///
/// Soft-deleted files move to `<root>/<world.id>/.trash/<filename>` and can
/// be moved back when a delete proposal is restored.
pub trait ImageStorage {
    fn store(&self, world: &JId, filename: &str, blob_ref: &str) -> Fallible<()>;
    fn move_to_trash(&self, world: &JId, filename: &str) -> Fallible<()>;
    fn restore_from_trash(&self, world: &JId, filename: &str) -> Fallible<()>;

    /// Live (non-trashed) files of a world, in directory order.
    fn list_images(&self, world: &JId) -> Fallible<Vec<String>>;
}
