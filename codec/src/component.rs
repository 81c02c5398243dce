//! The component contract the replicator drives.

use bitstream::{BitResult, ByteReader, ByteWriter};

/// Who receives a component's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SyncMode {
    /// Sent to the owner and every observer.
    #[default]
    Observers,
    /// Sent to the owner only.
    Owner,
}

/// Authority and change state, queried by the replicator.
///
/// The replicator never decides authority itself; it only asks.
pub trait ComponentSyncPolicy {
    /// Returns `true` if the component changed since its last sync.
    fn is_dirty(&self) -> bool;

    /// Returns `true` if this peer has authority to write the component.
    fn is_writable(&self) -> bool;
}

/// A replicated sub-component of an entity.
///
/// `serialize` and `deserialize` must be symmetric: the reader consumes
/// exactly the bytes the writer produced. When `initial` is set the full
/// state is written; otherwise implementations may write only what changed.
pub trait SyncComponent: ComponentSyncPolicy {
    /// Writes the component state.
    ///
    /// # Errors
    ///
    /// Returns the first [`BitError`](bitstream::BitError) hit while writing,
    /// such as an oversized string. The replicator drops the whole record.
    fn serialize(&self, writer: &mut ByteWriter, initial: bool) -> BitResult<()>;

    /// Reads state written by [`serialize`](Self::serialize).
    fn deserialize(&mut self, reader: &mut ByteReader<'_>, initial: bool) -> BitResult<()>;

    /// Clears change tracking after a successful sync.
    fn clear_dirty(&mut self);

    /// Returns who receives this component.
    fn sync_mode(&self) -> SyncMode {
        SyncMode::Observers
    }

    /// Minimum seconds between two syncs of a dirty component.
    fn sync_interval(&self) -> f64 {
        0.0
    }
}

impl<C: ComponentSyncPolicy + ?Sized> ComponentSyncPolicy for Box<C> {
    fn is_dirty(&self) -> bool {
        (**self).is_dirty()
    }

    fn is_writable(&self) -> bool {
        (**self).is_writable()
    }
}

impl<C: SyncComponent + ?Sized> SyncComponent for Box<C> {
    fn serialize(&self, writer: &mut ByteWriter, initial: bool) -> BitResult<()> {
        (**self).serialize(writer, initial)
    }

    fn deserialize(&mut self, reader: &mut ByteReader<'_>, initial: bool) -> BitResult<()> {
        (**self).deserialize(reader, initial)
    }

    fn clear_dirty(&mut self) {
        (**self).clear_dirty();
    }

    fn sync_mode(&self) -> SyncMode {
        (**self).sync_mode()
    }

    fn sync_interval(&self) -> f64 {
        (**self).sync_interval()
    }
}
