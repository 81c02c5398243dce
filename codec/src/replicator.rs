//! Dirty-mask delta replication of one entity's components.
//!
//! Record layout:
//!
//! ```text
//! [varint dirty mask]
//! for each set bit, ascending:
//!     [u8 payload size & 0xFF][component payload]
//! ```
//!
//! Payloads are not length-prefixed. The size byte is a check: if a
//! component reads a different number of bytes than were written, the
//! reader is moved to the most likely payload end so the remaining
//! components can still be read.

use bitstream::{BitError, ByteReader, ByteWriter};
use log::{trace, warn};

use crate::component::{SyncComponent, SyncMode};
use crate::error::{CodecError, CodecResult, ComponentFault};
use crate::limits::ReplicationLimits;
use crate::mask::DirtyMask;

/// Outcome of a deserialize pass that did not fail outright.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeserializeReport {
    /// Components that were read.
    pub mask: DirtyMask,
    /// Recovered faults, in component order.
    pub faults: Vec<ComponentFault>,
}

impl DeserializeReport {
    /// Returns `true` if every component read exactly its payload.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Serializes and deserializes the components of one entity.
///
/// Components live in an arena indexed by position; index `i` maps to bit
/// `i` of the dirty mask, so an entity holds at most
/// [`MAX_COMPONENTS`](crate::MAX_COMPONENTS) components.
#[derive(Debug)]
pub struct EntityReplicator<C: SyncComponent> {
    components: Vec<C>,
    last_sync: Vec<f64>,
    limits: ReplicationLimits,
    consecutive_mismatches: usize,
}

impl<C: SyncComponent> EntityReplicator<C> {
    /// Creates a replicator over `components`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TooManyComponents`] if there are more components
    /// than the limits (and the mask width) allow.
    pub fn new(components: Vec<C>, limits: ReplicationLimits) -> CodecResult<Self> {
        let limit = limits.component_limit();
        if components.len() > limit {
            return Err(CodecError::TooManyComponents {
                limit,
                actual: components.len(),
            });
        }
        let last_sync = vec![0.0; components.len()];
        Ok(Self {
            components,
            last_sync,
            limits,
            consecutive_mismatches: 0,
        })
    }

    /// Returns the components in index order.
    #[must_use]
    pub fn components(&self) -> &[C] {
        &self.components
    }

    /// Returns component `index`.
    #[must_use]
    pub fn component(&self, index: usize) -> Option<&C> {
        self.components.get(index)
    }

    /// Returns component `index` mutably.
    pub fn component_mut(&mut self, index: usize) -> Option<&mut C> {
        self.components.get_mut(index)
    }

    /// Returns the number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if the entity has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns when component `index` was last serialized as dirty.
    #[must_use]
    pub fn last_sync_time(&self, index: usize) -> Option<f64> {
        self.last_sync.get(index).copied()
    }

    /// Returns the number of consecutive deserialize passes that needed a
    /// size correction.
    #[must_use]
    pub const fn consecutive_mismatches(&self) -> usize {
        self.consecutive_mismatches
    }

    fn is_due(&self, index: usize, now: f64) -> bool {
        let component = &self.components[index];
        component.is_dirty() && now - self.last_sync[index] >= component.sync_interval()
    }

    /// Returns the components a non-initial pass at `now` would send:
    /// writable, dirty, and past their sync interval.
    #[must_use]
    pub fn dirty_mask(&self, now: f64) -> DirtyMask {
        (0..self.components.len())
            .filter(|&index| self.components[index].is_writable() && self.is_due(index, now))
            .collect()
    }

    fn owner_mask(&self, initial: bool, now: f64) -> DirtyMask {
        if initial {
            DirtyMask::all(self.components.len())
        } else {
            self.dirty_mask(now)
        }
    }

    /// Observer components that are dirty and due, whoever has authority
    /// over them. A relaying peer forwards state it does not own.
    fn observers_mask(&self, initial: bool, now: f64) -> DirtyMask {
        (0..self.components.len())
            .filter(|&index| self.components[index].sync_mode() == SyncMode::Observers)
            .filter(|&index| initial || self.is_due(index, now))
            .collect()
    }

    /// Marks `mask` as synced at `now`.
    fn mark_synced(&mut self, mask: DirtyMask, now: f64) {
        for index in mask {
            self.components[index].clear_dirty();
            self.last_sync[index] = now;
        }
    }

    /// Serializes the entity for a single audience.
    ///
    /// With `initial` every component is written. Otherwise only
    /// components from [`dirty_mask`](Self::dirty_mask) are written, and
    /// those are then marked clean with `now` as their sync time.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Serialize`] if a component fails to write. The
    /// writer is rewound to where the record started and nothing is marked
    /// synced.
    pub fn serialize(
        &mut self,
        initial: bool,
        now: f64,
        writer: &mut ByteWriter,
    ) -> CodecResult<DirtyMask> {
        let mask = self.owner_mask(initial, now);
        let start = writer.position();
        if let Err(err) = self.write_record(mask, initial, writer) {
            writer.set_position(start);
            return Err(err);
        }
        trace!("serialized {} of {} components", mask.count(), self.components.len());
        if !initial {
            self.mark_synced(mask, now);
        }
        Ok(mask)
    }

    fn write_record(
        &self,
        mask: DirtyMask,
        initial: bool,
        writer: &mut ByteWriter,
    ) -> CodecResult<()> {
        writer.write(&mask)?;
        for index in mask {
            write_component(index, &self.components[index], initial, writer)?;
        }
        Ok(())
    }

    /// Serializes the entity twice in one pass: once for the owner, once
    /// for observers.
    ///
    /// The owner record is what [`serialize`](Self::serialize) would write.
    /// The observers record holds the [`SyncMode::Observers`] components
    /// that are dirty and due, including ones this peer is not
    /// authoritative for. A payload going to both audiences is serialized
    /// once and copied. Every component in either mask is marked synced.
    /// Returns `(owner_mask, observers_mask)`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Serialize`] if a component fails to write. Both
    /// writers are rewound and nothing is marked synced.
    pub fn serialize_split(
        &mut self,
        initial: bool,
        now: f64,
        owner: &mut ByteWriter,
        observers: &mut ByteWriter,
    ) -> CodecResult<(DirtyMask, DirtyMask)> {
        let owner_mask = self.owner_mask(initial, now);
        let observers_mask = self.observers_mask(initial, now);

        let owner_start = owner.position();
        let observers_start = observers.position();
        if let Err(err) = self.write_split(owner_mask, observers_mask, initial, owner, observers) {
            owner.set_position(owner_start);
            observers.set_position(observers_start);
            return Err(err);
        }

        if !initial {
            self.mark_synced(owner_mask.union(observers_mask), now);
        }
        Ok((owner_mask, observers_mask))
    }

    fn write_split(
        &self,
        owner_mask: DirtyMask,
        observers_mask: DirtyMask,
        initial: bool,
        owner: &mut ByteWriter,
        observers: &mut ByteWriter,
    ) -> CodecResult<()> {
        owner.write(&owner_mask)?;
        observers.write(&observers_mask)?;
        for index in owner_mask.union(observers_mask) {
            let component = &self.components[index];
            if !owner_mask.is_set(index) {
                write_component(index, component, initial, observers)?;
                continue;
            }
            let start = owner.position();
            write_component(index, component, initial, owner)?;
            if observers_mask.is_set(index) {
                observers.write_slice(&owner.as_slice()[start..]);
            }
        }
        Ok(())
    }

    /// Applies a record written by [`serialize`](Self::serialize).
    ///
    /// The whole mask is validated before any component is touched. Outside
    /// of `initial` records, the remote may only write components this peer
    /// is not authoritative for.
    ///
    /// # Errors
    ///
    /// - [`CodecError::UnknownComponent`] for a mask bit past the last
    ///   component.
    /// - [`CodecError::UnauthorizedWrite`] for a locally writable component.
    /// - [`CodecError::Bitstream`] if the mask or a size byte is truncated,
    ///   or a correction would move past the end of the data.
    /// - [`CodecError::TooManySizeMismatches`] once
    ///   `max_consecutive_mismatches` passes in a row needed correction.
    pub fn deserialize(
        &mut self,
        initial: bool,
        reader: &mut ByteReader<'_>,
    ) -> CodecResult<DeserializeReport> {
        let mask: DirtyMask = reader.read()?;
        let count = self.components.len();
        for index in mask {
            if index >= count {
                return Err(CodecError::UnknownComponent { index, count });
            }
            if !initial && self.components[index].is_writable() {
                return Err(CodecError::UnauthorizedWrite { index });
            }
        }

        let mut faults = Vec::new();
        for index in mask {
            let safety = reader.read_u8()?;
            let start = reader.position();
            let result = self.components[index].deserialize(reader, initial);
            let position = reader.position();
            let consumed = position
                .checked_sub(start)
                .ok_or(CodecError::ReaderRewound {
                    index,
                    start,
                    position,
                })?;

            if result.is_ok() && (consumed & 0xFF) as u8 == safety {
                continue;
            }

            let corrected = (consumed & !0xFF) | usize::from(safety);
            let available = reader.len() - start;
            if corrected > available {
                return Err(CodecError::Bitstream(BitError::EndOfData {
                    requested: corrected,
                    available,
                }));
            }
            reader.set_position(start + corrected)?;
            warn!(
                "component {index} read {consumed} bytes, sender wrote {corrected} (low byte {safety}); skipped to payload end"
            );
            faults.push(ComponentFault::SizeMismatch {
                index,
                safety,
                consumed,
                corrected,
                read_error: result.err(),
            });
        }

        if faults.is_empty() {
            self.consecutive_mismatches = 0;
        } else {
            self.consecutive_mismatches += 1;
            if self.consecutive_mismatches >= self.limits.max_consecutive_mismatches {
                return Err(CodecError::TooManySizeMismatches {
                    count: self.consecutive_mismatches,
                    limit: self.limits.max_consecutive_mismatches,
                });
            }
        }
        Ok(DeserializeReport { mask, faults })
    }

    /// Clears every component's dirty state and records `now` as its sync
    /// time.
    pub fn clear_all_dirty(&mut self, now: f64) {
        self.mark_synced(DirtyMask::all(self.components.len()), now);
    }
}

/// Writes `[size byte][payload]`, back-patching the size byte.
fn write_component<C: SyncComponent>(
    index: usize,
    component: &C,
    initial: bool,
    writer: &mut ByteWriter,
) -> CodecResult<()> {
    let header = writer.position();
    writer.write_u8(0);
    let start = writer.position();
    component
        .serialize(writer, initial)
        .map_err(|source| CodecError::Serialize { index, source })?;
    let end = writer.position();
    writer.set_position(header);
    writer.write_u8(((end - start) & 0xFF) as u8);
    writer.set_position(end);
    Ok(())
}
