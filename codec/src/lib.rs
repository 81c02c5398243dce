//! Dirty-mask delta replication for the snapline replication stack.
//!
//! An entity is a fixed list of sub-components. Each serialization pass
//! writes a 64-bit dirty mask followed by the payload of every component
//! whose bit is set, so unchanged state costs one byte.
//!
//! # Features
//!
//! - Full (initial) and delta records
//! - Per-component sync intervals
//! - Split owner/observers records from one serialization pass
//! - Size-byte checks that recover from a misbehaving component
//!
//! # Design Principles
//!
//! - **Authority is injected** - Components answer [`ComponentSyncPolicy`]
//!   queries; the replicator never decides who may write.
//! - **Explicit invariants** - At most [`MAX_COMPONENTS`] components per
//!   entity, checked at construction.
//! - **Hard errors disconnect** - Anything that cannot be recovered returns
//!   [`CodecError`]; recoverable faults are reported in
//!   [`DeserializeReport`].

mod component;
mod error;
mod limits;
mod mask;
mod replicator;

pub use component::{ComponentSyncPolicy, SyncComponent, SyncMode};
pub use error::{CodecError, CodecResult, ComponentFault};
pub use limits::ReplicationLimits;
pub use mask::{DirtyBits, DirtyMask, MAX_COMPONENTS};
pub use replicator::{DeserializeReport, EntityReplicator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = ReplicationLimits::default();
        let _ = DirtyMask::empty();
        let _ = SyncMode::Observers;
        let _: CodecResult<()> = Ok(());
        assert_eq!(MAX_COMPONENTS, 64);
    }
}
