#![no_main]

use bitstream::{BitResult, ByteReader, ByteWriter};
use codec::{ComponentSyncPolicy, EntityReplicator, ReplicationLimits, SyncComponent};
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct Field {
    value: u64,
    label: Option<String>,
}

impl ComponentSyncPolicy for Field {
    fn is_dirty(&self) -> bool {
        true
    }

    fn is_writable(&self) -> bool {
        false
    }
}

impl SyncComponent for Field {
    fn serialize(&self, writer: &mut ByteWriter, _initial: bool) -> BitResult<()> {
        writer.write_var_u64(self.value);
        writer.write_string(self.label.as_deref())
    }

    fn deserialize(&mut self, reader: &mut ByteReader<'_>, _initial: bool) -> BitResult<()> {
        self.value = reader.read_var_u64()?;
        self.label = reader.read_string()?;
        Ok(())
    }

    fn clear_dirty(&mut self) {}
}

fuzz_target!(|data: &[u8]| {
    let Some((&count, rest)) = data.split_first() else {
        return;
    };
    let components = (0..usize::from(count % 8)).map(|_| Field::default()).collect();
    let Ok(mut replicator) = EntityReplicator::new(components, ReplicationLimits::for_testing())
    else {
        return;
    };

    let mut reader = ByteReader::new(rest);
    while !reader.is_empty() {
        let initial = reader.position() % 2 == 0;
        if replicator.deserialize(initial, &mut reader).is_err() {
            break;
        }
    }
});
