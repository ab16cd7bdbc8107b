//! Archive records: the measurement tables series are read from and event
//! labels plus stats records are written back to.

mod record;
mod store;

pub use record::{
    event_labels, ArchiveRecord, Column, EventColumn, EventEntry, Realization, INFERRED, MEASURED,
};
pub use store::{JsonRecordStore, RecordStore};
