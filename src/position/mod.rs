//! Position module - cost-basis reconstruction and reconciliation

pub mod entry_meta;

pub use entry_meta::{reconcile_shares, resolve_entry_meta, ShareReconciliation, DUST_SHARES};
