//! Obtains the process's `MagicTables`, either by generating them at
//! startup or by deserializing a table bundled at build time.
//!
//! `load_magic` trades a few hundred milliseconds of startup search time
//! for a binary that carries the precomputed tables; without it the
//! tables are regenerated every run, deterministically under
//! `deterministic_magic` so repeated runs produce identical magics.

use super::precompute::{MagicTableSeed, generate_magic_tables};
use super::structs::MagicTables;
use once_cell::sync::OnceCell;

#[cfg(feature = "load_magic")]
const BUNDLED_MAGIC_TABLES: &[u8] =
    include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/magic_tables.bin"));

#[cfg(feature = "load_magic")]
fn build_tables() -> MagicTables {
    bincode::deserialize(BUNDLED_MAGIC_TABLES).expect("bundled magic table blob is corrupt")
}

#[cfg(not(feature = "load_magic"))]
fn build_tables() -> MagicTables {
    let seed = if cfg!(feature = "deterministic_magic") {
        MagicTableSeed::Fixed(0x4d45_4749_4331_u64)
    } else {
        MagicTableSeed::FromEntropy
    };
    generate_magic_tables(seed).expect("magic number search failed")
}

/// Returns the process-wide magic tables, building them on first use.
pub fn load_magic_tables() -> &'static MagicTables {
    static TABLES: OnceCell<MagicTables> = OnceCell::new();
    TABLES.get_or_init(build_tables)
}
