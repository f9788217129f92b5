//! Builds a complete `MagicTables` from scratch: relevant-occupancy masks,
//! every blocker subset per square, a magic number search per square, and
//! the resulting attack table assembly.

use super::attacks::{
    bishop_attacks_per_square, bishop_relevant_mask, rook_attacks_per_square, rook_relevant_mask,
    subsets_of,
};
use super::search::find_magic_number_for_square;
use super::structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Selects the RNG seed used for the magic number search.
pub enum MagicTableSeed {
    /// A fixed seed, for reproducible tables (tests, `deterministic_magic`).
    Fixed(u64),
    /// Seeded from the OS entropy source.
    FromEntropy,
}

fn make_rng(seed: MagicTableSeed) -> StdRng {
    match seed {
        MagicTableSeed::Fixed(s) => StdRng::seed_from_u64(s),
        MagicTableSeed::FromEntropy => StdRng::from_os_rng(),
    }
}

fn build_entry(
    square: usize,
    mask: u64,
    rng: &mut StdRng,
    attacks_for: impl Fn(usize, u64) -> u64,
) -> Result<MagicEntry, String> {
    let blockers = subsets_of(mask);
    let attacks: Vec<u64> = blockers.iter().map(|&b| attacks_for(square, b)).collect();
    let shift = 64 - mask.count_ones();
    let magic = find_magic_number_for_square(&blockers, &attacks, shift, rng)?;

    let table_len = 1usize << mask.count_ones();
    let mut table = vec![0u64; table_len];
    for (&b, &a) in blockers.iter().zip(attacks.iter()) {
        let index = ((b.wrapping_mul(magic)) >> shift) as usize;
        table[index] = a;
    }

    Ok(MagicEntry {
        magic,
        shift,
        mask,
        table: table.into_boxed_slice(),
    })
}

pub fn generate_magic_tables(seed: MagicTableSeed) -> Result<MagicTables, String> {
    let mut rng = make_rng(seed);

    let mut rook_entries = Vec::with_capacity(64);
    for square in 0..64 {
        let mask = rook_relevant_mask(square);
        rook_entries.push(build_entry(square, mask, &mut rng, rook_attacks_per_square)?);
    }

    let mut bishop_entries = Vec::with_capacity(64);
    for square in 0..64 {
        let mask = bishop_relevant_mask(square);
        bishop_entries.push(build_entry(
            square,
            mask,
            &mut rng,
            bishop_attacks_per_square,
        )?);
    }

    Ok(MagicTables {
        rook: RookMagicTables {
            entries: rook_entries,
        },
        bishop: BishopMagicTables {
            entries: bishop_entries,
        },
    })
}
