//! `BETWEEN[a][b]`: squares strictly between `a` and `b` when they share a
//! rank, file, or diagonal; zero otherwise. Built once and cached behind a
//! process-wide singleton, the same pattern `hash::zobrist::zobrist_keys`
//! uses for its own table.
//!
//! Available to pin/ray-blocking logic that wants to prune candidates
//! before a legality probe; `movegen::generate`'s `Evasions` mode does not
//! need it directly, since its make/undo king-safety pass is already the
//! final arbiter.

use once_cell::sync::OnceCell;

const DIRS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

fn build() -> Box<[[u64; 64]; 64]> {
    let mut table = Box::new([[0u64; 64]; 64]);
    for a in 0..64usize {
        let (ar, af) = (a as i8 / 8, a as i8 % 8);
        for &(dr, df) in &DIRS {
            let mut mask = 0u64;
            let (mut r, mut f) = (ar + dr, af + df);
            while (0..8).contains(&r) && (0..8).contains(&f) {
                let b = (r * 8 + f) as usize;
                table[a][b] = mask;
                mask |= 1u64 << (r * 8 + f);
                r += dr;
                f += df;
            }
        }
    }
    table
}

pub fn between(a: u8, b: u8) -> u64 {
    static TABLE: OnceCell<Box<[[u64; 64]; 64]>> = OnceCell::new();
    TABLE.get_or_init(build)[a as usize][b as usize]
}
