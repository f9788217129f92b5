//! Minimal command-line driver: parse a FEN from argv/stdin and run perft
//! or perft-divide against it, printing the node counts.
//!
//! Usage:
//!   vantage perft <depth> [fen]
//!   vantage divide <depth> [fen]
//! `fen` defaults to the standard starting position; if omitted it is
//! also read from stdin when piped.

use std::io::{self, IsTerminal, Read};
use vantage::board::Board;
use vantage::moves::magic::loader::load_magic_tables;
use vantage::moves::perft::{perft, perft_divide};

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn read_fen(rest: &[String]) -> String {
    if !rest.is_empty() {
        return rest.join(" ");
    }
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return START_FEN.to_string();
    }
    let mut buf = String::new();
    if stdin.read_to_string(&mut buf).is_ok() && !buf.trim().is_empty() {
        buf.trim().to_string()
    } else {
        START_FEN.to_string()
    }
}

fn usage() -> ! {
    eprintln!("usage: vantage <perft|divide> <depth> [fen]");
    std::process::exit(2);
}

fn main() {
    #[cfg(feature = "cli")]
    vantage::logger::init_logging("logs/vantage.log", "info");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        usage();
    }

    let command = args[0].as_str();
    let depth: u32 = match args[1].parse() {
        Ok(d) => d,
        Err(_) => {
            eprintln!("invalid depth: `{}`", args[1]);
            std::process::exit(2);
        }
    };

    let fen = read_fen(&args[2..]);
    let mut board = match fen.parse::<Board>() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("invalid FEN `{fen}`: {e}");
            std::process::exit(1);
        }
    };

    let tables = load_magic_tables();

    match command {
        "perft" => {
            let nodes = perft(&mut board, tables, depth);
            println!("{nodes}");
        }
        "divide" => {
            perft_divide(&mut board, tables, depth);
        }
        other => {
            eprintln!("unknown command `{other}`");
            usage();
        }
    }
}
