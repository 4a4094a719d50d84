//! Generates the Zobrist key tables used by [`chess::hash`](src/chess/hash.rs)
//! for position hashing. Keys are produced once per build and baked in as
//! compile-time constants; they do not need to be stable across builds, only
//! within one.

use std::env;
use std::fs;
use std::path::Path;

fn generate_file(filename: &str, contents: &str) {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join(filename);
    fs::write(dest_path, contents).unwrap();
}

fn serialize_u128s(values: &[u128]) -> String {
    let mut rendered = String::from("[");
    for value in values {
        rendered.push_str(&value.to_string());
        rendered.push_str(", ");
    }
    rendered.push(']');
    rendered
}

fn generate_zobrist_keys() {
    let mut rng = rand::thread_rng();

    // One key per (piece kind, color, square): 6 kinds * 2 colors * 64 squares.
    let piece_keys: Vec<u128> = (0..6 * 2 * 64).map(|_| rand::Rng::gen(&mut rng)).collect();
    generate_file("piece_zobrist_keys", &serialize_u128s(&piece_keys));

    // One key per castling flag, in white_kingside, white_queenside,
    // black_kingside, black_queenside order.
    let castling_keys: Vec<u128> = (0..4).map(|_| rand::Rng::gen(&mut rng)).collect();
    generate_file("castling_zobrist_keys", &serialize_u128s(&castling_keys));

    // One key per en-passant file.
    let en_passant_keys: Vec<u128> = (0..8).map(|_| rand::Rng::gen(&mut rng)).collect();
    generate_file("en_passant_zobrist_keys", &serialize_u128s(&en_passant_keys));

    let black_to_move_key: u128 = rand::Rng::gen(&mut rng);
    generate_file("black_to_move_zobrist_key", &black_to_move_key.to_string());
}

fn main() {
    generate_zobrist_keys();
}
