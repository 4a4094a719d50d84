//! A rule-complete chess position, move generation and game library: board
//! representation, pseudo-legal and legal move generation, a reversible move
//! executor with undo/redo, terminal-state detection (checkmate, stalemate,
//! repetition, fifty-move rule, insufficient material) and a FEN codec.
//!
//! The crate ships no binary; it is consumed as a library by a host
//! application (a UI, a bot, a PGN tool) that supplies the rendering and
//! input layer. See [`chess::game::Game`] for the entry point.

// Rustc lints.
#![warn(
    absolute_paths_not_starting_with_crate,
    keyword_idents,
    macro_use_extern_crate,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    variant_size_differences
)]
// Rustdoc lints.
#![warn(
    rustdoc::private_doc_tests,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]
// Clippy lints.
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![deny(clippy::perf)]

pub mod chess;
