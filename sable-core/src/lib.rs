//! Core types shared by the sable image codecs.
//!
//! This crate carries the vocabulary the codec crates agree on, namely
//! colorspaces, bit depths, decoder and encoder options plus a byte-oriented
//! reader and writer used when parsing and producing image formats.
//!
//! It is not useful on its own, it exists to minimize code reuse between
//! the codec crates.
pub mod bit_depth;
pub mod bytestream;
pub mod colorspace;
pub mod options;
pub mod result;
