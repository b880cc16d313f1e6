//! fixkit-core: token stream model for PHP fixers
//!
//! This crate holds everything a rewriting rule needs to look at and edit
//! PHP source without a syntax tree:
//!
//! - [`lexer`] turns source text into a [`TokenStream`] that serializes back
//!   to the exact input
//! - [`navigator`] walks to meaningful siblings and matches paired blocks
//! - [`analyzer`] computes region facts (arguments, array elements, switch
//!   cases, constructor promotion candidates, data providers)
//! - [`edit`] clears, inserts and overrides tokens while keeping whitespace
//!   sane
//!
//! # Example
//!
//! ```
//! use fixkit_core::{TokenKind, TokenStream};
//!
//! let mut tokens = TokenStream::from_source("<?php $a = 1 ;");
//! let semicolon = tokens.find_kind(TokenKind::Semicolon)[0];
//! tokens.clear_at(semicolon - 1).unwrap();
//! assert_eq!(tokens.generate_code(), "<?php $a = 1;");
//! ```

pub mod analyzer;
pub mod edit;
pub mod error;
pub mod lexer;
pub mod navigator;
pub mod stream;
pub mod token;

pub use error::CoreError;
pub use navigator::{detect_block_type, BlockEdge, BlockType, Direction};
pub use stream::TokenStream;
pub use token::{Token, TokenKind};
