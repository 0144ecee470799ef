//! The lexical analyzer for the compiler front end.
//!
//! Tokenizes UTF-8 source with one token of lookahead. See [`Lexer`] for
//! the scanning loop and [`Token`] / [`TokenType`] for the token model.

pub mod keywords;
pub mod lexer;
pub mod numeric;
pub mod strings;
pub mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind, TokenType};
