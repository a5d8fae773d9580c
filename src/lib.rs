//! The front-end of a Scheme compiler: a lexer and a datum parser that turn
//! source text into located s-expression trees, or diagnostics pointing back
//! into the source.

#[macro_use]
extern crate lazy_static;

pub mod arena;
#[macro_use]
pub mod ast;
pub mod interner;
pub mod parser;
pub mod source;
