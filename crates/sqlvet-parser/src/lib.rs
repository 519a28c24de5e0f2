//! SQL lexing and parsing
//!
//! This crate handles:
//! - Tokenizing SQL text with source spans
//! - Building the untyped syntax tree (whole script, single statement, or
//!   one statement at a time via a resumable cursor)
//! - Printing the tree back to canonical SQL
//! - Read-only tree traversal through the visitor framework

pub mod ast;
pub mod display;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod visitor;

pub use ast::{Expr, Script, SelectStatement, Statement};
pub use lexer::{Lexer, LexicalError};
pub use parser::{parse_script, parse_statement, ParseCursor, ParseError};
pub use token::{Token, TokenKind};
pub use visitor::Visitor;
