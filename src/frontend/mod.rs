//! Frontend module - Lexer, Parser, Resolution, Semantic Analysis

pub mod token;
pub mod lexer;
pub mod ast;
pub mod annotations;
pub mod parser;
pub mod printer;
pub mod resolve;
pub mod semantic;
