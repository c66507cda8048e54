//! AST module for predicate operands.

mod functor;
mod generator;

pub use functor::{BitwiseOp, Functor};
pub use generator::{Generator, Parameters};
