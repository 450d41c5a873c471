pub mod error;
pub mod parser;
pub mod ast;
pub mod statement;

pub mod prelude {
    pub use super::{
        error::*,
        parser::*,
        ast::*,
        statement::*
    };
}

#[cfg(test)]
mod tests;
