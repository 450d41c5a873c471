pub mod environment;
pub mod function;
pub mod value;

pub mod prelude {
    pub use super::{
        environment::*,
        function::*,
        value::*
    };
}
