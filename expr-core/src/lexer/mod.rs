pub mod source;
pub mod token;
pub mod lexer;

pub mod prelude {
	pub use super::{
		source::*,
		token::*,
		lexer::*
	};
}
