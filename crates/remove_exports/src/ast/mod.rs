pub mod error;
pub(crate) mod js_ast;
