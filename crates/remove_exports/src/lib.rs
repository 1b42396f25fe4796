pub mod ast;
pub mod config;
mod tree_shake;
mod utils;


use anyhow::Result;
use indexmap::IndexSet;
use tracing::debug;

pub use crate::ast::error::{GenerateError, ParseError};
pub use crate::config::{Config, ConfigError, Syntax};
use crate::ast::js_ast::JsAst;

/// Removes the exports named in `names` from an ecmascript module. A removed
/// `export` declaration goes with its name, and so does every declaration
/// that is no longer reachable afterwards. `names` may contain `"default"`;
/// names the module doesn't export are ignored.
///
/// ```
/// let code = r#"
/// const USER = 114514;
/// export const foo = () => USER;
/// export const bar = 1;
/// "#;
/// let output = remove_exports::remove_exports(code, &["foo", "bar"]).unwrap();
/// assert_eq!(output, "");
/// ```
pub fn remove_exports<S: AsRef<str>>(source: &str, names: &[S]) -> Result<String> {
    remove_exports_with_config(source, names, &Config::default())
}

/// Same as [`remove_exports`] with control over the accepted syntax and the
/// printed output.
pub fn remove_exports_with_config<S: AsRef<str>>(
    source: &str,
    names: &[S],
    config: &Config,
) -> Result<String> {
    let names = names
        .iter()
        .map(|name| name.as_ref().to_string())
        .collect::<IndexSet<_>>();
    debug!("remove exports {:?}", names);

    let mut ast = JsAst::build(source, config)?;
    tree_shake::shake(&mut ast.ast, &names);
    ast.generate()
}
