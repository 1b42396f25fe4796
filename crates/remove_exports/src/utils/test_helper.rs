use tracing_subscriber::{fmt, EnvFilter};

use crate::ast::js_ast::JsAst;
use crate::config::Config;

pub fn setup_logger() {
    let _result = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Prints `code` back through the same parser and codegen, so expected
/// output can be written without matching the printer's formatting by hand.
pub fn reprint(code: &str) -> String {
    reprint_with_config(code, &Config::default())
}

pub fn reprint_with_config(code: &str, config: &Config) -> String {
    JsAst::build(code, config).unwrap().generate().unwrap()
}
