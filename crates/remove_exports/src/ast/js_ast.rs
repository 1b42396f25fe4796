use std::fmt;

use anyhow::{anyhow, Result};
use swc_common::comments::{Comments, SingleThreadedComments};
use swc_common::sync::Lrc;
use swc_common::{FileName, SourceMap, Spanned};
use swc_ecma_ast::{EsVersion, Module};
use swc_ecma_codegen::text_writer::JsWriter;
use swc_ecma_codegen::{Config as JsCodegenConfig, Emitter};
use swc_ecma_parser::lexer::Lexer;
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use tracing::debug;

use crate::ast::error;
use crate::config::{self, Config};

pub struct JsAst {
    pub ast: Module,
    cm: Lrc<SourceMap>,
    comments: SingleThreadedComments,
    config: Config,
}

impl fmt::Debug for JsAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsAst({} items)", self.ast.body.len())
    }
}

impl JsAst {
    pub fn build(source: &str, config: &Config) -> Result<Self> {
        let cm: Lrc<SourceMap> = Default::default();
        let fm = cm.new_source_file(
            FileName::Custom(config.file_name().to_string()).into(),
            source.to_string(),
        );
        let comments = SingleThreadedComments::default();
        let syntax = match config.syntax {
            config::Syntax::Typescript => Syntax::Typescript(TsSyntax {
                tsx: config.jsx,
                decorators: config.decorators,
                ..Default::default()
            }),
            config::Syntax::Ecmascript => Syntax::Es(EsSyntax {
                jsx: config.jsx,
                decorators: config.decorators,
                decorators_before_export: true,
                ..Default::default()
            }),
        };
        let lexer = Lexer::new(
            syntax,
            EsVersion::EsNext,
            StringInput::from(&*fm),
            if config.comments {
                Some(&comments as &dyn Comments)
            } else {
                None
            },
        );
        let (result, mut ast_errors) = {
            let mut parser = Parser::new_from(lexer);
            let result = parser.parse_module();
            (result, parser.take_errors())
        };

        // recoverable errors are as fatal as the unrecoverable one
        let ast = match result {
            Ok(ast) => Some(ast),
            Err(err) => {
                ast_errors.push(err);
                None
            }
        };
        let ast = match ast {
            Some(ast) if ast_errors.is_empty() => ast,
            _ => {
                let messages = ast_errors
                    .iter()
                    .map(|err| error::code_frame(err.span(), &err.kind().msg(), &cm))
                    .collect::<Vec<String>>();
                debug!("parse failed with {} error(s)", messages.len());
                return Err(anyhow!(error::ParseError::JsParseError {
                    messages: messages.join("\n")
                }));
            }
        };

        debug!("parsed module with {} top-level statements", ast.body.len());
        Ok(JsAst {
            ast,
            cm,
            comments,
            config: config.clone(),
        })
    }

    pub fn generate(&self) -> Result<String> {
        let mut buf = vec![];
        {
            let mut emitter = Emitter {
                cfg: JsCodegenConfig::default()
                    .with_minify(self.config.minify)
                    .with_ascii_only(self.config.ascii_only),
                cm: self.cm.clone(),
                comments: if self.config.comments {
                    Some(&self.comments as &dyn Comments)
                } else {
                    None
                },
                wr: JsWriter::new(self.cm.clone(), "\n", &mut buf, None),
            };
            emitter.emit_module(&self.ast).map_err(|err| {
                anyhow!(error::GenerateError::JsGenerateError {
                    message: err.to_string()
                })
            })?;
        }

        let code = String::from_utf8(buf).map_err(|err| {
            anyhow!(error::GenerateError::JsGenerateError {
                message: err.to_string()
            })
        })?;
        Ok(code)
    }
}
