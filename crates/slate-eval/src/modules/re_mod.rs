//! `re` module: regular expression matching backed by the `regex` crate.

use super::{expect_string, three_args, two_args, unknown_function};
use crate::error::{EvalError, EvalResult};
use crate::value::{Module, Value};
use regex::Regex;

pub fn call(function: &str, args: Vec<Value>) -> EvalResult<Value> {
    match function {
        "test" => {
            let [pattern, text] = two_args("test", args)?;
            let re = compile("test", &pattern)?;
            let text = expect_string("test", &text)?;
            Ok(Value::Bool(re.is_match(&text)))
        }
        "find" => {
            let [pattern, text] = two_args("find", args)?;
            let re = compile("find", &pattern)?;
            let text = expect_string("find", &text)?;
            Ok(match re.find(&text) {
                Some(m) => Value::Str(m.as_str().to_string()),
                None => Value::Nil,
            })
        }
        "find_all" => {
            let [pattern, text] = two_args("find_all", args)?;
            let re = compile("find_all", &pattern)?;
            let text = expect_string("find_all", &text)?;
            let matches = re
                .find_iter(&text)
                .map(|m| Value::Str(m.as_str().to_string()))
                .collect();
            Ok(Value::List(matches))
        }
        "replace" => {
            let [pattern, text, replacement] = three_args("replace", args)?;
            let re = compile("replace", &pattern)?;
            let text = expect_string("replace", &text)?;
            let replacement = expect_string("replace", &replacement)?;
            Ok(Value::Str(
                re.replace_all(&text, replacement.as_str()).into_owned(),
            ))
        }
        "split" => {
            let [pattern, text] = two_args("split", args)?;
            let re = compile("split", &pattern)?;
            let text = expect_string("split", &text)?;
            let parts = re
                .split(&text)
                .map(|p| Value::Str(p.to_string()))
                .collect();
            Ok(Value::List(parts))
        }
        _ => Err(unknown_function(Module::Re, function)),
    }
}

fn compile(name: &str, pattern: &Value) -> EvalResult<Regex> {
    let pattern = expect_string(name, pattern)?;
    Regex::new(&pattern)
        .map_err(|e| EvalError::ModuleError(format!("{name}(): invalid pattern: {e}")))
}
