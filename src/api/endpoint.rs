//! Endpoint templates
//!
//! Operations declare their path as a template such as `stacks/{stack_id}/`.
//! At call time the template is expanded with the call's arguments:
//!
//! ```
//! use stackdio::api::endpoint::PathArgs;
//!
//! let path = PathArgs::new()
//!     .arg("stack_id", 42)
//!     .resolve("stacks/{stack_id}/hosts/")
//!     .unwrap();
//! assert_eq!(path, "stacks/42/hosts/");
//! ```

use super::error::{Error, Result};

/// Named arguments used to fill an endpoint template
#[derive(Debug, Clone, Default)]
pub struct PathArgs {
    args: Vec<(&'static str, String)>,
}

impl PathArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named argument. A later argument with the same name wins.
    pub fn arg(mut self, name: &'static str, value: impl ToString) -> Self {
        self.args.push((name, value.to_string()));
        self
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .rev()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Expand `template`, percent-encoding every substituted value.
    ///
    /// Literal text between placeholders (slashes, dots) is copied as is.
    pub fn resolve(&self, template: &str) -> Result<String> {
        let mut path = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            let literal = &rest[..open];
            if literal.contains('}') {
                return Err(Error::template(template, "unmatched '}'"));
            }
            path.push_str(literal);
            let after = &rest[open + 1..];

            let Some(close) = after.find('}') else {
                return Err(Error::template(template, "unterminated placeholder"));
            };

            let name = &after[..close];
            if name.is_empty() || name.contains('{') {
                return Err(Error::template(template, "malformed placeholder"));
            }

            let Some(value) = self.get(name) else {
                return Err(Error::template(
                    template,
                    format!("missing argument '{}'", name),
                ));
            };

            path.push_str(&urlencoding::encode(value));
            rest = &after[close + 1..];
        }

        if rest.contains('}') {
            return Err(Error::template(template, "unmatched '}'"));
        }
        path.push_str(rest);

        Ok(path)
    }
}

/// Names of all placeholders in a template, in order of appearance
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        names.push(&after[..close]);
        rest = &after[close + 1..];
    }

    names
}
