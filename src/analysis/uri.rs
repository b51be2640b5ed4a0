use crate::api::UriTemplate;
use crate::errors::{Result, TranslationError};

/// Converts a Spring URI template to a plain one, dropping the `:regex`
/// constraints of its variables.
///
/// Constraints may contain balanced braces and backslash escapes.
pub fn parse_spring_uri_template(template: &str) -> Result<UriTemplate> {
    let mut parser = TemplateParser {
        template,
        chars: template.char_indices().peekable(),
        result: String::with_capacity(template.len()),
    };
    parser.parse()?;
    Ok(UriTemplate::new(parser.result))
}

struct TemplateParser<'a> {
    template: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    result: String,
}

impl TemplateParser<'_> {
    fn parse(&mut self) -> Result<()> {
        while let Some(&(_, c)) = self.chars.peek() {
            if c == '{' {
                self.chars.next();
                self.read_variable()?;
            } else {
                self.result.push(c);
                self.chars.next();
            }
        }
        Ok(())
    }

    fn read_variable(&mut self) -> Result<()> {
        let start = self.chars.peek().map(|&(i, _)| i).unwrap_or(self.template.len());
        let mut brace_level = 0usize;

        while let Some((i, c)) = self.chars.next() {
            match c {
                '\\' => {
                    if self.chars.next().is_none() {
                        break;
                    }
                }
                '{' => brace_level += 1,
                '}' if brace_level == 0 => {
                    let variable = &self.template[start..i];
                    let name = variable.split(':').next().unwrap_or(variable);
                    self.result.push('{');
                    self.result.push_str(name);
                    self.result.push('}');
                    return Ok(());
                }
                '}' => brace_level -= 1,
                _ => {}
            }
        }

        Err(TranslationError::MalformedUriTemplate(self.template.to_string()))
    }
}
