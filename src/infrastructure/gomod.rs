//! Minimal `go.mod` reader.
//!
//! Only the `module` and `require` directives matter to the caller search;
//! the remaining directives are recognised and skipped so that a valid
//! descriptor never fails to load.

const SKIPPED_DIRECTIVES: &[&str] = &[
    "go", "toolchain", "godebug", "exclude", "replace", "retract", "tool", "ignore",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModFile {
    pub module: String,
    pub requires: Vec<String>,
}

/// Parse failure with the 1-based line it was detected on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for GoModError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

fn err(line: usize, message: impl Into<String>) -> GoModError {
    GoModError {
        line,
        message: message.into(),
    }
}

/// Drops a trailing `// comment` and surrounding whitespace.
fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(i) => line[..i].trim(),
        None => line.trim(),
    }
}

fn unquote(token: &str) -> &str {
    token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .or_else(|| token.strip_prefix('`').and_then(|t| t.strip_suffix('`')))
        .unwrap_or(token)
}

/// `path version` from one require entry.
fn require_entry(line_no: usize, body: &str) -> Result<String, GoModError> {
    let tokens: Vec<&str> = body.split_whitespace().collect();
    if tokens.len() != 2 {
        return Err(err(line_no, format!("usage: require module/path v1.2.3, got `{}`", body)));
    }
    Ok(unquote(tokens[0]).to_string())
}

fn set_module(module: &mut Option<String>, line_no: usize, body: &str) -> Result<(), GoModError> {
    if module.is_some() {
        return Err(err(line_no, "repeated module statement"));
    }
    let path = unquote(body);
    if path.is_empty() || path.contains(char::is_whitespace) {
        return Err(err(line_no, "usage: module module/path"));
    }
    *module = Some(path.to_string());
    Ok(())
}

impl GoModFile {
    pub fn parse(content: &str) -> Result<Self, GoModError> {
        let mut module: Option<String> = None;
        let mut requires = Vec::new();
        // Directive of the currently open `( ... )` block, with its opening line.
        let mut block: Option<(String, usize)> = None;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = strip_comment(raw);
            if line.is_empty() {
                continue;
            }

            if let Some((directive, _)) = &block {
                if line == ")" {
                    block = None;
                    continue;
                }
                match directive.as_str() {
                    "require" => requires.push(require_entry(line_no, line)?),
                    "module" => set_module(&mut module, line_no, line)?,
                    _ => {}
                }
                continue;
            }

            // `require (` and `require(` both open a block.
            let split = line
                .find(|c: char| c.is_whitespace() || c == '(')
                .unwrap_or(line.len());
            let (directive, rest) = (&line[..split], line[split..].trim());

            if rest == "(" {
                if directive != "module"
                    && directive != "require"
                    && !SKIPPED_DIRECTIVES.contains(&directive)
                {
                    return Err(err(line_no, format!("unknown directive: {}", directive)));
                }
                block = Some((directive.to_string(), line_no));
                continue;
            }

            match directive {
                "module" => set_module(&mut module, line_no, rest)?,
                "require" => requires.push(require_entry(line_no, rest)?),
                d if SKIPPED_DIRECTIVES.contains(&d) => {}
                d => return Err(err(line_no, format!("unknown directive: {}", d))),
            }
        }

        if let Some((directive, opened)) = block {
            return Err(err(opened, format!("unterminated {} block", directive)));
        }
        let module = module.ok_or_else(|| err(1, "no module directive found"))?;
        Ok(Self { module, requires })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let src = r#"
module example.com/app // the app

go 1.22

require example.com/lib v0.0.0

require (
	example.com/util v1.2.3
	"example.com/quoted" v1.0.0 // indirect
)

replace example.com/lib => ../lib
replace (
	example.com/util => ../util
)
"#;
        let gm = GoModFile::parse(src).unwrap();
        assert_eq!(gm.module, "example.com/app");
        assert_eq!(
            gm.requires,
            vec!["example.com/lib", "example.com/util", "example.com/quoted"]
        );
    }

    #[test]
    fn test_quoted_module() {
        let gm = GoModFile::parse("module \"example.com/q\"\n").unwrap();
        assert_eq!(gm.module, "example.com/q");
        assert!(gm.requires.is_empty());
    }

    #[test]
    fn test_missing_module() {
        let e = GoModFile::parse("go 1.22\n").unwrap_err();
        assert!(e.message.contains("no module directive"));
    }

    #[test]
    fn test_unknown_directive() {
        let e = GoModFile::parse("module a\nfrobnicate x\n").unwrap_err();
        assert_eq!(e.line, 2);
    }

    #[test]
    fn test_bad_require() {
        assert!(GoModFile::parse("module a\nrequire b\n").is_err());
        assert!(GoModFile::parse("module a\nrequire (\n\tb\n)\n").is_err());
    }

    #[test]
    fn test_unterminated_block() {
        let e = GoModFile::parse("module a\nrequire (\n\tb v1\n").unwrap_err();
        assert_eq!(e.line, 2);
        assert!(e.message.contains("unterminated"));
    }

    #[test]
    fn test_repeated_module() {
        assert!(GoModFile::parse("module a\nmodule b\n").is_err());
    }

    #[test]
    fn test_block_opened_without_space() {
        let gm = GoModFile::parse("module a\n\nrequire(\n\texample.com/b v1.0.0\n)\n").unwrap();
        assert_eq!(gm.requires, vec!["example.com/b"]);
    }

    #[test]
    fn test_module_block() {
        let gm = GoModFile::parse("module (\n\texample.com/blocky\n)\n\ngo 1.22\n").unwrap();
        assert_eq!(gm.module, "example.com/blocky");

        let gm = GoModFile::parse("module(\n\t\"example.com/q\"\n)\n").unwrap();
        assert_eq!(gm.module, "example.com/q");

        assert!(GoModFile::parse("module (\n\ta\n\tb\n)\n").is_err());
    }
}
