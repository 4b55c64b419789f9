use thiserror::Error;

/// A classified input line.
///
/// Splitting is on arbitrary whitespace runs; there is no quoting. The
/// redirection and pipe operators are only recognized as standalone tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Blank line or `#` comment; nothing to execute.
    Empty,
    /// A single command with its arguments.
    Plain(Vec<String>),
    /// `argv > target`: command output redirected to a file.
    Redirect { argv: Vec<String>, target: String },
    /// `left | right`: one command's output piped into another's input.
    Pipe { left: Vec<String>, right: Vec<String> },
}

/// Reasons a line is rejected before anything is executed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    /// More than one `>`/`|` operator on the line. Chained pipelines and
    /// multiple redirections are out of scope.
    #[error("at most one `>` or `|` operator is supported per line")]
    UnsupportedSyntax,
    /// `>` must be followed by exactly one token naming the output file.
    #[error("expected a single file name after `>`")]
    MissingRedirectTarget,
    /// An operator with no command on one of its sides.
    #[error("missing command")]
    MissingCommand,
}

/// Split a raw line into tokens and decide how it should be executed.
///
/// Rejected lines never reach execution; the caller reports the error and
/// moves on to the next line.
pub fn classify(line: &str) -> Result<Line, ClassifyError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Line::Empty);
    }

    let tokens: Vec<String> = trimmed.split_whitespace().map(str::to_string).collect();

    let redirects = tokens.iter().filter(|t| *t == ">").count();
    let pipes = tokens.iter().filter(|t| *t == "|").count();
    if redirects + pipes >= 2 {
        return Err(ClassifyError::UnsupportedSyntax);
    }

    if let Some(at) = tokens.iter().position(|t| t == ">") {
        let argv = tokens[..at].to_vec();
        if argv.is_empty() {
            return Err(ClassifyError::MissingCommand);
        }
        match &tokens[at + 1..] {
            [target] => Ok(Line::Redirect {
                argv,
                target: target.clone(),
            }),
            _ => Err(ClassifyError::MissingRedirectTarget),
        }
    } else if let Some(at) = tokens.iter().position(|t| t == "|") {
        let left = tokens[..at].to_vec();
        let right = tokens[at + 1..].to_vec();
        if left.is_empty() || right.is_empty() {
            return Err(ClassifyError::MissingCommand);
        }
        Ok(Line::Pipe { left, right })
    } else {
        Ok(Line::Plain(tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_blank_and_comment_lines_are_empty() {
        assert_eq!(classify(""), Ok(Line::Empty));
        assert_eq!(classify("   \t  "), Ok(Line::Empty));
        assert_eq!(classify("# a comment"), Ok(Line::Empty));
        assert_eq!(classify("   # indented comment"), Ok(Line::Empty));
    }

    #[test]
    fn test_plain_command_splits_on_whitespace_runs() {
        assert_eq!(
            classify("echo   a \t b   c"),
            Ok(Line::Plain(argv(&["echo", "a", "b", "c"])))
        );
    }

    #[test]
    fn test_redirect_splits_at_operator() {
        assert_eq!(
            classify("echo hi > out.txt"),
            Ok(Line::Redirect {
                argv: argv(&["echo", "hi"]),
                target: "out.txt".to_string(),
            })
        );
    }

    #[test]
    fn test_pipe_splits_into_two_commands() {
        assert_eq!(
            classify("echo hi | cat"),
            Ok(Line::Pipe {
                left: argv(&["echo", "hi"]),
                right: argv(&["cat"]),
            })
        );
    }

    #[test]
    fn test_two_operators_are_rejected() {
        assert_eq!(classify("a > b > c"), Err(ClassifyError::UnsupportedSyntax));
        assert_eq!(classify("a | b | c"), Err(ClassifyError::UnsupportedSyntax));
        assert_eq!(classify("a > b | c"), Err(ClassifyError::UnsupportedSyntax));
        assert_eq!(classify("a | b > c"), Err(ClassifyError::UnsupportedSyntax));
    }

    #[test]
    fn test_operators_inside_tokens_are_not_operators() {
        // `a>b` is a single token, not a redirection.
        assert_eq!(classify("echo a>b"), Ok(Line::Plain(argv(&["echo", "a>b"]))));
    }

    #[test]
    fn test_redirect_needs_exactly_one_target() {
        assert_eq!(
            classify("echo hi >"),
            Err(ClassifyError::MissingRedirectTarget)
        );
        assert_eq!(
            classify("echo hi > a b"),
            Err(ClassifyError::MissingRedirectTarget)
        );
        assert_eq!(classify("> out.txt"), Err(ClassifyError::MissingCommand));
    }

    #[test]
    fn test_pipe_needs_both_sides() {
        assert_eq!(classify("echo hi |"), Err(ClassifyError::MissingCommand));
        assert_eq!(classify("| cat"), Err(ClassifyError::MissingCommand));
    }
}
