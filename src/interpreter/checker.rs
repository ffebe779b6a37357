use std::io::{self, Write};

use tracing::debug;

use crate::{
    error::{ParseError, SyntaxError},
    interpreter::{lexer::SourceLine, parser::core::ParseResult},
};

/// Checks the shape of every line before anything is parsed.
///
/// Each line is matched against the arity and literal rules of its keyword.
/// All offending lines are collected, so a single run reports every problem.
///
/// # Errors
/// Returns [`ParseError::Syntax`] holding one diagnostic per bad line.
///
/// # Example
/// ```
/// use sqbra::interpreter::{checker::check_syntax, lexer::tokenize};
///
/// let good = tokenize("cvar x 1\nloop x do [\n]").unwrap();
/// assert!(check_syntax(&good).is_ok());
///
/// let bad = tokenize("cvar x\nfrobnicate\nprint hello").unwrap();
/// let err = check_syntax(&bad).unwrap_err();
/// assert_eq!(err.to_string().lines().count(), 3);
/// ```
pub fn check_syntax(lines: &[SourceLine]) -> ParseResult<()> {
    let errors = diagnose(lines);
    debug!(lines = lines.len(), errors = errors.len(), "syntax check finished");
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ParseError::Syntax(errors))
    }
}

/// Runs the syntax check and writes a human-readable report.
///
/// The report starts with a banner, lists every diagnostic and ends with a
/// verdict line. Returns `true` when no errors were found.
///
/// # Errors
/// Returns the I/O error if writing the report fails.
pub fn write_report(lines: &[SourceLine], out: &mut impl Write) -> io::Result<bool> {
    let errors = diagnose(lines);
    writeln!(out, "SquareBracket Syntax Check")?;
    writeln!(out)?;
    for error in &errors {
        writeln!(out, "{error}")?;
    }
    if errors.is_empty() {
        writeln!(out, "Result: No errors were detected.")?;
    } else {
        writeln!(out)?;
        writeln!(out, "Result: Errors were detected.")?;
    }
    Ok(errors.is_empty())
}

fn diagnose(lines: &[SourceLine]) -> Vec<SyntaxError> {
    lines.iter()
         .filter_map(|line| {
             check_line(&line.tokens).err()
                                     .map(|message| SyntaxError::new(line.number, message))
         })
         .collect()
}

fn check_line(tokens: &[String]) -> Result<(), String> {
    let keyword = tokens.first().map_or("", String::as_str);
    match keyword {
        "print" | "printb" => check_literal_tail(tokens, 1, "print(b) [\"<text>\"]"),
        "input" => check_literal_tail(tokens, 2, "input <var> [\"<prompt>\"]"),
        "printv" => exact(tokens, 2, "printv <expression>"),
        "printm" => exact(tokens, 2, "printm <matrix>"),
        "loop" | "sloop" => check_block_opener(tokens, 1, "(s)loop <counter> (do) ["),
        "autoloop" => check_block_opener(tokens, 2, "autoloop <counter> <start> (do) ["),
        "while" => check_block_opener(tokens, 1, "while <condition> (do) ["),
        "if" | "elif" => check_block_opener(tokens, 1, "if/elif <condition> (do) ["),
        "else" => check_block_opener(tokens, 0, "else (do) ["),
        "funct" => check_block_opener(tokens, 1, "funct <name> (do) ["),
        "cvar" => exact(tokens, 3, "cvar <name> <value>"),
        "clist" => exact(tokens, 3, "clist <name> <length>"),
        "cmat" => exact(tokens, 4, "cmat <name> <rows> <columns>"),
        "mvar" => at_least(tokens, 3, "mvar <name> <name>... <value>"),
        "set" => exact(tokens, 3, "set <var> <value>"),
        "getl" => exact(tokens, 3, "getl <var> <list>"),
        "getdim" => exact(tokens, 4, "getdim <var> <var> <matrix>"),
        "inc" | "dec" => exact(tokens, 2, "inc/dec <var>"),
        "ceil" | "floor" | "abs" => exact(tokens, 2, "ceil/floor/abs <var>"),
        "round" => exact(tokens, 3, "round <var> <precision>"),
        "sin" | "cos" | "tan" | "csc" | "sec" | "cot" | "asin" | "acos" | "atan" => {
            exact(tokens, 3, "<function> <var> <value>")
        },
        "log" => exact(tokens, 4, "log <var> <value> <base>"),
        "xroot" => exact(tokens, 4, "xroot <var> <value> <degree>"),
        "random" => exact(tokens, 4, "random <var> <max> <min>"),
        "push" => exact(tokens, 3, "push <value> <list>"),
        "pop" => exact(tokens, 3, "pop <var> <list>"),
        "chsl" => exact(tokens, 3, "chsl <list> <length>"),
        "ldef" => check_sequence(tokens, "ldef <list> [<n>,<n>,...]"),
        "mdef" => check_sequence(tokens, "mdef <matrix> [[<n>,...],[<n>,...]]"),
        "readf" | "writef" => check_file(tokens),
        "call" => exact(tokens, 2, "call <name>"),
        "sleep" => exact(tokens, 2, "sleep <milliseconds>"),
        "exit" | "leave" | "newl" => exact(tokens, 1, "exit/leave/newl (no operands)"),
        "]" => exact(tokens, 1, "] (alone on its line)"),
        k if k.starts_with('#') => Ok(()),
        other => Err(format!("Unknown command ({other})")),
    }
}

fn exact(tokens: &[String], count: usize, usage: &str) -> Result<(), String> {
    if tokens.len() == count {
        Ok(())
    } else {
        Err(format!("Wrong number of operands (correct usage: {usage})"))
    }
}

fn at_least(tokens: &[String], count: usize, usage: &str) -> Result<(), String> {
    if tokens.len() >= count {
        Ok(())
    } else {
        Err(format!("Too few operands (correct usage: {usage})"))
    }
}

fn check_block_opener(tokens: &[String], operands: usize, usage: &str) -> Result<(), String> {
    let len = tokens.len();
    let opens = tokens.last().is_some_and(|t| t == "[");
    let plain = len == operands + 2;
    let with_do = len == operands + 3 && tokens[len - 2] == "do";
    if opens && (plain || with_do) {
        Ok(())
    } else {
        Err(format!("Malformed block opener (correct usage: {usage})"))
    }
}

fn check_literal_tail(tokens: &[String], start: usize, usage: &str) -> Result<(), String> {
    let Some(tail) = tokens.get(start..).filter(|t| !t.is_empty()) else {
        return Err(format!("Too few operands (correct usage: {usage})"));
    };
    let text = tail.join(" ");
    if text.len() >= 4 && text.starts_with("[\"") && text.ends_with("\"]") {
        Ok(())
    } else {
        Err(format!("Missing string literal (correct usage: {usage})"))
    }
}

fn check_sequence(tokens: &[String], usage: &str) -> Result<(), String> {
    exact(tokens, 3, usage)?;
    let literal = &tokens[2];
    if literal.starts_with('[') && literal.ends_with(']') {
        Ok(())
    } else {
        Err(format!("Literal must be enclosed in [ ] (correct usage: {usage})"))
    }
}

fn check_file(tokens: &[String]) -> Result<(), String> {
    let usage = "readf/writef <matrix> [\"<path>\"]";
    exact(tokens, 3, usage)?;
    check_literal_tail(tokens, 2, usage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::lexer::{repair, tokenize};

    fn errors(source: &str) -> Vec<SyntaxError> {
        let mut lines = tokenize(source).unwrap();
        repair(&mut lines);
        diagnose(&lines)
    }

    #[test]
    fn valid_program_passes() {
        let source = "\
# a comment line
cvar x 3
clist xs 2
loop x do [
    printv x
    newl
]
if (x = 0) [
    print [\"done\"]
]
else do [
    exit
]
mvar a b c 0
";
        assert!(errors(source).is_empty());
    }

    #[test]
    fn every_bad_line_is_reported() {
        let found = errors("cvar x\nset x 1 2\nprint\nbogus 1\n] ]");
        let lines: Vec<_> = found.iter().map(|e| e.line).collect();
        assert_eq!(lines, [1, 2, 3, 4, 5]);
        assert!(found[3].message.contains("Unknown command (bogus)"));
        assert!(found[0].message.contains("cvar <name> <value>"));
    }

    #[test]
    fn block_openers_need_a_bracket() {
        assert_eq!(errors("loop x do").len(), 1);
        assert_eq!(errors("loop x then [").len(), 1);
        assert_eq!(errors("autoloop i 3 [").len(), 0);
        assert_eq!(errors("else [").len(), 0);
        assert_eq!(errors("else do do [").len(), 1);
    }

    #[test]
    fn literals_are_checked() {
        assert_eq!(errors("ldef xs 1,2").len(), 1);
        assert_eq!(errors("ldef xs [1,2]").len(), 0);
        assert_eq!(errors("readf m data.csv").len(), 1);
        assert_eq!(errors("writef m [\"data.csv\"]").len(), 0);
        assert_eq!(errors("input x [\"Value: \"]").len(), 0);
        assert_eq!(errors("input x").len(), 1);
    }

    #[test]
    fn report_has_banner_and_verdict() {
        let lines = tokenize("newl\nfoo").unwrap();
        let mut out = Vec::new();
        let ok = write_report(&lines, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!ok);
        assert!(text.starts_with("SquareBracket Syntax Check"));
        assert!(text.contains("Syntax error on line 2"));
        assert!(text.trim_end().ends_with("Result: Errors were detected."));
    }
}
