//! Client-side query rendering: statement timeouts and `?` substitution.

use wmfdb_core::{Result, WmfdbError};

use crate::value::Value;

/// Pick the timeout for one query: an explicit one always wins, even
/// `0.0`, otherwise the cursor default applies.
pub fn resolve_timeout(default: Option<f64>, explicit: Option<f64>) -> Option<f64> {
    explicit.or(default)
}

/// Wrap `query` so the server aborts it after `timeout` seconds.
pub fn add_timeout(query: &str, timeout: Option<f64>) -> String {
    match timeout {
        None => query.to_string(),
        Some(t) => format!(
            "SET STATEMENT max_statement_time={} FOR {query}",
            format_timeout(t)
        ),
    }
}

// Whole numbers keep a trailing `.0` so the value always reads as a float.
fn format_timeout(t: f64) -> String {
    let s = t.to_string();
    if t.is_finite() && !s.contains('.') {
        format!("{s}.0")
    } else {
        s
    }
}

/// Substitute each `?` placeholder in `query` with the SQL literal of the
/// matching argument.
///
/// Question marks inside quoted strings or backtick-quoted identifiers are
/// left alone. The number of placeholders must match `args.len()`.
pub fn substitute(query: &str, args: &[Value]) -> Result<String> {
    let mut out = String::with_capacity(query.len());
    let mut args_iter = args.iter();
    let mut placeholders = 0_usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in query.chars() {
        if let Some(q) = quote {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' && q != '`' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '?' => {
                placeholders += 1;
                if let Some(arg) = args_iter.next() {
                    out.push_str(&arg.to_sql_literal()?);
                }
            }
            _ => out.push(c),
        }
    }

    if placeholders != args.len() {
        return Err(WmfdbError::value(format!(
            "Query has {placeholders} placeholder(s) but {} argument(s) were given",
            args.len()
        )));
    }
    Ok(out)
}

/// The exact text sent to the server for `query` with `args` and an
/// effective `timeout`.
pub fn mogrify(query: &str, args: &[Value], timeout: Option<f64>) -> Result<String> {
    Ok(add_timeout(&substitute(query, args)?, timeout))
}
