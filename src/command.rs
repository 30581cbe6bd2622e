//! Helpers for the external speech commands configured by the user.

/// Substitute `{name}` placeholders in every argument. Single pass, so a
/// substituted value is never expanded again.
pub fn expand_args(argv: &[String], vars: &[(&str, &str)]) -> Vec<String> {
    argv.iter().map(|arg| expand(arg, vars)).collect()
}

fn expand(arg: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(arg.len());
    let mut rest = arg;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let value = tail.find('}').and_then(|close| {
            let name = &tail[1..close];
            vars.iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Split an expanded argv into program and arguments.
pub fn split_program(argv: Vec<String>) -> Option<(String, Vec<String>)> {
    let mut iter = argv.into_iter();
    let program = iter.next().filter(|p| !p.trim().is_empty())?;
    Some((program, iter.collect()))
}

/// First non-blank line of a command's stdout.
pub fn first_line(stdout: &[u8]) -> Option<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}
