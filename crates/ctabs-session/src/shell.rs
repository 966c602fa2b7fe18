#![forbid(unsafe_code)]

//! Double-quote shell words for a POSIX shell command line.

const SPECIAL: &[char] = &['"', '\\', '$', '`', '!'];

/// Wrap `word` in double quotes, backslash-escaping `"`, `\`, `$`, `` ` `` and `!`.
///
/// A missing word renders as the empty string rather than `""`.
///
/// ```
/// use ctabs_session::shell::quote_shell_word;
///
/// assert_eq!(quote_shell_word(Some("echo $HOME")), r#""echo \$HOME""#);
/// assert_eq!(quote_shell_word(None), "");
/// ```
#[must_use]
pub fn quote_shell_word(word: Option<&str>) -> String {
    let Some(word) = word else {
        return String::new();
    };
    let mut quoted = String::with_capacity(word.len() + 2);
    quoted.push('"');
    for c in word.chars() {
        if SPECIAL.contains(&c) {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Join `words` into one command line, quoting each.
#[must_use]
pub fn quote_command_line<'a>(words: impl IntoIterator<Item = &'a str>) -> String {
    words
        .into_iter()
        .map(|word| quote_shell_word(Some(word)))
        .collect::<Vec<_>>()
        .join(" ")
}
