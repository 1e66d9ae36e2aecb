//! POSIX shell quoting for generated commands

/// Single-quote `raw` for a POSIX shell.
pub fn quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "'\\''"))
}

/// `raw` as one shell word, quoted only when it needs to be.
pub fn word(raw: &str) -> String {
    let plain = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=@%+,".contains(c));
    if plain {
        raw.to_string()
    } else {
        quote(raw)
    }
}
