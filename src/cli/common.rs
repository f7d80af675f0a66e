//! Shared CLI helpers.

use std::io::{self, BufRead, IsTerminal};

use anyhow::{Context, Result};

/// Read a password/API key from stdin (hidden input on a terminal).
pub(crate) fn read_secret() -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        let secret = rpassword::read_password().with_context(|| "Failed to read secret input")?;
        return Ok(secret.trim().to_string());
    }
    read_secret_from(&mut stdin.lock())
}

/// Read one secret line from `reader`. A closed input counts as empty.
fn read_secret_from(reader: &mut impl BufRead) -> Result<String> {
    match rpassword::read_password_from_bufread(reader) {
        Ok(secret) => Ok(secret.trim().to_string()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(String::new()),
        Err(e) => Err(e).with_context(|| "Failed to read secret input"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_secret_strips_line_ending() {
        let mut input = Cursor::new(b"sk-test-key\r\n".to_vec());
        assert_eq!(read_secret_from(&mut input).unwrap(), "sk-test-key");
    }

    #[test]
    fn test_read_secret_closed_input_is_empty() {
        let mut input = Cursor::new(Vec::new());
        assert_eq!(read_secret_from(&mut input).unwrap(), "");
    }
}
