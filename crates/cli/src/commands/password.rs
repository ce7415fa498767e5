//! Shared rep password hashing.

use std::io::{BufRead, Write};

use rep_portal::services::hash_password;

use super::CommandError;

/// Read one line from stdin and print its argon2 hash.
///
/// The value goes into `SALES_REP_PASSWORD_HASH`.
pub fn hash_from_stdin() -> Result<(), CommandError> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(CommandError::EmptyPassword);
    }

    let hash = hash_password(password)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{hash}")?;
    Ok(())
}
