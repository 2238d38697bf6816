//! Prints an argon2 hash for `FOLIO_ADMIN_PASSWORD_HASH`.

use std::io::{self, Write};

fn main() -> anyhow::Result<()> {
    eprint!("Enter password: ");
    io::stderr().flush()?;

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    let password = password.trim();

    if password.is_empty() {
        eprintln!("Password cannot be empty");
        std::process::exit(1);
    }

    let hash = folio_core::hash_password(password)?;
    println!("{hash}");
    Ok(())
}
