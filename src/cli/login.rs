use crate::auth::AuthGate;
use anyhow::{Context, Result, bail};
use dialoguer::{Password, theme::ColorfulTheme};
use std::thread;
use std::time::Duration;

const MAX_ATTEMPTS: usize = 3;

pub fn run_login(gate: &AuthGate, passphrase: Option<String>) -> Result<()> {
    if gate.is_authenticated() {
        println!("Already logged in.");
        return Ok(());
    }

    if let Some(attempt) = passphrase {
        return finish_attempt(gate, &attempt).and_then(|granted| {
            if granted {
                Ok(())
            } else {
                bail!("Incorrect passphrase.")
            }
        });
    }

    println!("──────────────────────────────────────────");
    println!("  Social Media Performance Dashboard");
    println!("──────────────────────────────────────────");

    let theme = ColorfulTheme::default();

    for _ in 0..MAX_ATTEMPTS {
        let attempt = Password::with_theme(&theme)
            .with_prompt("  Enter passphrase")
            .interact()
            .context("Failed to read passphrase input")?;

        if finish_attempt(gate, &attempt)? {
            return Ok(());
        }

        println!("  ! Incorrect passphrase. Please try again.");
    }

    bail!("Too many incorrect passphrase attempts.")
}

fn finish_attempt(gate: &AuthGate, attempt: &str) -> Result<bool> {
    // Brief pause before answering, as the dashboard's gate does.
    thread::sleep(Duration::from_millis(500));

    let granted = gate.login(attempt)?;
    if granted {
        println!("  ✓ Access granted. Run `social-report summary` to view the report.");
    }

    Ok(granted)
}
