use std::process::Command;

use anyhow::{Context, Result};

const PACKAGE: &str = "costclose-common";

const FEATURE_COMBINATIONS: &[&[&str]] = &[
    &[], // default
    &["storage"],
    &["test-utils"],
    &["storage", "test-utils"],
];

/// Check that every supported feature combination of the common crate compiles.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} {PACKAGE} feature combinations...", FEATURE_COMBINATIONS.len());

    for (index, features) in FEATURE_COMBINATIONS.iter().enumerate() {
        let joined = features.join(",");
        let label = if features.is_empty() { "default".to_string() } else { joined.clone() };

        println!(
            "\n[{}/{}] cargo check -p {PACKAGE}{}",
            index + 1,
            FEATURE_COMBINATIONS.len(),
            if features.is_empty() { String::new() } else { format!(" --features {joined}") }
        );

        let mut command = Command::new("cargo");
        command.args(["check", "-p", PACKAGE]);
        if !features.is_empty() {
            command.args(["--features", joined.as_str()]);
        }

        let status = command
            .status()
            .with_context(|| format!("Failed to run cargo check for '{label}'"))?;

        if !status.success() {
            anyhow::bail!("Feature combination '{label}' failed to compile");
        }

        println!("✅ Features '{label}' compiled successfully");
    }

    println!("\n✅ All {} feature combinations compile successfully!", FEATURE_COMBINATIONS.len());
    Ok(())
}
