//! Command-line interface.
//!
//! Besides running the server, the binary can answer access questions
//! offline against the built-in menu catalog.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::access::{matches_pattern, path_to_access_key};
use crate::menu::{MenuCatalog, MenuNode};
use crate::models::hash_password;

/// Pagewarden kernel.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Print the menu visible to a set of access patterns.
    Menu {
        /// Granted access pattern; repeat or comma-separate for several.
        #[arg(long = "access", value_delimiter = ',')]
        access: Vec<String>,

        /// JSON file with extra menu definitions.
        #[arg(long)]
        menu_file: Option<PathBuf>,

        /// Print the filtered tree as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the access key for a path and whether the patterns allow it.
    Check {
        /// Path to navigate to, e.g. `/dashboard/home`.
        path: String,

        /// Granted access pattern; repeat or comma-separate for several.
        #[arg(long = "access", value_delimiter = ',')]
        access: Vec<String>,
    },

    /// Print an Argon2id hash for a directory seed file.
    HashPassword {
        password: String,
    },
}

/// Render the filtered menu for `access`.
pub fn cmd_menu(access: &[String], menu_file: Option<&PathBuf>, json: bool) -> Result<String> {
    let mut catalog = MenuCatalog::builtin();
    if let Some(path) = menu_file {
        catalog.extend_from_file(path)?;
    }

    let visible = catalog.visible_to(access);
    if json {
        return serde_json::to_string_pretty(&visible).context("failed to serialize menu");
    }

    if visible.is_empty() {
        return Ok("(no visible menus)".to_string());
    }

    let mut lines = Vec::new();
    for menu in &visible {
        tree_lines(&mut lines, menu, 0);
    }
    Ok(lines.join("\n"))
}

fn tree_lines(lines: &mut Vec<String>, node: &MenuNode, depth: usize) {
    lines.push(format!(
        "{:indent$}{} {} [{}]",
        "",
        node.title,
        node.path,
        node.access_key,
        indent = depth * 2
    ));
    for child in &node.children {
        tree_lines(lines, child, depth + 1);
    }
}

/// Describe the guard decision for `path` under `access`.
pub fn cmd_check(path: &str, access: &[String]) -> String {
    let key = path_to_access_key(path);
    let verdict = if matches_pattern(&key, access) {
        "allowed"
    } else {
        "denied"
    };
    format!("{path} -> {key:?}: {verdict}")
}

pub fn cmd_hash_password(password: &str) -> Result<String> {
    hash_password(password)
}
