//! Terminal display for the chat client

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use hearth_client::{ChatSurface, FeedLine, FormLayout, Region};

/// Print the application banner
pub fn print_banner() {
    println!();
    println!("{}", "╔═══════════════════════════════════╗".cyan());
    println!("{}", "║          Hearth  Chat             ║".cyan());
    println!("{}", "╚═══════════════════════════════════╝".cyan());
    println!();
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg.green());
}

pub fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg.dimmed());
}

pub fn print_error(msg: &str) {
    println!("{} {}", "✗".red().bold(), msg.red());
}

/// Print the interactive command help
pub fn print_help() {
    println!();
    println!("{}", "Commands:".yellow().bold());
    println!("  {}   - Log in", "/login <email> <password>".cyan());
    println!(
        "  {} - Create an account",
        "/signup <email> <password> [name]".cyan()
    );
    println!(
        "  {} - Submit the form in its current mode",
        "/submit <email> <password> [name]".cyan()
    );
    println!("  {}                       - Toggle login / signup", "/mode".cyan());
    println!("  {}                     - Log out", "/logout".cyan());
    println!("  {}                       - Show this help", "/help".cyan());
    println!("  {}                       - Exit", "/quit".cyan());
    println!("  {}                   - Send a message", "<message>".cyan());
    println!();
}

fn local_time(ts: DateTime<Utc>) -> String {
    let local: DateTime<Local> = ts.into();
    local.format("%H:%M").to_string()
}

/// [`ChatSurface`] that prints to stdout
///
/// Every snapshot redraws the whole message list under a divider.
#[derive(Default)]
pub struct TerminalSurface {
    /// Serializes output from the feed task and the input loop
    out: Mutex<()>,
}

impl TerminalSurface {
    fn print(&self, f: impl FnOnce()) {
        let _guard = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f();
        let _ = io::stdout().flush();
    }
}

impl ChatSurface for TerminalSurface {
    fn show_region(&self, region: Region) {
        self.print(|| match region {
            Region::Login => print_info("Logged out. Use /login or /signup."),
            Region::Chat => print_success("Logged in. Type a message to send it."),
        });
    }

    fn set_form_layout(&self, layout: FormLayout) {
        self.print(|| {
            let name = if layout.display_name_visible {
                " (display name required)"
            } else {
                ""
            };
            print_info(&format!("Form mode: {}{}", layout.submit_label, name));
        });
    }

    fn clear_messages(&self) {
        self.print(|| println!("{}", "─".repeat(40).dimmed()));
    }

    fn append_message(&self, line: &FeedLine) {
        self.print(|| {
            println!(
                "{} {} {}",
                local_time(line.created_at).dimmed(),
                format!("{}:", line.author).cyan().bold(),
                line.text
            );
        });
    }

    fn scroll_to_latest(&self) {
        self.print(|| {});
    }

    fn alert(&self, message: &str) {
        self.print(|| println!("{} {}", "!".yellow().bold(), message.yellow()));
    }
}
