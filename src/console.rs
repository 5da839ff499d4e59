//! Operator-facing console output on stderr.
//!
//! stdout carries the MCP protocol, so banners only ever go to stderr.
//! Coloring goes through `colored`; `set_color_enabled` pins it on or off so
//! the decision follows stderr rather than stdout.

use std::fmt::Display;
use std::io::IsTerminal;

use colored::Colorize;

pub fn red(text: &str) -> String {
    text.red().to_string()
}

pub fn green(text: &str) -> String {
    text.green().to_string()
}

pub fn yellow(text: &str) -> String {
    text.yellow().to_string()
}

pub fn blue(text: &str) -> String {
    text.blue().to_string()
}

/// Force coloring on or off for the whole process.
pub fn set_color_enabled(enabled: bool) {
    colored::control::set_override(enabled);
}

/// NO_COLOR disables color and a non-zero CLICOLOR_FORCE enables it.
/// Otherwise color follows whether stderr is a terminal.
pub fn stderr_supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0") {
        return true;
    }
    std::io::stderr().is_terminal()
}

pub fn startup_banner(server_name: &str) -> String {
    green(&format!("Whois MCP Server '{}' running on stdio", server_name))
}

pub fn tools_banner(names: &[&str]) -> String {
    blue(&format!("   tools: {}", names.join(", ")))
}

pub fn shutdown_banner() -> String {
    yellow("\nShutting down MCP server...")
}

pub fn startup_error_banner(error: &dyn Display) -> String {
    format!(
        "{}\n{}",
        red("\nError initializing Whois MCP server:\n"),
        yellow(&format!("   {}\n", error))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only ever forces coloring on, so concurrently running tests agree.
    fn colors_on() {
        set_color_enabled(true);
    }

    #[test]
    fn test_color_codes() {
        colors_on();
        assert_eq!(red("x"), "\x1b[31mx\x1b[0m");
        assert_eq!(green("x"), "\x1b[32mx\x1b[0m");
        assert_eq!(yellow("x"), "\x1b[33mx\x1b[0m");
        assert_eq!(blue("x"), "\x1b[34mx\x1b[0m");
    }

    #[test]
    fn test_tools_banner_lists_names() {
        colors_on();
        let banner = tools_banner(&["whois.domain", "whois.ip"]);
        assert!(banner.starts_with("\x1b[34m"));
        assert!(banner.contains("whois.domain, whois.ip"));
    }

    #[test]
    fn test_startup_error_banner() {
        colors_on();
        let banner = startup_error_banner(&"transport error: closed");
        assert!(banner.starts_with("\x1b[31m\nError initializing Whois MCP server:\n"));
        assert!(banner.contains("\x1b[33m   transport error: closed\n\x1b[0m"));
    }

    #[test]
    fn test_startup_banner_names_server() {
        colors_on();
        assert_eq!(
            startup_banner("whois"),
            "\x1b[32mWhois MCP Server 'whois' running on stdio\x1b[0m"
        );
    }
}
