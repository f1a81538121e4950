use ariadne::{Color, Fmt};
use std::env::consts;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHOR: &str = "Cyril John Magayaga";

const BUG_REPORTS: &str = "https://github.com/magayaga/xenly";

pub fn version_banner() -> String {
    format!("Xenly {} (Pre-alpha release)\n{}", VERSION, author())
}

pub fn dumpversion() -> String {
    VERSION.to_string()
}

pub fn author() -> String {
    format!("Copyright (c) 2023-2024 {}", AUTHOR.fg(Color::Blue))
}

pub fn help_text() -> String {
    let options = [
        ("-h, --help", "Display this information."),
        ("-v, --version", "Display version information."),
        ("-dv, --dumpversion", "Display the version number only."),
        ("-dm, --dumpmachine", "Display the target processor."),
        ("-os, --operatingsystem", "Display the operating system."),
        ("-p, --path", "Display the path to the xenly executable."),
        ("--author", "Display the author information."),
        ("--create-project <NAME>", "Create NAME_project/ with a main.xe."),
        ("--init", "Create xenly_project/ with a main.xe."),
        ("--max-depth <N>", "Limit expression nesting (default 256)."),
        ("-i, --interactive", "Start the interactive REPL."),
    ];

    let mut text = format!("Usage: xenly [options] [file]\n{}\n", "Options:".fg(Color::Cyan));
    for (flag, description) in options {
        text.push_str(&format!("  {:<28} {}\n", flag, description));
    }
    text.push_str(&format!("\nFor bug reporting instructions, please see:\n<{}>", BUG_REPORTS));
    text
}

/// Human-readable name of the operating system the binary was built for.
pub fn operating_system() -> &'static str {
    match consts::OS {
        "windows" => "Windows",
        "linux" => "Linux",
        "macos" => "macOS",
        "freebsd" => "FreeBSD",
        "dragonfly" => "DragonFlyBSD",
        "openbsd" => "OpenBSD",
        "netbsd" => "NetBSD",
        "android" => "Android",
        "ios" => "iOS",
        "solaris" | "illumos" => "Solaris",
        _ => "Unknown",
    }
}

pub fn machine() -> &'static str {
    consts::ARCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_every_flag() {
        let help = help_text();
        for flag in ["--dumpversion", "--dumpmachine", "--operatingsystem", "--create-project", "--init"] {
            assert!(help.contains(flag), "missing {}", flag);
        }
    }

    #[test]
    fn operating_system_is_named() {
        assert!(!operating_system().is_empty());
        assert_eq!(dumpversion(), VERSION);
    }
}
