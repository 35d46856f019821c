//! User-facing console lines.
//! Prefixed status lines (`info:`, `warn:`, `error:`, `ok:`) are colored only on a TTY;
//! `print_user` writes bare lines meant for scripts.

use owo_colors::{OwoColorize, Style};

#[derive(Clone, Copy)]
enum Stream {
    Out,
    Err,
}

fn is_tty(stream: Stream) -> bool {
    match stream {
        Stream::Out => atty::is(atty::Stream::Stdout),
        Stream::Err => atty::is(atty::Stream::Stderr),
    }
}

fn prefixed(stream: Stream, prefix: &str, style: Style, msg: &str) {
    let line = if is_tty(stream) {
        format!("{} {}", prefix.style(style), msg)
    } else {
        format!("{prefix} {msg}")
    };
    match stream {
        Stream::Out => println!("{line}"),
        Stream::Err => eprintln!("{line}"),
    }
}

pub fn print_info(msg: &str) {
    prefixed(Stream::Out, "info:", Style::new().cyan().bold(), msg);
}

pub fn print_warn(msg: &str) {
    prefixed(Stream::Err, "warn:", Style::new().yellow().bold(), msg);
}

pub fn print_error(msg: &str) {
    prefixed(Stream::Err, "error:", Style::new().red().bold(), msg);
}

pub fn print_success(msg: &str) {
    prefixed(Stream::Out, "ok:", Style::new().green().bold(), msg);
}

/// Plain line on stdout (no prefix), e.g. dry-run candidates and the summary.
pub fn print_user(msg: &str) {
    println!("{msg}");
}
