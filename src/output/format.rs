use crate::buildkite::Build;

/// Header messages are cut to this many characters to fit the menu bar.
const HEADER_MESSAGE_LIMIT: usize = 30;

/// The one line shown in the menu bar itself: truncated message plus the
/// build's icon and color attributes.
pub fn header_line(build: &Build) -> String {
    let message = collapse_newlines(build.message.as_deref().unwrap_or(""));
    let message = truncate(&message, HEADER_MESSAGE_LIMIT);
    with_attributes(&message, build, false)
}

/// A clickable dropdown entry: full message, icon, color, link.
pub fn menu_line(build: &Build) -> String {
    let message = collapse_newlines(build.message.as_deref().unwrap_or(""));
    with_attributes(&message, build, true)
}

// Attribute order is fixed (sfimage, sfcolor, href); the host parser is
// line-oriented and picky. A build with no attributes at all renders as the
// bare message.
fn with_attributes(message: &str, build: &Build, link: bool) -> String {
    let mut attributes = Vec::new();
    if let Some(icon) = &build.status_icon {
        attributes.push(format!("sfimage={icon}"));
    }
    if let Some(color) = &build.status_color {
        attributes.push(format!("sfcolor={color}"));
    }
    if link {
        attributes.push(format!("href={}", build.web_url));
    }

    if attributes.is_empty() {
        message.to_string()
    } else {
        format!("{message} | {}", attributes.join(" "))
    }
}

/// Replace every run of newline characters with a single space. Raw
/// newlines inside a commit message would split one menu entry into several.
fn collapse_newlines(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut in_newline_run = false;
    for c in message.chars() {
        if c == '\n' || c == '\r' {
            if !in_newline_run {
                out.push(' ');
                in_newline_run = true;
            }
        } else {
            out.push(c);
            in_newline_run = false;
        }
    }
    out
}

fn truncate(message: &str, limit: usize) -> String {
    message.chars().take(limit).collect()
}
