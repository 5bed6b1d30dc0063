//! Terminal rendering of answers, sources and transcripts.

use std::io::{self, Write};

use colored::{ColoredString, Colorize};

use assist_core::markdown;
use assist_core::reference::{self, EntityStyle, Reference};
use assist_core::session::Turn;

/// Prints a growing answer as normalized markdown.
///
/// Normalization never looks across a line break, so every completed line
/// can be printed as soon as it arrives.
pub struct StreamPrinter<W: Write> {
    out: W,
    printed: usize,
}

impl<W: Write> StreamPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, printed: 0 }
    }

    /// Prints the completed lines of `content` that were not printed yet.
    pub fn update(&mut self, content: &str) -> io::Result<()> {
        let Some(end) = content.rfind('\n').map(|index| index + 1) else {
            return Ok(());
        };
        if end <= self.printed {
            return Ok(());
        }

        write!(self.out, "{}", markdown::normalize(&content[self.printed..end]))?;
        self.printed = end;
        self.out.flush()
    }

    /// Prints the rest of the final answer and terminates it with a newline.
    pub fn finish(&mut self, content: &str) -> io::Result<()> {
        let rest = content.get(self.printed..).unwrap_or_default();
        let rendered = markdown::normalize(rest);
        write!(self.out, "{rendered}")?;
        if !content.is_empty() && !content.ends_with('\n') {
            writeln!(self.out)?;
        }
        self.printed = content.len();
        self.out.flush()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

/// Lists references with their badge and portal link.
pub fn write_sources<W: Write>(
    out: &mut W,
    references: &[Reference],
    base_url: &str,
) -> io::Result<()> {
    if references.is_empty() {
        return Ok(());
    }

    writeln!(out, "{}", "Sources:".bright_black())?;
    for (index, item) in references.iter().enumerate() {
        match reference::resolve(item) {
            Some(link) => writeln!(
                out,
                "  {}. {} {}  {}",
                index + 1,
                badge(item),
                item.title,
                link.absolute(base_url).underline()
            )?,
            None => writeln!(out, "  {}. {} {}", index + 1, badge(item), item.title)?,
        }
    }
    Ok(())
}

/// Prints committed turns, assistant answers normalized.
pub fn write_history<W: Write>(out: &mut W, turns: &[Turn]) -> io::Result<()> {
    for turn in turns {
        if turn.is_user() {
            writeln!(out, "{}", format!("> {}", turn.content).green())?;
            continue;
        }
        for line in markdown::normalize(&turn.content).lines() {
            writeln!(out, "{}", line.bright_blue())?;
        }
        if !turn.references.is_empty() {
            writeln!(
                out,
                "{}",
                format!("({} sources)", turn.references.len()).bright_black()
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn badge(item: &Reference) -> ColoredString {
    let style = reference::style(&item.entity_type).unwrap_or(EntityStyle::NEUTRAL);
    let label = if item.type_name.is_empty() {
        item.entity_type.as_str()
    } else {
        item.type_name.as_str()
    };
    let label = format!(" {label} ");

    match (hex_rgb(style.text), hex_rgb(style.background)) {
        (Some((r, g, b)), Some((br, bg, bb))) => label.truecolor(r, g, b).on_truecolor(br, bg, bb),
        _ => label.normal(),
    }
}

/// Parses `#rrggbb`.
fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    Some(((value >> 16) as u8, (value >> 8) as u8, value as u8))
}
