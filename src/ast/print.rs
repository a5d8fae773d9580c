use std::fmt::{self, Write};

use super::context::ASTContext;
use super::node::{NodeId, NodeValue};

/// Character names the printer spells out instead of the raw character.
const CHARACTER_NAMES: &[(char, &str)] = &[
    ('\u{00}', "null"),
    ('\u{07}', "alarm"),
    ('\u{08}', "backspace"),
    ('\t', "tab"),
    ('\n', "newline"),
    ('\r', "return"),
    ('\u{1b}', "escape"),
    (' ', "space"),
    ('\u{7f}', "delete"),
];

/// Render a datum for humans. `{}` on the result produces the tree layout
/// used by the golden tests: one element per line, four spaces per nesting
/// level, ` . tail` for improper tails.
pub fn pretty(ctx: &ASTContext, id: NodeId) -> PrettyDatum<'_> {
    PrettyDatum { ctx, id }
}

/// Render a datum followed by a newline.
pub fn dump(ctx: &ASTContext, id: NodeId) -> String {
    format!("{}\n", pretty(ctx, id))
}

pub struct PrettyDatum<'a> {
    ctx: &'a ASTContext,
    id: NodeId,
}

impl fmt::Display for PrettyDatum<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_datum(f, self.ctx, self.id, 0)
    }
}

fn write_datum(
    f: &mut fmt::Formatter<'_>,
    ctx: &ASTContext,
    id: NodeId,
    indent: usize,
) -> fmt::Result {
    match *ctx.node(id).value() {
        NodeValue::Boolean(value) => f.write_str(if value { "#t" } else { "#f" }),
        NodeValue::Character(ch) => write_character(f, ch),
        NodeValue::String(identifier) => write_string(f, ctx.string_table.name(identifier)),
        NodeValue::Symbol(identifier) => write_symbol(f, ctx.string_table.name(identifier)),
        NodeValue::Number(number) => write!(f, "{}", number),
        NodeValue::Null => f.write_str("()"),
        NodeValue::Pair { car, cdr } => write_pair(f, ctx, car, cdr, indent),
        NodeValue::Bytevector | NodeValue::Vector => {
            unreachable!("reader does not produce this kind")
        }
    }
}

fn write_indent(f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
    for _ in 0..indent {
        f.write_str("    ")?;
    }
    Ok(())
}

fn write_pair(
    f: &mut fmt::Formatter<'_>,
    ctx: &ASTContext,
    car: NodeId,
    cdr: NodeId,
    indent: usize,
) -> fmt::Result {
    f.write_str("(")?;
    write_datum(f, ctx, car, indent + 1)?;

    let mut rest = cdr;
    while let NodeValue::Pair { car, cdr } = *ctx.node(rest).value() {
        f.write_str("\n")?;
        write_indent(f, indent + 1)?;
        write_datum(f, ctx, car, indent + 1)?;
        rest = cdr;
    }

    if !matches!(ctx.node(rest).value(), NodeValue::Null) {
        f.write_str(" . ")?;
        write_datum(f, ctx, rest, indent + 1)?;
    }

    f.write_str(")")
}

fn write_character(f: &mut fmt::Formatter<'_>, ch: char) -> fmt::Result {
    f.write_str("#\\")?;
    if let Some((_, name)) = CHARACTER_NAMES.iter().find(|(c, _)| *c == ch) {
        return f.write_str(name);
    }
    let code = ch as u32;
    if code > 32 && code < 127 {
        f.write_char(ch)
    } else {
        write!(f, "0x{:x}", code)
    }
}

fn write_symbol(f: &mut fmt::Formatter<'_>, name: &[u8]) -> fmt::Result {
    let needs_escaping = name
        .iter()
        .any(|&b| b <= 32 || b >= 127 || b == b'|' || b == b'\\');
    if !needs_escaping {
        return f.write_str(&String::from_utf8_lossy(name));
    }

    f.write_char('|')?;
    for &b in name {
        match b {
            0x07 => f.write_str("\\a")?,
            0x08 => f.write_str("\\b")?,
            b'\t' => f.write_str("\\t")?,
            b'\n' => f.write_str("\\n")?,
            b'\r' => f.write_str("\\r")?,
            b'|' => f.write_str("\\|")?,
            b'\\' => f.write_str("\\\\")?,
            _ => {
                if b >= 32 && b < 127 {
                    f.write_char(b as char)?;
                } else {
                    write!(f, "0x{:x};", b)?;
                }
            }
        }
    }
    f.write_char('|')
}

fn write_string(f: &mut fmt::Formatter<'_>, contents: &[u8]) -> fmt::Result {
    f.write_char('"')?;
    for &b in contents {
        match b {
            b'"' => f.write_str("\\\"")?,
            b'\\' => f.write_str("\\\\")?,
            b'\t' => f.write_str("\\t")?,
            b'\n' => f.write_str("\\n")?,
            b'\r' => f.write_str("\\r")?,
            _ if b >= 32 && b < 127 => f.write_char(b as char)?,
            _ => write!(f, "\\x{:02x}", b)?,
        }
    }
    f.write_char('"')
}
