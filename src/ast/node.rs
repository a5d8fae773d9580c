use crate::interner::Identifier;
use crate::source::{SourceLoc, SourceRange};

use super::context::ASTContext;
use super::number::Number;

/// A handle to a datum in the context's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Placeholder for a cdr that has not been linked yet. The parser patches
    /// every such slot before the owning pair escapes it.
    pub(crate) const UNSET: NodeId = NodeId(u32::MAX);
}

/// A datum. This corresponds to a value returned by Scheme's `read`
/// procedure, decorated with location information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeValue {
    Boolean(bool),
    Character(char),
    String(Identifier),
    Symbol(Identifier),
    Number(Number),
    /// The empty list `()`.
    Null,
    Pair { car: NodeId, cdr: NodeId },
    /// Reserved; the reader does not produce these yet.
    Bytevector,
    Vector,
}

#[derive(Debug, Clone, Copy)]
pub struct Node {
    value: NodeValue,
    range: SourceRange,
}

impl Node {
    pub(crate) fn new(value: NodeValue, range: SourceRange) -> Node {
        Node { value, range }
    }

    pub fn value(&self) -> &NodeValue {
        &self.value
    }

    pub fn range(&self) -> SourceRange {
        self.range
    }

    pub(crate) fn set_cdr(&mut self, new_cdr: NodeId) {
        match &mut self.value {
            NodeValue::Pair { cdr, .. } => *cdr = new_cdr,
            _ => panic!("set_cdr on a non-pair node"),
        }
    }

    pub(crate) fn set_start_loc(&mut self, loc: SourceLoc) {
        self.range.start = loc;
    }

    pub(crate) fn set_end_loc(&mut self, loc: SourceLoc) {
        self.range.end = loc;
    }
}

/// Structural equality of two datum trees, ignoring source ranges.
pub fn deep_equal(ctx: &ASTContext, a: NodeId, b: NodeId) -> bool {
    match (ctx.node(a).value(), ctx.node(b).value()) {
        (NodeValue::Boolean(a), NodeValue::Boolean(b)) => a == b,
        (NodeValue::Character(a), NodeValue::Character(b)) => a == b,
        (NodeValue::String(a), NodeValue::String(b)) => a == b,
        (NodeValue::Symbol(a), NodeValue::Symbol(b)) => a == b,
        (NodeValue::Number(a), NodeValue::Number(b)) => a.equals(b),
        (NodeValue::Null, NodeValue::Null) => true,
        (
            NodeValue::Pair { car: a_car, cdr: a_cdr },
            NodeValue::Pair { car: b_car, cdr: b_cdr },
        ) => deep_equal(ctx, *a_car, *b_car) && deep_equal(ctx, *a_cdr, *b_cdr),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::pair::cons;
    use crate::list;

    fn num(ctx: &mut ASTContext, value: i64) -> NodeId {
        ctx.alloc_node(NodeValue::Number(Number::Exact(value)), SourceRange::INVALID)
    }

    fn sym(ctx: &mut ASTContext, name: &str) -> NodeId {
        let identifier = ctx.string_table.get_identifier(name);
        ctx.alloc_node(NodeValue::Symbol(identifier), SourceRange::INVALID)
    }

    #[test]
    fn scalars_compare_by_payload() {
        let mut ctx = ASTContext::new();
        let a = sym(&mut ctx, "a");
        let a_again = sym(&mut ctx, "a");
        let b = sym(&mut ctx, "b");
        let one = num(&mut ctx, 1);
        let one_inexact =
            ctx.alloc_node(NodeValue::Number(Number::Inexact(1.0)), SourceRange::INVALID);
        assert!(deep_equal(&ctx, a, a_again));
        assert!(!deep_equal(&ctx, a, b));
        assert!(!deep_equal(&ctx, a, one));
        assert!(!deep_equal(&ctx, one, one_inexact));
    }

    #[test]
    fn trees_compare_recursively() {
        let mut ctx = ASTContext::new();
        let first = {
            let x = sym(&mut ctx, "x");
            let one = num(&mut ctx, 1);
            let inner = list!(&mut ctx, one);
            list!(&mut ctx, x, inner)
        };
        let second = {
            let x = sym(&mut ctx, "x");
            let one = num(&mut ctx, 1);
            let inner = list!(&mut ctx, one);
            list!(&mut ctx, x, inner)
        };
        assert!(deep_equal(&ctx, first, second));
        assert!(deep_equal(&ctx, second, first));

        let dotted = {
            let x = sym(&mut ctx, "x");
            let one = num(&mut ctx, 1);
            cons(&mut ctx, x, one)
        };
        assert!(!deep_equal(&ctx, first, dotted));
        assert!(deep_equal(&ctx, dotted, dotted));
    }
}
