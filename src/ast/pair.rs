// r7rs 6.4. Pairs and lists

use either::Either;

use crate::source::SourceRange;

use super::context::ASTContext;
use super::node::{NodeId, NodeValue};

/// Project a datum into its pair fields, or hand the id back unchanged.
pub fn as_pair(ctx: &ASTContext, id: NodeId) -> Either<(NodeId, NodeId), NodeId> {
    match *ctx.node(id).value() {
        NodeValue::Pair { car, cdr } => Either::Left((car, cdr)),
        _ => Either::Right(id),
    }
}

/// True for `()` and for pairs, the two things a list can be.
pub fn is_list(ctx: &ASTContext, id: NodeId) -> bool {
    matches!(ctx.node(id).value(), NodeValue::Null | NodeValue::Pair { .. })
}

pub fn is_list_empty(ctx: &ASTContext, id: NodeId) -> bool {
    debug_assert!(is_list(ctx, id), "argument must be a list");
    matches!(ctx.node(id).value(), NodeValue::Null)
}

/// True iff the cdr chain terminates in `()`. The empty list is proper.
pub fn is_proper_list(ctx: &ASTContext, id: NodeId) -> bool {
    debug_assert!(is_list(ctx, id), "argument must be a list");
    let mut current = id;
    loop {
        match as_pair(ctx, current) {
            Either::Left((_, cdr)) => current = cdr,
            Either::Right(tail) => {
                return matches!(ctx.node(tail).value(), NodeValue::Null);
            }
        }
    }
}

/// The number of pairs in the chain; an improper tail is not counted.
pub fn list_size(ctx: &ASTContext, id: NodeId) -> usize {
    ListPairIter::new(ctx, id).count()
}

/// The car of a non-empty list.
pub fn list_head(ctx: &ASTContext, id: NodeId) -> NodeId {
    match *ctx.node(id).value() {
        NodeValue::Pair { car, .. } => car,
        _ => panic!("list must not be empty"),
    }
}

/// The cdr of a non-empty list.
pub fn list_tail(ctx: &ASTContext, id: NodeId) -> NodeId {
    match *ctx.node(id).value() {
        NodeValue::Pair { cdr, .. } => cdr,
        _ => panic!("list must not be empty"),
    }
}

/// Iterates the elements (cars) of a list. The tail of an improper list is
/// dropped.
pub struct ListIter<'a> {
    ctx: &'a ASTContext,
    next: Option<NodeId>,
}

impl<'a> ListIter<'a> {
    pub fn new(ctx: &'a ASTContext, list: NodeId) -> ListIter<'a> {
        debug_assert!(is_list(ctx, list), "argument must be a list");
        ListIter { ctx, next: Some(list) }
    }
}

impl<'a> Iterator for ListIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next.take()?;
        match as_pair(self.ctx, current) {
            Either::Left((car, cdr)) => {
                self.next = match as_pair(self.ctx, cdr) {
                    Either::Left(_) => Some(cdr),
                    Either::Right(_) => None, // improper tail dropped here
                };
                Some(car)
            }
            Either::Right(_) => None,
        }
    }
}

/// Iterates the pairs of a list's spine rather than the elements.
pub struct ListPairIter<'a> {
    ctx: &'a ASTContext,
    next: Option<NodeId>,
}

impl<'a> ListPairIter<'a> {
    pub fn new(ctx: &'a ASTContext, list: NodeId) -> ListPairIter<'a> {
        debug_assert!(is_list(ctx, list), "argument must be a list");
        ListPairIter { ctx, next: Some(list) }
    }
}

impl<'a> Iterator for ListPairIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next.take()?;
        match as_pair(self.ctx, current) {
            Either::Left((_, cdr)) => {
                if let Either::Left(_) = as_pair(self.ctx, cdr) {
                    self.next = Some(cdr);
                }
                Some(current)
            }
            Either::Right(_) => None,
        }
    }
}

/// Allocate a fresh pair. The range is left unset; parser-built pairs get
/// theirs back-patched, hand-built ones are only compared structurally.
pub fn cons(ctx: &mut ASTContext, car: NodeId, cdr: NodeId) -> NodeId {
    ctx.alloc_node(NodeValue::Pair { car, cdr }, SourceRange::INVALID)
}

/// Builds a proper list front to back, the way the parser grows its spines.
pub struct ListBuilder {
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

impl ListBuilder {
    pub fn new() -> ListBuilder {
        ListBuilder { head: None, tail: None }
    }

    pub fn append(&mut self, ctx: &mut ASTContext, node: NodeId) {
        let pair = ctx.alloc_node(
            NodeValue::Pair { car: node, cdr: NodeId::UNSET },
            SourceRange::INVALID,
        );
        match self.tail {
            Some(tail) => ctx.node_mut(tail).set_cdr(pair),
            None => self.head = Some(pair),
        }
        self.tail = Some(pair);
    }

    /// Terminate the list with `()` and fill in the pair ranges from their
    /// elements for consistency.
    pub fn finish(self, ctx: &mut ASTContext) -> NodeId {
        let terminator = ctx.alloc_node(NodeValue::Null, SourceRange::INVALID);
        let (head, tail) = match (self.head, self.tail) {
            (Some(head), Some(tail)) => (head, tail),
            _ => return terminator,
        };
        ctx.node_mut(tail).set_cdr(terminator);

        let end_loc = {
            let last = list_head(ctx, tail);
            ctx.node(last).range().end
        };
        let mut current = head;
        loop {
            let start_loc = {
                let car = list_head(ctx, current);
                ctx.node(car).range().start
            };
            let node = ctx.node_mut(current);
            node.set_start_loc(start_loc);
            node.set_end_loc(end_loc);
            if current == tail {
                break;
            }
            current = list_tail(ctx, current);
        }
        head
    }
}

impl Default for ListBuilder {
    fn default() -> ListBuilder {
        ListBuilder::new()
    }
}

/// Build a proper list out of the given nodes: `list!(ctx, a, b, c)`.
#[macro_export]
macro_rules! list {
    ($ctx:expr $(, $element:expr)* $(,)?) => {{
        let mut builder = $crate::ast::ListBuilder::new();
        $(
            let element = $element;
            builder.append($ctx, element);
        )*
        builder.finish($ctx)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::number::Number;
    use crate::list;

    fn num(ctx: &mut ASTContext, value: i64) -> NodeId {
        ctx.alloc_node(NodeValue::Number(Number::Exact(value)), SourceRange::INVALID)
    }

    #[test]
    fn empty_list_is_proper() {
        let mut ctx = ASTContext::new();
        let empty = list!(&mut ctx);
        assert!(is_list(&ctx, empty));
        assert!(is_list_empty(&ctx, empty));
        assert!(is_proper_list(&ctx, empty));
        assert_eq!(list_size(&ctx, empty), 0);
    }

    #[test]
    fn proper_list_shape() {
        let mut ctx = ASTContext::new();
        let one = num(&mut ctx, 1);
        let two = num(&mut ctx, 2);
        let three = num(&mut ctx, 3);
        let l = list!(&mut ctx, one, two, three);

        assert!(is_proper_list(&ctx, l));
        assert_eq!(list_size(&ctx, l), 3);
        assert_eq!(list_head(&ctx, l), one);
        let elements: Vec<NodeId> = ListIter::new(&ctx, l).collect();
        assert_eq!(elements, vec![one, two, three]);
        assert_eq!(ListPairIter::new(&ctx, l).count(), 3);
    }

    #[test]
    fn dotted_pair_shape() {
        let mut ctx = ASTContext::new();
        let one = num(&mut ctx, 1);
        let two = num(&mut ctx, 2);
        let pair = cons(&mut ctx, one, two);

        assert!(is_list(&ctx, pair));
        assert!(!is_proper_list(&ctx, pair));
        // The improper tail does not show up in iteration.
        let elements: Vec<NodeId> = ListIter::new(&ctx, pair).collect();
        assert_eq!(elements, vec![one]);
        assert_eq!(list_size(&ctx, pair), 1);
        assert_eq!(list_tail(&ctx, pair), two);
    }
}
