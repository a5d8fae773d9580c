use std::rc::Rc;

use crate::ast::{ASTContext, NodeId, NodeValue};
use crate::source::{SourceBuffer, SourceLoc, SourceRange};

use super::error::SyntaxError;
use super::lexer::{Lexer, TokenKind};

/// Maximum allowed nesting level, to avoid unbounded recursion.
const MAX_NESTING: usize = 1024;

/// Parse the whole input into a sequence of top-level datums. Returns the
/// datums iff no error was emitted during the parse (or before it, if the
/// error limit was already reached).
pub fn parse_datums(ctx: &mut ASTContext, input: &Rc<SourceBuffer>) -> Option<Vec<NodeId>> {
    DatumParser::new(ctx, input).parse()
}

struct DatumParser<'a> {
    ctx: &'a mut ASTContext,
    lex: Lexer,
    /// Whether a fatal error has already been reported, so we shouldn't
    /// report any more.
    fatal: bool,
    /// Nesting level.
    nesting: usize,
}

impl<'a> DatumParser<'a> {
    fn new(ctx: &'a mut ASTContext, input: &Rc<SourceBuffer>) -> DatumParser<'a> {
        let mut lex = Lexer::new(ctx, input);
        lex.advance(ctx);
        DatumParser {
            ctx,
            lex,
            fatal: false,
            nesting: 0,
        }
    }

    fn parse(mut self) -> Option<Vec<NodeId>> {
        if self.ctx.sm.is_error_limit_reached() {
            return None;
        }

        // Remember how many errors we started with.
        let start_errors = self.ctx.sm.error_count();

        let mut datums = Vec::new();
        while let Some(datum) = self.parse_datum() {
            datums.push(datum);
        }

        // If errors occurred, the result cannot be trusted.
        if start_errors != self.ctx.sm.error_count() {
            return None;
        }

        Some(datums)
    }

    /// Bump the nesting level; on overflow report, go fatal, and refuse.
    /// Every successful call must be paired with a decrement.
    fn enter_nesting(&mut self) -> bool {
        self.nesting += 1;
        if self.nesting >= MAX_NESTING {
            let range = self.lex.token.range();
            self.lex
                .error(self.ctx, range, &SyntaxError::TooManyNestedExpressions);
            self.fatal = true;
            return false;
        }
        true
    }

    fn parse_datum(&mut self) -> Option<NodeId> {
        if !self.enter_nesting() {
            self.nesting -= 1;
            return None;
        }
        let result = self.parse_datum_inner();
        self.nesting -= 1;
        result
    }

    fn parse_datum_inner(&mut self) -> Option<NodeId> {
        loop {
            match self.lex.token.kind() {
                TokenKind::Eof => return None,

                TokenKind::DatumComment => {
                    self.lex.advance(self.ctx);
                    // Ignore the next datum.
                    self.parse_datum()?;
                    continue;
                }

                TokenKind::Number => {
                    let number = self.lex.token.number();
                    let range = self.lex.token.range();
                    let node = self.ctx.alloc_node(NodeValue::Number(number), range);
                    self.lex.advance(self.ctx);
                    return Some(node);
                }

                TokenKind::Identifier => {
                    let identifier = self.lex.token.identifier();
                    let range = self.lex.token.range();
                    let node = self.ctx.alloc_node(NodeValue::Symbol(identifier), range);
                    self.lex.advance(self.ctx);
                    return Some(node);
                }

                TokenKind::LParen => return self.parse_list(TokenKind::RParen),
                TokenKind::LSquare => return self.parse_list(TokenKind::RSquare),

                _ => {
                    let range = self.lex.token.range();
                    self.lex.error(self.ctx, range, &SyntaxError::UnexpectedToken);
                    self.lex.advance(self.ctx);
                    continue;
                }
            }
        }
    }

    /// Skip all datum comments and return true on a fatal error.
    fn skip_datum_comments(&mut self) -> bool {
        while self.lex.token.kind() == TokenKind::DatumComment {
            self.lex.advance(self.ctx);
            if self.parse_datum().is_none() {
                return self.fatal;
            }
        }
        false
    }

    fn parse_list(&mut self, closing: TokenKind) -> Option<NodeId> {
        if !self.enter_nesting() {
            self.nesting -= 1;
            return None;
        }
        let result = self.parse_list_inner(closing);
        self.nesting -= 1;
        result
    }

    fn parse_list_inner(&mut self, closing: TokenKind) -> Option<NodeId> {
        let start_loc = self.lex.token.start();
        self.lex.advance(self.ctx);

        if self.lex.token.kind() == closing {
            let range = SourceRange::new(start_loc, self.lex.token.end());
            let empty = self.ctx.alloc_node(NodeValue::Null, range);
            self.lex.advance(self.ctx);
            return Some(empty);
        }

        let datum = match self.parse_datum() {
            Some(datum) => datum,
            None => return self.report_unterminated(start_loc),
        };

        let head = self.ctx.alloc_node(
            NodeValue::Pair { car: datum, cdr: NodeId::UNSET },
            SourceRange::new(start_loc, SourceLoc::INVALID),
        );
        let mut tail = head;
        let mut dotted = false;

        if self.skip_datum_comments() {
            return None;
        }

        while self.lex.token.kind() != closing {
            if self.lex.token.kind() == TokenKind::Period {
                dotted = true;

                self.lex.advance(self.ctx);
                let datum = match self.parse_datum() {
                    Some(datum) => datum,
                    None => return self.report_unterminated(start_loc),
                };
                self.ctx.node_mut(tail).set_cdr(datum);

                if self.skip_datum_comments() {
                    return None;
                }

                if self.lex.token.kind() != closing {
                    let range = self.lex.token.range();
                    self.lex
                        .error(self.ctx, range, &SyntaxError::ListTerminatorExpected);
                    self.ctx.sm.note(start_loc, "list started here");
                    // Skip until the end of the list.
                    while self.lex.token.kind() != TokenKind::Eof
                        && self.lex.token.kind() != closing
                    {
                        if self.parse_datum().is_none() {
                            return None;
                        }
                    }
                }
                break;
            }

            let datum = match self.parse_datum() {
                Some(datum) => datum,
                None => return self.report_unterminated(start_loc),
            };
            let element_start = self.ctx.node(datum).range().start;
            let new_tail = self.ctx.alloc_node(
                NodeValue::Pair { car: datum, cdr: NodeId::UNSET },
                SourceRange::new(element_start, SourceLoc::INVALID),
            );
            self.ctx.node_mut(tail).set_cdr(new_tail);
            tail = new_tail;

            if self.skip_datum_comments() {
                return None;
            }
        }

        // If this wasn't a dotted list, we must allocate the terminating
        // Null node.
        if !dotted {
            let terminator = self
                .ctx
                .alloc_node(NodeValue::Null, self.lex.token.range());
            self.ctx.node_mut(tail).set_cdr(terminator);
        }

        // Now that we have reached the end of the list, set all end
        // locations along the spine.
        let end_loc = self.lex.token.end();
        let mut current = head;
        loop {
            self.ctx.node_mut(current).set_end_loc(end_loc);
            if current == tail {
                break;
            }
            current = match *self.ctx.node(current).value() {
                NodeValue::Pair { cdr, .. } => cdr,
                _ => unreachable!("list spine must be pairs"),
            };
        }

        self.lex.advance(self.ctx);
        Some(head)
    }

    fn report_unterminated(&mut self, start_loc: SourceLoc) -> Option<NodeId> {
        if !self.fatal {
            self.fatal = true;
            let range = self.lex.token.range();
            self.lex
                .error(self.ctx, range, &SyntaxError::UnterminatedList);
            self.ctx.sm.note(start_loc, "list started here");
        }
        None
    }
}
