use std::mem;

use crate::{
    ast::{
        ArithmeticOp, AttributePath, ComparisonOp, DistanceOp, Expr, FunctionOp, Keyword, Literal,
        Position, Predicate, Span, SpannedToken, SpatialOp, TemporalBound, TemporalOperand,
        TemporalPredicate, Token,
    },
    config::DEFAULT_MAX_DEPTH,
    dialect::Dialect,
    error::CqlError,
    lexer::Lexer,
};

/// Result of parsing something that may turn out to be either a predicate
/// or an expression, e.g. the contents of `( ... )` at predicate start.
enum Parsed {
    Predicate(Predicate),
    Expr(Expr),
}

enum Operator {
    Arithmetic(ArithmeticOp),
    Function(FunctionOp),
}

/// Recursive-descent parser for CQL and ECQL.
///
/// One instance parses one input; the dialect comes from the lexer.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: SpannedToken,
    previous_end: Position,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self, CqlError> {
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            previous_end: Position::start(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn dialect(&self) -> &'static Dialect {
        self.lexer.dialect()
    }

    fn source(&self) -> &'a str {
        self.lexer.source()
    }

    fn advance(&mut self) -> Result<SpannedToken, CqlError> {
        let next = self.lexer.next_token()?;
        let consumed = mem::replace(&mut self.current, next);
        self.previous_end = consumed.span.end;
        Ok(consumed)
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current.token) == mem::discriminant(token)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current.token.is_keyword(keyword)
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> Result<bool, CqlError> {
        if self.check_keyword(keyword) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, expected: Token) -> Result<SpannedToken, CqlError> {
        if !self.check(&expected) {
            return Err(self.error(format!("expected '{}'", expected)));
        }
        self.advance()
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<SpannedToken, CqlError> {
        if !self.check_keyword(keyword) {
            return Err(self.error(format!("expected {}", keyword)));
        }
        self.advance()
    }

    fn expect_end(&mut self) -> Result<(), CqlError> {
        if self.check(&Token::Eof) {
            Ok(())
        } else {
            Err(self.error(format!("unexpected '{}'", self.current.token)))
        }
    }

    /// Syntax error at the current token.
    fn error(&self, message: impl Into<String>) -> CqlError {
        CqlError::Syntax {
            message: message.into(),
            fragment: self.current.token.to_string(),
            position: self.current.span.start,
        }
    }

    fn error_at(&self, message: impl Into<String>, span: Span) -> CqlError {
        CqlError::Syntax {
            message: message.into(),
            fragment: span.slice(self.source()).to_string(),
            position: span.start,
        }
    }

    fn span_from(&self, start: Span) -> Span {
        Span::new(start.start, self.previous_end.max(start.end))
    }

    fn enter(&mut self) -> Result<(), CqlError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.error(format!("nesting deeper than {} levels", self.max_depth)));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn at_group_open(&self) -> bool {
        self.check(&Token::LParen) || (self.dialect().bracket_grouping && self.check(&Token::LBracket))
    }

    /// Consumes the delimiter that closes `open`.
    fn close_group(&mut self, open: &Token) -> Result<(), CqlError> {
        let expected = if *open == Token::LBracket {
            Token::RBracket
        } else {
            Token::RParen
        };
        if self.check(&expected) {
            self.advance()?;
            return Ok(());
        }
        if self.check(&Token::RParen) || self.check(&Token::RBracket) {
            return Err(self.error(format!(
                "mismatched grouping delimiter: '{}' closed by '{}'",
                open, self.current.token
            )));
        }
        Err(self.error(format!("expected '{}'", expected)))
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Parses the whole input as a single predicate.
    pub fn parse_filter(&mut self) -> Result<Predicate, CqlError> {
        let predicate = self.parse_or()?;
        self.expect_end()?;
        Ok(predicate)
    }

    /// Parses the whole input as a single arithmetic expression.
    pub fn parse_expression(&mut self) -> Result<Expr, CqlError> {
        let expr = self.parse_additive()?;
        self.expect_end()?;
        Ok(expr)
    }

    /// Parses `;`-separated predicates; an empty element is `INCLUDE`.
    pub fn parse_filter_list(&mut self) -> Result<Vec<Predicate>, CqlError> {
        let mut predicates = Vec::new();
        loop {
            if self.check(&Token::Semicolon) || self.check(&Token::Eof) {
                let here = self.current.span.start;
                predicates.push(Predicate::Include(Span::new(here, here)));
            } else {
                predicates.push(self.parse_or()?);
            }

            if self.check(&Token::Semicolon) {
                self.advance()?;
                continue;
            }
            self.expect_end()?;
            return Ok(predicates);
        }
    }

    // ========================================================================
    // Boolean layers
    // ========================================================================

    fn parse_or(&mut self) -> Result<Predicate, CqlError> {
        let parsed = self.parse_mixed_or()?;
        self.require_predicate(parsed)
    }

    fn parse_and(&mut self) -> Result<Predicate, CqlError> {
        let parsed = self.parse_mixed_and()?;
        self.require_predicate(parsed)
    }

    fn parse_factor(&mut self) -> Result<Predicate, CqlError> {
        let parsed = self.parse_mixed_not()?;
        self.require_predicate(parsed)
    }

    fn parse_mixed_or(&mut self) -> Result<Parsed, CqlError> {
        let first = self.parse_mixed_and()?;
        if !self.check_keyword(Keyword::Or) {
            return Ok(first);
        }

        let first = self.require_predicate(first)?;
        let start = first.span();
        let mut operands = vec![first];
        while self.eat_keyword(Keyword::Or)? {
            operands.push(self.parse_and()?);
        }
        Ok(Parsed::Predicate(Predicate::Or {
            operands,
            span: self.span_from(start),
        }))
    }

    fn parse_mixed_and(&mut self) -> Result<Parsed, CqlError> {
        let first = self.parse_mixed_not()?;
        if !self.check_keyword(Keyword::And) {
            return Ok(first);
        }

        let first = self.require_predicate(first)?;
        let start = first.span();
        let mut operands = vec![first];
        while self.eat_keyword(Keyword::And)? {
            operands.push(self.parse_factor()?);
        }
        Ok(Parsed::Predicate(Predicate::And {
            operands,
            span: self.span_from(start),
        }))
    }

    fn parse_mixed_not(&mut self) -> Result<Parsed, CqlError> {
        if !self.check_keyword(Keyword::Not) {
            return self.parse_mixed_primary();
        }

        let start = self.current.span;
        self.enter()?;
        self.advance()?;
        let operand = self.parse_factor()?;
        self.leave();
        Ok(Parsed::Predicate(Predicate::Not {
            operand: Box::new(operand),
            span: self.span_from(start),
        }))
    }

    fn parse_mixed_primary(&mut self) -> Result<Parsed, CqlError> {
        let start = self.current.span;
        match &self.current.token {
            Token::Keyword(Keyword::Include) => {
                self.advance()?;
                return Ok(Parsed::Predicate(Predicate::Include(start)));
            }
            Token::Keyword(Keyword::Exclude) => {
                self.advance()?;
                return Ok(Parsed::Predicate(Predicate::Exclude(start)));
            }
            Token::Keyword(Keyword::In) => {
                return Ok(Parsed::Predicate(self.parse_id_predicate()?));
            }
            Token::Keyword(keyword) if keyword.is_spatial_operator() => {
                let keyword = *keyword;
                return Ok(Parsed::Predicate(self.parse_spatial_predicate(keyword)?));
            }
            _ => {}
        }

        if !self.at_group_open() {
            let expr = self.parse_additive()?;
            return self.maybe_predicate_tail(expr);
        }

        self.enter()?;
        let open = self.advance()?.token;
        let inner = self.parse_mixed_or()?;
        self.close_group(&open)?;
        self.leave();

        match inner {
            Parsed::Predicate(predicate) => Ok(Parsed::Predicate(predicate)),
            Parsed::Expr(expr) => {
                // `(a + b) * 2 > 3`: the group was the first operand of a longer expression
                let expr = self.parse_multiplicative_tail(expr)?;
                let expr = self.parse_additive_tail(expr)?;
                self.maybe_predicate_tail(expr)
            }
        }
    }

    /// Turns a parsed fragment into a predicate, accepting bare boolean
    /// expressions where the dialect allows them.
    fn require_predicate(&self, parsed: Parsed) -> Result<Predicate, CqlError> {
        let expr = match parsed {
            Parsed::Predicate(predicate) => return Ok(predicate),
            Parsed::Expr(expr) => expr,
        };

        if self.dialect().expression_predicates && expr.is_boolean_candidate() {
            let span = expr.span();
            return Ok(Predicate::Expression { expr, span });
        }

        let at_boundary = matches!(
            self.current.token,
            Token::Eof
                | Token::RParen
                | Token::RBracket
                | Token::Semicolon
                | Token::Keyword(Keyword::And | Keyword::Or)
        );
        if at_boundary {
            Err(self.error_at("expected a predicate, found an expression", expr.span()))
        } else {
            Err(self.error(format!("unexpected '{}'", self.current.token)))
        }
    }

    // ========================================================================
    // Predicates
    // ========================================================================

    fn at_predicate_operator(&self) -> bool {
        matches!(
            self.current.token,
            Token::Eq
                | Token::NotEq
                | Token::Lt
                | Token::LtEq
                | Token::Gt
                | Token::GtEq
                | Token::Keyword(
                    Keyword::Not
                        | Keyword::Between
                        | Keyword::Like
                        | Keyword::ILike
                        | Keyword::Is
                        | Keyword::In
                        | Keyword::Exists
                        | Keyword::DoesNotExist
                        | Keyword::Before
                        | Keyword::After
                        | Keyword::During
                        | Keyword::TEquals
                )
        )
    }

    fn maybe_predicate_tail(&mut self, expr: Expr) -> Result<Parsed, CqlError> {
        if self.at_predicate_operator() {
            Ok(Parsed::Predicate(self.parse_predicate_tail(expr)?))
        } else {
            Ok(Parsed::Expr(expr))
        }
    }

    /// Everything that can follow the left operand of a predicate.
    fn parse_predicate_tail(&mut self, left: Expr) -> Result<Predicate, CqlError> {
        let start = left.span();

        let comparison = match self.current.token {
            Token::Eq => Some(ComparisonOp::Equal),
            Token::NotEq => Some(ComparisonOp::NotEqual),
            Token::Lt => Some(ComparisonOp::LessThan),
            Token::LtEq => Some(ComparisonOp::LessEqual),
            Token::Gt => Some(ComparisonOp::GreaterThan),
            Token::GtEq => Some(ComparisonOp::GreaterEqual),
            _ => None,
        };
        if let Some(op) = comparison {
            self.advance()?;
            let right = self.parse_additive()?;
            return Ok(Predicate::Comparison {
                op,
                left,
                right,
                span: self.span_from(start),
            });
        }

        let negated = self.eat_keyword(Keyword::Not)?;
        let keyword = match self.current.token {
            Token::Keyword(keyword) => keyword,
            _ => return Err(self.error("expected a predicate operator")),
        };

        match keyword {
            Keyword::Between => {
                self.advance()?;
                let low = self.parse_additive()?;
                self.expect_keyword(Keyword::And)?;
                let high = self.parse_additive()?;
                Ok(Predicate::Between {
                    expr: left,
                    low,
                    high,
                    negated,
                    span: self.span_from(start),
                })
            }
            Keyword::Like | Keyword::ILike => {
                self.advance()?;
                let pattern = match &self.current.token {
                    Token::String(pattern) => pattern.clone(),
                    _ => return Err(self.error(format!("{} expects a string pattern", keyword))),
                };
                self.advance()?;
                Ok(Predicate::Like {
                    expr: left,
                    pattern,
                    negated,
                    case_insensitive: keyword == Keyword::ILike,
                    span: self.span_from(start),
                })
            }
            Keyword::In => {
                self.advance()?;
                let values = self.parse_parenthesized_list()?;
                Ok(Predicate::In {
                    expr: left,
                    values,
                    negated,
                    span: self.span_from(start),
                })
            }
            Keyword::Is if !negated => {
                self.advance()?;
                let negated = self.eat_keyword(Keyword::Not)?;
                self.expect_keyword(Keyword::Null)?;
                Ok(Predicate::IsNull {
                    expr: left,
                    negated,
                    span: self.span_from(start),
                })
            }
            Keyword::Exists | Keyword::DoesNotExist if !negated => {
                if left.as_attribute().is_none() {
                    return Err(self.error_at(format!("{} requires an attribute", keyword), start));
                }
                self.advance()?;
                Ok(Predicate::Exists {
                    attribute: left,
                    negated: keyword == Keyword::DoesNotExist,
                    span: self.span_from(start),
                })
            }
            Keyword::Before | Keyword::After | Keyword::During | Keyword::TEquals if !negated => {
                self.parse_temporal_predicate(left, keyword)
            }
            _ if negated => Err(self.error("expected BETWEEN, LIKE or IN after NOT")),
            _ => Err(self.error("expected a predicate operator")),
        }
    }

    fn parse_parenthesized_list(&mut self) -> Result<Vec<Expr>, CqlError> {
        self.expect(Token::LParen)?;
        let mut values = vec![self.parse_additive()?];
        while self.check(&Token::Comma) {
            self.advance()?;
            values.push(self.parse_additive()?);
        }
        self.expect(Token::RParen)?;
        Ok(values)
    }

    /// `IN ('id1', 'id2')` in predicate position.
    fn parse_id_predicate(&mut self) -> Result<Predicate, CqlError> {
        let start = self.current.span;
        self.advance()?;
        let ids = self.parse_parenthesized_list()?;
        Ok(Predicate::Id {
            ids,
            span: self.span_from(start),
        })
    }

    fn parse_temporal_predicate(
        &mut self,
        property: Expr,
        keyword: Keyword,
    ) -> Result<Predicate, CqlError> {
        let start = property.span();
        if property.as_attribute().is_none() {
            return Err(self.error_at(format!("{} requires an attribute", keyword), start));
        }
        self.advance()?;

        let compound = matches!(keyword, Keyword::Before | Keyword::During)
            && self.check_keyword(Keyword::Or);
        let op = match keyword {
            Keyword::Before if compound => {
                self.advance()?;
                self.expect_keyword(Keyword::During)?;
                TemporalPredicate::BeforeOrDuring
            }
            Keyword::During if compound => {
                self.advance()?;
                self.expect_keyword(Keyword::After)?;
                TemporalPredicate::DuringOrAfter
            }
            Keyword::Before => TemporalPredicate::Before,
            Keyword::After => TemporalPredicate::After,
            Keyword::During => TemporalPredicate::During,
            _ => TemporalPredicate::TEquals,
        };

        let operand_start = self.current.span;
        let first = self.parse_temporal_bound()?;
        let operand = if self.check(&Token::Slash) {
            self.advance()?;
            let second = self.parse_temporal_bound()?;
            if matches!(first, TemporalBound::Duration { .. })
                && matches!(second, TemporalBound::Duration { .. })
            {
                return Err(self.error_at(
                    "a period needs at least one date-time bound",
                    self.span_from(operand_start),
                ));
            }
            TemporalOperand::Period(first, second)
        } else {
            if let TemporalBound::Duration { span, .. } = &first {
                return Err(self.error_at("a duration is only valid as a period bound", *span));
            }
            TemporalOperand::Instant(first)
        };

        let needs_period = matches!(
            op,
            TemporalPredicate::During
                | TemporalPredicate::BeforeOrDuring
                | TemporalPredicate::DuringOrAfter
        );
        let operand_span = self.span_from(operand_start);
        match (&operand, needs_period, op) {
            (TemporalOperand::Instant(_), true, _) => {
                return Err(self.error_at("this temporal operator requires a period", operand_span));
            }
            (TemporalOperand::Period(..), _, TemporalPredicate::TEquals) => {
                return Err(self.error_at("TEQUALS requires a single instant", operand_span));
            }
            _ => {}
        }

        Ok(Predicate::Temporal {
            op,
            property,
            operand,
            span: self.span_from(start),
        })
    }

    fn parse_temporal_bound(&mut self) -> Result<TemporalBound, CqlError> {
        let span = self.current.span;
        let bound = match &self.current.token {
            Token::DateTime(text) => TemporalBound::DateTime {
                text: text.clone(),
                span,
            },
            Token::Date(text) => TemporalBound::Date {
                text: text.clone(),
                span,
            },
            Token::Duration(text) => TemporalBound::Duration {
                text: text.clone(),
                span,
            },
            _ => return Err(self.error("expected a date-time or a duration")),
        };
        self.advance()?;
        Ok(bound)
    }

    fn parse_spatial_predicate(&mut self, keyword: Keyword) -> Result<Predicate, CqlError> {
        let start = self.current.span;
        self.enter()?;
        self.advance()?;
        self.expect(Token::LParen)?;
        let property = self.parse_additive()?;
        self.expect(Token::Comma)?;

        let predicate = match keyword {
            Keyword::BBox => {
                let mut bounds = Vec::with_capacity(4);
                bounds.push(self.parse_additive()?);
                for _ in 0..3 {
                    self.expect(Token::Comma)?;
                    bounds.push(self.parse_additive()?);
                }
                let srs = if self.check(&Token::Comma) {
                    self.advance()?;
                    match self.advance()?.token {
                        Token::String(srs) | Token::Identifier(srs) => Some(srs),
                        _ => {
                            return Err(self.error_at("expected a CRS identifier", self.span_from(start)));
                        }
                    }
                } else {
                    None
                };
                self.expect(Token::RParen)?;
                let bounds: [Expr; 4] = bounds
                    .try_into()
                    .map_err(|_| self.error("BBOX expects four bounds"))?;
                Predicate::BBox {
                    property,
                    bounds,
                    srs,
                    span: self.span_from(start),
                }
            }
            Keyword::Relate => {
                let geometry = self.parse_additive()?;
                self.expect(Token::Comma)?;
                let pattern = self.parse_relate_pattern()?;
                self.expect(Token::RParen)?;
                Predicate::Relate {
                    property,
                    geometry,
                    pattern,
                    span: self.span_from(start),
                }
            }
            Keyword::DWithin | Keyword::Beyond => {
                let geometry = self.parse_additive()?;
                self.expect(Token::Comma)?;
                let distance = self.parse_additive()?;
                self.expect(Token::Comma)?;
                let units = self.parse_units()?;
                self.expect(Token::RParen)?;
                Predicate::Distance {
                    op: if keyword == Keyword::DWithin {
                        DistanceOp::DWithin
                    } else {
                        DistanceOp::Beyond
                    },
                    property,
                    geometry,
                    distance,
                    units,
                    span: self.span_from(start),
                }
            }
            _ => {
                let op = spatial_op(keyword)
                    .ok_or_else(|| self.error_at("unknown spatial operator", start))?;
                let geometry = self.parse_additive()?;
                self.expect(Token::RParen)?;
                Predicate::Spatial {
                    op,
                    property,
                    geometry,
                    span: self.span_from(start),
                }
            }
        };

        self.leave();
        Ok(predicate)
    }

    /// Distance units: `kilometers`, `statute miles`, or a quoted string.
    fn parse_units(&mut self) -> Result<String, CqlError> {
        if let Token::String(units) = &self.current.token {
            let units = units.clone();
            self.advance()?;
            return Ok(units);
        }

        let mut words = Vec::new();
        while let Token::Identifier(word) = &self.current.token {
            words.push(word.clone());
            self.advance()?;
        }
        if words.is_empty() {
            return Err(self.error("expected distance units"));
        }
        Ok(words.join(" "))
    }

    /// The third argument of `RELATE`.
    ///
    /// A pattern such as `T*F**FFF*` lexes as several adjacent tokens;
    /// they are stitched back together from the source text and handed on
    /// unresolved.
    fn parse_relate_pattern(&mut self) -> Result<Expr, CqlError> {
        if let Token::String(pattern) = &self.current.token {
            let value = Literal::String(pattern.clone());
            let span = self.advance()?.span;
            return Ok(Expr::Literal { value, span });
        }

        let start = self.current.span;
        let mut end = start.end;
        let mut first = true;
        while matches!(
            self.current.token,
            Token::Digits(_) | Token::Identifier(_) | Token::Star
        ) {
            if !first && self.current.span.start.offset != end.offset {
                return Err(self.error("relate pattern must not contain whitespace"));
            }
            end = self.advance()?.span.end;
            first = false;
        }
        if first {
            return Err(self.error("expected an intersection pattern"));
        }

        let span = Span::new(start.start, end);
        Ok(Expr::Literal {
            value: Literal::NumericOrPattern(span.slice(self.source()).to_string()),
            span,
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_additive(&mut self) -> Result<Expr, CqlError> {
        let left = self.parse_multiplicative()?;
        self.parse_additive_tail(left)
    }

    /// Each operator deepens the left-leaning tree by one level, so a long
    /// chain counts against the nesting limit like explicit grouping does.
    fn parse_additive_tail(&mut self, mut left: Expr) -> Result<Expr, CqlError> {
        let mut chained = 0;
        loop {
            let op = match self.current.token {
                Token::Plus => ArithmeticOp::Add,
                Token::Minus => ArithmeticOp::Subtract,
                _ => break,
            };
            self.enter()?;
            chained += 1;
            self.advance()?;
            let right = self.parse_multiplicative()?;
            let span = left.span().to(right.span());
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        self.depth -= chained;
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, CqlError> {
        let left = self.parse_unary()?;
        self.parse_multiplicative_tail(left)
    }

    fn parse_multiplicative_tail(&mut self, mut left: Expr) -> Result<Expr, CqlError> {
        let mut chained = 0;
        loop {
            let op = match self.current.token {
                Token::Star => Operator::Arithmetic(ArithmeticOp::Multiply),
                Token::Slash => Operator::Arithmetic(ArithmeticOp::Divide),
                Token::Backslash => Operator::Function(FunctionOp::IntegerDivide),
                Token::Caret => Operator::Function(FunctionOp::Power),
                Token::Percent => Operator::Function(FunctionOp::Remainder),
                _ => break,
            };
            self.enter()?;
            chained += 1;
            self.advance()?;
            let right = self.parse_unary()?;
            let span = left.span().to(right.span());
            let (left_box, right_box) = (Box::new(left), Box::new(right));
            left = match op {
                Operator::Arithmetic(op) => Expr::Binary {
                    op,
                    left: left_box,
                    right: right_box,
                    span,
                },
                Operator::Function(op) => Expr::FunctionOperator {
                    op,
                    left: left_box,
                    right: right_box,
                    span,
                },
            };
        }
        self.depth -= chained;
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, CqlError> {
        if !self.check(&Token::Minus) {
            return self.parse_primary();
        }

        let start = self.current.span;
        self.enter()?;
        self.advance()?;

        // Signed numbers stay literals so the most negative integer fits.
        let signed = match &self.current.token {
            Token::Digits(digits) => Some(Literal::NumericOrPattern(format!("-{}", digits))),
            Token::Decimal(number) => Some(Literal::Decimal(format!("-{}", number))),
            _ => None,
        };
        let expr = match signed {
            Some(value) => {
                self.advance()?;
                Expr::Literal {
                    value,
                    span: self.span_from(start),
                }
            }
            None => {
                let operand = self.parse_unary()?;
                Expr::Negate {
                    operand: Box::new(operand),
                    span: self.span_from(start),
                }
            }
        };

        self.leave();
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, CqlError> {
        let span = self.current.span;
        let literal = match &self.current.token {
            Token::Digits(digits) => Some(Literal::NumericOrPattern(digits.clone())),
            Token::Decimal(number) => Some(Literal::Decimal(number.clone())),
            Token::String(s) => Some(Literal::String(s.clone())),
            Token::Date(d) => Some(Literal::Date(d.clone())),
            Token::DateTime(dt) => Some(Literal::DateTime(dt.clone())),
            Token::Keyword(Keyword::True) => Some(Literal::Boolean(true)),
            Token::Keyword(Keyword::False) => Some(Literal::Boolean(false)),
            _ => None,
        };
        if let Some(value) = literal {
            self.advance()?;
            return Ok(Expr::Literal { value, span });
        }

        match &self.current.token {
            Token::Keyword(keyword) if keyword.is_geometry_tag() => self.parse_geometry_literal(),
            Token::Keyword(keyword) if keyword.is_spatial_operator() => {
                let name = *keyword;
                self.enter()?;
                self.advance()?;
                let args = self.parse_arguments()?;
                self.leave();
                Ok(Expr::Routine {
                    name,
                    args,
                    span: self.span_from(span),
                })
            }
            Token::Identifier(_) | Token::QuotedIdentifier(_) | Token::Duration(_) => {
                self.parse_attribute_or_call()
            }
            _ if self.at_group_open() => {
                self.enter()?;
                let open = self.advance()?.token;
                let expr = self.parse_additive()?;
                self.close_group(&open)?;
                self.leave();
                Ok(expr)
            }
            Token::Eof => Err(self.error("unexpected end of input, expected an expression")),
            _ => Err(self.error("expected an expression")),
        }
    }

    /// `( [arg {, arg}] )`
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, CqlError> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if !self.check(&Token::RParen) {
            args.push(self.parse_additive()?);
            while self.check(&Token::Comma) {
                self.advance()?;
                args.push(self.parse_additive()?);
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }

    fn parse_attribute_or_call(&mut self) -> Result<Expr, CqlError> {
        let start = self.current.span;
        let callable = matches!(self.current.token, Token::Identifier(_));
        let first = self.parse_segment()?;

        if callable && self.check(&Token::LParen) {
            self.enter()?;
            let args = self.parse_arguments()?;
            self.leave();
            return Ok(Expr::Function {
                name: first,
                args,
                span: self.span_from(start),
            });
        }

        let mut segments = vec![first];
        while self.check(&Token::Dot) {
            self.advance()?;
            segments.push(self.parse_segment()?);
        }

        Ok(Expr::Attribute {
            path: AttributePath::new(segments),
            span: self.span_from(start),
        })
    }

    /// One path segment: `name`, `"quoted name"`, or a colon compound of those.
    fn parse_segment(&mut self) -> Result<String, CqlError> {
        let mut segment = self.parse_name_part()?;
        while self.check(&Token::Colon) {
            self.advance()?;
            segment.push(':');
            segment.push_str(&self.parse_name_part()?);
        }
        Ok(segment)
    }

    fn parse_name_part(&mut self) -> Result<String, CqlError> {
        match &self.current.token {
            Token::Identifier(name) | Token::QuotedIdentifier(name) | Token::Duration(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(name)
            }
            Token::Digits(_) | Token::Decimal(_) => {
                Err(self.error("attribute names must start with a letter or underscore"))
            }
            _ => Err(self.error("expected an attribute name")),
        }
    }

    /// Captures a geometry literal's source text for the WKT reader.
    fn parse_geometry_literal(&mut self) -> Result<Expr, CqlError> {
        let start = self.current.span;
        self.advance()?;

        let dimension_marker = matches!(
            &self.current.token,
            Token::Identifier(word) if ["Z", "M", "ZM"].iter().any(|m| word.eq_ignore_ascii_case(m))
        );
        if dimension_marker {
            self.advance()?;
        }

        let empty = matches!(
            &self.current.token,
            Token::Identifier(word) if word.eq_ignore_ascii_case("EMPTY")
        );
        if empty {
            self.advance()?;
        } else {
            self.expect(Token::LParen)?;
            let mut open = 1usize;
            while open > 0 {
                match self.current.token {
                    Token::LParen => open += 1,
                    Token::RParen => open -= 1,
                    Token::Eof => return Err(self.error("unterminated geometry literal")),
                    _ => {}
                }
                if self.depth + open > self.max_depth {
                    return Err(self.error(format!("nesting deeper than {} levels", self.max_depth)));
                }
                self.advance()?;
            }
        }

        let span = self.span_from(start);
        Ok(Expr::Geometry {
            wkt: span.slice(self.source()).to_string(),
            span,
        })
    }
}

fn spatial_op(keyword: Keyword) -> Option<SpatialOp> {
    Some(match keyword {
        Keyword::Equals => SpatialOp::Equals,
        Keyword::Disjoint => SpatialOp::Disjoint,
        Keyword::Intersects => SpatialOp::Intersects,
        Keyword::Touches => SpatialOp::Touches,
        Keyword::Crosses => SpatialOp::Crosses,
        Keyword::Within => SpatialOp::Within,
        Keyword::Contains => SpatialOp::Contains,
        Keyword::Overlaps => SpatialOp::Overlaps,
        _ => return None,
    })
}
