//! Lowering of the syntax tree into a filter tree.
//!
//! Every node is created through the caller's [`FilterFactory`]; this
//! module only decides *which* nodes to create. It is also where the
//! context-dependent parts of the language are resolved: digit runs that
//! are really relate patterns, existence checks, temporal periods given
//! by a duration, and the `INCLUDE`/`EXCLUDE` constants.

use jiff::Zoned;
use tracing::debug;

use crate::{
    ast::{
        ArithmeticOp, ComparisonOp, Expr, Literal, Predicate, Span, TemporalBound, TemporalOp,
        TemporalOperand, TemporalPredicate,
    },
    crs::Crs,
    error::CqlError,
    factory::FilterFactory,
    filter::Wildcards,
    geometry::{Envelope, Geometry},
    temporal::{self, Duration, Period},
    value::Value,
};

/// Name of the function an existence check lowers to.
pub const PROPERTY_EXISTS: &str = "PropertyExists";

/// Name of the function a `RELATE` predicate lowers to.
pub const RELATE_PATTERN: &str = "relatePattern";

const PATTERN_SYMBOLS: &[char] = &['0', '1', '2', 'T', 'F', '*'];

/// A filter that may still be one of the constants, so `AND`/`OR`/`NOT`
/// can fold them away before anything reaches the factory.
enum Built<T> {
    Include,
    Exclude,
    Filter(T),
}

pub struct FilterBuilder<'a, F: FilterFactory> {
    factory: &'a F,
    source: &'a str,
}

impl<'a, F: FilterFactory> FilterBuilder<'a, F> {
    /// `source` is the text the tree was parsed from; it is only used to
    /// quote fragments in error messages.
    pub fn new(factory: &'a F, source: &'a str) -> Self {
        FilterBuilder { factory, source }
    }

    pub fn build_filter(&self, predicate: &Predicate) -> Result<F::Filter, CqlError> {
        let built = self.predicate(predicate)?;
        Ok(self.finish(built))
    }

    pub fn build_expression(&self, expr: &Expr) -> Result<F::Expr, CqlError> {
        self.expression(expr)
    }

    fn finish(&self, built: Built<F::Filter>) -> F::Filter {
        match built {
            Built::Include => self.factory.include(),
            Built::Exclude => self.factory.exclude(),
            Built::Filter(filter) => filter,
        }
    }

    fn semantic(&self, message: impl Into<String>, span: Span) -> CqlError {
        CqlError::Semantic {
            message: message.into(),
            fragment: span.slice(self.source).to_string(),
            position: span.start,
        }
    }

    fn negate(&self, filter: F::Filter, negated: bool) -> F::Filter {
        if negated {
            self.factory.not(filter)
        } else {
            filter
        }
    }

    fn is_true(&self, expr: F::Expr) -> F::Filter {
        let truth = self.factory.literal(Value::Boolean(true));
        self.factory.comparison(ComparisonOp::Equal, expr, truth)
    }

    // ========================================================================
    // Predicates
    // ========================================================================

    fn predicate(&self, predicate: &Predicate) -> Result<Built<F::Filter>, CqlError> {
        match predicate {
            Predicate::Include(_) => Ok(Built::Include),
            Predicate::Exclude(_) => Ok(Built::Exclude),

            Predicate::And { operands, .. } => {
                let built = operands
                    .iter()
                    .map(|operand| self.predicate(operand))
                    .collect::<Result<Vec<_>, _>>()?;
                if built.iter().any(|b| matches!(b, Built::Exclude)) {
                    debug!("AND with EXCLUDE operand folded to EXCLUDE");
                    return Ok(Built::Exclude);
                }
                Ok(self.combine(built, |children| self.factory.and(children), Built::Include))
            }

            Predicate::Or { operands, .. } => {
                let built = operands
                    .iter()
                    .map(|operand| self.predicate(operand))
                    .collect::<Result<Vec<_>, _>>()?;
                if built.iter().any(|b| matches!(b, Built::Include)) {
                    debug!("OR with INCLUDE operand folded to INCLUDE");
                    return Ok(Built::Include);
                }
                Ok(self.combine(built, |children| self.factory.or(children), Built::Exclude))
            }

            Predicate::Not { operand, .. } => Ok(match self.predicate(operand)? {
                Built::Include => {
                    debug!("NOT INCLUDE folded to EXCLUDE");
                    Built::Exclude
                }
                Built::Exclude => {
                    debug!("NOT EXCLUDE folded to INCLUDE");
                    Built::Include
                }
                Built::Filter(filter) => Built::Filter(self.factory.not(filter)),
            }),

            other => self.simple(other).map(Built::Filter),
        }
    }

    /// Drops the neutral constants and joins what is left.
    fn combine(
        &self,
        built: Vec<Built<F::Filter>>,
        join: impl FnOnce(Vec<F::Filter>) -> F::Filter,
        neutral: Built<F::Filter>,
    ) -> Built<F::Filter> {
        let mut children: Vec<F::Filter> = built
            .into_iter()
            .filter_map(|b| match b {
                Built::Filter(filter) => Some(filter),
                _ => None,
            })
            .collect();

        match children.len() {
            0 => {
                debug!("logical operator with only constant operands folded");
                neutral
            }
            1 => Built::Filter(children.remove(0)),
            _ => Built::Filter(join(children)),
        }
    }

    fn simple(&self, predicate: &Predicate) -> Result<F::Filter, CqlError> {
        let f = self.factory;
        match predicate {
            Predicate::Comparison {
                op, left, right, ..
            } => Ok(f.comparison(*op, self.expression(left)?, self.expression(right)?)),

            Predicate::Between {
                expr,
                low,
                high,
                negated,
                ..
            } => {
                let between = f.between(
                    self.expression(expr)?,
                    self.expression(low)?,
                    self.expression(high)?,
                );
                Ok(self.negate(between, *negated))
            }

            Predicate::Like {
                expr,
                pattern,
                negated,
                case_insensitive,
                ..
            } => {
                let like = f.like(
                    self.expression(expr)?,
                    pattern,
                    Wildcards::STANDARD,
                    !*case_insensitive,
                );
                Ok(self.negate(like, *negated))
            }

            Predicate::IsNull { expr, negated, .. } => {
                let is_null = f.is_null(self.expression(expr)?);
                Ok(self.negate(is_null, *negated))
            }

            Predicate::Exists {
                attribute,
                negated,
                span,
            } => {
                let path = attribute
                    .as_attribute()
                    .ok_or_else(|| self.semantic("existence checks need an attribute", *span))?;
                let exists = f.function(PROPERTY_EXISTS, vec![f.property(path)]);
                Ok(self.negate(self.is_true(exists), *negated))
            }

            Predicate::In {
                expr,
                values,
                negated,
                ..
            } => {
                let subject = self.expression(expr)?;
                let mut alternatives = values
                    .iter()
                    .map(|value| {
                        let value = self.expression(value)?;
                        Ok::<_, CqlError>(f.comparison(ComparisonOp::Equal, subject.clone(), value))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let any = if alternatives.len() == 1 {
                    alternatives.remove(0)
                } else {
                    f.or(alternatives)
                };
                Ok(self.negate(any, *negated))
            }

            Predicate::Id { ids, .. } => {
                let ids = ids
                    .iter()
                    .map(|id| match id {
                        Expr::Literal {
                            value: Literal::String(text) | Literal::NumericOrPattern(text),
                            ..
                        } => Ok(text.clone()),
                        other => Err(self.semantic("feature ids must be string or integer literals", other.span())),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(f.ids(ids))
            }

            Predicate::Spatial {
                op,
                property,
                geometry,
                ..
            } => Ok(f.spatial(*op, self.expression(property)?, self.expression(geometry)?)),

            Predicate::BBox {
                property,
                bounds,
                srs,
                span,
            } => {
                let [min_x, min_y, max_x, max_y] = [
                    self.number(&bounds[0])?,
                    self.number(&bounds[1])?,
                    self.number(&bounds[2])?,
                    self.number(&bounds[3])?,
                ];
                let mut envelope = Envelope::new(min_x, min_y, max_x, max_y);
                if let Some(srs) = srs {
                    let crs: Crs = srs.parse().map_err(|e| self.semantic(format!("{e}"), *span))?;
                    envelope = envelope.with_crs(crs);
                }
                Ok(f.bbox(self.expression(property)?, envelope))
            }

            Predicate::Relate {
                property,
                geometry,
                pattern,
                ..
            } => {
                let pattern = self.relate_pattern(pattern)?;
                let relate = f.function(
                    RELATE_PATTERN,
                    vec![
                        self.expression(property)?,
                        self.expression(geometry)?,
                        f.literal(Value::String(pattern)),
                    ],
                );
                Ok(self.is_true(relate))
            }

            Predicate::Distance {
                op,
                property,
                geometry,
                distance,
                units,
                ..
            } => Ok(f.distance(
                *op,
                self.expression(property)?,
                self.expression(geometry)?,
                self.number(distance)?,
                units,
            )),

            Predicate::Temporal {
                op,
                property,
                operand,
                span,
            } => self.temporal(*op, property, operand, *span),

            Predicate::Expression { expr, .. } => Ok(self.is_true(self.expression(expr)?)),

            Predicate::Include(_)
            | Predicate::Exclude(_)
            | Predicate::And { .. }
            | Predicate::Or { .. }
            | Predicate::Not { .. } => {
                let built = self.predicate(predicate)?;
                Ok(self.finish(built))
            }
        }
    }

    /// Resolves the pending digit run (or string) in `RELATE`'s third slot.
    fn relate_pattern(&self, pattern: &Expr) -> Result<String, CqlError> {
        let (text, span) = match pattern {
            Expr::Literal {
                value: Literal::NumericOrPattern(text) | Literal::String(text),
                span,
            } => (text, *span),
            other => return Err(self.semantic("expected an intersection pattern", other.span())),
        };

        if text.chars().count() != 9 {
            return Err(self.semantic(
                format!("intersection pattern '{}' must have exactly 9 symbols", text),
                span,
            ));
        }
        if let Some(bad) = text.chars().find(|c| !PATTERN_SYMBOLS.contains(c)) {
            return Err(self.semantic(
                format!("'{}' is not a valid intersection pattern symbol (0, 1, 2, T, F, *)", bad),
                span,
            ));
        }

        debug!(pattern = %text, "resolved relate pattern");
        Ok(text.clone())
    }

    fn temporal(
        &self,
        op: TemporalPredicate,
        property: &Expr,
        operand: &TemporalOperand,
        span: Span,
    ) -> Result<F::Filter, CqlError> {
        let f = self.factory;
        let subject = self.expression(property)?;
        let instant = |z: Zoned| f.literal(Value::DateTime(z));

        match operand {
            TemporalOperand::Instant(bound) => {
                let op = match op {
                    TemporalPredicate::Before => TemporalOp::Before,
                    TemporalPredicate::After => TemporalOp::After,
                    TemporalPredicate::TEquals => TemporalOp::TEquals,
                    _ => return Err(self.semantic("this temporal operator requires a period", span)),
                };
                Ok(f.temporal(op, subject, instant(self.instant(bound)?)))
            }
            TemporalOperand::Period(first, second) => {
                let period = self.period(first, second)?;
                let during = |subject| f.temporal(TemporalOp::During, subject, f.literal(Value::Period(period.clone())));

                match op {
                    TemporalPredicate::Before => {
                        Ok(f.temporal(TemporalOp::Before, subject, instant(period.begin.clone())))
                    }
                    TemporalPredicate::After => {
                        Ok(f.temporal(TemporalOp::After, subject, instant(period.end.clone())))
                    }
                    TemporalPredicate::During => Ok(during(subject)),
                    TemporalPredicate::BeforeOrDuring => {
                        let before =
                            f.temporal(TemporalOp::Before, subject.clone(), instant(period.begin.clone()));
                        Ok(f.or(vec![before, during(subject)]))
                    }
                    TemporalPredicate::DuringOrAfter => {
                        let after =
                            f.temporal(TemporalOp::After, subject.clone(), instant(period.end.clone()));
                        Ok(f.or(vec![during(subject), after]))
                    }
                    TemporalPredicate::TEquals => {
                        Err(self.semantic("TEQUALS requires a single instant", span))
                    }
                }
            }
        }
    }

    fn instant(&self, bound: &TemporalBound) -> Result<Zoned, CqlError> {
        match bound {
            TemporalBound::DateTime { text, span } => {
                temporal::parse_date_time(text).map_err(|e| self.semantic(e.to_string(), *span))
            }
            TemporalBound::Date { text, span } => Err(self.semantic(
                format!("'{}' has no time component; temporal predicates need a date-time", text),
                *span,
            )),
            TemporalBound::Duration { span, .. } => {
                Err(self.semantic("a duration cannot stand for an instant", *span))
            }
        }
    }

    fn duration(&self, text: &str, span: Span) -> Result<Duration, CqlError> {
        text.parse().map_err(|e: temporal::TemporalError| self.semantic(e.to_string(), span))
    }

    fn period(&self, first: &TemporalBound, second: &TemporalBound) -> Result<Period, CqlError> {
        let span = first.span().to(second.span());
        let period = match (first, second) {
            (TemporalBound::Duration { text, span }, end) => {
                let duration = self.duration(text, *span)?;
                Period::ending_at(&duration, self.instant(end)?)
            }
            (begin, TemporalBound::Duration { text, span }) => {
                let duration = self.duration(text, *span)?;
                Period::starting_at(self.instant(begin)?, &duration)
            }
            (begin, end) => Ok(Period::new(self.instant(begin)?, self.instant(end)?)),
        };
        period.map_err(|e| self.semantic(e.to_string(), span))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&self, expr: &Expr) -> Result<F::Expr, CqlError> {
        let f = self.factory;
        match expr {
            Expr::Literal { value, span } => Ok(f.literal(self.literal(value, *span)?)),
            Expr::Attribute { path, .. } => Ok(f.property(path)),
            Expr::Negate { operand, span } => {
                // Folded for literals; otherwise represented as 0 - operand
                match operand.as_ref() {
                    Expr::Literal {
                        value: Literal::NumericOrPattern(text),
                        ..
                    } => Ok(f.literal(self.literal(&Literal::NumericOrPattern(negated(text)), *span)?)),
                    Expr::Literal {
                        value: Literal::Decimal(text),
                        ..
                    } => Ok(f.literal(self.literal(&Literal::Decimal(negated(text)), *span)?)),
                    other => Ok(f.arithmetic(
                        ArithmeticOp::Subtract,
                        f.literal(Value::Integer(0)),
                        self.expression(other)?,
                    )),
                }
            }
            Expr::Binary {
                op, left, right, ..
            } => Ok(f.arithmetic(*op, self.expression(left)?, self.expression(right)?)),
            Expr::FunctionOperator {
                op, left, right, ..
            } => Ok(f.function(
                op.function_name(),
                vec![self.expression(left)?, self.expression(right)?],
            )),
            Expr::Function { name, args, .. } => {
                let args = args
                    .iter()
                    .map(|arg| self.expression(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(f.function(name, args))
            }
            Expr::Geometry { wkt, span } => {
                let geometry =
                    Geometry::from_wkt(wkt).map_err(|e| self.semantic(e.to_string(), *span))?;
                Ok(f.literal(Value::Geometry(geometry)))
            }
            Expr::Routine { name, span, .. } => Err(CqlError::Unsupported {
                construct: format!("{} used as an expression", name),
                position: span.start,
            }),
        }
    }

    fn literal(&self, literal: &Literal, span: Span) -> Result<Value, CqlError> {
        match literal {
            Literal::NumericOrPattern(text) => text
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| self.semantic(format!("integer literal {} is out of range", text), span)),
            Literal::Decimal(text) => match text.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Value::Float(n)),
                _ => Err(self.semantic(format!("number {} is out of range", text), span)),
            },
            Literal::String(s) => Ok(Value::String(s.clone())),
            Literal::Boolean(b) => Ok(Value::Boolean(*b)),
            Literal::Date(text) => temporal::parse_date(text)
                .map(Value::Date)
                .map_err(|e| self.semantic(e.to_string(), span)),
            Literal::DateTime(text) => temporal::parse_date_time(text)
                .map(Value::DateTime)
                .map_err(|e| self.semantic(e.to_string(), span)),
        }
    }

    /// Numeric constant, as required by BBOX bounds and distances.
    fn number(&self, expr: &Expr) -> Result<f64, CqlError> {
        match expr {
            Expr::Literal { value, span } => match self.literal(value, *span)? {
                Value::Integer(n) => Ok(n as f64),
                Value::Float(n) => Ok(n),
                other => Err(self.semantic(format!("expected a number, found a {}", other.type_name()), *span)),
            },
            Expr::Negate { operand, .. } => Ok(-self.number(operand)?),
            other => Err(self.semantic("expected a numeric literal", other.span())),
        }
    }
}

fn negated(text: &str) -> String {
    match text.strip_prefix('-') {
        Some(positive) => positive.to_string(),
        None => format!("-{}", text),
    }
}
