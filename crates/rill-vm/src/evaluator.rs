//! Program-counter evaluation of lowered bound programs.
//!
//! Flattening guarantees one statement per slot, so a body is executed by
//! building a `label -> index` map once and stepping an index through the
//! statement list. Function calls push a frame seeded from the parameter
//! symbols; globals live in a map that survives across REPL submissions.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use indexmap::IndexMap;
use rand::Rng;
use rand::rngs::ThreadRng;

use rill_compiler::binder::bound::{BoundExpr, BoundProgram, BoundStmt, Label};
use rill_compiler::binder::operators::{BinaryOpKind, UnaryOpKind};
use rill_compiler::symbols::{FunctionSymbol, SymbolId, Type, VariableKind, VariableSymbol, builtins};

use crate::error::RuntimeError;
use crate::value::Value;

pub struct Evaluator<'io> {
    globals: IndexMap<SymbolId, Value>,
    locals: Vec<IndexMap<SymbolId, Value>>,
    last_value: Option<Value>,
    input: Box<dyn BufRead + 'io>,
    output: Box<dyn Write + 'io>,
    rng: ThreadRng,
}

impl Default for Evaluator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator<'static> {
    /// An evaluator wired to the process's stdin and stdout.
    pub fn new() -> Self {
        Self::with_io(Box::new(std::io::stdin().lock()), Box::new(std::io::stdout()))
    }
}

impl<'io> Evaluator<'io> {
    /// An evaluator with injected streams; tests capture `print`/`input`
    /// through this.
    pub fn with_io(input: Box<dyn BufRead + 'io>, output: Box<dyn Write + 'io>) -> Self {
        Self {
            globals: IndexMap::new(),
            locals: Vec::new(),
            last_value: None,
            input,
            output,
            rng: rand::thread_rng(),
        }
    }

    /// Runs the program's top-level statements. Globals persist across
    /// calls, which is what chains REPL submissions together.
    pub fn evaluate(&mut self, program: &BoundProgram) -> Result<Option<Value>, RuntimeError> {
        self.locals.push(IndexMap::new());
        let result = self.run_block(program, &program.statements);
        self.locals.pop();
        result
    }

    fn run_block(
        &mut self,
        program: &BoundProgram,
        statements: &[BoundStmt],
    ) -> Result<Option<Value>, RuntimeError> {
        let mut labels: HashMap<&Label, usize> = HashMap::new();
        for (index, statement) in statements.iter().enumerate() {
            if let BoundStmt::Label(label) = statement {
                labels.insert(label, index + 1);
            }
        }

        let mut index = 0;
        while index < statements.len() {
            match &statements[index] {
                BoundStmt::VarDecl {
                    variable,
                    initializer,
                } => {
                    let value = self.eval_value(program, initializer)?;
                    self.last_value = Some(value.clone());
                    self.assign(variable, value);
                    index += 1;
                }
                BoundStmt::Expr(expr) => {
                    self.last_value = self.eval_expression(program, expr)?;
                    index += 1;
                }
                BoundStmt::Label(_) => {
                    index += 1;
                }
                BoundStmt::Goto(label) => {
                    index = labels[label];
                }
                BoundStmt::ConditionalGoto {
                    label,
                    condition,
                    jump_if_true,
                } => {
                    let value = self.eval_value(program, condition)?;
                    let Value::Bool(condition) = value else {
                        unreachable!("conditional goto on a non-boolean value");
                    };
                    if condition == *jump_if_true {
                        index = labels[label];
                    } else {
                        index += 1;
                    }
                }
                BoundStmt::Return(expr) => {
                    let value = match expr {
                        Some(expr) => self.eval_expression(program, expr)?,
                        None => None,
                    };
                    self.last_value = value.clone();
                    return Ok(value);
                }
                BoundStmt::Block(_)
                | BoundStmt::If { .. }
                | BoundStmt::While { .. }
                | BoundStmt::For { .. } => {
                    unreachable!("structured statement reached the evaluator")
                }
            }
        }

        Ok(self.last_value.clone())
    }

    // --- expressions ---

    /// Evaluates an expression that the binder guarantees produces a value.
    fn eval_value(
        &mut self,
        program: &BoundProgram,
        expr: &BoundExpr,
    ) -> Result<Value, RuntimeError> {
        Ok(self
            .eval_expression(program, expr)?
            .expect("expression produced no value"))
    }

    /// `None` only for calls that return `void` and fall through.
    fn eval_expression(
        &mut self,
        program: &BoundProgram,
        expr: &BoundExpr,
    ) -> Result<Option<Value>, RuntimeError> {
        match expr {
            BoundExpr::Literal { value, .. } => Ok(Some(Value::from(value))),
            BoundExpr::Variable(variable) => Ok(Some(self.read(variable))),
            BoundExpr::Assignment { variable, value } => {
                let value = self.eval_value(program, value)?;
                self.assign(variable, value.clone());
                Ok(Some(value))
            }
            BoundExpr::Unary { op, operand } => {
                let operand = self.eval_value(program, operand)?;
                Ok(Some(eval_unary(op.kind, operand)))
            }
            BoundExpr::Binary { left, op, right } => {
                // Both operands evaluate even for `&&`/`||`; the language
                // does not short-circuit.
                let left = self.eval_value(program, left)?;
                let right = self.eval_value(program, right)?;
                Ok(Some(eval_binary(op.kind, left, right)?))
            }
            BoundExpr::Call {
                function,
                arguments,
            } => self.eval_call(program, function, arguments),
            BoundExpr::Conversion { ty, operand } => {
                let value = self.eval_value(program, operand)?;
                Ok(Some(convert(*ty, value)?))
            }
            BoundExpr::ArrayLiteral { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_value(program, element)?);
                }
                Ok(Some(Value::Array(values)))
            }
            BoundExpr::Index {
                receiver, index, ..
            } => {
                let receiver = self.eval_value(program, receiver)?;
                let index = self.eval_int(program, index)?;
                Ok(Some(index_value(&receiver, index)?))
            }
            BoundExpr::IndexAssignment {
                variable,
                index,
                value,
                ..
            } => {
                let index = self.eval_int(program, index)?;
                let value = self.eval_value(program, value)?;
                let updated = write_index(self.read(variable), index, value.clone())?;
                self.assign(variable, updated);
                Ok(Some(value))
            }
            BoundExpr::Error => {
                unreachable!("error expression reached the evaluator")
            }
        }
    }

    fn eval_int(&mut self, program: &BoundProgram, expr: &BoundExpr) -> Result<i64, RuntimeError> {
        match self.eval_value(program, expr)? {
            Value::Int(value) => Ok(value),
            other => unreachable!("expected an int, found {}", other.type_name()),
        }
    }

    fn eval_call(
        &mut self,
        program: &BoundProgram,
        function: &FunctionSymbol,
        arguments: &[BoundExpr],
    ) -> Result<Option<Value>, RuntimeError> {
        if function.is_builtin() {
            return self.eval_builtin(program, function, arguments);
        }

        let mut frame = IndexMap::new();
        for (parameter, argument) in function.parameters.iter().zip(arguments) {
            let value = self.eval_value(program, argument)?;
            frame.insert(parameter.id, value);
        }

        let body = &program
            .functions
            .get(&function.id)
            .unwrap_or_else(|| panic!("missing body for function '{}'", function.name))
            .body;

        self.locals.push(frame);
        let result = self.run_block(program, body);
        self.locals.pop();
        result
    }

    fn eval_builtin(
        &mut self,
        program: &BoundProgram,
        function: &FunctionSymbol,
        arguments: &[BoundExpr],
    ) -> Result<Option<Value>, RuntimeError> {
        match function.name.as_str() {
            builtins::PRINT => {
                let value = self.eval_value(program, &arguments[0])?;
                let Value::Str(text) = &value else {
                    unreachable!("print requires a string");
                };
                self.output.write_all(text.as_bytes())?;
                self.output.flush()?;
                Ok(Some(value))
            }
            builtins::INPUT => Ok(Some(Value::Str(self.read_token()?))),
            builtins::RANDOM => {
                let max = self.eval_int(program, &arguments[0])?;
                if max <= 0 {
                    return Err(RuntimeError::InvalidRandomBound(max));
                }
                Ok(Some(Value::Int(self.rng.gen_range(0..max))))
            }
            builtins::ARRAY_SIZE => {
                let value = self.eval_value(program, &arguments[0])?;
                let Value::Array(values) = value else {
                    unreachable!("size requires an array");
                };
                Ok(Some(Value::Int(values.len() as i64)))
            }
            builtins::STRING_LEN => {
                let value = self.eval_value(program, &arguments[0])?;
                let Value::Str(text) = value else {
                    unreachable!("len requires a string");
                };
                Ok(Some(Value::Int(text.len() as i64)))
            }
            other => unreachable!("unknown builtin '{other}'"),
        }
    }

    /// Reads one whitespace-delimited token from the input stream.
    fn read_token(&mut self) -> Result<String, RuntimeError> {
        let mut token: Vec<u8> = Vec::new();
        loop {
            let buffer = self.input.fill_buf()?;
            if buffer.is_empty() {
                break;
            }

            let mut consumed = 0;
            let mut done = false;
            for &byte in buffer {
                consumed += 1;
                if byte.is_ascii_whitespace() {
                    if !token.is_empty() {
                        done = true;
                        break;
                    }
                } else {
                    token.push(byte);
                }
            }

            self.input.consume(consumed);
            if done {
                break;
            }
        }
        Ok(String::from_utf8_lossy(&token).into_owned())
    }

    // --- environment ---

    fn assign(&mut self, variable: &VariableSymbol, value: Value) {
        match variable.kind {
            VariableKind::Global => {
                self.globals.insert(variable.id, value);
            }
            VariableKind::Local | VariableKind::Parameter => {
                self.locals
                    .last_mut()
                    .expect("assignment outside any call frame")
                    .insert(variable.id, value);
            }
        }
    }

    fn read(&self, variable: &VariableSymbol) -> Value {
        let slot = match variable.kind {
            VariableKind::Global => self.globals.get(&variable.id),
            VariableKind::Local | VariableKind::Parameter => self
                .locals
                .last()
                .expect("variable read outside any call frame")
                .get(&variable.id),
        };
        slot.unwrap_or_else(|| panic!("variable '{}' read before assignment", variable.name))
            .clone()
    }
}

fn eval_unary(kind: UnaryOpKind, operand: Value) -> Value {
    match (kind, operand) {
        (UnaryOpKind::Identity, value) => value,
        (UnaryOpKind::Negation, Value::Int(value)) => Value::Int(value.wrapping_neg()),
        (UnaryOpKind::Negation, Value::Float(value)) => Value::Float(-value),
        (UnaryOpKind::LogicalNegation, Value::Bool(value)) => Value::Bool(!value),
        (UnaryOpKind::OnesComplement, Value::Int(value)) => Value::Int(!value),
        (kind, operand) => {
            unreachable!("unary {kind:?} applied to a {}", operand.type_name())
        }
    }
}

fn eval_binary(kind: BinaryOpKind, left: Value, right: Value) -> Result<Value, RuntimeError> {
    use BinaryOpKind::*;
    use Value::*;

    let value = match (kind, left, right) {
        (Addition, Int(a), Int(b)) => Int(a.wrapping_add(b)),
        (Addition, Float(a), Float(b)) => Float(a + b),
        (Addition, Int(a), Float(b)) => Float(a as f64 + b),
        (Addition, Float(a), Int(b)) => Float(a + b as f64),
        (Addition, Str(a), Str(b)) => Str(a + &b),
        (Addition, Str(a), Int(b)) => Str(format!("{a}{b}")),
        (Addition, Int(a), Str(b)) => Str(format!("{a}{b}")),
        (Addition, Str(a), Float(b)) => Str(format!("{a}{b}")),
        (Addition, Float(a), Str(b)) => Str(format!("{a}{b}")),

        (Subtraction, Int(a), Int(b)) => Int(a.wrapping_sub(b)),
        (Subtraction, Float(a), Float(b)) => Float(a - b),
        (Subtraction, Int(a), Float(b)) => Float(a as f64 - b),
        (Subtraction, Float(a), Int(b)) => Float(a - b as f64),

        (Multiplication, Int(a), Int(b)) => Int(a.wrapping_mul(b)),
        (Multiplication, Float(a), Float(b)) => Float(a * b),
        (Multiplication, Int(a), Float(b)) => Float(a as f64 * b),
        (Multiplication, Float(a), Int(b)) => Float(a * b as f64),

        (Division, Int(a), Int(b)) => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Int(a.wrapping_div(b))
        }
        (Division, Float(a), Float(b)) => Float(a / b),
        (Division, Int(a), Float(b)) => Float(a as f64 / b),
        (Division, Float(a), Int(b)) => Float(a / b as f64),

        (BitwiseAnd, Int(a), Int(b)) => Int(a & b),
        (BitwiseAnd, Bool(a), Bool(b)) => Bool(a & b),
        (BitwiseOr, Int(a), Int(b)) => Int(a | b),
        (BitwiseOr, Bool(a), Bool(b)) => Bool(a | b),
        (BitwiseXor, Int(a), Int(b)) => Int(a ^ b),
        (BitwiseXor, Bool(a), Bool(b)) => Bool(a ^ b),

        (LogicalAnd, Bool(a), Bool(b)) => Bool(a && b),
        (LogicalOr, Bool(a), Bool(b)) => Bool(a || b),

        (Equals, a, b) => Bool(values_equal(&a, &b)),
        (NotEquals, a, b) => Bool(!values_equal(&a, &b)),

        (Less, a, b) => Bool(compare(&a, &b) == std::cmp::Ordering::Less),
        (LessOrEquals, a, b) => Bool(compare(&a, &b) != std::cmp::Ordering::Greater),
        (Greater, a, b) => Bool(compare(&a, &b) == std::cmp::Ordering::Greater),
        (GreaterOrEquals, a, b) => Bool(compare(&a, &b) != std::cmp::Ordering::Less),

        (kind, left, right) => unreachable!(
            "binary {kind:?} applied to {} and {}",
            left.type_name(),
            right.type_name()
        ),
    };
    Ok(value)
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(a), Value::Float(b)) => *a as f64 == *b,
        (Value::Float(a), Value::Int(b)) => *a == *b as f64,
        (a, b) => a == b,
    }
}

fn compare(left: &Value, right: &Value) -> std::cmp::Ordering {
    let (a, b) = match (left, right) {
        (Value::Int(a), Value::Int(b)) => return a.cmp(b),
        (Value::Float(a), Value::Float(b)) => (*a, *b),
        (Value::Int(a), Value::Float(b)) => (*a as f64, *b),
        (Value::Float(a), Value::Int(b)) => (*a, *b as f64),
        (a, b) => unreachable!("ordering of {} and {}", a.type_name(), b.type_name()),
    };
    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Greater)
}

/// Runtime conversions between the scalar types and `any`; string parsing
/// is the only way these fail.
fn convert(ty: Type, value: Value) -> Result<Value, RuntimeError> {
    let converted = match ty {
        Type::Bool => Value::Bool(match value {
            Value::Bool(value) => value,
            Value::Int(value) => value != 0,
            Value::Float(value) => value != 0.0,
            Value::Str(value) => !value.is_empty(),
            Value::Array(_) => true,
        }),
        Type::Int => match value {
            Value::Bool(value) => Value::Int(value as i64),
            Value::Int(value) => Value::Int(value),
            Value::Float(value) => Value::Int(value as i64),
            Value::Str(value) => match value.trim().parse::<i64>() {
                Ok(parsed) => Value::Int(parsed),
                Err(_) => return Err(RuntimeError::InvalidNumber(value)),
            },
            Value::Array(_) => unreachable!("array converted to int"),
        },
        Type::Float => match value {
            Value::Bool(value) => Value::Float(value as u8 as f64),
            Value::Int(value) => Value::Float(value as f64),
            Value::Float(value) => Value::Float(value),
            Value::Str(value) => match value.trim().parse::<f64>() {
                Ok(parsed) => Value::Float(parsed),
                Err(_) => return Err(RuntimeError::InvalidNumber(value)),
            },
            Value::Array(_) => unreachable!("array converted to float"),
        },
        Type::String => Value::Str(value.to_string()),
        Type::Any | Type::Array(_) => value,
        Type::Void | Type::Error => unreachable!("conversion to {ty}"),
    };
    Ok(converted)
}

fn index_value(receiver: &Value, index: i64) -> Result<Value, RuntimeError> {
    match receiver {
        Value::Array(values) => {
            let slot = usize::try_from(index)
                .ok()
                .and_then(|i| values.get(i))
                .cloned();
            slot.ok_or(RuntimeError::IndexOutOfBounds {
                index,
                len: values.len(),
            })
        }
        Value::Str(text) => {
            let one = usize::try_from(index)
                .ok()
                .and_then(|i| text.get(i..i + 1))
                .map(|s| Value::Str(s.to_string()));
            one.ok_or(RuntimeError::IndexOutOfBounds {
                index,
                len: text.len(),
            })
        }
        other => unreachable!("indexing into a {}", other.type_name()),
    }
}

fn write_index(receiver: Value, index: i64, value: Value) -> Result<Value, RuntimeError> {
    match receiver {
        Value::Array(mut values) => {
            let len = values.len();
            let slot = usize::try_from(index)
                .ok()
                .and_then(|i| values.get_mut(i))
                .ok_or(RuntimeError::IndexOutOfBounds { index, len })?;
            *slot = value;
            Ok(Value::Array(values))
        }
        Value::Str(mut text) => {
            let Value::Str(replacement) = value else {
                unreachable!("writing a non-string into a string");
            };
            if replacement.len() != 1 {
                return Err(RuntimeError::ExpectedSingleCharacter);
            }
            let in_bounds = usize::try_from(index)
                .ok()
                .is_some_and(|i| text.get(i..i + 1).is_some());
            if !in_bounds {
                return Err(RuntimeError::IndexOutOfBounds {
                    index,
                    len: text.len(),
                });
            }
            let i = index as usize;
            text.replace_range(i..i + 1, &replacement);
            Ok(Value::Str(text))
        }
        other => unreachable!("index assignment into a {}", other.type_name()),
    }
}
