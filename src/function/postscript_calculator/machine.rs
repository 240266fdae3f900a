use super::{
    error::{PostScriptError, PostScriptResult},
    lexer::PostScriptFunctionOperator,
    Instruction,
};

/// Operand stack limit for calculator functions
const MAX_STACK_DEPTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Operand {
    Int(i32),
    Real(f32),
    Bool(bool),
}

impl Operand {
    fn as_number(self) -> PostScriptResult<f32> {
        match self {
            Operand::Int(i) => Ok(i as f32),
            Operand::Real(r) => Ok(r),
            Operand::Bool(..) => Err(PostScriptError::TypeCheck),
        }
    }

    /// Booleans become `1.0` and `0.0`
    pub fn to_f32(self) -> f32 {
        match self {
            Operand::Int(i) => i as f32,
            Operand::Real(r) => r,
            Operand::Bool(b) => f32::from(u8::from(b)),
        }
    }
}

/// The per-call operand stack of a calculator function
pub(super) struct OperandStack {
    stack: Vec<Operand>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self {
            stack: Vec::with_capacity(MAX_STACK_DEPTH),
        }
    }

    pub fn push(&mut self, operand: Operand) -> PostScriptResult<()> {
        if self.stack.len() >= MAX_STACK_DEPTH {
            return Err(PostScriptError::StackOverflow);
        }

        self.stack.push(operand);

        Ok(())
    }

    fn pop(&mut self) -> PostScriptResult<Operand> {
        self.stack.pop().ok_or(PostScriptError::StackUnderflow)
    }

    fn pop_number(&mut self) -> PostScriptResult<f32> {
        self.pop()?.as_number()
    }

    fn pop_int(&mut self) -> PostScriptResult<i32> {
        match self.pop()? {
            Operand::Int(i) => Ok(i),
            _ => Err(PostScriptError::TypeCheck),
        }
    }

    fn pop_bool(&mut self) -> PostScriptResult<bool> {
        match self.pop()? {
            Operand::Bool(b) => Ok(b),
            _ => Err(PostScriptError::TypeCheck),
        }
    }

    fn push_number(&mut self, n: f32) -> PostScriptResult<()> {
        self.push(Operand::Real(n))
    }

    /// The top `n` operands, deepest first
    pub fn top(&self, n: usize) -> PostScriptResult<&[Operand]> {
        let start = self
            .stack
            .len()
            .checked_sub(n)
            .ok_or(PostScriptError::StackUnderflow)?;

        Ok(&self.stack[start..])
    }

    /// A count operand used to index into the stack
    fn pop_count(&mut self) -> PostScriptResult<usize> {
        let n = self.pop_int()?;
        usize::try_from(n).map_err(|_| PostScriptError::RangeCheck)
    }

    pub fn execute(&mut self, program: &[Instruction]) -> PostScriptResult<()> {
        for instruction in program {
            match instruction {
                Instruction::Push(operand) => self.push(*operand)?,
                Instruction::Operator(op) => self.apply(*op)?,
                Instruction::If(proc) => {
                    if self.pop_bool()? {
                        self.execute(proc)?;
                    }
                }
                Instruction::IfElse(then_proc, else_proc) => {
                    if self.pop_bool()? {
                        self.execute(then_proc)?;
                    } else {
                        self.execute(else_proc)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Integer arithmetic that falls back to reals on overflow, as PostScript does
    fn arithmetic(
        &mut self,
        int_op: fn(i32, i32) -> Option<i32>,
        real_op: fn(f32, f32) -> f32,
    ) -> PostScriptResult<()> {
        let n2 = self.pop()?;
        let n1 = self.pop()?;

        if let (Operand::Int(i1), Operand::Int(i2)) = (n1, n2) {
            return match int_op(i1, i2) {
                Some(result) => self.push(Operand::Int(result)),
                None => self.push_number(real_op(i1 as f32, i2 as f32)),
            };
        }

        self.push_number(real_op(n1.as_number()?, n2.as_number()?))
    }

    /// `ceiling`, `floor`, `round` and `truncate` keep integers as they are
    fn round_with(&mut self, f: fn(f32) -> f32) -> PostScriptResult<()> {
        match self.pop()? {
            Operand::Int(i) => self.push(Operand::Int(i)),
            Operand::Real(r) => self.push_number(f(r)),
            Operand::Bool(..) => Err(PostScriptError::TypeCheck),
        }
    }

    fn compare(
        &mut self,
        int_op: fn(&i32, &i32) -> bool,
        real_op: fn(&f32, &f32) -> bool,
    ) -> PostScriptResult<()> {
        let n2 = self.pop()?;
        let n1 = self.pop()?;

        let result = match (n1, n2) {
            (Operand::Int(i1), Operand::Int(i2)) => int_op(&i1, &i2),
            (n1, n2) => real_op(&n1.as_number()?, &n2.as_number()?),
        };

        self.push(Operand::Bool(result))
    }

    fn equality(&mut self) -> PostScriptResult<bool> {
        let b = self.pop()?;
        let a = self.pop()?;

        Ok(match (a, b) {
            (Operand::Bool(a), Operand::Bool(b)) => a == b,
            (Operand::Int(a), Operand::Int(b)) => a == b,
            (Operand::Bool(..), _) | (_, Operand::Bool(..)) => false,
            (a, b) => a.to_f32() == b.to_f32(),
        })
    }

    fn logical(
        &mut self,
        bool_op: fn(bool, bool) -> bool,
        int_op: fn(i32, i32) -> i32,
    ) -> PostScriptResult<()> {
        let b = self.pop()?;
        let a = self.pop()?;

        match (a, b) {
            (Operand::Bool(a), Operand::Bool(b)) => self.push(Operand::Bool(bool_op(a, b))),
            (Operand::Int(a), Operand::Int(b)) => self.push(Operand::Int(int_op(a, b))),
            _ => Err(PostScriptError::TypeCheck),
        }
    }

    fn apply(&mut self, op: PostScriptFunctionOperator) -> PostScriptResult<()> {
        match op {
            PostScriptFunctionOperator::Abs => match self.pop()? {
                Operand::Int(i) => match i.checked_abs() {
                    Some(abs) => self.push(Operand::Int(abs)),
                    None => self.push_number((i as f32).abs()),
                },
                Operand::Real(r) => self.push_number(r.abs()),
                Operand::Bool(..) => Err(PostScriptError::TypeCheck),
            },
            PostScriptFunctionOperator::Neg => match self.pop()? {
                Operand::Int(i) => match i.checked_neg() {
                    Some(neg) => self.push(Operand::Int(neg)),
                    None => self.push_number(-(i as f32)),
                },
                Operand::Real(r) => self.push_number(-r),
                Operand::Bool(..) => Err(PostScriptError::TypeCheck),
            },
            PostScriptFunctionOperator::Add => self.arithmetic(i32::checked_add, |a, b| a + b),
            PostScriptFunctionOperator::Sub => self.arithmetic(i32::checked_sub, |a, b| a - b),
            PostScriptFunctionOperator::Mul => self.arithmetic(i32::checked_mul, |a, b| a * b),
            PostScriptFunctionOperator::Div => {
                let divisor = self.pop_number()?;
                let dividend = self.pop_number()?;

                if divisor == 0.0 {
                    return Err(PostScriptError::UndefinedResult);
                }

                self.push_number(dividend / divisor)
            }
            PostScriptFunctionOperator::Idiv | PostScriptFunctionOperator::Mod => {
                let divisor = self.pop_int()?;
                let dividend = self.pop_int()?;

                let result = if op == PostScriptFunctionOperator::Idiv {
                    dividend.checked_div(divisor)
                } else {
                    dividend.checked_rem(divisor)
                };

                self.push(Operand::Int(result.ok_or(PostScriptError::UndefinedResult)?))
            }
            PostScriptFunctionOperator::Atan => {
                let den = self.pop_number()?;
                let num = self.pop_number()?;

                if num == 0.0 && den == 0.0 {
                    return Err(PostScriptError::UndefinedResult);
                }

                let angle = num.atan2(den).to_degrees();

                self.push_number(if angle < 0.0 { angle + 360.0 } else { angle })
            }
            PostScriptFunctionOperator::Ceiling => self.round_with(f32::ceil),
            PostScriptFunctionOperator::Floor => self.round_with(f32::floor),
            // halfway cases round up, so -2.5 becomes -2
            PostScriptFunctionOperator::Round => self.round_with(|r| (r + 0.5).floor()),
            PostScriptFunctionOperator::Truncate => self.round_with(f32::trunc),
            PostScriptFunctionOperator::Cos => {
                let angle = self.pop_number()?;
                self.push_number(angle.to_radians().cos())
            }
            PostScriptFunctionOperator::Sin => {
                let angle = self.pop_number()?;
                self.push_number(angle.to_radians().sin())
            }
            PostScriptFunctionOperator::Cvi => match self.pop()? {
                Operand::Int(i) => self.push(Operand::Int(i)),
                Operand::Real(r) => {
                    let r = r.trunc();

                    if !(i32::MIN as f32..=i32::MAX as f32).contains(&r) {
                        return Err(PostScriptError::RangeCheck);
                    }

                    self.push(Operand::Int(r as i32))
                }
                Operand::Bool(..) => Err(PostScriptError::TypeCheck),
            },
            PostScriptFunctionOperator::Cvr => {
                let n = self.pop_number()?;
                self.push_number(n)
            }
            PostScriptFunctionOperator::Exp => {
                let exponent = self.pop_number()?;
                let base = self.pop_number()?;
                let result = base.powf(exponent);

                if !result.is_finite() {
                    return Err(PostScriptError::UndefinedResult);
                }

                self.push_number(result)
            }
            PostScriptFunctionOperator::Ln | PostScriptFunctionOperator::Log => {
                let n = self.pop_number()?;

                if n <= 0.0 {
                    return Err(PostScriptError::RangeCheck);
                }

                self.push_number(if op == PostScriptFunctionOperator::Ln {
                    n.ln()
                } else {
                    n.log10()
                })
            }
            PostScriptFunctionOperator::Sqrt => {
                let n = self.pop_number()?;

                if n < 0.0 {
                    return Err(PostScriptError::RangeCheck);
                }

                self.push_number(n.sqrt())
            }
            PostScriptFunctionOperator::And => self.logical(|a, b| a & b, |a, b| a & b),
            PostScriptFunctionOperator::Or => self.logical(|a, b| a | b, |a, b| a | b),
            PostScriptFunctionOperator::Xor => self.logical(|a, b| a ^ b, |a, b| a ^ b),
            PostScriptFunctionOperator::Not => match self.pop()? {
                Operand::Bool(b) => self.push(Operand::Bool(!b)),
                Operand::Int(i) => self.push(Operand::Int(!i)),
                Operand::Real(..) => Err(PostScriptError::TypeCheck),
            },
            PostScriptFunctionOperator::Bitshift => {
                let shift = self.pop_int()?;
                let n = self.pop_int()? as u32;

                let shifted = match shift {
                    0..=31 => n << shift,
                    -31..=-1 => n >> -shift,
                    _ => 0,
                };

                self.push(Operand::Int(shifted as i32))
            }
            PostScriptFunctionOperator::Eq => {
                let eq = self.equality()?;
                self.push(Operand::Bool(eq))
            }
            PostScriptFunctionOperator::Ne => {
                let eq = self.equality()?;
                self.push(Operand::Bool(!eq))
            }
            PostScriptFunctionOperator::Ge => self.compare(i32::ge, f32::ge),
            PostScriptFunctionOperator::Gt => self.compare(i32::gt, f32::gt),
            PostScriptFunctionOperator::Le => self.compare(i32::le, f32::le),
            PostScriptFunctionOperator::Lt => self.compare(i32::lt, f32::lt),
            PostScriptFunctionOperator::True => self.push(Operand::Bool(true)),
            PostScriptFunctionOperator::False => self.push(Operand::Bool(false)),
            PostScriptFunctionOperator::Copy => {
                let n = self.pop_count()?;
                let start = self
                    .stack
                    .len()
                    .checked_sub(n)
                    .ok_or(PostScriptError::RangeCheck)?;

                if self.stack.len() + n > MAX_STACK_DEPTH {
                    return Err(PostScriptError::StackOverflow);
                }

                self.stack.extend_from_within(start..);

                Ok(())
            }
            PostScriptFunctionOperator::Dup => {
                let top = *self.stack.last().ok_or(PostScriptError::StackUnderflow)?;
                self.push(top)
            }
            PostScriptFunctionOperator::Exch => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(b)?;
                self.push(a)
            }
            PostScriptFunctionOperator::Index => {
                let n = self.pop_count()?;
                let idx = self
                    .stack
                    .len()
                    .checked_sub(n + 1)
                    .ok_or(PostScriptError::RangeCheck)?;

                self.push(self.stack[idx])
            }
            PostScriptFunctionOperator::Pop => self.pop().map(drop),
            PostScriptFunctionOperator::Roll => {
                let j = self.pop_int()?;
                let n = self.pop_count()?;

                let start = self
                    .stack
                    .len()
                    .checked_sub(n)
                    .ok_or(PostScriptError::RangeCheck)?;

                if n > 0 {
                    let j = j.rem_euclid(n as i32) as usize;
                    self.stack[start..].rotate_right(j);
                }

                Ok(())
            }
            // consumed by the parser
            PostScriptFunctionOperator::If | PostScriptFunctionOperator::Ifelse => {
                Err(PostScriptError::TypeCheck)
            }
        }
    }
}
