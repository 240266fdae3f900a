use std::borrow::Cow;

use crate::{
    error::{ParseError, PdfResult},
    resolve::Resolve,
    stream::Stream,
};

use self::{
    lexer::{PostScriptFunctionLexer, PostScriptFunctionOperator, PostScriptFunctionToken},
    machine::{Operand, OperandStack},
};

pub use error::{PostScriptError, PostScriptResult};

mod error;
mod lexer;
mod machine;

/// Deepest nesting of `{ }` procedures accepted by the parser
const MAX_PROCEDURE_DEPTH: usize = 100;

/// A type 4 function (PDF 1.3), also called a PostScript calculator function, shall be
/// represented as a stream containing code written in a small subset of the PostScript language
#[derive(Debug, Clone)]
pub struct PostScriptCalculatorFunction {
    program: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Instruction {
    Push(Operand),
    Operator(PostScriptFunctionOperator),
    If(Vec<Instruction>),
    IfElse(Vec<Instruction>, Vec<Instruction>),
}

impl PostScriptCalculatorFunction {
    pub fn from_stream(stream: Stream, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let buffer = stream.decode(resolver)?;

        Ok(Self::parse(&buffer).map_err(ParseError::from)?)
    }

    fn parse(source: &[u8]) -> PostScriptResult<Self> {
        let mut lexer = PostScriptFunctionLexer::new(source);

        if lexer.next_token()? != Some(PostScriptFunctionToken::OpenCurlyBrace) {
            return Err(PostScriptError::SyntaxError(Cow::Borrowed(
                "calculator functions must start with '{'",
            )));
        }

        let program = parse_procedure(&mut lexer, 1)?;

        if lexer.next_token()?.is_some() {
            return Err(PostScriptError::SyntaxError(Cow::Borrowed(
                "unexpected data after the end of the function",
            )));
        }

        Ok(Self { program })
    }

    /// Run the program with the inputs on the stack, then take the top
    /// `results.len()` values as outputs (deepest first)
    pub fn call(&self, inputs: &[f32], results: &mut [f32]) -> PostScriptResult<()> {
        let mut stack = OperandStack::new();

        for &input in inputs {
            stack.push(Operand::Real(input))?;
        }

        stack.execute(&self.program)?;

        let outputs = stack.top(results.len())?;

        for (result, output) in results.iter_mut().zip(outputs) {
            *result = output.to_f32();
        }

        Ok(())
    }
}

/// Parse the body of a procedure whose `{` has already been consumed
fn parse_procedure(
    lexer: &mut PostScriptFunctionLexer,
    depth: usize,
) -> PostScriptResult<Vec<Instruction>> {
    if depth > MAX_PROCEDURE_DEPTH {
        return Err(PostScriptError::ExecStackOverflow);
    }

    let mut instructions = Vec::new();

    // procedures waiting for their `if` or `ifelse`
    let mut pending: Vec<Vec<Instruction>> = Vec::new();

    loop {
        let token = lexer.next_token()?.ok_or(PostScriptError::SyntaxError(Cow::Borrowed(
            "unterminated procedure",
        )))?;

        let instruction = match token {
            PostScriptFunctionToken::OpenCurlyBrace => {
                pending.push(parse_procedure(lexer, depth + 1)?);
                continue;
            }
            PostScriptFunctionToken::Operator(PostScriptFunctionOperator::If) => {
                let [proc] = <[_; 1]>::try_from(std::mem::take(&mut pending))
                    .map_err(|_| PostScriptError::TypeCheck)?;

                Instruction::If(proc)
            }
            PostScriptFunctionToken::Operator(PostScriptFunctionOperator::Ifelse) => {
                let [then_proc, else_proc] = <[_; 2]>::try_from(std::mem::take(&mut pending))
                    .map_err(|_| PostScriptError::TypeCheck)?;

                Instruction::IfElse(then_proc, else_proc)
            }
            _ if !pending.is_empty() => {
                return Err(PostScriptError::SyntaxError(Cow::Borrowed(
                    "procedures may only be used by if and ifelse",
                )));
            }
            PostScriptFunctionToken::CloseCurlyBrace => return Ok(instructions),
            PostScriptFunctionToken::Operator(PostScriptFunctionOperator::True) => {
                Instruction::Push(Operand::Bool(true))
            }
            PostScriptFunctionToken::Operator(PostScriptFunctionOperator::False) => {
                Instruction::Push(Operand::Bool(false))
            }
            PostScriptFunctionToken::Operator(op) => Instruction::Operator(op),
            PostScriptFunctionToken::Integer(i) => Instruction::Push(Operand::Int(i)),
            PostScriptFunctionToken::Real(r) => Instruction::Push(Operand::Real(r)),
        };

        instructions.push(instruction);
    }
}
