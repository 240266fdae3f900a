use std::{borrow::Cow, fmt};

pub type PostScriptResult<T> = Result<T, PostScriptError>;

/// The subset of PostScript errors a calculator function can raise
#[derive(Debug)]
pub enum PostScriptError {
    SyntaxError(Cow<'static, str>),
    ParseFloatError(fast_float::Error),

    /// Name not known
    Undefined {
        name: String,
    },

    /// Procedures nested too deeply
    ExecStackOverflow,

    /// Operand stack overflow
    StackOverflow,

    /// Operand stack underflow
    StackUnderflow,

    /// Operand of wrong type
    TypeCheck,

    /// Operand out of bounds
    RangeCheck,

    /// Overflow, underflow, or meaningless result
    UndefinedResult,
}

impl From<fast_float::Error> for PostScriptError {
    fn from(err: fast_float::Error) -> Self {
        Self::ParseFloatError(err)
    }
}

impl fmt::Display for PostScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#?}", self)
    }
}

impl std::error::Error for PostScriptError {}
