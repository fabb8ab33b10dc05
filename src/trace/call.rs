//! Allocator calls as they appear in a trace
//!
//! [`Function`] names the calls we understand, [`Arg`] is a sanitized
//! argument token, and [`Call`] is the typed, arity-checked form that the
//! replay engine consumes.

use crate::error::TraceError;
use std::fmt;

/// Wire names of every call the replay engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Malloc,
    Calloc,
    Free,
    Realloc,
    Reallocarray,
    Reallocf,
    Valloc,
    Memalign,
    AlignedAlloc,
    /// `@villoc(message)`: user annotation, not an allocator call
    Annotate,
}

impl Function {
    pub const ALL: [Function; 10] = [
        Function::Malloc,
        Function::Calloc,
        Function::Free,
        Function::Realloc,
        Function::Reallocarray,
        Function::Reallocf,
        Function::Valloc,
        Function::Memalign,
        Function::AlignedAlloc,
        Function::Annotate,
    ];

    pub fn from_name(name: &str) -> Option<Function> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Malloc => "malloc",
            Function::Calloc => "calloc",
            Function::Free => "free",
            Function::Realloc => "realloc",
            Function::Reallocarray => "reallocarray",
            Function::Reallocf => "reallocf",
            Function::Valloc => "valloc",
            Function::Memalign => "memalign",
            Function::AlignedAlloc => "aligned_alloc",
            Function::Annotate => "@villoc",
        }
    }

    /// Number of numeric arguments the call takes.
    pub fn arity(self) -> usize {
        match self {
            Function::Malloc | Function::Free | Function::Valloc | Function::Annotate => 1,
            Function::Calloc
            | Function::Realloc
            | Function::Reallocf
            | Function::Memalign
            | Function::AlignedAlloc => 2,
            Function::Reallocarray => 3,
        }
    }
}

/// A sanitized argument or return token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Int(u64),
    Str(String),
}

impl Arg {
    /// `<void>` and `(nil)` read as zero, numeric literals as numbers,
    /// anything else is kept verbatim.
    pub fn sanitize(token: &str) -> Arg {
        let token = token.trim();
        if token == "<void>" || token == "(nil)" {
            return Arg::Int(0);
        }
        match parse_number(token) {
            Some(n) => Arg::Int(n),
            None => Arg::Str(token.to_string()),
        }
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            Arg::Int(n) => Some(*n),
            Arg::Str(_) => None,
        }
    }
}

/// Parse an unsigned integer literal in hex, octal, binary or decimal notation.
pub fn parse_number(token: &str) -> Option<u64> {
    let token = token.trim();
    let lower = token.to_ascii_lowercase();
    let (digits, radix) = if let Some(hex) = lower.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        (oct, 8)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (bin, 2)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (&lower[1..], 8)
    } else {
        (lower.as_str(), 10)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

/// A decoded allocator call with its arguments in wire order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Malloc { size: u64 },
    Calloc { nmemb: u64, size: u64 },
    Free { ptr: u64 },
    Realloc { ptr: u64, size: u64 },
    Reallocarray { ptr: u64, nmemb: u64, size: u64 },
    Reallocf { ptr: u64, size: u64 },
    Valloc { size: u64 },
    Memalign { align: u64, size: u64 },
    AlignedAlloc { align: u64, size: u64 },
    Annotate { message: String },
}

impl Call {
    /// Check arity and argument types for `function`.
    pub fn decode(function: Function, args: Vec<Arg>, line: usize) -> Result<Call, TraceError> {
        if function == Function::Annotate {
            let message = args
                .into_iter()
                .map(|a| match a {
                    Arg::Int(n) => format!("{:#x}", n),
                    Arg::Str(s) => s,
                })
                .collect::<Vec<_>>()
                .join(", ");
            return Ok(Call::Annotate { message });
        }

        if args.len() != function.arity() {
            return Err(TraceError::Arity {
                line,
                function: function.name(),
                expected: function.arity(),
                got: args.len(),
            });
        }

        let mut nums = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Arg::Int(n) => nums.push(n),
                Arg::Str(token) => {
                    return Err(TraceError::NotANumber {
                        line,
                        function: function.name(),
                        token,
                    })
                }
            }
        }

        let call = match (function, nums.as_slice()) {
            (Function::Malloc, &[size]) => Call::Malloc { size },
            (Function::Calloc, &[nmemb, size]) => Call::Calloc { nmemb, size },
            (Function::Free, &[ptr]) => Call::Free { ptr },
            (Function::Realloc, &[ptr, size]) => Call::Realloc { ptr, size },
            (Function::Reallocarray, &[ptr, nmemb, size]) => Call::Reallocarray { ptr, nmemb, size },
            (Function::Reallocf, &[ptr, size]) => Call::Reallocf { ptr, size },
            (Function::Valloc, &[size]) => Call::Valloc { size },
            (Function::Memalign, &[align, size]) => Call::Memalign { align, size },
            (Function::AlignedAlloc, &[align, size]) => Call::AlignedAlloc { align, size },
            _ => {
                return Err(TraceError::Arity {
                    line,
                    function: function.name(),
                    expected: function.arity(),
                    got: nums.len(),
                })
            }
        };
        Ok(call)
    }

    pub fn function(&self) -> Function {
        match self {
            Call::Malloc { .. } => Function::Malloc,
            Call::Calloc { .. } => Function::Calloc,
            Call::Free { .. } => Function::Free,
            Call::Realloc { .. } => Function::Realloc,
            Call::Reallocarray { .. } => Function::Reallocarray,
            Call::Reallocf { .. } => Function::Reallocf,
            Call::Valloc { .. } => Function::Valloc,
            Call::Memalign { .. } => Function::Memalign,
            Call::AlignedAlloc { .. } => Function::AlignedAlloc,
            Call::Annotate { .. } => Function::Annotate,
        }
    }

    /// Numeric arguments in wire order (empty for annotations).
    pub fn args(&self) -> Vec<u64> {
        match *self {
            Call::Malloc { size } | Call::Valloc { size } => vec![size],
            Call::Free { ptr } => vec![ptr],
            Call::Calloc { nmemb, size } => vec![nmemb, size],
            Call::Realloc { ptr, size } | Call::Reallocf { ptr, size } => vec![ptr, size],
            Call::Reallocarray { ptr, nmemb, size } => vec![ptr, nmemb, size],
            Call::Memalign { align, size } | Call::AlignedAlloc { align, size } => {
                vec![align, size]
            }
            Call::Annotate { .. } => Vec::new(),
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Call::Annotate { message } = self {
            return write!(f, "{}({})", Function::Annotate.name(), message);
        }
        let args = self
            .args()
            .iter()
            .map(|a| format!("{:#x}", a))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({})", self.function().name(), args)
    }
}

/// One normalized trace record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// 1-based line number in the trace
    pub line: usize,
    pub call: Call,
    /// `None` when the traced program died inside the call
    pub ret: Option<u64>,
}

impl Event {
    pub fn new(call: Call, ret: Option<u64>) -> Self {
        Event { line: 0, call, ret }
    }
}
