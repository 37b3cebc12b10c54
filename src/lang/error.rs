use crate::mach::Address;

#[derive(Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    line_number: Option<usize>,
    address: Option<Address>,
    message: String,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, $line:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_line_number($line)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, $line:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code,
            line_number: None,
            address: None,
            message: String::new(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn line_number(&self) -> Option<usize> {
        self.line_number
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn is_fatal(&self) -> bool {
        self.code != ErrorCode::DuplicateLabel
    }

    /// Line of the loader input, counted from 1.
    pub fn in_line_number(&self, line: usize) -> Error {
        debug_assert!(self.line_number.is_none());
        Error {
            code: self.code,
            line_number: Some(line),
            address: self.address,
            message: self.message.clone(),
        }
    }

    /// Code address of the faulting instruction.
    pub fn at_address(&self, address: Address) -> Error {
        Error {
            code: self.code,
            line_number: self.line_number,
            address: Some(address),
            message: self.message.clone(),
        }
    }

    pub fn message(&self, message: &str) -> Error {
        debug_assert_eq!(self.message.len(), 0);
        Error {
            code: self.code,
            line_number: self.line_number,
            address: self.address,
            message: message.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Error {
        Error::new(ErrorCode::DiskIoError).message(&error.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseFault = 2,
    Overflow = 6,
    StoreOverflow = 7,
    UndefinedLabel = 8,
    ValueOutOfRange = 9,
    DuplicateLabel = 10,
    DivisionByZero = 11,
    TypeMismatch = 13,
    ValueUndefined = 14,
    TableOverflow = 16,
    UnknownInstruction = 18,
    Interrupted = 21,
    InternalError = 51,
    BadFileNumber = 52,
    FileDirectionViolation = 54,
    DiskIoError = 57,
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use ErrorCode::*;
        let code_str = match self.code {
            ParseFault => "PARSE FAULT",
            Overflow => "OVERFLOW",
            StoreOverflow => "STORE OVERFLOW",
            UndefinedLabel => "UNDEFINED LABEL",
            ValueOutOfRange => "VALUE OUT OF RANGE",
            DuplicateLabel => "DUPLICATED LABEL",
            DivisionByZero => "DIVISION BY ZERO",
            TypeMismatch => "TYPE MISMATCH",
            ValueUndefined => "VALUE UNDEFINED",
            TableOverflow => "TABLE OVERFLOW",
            UnknownInstruction => "UNKNOWN INSTRUCTION",
            Interrupted => "BREAK",
            InternalError => "INTERNAL ERROR",
            BadFileNumber => "BAD FILE NUMBER",
            FileDirectionViolation => "BAD FILE MODE",
            DiskIoError => "DISK I/O ERROR",
        };
        let mut suffix = String::new();
        if let Some(line_number) = self.line_number {
            suffix.push_str(&format!(" LINE {}", line_number));
        }
        if let Some(address) = self.address {
            suffix.push_str(&format!(" ADDRESS {}", address));
        }
        if suffix.is_empty() {
            write!(f, "{}", code_str)?;
        } else {
            write!(f, "{} IN{}", code_str, suffix)?;
        }
        if !self.message.is_empty() {
            write!(f, "; {}", self.message)?;
        }
        Ok(())
    }
}
