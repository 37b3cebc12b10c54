use super::Address;
use crate::error;
use crate::lang::Error;
use std::io::{BufRead, Write};

type Result<T> = std::result::Result<T, Error>;

/// Store addresses of the file buffers; also the file numbers.
pub const INPUT: Address = 4;
pub const OUTPUT: Address = 5;
pub const PRD: Address = 6;
pub const PRR: Address = 7;

/// Character code delivered for a line end.
pub const CARRIAGE_RETURN: i64 = 13;

/// ## Text input
///
/// Lines are loaded on demand so `eoln` and `eof` can be answered
/// without blocking on interactive input until the program asks.

pub struct Reader<'a> {
    inner: Box<dyn BufRead + 'a>,
    line: Vec<u8>,
    pos: usize,
    exhausted: bool,
}

impl<'a> Reader<'a> {
    pub fn new(inner: impl BufRead + 'a) -> Reader<'a> {
        Reader {
            inner: Box::new(inner),
            line: Vec::new(),
            pos: 0,
            exhausted: false,
        }
    }

    fn fill(&mut self) -> Result<()> {
        if self.pos < self.line.len() || self.exhausted {
            return Ok(());
        }
        self.line.clear();
        self.pos = 0;
        if self.inner.read_until(b'\n', &mut self.line)? == 0 {
            self.exhausted = true;
        } else if self.line.ends_with(b"\r\n") {
            let len = self.line.len();
            self.line.remove(len - 2);
        }
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<u8>> {
        self.fill()?;
        Ok(self.line.get(self.pos).copied())
    }

    pub fn eof(&mut self) -> Result<bool> {
        Ok(self.peek()?.is_none())
    }

    pub fn eol(&mut self) -> Result<bool> {
        Ok(matches!(self.peek()?, None | Some(b'\n')))
    }

    /// Next character code. Line ends read as carriage return,
    /// the end of the file as 0.
    pub fn read(&mut self) -> Result<i64> {
        match self.peek()? {
            None => Ok(0),
            Some(b'\n') => {
                self.pos += 1;
                Ok(CARRIAGE_RETURN)
            }
            Some(c) => {
                self.pos += 1;
                Ok(i64::from(c))
            }
        }
    }

    /// Skips past the next line end.
    pub fn read_line(&mut self) -> Result<()> {
        while let Some(c) = self.peek()? {
            self.pos += 1;
            if c == b'\n' {
                break;
            }
        }
        Ok(())
    }

    fn skip_space(&mut self) -> Result<()> {
        while let Some(c) = self.peek()? {
            if !c.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
        Ok(())
    }

    fn take_while(&mut self, s: &mut String, f: fn(u8) -> bool) -> Result<usize> {
        let mut count = 0;
        while let Some(c) = self.peek()? {
            if !f(c) {
                break;
            }
            s.push(char::from(c));
            self.pos += 1;
            count += 1;
        }
        Ok(count)
    }

    fn sign(&mut self, s: &mut String) -> Result<()> {
        if let Some(c @ b'-') | Some(c @ b'+') = self.peek()? {
            s.push(char::from(c));
            self.pos += 1;
        }
        Ok(())
    }

    pub fn read_integer(&mut self) -> Result<i64> {
        self.skip_space()?;
        let mut s = String::new();
        self.sign(&mut s)?;
        if self.take_while(&mut s, |c| c.is_ascii_digit())? == 0 {
            return Err(error!(ParseFault; "INTEGER EXPECTED"));
        }
        match s.parse::<i64>() {
            Ok(n) => Ok(n),
            Err(_) => Err(error!(Overflow; "INTEGER INPUT")),
        }
    }

    pub fn read_real(&mut self) -> Result<f64> {
        self.skip_space()?;
        let mut s = String::new();
        self.sign(&mut s)?;
        let mut digits = self.take_while(&mut s, |c| c.is_ascii_digit())?;
        if self.peek()? == Some(b'.') {
            s.push('.');
            self.pos += 1;
            digits += self.take_while(&mut s, |c| c.is_ascii_digit())?;
        }
        if digits == 0 {
            return Err(error!(ParseFault; "REAL EXPECTED"));
        }
        if let Some(b'e') | Some(b'E') = self.peek()? {
            s.push('E');
            self.pos += 1;
            self.sign(&mut s)?;
            if self.take_while(&mut s, |c| c.is_ascii_digit())? == 0 {
                return Err(error!(ParseFault; "EXPONENT EXPECTED"));
            }
        }
        match s.parse::<f64>() {
            Ok(n) => Ok(n),
            Err(_) => Err(error!(ParseFault; "REAL EXPECTED")),
        }
    }
}

enum Channel<'a> {
    Input(Reader<'a>),
    Output(Box<dyn Write + 'a>),
}

/// ## Bound files
///
/// The four Pascal files the machine knows by number:
/// `input` and `prd` read, `output` and `prr` write.

pub struct Files<'a> {
    channels: Vec<Channel<'a>>,
}

impl<'a> Files<'a> {
    pub fn new(
        input: impl BufRead + 'a,
        output: impl Write + 'a,
        prd: impl BufRead + 'a,
        prr: impl Write + 'a,
    ) -> Files<'a> {
        Files {
            channels: vec![
                Channel::Input(Reader::new(input)),
                Channel::Output(Box::new(output)),
                Channel::Input(Reader::new(prd)),
                Channel::Output(Box::new(prr)),
            ],
        }
    }

    fn channel(&mut self, file: Address) -> Result<&mut Channel<'a>> {
        if file < INPUT {
            return Err(error!(BadFileNumber));
        }
        match self.channels.get_mut(file - INPUT) {
            Some(channel) => Ok(channel),
            None => Err(error!(BadFileNumber)),
        }
    }

    pub fn reader(&mut self, file: Address) -> Result<&mut Reader<'a>> {
        match self.channel(file)? {
            Channel::Input(reader) => Ok(reader),
            Channel::Output(_) => Err(error!(FileDirectionViolation; "OUTPUT FILE")),
        }
    }

    pub fn writer(&mut self, file: Address) -> Result<&mut (dyn Write + 'a)> {
        match self.channel(file)? {
            Channel::Output(writer) => Ok(writer.as_mut()),
            Channel::Input(_) => Err(error!(FileDirectionViolation; "INPUT FILE")),
        }
    }

    /// Output files are always at their end.
    pub fn eof(&mut self, file: Address) -> Result<bool> {
        match self.channel(file)? {
            Channel::Input(reader) => reader.eof(),
            Channel::Output(_) => Ok(true),
        }
    }

    pub fn eol(&mut self, file: Address) -> Result<bool> {
        self.reader(file)?.eol()
    }

    pub fn write_str(&mut self, file: Address, s: &str) -> Result<()> {
        self.write_bytes(file, s.as_bytes())
    }

    /// Character data goes out byte for byte, as it was read.
    pub fn write_bytes(&mut self, file: Address, bytes: &[u8]) -> Result<()> {
        self.writer(file)?.write_all(bytes)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        for channel in self.channels.iter_mut() {
            if let Channel::Output(writer) = channel {
                writer.flush()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_characters_and_line_ends() {
        let mut r = Reader::new("Hi\r\nX".as_bytes());
        assert!(!r.eol().unwrap());
        assert_eq!(r.read().unwrap(), 72);
        assert_eq!(r.read().unwrap(), 105);
        assert!(r.eol().unwrap());
        assert_eq!(r.read().unwrap(), CARRIAGE_RETURN);
        assert!(!r.eof().unwrap());
        assert_eq!(r.read().unwrap(), 88);
        assert!(r.eol().unwrap());
        assert!(r.eof().unwrap());
        assert_eq!(r.read().unwrap(), 0);
    }

    #[test]
    fn test_read_line() {
        let mut r = Reader::new("Hello,\nThis is a text!\n".as_bytes());
        r.read().unwrap();
        r.read_line().unwrap();
        assert_eq!(r.read().unwrap(), i64::from(b'T'));
        r.read_line().unwrap();
        assert!(r.eof().unwrap());
    }

    #[test]
    fn test_numbers() {
        let mut r = Reader::new("  12 -7\n\n 4.5 1e3 x".as_bytes());
        assert_eq!(r.read_integer().unwrap(), 12);
        assert_eq!(r.read_integer().unwrap(), -7);
        assert_eq!(r.read_real().unwrap(), 4.5);
        assert_eq!(r.read_real().unwrap(), 1000.0);
        let e = r.read_integer().unwrap_err();
        assert_eq!(e.code(), ErrorCode::ParseFault);
    }

    #[test]
    fn test_direction_and_numbers() {
        let mut out = Vec::new();
        let mut prr = Vec::new();
        {
            let mut files = Files::new("".as_bytes(), &mut out, "".as_bytes(), &mut prr);
            files.write_str(OUTPUT, "out").unwrap();
            files.write_str(PRR, "prr").unwrap();
            let e = files.reader(OUTPUT).err().unwrap();
            assert_eq!(e.code(), ErrorCode::FileDirectionViolation);
            let e = files.write_str(PRD, "x").unwrap_err();
            assert_eq!(e.code(), ErrorCode::FileDirectionViolation);
            let e = files.reader(8).err().unwrap();
            assert_eq!(e.code(), ErrorCode::BadFileNumber);
            let e = files.reader(3).err().unwrap();
            assert_eq!(e.code(), ErrorCode::BadFileNumber);
            assert!(files.eof(INPUT).unwrap());
            assert!(files.eof(OUTPUT).unwrap());
            files.flush().unwrap();
        }
        assert_eq!(out, b"out");
        assert_eq!(prr, b"prr");
    }
}
