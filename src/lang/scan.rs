use super::Error;
use std::iter::Peekable;
use std::str::Chars;

type Result<T> = std::result::Result<T, Error>;

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Walks the operand text of one loader line.
pub struct Scanner<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Scanner<'a> {
    pub fn new(s: &'a str) -> Scanner<'a> {
        Scanner {
            chars: s.chars().peekable(),
        }
    }

    pub fn skip_blanks(&mut self) {
        while let Some(c) = self.chars.peek() {
            if !is_blank(*c) {
                break;
            }
            self.chars.next();
        }
    }

    pub fn next_char(&mut self) -> Option<char> {
        self.chars.next()
    }

    pub fn peek_non_blank(&mut self) -> Option<char> {
        self.skip_blanks();
        self.chars.peek().copied()
    }

    pub fn non_blank(&mut self) -> Option<char> {
        self.skip_blanks();
        self.chars.next()
    }

    /// Three letter name, as used for mnemonics and procedure names.
    pub fn name(&mut self) -> Result<String> {
        self.skip_blanks();
        let name: String = self.chars.by_ref().take(3).collect();
        if name.chars().count() < 3 {
            return Err(error!(ParseFault; "NAME EXPECTED"));
        }
        Ok(name.to_ascii_uppercase())
    }

    fn digits(&mut self, s: &mut String) -> usize {
        let mut count = 0;
        while let Some(c) = self.chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            s.push(*c);
            self.chars.next();
            count += 1;
        }
        count
    }

    fn sign(&mut self, s: &mut String) {
        if let Some(c) = self.chars.peek() {
            if *c == '-' || *c == '+' {
                s.push(*c);
                self.chars.next();
            }
        }
    }

    pub fn integer(&mut self) -> Result<i64> {
        self.skip_blanks();
        let mut s = String::new();
        self.sign(&mut s);
        if self.digits(&mut s) == 0 {
            return Err(error!(ParseFault; "INTEGER EXPECTED"));
        }
        match s.parse::<i64>() {
            Ok(n) => Ok(n),
            Err(_) => Err(error!(ParseFault; "INTEGER TOO LARGE")),
        }
    }

    pub fn unsigned(&mut self) -> Result<usize> {
        self.skip_blanks();
        let mut s = String::new();
        if self.digits(&mut s) == 0 {
            return Err(error!(ParseFault; "INTEGER EXPECTED"));
        }
        match s.parse::<usize>() {
            Ok(n) => Ok(n),
            Err(_) => Err(error!(ParseFault; "INTEGER TOO LARGE")),
        }
    }

    pub fn real(&mut self) -> Result<f64> {
        self.skip_blanks();
        let mut s = String::new();
        self.sign(&mut s);
        let mut digits = self.digits(&mut s);
        if self.chars.peek() == Some(&'.') {
            s.push('.');
            self.chars.next();
            digits += self.digits(&mut s);
        }
        if digits == 0 {
            return Err(error!(ParseFault; "REAL EXPECTED"));
        }
        if let Some('e') | Some('E') = self.chars.peek() {
            s.push('E');
            self.chars.next();
            self.sign(&mut s);
            if self.digits(&mut s) == 0 {
                return Err(error!(ParseFault; "EXPONENT EXPECTED"));
            }
        }
        match s.parse::<f64>() {
            Ok(n) => Ok(n),
            Err(_) => Err(error!(ParseFault; "REAL EXPECTED")),
        }
    }

    /// Label reference: skips to the `L` marker and reads the label number.
    pub fn label(&mut self) -> Result<usize> {
        loop {
            match self.chars.next() {
                Some('L') | Some('l') => return self.unsigned(),
                Some(_) => continue,
                None => return Err(error!(ParseFault; "LABEL EXPECTED")),
            }
        }
    }

    /// Characters up to, not including, the next `delimiter`.
    pub fn until(&mut self, delimiter: char) -> Result<String> {
        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == delimiter => return Ok(s),
                Some(c) => s.push(c),
                None => return Err(error!(ParseFault; "UNTERMINATED STRING")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer() {
        let mut s = Scanner::new("123 one two");
        assert_eq!(s.integer().unwrap(), 123);
        let mut s = Scanner::new("  -456   ");
        assert_eq!(s.integer().unwrap(), -456);
        assert!(Scanner::new("baz").integer().is_err());
        assert!(Scanner::new("").integer().is_err());
    }

    #[test]
    fn test_real() {
        assert_eq!(Scanner::new(" 3.25").real().unwrap(), 3.25);
        assert_eq!(Scanner::new("-1.5E2").real().unwrap(), -150.0);
        assert_eq!(Scanner::new("7").real().unwrap(), 7.0);
        assert!(Scanner::new("1.0E").real().is_err());
    }

    #[test]
    fn test_name_and_non_blank() {
        let mut s = Scanner::new("  ldc I 5");
        assert_eq!(s.name().unwrap(), "LDC");
        assert_eq!(s.non_blank(), Some('I'));
        assert_eq!(s.integer().unwrap(), 5);
        assert_eq!(s.non_blank(), None);
        assert!(Scanner::new(" AB").name().is_err());
    }

    #[test]
    fn test_label() {
        let mut s = Scanner::new("  3  L12");
        assert_eq!(s.unsigned().unwrap(), 3);
        assert_eq!(s.label().unwrap(), 12);
        assert!(Scanner::new(" 12").label().is_err());
    }

    #[test]
    fn test_until() {
        let mut s = Scanner::new("HI THERE' rest");
        assert_eq!(s.until('\'').unwrap(), "HI THERE");
        assert!(Scanner::new("OPEN").until('\'').is_err());
    }
}
