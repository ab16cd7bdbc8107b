//! Interactive prompting.
//!
//! Every question loops until the answer parses and validates, then hands a
//! plain value back to the caller. Nothing in the core library prompts.

use std::io::{self, BufRead, Write};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr so stdout stays clean for `--json` output.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("input closed while waiting for '{label}'"),
            ));
        }
        Ok(line.trim().to_string())
    }

    /// Ask until `parse` accepts the answer.
    pub fn ask<T, F>(&mut self, label: &str, mut parse: F) -> io::Result<T>
    where
        F: FnMut(&str) -> Result<T, String>,
    {
        loop {
            let line = self.read_line(label)?;
            match parse(&line) {
                Ok(v) => return Ok(v),
                Err(msg) => writeln!(self.output, "{msg}, please try again")?,
            }
        }
    }

    /// Like [`Prompter::ask`], but a blank answer means "none".
    pub fn ask_optional<T, F>(&mut self, label: &str, mut parse: F) -> io::Result<Option<T>>
    where
        F: FnMut(&str) -> Result<T, String>,
    {
        self.ask(label, |line| {
            if line.is_empty() {
                Ok(None)
            } else {
                parse(line).map(Some)
            }
        })
    }

    /// Show numbered choices and ask for one of their indices.
    pub fn choose(&mut self, label: &str, choices: &[String]) -> io::Result<usize> {
        for (i, c) in choices.iter().enumerate() {
            writeln!(self.output, "{i} : {c}")?;
        }
        let len = choices.len();
        self.ask(label, |s| match s.parse::<usize>() {
            Ok(i) if i < len => Ok(i),
            Ok(i) => Err(format!("{i} is not one of 0..{len}")),
            Err(_) => Err(format!("'{s}' is not an index")),
        })
    }
}

pub fn parse_f64(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("'{s}' is not a number")),
    }
}

pub fn parse_u32(s: &str) -> Result<u32, String> {
    s.parse::<u32>()
        .map_err(|_| format!("'{s}' is not a whole number"))
}

/// A number within `[lo, hi]`.
pub fn time_within(lo: f64, hi: f64) -> impl FnMut(&str) -> Result<f64, String> {
    move |s| {
        let t = parse_f64(s)?;
        if t < lo || t > hi {
            Err(format!("{t} is not within the series time range of [{lo}, {hi}]"))
        } else {
            Ok(t)
        }
    }
}
