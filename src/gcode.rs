// Copyright 2024 the Arcfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reading and writing G-code lines, and a line-by-line arc welder.
//!
//! Only the handful of commands that matter for arc welding are
//! understood: extruding linear moves, other motion that changes the
//! position, and the extrusion mode switches. Every other line is passed
//! through untouched.

use alloc::collections::VecDeque;
use alloc::string::String;
use core::fmt::{self, Write};

use log::debug;
use smallvec::SmallVec;

use crate::{ArcDirection, ArcFitOptions, ArcForm, ArcMatcher, ArcMove, Commit, ExtrusionMode, Move};

/// A G-code line, as far as arc welding is concerned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// `G1` with exactly the words `X`, `Y` and `E`: a candidate for welding.
    Extrude(Move),
    /// Any other `G0` to `G3` line, with the coordinates it sets.
    Motion {
        /// The `X` word, if present.
        x: Option<f64>,
        /// The `Y` word, if present.
        y: Option<f64>,
    },
    /// `M82` or `M83`.
    ExtrusionMode(ExtrusionMode),
    /// Anything else, including blank and comment-only lines.
    Other,
}

/// An error lexing a G-code line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GcodeParseError {
    /// A byte that cannot start a word, at the given offset.
    UnexpectedByte(usize),
    /// A word letter with no number after it, at the given offset.
    MissingNumber(usize),
}

impl fmt::Display for GcodeParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GcodeParseError::UnexpectedByte(ix) => write!(f, "Unexpected byte at offset {ix}"),
            GcodeParseError::MissingNumber(ix) => write!(f, "Missing number at offset {ix}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GcodeParseError {}

impl Command {
    /// Classify a line, treating lines that do not lex as [`Command::Other`].
    ///
    /// # Examples
    ///
    /// ```
    /// use arcfit::gcode::Command;
    /// use arcfit::Move;
    ///
    /// let cmd = Command::parse("G1 X10.5 Y2 E0.25 ; perimeter");
    /// assert_eq!(cmd, Command::Extrude(Move::new((10.5, 2.0), 0.25)));
    /// assert_eq!(Command::parse("G28"), Command::Other);
    /// ```
    pub fn parse(line: &str) -> Command {
        Self::try_parse(line).unwrap_or_else(|err| {
            debug!("passing through malformed line {line:?}: {err}");
            Command::Other
        })
    }

    /// Classify a line, reporting lexing errors.
    ///
    /// A line is a sequence of words, a letter followed by a number, up to
    /// an optional `;` comment. Parenthesized comments may appear between
    /// words. Letters are case-insensitive.
    pub fn try_parse(line: &str) -> Result<Command, GcodeParseError> {
        let mut lexer = GcodeLexer::new(line);
        let Some(letter) = lexer.get_letter()? else {
            return Ok(Command::Other);
        };
        let value = lexer.get_number()?;
        let mut words: SmallVec<[Word; 4]> = SmallVec::new();
        while let Some(letter) = lexer.get_letter()? {
            let value = lexer.get_number()?;
            words.push(Word { letter, value });
        }

        let code = value as u32;
        if code as f64 != value {
            return Ok(Command::Other);
        }
        Ok(match (letter, code) {
            (b'G', 1) => Self::linear(&words),
            (b'G', 0..=3) => Self::motion(&words),
            (b'M', 82) => Command::ExtrusionMode(ExtrusionMode::Absolute),
            (b'M', 83) => Command::ExtrusionMode(ExtrusionMode::Relative),
            _ => Command::Other,
        })
    }

    fn linear(words: &[Word]) -> Command {
        let (mut x, mut y, mut e) = (None, None, None);
        for word in words {
            let slot = match word.letter {
                b'X' => &mut x,
                b'Y' => &mut y,
                b'E' => &mut e,
                _ => return Self::motion(words),
            };
            if slot.replace(word.value).is_some() {
                return Self::motion(words);
            }
        }
        match (x, y, e) {
            (Some(x), Some(y), Some(e)) => Command::Extrude(Move::new((x, y), e)),
            _ => Self::motion(words),
        }
    }

    fn motion(words: &[Word]) -> Command {
        let find = |letter| words.iter().rev().find(|w| w.letter == letter).map(|w| w.value);
        Command::Motion {
            x: find(b'X'),
            y: find(b'Y'),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Word {
    letter: u8,
    value: f64,
}

struct GcodeLexer<'a> {
    data: &'a str,
    ix: usize,
}

impl<'a> GcodeLexer<'a> {
    fn new(line: &'a str) -> GcodeLexer<'a> {
        let data = line.find(';').map_or(line, |end| &line[..end]);
        GcodeLexer { data, ix: 0 }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.get_byte() {
            if c == b'(' {
                while let Some(c) = self.get_byte() {
                    if c == b')' {
                        break;
                    }
                }
            } else if !(c == b' ' || c == b'\t' || c == b'\r' || c == b'\n') {
                self.unget();
                break;
            }
        }
    }

    fn get_byte(&mut self) -> Option<u8> {
        self.data.as_bytes().get(self.ix).map(|&c| {
            self.ix += 1;
            c
        })
    }

    fn unget(&mut self) {
        self.ix -= 1;
    }

    /// The next word letter, upper-cased, or `None` at the end of the line.
    fn get_letter(&mut self) -> Result<Option<u8>, GcodeParseError> {
        self.skip_ws();
        match self.get_byte() {
            None => Ok(None),
            Some(c) if c.is_ascii_alphabetic() => Ok(Some(c.to_ascii_uppercase())),
            Some(_) => Err(GcodeParseError::UnexpectedByte(self.ix - 1)),
        }
    }

    fn get_number(&mut self) -> Result<f64, GcodeParseError> {
        self.skip_ws();
        let start = self.ix;
        match self.get_byte() {
            Some(b'-' | b'+') | None => (),
            Some(_) => self.unget(),
        }
        let mut digit_count = 0;
        let mut seen_period = false;
        while let Some(c) = self.get_byte() {
            if c.is_ascii_digit() {
                digit_count += 1;
            } else if c == b'.' && !seen_period {
                seen_period = true;
            } else {
                self.unget();
                break;
            }
        }
        if digit_count == 0 {
            return Err(GcodeParseError::MissingNumber(start));
        }
        self.data[start..self.ix]
            .parse()
            .map_err(|_| GcodeParseError::MissingNumber(start))
    }
}

/// Decimal places used when writing moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GcodeFormat {
    /// Decimal places of coordinates, radii and center offsets.
    pub coord_decimals: usize,
    /// Decimal places of the extrusion amount.
    pub amount_decimals: usize,
}

impl Default for GcodeFormat {
    fn default() -> Self {
        GcodeFormat {
            coord_decimals: 3,
            amount_decimals: 5,
        }
    }
}

impl ArcDirection {
    /// The G-code command for arcs in this direction.
    pub fn gcode_command(self) -> &'static str {
        match self {
            ArcDirection::Clockwise => "G2",
            ArcDirection::CounterClockwise => "G3",
        }
    }
}

impl ArcMove {
    /// Write this arc as a `G2`/`G3` command, without a line terminator.
    pub fn write_gcode(
        &self,
        out: &mut impl Write,
        form: ArcForm,
        format: &GcodeFormat,
    ) -> fmt::Result {
        let c = format.coord_decimals;
        write!(
            out,
            "{} X{:.*} Y{:.*}",
            self.direction.gcode_command(),
            c,
            self.end.x,
            c,
            self.end.y
        )?;
        match form {
            ArcForm::Radius => write!(out, " R{:.*}", c, self.radius)?,
            ArcForm::CenterOffset => {
                let offset = self.center_offset();
                write!(out, " I{:.*} J{:.*}", c, offset.x, c, offset.y)?;
            }
        }
        write!(out, " E{:.*}", format.amount_decimals, self.amount)
    }

    /// This arc as a `G2`/`G3` command.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcfit::gcode::GcodeFormat;
    /// use arcfit::{ArcDirection, ArcForm, ArcMove, Point};
    ///
    /// let arc = ArcMove {
    ///     direction: ArcDirection::Clockwise,
    ///     radius: 10.0,
    ///     center: Point::new(10.0, 0.0),
    ///     start: Point::ZERO,
    ///     end: Point::new(10.0, 10.0),
    ///     amount: 1.5,
    ///     consumed: 4,
    ///     fit_error: 0.0,
    /// };
    /// let fmt = GcodeFormat::default();
    /// assert_eq!(arc.to_gcode(ArcForm::Radius, &fmt), "G2 X10.000 Y10.000 R10.000 E1.50000");
    /// ```
    pub fn to_gcode(&self, form: ArcForm, format: &GcodeFormat) -> String {
        let mut s = String::new();
        // Writing to a String never fails.
        let _ = self.write_gcode(&mut s, form, format);
        s
    }
}

impl Move {
    /// Write this move as a `G1` command, without a line terminator.
    pub fn write_gcode(&self, out: &mut impl Write, format: &GcodeFormat) -> fmt::Result {
        let c = format.coord_decimals;
        write!(
            out,
            "G1 X{:.*} Y{:.*} E{:.*}",
            c, self.end.x, c, self.end.y, format.amount_decimals, self.amount
        )
    }

    /// This move as a `G1` command.
    pub fn to_gcode(&self, format: &GcodeFormat) -> String {
        let mut s = String::new();
        let _ = self.write_gcode(&mut s, format);
        s
    }
}

/// Rewrites a G-code stream, replacing runs of extruding moves with arcs.
///
/// Extruding moves are held back until any other line arrives; the held
/// moves are then resolved, the other line is written unchanged, and its
/// effect on the position or extrusion mode is recorded. Moves that do not
/// become part of an arc are written exactly as they were read.
///
/// Coordinates are assumed to be absolute; `G91` lines are passed through
/// but not tracked.
///
/// # Examples
///
/// ```
/// use arcfit::gcode::ArcWelder;
///
/// let mut welder = ArcWelder::default();
/// let mut out = String::new();
/// for line in ["G28", "G1 X1 Y0 E0.1", "G1 X1 Y1 E0.2"] {
///     welder.process_line(line, &mut out).unwrap();
/// }
/// welder.finish(&mut out).unwrap();
/// assert_eq!(out, "G28\nG1 X1 Y0 E0.1\nG1 X1 Y1 E0.2\n");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ArcWelder {
    matcher: ArcMatcher,
    lines: VecDeque<String>,
    format: GcodeFormat,
}

impl ArcWelder {
    /// Create a welder with the given options and the default output format.
    pub fn new(options: ArcFitOptions) -> Self {
        ArcWelder {
            matcher: ArcMatcher::new(options),
            lines: VecDeque::new(),
            format: GcodeFormat::default(),
        }
    }

    /// Builder: set the output format of arcs.
    pub fn with_format(mut self, format: GcodeFormat) -> Self {
        self.format = format;
        self
    }

    /// The underlying matcher.
    pub fn matcher(&self) -> &ArcMatcher {
        &self.matcher
    }

    /// Feed one input line, writing whatever output it releases.
    ///
    /// A trailing line terminator is ignored; every written line ends in
    /// `\n`.
    pub fn process_line(&mut self, line: &str, out: &mut impl Write) -> fmt::Result {
        let line = line.trim_end_matches(['\r', '\n']);
        match Command::parse(line) {
            Command::Extrude(mv) => {
                self.matcher.push(mv);
                self.lines.push_back(String::from(line));
            }
            cmd => {
                self.flush(out)?;
                writeln!(out, "{line}")?;
                match cmd {
                    Command::Motion { x, y } => {
                        if let Some(x) = x {
                            self.matcher.set_x(x);
                        }
                        if let Some(y) = y {
                            self.matcher.set_y(y);
                        }
                    }
                    Command::ExtrusionMode(mode) => self.matcher.set_extrusion_mode(mode),
                    _ => (),
                }
            }
        }
        Ok(())
    }

    /// Write out everything still held back.
    pub fn finish(&mut self, out: &mut impl Write) -> fmt::Result {
        self.flush(out)
    }

    fn flush(&mut self, out: &mut impl Write) -> fmt::Result {
        let form = self.matcher.options().form;
        while let Some(commit) = self.matcher.try_extend() {
            match commit {
                Commit::Arc(arc) => {
                    self.lines.drain(..arc.consumed);
                    arc.write_gcode(out, form, &self.format)?;
                    out.write_char('\n')?;
                }
                Commit::Passthrough(_) => {
                    if let Some(line) = self.lines.pop_front() {
                        writeln!(out, "{line}")?;
                    }
                }
            }
        }
        Ok(())
    }
}
