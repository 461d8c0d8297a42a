//! Unit-expression parser.
//!
//! Accepts the unit strings that appear in scenario files and on the command
//! line: `W`, `Wh`, `m/s`, `kg/m^3`, `W/rpm**2`, `1/K`, `degC`, `mph`.
//! Multiplication may be written `*`, `·` or as a space. Affine units
//! (`degC`, `degF`) are only accepted on their own.

use core::f64::consts::PI;

use crate::dimension::Dimension as D;
use crate::error::{CoreError, CoreResult};
use crate::quantity::Unit;

struct Atom {
    names: &'static [&'static str],
    scale: f64,
    offset: f64,
    dim: D,
}

const fn atom(names: &'static [&'static str], scale: f64, dim: D) -> Atom {
    Atom {
        names,
        scale,
        offset: 0.0,
        dim,
    }
}

const ATOMS: &[Atom] = &[
    // dimensionless
    atom(&["dimensionless", "1"], 1.0, D::NONE),
    atom(&["%", "percent"], 0.01, D::NONE),
    atom(&["rad", "radian", "radians"], 1.0, D::NONE),
    atom(&["deg", "degree", "degrees"], PI / 180.0, D::NONE),
    atom(&["rev", "revolution", "revolutions"], 2.0 * PI, D::NONE),
    // length
    atom(&["m", "meter", "meters", "metre"], 1.0, D::LENGTH),
    atom(&["km", "kilometer", "kilometers"], 1000.0, D::LENGTH),
    atom(&["cm", "centimeter"], 0.01, D::LENGTH),
    atom(&["mm", "millimeter"], 0.001, D::LENGTH),
    atom(&["mi", "mile", "miles"], 1609.344, D::LENGTH),
    atom(&["ft", "foot", "feet"], 0.3048, D::LENGTH),
    atom(&["in", "inch", "inches"], 0.0254, D::LENGTH),
    // mass
    atom(&["kg", "kilogram", "kilograms"], 1.0, D::MASS),
    atom(&["g", "gram", "grams"], 0.001, D::MASS),
    atom(&["lb", "pound", "pounds"], 0.453_592_37, D::MASS),
    // time
    atom(&["s", "sec", "second", "seconds"], 1.0, D::TIME),
    atom(&["min", "minute", "minutes"], 60.0, D::TIME),
    atom(&["h", "hr", "hour", "hours"], 3600.0, D::TIME),
    atom(&["day", "days"], 86_400.0, D::TIME),
    // frequency
    atom(&["Hz", "hertz"], 1.0, D::FREQUENCY),
    atom(&["rpm"], 2.0 * PI / 60.0, D::FREQUENCY),
    // current
    atom(&["A", "amp", "ampere", "amperes"], 1.0, D::CURRENT),
    atom(&["mA", "milliampere"], 0.001, D::CURRENT),
    // temperature (absolute)
    atom(&["K", "kelvin", "delta_degC"], 1.0, D::TEMPERATURE),
    // energy
    atom(&["J", "joule", "joules"], 1.0, D::ENERGY),
    atom(&["kJ", "kilojoule"], 1.0e3, D::ENERGY),
    atom(&["MJ", "megajoule"], 1.0e6, D::ENERGY),
    atom(&["Wh", "watt_hour"], 3600.0, D::ENERGY),
    atom(&["kWh", "kilowatt_hour"], 3.6e6, D::ENERGY),
    // power
    atom(&["W", "watt", "watts"], 1.0, D::POWER),
    atom(&["kW", "kilowatt"], 1000.0, D::POWER),
    // force and pressure
    atom(&["N", "newton", "newtons"], 1.0, D::FORCE),
    atom(&["lbf", "force_pound"], 4.448_221_615_260_5, D::FORCE),
    atom(&["Pa", "pascal"], 1.0, D::PRESSURE),
    // electrical
    atom(&["V", "volt", "volts"], 1.0, D::VOLTAGE),
    atom(&["ohm", "ohms", "Ω"], 1.0, D::RESISTANCE),
    atom(&["mohm", "milliohm", "mΩ"], 0.001, D::RESISTANCE),
    // speed
    atom(&["mph"], 0.447_04, D::VELOCITY),
    atom(&["mps"], 1.0, D::VELOCITY),
    atom(&["kph", "kmh"], 1000.0 / 3600.0, D::VELOCITY),
];

const AFFINE: &[Atom] = &[
    Atom {
        names: &["degC", "°C", "celsius", "degree_Celsius"],
        scale: 1.0,
        offset: 273.15,
        dim: D::TEMPERATURE,
    },
    Atom {
        names: &["degF", "°F", "fahrenheit", "degree_Fahrenheit"],
        scale: 5.0 / 9.0,
        offset: 273.15 - 32.0 * 5.0 / 9.0,
        dim: D::TEMPERATURE,
    },
];

fn find(table: &'static [Atom], name: &str) -> Option<&'static Atom> {
    table.iter().find(|a| a.names.contains(&name))
}

/// Parse a unit expression into a [`Unit`] whose symbol is the trimmed input.
pub fn parse_unit(text: &str) -> CoreResult<Unit> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Unit::dimensionless());
    }
    if let Some(a) = find(AFFINE, trimmed) {
        return Ok(Unit::with_offset(trimmed, a.scale, a.offset, a.dim));
    }

    let tokens = tokenize(trimmed)?;
    let mut parser = Parser {
        input: trimmed,
        tokens,
        pos: 0,
    };
    let (scale, dim) = parser.product()?;
    if parser.pos != parser.tokens.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(Unit::new(trimmed, scale, dim))
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    Mul,
    Div,
    Pow,
    Minus,
    LParen,
    RParen,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '%' || c == '°' || c == 'Ω'
}

fn tokenize(input: &str) -> CoreResult<Vec<Token>> {
    let err = |reason: String| CoreError::UnitParse {
        input: input.to_string(),
        reason,
    };
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '*' => {
                chars.next();
                if chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push(Token::Pow);
                } else {
                    tokens.push(Token::Mul);
                }
            }
            '·' => {
                chars.next();
                tokens.push(Token::Mul);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Div);
            }
            '^' => {
                chars.next();
                tokens.push(Token::Pow);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut text = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        text.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = text
                    .parse::<f64>()
                    .map_err(|_| err(format!("bad number '{text}'")))?;
                tokens.push(Token::Number(value));
            }
            c if is_ident_char(c) => {
                let mut text = String::new();
                while let Some(&d) = chars.peek() {
                    if is_ident_char(d) {
                        text.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(text));
            }
            other => return Err(err(format!("unexpected character '{other}'"))),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

type Factor = (f64, D);

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> CoreError {
        CoreError::UnitParse {
            input: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn product(&mut self) -> CoreResult<Factor> {
        let (mut scale, mut dim) = self.power()?;
        loop {
            match self.peek() {
                Some(Token::Mul) => {
                    self.pos += 1;
                    let (s, d) = self.power()?;
                    scale *= s;
                    dim = dim * d;
                }
                Some(Token::Div) => {
                    self.pos += 1;
                    let (s, d) = self.power()?;
                    scale /= s;
                    dim = dim / d;
                }
                // juxtaposition, e.g. "N m"
                Some(Token::Ident(_)) | Some(Token::Number(_)) | Some(Token::LParen) => {
                    let (s, d) = self.power()?;
                    scale *= s;
                    dim = dim * d;
                }
                _ => break,
            }
        }
        Ok((scale, dim))
    }

    fn power(&mut self) -> CoreResult<Factor> {
        let (scale, dim) = self.primary()?;
        if self.peek() != Some(&Token::Pow) {
            return Ok((scale, dim));
        }
        self.pos += 1;
        let negative = if self.peek() == Some(&Token::Minus) {
            self.pos += 1;
            true
        } else {
            false
        };
        let exp = match self.next() {
            Some(Token::Number(n)) if n.fract() == 0.0 && n <= 32.0 => n as i8,
            _ => return Err(self.error("exponent must be a small integer")),
        };
        let exp = if negative { -exp } else { exp };
        Ok((scale.powi(exp as i32), dim.powi(exp)))
    }

    fn primary(&mut self) -> CoreResult<Factor> {
        match self.next() {
            Some(Token::Ident(name)) => match find(ATOMS, &name) {
                Some(a) => Ok((a.scale, a.dim)),
                None if find(AFFINE, &name).is_some() => Err(self.error(format!(
                    "offset unit '{name}' cannot be combined with other units"
                ))),
                None => Err(self.error(format!("unknown unit '{name}'"))),
            },
            Some(Token::Number(n)) => Ok((n, D::NONE)),
            Some(Token::LParen) => {
                let inner = self.product()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(self.error("unbalanced parenthesis")),
                }
            }
            Some(tok) => Err(self.error(format!("unexpected token {tok:?}"))),
            None => Err(self.error("unexpected end of input")),
        }
    }
}
