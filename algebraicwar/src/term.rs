// Copyright 2020 Zachary Stewart
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Monomial terms carried by pieces.
use std::{fmt, str::FromStr};

use enumflags2::BitFlags;
use thiserror::Error;

/// Largest absolute coefficient a [`Term`] may carry.
pub const MAX_COEFFICIENT: i32 = 4;

/// Degree of a [`Term`]. Values are bit flags so a set of degrees can be held in a
/// [`BitFlags<Degree>`].
#[derive(BitFlags, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Degree {
    /// `x^0`.
    Constant = 0b001,
    /// `x^1`.
    Linear = 0b010,
    /// `x^2`.
    Quadratic = 0b100,
}

impl Degree {
    /// All degrees, lowest first.
    pub const ALL: [Degree; 3] = [Degree::Constant, Degree::Linear, Degree::Quadratic];

    /// The exponent of `x` for this degree.
    pub fn exponent(self) -> u32 {
        match self {
            Degree::Constant => 0,
            Degree::Linear => 1,
            Degree::Quadratic => 2,
        }
    }

    /// Maximum number of steps a piece with a term of this degree may travel.
    pub fn range(self) -> usize {
        match self {
            Degree::Constant => 1,
            Degree::Linear => 2,
            Degree::Quadratic => 3,
        }
    }

    /// Suffix used in the textual form of a term.
    fn suffix(self) -> &'static str {
        match self {
            Degree::Constant => "",
            Degree::Linear => "x",
            Degree::Quadratic => "x^2",
        }
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match self {
            Degree::Constant => "constant",
            Degree::Linear => "linear",
            Degree::Quadratic => "quadratic",
        })
    }
}

/// Reason a term could not be built or parsed.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum TermError {
    /// The text contained nothing but whitespace.
    #[error("term text is empty")]
    Empty,
    /// The coefficient part of the text was not an integer.
    #[error("invalid coefficient {0:?}")]
    InvalidCoefficient(String),
    /// Terms never carry a zero coefficient.
    #[error("coefficient must be nonzero")]
    ZeroCoefficient,
    /// The coefficient exceeded [`MAX_COEFFICIENT`] in magnitude.
    #[error("coefficient {0} is outside [-4, 4]")]
    OutOfRange(i32),
}

/// An immutable monomial `coefficient * x^degree`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Term {
    degree: Degree,
    coefficient: i8,
}

impl Term {
    /// Construct a term, rejecting zero and out-of-range coefficients.
    pub fn new(degree: Degree, coefficient: i32) -> Result<Self, TermError> {
        if coefficient == 0 {
            Err(TermError::ZeroCoefficient)
        } else if coefficient.abs() > MAX_COEFFICIENT {
            Err(TermError::OutOfRange(coefficient))
        } else {
            Ok(Self {
                degree,
                coefficient: coefficient as i8,
            })
        }
    }

    /// Get the degree of this term.
    pub fn degree(&self) -> Degree {
        self.degree
    }

    /// Get the signed coefficient of this term.
    pub fn coefficient(&self) -> i32 {
        self.coefficient as i32
    }
}

impl fmt::Display for Term {
    /// Writes the canonical form, e.g. `2x^2`, `-x`, `3`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match (self.degree, self.coefficient) {
            (Degree::Constant, c) => c.to_string(),
            (degree, 1) => degree.suffix().to_string(),
            (degree, -1) => format!("-{}", degree.suffix()),
            (degree, c) => format!("{}{}", c, degree.suffix()),
        };
        f.pad(&text)
    }
}

impl FromStr for Term {
    type Err = TermError;

    /// Parse a term from its textual form. Whitespace is ignored and a leading `+` is
    /// accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if text.is_empty() {
            return Err(TermError::Empty);
        }
        let (body, degree) = if let Some(body) = text.strip_suffix("x^2") {
            (body, Degree::Quadratic)
        } else if let Some(body) = text.strip_suffix('x') {
            (body, Degree::Linear)
        } else {
            (text.as_str(), Degree::Constant)
        };
        let coefficient = match (degree, body) {
            (Degree::Constant, _) => parse_coefficient(body)?,
            (_, "") | (_, "+") => 1,
            (_, "-") => -1,
            (_, other) => parse_coefficient(other)?,
        };
        Term::new(degree, coefficient)
    }
}

fn parse_coefficient(text: &str) -> Result<i32, TermError> {
    text.parse()
        .map_err(|_| TermError::InvalidCoefficient(text.to_owned()))
}
