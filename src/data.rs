use std::{
    fmt::{self, Display},
    fs,
    io,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One parsed input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSpec {
    pub n: i64,
    pub m: usize,
    pub priorities: Vec<i64>,
    pub values: Vec<f64>,
    pub ceilings: Vec<f64>,
    pub cost_matrix: Vec<Vec<f64>>,
    pub cost_threshold: f64,
    pub max_count: i64,
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: missing {field}")]
    MissingLine { line: usize, field: &'static str },

    #[error("line {line}: invalid {field} value {token:?}: {reason}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        token: String,
        reason: String,
    },

    #[error("line {line}: {field} value {token:?} is not finite")]
    NonFinite {
        line: usize,
        field: &'static str,
        token: String,
    },

    #[error("{field} contains a non-finite value")]
    NotFinite { field: &'static str },

    #[error("{field} has {found} entries, expected {expected}")]
    LengthMismatch {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ProblemSpec {
    /// Reads an input file, choosing JSON for `.json` paths and the line format otherwise.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            let bytes = fs::read(path).map_err(|source| ParseError::Read {
                path: path.to_owned(),
                source,
            })?;
            Self::from_json(&bytes)
        } else {
            Self::read_mpl(path)
        }
    }

    pub fn read_mpl(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ParseError::Read {
            path: path.to_owned(),
            source,
        })?;
        text.parse()
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, ParseError> {
        let spec = serde_json::from_slice::<Self>(bytes)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Checks that every sequence is sized by `m`.
    pub fn validate(&self) -> Result<(), ParseError> {
        let check_len = |field: &str, found: usize| {
            if found == self.m {
                Ok(())
            } else {
                Err(ParseError::LengthMismatch {
                    field: field.to_owned(),
                    expected: self.m,
                    found,
                })
            }
        };
        check_len("priorities", self.priorities.len())?;
        check_len("values", self.values.len())?;
        check_len("ceilings", self.ceilings.len())?;
        check_len("cost matrix rows", self.cost_matrix.len())?;
        for (i, row) in self.cost_matrix.iter().enumerate() {
            check_len(&format!("cost matrix row {}", i + 1), row.len())?
        }
        let decimals = [
            ("values", self.values.iter().all(|x| x.is_finite())),
            ("ceilings", self.ceilings.iter().all(|x| x.is_finite())),
            (
                "cost matrix",
                self.cost_matrix.iter().flatten().all(|x| x.is_finite()),
            ),
            ("cost threshold", self.cost_threshold.is_finite()),
        ];
        match decimals.into_iter().find(|&(_, finite)| !finite) {
            Some((field, _)) => Err(ParseError::NotFinite { field }),
            None => Ok(()),
        }
    }
}

impl FromStr for ProblemSpec {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut lines = Lines::new(text);
        let n: i64 = lines.line("n")?.scalar()?;
        let m: usize = lines.line("m")?.scalar()?;
        let priorities: Vec<i64> = lines.line("priorities")?.list()?;
        let values: Vec<f64> = lines.line("values")?.list()?;
        let ceilings: Vec<f64> = lines.line("ceilings")?.list()?;
        let cost_matrix = (0..m)
            .map(|_| lines.line("cost matrix row")?.list::<f64>())
            .collect::<Result<Vec<_>, _>>()?;
        let cost_threshold: f64 = lines.line("cost threshold")?.scalar()?;
        let max_count: i64 = lines.line("max count")?.scalar()?;

        let spec = Self {
            n,
            m,
            priorities,
            values,
            ceilings,
            cost_matrix,
            cost_threshold,
            max_count,
        };
        spec.validate()?;
        Ok(spec)
    }
}

struct Lines<'a> {
    inner: std::str::Lines<'a>,
    consumed: usize,
}

struct Line<'a> {
    number: usize,
    field: &'static str,
    text: &'a str,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.lines(),
            consumed: 0,
        }
    }

    fn line(&mut self, field: &'static str) -> Result<Line<'a>, ParseError> {
        self.consumed += 1;
        let number = self.consumed;
        match self.inner.next() {
            Some(text) => Ok(Line {
                number,
                field,
                text: text.trim(),
            }),
            None => Err(ParseError::MissingLine {
                line: number,
                field,
            }),
        }
    }
}

trait Number: FromStr {
    fn is_finite(&self) -> bool {
        true
    }
}

impl Number for i64 {}
impl Number for usize {}
impl Number for f64 {
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

impl Line<'_> {
    fn scalar<T: Number>(&self) -> Result<T, ParseError>
    where
        T::Err: Display,
    {
        self.token(self.text)
    }

    fn list<T: Number>(&self) -> Result<Vec<T>, ParseError>
    where
        T::Err: Display,
    {
        if self.text.is_empty() {
            return Ok(Vec::new());
        }
        self.text.split(',').map(|token| self.token(token)).collect()
    }

    fn token<T: Number>(&self, token: &str) -> Result<T, ParseError>
    where
        T::Err: Display,
    {
        let token = token.trim();
        let value = token
            .parse::<T>()
            .map_err(|err| ParseError::InvalidNumber {
                line: self.number,
                field: self.field,
                token: token.to_owned(),
                reason: err.to_string(),
            })?;
        if !value.is_finite() {
            return Err(ParseError::NonFinite {
                line: self.number,
                field: self.field,
                token: token.to_owned(),
            });
        }
        Ok(value)
    }
}

/// Decimal literal accepted by both the line format and DZN.
pub(crate) struct Decimal(pub f64);

impl Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = self.0;
        if x.fract() == 0.0 && x.abs() < 1e15 {
            write!(f, "{x}")
        } else {
            write!(f, "{x:?}")
        }
    }
}

pub(crate) fn write_separated<T: Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
    sep: &str,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?
        }
        write!(f, "{item}")?
    }
    Ok(())
}

/// Renders a spec back into the line format; `ProblemSpec::from_str` reads it back unchanged.
pub struct Mpl<'a>(pub &'a ProblemSpec);

impl Display for Mpl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spec = self.0;
        writeln!(f, "{}", spec.n)?;
        writeln!(f, "{}", spec.m)?;
        write_separated(f, &spec.priorities, ",")?;
        writeln!(f)?;
        write_separated(f, spec.values.iter().map(|&x| Decimal(x)), ",")?;
        writeln!(f)?;
        write_separated(f, spec.ceilings.iter().map(|&x| Decimal(x)), ",")?;
        writeln!(f)?;
        for row in &spec.cost_matrix {
            write_separated(f, row.iter().map(|&x| Decimal(x)), ",")?;
            writeln!(f)?
        }
        writeln!(f, "{}", Decimal(spec.cost_threshold))?;
        writeln!(f, "{}", spec.max_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "2\n2\n1,2\n1.5,2.5\n3.0,4.0\n1,2\n3,4\n5.0\n10\n";

    fn sample() -> ProblemSpec {
        ProblemSpec {
            n: 2,
            m: 2,
            priorities: vec![1, 2],
            values: vec![1.5, 2.5],
            ceilings: vec![3.0, 4.0],
            cost_matrix: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            cost_threshold: 5.0,
            max_count: 10,
        }
    }

    #[test]
    fn parses_positional_lines() {
        assert_eq!(SAMPLE.parse::<ProblemSpec>().unwrap(), sample());
    }

    #[test]
    fn matrix_is_m_by_m() {
        for k in [0usize, 1, 3, 7] {
            let spec = ProblemSpec {
                n: 1,
                m: k,
                priorities: (0..k as i64).collect(),
                values: vec![0.5; k],
                ceilings: vec![1.0; k],
                cost_matrix: (0..k).map(|i| vec![i as f64; k]).collect(),
                cost_threshold: 2.25,
                max_count: 3,
            };
            let parsed = Mpl(&spec).to_string().parse::<ProblemSpec>().unwrap();
            assert_eq!(parsed.cost_matrix.len(), k);
            assert!(parsed.cost_matrix.iter().all(|row| row.len() == k));
            assert_eq!(parsed, spec);
        }
    }

    #[test]
    fn tolerates_whitespace_and_crlf() {
        let text = " 2 \r\n2\r\n1, 2\r\n1.5 ,2.5\r\n3.0,4.0\r\n1,2\r\n3,4\r\n5.0\r\n10\r\n";
        assert_eq!(text.parse::<ProblemSpec>().unwrap(), sample());
    }

    #[test]
    fn ignores_trailing_lines() {
        let text = format!("{SAMPLE}extra\n");
        assert_eq!(text.parse::<ProblemSpec>().unwrap(), sample());
    }

    #[test]
    fn missing_line_is_reported() {
        let err = "2\n2\n1,2\n1.5,2.5\n3.0,4.0\n1,2\n3,4\n5.0\n"
            .parse::<ProblemSpec>()
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingLine {
                line: 9,
                field: "max count"
            }
        ));
    }

    #[test]
    fn bad_token_is_reported() {
        let err = "2\n2\n1,x\n1.5,2.5\n3.0,4.0\n1,2\n3,4\n5.0\n10\n"
            .parse::<ProblemSpec>()
            .unwrap_err();
        match err {
            ParseError::InvalidNumber {
                line, field, token, ..
            } => {
                assert_eq!(line, 3);
                assert_eq!(field, "priorities");
                assert_eq!(token, "x");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn integer_fields_reject_decimals() {
        let err = "2\n2.5\n".parse::<ProblemSpec>().unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { line: 2, .. }));
    }

    #[test]
    fn short_priorities_are_rejected() {
        let err = "2\n2\n1\n1.5,2.5\n3.0,4.0\n1,2\n3,4\n5.0\n10\n"
            .parse::<ProblemSpec>()
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::LengthMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn ragged_matrix_is_rejected() {
        let err = "2\n2\n1,2\n1.5,2.5\n3.0,4.0\n1,2,9\n3,4\n5.0\n10\n"
            .parse::<ProblemSpec>()
            .unwrap_err();
        assert!(matches!(err, ParseError::LengthMismatch { found: 3, .. }));
    }

    #[test]
    fn non_finite_is_rejected() {
        let err = "2\n2\n1,2\n1.5,inf\n3.0,4.0\n1,2\n3,4\n5.0\n10\n"
            .parse::<ProblemSpec>()
            .unwrap_err();
        assert!(matches!(err, ParseError::NonFinite { line: 4, .. }));
    }

    #[test]
    fn json_input_is_validated() {
        let json = serde_json::to_vec(&sample()).unwrap();
        assert_eq!(ProblemSpec::from_json(&json).unwrap(), sample());

        let mut short = sample();
        short.ceilings.pop();
        let json = serde_json::to_vec(&short).unwrap();
        assert!(matches!(
            ProblemSpec::from_json(&json),
            Err(ParseError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn decimal_literals() {
        assert_eq!(Decimal(3.0).to_string(), "3");
        assert_eq!(Decimal(1.5).to_string(), "1.5");
        assert_eq!(Decimal(0.1).to_string(), "0.1");
        assert_eq!(Decimal(1e20).to_string(), "1e20");
        assert_eq!("1e20".parse::<f64>().unwrap(), 1e20);
    }
}
