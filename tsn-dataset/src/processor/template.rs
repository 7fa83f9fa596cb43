//! The frame filename template.

use crate::common::*;

/// A parsed filename template such as `"img_{1:05d}.jpg"` or `"{}_{:04}.png"`.
///
/// The template is filled with two positional arguments: the video key at
/// position 0 and the 1-based frame index at position 1. Fields without an
/// explicit position are numbered from left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTemplate {
    source: String,
    pieces: Vec<Piece>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Field(Field),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Field {
    arg: Arg,
    width: usize,
    zero_pad: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arg {
    Key,
    Index,
}

impl ImageTemplate {
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let pieces = parse_template(&source)
            .with_context(|| format!("invalid image template '{}'", source))?;
        Ok(Self { source, pieces })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Fill the template with the video key and the frame index.
    pub fn format(&self, key: &str, index: usize) -> String {
        let mut output = String::with_capacity(self.source.len() + key.len());

        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => output.push_str(text),
                Piece::Field(Field {
                    arg,
                    width,
                    zero_pad,
                }) => {
                    let value = match arg {
                        Arg::Key => key.to_owned(),
                        Arg::Index => index.to_string(),
                    };
                    let pad = width.saturating_sub(value.chars().count());

                    let fill = if *zero_pad { '0' } else { ' ' };

                    // integers are right-aligned, strings left-aligned
                    match arg {
                        Arg::Index => {
                            output.extend(iter::repeat(fill).take(pad));
                            output.push_str(&value);
                        }
                        Arg::Key => {
                            output.push_str(&value);
                            output.extend(iter::repeat(fill).take(pad));
                        }
                    }
                }
            }
        }

        output
    }
}

impl FromStr for ImageTemplate {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::new(text)
    }
}

impl fmt::Display for ImageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_template(source: &str) -> Result<Vec<Piece>> {
    let mut pieces = vec![];
    let mut literal = String::new();
    let mut next_auto = 0;
    let mut has_auto = false;
    let mut has_manual = false;
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '}' => bail!("single '}}' encountered"),
            '{' => {
                let mut body = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') => bail!("nested '{{' is not supported"),
                        Some(ch) => body.push(ch),
                        None => bail!("unmatched '{{'"),
                    }
                }

                let (position, spec) = match body.split_once(':') {
                    Some((position, spec)) => (position, spec),
                    None => (body.as_str(), ""),
                };

                let position: usize = if position.is_empty() {
                    has_auto = true;
                    let position = next_auto;
                    next_auto += 1;
                    position
                } else {
                    has_manual = true;
                    position
                        .parse()
                        .map_err(|_| format_err!("invalid field name '{}'", position))?
                };

                ensure!(
                    !(has_auto && has_manual),
                    "cannot mix automatic and manual field numbering"
                );

                let arg = match position {
                    0 => Arg::Key,
                    1 => Arg::Index,
                    _ => bail!(
                        "field {} is out of range, only the key {{0}} and the frame index {{1}} are available",
                        position
                    ),
                };

                let field = parse_spec(arg, spec)?;

                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(Piece::Field(field));
            }
            ch => literal.push(ch),
        }
    }

    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }

    Ok(pieces)
}

fn parse_spec(arg: Arg, spec: &str) -> Result<Field> {
    let (spec, kind) = match spec.chars().last() {
        Some(kind @ ('d' | 's')) => (&spec[..spec.len() - 1], Some(kind)),
        _ => (spec, None),
    };

    match (arg, kind) {
        (Arg::Key, Some('d')) => bail!("the video key cannot be formatted as an integer"),
        (Arg::Index, Some('s')) => bail!("the frame index cannot be formatted as a string"),
        _ => {}
    }

    let zero_pad = spec.starts_with('0');
    ensure!(
        spec.chars().all(|ch| ch.is_ascii_digit()),
        "unsupported format spec '{}'",
        spec
    );
    let width = if spec.is_empty() { 0 } else { spec.parse()? };

    Ok(Field {
        arg,
        width,
        zero_pad,
    })
}
