//! Strings matching a regular expression.
//!
//! The pattern is parsed into a `regex-syntax` HIR and walked once per
//! attempt. Unbounded repetitions draw at most [`UNBOUNDED_EXTRA`] extra
//! copies and character classes prefer printable ASCII members when they
//! have any.
//!
//! Assertions (`^`, `$`, `\b`, ...) emit nothing. Their positions are
//! recorded and checked once the attempt is complete. A pattern whose
//! assertions fail [`MAX_ATTEMPTS`] times in a row is unsatisfiable.

use fixture_generator::ProviderError;
use rand::Rng;
use regex_syntax::hir::{Class, Hir, HirKind, Look};

/// Extra repetitions allowed beyond the minimum of `*`, `+` and `{n,}`.
pub const UNBOUNDED_EXTRA: u32 = 8;

/// Draws per string before failing assertions make the pattern unsatisfiable.
pub const MAX_ATTEMPTS: usize = 64;

const PRINTABLE_ASCII: (u32, u32) = (0x20, 0x7e);

/// Compiled pattern ready for generation.
#[derive(Debug, Clone)]
pub struct PatternGenerator {
    pattern: String,
    hir: Hir,
}

impl PatternGenerator {
    /// Parse a pattern.
    pub fn new(pattern: &str) -> Result<Self, ProviderError> {
        let hir = regex_syntax::Parser::new()
            .parse(pattern)
            .map_err(|e| ProviderError::UnsatisfiablePattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            pattern: pattern.to_string(),
            hir,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Generate one matching string.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<String, ProviderError> {
        let mut failed = None;
        for _ in 0..MAX_ATTEMPTS {
            let mut out = Vec::new();
            let mut looks = Vec::new();
            self.emit(&self.hir, rng, &mut out, &mut looks)?;

            match looks.iter().find(|(pos, look)| !assertion_holds(*look, &out, *pos)) {
                None => {
                    return String::from_utf8(out)
                        .map_err(|_| self.unsatisfiable("pattern produces invalid UTF-8"))
                }
                Some(&(_, look)) => failed = Some(look),
            }
        }
        let look = failed.map_or_else(String::new, |look| format!("{look:?}"));
        Err(self.unsatisfiable(&format!("assertion {look} never holds")))
    }

    fn emit<R: Rng>(
        &self,
        hir: &Hir,
        rng: &mut R,
        out: &mut Vec<u8>,
        looks: &mut Vec<(usize, Look)>,
    ) -> Result<(), ProviderError> {
        match hir.kind() {
            HirKind::Empty => {}
            HirKind::Look(look) => looks.push((out.len(), *look)),
            HirKind::Literal(literal) => out.extend_from_slice(&literal.0),
            HirKind::Class(Class::Unicode(class)) => {
                let ranges: Vec<(u32, u32)> = class
                    .ranges()
                    .iter()
                    .map(|r| (u32::from(r.start()), u32::from(r.end())))
                    .collect();
                let (start, code) = pick(&ranges, rng)
                    .ok_or_else(|| self.unsatisfiable("character class matches nothing"))?;
                let c = char::from_u32(code)
                    .or_else(|| char::from_u32(start))
                    .ok_or_else(|| self.unsatisfiable("character class has no valid scalar"))?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            HirKind::Class(Class::Bytes(class)) => {
                let ranges: Vec<(u32, u32)> = class
                    .ranges()
                    .iter()
                    .map(|r| (u32::from(r.start()), u32::from(r.end())))
                    .collect();
                let (_, code) = pick(&ranges, rng)
                    .ok_or_else(|| self.unsatisfiable("byte class matches nothing"))?;
                // Byte class ranges never exceed 0xff
                out.push(code as u8);
            }
            HirKind::Repetition(repetition) => {
                let min = repetition.min;
                let max = repetition
                    .max
                    .unwrap_or_else(|| min.saturating_add(UNBOUNDED_EXTRA))
                    .max(min);
                let count = rng.gen_range(min..=max);
                for _ in 0..count {
                    self.emit(&repetition.sub, rng, out, looks)?;
                }
            }
            HirKind::Capture(capture) => self.emit(&capture.sub, rng, out, looks)?,
            HirKind::Concat(parts) => {
                for part in parts {
                    self.emit(part, rng, out, looks)?;
                }
            }
            HirKind::Alternation(branches) => {
                if !branches.is_empty() {
                    let idx = rng.gen_range(0..branches.len());
                    self.emit(&branches[idx], rng, out, looks)?;
                }
            }
        }
        Ok(())
    }

    fn unsatisfiable(&self, reason: &str) -> ProviderError {
        ProviderError::UnsatisfiablePattern {
            pattern: self.pattern.clone(),
            reason: reason.to_string(),
        }
    }
}

fn is_ascii_word(byte: Option<u8>) -> bool {
    byte.is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn is_unicode_word(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// Whether `look` holds at byte offset `pos` of the finished output.
fn assertion_holds(look: Look, out: &[u8], pos: usize) -> bool {
    let before = pos.checked_sub(1).map(|i| out[i]);
    let after = out.get(pos).copied();
    let ascii = (is_ascii_word(before), is_ascii_word(after));
    let unicode = (
        is_unicode_word(String::from_utf8_lossy(&out[..pos]).chars().next_back()),
        is_unicode_word(String::from_utf8_lossy(&out[pos..]).chars().next()),
    );

    #[allow(unreachable_patterns)]
    match look {
        Look::Start => pos == 0,
        Look::End => pos == out.len(),
        Look::StartLF => before.map_or(true, |b| b == b'\n'),
        Look::EndLF => after.map_or(true, |b| b == b'\n'),
        Look::StartCRLF => match before {
            None | Some(b'\n') => true,
            Some(b'\r') => after != Some(b'\n'),
            Some(_) => false,
        },
        Look::EndCRLF => match after {
            None | Some(b'\r') => true,
            Some(b'\n') => before != Some(b'\r'),
            Some(_) => false,
        },
        Look::WordAscii => ascii.0 != ascii.1,
        Look::WordAsciiNegate => ascii.0 == ascii.1,
        Look::WordUnicode => unicode.0 != unicode.1,
        Look::WordUnicodeNegate => unicode.0 == unicode.1,
        Look::WordStartAscii => !ascii.0 && ascii.1,
        Look::WordEndAscii => ascii.0 && !ascii.1,
        Look::WordStartUnicode => !unicode.0 && unicode.1,
        Look::WordEndUnicode => unicode.0 && !unicode.1,
        Look::WordStartHalfAscii => !ascii.0,
        Look::WordEndHalfAscii => !ascii.1,
        Look::WordStartHalfUnicode => !unicode.0,
        Look::WordEndHalfUnicode => !unicode.1,
        _ => false,
    }
}

/// Pick a code point from inclusive ranges, restricted to printable ASCII
/// when the ranges overlap it. Returns the chosen range's start and the
/// code point.
fn pick<R: Rng>(ranges: &[(u32, u32)], rng: &mut R) -> Option<(u32, u32)> {
    let printable: Vec<(u32, u32)> = ranges
        .iter()
        .filter_map(|&(start, end)| {
            let start = start.max(PRINTABLE_ASCII.0);
            let end = end.min(PRINTABLE_ASCII.1);
            (start <= end).then_some((start, end))
        })
        .collect();
    let pool = if printable.is_empty() {
        ranges
    } else {
        printable.as_slice()
    };

    let total: u64 = pool.iter().map(|(start, end)| u64::from(end - start) + 1).sum();
    if total == 0 {
        return None;
    }
    let mut idx = rng.gen_range(0..total);
    for &(start, end) in pool {
        let width = u64::from(end - start) + 1;
        if idx < width {
            return Some((start, start + idx as u32));
        }
        idx -= width;
    }
    None
}
