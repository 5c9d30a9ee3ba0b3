#![forbid(unsafe_code)]

//! Gesture values and their configuration names.
//!
//! Every gesture is addressed by an index, so deeper gestures need no new
//! variants:
//!
//! | gesture | index | name |
//! |---|---|---|
//! | `Press(n)` | short presses in the run (n ≥ 1) | `singlePress`, `doublePress`, ..., `decuplePress`, `press11`, ... |
//! | `LongPress(k)` | short presses before the hold | `longPress`, `shortLongPress`, `doubleShortLongPress`, ..., `shortLongPress11`, ... |
//! | `LongRelease(k)` | same as `LongPress` | `longRelease`, `shortLongRelease`, `doubleShortLongRelease`, ... |
//!
//! Parsing is the inverse of [`Display`](std::fmt::Display). The numeric forms
//! are also accepted for small indices (`press2` parses as `Press(2)`).

use std::fmt;
use std::str::FromStr;

/// Multiplicity words, index 0 is one press.
const ORDINALS: [&str; 10] = [
    "single",
    "double",
    "triple",
    "quadruple",
    "quintuple",
    "sextuple",
    "septuple",
    "octuple",
    "nonuple",
    "decuple",
];

fn ordinal(n: u32) -> Option<&'static str> {
    let idx = usize::try_from(n.checked_sub(1)?).ok()?;
    ORDINALS.get(idx).copied()
}

fn ordinal_index(word: &str) -> Option<u32> {
    ORDINALS
        .iter()
        .position(|w| *w == word)
        .and_then(|idx| u32::try_from(idx + 1).ok())
}

fn parse_index(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// A classified button gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gesture {
    /// A finalized run of `n` short presses (`n >= 1`).
    Press(u32),
    /// A long press preceded by `k` short presses. Fires when the hold
    /// threshold is crossed and again on every repeat tick.
    LongPress(u32),
    /// Release ending a long press preceded by `k` short presses.
    LongRelease(u32),
}

impl Gesture {
    /// The ladder index: press count for `Press`, compound index otherwise.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        match self {
            Self::Press(n) | Self::LongPress(n) | Self::LongRelease(n) => n,
        }
    }

    /// The release gesture that pairs with this long press, if any.
    #[must_use]
    pub const fn release(self) -> Option<Self> {
        match self {
            Self::LongPress(k) => Some(Self::LongRelease(k)),
            _ => None,
        }
    }

    /// Configuration name of this gesture.
    #[must_use]
    pub fn name(self) -> String {
        self.to_string()
    }

    fn fmt_long(f: &mut fmt::Formatter<'_>, k: u32, tail: &str) -> fmt::Result {
        match k {
            0 => write!(f, "long{tail}"),
            1 => write!(f, "shortLong{tail}"),
            _ => match ordinal(k) {
                Some(word) => write!(f, "{word}ShortLong{tail}"),
                None => write!(f, "shortLong{tail}{k}"),
            },
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Press(n) => match ordinal(n) {
                Some(word) => write!(f, "{word}Press"),
                None => write!(f, "press{n}"),
            },
            Self::LongPress(k) => Self::fmt_long(f, k, "Press"),
            Self::LongRelease(k) => Self::fmt_long(f, k, "Release"),
        }
    }
}

/// A configuration key that names no gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGesture(pub String);

impl fmt::Display for UnknownGesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown gesture name: {:?}", self.0)
    }
}

impl std::error::Error for UnknownGesture {}

fn parse_long(name: &str, tail: &str) -> Option<u32> {
    let body = name.strip_suffix(tail).unwrap_or(name);
    if body == "long" && name.ends_with(tail) {
        return Some(0);
    }
    if let Some(digits) = name.strip_prefix("shortLong").and_then(|s| s.strip_prefix(tail)) {
        return if digits.is_empty() {
            Some(1)
        } else {
            parse_index(digits).filter(|k| *k >= 1)
        };
    }
    let word = name.strip_suffix(tail)?.strip_suffix("ShortLong")?;
    ordinal_index(word)
}

impl FromStr for Gesture {
    type Err = UnknownGesture;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownGesture(s.to_owned());

        if s.ends_with("Release") || s.starts_with("longRelease") || s.starts_with("shortLongRelease")
        {
            return parse_long(s, "Release")
                .map(Self::LongRelease)
                .ok_or_else(unknown);
        }
        if s == "longPress" || s.contains("ShortLongPress") || s.starts_with("shortLongPress") {
            return parse_long(s, "Press")
                .map(Self::LongPress)
                .ok_or_else(unknown);
        }
        if let Some(digits) = s.strip_prefix("press") {
            return parse_index(digits)
                .filter(|n| *n >= 1)
                .map(Self::Press)
                .ok_or_else(unknown);
        }
        s.strip_suffix("Press")
            .and_then(ordinal_index)
            .map(Self::Press)
            .ok_or_else(unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_names() {
        assert_eq!(Gesture::Press(1).name(), "singlePress");
        assert_eq!(Gesture::Press(2).name(), "doublePress");
        assert_eq!(Gesture::Press(3).name(), "triplePress");
        assert_eq!(Gesture::Press(4).name(), "quadruplePress");
        assert_eq!(Gesture::Press(10).name(), "decuplePress");
        assert_eq!(Gesture::Press(11).name(), "press11");
    }

    #[test]
    fn long_names() {
        assert_eq!(Gesture::LongPress(0).name(), "longPress");
        assert_eq!(Gesture::LongPress(1).name(), "shortLongPress");
        assert_eq!(Gesture::LongPress(2).name(), "doubleShortLongPress");
        assert_eq!(Gesture::LongPress(3).name(), "tripleShortLongPress");
        assert_eq!(Gesture::LongPress(12).name(), "shortLongPress12");
        assert_eq!(Gesture::LongRelease(0).name(), "longRelease");
        assert_eq!(Gesture::LongRelease(1).name(), "shortLongRelease");
        assert_eq!(Gesture::LongRelease(2).name(), "doubleShortLongRelease");
        assert_eq!(Gesture::LongRelease(12).name(), "shortLongRelease12");
    }

    #[test]
    fn parse_known_names() {
        let cases = [
            ("singlePress", Gesture::Press(1)),
            ("doublePress", Gesture::Press(2)),
            ("triplePress", Gesture::Press(3)),
            ("longPress", Gesture::LongPress(0)),
            ("longRelease", Gesture::LongRelease(0)),
            ("shortLongPress", Gesture::LongPress(1)),
            ("shortLongRelease", Gesture::LongRelease(1)),
            ("doubleShortLongPress", Gesture::LongPress(2)),
            ("doubleShortLongRelease", Gesture::LongRelease(2)),
        ];
        for (name, expected) in cases {
            assert_eq!(name.parse::<Gesture>(), Ok(expected), "{name}");
        }
    }

    #[test]
    fn parse_numeric_forms() {
        assert_eq!("press2".parse::<Gesture>(), Ok(Gesture::Press(2)));
        assert_eq!("press15".parse::<Gesture>(), Ok(Gesture::Press(15)));
        assert_eq!("shortLongPress4".parse::<Gesture>(), Ok(Gesture::LongPress(4)));
        assert_eq!(
            "shortLongRelease30".parse::<Gesture>(),
            Ok(Gesture::LongRelease(30))
        );
    }

    #[test]
    fn parse_rejects_unknown() {
        for name in [
            "",
            "press",
            "press0",
            "press-1",
            "Press",
            "singlepress",
            "hugePress",
            "longPressed",
            "shortLongPress0",
            "quadrupleShortLong",
            "releaseLong",
        ] {
            assert!(name.parse::<Gesture>().is_err(), "{name:?} should not parse");
        }
    }

    #[test]
    fn names_round_trip() {
        for n in 1..40 {
            for g in [Gesture::Press(n), Gesture::LongPress(n), Gesture::LongRelease(n)] {
                assert_eq!(g.name().parse::<Gesture>(), Ok(g));
            }
        }
        assert_eq!("longPress".parse::<Gesture>(), Ok(Gesture::LongPress(0)));
    }

    #[test]
    fn release_pairs_with_long_press() {
        assert_eq!(Gesture::LongPress(2).release(), Some(Gesture::LongRelease(2)));
        assert_eq!(Gesture::Press(2).release(), None);
        assert_eq!(Gesture::LongRelease(2).release(), None);
    }

    #[test]
    fn unknown_gesture_display() {
        let err = "bogus".parse::<Gesture>().unwrap_err();
        assert_eq!(err.to_string(), "unknown gesture name: \"bogus\"");
    }
}
