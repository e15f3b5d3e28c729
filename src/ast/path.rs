use std::fmt;

/// Reference to a (possibly nested) feature property.
///
/// Source text writes segments separated by `.`; each segment may be a
/// colon-compound namespaced name (`gmd:aa:bb`), kept verbatim. The
/// external representation joins segments with `/`, escaping `/` and `\`
/// inside a segment with a backslash:
///
/// ```
/// use cql_lang::ast::AttributePath;
///
/// let path = AttributePath::new(vec!["gmd:aa:bb".into(), "gmd:cc".into()]);
/// assert_eq!(path.to_string(), "gmd:aa:bb/gmd:cc");
/// assert_eq!(path.internal_name(), "gmd:aa:bb.gmd:cc");
///
/// let slashed = AttributePath::new(vec!["a/b".into(), "c".into()]);
/// assert_eq!(slashed.to_string(), r"a\/b/c");
/// assert_eq!(AttributePath::from_external(&slashed.to_string()), slashed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributePath {
    segments: Vec<String>,
}

impl AttributePath {
    pub fn new(segments: Vec<String>) -> Self {
        AttributePath { segments }
    }

    /// Single-segment path.
    pub fn simple(name: impl Into<String>) -> Self {
        AttributePath {
            segments: vec![name.into()],
        }
    }

    /// Splits an external `/`-joined path back into segments.
    pub fn from_external(path: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = path.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => current.extend(chars.next()),
                '/' => segments.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        segments.push(current);
        AttributePath { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }

    /// Segments joined with `.`.
    pub fn internal_name(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            for c in segment.chars() {
                if matches!(c, '/' | '\\') {
                    f.write_str("\\")?;
                }
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}
