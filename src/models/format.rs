//! Export formats offered by the API.

use serde::{Deserialize, Serialize};

/// Server-rendered encoding of a statement.
///
/// Only [`ExportFormat::Xml`] is understood by [`crate::parser`]; the other
/// formats are passed through as opaque bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// JSON.
    Json,
    /// XML, the format parsed by this crate.
    Xml,
    /// Comma-separated values.
    Csv,
    /// GPC (ABO) banking format.
    Gpc,
    /// HTML page.
    Html,
    /// Open Financial Exchange.
    Ofx,
}

impl ExportFormat {
    /// Every supported format.
    pub const ALL: [Self; 6] = [
        Self::Json,
        Self::Xml,
        Self::Csv,
        Self::Gpc,
        Self::Html,
        Self::Ofx,
    ];

    /// File extension used in the terminal URL segment.
    #[inline]
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Csv => "csv",
            Self::Gpc => "gpc",
            Self::Html => "html",
            Self::Ofx => "ofx",
        }
    }

    /// Terminal path segment, e.g. `transactions.csv`.
    #[inline]
    #[must_use]
    pub fn segment(self) -> String {
        format!("transactions.{}", self.extension())
    }
}

impl core::fmt::Display for ExportFormat {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Returned when a string names no known export format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown export format \"{0}\" (expected json, xml, csv, gpc, html or ofx)")]
pub struct UnknownFormat(pub String);

impl core::str::FromStr for ExportFormat {
    type Err = UnknownFormat;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownFormat(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_names_the_extension() {
        assert_eq!(ExportFormat::Xml.segment(), "transactions.xml");
        assert_eq!(ExportFormat::Gpc.segment(), "transactions.gpc");
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("OFX".parse::<ExportFormat>().unwrap(), ExportFormat::Ofx);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
    }

    #[test]
    fn rejects_unknown_format() {
        let err = "pdf".parse::<ExportFormat>().unwrap_err();
        assert_eq!(err, UnknownFormat("pdf".to_owned()));
    }

    #[test]
    fn display_matches_from_str() {
        for format in ExportFormat::ALL {
            assert_eq!(format.to_string().parse::<ExportFormat>().unwrap(), format);
        }
    }
}
