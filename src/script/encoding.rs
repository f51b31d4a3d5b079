use serde::{Deserialize, Serialize};

use crate::error::PortableSqlError;

/// Character encoding of a script source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScriptEncoding {
    #[default]
    #[serde(rename = "utf-8", alias = "UTF-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "utf-16le", alias = "UTF-16LE")]
    Utf16Le,
    #[serde(rename = "utf-16be", alias = "UTF-16BE")]
    Utf16Be,
    #[serde(rename = "iso-8859-1", alias = "ISO-8859-1", alias = "latin1")]
    Latin1,
}

impl ScriptEncoding {
    /// Decode raw script bytes. A leading byte-order mark is dropped.
    ///
    /// # Errors
    /// Returns `PortableSqlError::ScriptSource` when the bytes are not valid in
    /// this encoding.
    pub fn decode(self, bytes: &[u8], source_name: &str) -> Result<String, PortableSqlError> {
        let invalid = |message: String| PortableSqlError::ScriptSource {
            source_name: source_name.to_string(),
            message,
        };
        match self {
            ScriptEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                String::from_utf8(bytes.to_vec())
                    .map_err(|e| invalid(format!("invalid UTF-8: {e}")))
            }
            ScriptEncoding::Utf16Le | ScriptEncoding::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return Err(invalid(format!(
                        "odd byte count {} for UTF-16 input",
                        bytes.len()
                    )));
                }
                let units = bytes.chunks_exact(2).map(|pair| {
                    let pair = [pair[0], pair[1]];
                    if self == ScriptEncoding::Utf16Le {
                        u16::from_le_bytes(pair)
                    } else {
                        u16::from_be_bytes(pair)
                    }
                });
                let text: String = char::decode_utf16(units)
                    .collect::<Result<_, _>>()
                    .map_err(|e| invalid(format!("invalid UTF-16: {e}")))?;
                Ok(text.strip_prefix('\u{FEFF}').map(str::to_string).unwrap_or(text))
            }
            ScriptEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}
