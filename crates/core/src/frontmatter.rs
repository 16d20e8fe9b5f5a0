use serde_json::Value as JsonValue;
use thiserror::Error;

/// Key/value metadata parsed from a document's front matter.
pub type Metadata = serde_json::Map<String, JsonValue>;

/// Result returned after extracting frontmatter from a Markdown document.
#[derive(Debug)]
pub struct FrontmatterExtraction {
    /// Parsed frontmatter mapping.
    pub metadata: Metadata,
    /// Byte offset inside the original document where Markdown content begins.
    pub body_start: usize,
}

impl FrontmatterExtraction {
    fn empty() -> Self {
        Self {
            metadata: Metadata::new(),
            body_start: 0,
        }
    }
}

/// Errors emitted while parsing or extracting frontmatter.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Unclosed YAML fence (e.g., missing terminating `---`).
    #[error("Unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("Frontmatter parse error: {message}")]
    Parse {
        /// Error message from the YAML parser.
        message: String,
        /// Byte offset just past the closing fence.
        body_start: usize,
    },
    /// Top-level YAML node was not a mapping.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType {
        /// Byte offset just past the closing fence.
        body_start: usize,
    },
}

impl FrontmatterError {
    /// Where the body begins despite the failure, if the block was closed.
    pub fn body_start(&self) -> Option<usize> {
        match self {
            FrontmatterError::Unterminated => None,
            FrontmatterError::Parse { body_start, .. }
            | FrontmatterError::InvalidRootType { body_start } => Some(*body_start),
        }
    }
}

/// A source document split into metadata and markdown body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Front matter mapping (empty when absent or unusable).
    pub metadata: Metadata,
    /// Markdown text following the front matter block.
    pub body: String,
}

impl Document {
    /// Splits raw source text into metadata and body.
    ///
    /// Never fails: an unusable front matter block yields empty metadata and
    /// the error is handed back so the caller can report it.
    pub fn from_source(input: &str) -> (Document, Option<FrontmatterError>) {
        match extract_frontmatter(input) {
            Ok(extraction) => (
                Document {
                    metadata: extraction.metadata,
                    body: input[extraction.body_start..].to_string(),
                },
                None,
            ),
            Err(err) => {
                let body = match err.body_start() {
                    Some(start) => &input[start..],
                    None => input,
                };
                (
                    Document {
                        metadata: Metadata::new(),
                        body: body.to_string(),
                    },
                    Some(err),
                )
            }
        }
    }

    /// Returns the string value of a metadata key, if present.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(JsonValue::as_str)
    }
}

/// Extracts YAML frontmatter from an input document.
pub fn extract_frontmatter(input: &str) -> Result<FrontmatterExtraction, FrontmatterError> {
    match find_yaml_block(input)? {
        Some((block, body_start)) => {
            let metadata = parse_yaml_block(block, body_start)?;
            Ok(FrontmatterExtraction {
                metadata,
                body_start,
            })
        }
        None => Ok(FrontmatterExtraction::empty()),
    }
}

fn parse_yaml_block(block: &str, body_start: usize) -> Result<Metadata, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(Metadata::new());
    }

    let parse_error = |message: String| FrontmatterError::Parse {
        message,
        body_start,
    };
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| parse_error(err.to_string()))?;
    let json_value =
        serde_json::to_value(yaml_value).map_err(|err| parse_error(err.to_string()))?;

    match json_value {
        JsonValue::Null => Ok(Metadata::new()),
        JsonValue::Object(map) => Ok(map),
        _ => Err(FrontmatterError::InvalidRootType { body_start }),
    }
}

fn find_yaml_block(input: &str) -> Result<Option<(&str, usize)>, FrontmatterError> {
    let (without_bom, bom_len) = strip_bom(input);
    let mut cursor = 0usize;

    while let Some((line, next_cursor)) = next_line(without_bom, cursor) {
        if line.trim().is_empty() {
            cursor = next_cursor;
            continue;
        }

        if !is_yaml_fence(line) {
            return Ok(None);
        }

        let block_start = next_cursor;
        let mut scan_cursor = next_cursor;

        while let Some((block_line, next_line_cursor)) = next_line(without_bom, scan_cursor) {
            if is_yaml_fence(block_line) {
                let raw_block = &without_bom[block_start..scan_cursor];
                let trimmed = raw_block.trim_end_matches(['\r', '\n']);
                return Ok(Some((trimmed, bom_len + next_line_cursor)));
            }
            scan_cursor = next_line_cursor;
        }
        return Err(FrontmatterError::Unterminated);
    }

    Ok(None)
}

fn strip_bom(input: &str) -> (&str, usize) {
    if let Some(stripped) = input.strip_prefix('\u{feff}') {
        (stripped, '\u{feff}'.len_utf8())
    } else {
        (input, 0)
    }
}

fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }

    let bytes = &input.as_bytes()[start..];
    if let Some(pos) = bytes.iter().position(|b| *b == b'\n') {
        let line_end = start + pos;
        let line = &input[start..line_end];
        Some((line, line_end + 1))
    } else {
        Some((&input[start..], input.len()))
    }
}

fn is_yaml_fence(line: &str) -> bool {
    line.trim_end_matches('\r') == "---"
}
