//! commit object parsing.

use thiserror::Error;

use crate::object_id::{ObjectId, ObjectIdError};

/// An author, committer or tagger line: `Name <email> <seconds> <+hhmm>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: Vec<u8>,
    pub email: Vec<u8>,
    pub seconds: i64,
    pub timezone: String,
}

impl Signature {
    pub fn parse(line: &[u8]) -> Result<Self, ObjectParseError> {
        let invalid = || ObjectParseError::InvalidSignature {
            line: String::from_utf8_lossy(line).into_owned(),
        };

        let email_end = line.iter().rposition(|byte| *byte == b'>').ok_or_else(invalid)?;
        let email_start = line[..email_end]
            .iter()
            .rposition(|byte| *byte == b'<')
            .ok_or_else(invalid)?;

        let name = trim_ascii(&line[..email_start]).to_vec();
        let email = line[email_start + 1..email_end].to_vec();

        let date = String::from_utf8_lossy(&line[email_end + 1..]);
        let mut date_parts = date.split_whitespace();
        let seconds = date_parts
            .next()
            .and_then(|seconds| seconds.parse::<i64>().ok())
            .ok_or_else(invalid)?;
        let timezone = date_parts.next().unwrap_or("+0000").to_string();

        Ok(Self {
            name,
            email,
            seconds,
            timezone,
        })
    }

    /// Renders the signature the way git writes it into object headers.
    pub fn to_header_value(&self) -> Vec<u8> {
        let mut value = Vec::with_capacity(self.name.len() + self.email.len() + 24);
        value.extend_from_slice(&self.name);
        value.extend_from_slice(b" <");
        value.extend_from_slice(&self.email);
        value.extend_from_slice(format!("> {} {}", self.seconds, self.timezone).as_bytes());
        value
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitObject {
    pub tree: ObjectId,
    pub parents: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: Vec<u8>,
}

impl CommitObject {
    pub fn parse(raw: &[u8]) -> Result<Self, ObjectParseError> {
        let (headers, message) = split_headers(raw);

        let mut tree = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;

        for (key, value) in headers {
            match key {
                b"tree" => tree = Some(parse_oid(value)?),
                b"parent" => parents.push(parse_oid(value)?),
                b"author" => author = Some(Signature::parse(&value)?),
                b"committer" => committer = Some(Signature::parse(&value)?),
                _ => {}
            }
        }

        Ok(Self {
            tree: tree.ok_or(ObjectParseError::MissingHeader("tree"))?,
            parents,
            author: author.ok_or(ObjectParseError::MissingHeader("author"))?,
            committer: committer.ok_or(ObjectParseError::MissingHeader("committer"))?,
            message: message.to_vec(),
        })
    }

    /// First line of the message.
    pub fn subject(&self) -> &[u8] {
        let end = self
            .message
            .iter()
            .position(|byte| *byte == b'\n')
            .unwrap_or(self.message.len());
        trim_ascii(&self.message[..end])
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObjectParseError {
    #[error("object is missing the `{0}` header")]
    MissingHeader(&'static str),
    #[error("object header has invalid object id: {0}")]
    InvalidObjectId(#[from] ObjectIdError),
    #[error("invalid signature line `{line}`")]
    InvalidSignature { line: String },
    #[error("unknown object type `{0}`")]
    UnknownObjectType(String),
}

/// Splits a raw commit or tag into `(key, value)` headers and the message.
/// Continuation lines (leading space) are folded into the previous value.
pub(crate) fn split_headers(raw: &[u8]) -> (Vec<(&[u8], Vec<u8>)>, &[u8]) {
    let (header_bytes, message) = match raw.windows(2).position(|window| window == b"\n\n") {
        Some(end) => (&raw[..end], &raw[end + 2..]),
        None => (raw, &raw[raw.len()..]),
    };

    let mut headers: Vec<(&[u8], Vec<u8>)> = Vec::new();
    for line in header_bytes.split(|byte| *byte == b'\n') {
        if let Some(continued) = line.strip_prefix(b" ") {
            if let Some((_, value)) = headers.last_mut() {
                value.push(b'\n');
                value.extend_from_slice(continued);
            }
            continue;
        }

        let Some(space) = line.iter().position(|byte| *byte == b' ') else {
            continue;
        };
        headers.push((&line[..space], line[space + 1..].to_vec()));
    }

    (headers, message)
}

pub(crate) fn parse_oid(value: Vec<u8>) -> Result<ObjectId, ObjectParseError> {
    Ok(ObjectId::parse(String::from_utf8_lossy(&value).into_owned())?)
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|byte| !byte.is_ascii_whitespace())
        .map_or(start, |index| index + 1);
    &bytes[start..end]
}
