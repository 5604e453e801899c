//! annotated tag objects: parsing and `git mktag` input.

use crate::catfile::ObjectType;
use crate::commit::{parse_oid, split_headers, ObjectParseError, Signature};
use crate::object_id::ObjectId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagObject {
    pub object: ObjectId,
    pub object_type: ObjectType,
    pub name: Vec<u8>,
    pub tagger: Option<Signature>,
    pub message: Vec<u8>,
}

impl TagObject {
    pub fn parse(raw: &[u8]) -> Result<Self, ObjectParseError> {
        let (headers, message) = split_headers(raw);

        let mut object = None;
        let mut object_type = None;
        let mut name = None;
        let mut tagger = None;

        for (key, value) in headers {
            match key {
                b"object" => object = Some(parse_oid(value)?),
                b"type" => object_type = Some(parse_object_type(&value)?),
                b"tag" => name = Some(value),
                b"tagger" => tagger = Some(Signature::parse(&value)?),
                _ => {}
            }
        }

        Ok(Self {
            object: object.ok_or(ObjectParseError::MissingHeader("object"))?,
            object_type: object_type.ok_or(ObjectParseError::MissingHeader("type"))?,
            name: name.ok_or(ObjectParseError::MissingHeader("tag"))?,
            tagger,
            message: message.to_vec(),
        })
    }
}

/// Content for a new annotated tag, rendered into the format `git mktag` reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag<'a> {
    pub target: &'a ObjectId,
    pub target_type: ObjectType,
    pub name: &'a str,
    pub tagger: &'a Signature,
    pub message: &'a [u8],
}

impl NewTag<'_> {
    pub fn render(&self) -> Vec<u8> {
        let mut raw = format!(
            "object {}\ntype {}\ntag {}\ntagger ",
            self.target, self.target_type, self.name
        )
        .into_bytes();
        raw.extend_from_slice(&self.tagger.to_header_value());
        raw.extend_from_slice(b"\n\n");
        raw.extend_from_slice(self.message);
        if !self.message.ends_with(b"\n") {
            raw.push(b'\n');
        }
        raw
    }
}

fn parse_object_type(value: &[u8]) -> Result<ObjectType, ObjectParseError> {
    match value {
        b"commit" => Ok(ObjectType::Commit),
        b"tree" => Ok(ObjectType::Tree),
        b"blob" => Ok(ObjectType::Blob),
        b"tag" => Ok(ObjectType::Tag),
        other => Err(ObjectParseError::UnknownObjectType(
            String::from_utf8_lossy(other).into_owned(),
        )),
    }
}
