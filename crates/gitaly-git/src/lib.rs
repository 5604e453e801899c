//! git object and reference access through the `git` executable.

pub mod catfile;
pub mod command;
pub mod command_factory;
pub mod commit;
pub mod object_id;
pub mod reference;
pub mod repository;
pub mod store;
pub mod tag;

pub use catfile::{ObjectData, ObjectInfo, ObjectType};
pub use commit::{CommitObject, ObjectParseError, Signature};
pub use object_id::ObjectId;
pub use reference::{RefActor, RefUpdate, ReferenceName, ReferenceNameError, ReferenceUpdateError};
pub use repository::{Repository, RepositoryError};
pub use store::RepositoryStore;
pub use tag::{NewTag, TagObject};
