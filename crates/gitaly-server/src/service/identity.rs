use std::time::{SystemTime, UNIX_EPOCH};

use gitaly_git::{RefActor, Signature};
use gitaly_proto::gitaly::User;

use crate::service::errors::OperationError;

/// The user a mutation is attributed to. Only presence of the payload is
/// checked; blank fields pass through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: Vec<u8>,
    pub email: Vec<u8>,
    pub gl_id: String,
    pub gl_username: String,
}

impl Identity {
    pub fn from_user(user: Option<User>) -> Result<Self, OperationError> {
        let user = user.ok_or_else(|| OperationError::InvalidArgument("empty user".to_string()))?;

        Ok(Self {
            name: user.name,
            email: user.email,
            gl_id: user.gl_id,
            gl_username: user.gl_username,
        })
    }

    pub fn ref_actor(&self) -> RefActor {
        RefActor {
            name: String::from_utf8_lossy(&self.name).into_owned(),
            email: String::from_utf8_lossy(&self.email).into_owned(),
            user_id: self.gl_id.clone(),
            username: self.gl_username.clone(),
        }
    }

    pub fn signature_at(&self, seconds: i64) -> Signature {
        Signature {
            name: self.name.clone(),
            email: self.email.clone(),
            seconds,
            timezone: "+0000".to_string(),
        }
    }

    pub fn signature_now(&self) -> Signature {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        self.signature_at(i64::try_from(seconds).unwrap_or(i64::MAX))
    }
}
