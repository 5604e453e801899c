use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tonic::metadata::MetadataValue;
use tonic::{Request, Status};

pub const CORRELATION_ID_METADATA_KEY: &str = "x-correlation-id";

static NEXT_CORRELATION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

pub(crate) fn apply<T>(mut request: Request<T>) -> Result<Request<T>, Status> {
    let correlation_id = match request.metadata().get(CORRELATION_ID_METADATA_KEY) {
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| Status::invalid_argument("invalid `x-correlation-id` header value"))?;
            if value.trim().is_empty() {
                generate_correlation_id()
            } else {
                value.to_string()
            }
        }
        None => generate_correlation_id(),
    };

    let metadata_value: MetadataValue<_> = correlation_id
        .parse()
        .map_err(|_| Status::invalid_argument("invalid `x-correlation-id` header value"))?;
    request
        .metadata_mut()
        .insert(CORRELATION_ID_METADATA_KEY, metadata_value);
    request
        .extensions_mut()
        .insert(CorrelationId(correlation_id));

    super::mark_step(request, "correlation_id")
}

fn generate_correlation_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0_u128, |duration| duration.as_nanos());
    let seq = NEXT_CORRELATION_ID.fetch_add(1, Ordering::Relaxed);
    format!("gitaly-{now:x}-{seq:x}")
}
