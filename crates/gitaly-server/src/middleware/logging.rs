use std::time::Instant;

use tonic::{Code, Request, Status};
use tracing::{info, warn};

use super::log_fields::LogFields;
use super::status::RequestStart;

pub(crate) fn apply<T>(request: Request<T>) -> Result<Request<T>, Status> {
    if let Some(fields) = request.extensions().get::<LogFields>() {
        info!(
            correlation_id = %fields.correlation_id,
            grpc.service = %fields.service,
            grpc.method = %fields.method,
            grpc.full_method = %fields.full_method,
            grpc.operation = fields.operation,
            "incoming gRPC request"
        );
    } else {
        info!("incoming gRPC request");
    }

    super::mark_step(request, "logging")
}

/// Request-scoped fields captured before the handler consumes the request,
/// used to log the call's outcome.
#[derive(Debug, Clone)]
pub struct CallLog {
    fields: Option<LogFields>,
    start: Instant,
}

impl CallLog {
    pub fn from_request<T>(request: &Request<T>) -> Self {
        Self {
            fields: request.extensions().get::<LogFields>().cloned(),
            start: request
                .extensions()
                .get::<RequestStart>()
                .map_or_else(Instant::now, |start| start.0),
        }
    }

    pub fn finish(&self, code: Code) {
        let elapsed_ms = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let (correlation_id, full_method) = self
            .fields
            .as_ref()
            .map_or(("unknown", "unknown"), |fields| {
                (fields.correlation_id.as_str(), fields.full_method.as_str())
            });

        if code == Code::Ok {
            info!(
                correlation_id,
                grpc.full_method = full_method,
                grpc.code = ?code,
                grpc.time_ms = elapsed_ms,
                "finished gRPC request"
            );
        } else {
            warn!(
                correlation_id,
                grpc.full_method = full_method,
                grpc.code = ?code,
                grpc.time_ms = elapsed_ms,
                "finished gRPC request"
            );
        }
    }
}
