use tonic::{Request, Status};

use super::correlation_id::CorrelationId;
use super::request_info::RequestInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFields {
    pub correlation_id: String,
    pub service: String,
    pub method: String,
    pub full_method: String,
    pub operation: &'static str,
}

pub(crate) fn apply<T>(mut request: Request<T>) -> Result<Request<T>, Status> {
    let correlation_id = request
        .extensions()
        .get::<CorrelationId>()
        .map_or_else(|| "unknown".to_string(), |correlation_id| correlation_id.0.clone());

    let RequestInfo {
        service,
        method,
        full_method,
        operation,
    } = request.extensions().get::<RequestInfo>().cloned().unwrap_or_else(|| RequestInfo {
        service: "unknown".to_string(),
        method: "unknown".to_string(),
        full_method: "/unknown/unknown".to_string(),
        operation: "unknown",
    });

    request.extensions_mut().insert(LogFields {
        correlation_id,
        service,
        method,
        full_method,
        operation,
    });

    super::mark_step(request, "log_fields")
}
