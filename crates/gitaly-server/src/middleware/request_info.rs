use std::sync::OnceLock;

use gitaly_proto::registry::{full_method, RpcRegistry};
use tonic::{GrpcMethod, Request, Status};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub service: String,
    pub method: String,
    pub full_method: String,
    /// `mutator` or `accessor`; `unknown` for methods outside the registry.
    pub operation: &'static str,
}

impl RequestInfo {
    fn unknown() -> Self {
        Self {
            service: "unknown".to_string(),
            method: "unknown".to_string(),
            full_method: "/unknown/unknown".to_string(),
            operation: "unknown",
        }
    }
}

fn registry() -> &'static RpcRegistry {
    static REGISTRY: OnceLock<RpcRegistry> = OnceLock::new();
    REGISTRY.get_or_init(RpcRegistry::builtin)
}

pub(crate) fn apply<T>(mut request: Request<T>) -> Result<Request<T>, Status> {
    let info = request
        .extensions()
        .get::<GrpcMethod<'static>>()
        .map_or_else(RequestInfo::unknown, |grpc_method| {
            let full_method = full_method(grpc_method.service(), grpc_method.method());
            let operation = registry()
                .lookup(&full_method)
                .map_or("unknown", |entry| entry.operation.as_str());
            RequestInfo {
                service: grpc_method.service().to_string(),
                method: grpc_method.method().to_string(),
                full_method,
                operation,
            }
        });

    request.extensions_mut().insert(info);
    super::mark_step(request, "request_info")
}
