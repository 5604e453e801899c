use std::time::Instant;

use tonic::{Request, Status};

#[derive(Debug, Clone, Copy)]
pub struct RequestStart(pub Instant);

pub(crate) fn apply<T>(mut request: Request<T>) -> Result<Request<T>, Status> {
    request
        .extensions_mut()
        .insert(RequestStart(Instant::now()));
    super::mark_step(request, "status")
}
