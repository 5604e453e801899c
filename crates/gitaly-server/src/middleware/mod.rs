use tonic::{Request, Status};

pub mod correlation_id;
pub mod log_fields;
pub mod logging;
pub mod request_info;
pub mod status;

pub use logging::CallLog;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiddlewareTrace {
    pub steps: Vec<&'static str>,
}

pub fn run_chain<T>(request: Request<T>) -> Result<Request<T>, Status> {
    let request = correlation_id::apply(request)?;
    let request = request_info::apply(request)?;
    let request = log_fields::apply(request)?;
    let request = logging::apply(request)?;
    status::apply(request)
}

fn mark_step<T>(mut request: Request<T>, step: &'static str) -> Result<Request<T>, Status> {
    if let Some(trace) = request.extensions_mut().get_mut::<MiddlewareTrace>() {
        trace.steps.push(step);
    } else {
        request
            .extensions_mut()
            .insert(MiddlewareTrace { steps: vec![step] });
    }

    Ok(request)
}
