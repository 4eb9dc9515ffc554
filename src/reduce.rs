//! Collapses chains of indirect responses.

use std::collections::HashSet;

use crate::error::Error;
use crate::response::Response;

/// Unwraps [`Response::Indirect`] layers until a non-indirect response remains.
///
/// Chains are expected to be a handful of layers deep, so the only guard is
/// cycle detection: revisiting a proxy already seen fails with
/// [`Error::ResponseCycle`] listing every kind visited, the repeated one last.
///
/// # Examples
///
/// ```
/// use request_gate::{reduce_response, Decorated, Response};
///
/// let wrapped = Response::indirect(Decorated::new("layout", Response::redirect("/home")));
/// let reduced = reduce_response(wrapped).unwrap();
/// assert_eq!(reduced.kind(), "relocation");
/// ```
pub fn reduce_response(mut response: Response) -> Result<Response, Error> {
    let mut seen = HashSet::new();
    let mut kinds = Vec::new();
    // Visited proxies stay alive until we finish so their addresses can't be reused.
    let mut visited = Vec::new();

    while let Response::Indirect(proxy) = response {
        kinds.push(proxy.kind());
        if !seen.insert(proxy.identity()) {
            return Err(Error::ResponseCycle { kinds });
        }
        response = proxy.reduce();
        visited.push(proxy);
    }

    Ok(response)
}
