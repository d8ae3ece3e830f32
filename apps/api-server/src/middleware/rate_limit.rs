//! Rate limiting middleware.
//!
//! Reads the limiter from app data (`web::Data<Arc<dyn RateLimiter>>`);
//! without one, requests pass through unthrottled.

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::Arc;

use blogicum_core::ports::{RateLimitDecision, RateLimiter};
use blogicum_shared::ErrorResponse;

/// Throttles requests per client address.
pub struct RateLimitMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService { service }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let decision = req
            .app_data::<web::Data<Arc<dyn RateLimiter>>>()
            .map(|limiter| {
                let key = req
                    .connection_info()
                    .realip_remote_addr()
                    .unwrap_or("unknown")
                    .to_string();
                (limiter.check(&key), key)
            });

        if let Some((RateLimitDecision::Limited { retry_after }, key)) = decision {
            tracing::warn!(client = %key, path = %req.path(), "Rate limit exceeded");

            let retry_secs = retry_after.as_secs().max(1);
            let error = ErrorResponse::new(429, "Too Many Requests").with_detail(format!(
                "Rate limit exceeded. Try again in {retry_secs} seconds."
            ));
            let response = HttpResponse::TooManyRequests()
                .insert_header(("Retry-After", retry_secs.to_string()))
                .json(error);

            let (http_req, _payload) = req.into_parts();
            let srv_response = ServiceResponse::new(http_req, response);
            return Box::pin(async move { Ok(srv_response.map_into_right_body()) });
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}
