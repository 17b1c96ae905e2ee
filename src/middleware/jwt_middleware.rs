use std::future::{ready, Ready};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use log::warn;

use crate::{
    error::AppError,
    models::Identity,
    utils::auth::{credential, verify_token},
    AppState,
};

/// Resolves the caller's [`Identity`] on every request.
///
/// Requests without a credential pass through anonymously; routes that need
/// a user ask for it with the [`Authenticated`] extractor. A credential that
/// is present but fails verification is answered here with a 401 response,
/// so outer middleware such as `Logger` still sees the request.
#[derive(Clone)]
pub struct ResolveIdentity {
    app_data: web::Data<AppState>,
}

impl ResolveIdentity {
    pub fn new(app_data: web::Data<AppState>) -> Self {
        Self { app_data }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ResolveIdentity
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ResolveIdentityMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ResolveIdentityMiddleware {
            service,
            app_data: self.app_data.clone(),
        }))
    }
}

pub struct ResolveIdentityMiddleware<S> {
    service: S,
    app_data: web::Data<AppState>,
}

impl<S, B> Service<ServiceRequest> for ResolveIdentityMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(token) = credential(req.request()) {
            match verify_token(&token, &self.app_data.jwt_secret) {
                Ok(identity) => {
                    req.extensions_mut().insert(identity);
                }
                Err(err) => {
                    warn!("Rejected credential on {} {}", req.method(), req.path());
                    let res = req.error_response(err).map_into_right_body();
                    return Box::pin(async move { Ok(res) });
                }
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

/// The verified caller. Fails with 401 when the request is anonymous;
/// use `Option<Authenticated>` where auth is optional.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl FromRequest for Authenticated {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Identity>()
                .cloned()
                .map(Authenticated)
                .ok_or_else(|| AppError::unauthenticated("missing token")),
        )
    }
}
