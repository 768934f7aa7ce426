use actix_web::{
    Error, HttpMessage, HttpResponse, Result,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{Ready, ready},
    rc::Rc,
};
use uuid::Uuid;

use crate::jwt::JwtService;

/// Middleware for handling authentication by verifying JWT tokens
/// and extracting user information from the request.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            jwt_service: JwtService::new(),
        }))
    }
}

/// Service that implements the authentication middleware logic
pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    jwt_service: JwtService,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let jwt_service = self.jwt_service.clone();

        Box::pin(async move {
            // Extract Authorization header
            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "));

            let token = match auth_header {
                Some(token) => token,
                None => {
                    let response = HttpResponse::Unauthorized().json(serde_json::json!({
                        "error": "missing_token",
                        "message": "Authorization token is required"
                    }));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            // Verify token and extract user ID
            let user_id = match jwt_service.extract_user_id_from_token(token) {
                Ok(user_id) => user_id,
                Err(_) => {
                    let response = HttpResponse::Unauthorized().json(serde_json::json!({
                        "error": "invalid_token",
                        "message": "Invalid or expired token"
                    }));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            // Add user ID to request extensions
            req.extensions_mut().insert(user_id);

            // Continue with the request
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// Custom extractor for authenticated user ID. Inside a scope wrapped with
/// [`AuthMiddleware`] it reads the ID the middleware stashed; on unwrapped
/// routes it verifies the bearer token itself, so handlers on mixed
/// public/protected scopes can opt into authentication per route.
pub struct AuthenticatedUser(pub Uuid);

impl actix_web::FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        if let Some(id) = req.extensions().get::<Uuid>().copied() {
            return ready(Ok(AuthenticatedUser(id)));
        }

        let user_id = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .and_then(|token| JwtService::new().extract_user_id_from_token(token).ok());

        ready(match user_id {
            Some(id) => Ok(AuthenticatedUser(id)),
            None => Err(actix_web::error::ErrorUnauthorized(
                "User not authenticated",
            )),
        })
    }
}
