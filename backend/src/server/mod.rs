//! Server construction and middleware wiring.

mod config;
mod scheduler;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use yardline::Trace;
#[cfg(debug_assertions)]
use yardline::doc::ApiDoc;
use yardline::inbound::http::auth::{logout, request_code, verify_code};
use yardline::inbound::http::error::{form_config, json_config, query_config};
use yardline::inbound::http::facility::{get_facility_info, update_facility_info};
use yardline::inbound::http::health::{HealthState, live, ready};
use yardline::inbound::http::queue::{
    history, mark_en_route, public_line, public_lines, set_eta, today_queue, update_status,
    verify_queue_code,
};
use yardline::inbound::http::schedule::{
    appointments, cancel_managed, cancel_reservation, configure_day, confirm_hold, get_managed,
    hold_slot, mass_cancel, open_slots, reassign, release_hold,
};
use yardline::inbound::http::sms::inbound_sms;
use yardline::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(12)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .app_data(json_config())
        .app_data(query_config())
        .app_data(form_config())
        .service(request_code)
        .service(verify_code)
        .service(logout)
        .service(configure_day)
        .service(open_slots)
        .service(appointments)
        .service(hold_slot)
        .service(confirm_hold)
        .service(release_hold)
        .service(mass_cancel)
        .service(reassign)
        .service(cancel_reservation)
        .service(get_managed)
        .service(cancel_managed)
        .service(today_queue)
        .service(history)
        .service(public_lines)
        .service(public_line)
        .service(update_status)
        .service(set_eta)
        .service(mark_en_route)
        .service(verify_queue_code)
        .service(inbound_sms)
        .service(get_facility_info)
        .service(update_facility_info);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Seeds reference data and starts the anomaly monitor before binding, so
/// readiness is only reported once the yard is usable.
///
/// # Errors
/// Propagates [`std::io::Error`] when configuration is invalid, seeding fails,
/// or binding the socket fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config).await?);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Smoke coverage for the assembled application.
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use yardline::inbound::http::state::HttpStatePorts;

    fn deps() -> AppDependencies {
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: web::Data::new(HttpState::new(HttpStatePorts::default())),
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        }
    }

    #[actix_web::test]
    async fn public_routes_are_mounted_under_api_scope() {
        let app = test::init_service(build_app(deps())).await;

        let facility = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/facility").to_request(),
        )
        .await;
        assert_eq!(facility.status(), StatusCode::OK);

        let queue = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/sites/CIF/queue")
                .to_request(),
        )
        .await;
        assert_eq!(queue.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn health_routes_live_outside_the_api_scope() {
        let app = test::init_service(build_app(deps())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/health/live").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
