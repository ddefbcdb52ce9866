use crate::{
    api::{advance, analytics, attendance, invoice, payroll, settings, user},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Per-route limiter; `None` when the config cannot be built (0 rpm is coerced to 1 ms)
fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login = web::resource("/login").route(web::post().to(handlers::login));

    // Public routes
    match build_limiter(config.rate_login_per_min) {
        Some(limiter) => cfg.service(web::scope("/auth").service(login.wrap(limiter))),
        None => cfg.service(web::scope("/auth").service(login)),
    };

    let api = web::scope(&config.api_prefix)
        .wrap(from_fn(auth_middleware))
        .service(
            web::scope("/users").service(
                web::resource("")
                    .route(web::post().to(user::create_user))
                    .route(web::get().to(user::list_users)),
            ),
        )
        .service(
            web::scope("/attendance").service(
                web::resource("")
                    .route(web::post().to(attendance::create_attendance))
                    .route(web::get().to(attendance::month_attendance)),
            ),
        )
        .service(
            web::scope("/advances")
                .service(
                    web::resource("")
                        .route(web::post().to(advance::create_advance))
                        .route(web::get().to(advance::list_advances)),
                )
                // /advances/{id}/cancel
                .service(
                    web::resource("/{id}/cancel").route(web::put().to(advance::cancel_advance)),
                ),
        )
        .service(
            web::scope("/payroll")
                .service(web::resource("/report").route(web::get().to(payroll::salary_report)))
                .service(
                    web::resource("/preview").route(web::post().to(payroll::preview_settlement)),
                )
                .service(
                    web::resource("/salaries")
                        .route(web::post().to(payroll::create_salary))
                        .route(web::get().to(payroll::list_salaries)),
                )
                .service(
                    web::resource("/salaries/{id}").route(web::get().to(payroll::get_salary)),
                ),
        )
        .service(
            web::scope("/settings").service(
                web::resource("/deduction-rules")
                    .route(web::get().to(settings::get_deduction_rules))
                    .route(web::put().to(settings::update_deduction_rules)),
            ),
        )
        .service(
            web::scope("/invoices")
                .service(
                    web::resource("")
                        .route(web::post().to(invoice::create_invoice))
                        .route(web::get().to(invoice::list_invoices)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(invoice::get_invoice))
                        .route(web::patch().to(invoice::update_invoice)),
                )
                .service(
                    web::resource("/{id}/whatsapp")
                        .route(web::post().to(invoice::send_invoice_message)),
                ),
        )
        .service(
            web::scope("/analytics")
                .service(
                    web::resource("/{analysis_type}")
                        .route(web::get().to(analytics::latest_analysis)),
                )
                .service(
                    web::resource("/{analysis_type}/refresh")
                        .route(web::post().to(analytics::refresh_analysis)),
                ),
        );

    // Protected routes, rate limited ahead of authentication
    match build_limiter(config.rate_protected_per_min) {
        Some(limiter) => cfg.service(api.wrap(limiter)),
        None => cfg.service(api),
    };
}
